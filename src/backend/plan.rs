//! The register-allocation plan consumed by the emission driver.
//!
//! The allocator is an external collaborator; these types fix the shape of
//! what it hands over: a stack map (spill area and slot offsets), one
//! allocation record per instruction, merge moves per CFG edge, and a
//! flattened block ordering. The emitter trusts the plan to satisfy the
//! policy constraints it was built against.

use rustc_hash::FxHashMap;

use crate::ir::{BlockId, EdgeMap, ValueId, WordSize};
use super::callconv::{call_conv, CallConv, CallConvKind};
use super::regs::Reg;

/// A spill slot in the frame's spill area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub u32);

/// A storage location: a register or a spill slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loc {
    Reg(Reg),
    Slot(SlotId),
}

/// Source of an abstract move or an instruction operand: a location or a
/// constant immediate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveArg {
    Reg(Reg),
    Slot(SlotId),
    Imm(i64),
}

impl From<Loc> for MoveArg {
    fn from(l: Loc) -> MoveArg {
        match l {
            Loc::Reg(r) => MoveArg::Reg(r),
            Loc::Slot(s) => MoveArg::Slot(s),
        }
    }
}

/// An abstract move; lowered by the emitter per the rules in
/// [`crate::backend::emit`]. Memory-to-memory shapes are the allocator's
/// bug and are fatal at lowering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbstractMove {
    pub dst: Loc,
    pub src: MoveArg,
}

/// Per-instruction allocation record.
#[derive(Debug, Clone, Default)]
pub struct InstrAlloc {
    /// Moves to run immediately before the instruction's own code.
    pub pre_moves: Vec<AbstractMove>,
    /// One entry per instruction use, in use order.
    pub opnds: Vec<MoveArg>,
    /// Where the result goes, if the instruction produces one.
    pub dest: Option<Loc>,
    /// Registers the instruction may clobber freely.
    pub scratch_regs: Vec<Reg>,
}

/// Spill-area layout: total size, slot offsets from the post-prologue
/// stack pointer, the value-to-slot assignment, and which callee-save
/// registers were assigned slots.
#[derive(Debug, Default)]
pub struct StackMap {
    spill_bytes: i64,
    slot_offsets: FxHashMap<SlotId, i64>,
    value_slots: FxHashMap<ValueId, SlotId>,
    pub callee_save_slots: Vec<(Reg, SlotId)>,
}

impl StackMap {
    pub fn new() -> Self {
        StackMap::default()
    }

    /// Reserve a new slot of `bytes` at the end of the spill area.
    pub fn reserve(&mut self, bytes: i64) -> SlotId {
        let id = SlotId(self.slot_offsets.len() as u32);
        self.slot_offsets.insert(id, self.spill_bytes);
        self.spill_bytes += bytes;
        id
    }

    /// Record that a value spills to `slot`.
    pub fn bind_value(&mut self, v: ValueId, slot: SlotId) {
        self.value_slots.insert(v, slot);
    }

    pub fn slot_of(&self, v: ValueId) -> Option<SlotId> {
        self.value_slots.get(&v).copied()
    }

    /// Byte offset of a slot from the stack pointer after the prologue.
    /// Fatal for unknown slots; the plan and the map come from the same
    /// allocator run.
    pub fn offset_of(&self, slot: SlotId) -> i64 {
        *self
            .slot_offsets
            .get(&slot)
            .unwrap_or_else(|| panic!("slot {} has no frame offset", slot.0))
    }

    /// Total spill-area size subtracted from the stack pointer.
    pub fn spill_size(&self) -> i64 {
        self.spill_bytes
    }
}

/// Everything register allocation hands to the emitter.
#[derive(Debug, Default)]
pub struct RegAllocPlan {
    pub stack_map: StackMap,
    pub instr_map: FxHashMap<ValueId, InstrAlloc>,
    pub merge_moves: EdgeMap<Vec<AbstractMove>>,
    /// Flattened CFG: every block exactly once, entry first.
    pub block_order: Vec<BlockId>,
}

impl RegAllocPlan {
    pub fn new() -> Self {
        RegAllocPlan {
            stack_map: StackMap::new(),
            instr_map: FxHashMap::default(),
            merge_moves: EdgeMap::new(),
            block_order: Vec::new(),
        }
    }

    pub fn alloc_of(&self, id: ValueId) -> Option<&InstrAlloc> {
        self.instr_map.get(&id)
    }
}

/// Target-machine facts the emitter needs: register width, the stack
/// pointer, the reserved runtime-context register, and the convention
/// lookup.
#[derive(Debug, Clone, Copy)]
pub struct BackendDesc {
    pub word: WordSize,
    pub sp_reg: Reg,
    pub ctx_reg: Reg,
}

impl BackendDesc {
    pub fn x86_64() -> Self {
        BackendDesc { word: WordSize::W64, sp_reg: Reg::Rsp, ctx_reg: Reg::R15 }
    }

    pub fn conv(&self, kind: CallConvKind) -> &'static CallConv {
        call_conv(kind)
    }
}

/// Emission parameters: immediate sizing.
#[derive(Debug, Clone, Copy)]
pub struct EmitParams {
    /// Largest immediate (in bits) the mov lowering encodes inline; wider
    /// constants take the wide-immediate form.
    pub imm_bits: u8,
}

impl Default for EmitParams {
    fn default() -> Self {
        EmitParams { imm_bits: 32 }
    }
}

/// Whether `v` is encodable as a sign-extended immediate of `bits`.
pub fn imm_fits(v: i64, bits: u8) -> bool {
    if bits >= 64 {
        return true;
    }
    let min = -(1i64 << (bits - 1));
    let max = (1i64 << (bits - 1)) - 1;
    v >= min && v <= max
}
