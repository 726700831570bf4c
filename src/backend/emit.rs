//! The emission driver.
//!
//! Consumes an IR function, a register-allocation plan, and a backend
//! description, and drives the assembler: prologue, per-block labels,
//! pre-instruction moves, each instruction's policy `gen_code`, the
//! edge-transition stubs that realise phi merge moves, and the epilogue
//! (emitted inside `ret`).
//!
//! Edge stubs sit either directly after a single-successor block (logical
//! fall-through) or inline at the entry of the successor when the
//! predecessor has several successors; that placement covers critical
//! edges without splitting blocks.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::ir::{BlockId, EdgeMap, IrFunction};
use super::asm::{mem, reg, AsmOpnd, Assembler, Label};
use super::plan::{imm_fits, AbstractMove, BackendDesc, EmitParams, InstrAlloc, Loc, MoveArg, RegAllocPlan};
use super::policy::policy_for;

/// Shared generator state handed to every `gen_code` hook.
pub struct EmitCx<'a> {
    pub func: &'a IrFunction,
    pub plan: &'a RegAllocPlan,
    pub backend: &'a BackendDesc,
    pub params: &'a EmitParams,
    pub block_labels: FxHashMap<BlockId, Label>,
    pub edge_labels: EdgeMap<Label>,
    pub cur_block: BlockId,
}

impl<'a> EmitCx<'a> {
    pub fn block_label(&self, b: BlockId) -> Label {
        *self
            .block_labels
            .get(&b)
            .unwrap_or_else(|| panic!("no label for block {}", self.func.block(b).name))
    }

    pub fn edge_label(&self, pred: BlockId, succ: BlockId) -> Label {
        *self.edge_labels.get(pred, succ).unwrap_or_else(|| {
            panic!(
                "no label for edge {} -> {}",
                self.func.block(pred).name,
                self.func.block(succ).name
            )
        })
    }

    fn loc_opnd(&self, loc: Loc) -> AsmOpnd {
        let word = self.backend.word.bits();
        match loc {
            Loc::Reg(r) => reg(r, word),
            Loc::Slot(s) => {
                mem(word, self.backend.sp_reg, self.plan.stack_map.offset_of(s) as i32)
            }
        }
    }

    fn movearg_opnd(&self, arg: MoveArg) -> AsmOpnd {
        match arg {
            MoveArg::Reg(r) => self.loc_opnd(Loc::Reg(r)),
            MoveArg::Slot(s) => self.loc_opnd(Loc::Slot(s)),
            MoveArg::Imm(v) => AsmOpnd::Imm(v),
        }
    }
}

/// Lower one mov between resolved operands. An immediate source that fits
/// the inline width is encoded directly, a wider one takes the
/// wide-immediate form; memory-to-memory shapes are a broken plan and are
/// fatal (x86 has no such mov).
pub fn emit_mov_opnd(asm: &mut dyn Assembler, params: &EmitParams, dst: AsmOpnd, src: AsmOpnd) {
    match src {
        AsmOpnd::Imm(v) => {
            if imm_fits(v, params.imm_bits) {
                asm.mov(dst, AsmOpnd::Imm(v));
            } else {
                match dst {
                    AsmOpnd::Reg { reg, .. } => asm.movabs(reg, v),
                    other => panic!("wide immediate move needs a register destination, got {:?}", other),
                }
            }
        }
        other => {
            assert!(
                !(dst.is_mem() && other.is_mem()),
                "memory-to-memory move; the allocator must route through a register"
            );
            asm.mov(dst, other);
        }
    }
}

fn lower_move(cx: &EmitCx, asm: &mut dyn Assembler, mv: &AbstractMove) {
    let dst = cx.loc_opnd(mv.dst);
    let src = cx.movearg_opnd(mv.src);
    emit_mov_opnd(asm, cx.params, dst, src);
}

/// Emit the edge-transition stub for (pred, succ): the edge label, the
/// edge's merge moves in order, and the jump to the successor's label.
fn emit_stub(cx: &EmitCx, asm: &mut dyn Assembler, pred: BlockId, succ: BlockId) {
    asm.bind(cx.edge_label(pred, succ));
    if let Some(moves) = cx.plan.merge_moves.get(pred, succ) {
        for mv in moves {
            lower_move(cx, asm, mv);
        }
    }
    asm.jmp(cx.block_label(succ));
}

/// Emit a whole function against its allocation plan.
pub fn emit_function(
    func: &IrFunction,
    plan: &RegAllocPlan,
    backend: &BackendDesc,
    params: &EmitParams,
    asm: &mut dyn Assembler,
) {
    debug!(function = %func.name, blocks = plan.block_order.len(), "emitting function");
    let word = backend.word.bits();

    // Prologue: spill area, then callee-save spills.
    let spill = plan.stack_map.spill_size();
    if spill != 0 {
        asm.sub(reg(backend.sp_reg, word), AsmOpnd::Imm(spill));
    }
    for (r, slot) in &plan.stack_map.callee_save_slots {
        let off = plan.stack_map.offset_of(*slot) as i32;
        asm.mov(mem(word, backend.sp_reg, off), reg(*r, word));
    }

    // Local CFG view: successors and predecessors from the terminators.
    let mut succs: FxHashMap<BlockId, Vec<BlockId>> = FxHashMap::default();
    let mut preds: FxHashMap<BlockId, Vec<BlockId>> = FxHashMap::default();
    for b in func.blocks() {
        let out = succs.entry(b.id).or_default();
        if let Some(last) = b.last_instr() {
            for t in func.instr(last).succ_targets() {
                if !out.contains(&t) {
                    out.push(t);
                }
            }
        }
    }
    for (p, out) in &succs {
        for s in out {
            preds.entry(*s).or_default().push(*p);
        }
    }

    // Label materialisation: one label per block, one per CFG edge.
    let mut cx = EmitCx {
        func,
        plan,
        backend,
        params,
        block_labels: FxHashMap::default(),
        edge_labels: EdgeMap::new(),
        cur_block: plan.block_order.first().copied().unwrap_or(BlockId(0)),
    };
    for b in func.blocks() {
        cx.block_labels.insert(b.id, asm.make_label(&b.name));
    }
    for (p, out) in &succs {
        for s in out {
            let name = format!("{}_to_{}", func.block(*p).name, func.block(*s).name);
            cx.edge_labels.insert(*p, *s, asm.make_label(&name));
        }
    }

    let empty_alloc = InstrAlloc::default();
    for bid in &plan.block_order {
        cx.cur_block = *bid;

        // Critical-edge stubs land at the entry of the successor.
        if let Some(ps) = preds.get(bid) {
            for p in ps {
                if succs.get(p).map(|o| o.len()).unwrap_or(0) > 1 {
                    emit_stub(&cx, asm, *p, *bid);
                }
            }
        }

        asm.bind(cx.block_label(*bid));

        for iid in &func.block(*bid).instrs {
            let instr = func.instr(*iid);
            if instr.is_pseudo() {
                continue;
            }
            let alloc = plan.alloc_of(*iid).unwrap_or(&empty_alloc);
            for mv in &alloc.pre_moves {
                lower_move(&cx, asm, mv);
            }
            let opnds: Vec<AsmOpnd> =
                alloc.opnds.iter().map(|o| cx.movearg_opnd(*o)).collect();
            let dest = alloc.dest.map(|d| cx.loc_opnd(d));
            policy_for(&instr.kind).gen_code(
                &cx,
                asm,
                *iid,
                &opnds,
                dest,
                &alloc.scratch_regs,
            );
        }

        // Single-successor blocks fall through into their edge stub.
        if let Some(out) = succs.get(bid) {
            if out.len() == 1 {
                emit_stub(&cx, asm, *bid, out[0]);
            }
        }
    }
}
