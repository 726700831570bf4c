//! Per-instruction-kind backend policy descriptors.
//!
//! Every instruction kind resolves to one of the static policies below.
//! The register allocator reads the constraint hooks to build its plan;
//! the emission driver trusts the plan and calls `gen_code`. Family
//! commonality lives in the trait's default methods; individual policies
//! override only the hooks that differ.

use crate::ir::{ArithOp, CmpOp, InstrKind, IrFunction, ValueId, WordSize};
use super::asm::{mem, reg, AsmOpnd, Assembler, Cond};
use super::emit::{emit_mov_opnd, EmitCx};
use super::regs::{Reg, RAX_SET, RCX_SET, RDX_SET};

/// The constraint-and-emission contract of one instruction kind.
pub trait InstrPolicy: Sync {
    /// Operand `idx` cannot live in memory or be an immediate.
    fn opnd_must_be_reg(&self, _f: &IrFunction, _id: ValueId, _idx: usize) -> bool {
        false
    }

    /// Restrict operand `idx` to a fixed register set.
    fn opnd_reg_set(&self, _f: &IrFunction, _id: ValueId, _idx: usize) -> Option<&'static [Reg]> {
        None
    }

    /// Whether an immediate of `bits` may occupy operand `idx`.
    fn opnd_can_be_imm(&self, _f: &IrFunction, _id: ValueId, _idx: usize, _bits: u8) -> bool {
        false
    }

    /// Upper bound on immediate operands.
    fn max_imm_opnds(&self, _f: &IrFunction, _id: ValueId) -> usize {
        1
    }

    fn dest_must_be_reg(&self, _f: &IrFunction, _id: ValueId) -> bool {
        false
    }

    fn dest_reg_set(&self, _f: &IrFunction, _id: ValueId) -> Option<&'static [Reg]> {
        None
    }

    /// Whether the result reuses operand 0's storage (x86 two-address
    /// form).
    fn dest_is_opnd0(&self, _f: &IrFunction, _id: ValueId) -> bool {
        false
    }

    /// Extra registers clobbered beyond the destination.
    fn write_reg_set(&self, _f: &IrFunction, _id: ValueId) -> Option<&'static [Reg]> {
        None
    }

    /// Emit the instruction. The default is the missing-gen_code fatal
    /// path: HIR instructions must be lowered to runtime calls before the
    /// backend sees them.
    fn gen_code(
        &self,
        cx: &EmitCx,
        _asm: &mut dyn Assembler,
        id: ValueId,
        _opnds: &[AsmOpnd],
        _dest: Option<AsmOpnd>,
        _scratch: &[Reg],
    ) {
        panic!("{}: no gen_code for this instruction", cx.func.instr(id).mnemonic());
    }
}

/// Re-render an operand at a different access width. Immediates are
/// width-free.
fn with_bits(o: AsmOpnd, bits: u8) -> AsmOpnd {
    match o {
        AsmOpnd::Reg { reg, .. } => AsmOpnd::Reg { reg, bits },
        AsmOpnd::Mem { base, offset, .. } => AsmOpnd::Mem { bits, base, offset },
        AsmOpnd::Imm(v) => AsmOpnd::Imm(v),
    }
}

/// Condition code for a comparison token. `box` inputs count as signed.
fn cc_for(op: CmpOp, signed: bool) -> Cond {
    match (op, signed) {
        (CmpOp::Lt, true) => Cond::L,
        (CmpOp::Lt, false) => Cond::B,
        (CmpOp::Lte, true) => Cond::Le,
        (CmpOp::Lte, false) => Cond::Be,
        (CmpOp::Gt, true) => Cond::G,
        (CmpOp::Gt, false) => Cond::A,
        (CmpOp::Gte, true) => Cond::Ge,
        (CmpOp::Gte, false) => Cond::Ae,
        (CmpOp::Eq | CmpOp::Seq, _) => Cond::E,
        (CmpOp::Neq | CmpOp::Nseq, _) => Cond::Ne,
    }
}

/// Whether the comparison of `id`'s operands is signed. Unsigned integer
/// inputs compare unsigned; everything else, `box` included, is signed.
fn cmp_signedness(f: &IrFunction, id: ValueId) -> bool {
    let instr = f.instr(id);
    let ty = f.value_type(instr.uses[0]);
    !ty.is_unsigned()
}

/// Normalise a `cmp` pair so any immediate sits on the right, mirroring
/// the token when the operands swap.
fn normalise_cmp(a: AsmOpnd, b: AsmOpnd, op: CmpOp) -> (AsmOpnd, AsmOpnd, CmpOp) {
    if a.is_imm() && !b.is_imm() {
        (b, a, op.mirror())
    } else {
        (a, b, op)
    }
}

// --- arithmetic / bitwise two-address family ---

struct TwoAddrPolicy;

impl InstrPolicy for TwoAddrPolicy {
    fn dest_is_opnd0(&self, _f: &IrFunction, _id: ValueId) -> bool {
        true
    }

    fn opnd_can_be_imm(&self, _f: &IrFunction, _id: ValueId, idx: usize, bits: u8) -> bool {
        idx == 1 && bits <= 32
    }

    fn gen_code(
        &self,
        cx: &EmitCx,
        asm: &mut dyn Assembler,
        id: ValueId,
        opnds: &[AsmOpnd],
        dest: Option<AsmOpnd>,
        _scratch: &[Reg],
    ) {
        let dest = dest.expect("two-address instruction needs a destination");
        debug_assert_eq!(dest, opnds[0], "plan must alias the destination with operand 0");
        match &cx.func.instr(id).kind {
            InstrKind::Arith(ArithOp::Add) => asm.add(dest, opnds[1]),
            InstrKind::Arith(ArithOp::Sub) => asm.sub(dest, opnds[1]),
            InstrKind::Bit(op) => match op {
                crate::ir::BitOp::And => asm.and(dest, opnds[1]),
                crate::ir::BitOp::Or => asm.or(dest, opnds[1]),
                crate::ir::BitOp::Xor => asm.xor(dest, opnds[1]),
                _ => unreachable!("shifts use the shift policy"),
            },
            InstrKind::BitNot => asm.xor(dest, AsmOpnd::Imm(-1)),
            other => unreachable!("two-address policy on {:?}", other),
        }
    }
}

// --- shifts ---

struct ShiftPolicy;

impl InstrPolicy for ShiftPolicy {
    fn dest_is_opnd0(&self, _f: &IrFunction, _id: ValueId) -> bool {
        true
    }

    fn opnd_can_be_imm(&self, _f: &IrFunction, _id: ValueId, idx: usize, bits: u8) -> bool {
        idx == 1 && bits <= 8
    }

    /// A non-immediate shift count must sit in cl.
    fn opnd_reg_set(&self, _f: &IrFunction, _id: ValueId, idx: usize) -> Option<&'static [Reg]> {
        if idx == 1 {
            Some(&RCX_SET)
        } else {
            None
        }
    }

    fn gen_code(
        &self,
        cx: &EmitCx,
        asm: &mut dyn Assembler,
        id: ValueId,
        opnds: &[AsmOpnd],
        dest: Option<AsmOpnd>,
        _scratch: &[Reg],
    ) {
        let dest = dest.expect("shift needs a destination");
        let count = match opnds[1] {
            AsmOpnd::Imm(v) => AsmOpnd::Imm(v),
            other => with_bits(other, 8),
        };
        match &cx.func.instr(id).kind {
            InstrKind::Bit(crate::ir::BitOp::Lsft) => asm.sal(dest, count),
            InstrKind::Bit(crate::ir::BitOp::Rsft) => asm.sar(dest, count),
            InstrKind::Bit(crate::ir::BitOp::Ursft) => asm.shr(dest, count),
            other => unreachable!("shift policy on {:?}", other),
        }
    }
}

// --- multiplication ---

struct MulPolicy;

impl MulPolicy {
    fn is_unsigned(f: &IrFunction, id: ValueId) -> bool {
        f.instr(id).ty.is_unsigned()
    }

    fn has_small_imm(f: &IrFunction, id: ValueId) -> bool {
        use crate::ir::ValueData;
        let instr = f.instr(id);
        instr.uses.iter().any(|u| match f.value(*u) {
            ValueData::Const { lit, .. } => {
                lit.as_int().map(|v| super::plan::imm_fits(v, 32)).unwrap_or(false)
            }
            _ => false,
        })
    }
}

impl InstrPolicy for MulPolicy {
    /// The unsigned form is `rax * opnd`; operand 0 is pinned.
    fn opnd_reg_set(&self, f: &IrFunction, id: ValueId, idx: usize) -> Option<&'static [Reg]> {
        if idx == 0 && Self::is_unsigned(f, id) {
            Some(&RAX_SET)
        } else {
            None
        }
    }

    fn opnd_can_be_imm(&self, f: &IrFunction, id: ValueId, idx: usize, bits: u8) -> bool {
        idx == 1 && bits <= 32 && !Self::is_unsigned(f, id)
    }

    fn dest_reg_set(&self, f: &IrFunction, id: ValueId) -> Option<&'static [Reg]> {
        if Self::is_unsigned(f, id) {
            Some(&RAX_SET)
        } else {
            None
        }
    }

    /// Signed multiplies are two-address except the immediate form, which
    /// is the three-operand `imul`.
    fn dest_is_opnd0(&self, f: &IrFunction, id: ValueId) -> bool {
        !Self::is_unsigned(f, id) && !Self::has_small_imm(f, id)
    }

    /// Unsigned `mul` writes the high half into rdx.
    fn write_reg_set(&self, f: &IrFunction, id: ValueId) -> Option<&'static [Reg]> {
        if Self::is_unsigned(f, id) {
            Some(&RDX_SET)
        } else {
            None
        }
    }

    fn gen_code(
        &self,
        cx: &EmitCx,
        asm: &mut dyn Assembler,
        id: ValueId,
        opnds: &[AsmOpnd],
        dest: Option<AsmOpnd>,
        _scratch: &[Reg],
    ) {
        let dest = dest.expect("mul needs a destination");
        if Self::is_unsigned(cx.func, id) {
            debug_assert!(
                matches!(opnds[0], AsmOpnd::Reg { reg: Reg::Rax, .. }),
                "unsigned mul takes operand 0 in rax"
            );
            asm.mul(opnds[1]);
        } else if let AsmOpnd::Imm(v) = opnds[1] {
            asm.imul3(dest, opnds[0], v);
        } else {
            debug_assert_eq!(dest, opnds[0]);
            asm.imul(dest, opnds[1]);
        }
    }
}

// --- division / modulo ---

struct DivPolicy {
    /// Take the remainder (rdx) instead of the quotient (rax).
    rem: bool,
}

impl InstrPolicy for DivPolicy {
    fn opnd_reg_set(&self, _f: &IrFunction, _id: ValueId, idx: usize) -> Option<&'static [Reg]> {
        if idx == 0 {
            Some(&RAX_SET)
        } else {
            None
        }
    }

    fn max_imm_opnds(&self, _f: &IrFunction, _id: ValueId) -> usize {
        0
    }

    fn dest_reg_set(&self, _f: &IrFunction, _id: ValueId) -> Option<&'static [Reg]> {
        if self.rem {
            Some(&RDX_SET)
        } else {
            Some(&RAX_SET)
        }
    }

    fn write_reg_set(&self, _f: &IrFunction, _id: ValueId) -> Option<&'static [Reg]> {
        if self.rem {
            Some(&RAX_SET)
        } else {
            Some(&RDX_SET)
        }
    }

    fn gen_code(
        &self,
        cx: &EmitCx,
        asm: &mut dyn Assembler,
        id: ValueId,
        opnds: &[AsmOpnd],
        _dest: Option<AsmOpnd>,
        _scratch: &[Reg],
    ) {
        let word = cx.backend.word.bits();
        let signed = !cx.func.instr(id).ty.is_unsigned();
        if signed {
            match cx.backend.word {
                WordSize::W64 => asm.cqo(),
                WordSize::W32 => asm.cdq(),
            }
            asm.idiv(opnds[1]);
        } else {
            asm.xor(reg(Reg::Rdx, word), reg(Reg::Rdx, word));
            asm.div(opnds[1]);
        }
    }
}

// --- overflow-branching arithmetic ---

struct OvfPolicy;

impl InstrPolicy for OvfPolicy {
    fn dest_is_opnd0(&self, _f: &IrFunction, _id: ValueId) -> bool {
        true
    }

    fn opnd_can_be_imm(&self, _f: &IrFunction, _id: ValueId, idx: usize, bits: u8) -> bool {
        idx == 1 && bits <= 32
    }

    fn gen_code(
        &self,
        cx: &EmitCx,
        asm: &mut dyn Assembler,
        id: ValueId,
        opnds: &[AsmOpnd],
        dest: Option<AsmOpnd>,
        _scratch: &[Reg],
    ) {
        let dest = dest.expect("overflow arithmetic needs a destination");
        debug_assert_eq!(dest, opnds[0]);
        let instr = cx.func.instr(id);
        match &instr.kind {
            InstrKind::ArithOvf(ArithOp::Add) => asm.add(dest, opnds[1]),
            InstrKind::ArithOvf(ArithOp::Sub) => asm.sub(dest, opnds[1]),
            InstrKind::ArithOvf(ArithOp::Mul) => asm.imul(dest, opnds[1]),
            other => unreachable!("overflow policy on {:?}", other),
        }
        let normal = instr.targets[0].expect("normal target");
        let overflow = instr.targets[1].expect("overflow target");
        asm.jcc(Cond::O, cx.edge_label(cx.cur_block, overflow));
        asm.jmp(cx.edge_label(cx.cur_block, normal));
    }
}

// --- comparison ---

struct CmpPolicy;

impl InstrPolicy for CmpPolicy {
    fn dest_must_be_reg(&self, _f: &IrFunction, _id: ValueId) -> bool {
        true
    }

    fn opnd_can_be_imm(&self, _f: &IrFunction, _id: ValueId, idx: usize, bits: u8) -> bool {
        idx == 1 && bits <= 32
    }

    fn gen_code(
        &self,
        cx: &EmitCx,
        asm: &mut dyn Assembler,
        id: ValueId,
        opnds: &[AsmOpnd],
        dest: Option<AsmOpnd>,
        _scratch: &[Reg],
    ) {
        let dest = dest.expect("compare needs a destination");
        let op = match &cx.func.instr(id).kind {
            InstrKind::Cmp(op) => *op,
            other => unreachable!("compare policy on {:?}", other),
        };
        let (a, b, op) = normalise_cmp(opnds[0], opnds[1], op);
        let cc = cc_for(op, cmp_signedness(cx.func, id));
        // Materialise the boolean: clear, compare, set the low byte.
        asm.mov(dest, AsmOpnd::Imm(0));
        asm.cmp(a, b);
        asm.setcc(cc, with_bits(dest, 8));
    }
}

// --- control flow ---

struct IfPolicy;

impl InstrPolicy for IfPolicy {
    fn opnd_can_be_imm(&self, _f: &IrFunction, _id: ValueId, idx: usize, bits: u8) -> bool {
        idx == 1 && bits <= 32
    }

    fn gen_code(
        &self,
        cx: &EmitCx,
        asm: &mut dyn Assembler,
        id: ValueId,
        opnds: &[AsmOpnd],
        _dest: Option<AsmOpnd>,
        _scratch: &[Reg],
    ) {
        let instr = cx.func.instr(id);
        let op = match &instr.kind {
            InstrKind::If(op) => *op,
            other => unreachable!("if policy on {:?}", other),
        };
        let cc = match opnds {
            // Boolean form: test the single operand against zero.
            [a] => {
                asm.cmp(*a, AsmOpnd::Imm(0));
                cc_for(op, true)
            }
            [a, b] => {
                let (a, b, op) = normalise_cmp(*a, *b, op);
                asm.cmp(a, b);
                cc_for(op, cmp_signedness(cx.func, id))
            }
            _ => panic!("if: expected 1 or 2 operands, got {}", opnds.len()),
        };
        let then_t = instr.targets[0].expect("then target");
        let else_t = instr.targets[1].expect("else target");
        asm.jcc(cc, cx.edge_label(cx.cur_block, then_t));
        asm.jmp(cx.edge_label(cx.cur_block, else_t));
    }
}

struct JumpPolicy;

impl InstrPolicy for JumpPolicy {
    fn gen_code(
        &self,
        cx: &EmitCx,
        asm: &mut dyn Assembler,
        id: ValueId,
        _opnds: &[AsmOpnd],
        _dest: Option<AsmOpnd>,
        _scratch: &[Reg],
    ) {
        let target = cx.func.instr(id).targets[0].expect("jump target");
        asm.jmp(cx.edge_label(cx.cur_block, target));
    }
}

struct RetPolicy;

impl InstrPolicy for RetPolicy {
    fn gen_code(
        &self,
        cx: &EmitCx,
        asm: &mut dyn Assembler,
        _id: ValueId,
        _opnds: &[AsmOpnd],
        _dest: Option<AsmOpnd>,
        _scratch: &[Reg],
    ) {
        let word = cx.backend.word.bits();
        let sp = cx.backend.sp_reg;
        for (r, slot) in cx.plan.stack_map.callee_save_slots.iter().rev() {
            let off = cx.plan.stack_map.offset_of(*slot) as i32;
            asm.mov(reg(*r, word), mem(word, sp, off));
        }
        let spill = cx.plan.stack_map.spill_size();
        if spill != 0 {
            asm.add(reg(sp, word), AsmOpnd::Imm(spill));
        }
        asm.ret();
    }
}

struct ThrowPolicy;

impl InstrPolicy for ThrowPolicy {
    fn gen_code(
        &self,
        cx: &EmitCx,
        _asm: &mut dyn Assembler,
        id: ValueId,
        _opnds: &[AsmOpnd],
        _dest: Option<AsmOpnd>,
        _scratch: &[Reg],
    ) {
        panic!(
            "{}: must be lowered to a runtime unwind call before emission",
            cx.func.instr(id).mnemonic()
        );
    }
}

// --- calls ---

struct CallPolicy;

impl InstrPolicy for CallPolicy {
    fn dest_reg_set(&self, _f: &IrFunction, _id: ValueId) -> Option<&'static [Reg]> {
        Some(&RAX_SET)
    }

    fn max_imm_opnds(&self, _f: &IrFunction, _id: ValueId) -> usize {
        0
    }

    fn gen_code(
        &self,
        cx: &EmitCx,
        asm: &mut dyn Assembler,
        id: ValueId,
        opnds: &[AsmOpnd],
        _dest: Option<AsmOpnd>,
        _scratch: &[Reg],
    ) {
        // Argument moves are the plan's pre-moves; here the callee address
        // is all that is left. The throw edge is unwound by the runtime,
        // not by emitted code.
        asm.call(opnds[0]);
        if let Some(cont) = cx.func.instr(id).cont_target() {
            asm.jmp(cx.edge_label(cx.cur_block, cont));
        }
    }
}

// --- memory ---

struct LoadPolicy;

impl InstrPolicy for LoadPolicy {
    fn opnd_must_be_reg(&self, _f: &IrFunction, _id: ValueId, idx: usize) -> bool {
        idx == 0
    }

    fn opnd_can_be_imm(&self, _f: &IrFunction, _id: ValueId, idx: usize, bits: u8) -> bool {
        idx == 1 && bits <= 32
    }

    fn dest_must_be_reg(&self, _f: &IrFunction, _id: ValueId) -> bool {
        true
    }

    fn gen_code(
        &self,
        cx: &EmitCx,
        asm: &mut dyn Assembler,
        id: ValueId,
        opnds: &[AsmOpnd],
        dest: Option<AsmOpnd>,
        _scratch: &[Reg],
    ) {
        let instr = cx.func.instr(id);
        let bits = instr.ty.size_bits(cx.backend.word);
        let base = match opnds[0] {
            AsmOpnd::Reg { reg, .. } => reg,
            other => panic!("{}: pointer operand must be a register, got {:?}", instr.mnemonic(), other),
        };
        let offset = match opnds[1] {
            AsmOpnd::Imm(v) => v as i32,
            other => panic!("{}: offset operand must be an immediate, got {:?}", instr.mnemonic(), other),
        };
        let dest = dest.expect("load needs a destination");
        asm.mov(with_bits(dest, bits), mem(bits, base, offset));
    }
}

struct StorePolicy;

impl InstrPolicy for StorePolicy {
    fn opnd_must_be_reg(&self, _f: &IrFunction, _id: ValueId, idx: usize) -> bool {
        idx == 0
    }

    fn opnd_can_be_imm(&self, _f: &IrFunction, _id: ValueId, idx: usize, bits: u8) -> bool {
        idx == 1 || (idx == 2 && bits <= 32)
    }

    fn max_imm_opnds(&self, _f: &IrFunction, _id: ValueId) -> usize {
        2
    }

    fn gen_code(
        &self,
        cx: &EmitCx,
        asm: &mut dyn Assembler,
        id: ValueId,
        opnds: &[AsmOpnd],
        _dest: Option<AsmOpnd>,
        _scratch: &[Reg],
    ) {
        let instr = cx.func.instr(id);
        let bits = instr.type_params[0].size_bits(cx.backend.word);
        let base = match opnds[0] {
            AsmOpnd::Reg { reg, .. } => reg,
            other => panic!("{}: pointer operand must be a register, got {:?}", instr.mnemonic(), other),
        };
        let offset = match opnds[1] {
            AsmOpnd::Imm(v) => v as i32,
            other => panic!("{}: offset operand must be an immediate, got {:?}", instr.mnemonic(), other),
        };
        let val = match opnds[2] {
            AsmOpnd::Imm(v) => AsmOpnd::Imm(v),
            other => with_bits(other, bits),
        };
        assert!(!val.is_mem(), "{}: store value may not be in memory", instr.mnemonic());
        asm.mov(mem(bits, base, offset), val);
    }
}

// --- context register ---

struct GetCtxPolicy;

impl InstrPolicy for GetCtxPolicy {
    fn dest_must_be_reg(&self, _f: &IrFunction, _id: ValueId) -> bool {
        true
    }

    fn gen_code(
        &self,
        cx: &EmitCx,
        asm: &mut dyn Assembler,
        _id: ValueId,
        _opnds: &[AsmOpnd],
        dest: Option<AsmOpnd>,
        _scratch: &[Reg],
    ) {
        let word = cx.backend.word.bits();
        asm.mov(dest.expect("get_ctx needs a destination"), reg(cx.backend.ctx_reg, word));
    }
}

struct SetCtxPolicy;

impl InstrPolicy for SetCtxPolicy {
    fn opnd_must_be_reg(&self, _f: &IrFunction, _id: ValueId, _idx: usize) -> bool {
        true
    }

    fn gen_code(
        &self,
        cx: &EmitCx,
        asm: &mut dyn Assembler,
        _id: ValueId,
        opnds: &[AsmOpnd],
        _dest: Option<AsmOpnd>,
        _scratch: &[Reg],
    ) {
        let word = cx.backend.word.bits();
        asm.mov(reg(cx.backend.ctx_reg, word), opnds[0]);
    }
}

// --- moves and conversions ---

struct MovePolicy;

impl InstrPolicy for MovePolicy {
    fn gen_code(
        &self,
        cx: &EmitCx,
        asm: &mut dyn Assembler,
        _id: ValueId,
        opnds: &[AsmOpnd],
        _dest: Option<AsmOpnd>,
        _scratch: &[Reg],
    ) {
        emit_mov_opnd(asm, cx.params, opnds[1], opnds[0]);
    }
}

/// Box/unbox/integer casts are register-width moves at this level; the
/// tagging scheme itself is applied by earlier lowering.
struct ConvPolicy;

impl InstrPolicy for ConvPolicy {
    fn gen_code(
        &self,
        cx: &EmitCx,
        asm: &mut dyn Assembler,
        _id: ValueId,
        opnds: &[AsmOpnd],
        dest: Option<AsmOpnd>,
        _scratch: &[Reg],
    ) {
        let dest = dest.expect("conversion needs a destination");
        emit_mov_opnd(asm, cx.params, dest, opnds[0]);
    }
}

/// Int/float conversions need SSE mnemonics this backend's assembler
/// surface does not carry; reaching one at emission is fatal.
struct FpConvPolicy;

impl InstrPolicy for FpConvPolicy {
    fn gen_code(
        &self,
        cx: &EmitCx,
        _asm: &mut dyn Assembler,
        id: ValueId,
        _opnds: &[AsmOpnd],
        _dest: Option<AsmOpnd>,
        _scratch: &[Reg],
    ) {
        panic!(
            "{}: floating-point conversion is not supported by this backend",
            cx.func.instr(id).mnemonic()
        );
    }
}

/// HIR instructions and phis never reach gen_code: HIR lowers to runtime
/// calls, phis resolve into edge moves.
struct HirPolicy;

impl InstrPolicy for HirPolicy {}

// --- lookup ---

static TWO_ADDR: TwoAddrPolicy = TwoAddrPolicy;
static SHIFT: ShiftPolicy = ShiftPolicy;
static MUL: MulPolicy = MulPolicy;
static DIV: DivPolicy = DivPolicy { rem: false };
static MOD: DivPolicy = DivPolicy { rem: true };
static OVF: OvfPolicy = OvfPolicy;
static CMP: CmpPolicy = CmpPolicy;
static IF: IfPolicy = IfPolicy;
static JUMP: JumpPolicy = JumpPolicy;
static RET: RetPolicy = RetPolicy;
static THROW: ThrowPolicy = ThrowPolicy;
static CALL: CallPolicy = CallPolicy;
static MOVE: MovePolicy = MovePolicy;
static LOAD: LoadPolicy = LoadPolicy;
static STORE: StorePolicy = StorePolicy;
static GETCTX: GetCtxPolicy = GetCtxPolicy;
static SETCTX: SetCtxPolicy = SetCtxPolicy;
static CONV: ConvPolicy = ConvPolicy;
static FPCONV: FpConvPolicy = FpConvPolicy;
static HIR: HirPolicy = HirPolicy;

/// The policy descriptor for an instruction kind.
pub fn policy_for(kind: &InstrKind) -> &'static dyn InstrPolicy {
    use crate::ir::BitOp;
    match kind {
        InstrKind::Arith(ArithOp::Add | ArithOp::Sub) => &TWO_ADDR,
        InstrKind::Arith(ArithOp::Mul) => &MUL,
        InstrKind::Arith(ArithOp::Div) => &DIV,
        InstrKind::Arith(ArithOp::Mod) => &MOD,
        InstrKind::ArithOvf(_) => &OVF,
        InstrKind::Bit(BitOp::Lsft | BitOp::Rsft | BitOp::Ursft) => &SHIFT,
        InstrKind::Bit(_) => &TWO_ADDR,
        InstrKind::BitNot => &TWO_ADDR,
        InstrKind::Cmp(_) => &CMP,
        InstrKind::If(_) => &IF,
        InstrKind::Jump => &JUMP,
        InstrKind::Ret => &RET,
        InstrKind::Throw => &THROW,
        InstrKind::Call { .. } => &CALL,
        InstrKind::Move => &MOVE,
        InstrKind::Load => &LOAD,
        InstrKind::Store => &STORE,
        InstrKind::GetCtx => &GETCTX,
        InstrKind::SetCtx => &SETCTX,
        InstrKind::Unbox | InstrKind::BoxVal | InstrKind::ICast => &CONV,
        InstrKind::IToF | InstrKind::FToI => &FPCONV,
        InstrKind::Hir(_) | InstrKind::Phi => &HIR,
    }
}
