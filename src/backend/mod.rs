//! The x86 backend: policy descriptors, the emission driver, and the
//! interfaces it consumes (assembler, calling conventions, allocation
//! plan).

pub mod asm;
pub mod callconv;
pub mod emit;
pub mod plan;
pub mod policy;
pub mod regs;

pub use asm::{mem, reg, AsmOpnd, Assembler, Cond, Label, TextAsm};
pub use callconv::{call_conv, CallConv, CallConvKind};
pub use emit::{emit_function, EmitCx};
pub use plan::{
    imm_fits, AbstractMove, BackendDesc, EmitParams, InstrAlloc, Loc, MoveArg, RegAllocPlan,
    SlotId, StackMap,
};
pub use policy::{policy_for, InstrPolicy};
pub use regs::Reg;
