//! The typed SSA instruction graph.
//!
//! Lowering builds [`IrFunction`] graphs through the factories in
//! [`func`]; analyses and the register allocator rewrite them in place;
//! the backend consumes them together with an allocation plan.

pub mod block;
pub mod func;
pub mod instr;
pub mod ops;
pub mod print;
pub mod types;
pub mod value;

pub use block::{Block, BlockId, EdgeMap};
pub use func::IrFunction;
pub use instr::{CallKind, HirOp, Instr, InstrKind, TargetSpec};
pub use ops::{ArithOp, BitOp, CmpOp};
pub use print::{parse_instr, ReadScope};
pub use types::{IrType, Platform, WordSize};
pub use value::{ConstLit, ValueData, ValueId};
