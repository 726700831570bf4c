//! IR instruction definitions: the SSA instruction taxonomy.
//!
//! Instructions span two abstraction levels: the HIR family operates on
//! boxed JavaScript values, everything below it on concrete machine types,
//! with explicit conversion instructions at the boundary. Each kind carries
//! a validating initialiser that checks operand counts and types, fixes the
//! output type, and sets the side-effect flag; validation failures are
//! wrapped with the mnemonic by the constructing function.
//!
//! Key types:
//! - `InstrKind`: the taxonomy, organised into families
//! - `HirOp` / `CallKind`: the boxed-value operation sets
//! - `Instr`: an instruction node (uses, targets, dests, parent block)
//! - `TargetSpec`: per-kind branch-target arity and role names

use crate::common::IrError;
use super::block::BlockId;
use super::ops::{ArithOp, BitOp, CmpOp};
use super::types::{IrType, Platform};
use super::value::ValueId;

/// HIR operations on boxed values. All inputs are `box`; output is `box`
/// unless the operation is declared void. Runtime semantics (property
/// lookup, closures, cells) are provided by external handler functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HirOp {
    /// JavaScript boolean negation.
    LogNot,
    TypeOf,
    InstOf,
    /// Fetch the in-flight exception at the head of a catch block.
    Catch,
    HasProp,
    /// Property-name enumeration for for-in loops.
    GetPropNames,
    DelPropVal,
    /// Materialise the `arguments` object for the current frame.
    MakeArgObj,
    GetNumArgs,
    GetArgTable,
    MakeCell,
    GetCell,
    PutCell,
    MakeClos,
    GetClos,
    PutClos,
    NewObject,
    NewArray,
}

impl HirOp {
    pub fn mnemonic(self) -> &'static str {
        match self {
            HirOp::LogNot => "log_not",
            HirOp::TypeOf => "typeof",
            HirOp::InstOf => "instof",
            HirOp::Catch => "catch",
            HirOp::HasProp => "has_prop",
            HirOp::GetPropNames => "get_prop_names",
            HirOp::DelPropVal => "del_prop_val",
            HirOp::MakeArgObj => "make_arg_obj",
            HirOp::GetNumArgs => "get_num_args",
            HirOp::GetArgTable => "get_arg_table",
            HirOp::MakeCell => "make_cell",
            HirOp::GetCell => "get_cell",
            HirOp::PutCell => "put_cell",
            HirOp::MakeClos => "make_clos",
            HirOp::GetClos => "get_clos",
            HirOp::PutClos => "put_clos",
            HirOp::NewObject => "new_object",
            HirOp::NewArray => "new_array",
        }
    }

    /// (min, max) input arity. `make_clos` takes the function plus any
    /// number of captured cells.
    fn arity(self) -> (usize, usize) {
        match self {
            HirOp::Catch
            | HirOp::GetNumArgs
            | HirOp::GetArgTable
            | HirOp::MakeCell
            | HirOp::NewArray => (0, 0),
            HirOp::LogNot
            | HirOp::TypeOf
            | HirOp::GetPropNames
            | HirOp::MakeArgObj
            | HirOp::GetCell
            | HirOp::NewObject => (1, 1),
            HirOp::InstOf
            | HirOp::HasProp
            | HirOp::DelPropVal
            | HirOp::PutCell
            | HirOp::GetClos => (2, 2),
            HirOp::PutClos => (3, 3),
            HirOp::MakeClos => (1, usize::MAX),
        }
    }

    /// Output type. Void for the mutating store-like operations;
    /// `get_num_args` produces the platform integer.
    fn output(self, platform: Platform) -> IrType {
        match self {
            HirOp::PutCell | HirOp::PutClos => IrType::None,
            HirOp::GetNumArgs => platform.pint(),
            _ => IrType::Box,
        }
    }

    fn side_effects(self) -> bool {
        matches!(self, HirOp::DelPropVal | HirOp::PutCell | HirOp::PutClos)
    }

    pub fn all() -> &'static [HirOp] {
        &[
            HirOp::LogNot,
            HirOp::TypeOf,
            HirOp::InstOf,
            HirOp::Catch,
            HirOp::HasProp,
            HirOp::GetPropNames,
            HirOp::DelPropVal,
            HirOp::MakeArgObj,
            HirOp::GetNumArgs,
            HirOp::GetArgTable,
            HirOp::MakeCell,
            HirOp::GetCell,
            HirOp::PutCell,
            HirOp::MakeClos,
            HirOp::GetClos,
            HirOp::PutClos,
            HirOp::NewObject,
            HirOp::NewArray,
        ]
    }
}

/// The call family. All of these may invoke arbitrary JavaScript (property
/// accessors included), so they carry optional continue/throw targets and
/// are side-effecting by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    /// `call(func, this, args...)`.
    Call,
    /// `construct(func, args...)`; always produces `box`.
    Construct,
    /// Property read; a call because it may run a getter.
    GetPropVal,
    /// Property write; a call because it may run a setter.
    PutPropVal,
}

impl CallKind {
    pub fn mnemonic(self) -> &'static str {
        match self {
            CallKind::Call => "call",
            CallKind::Construct => "construct",
            CallKind::GetPropVal => "get_prop_val",
            CallKind::PutPropVal => "put_prop_val",
        }
    }
}

/// An instruction kind, organised into families.
#[derive(Debug, Clone, PartialEq)]
pub enum InstrKind {
    Hir(HirOp),
    Arith(ArithOp),
    /// Arithmetic that branches to `[normal, overflow]`.
    ArithOvf(ArithOp),
    Bit(BitOp),
    /// Unary bitwise complement.
    BitNot,
    Cmp(CmpOp),
    Jump,
    Ret,
    /// Two-way branch. Carries the comparison token the emitter lowers to a
    /// `cmp`/`jcc` pair; the single-input boolean form tests against zero
    /// with an equality token.
    If(CmpOp),
    Throw,
    /// `ret` is the declared return type of the callee when known; only
    /// `CallKind::Call` consults it.
    Call { kind: CallKind, ret: Option<IrType> },
    Unbox,
    BoxVal,
    ICast,
    IToF,
    FToI,
    Load,
    Store,
    GetCtx,
    SetCtx,
    /// LIR move between storage locations. Produced only by register
    /// allocation and edge-transition insertion.
    Move,
    Phi,
}

/// Branch-target arity and role names for an instruction kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSpec {
    /// Never branches.
    None,
    /// Exactly these targets, all present.
    Fixed(&'static [&'static str]),
    /// Up to these targets, each independently optional.
    Optional(&'static [&'static str]),
}

impl InstrKind {
    pub fn target_spec(&self) -> TargetSpec {
        match self {
            InstrKind::Jump => TargetSpec::Fixed(&[""]),
            InstrKind::If(_) => TargetSpec::Fixed(&["then", "else"]),
            InstrKind::ArithOvf(_) => TargetSpec::Fixed(&["normal", "overflow"]),
            InstrKind::Call { .. } => TargetSpec::Optional(&["continue", "throw"]),
            InstrKind::Throw => TargetSpec::Optional(&["catch"]),
            _ => TargetSpec::None,
        }
    }

    /// Pseudo-instructions are never emitted: phi nodes resolve into edge
    /// moves, and the argument-surface reads are satisfied by the register
    /// allocation plan.
    pub fn is_pseudo(&self) -> bool {
        matches!(
            self,
            InstrKind::Phi | InstrKind::Hir(HirOp::GetNumArgs) | InstrKind::Hir(HirOp::GetArgTable)
        )
    }

    /// The mnemonic base used to label validation failures, before type
    /// suffixes are chosen.
    pub fn base_mnemonic(&self) -> &'static str {
        match self {
            InstrKind::Hir(op) => op.mnemonic(),
            InstrKind::Arith(op) => op.mnemonic(),
            InstrKind::ArithOvf(op) => match op {
                ArithOp::Add => "add_ovf",
                ArithOp::Sub => "sub_ovf",
                ArithOp::Mul => "mul_ovf",
                ArithOp::Div => "div_ovf",
                ArithOp::Mod => "mod_ovf",
            },
            InstrKind::Bit(op) => op.mnemonic(),
            InstrKind::BitNot => "not",
            InstrKind::Cmp(op) => op.mnemonic(),
            InstrKind::Jump => "jump",
            InstrKind::Ret => "ret",
            InstrKind::If(_) => "if",
            InstrKind::Throw => "throw",
            InstrKind::Call { kind, .. } => kind.mnemonic(),
            InstrKind::Unbox => "unbox",
            InstrKind::BoxVal => "box",
            InstrKind::ICast => "icast",
            InstrKind::IToF => "itof",
            InstrKind::FToI => "ftoi",
            InstrKind::Load => "load",
            InstrKind::Store => "store",
            InstrKind::GetCtx => "get_ctx",
            InstrKind::SetCtx => "set_ctx",
            InstrKind::Move => "move",
            InstrKind::Phi => "phi",
        }
    }
}

/// Output signature decided by a kind's initialiser.
pub(crate) struct Sig {
    pub ty: IrType,
    pub side_effects: bool,
    pub mnemonic: String,
}

/// Mnemonic synthesis: explicit type parameters are appended when present;
/// otherwise a uniform non-box input type is appended; otherwise the base
/// stands alone, unless the family asks for the every-input-type form for
/// mixed signatures.
fn synth_mnemonic(base: &str, tps: &[IrType], ins: &[IrType], mixed_suffix: bool) -> String {
    if !tps.is_empty() {
        let mut m = base.to_string();
        for t in tps {
            m.push('_');
            m.push_str(t.name());
        }
        return m;
    }
    if !ins.is_empty() && ins.iter().all(|t| *t == ins[0]) {
        if ins[0] == IrType::Box {
            return base.to_string();
        }
        return format!("{}_{}", base, ins[0].name());
    }
    if mixed_suffix && !ins.is_empty() {
        let mut m = base.to_string();
        for t in ins {
            m.push('_');
            m.push_str(t.name());
        }
        return m;
    }
    base.to_string()
}

// --- shared validation helpers ---

fn valid_count(ins: &[IrType], n: usize) -> Result<(), String> {
    if ins.len() != n {
        return Err(format!("expected {} operand(s), got {}", n, ins.len()));
    }
    Ok(())
}

fn all_boxed(ins: &[IrType]) -> Result<(), String> {
    for (i, t) in ins.iter().enumerate() {
        if *t != IrType::Box {
            return Err(format!("operand {} must be box, got {}", i, t));
        }
    }
    Ok(())
}

fn no_type_params(tps: &[IrType]) -> Result<(), String> {
    if !tps.is_empty() {
        return Err(format!("takes no type parameters, got {}", tps.len()));
    }
    Ok(())
}

fn one_type_param(tps: &[IrType]) -> Result<IrType, String> {
    match tps {
        [t] => Ok(*t),
        _ => Err(format!("expected one type parameter, got {}", tps.len())),
    }
}

impl InstrKind {
    /// Validate a construction request and decide the output signature.
    /// `tps` are explicit type parameters, `ins` the input value types.
    /// Target arity is checked separately against [`InstrKind::target_spec`].
    pub(crate) fn validate(
        &self,
        platform: Platform,
        tps: &[IrType],
        ins: &[IrType],
    ) -> Result<Sig, String> {
        // The lattice is platform-parameterised: a type the target does not
        // carry may not appear anywhere in a signature, whichever family the
        // instruction belongs to.
        for t in tps.iter().chain(ins.iter()) {
            if !t.available_on(platform.word) {
                return Err(format!("type {} is not available on this platform", t));
            }
        }
        let pint = platform.pint();
        match self {
            InstrKind::Hir(op) => {
                no_type_params(tps)?;
                let (min, max) = op.arity();
                if ins.len() < min || ins.len() > max {
                    return Err(format!(
                        "expected {} operand(s), got {}",
                        if min == max { min.to_string() } else { format!("{}+", min) },
                        ins.len()
                    ));
                }
                all_boxed(ins)?;
                Ok(Sig {
                    ty: op.output(platform),
                    side_effects: op.side_effects(),
                    mnemonic: op.mnemonic().to_string(),
                })
            }

            InstrKind::Arith(op) => {
                no_type_params(tps)?;
                valid_count(ins, 2)?;
                let (a, b) = (ins[0], ins[1]);
                let base = op.mnemonic();
                // Pointer specialisations keep the bare mnemonic.
                if *op == ArithOp::Add && a == IrType::Rptr && b == pint {
                    return Ok(Sig { ty: IrType::Rptr, side_effects: false, mnemonic: base.into() });
                }
                if *op == ArithOp::Sub && a == IrType::Rptr {
                    if b == pint {
                        return Ok(Sig {
                            ty: IrType::Rptr,
                            side_effects: false,
                            mnemonic: base.into(),
                        });
                    }
                    if b == IrType::Rptr {
                        return Ok(Sig { ty: pint, side_effects: false, mnemonic: base.into() });
                    }
                }
                if a != b {
                    return Err(format!("operand types {} and {} do not match", a, b));
                }
                if a != IrType::Box && !a.is_number() {
                    return Err(format!("operands must be box or numeric, got {}", a));
                }
                Ok(Sig {
                    ty: a,
                    side_effects: false,
                    mnemonic: synth_mnemonic(base, tps, ins, false),
                })
            }

            InstrKind::ArithOvf(op) => {
                no_type_params(tps)?;
                if !op.has_ovf_form() {
                    return Err("no overflow-branching form".into());
                }
                valid_count(ins, 2)?;
                let (a, b) = (ins[0], ins[1]);
                if a != b || (a != pint && a != IrType::Box) {
                    return Err(format!(
                        "operands must both be {} or both box, got {} and {}",
                        pint, a, b
                    ));
                }
                Ok(Sig {
                    ty: a,
                    side_effects: false,
                    mnemonic: synth_mnemonic(self.base_mnemonic(), tps, ins, false),
                })
            }

            InstrKind::Bit(_) => {
                no_type_params(tps)?;
                valid_count(ins, 2)?;
                let (a, b) = (ins[0], ins[1]);
                let ok = (a == IrType::Box && b == IrType::Box)
                    || (a == IrType::Box && b == pint)
                    || (a.is_int() && a == b);
                if !ok {
                    return Err(format!("operand types {} and {} not permitted", a, b));
                }
                // Output takes the second operand's type.
                Ok(Sig {
                    ty: b,
                    side_effects: false,
                    mnemonic: synth_mnemonic(self.base_mnemonic(), tps, ins, true),
                })
            }

            InstrKind::BitNot => {
                no_type_params(tps)?;
                valid_count(ins, 1)?;
                let a = ins[0];
                if a != IrType::Box && !a.is_int() {
                    return Err(format!("operand must be box or integer, got {}", a));
                }
                Ok(Sig {
                    ty: a,
                    side_effects: false,
                    mnemonic: synth_mnemonic("not", tps, ins, false),
                })
            }

            InstrKind::Cmp(op) => {
                no_type_params(tps)?;
                valid_count(ins, 2)?;
                let (a, b) = (ins[0], ins[1]);
                if a != b {
                    return Err(format!("operand types {} and {} do not match", a, b));
                }
                if matches!(op, CmpOp::Seq | CmpOp::Nseq) && a != IrType::Box {
                    return Err(format!("strict equality takes box operands, got {}", a));
                }
                if a != IrType::Box && !a.is_number() {
                    return Err(format!("operands must be box or numeric, got {}", a));
                }
                let ty = if a == IrType::Box { IrType::Box } else { IrType::I8 };
                Ok(Sig {
                    ty,
                    side_effects: false,
                    mnemonic: synth_mnemonic(op.mnemonic(), tps, ins, false),
                })
            }

            InstrKind::Jump => {
                no_type_params(tps)?;
                valid_count(ins, 0)?;
                Ok(Sig { ty: IrType::None, side_effects: true, mnemonic: "jump".into() })
            }

            InstrKind::Ret => {
                no_type_params(tps)?;
                valid_count(ins, 1)?;
                if ins[0] == IrType::None {
                    return Err("operand must produce a value".into());
                }
                Ok(Sig { ty: IrType::None, side_effects: true, mnemonic: "ret".into() })
            }

            InstrKind::If(op) => {
                no_type_params(tps)?;
                match ins {
                    [a] => {
                        if *a != IrType::Box && *a != IrType::I8 {
                            return Err(format!("test operand must be box or i8, got {}", a));
                        }
                        if !matches!(op, CmpOp::Eq | CmpOp::Neq) {
                            return Err(format!(
                                "single-operand form requires an equality token, got {}",
                                op.mnemonic()
                            ));
                        }
                    }
                    [a, b] => {
                        if a != b {
                            return Err(format!("operand types {} and {} do not match", a, b));
                        }
                        if *a != IrType::Box && !a.is_number() {
                            return Err(format!("operands must be box or numeric, got {}", a));
                        }
                    }
                    _ => return Err(format!("expected 1 or 2 operands, got {}", ins.len())),
                }
                let mnemonic = if ins.len() == 1 && *op == CmpOp::Neq {
                    "if".to_string()
                } else {
                    format!("if_{}", op.mnemonic())
                };
                Ok(Sig { ty: IrType::None, side_effects: true, mnemonic })
            }

            InstrKind::Throw => {
                no_type_params(tps)?;
                valid_count(ins, 1)?;
                if ins[0] != IrType::Box {
                    return Err(format!("operand must be box, got {}", ins[0]));
                }
                Ok(Sig { ty: IrType::None, side_effects: true, mnemonic: "throw".into() })
            }

            InstrKind::Call { kind, ret } => {
                no_type_params(tps)?;
                let min = match kind {
                    CallKind::Call => 2,
                    CallKind::Construct => 1,
                    CallKind::GetPropVal => 2,
                    CallKind::PutPropVal => 3,
                };
                let exact = !matches!(kind, CallKind::Call | CallKind::Construct);
                if ins.len() < min || (exact && ins.len() != min) {
                    return Err(format!(
                        "expected {}{} operand(s), got {}",
                        min,
                        if exact { "" } else { "+" },
                        ins.len()
                    ));
                }
                all_boxed(ins)?;
                let ty = match kind {
                    CallKind::Call => ret.unwrap_or(IrType::Box),
                    CallKind::Construct | CallKind::GetPropVal => IrType::Box,
                    CallKind::PutPropVal => IrType::None,
                };
                Ok(Sig { ty, side_effects: true, mnemonic: kind.mnemonic().to_string() })
            }

            InstrKind::Unbox => {
                let t = one_type_param(tps)?;
                if t != pint {
                    return Err(format!("type parameter must be {}, got {}", pint, t));
                }
                valid_count(ins, 1)?;
                if ins[0] != IrType::Box {
                    return Err(format!("operand must be box, got {}", ins[0]));
                }
                Ok(Sig {
                    ty: t,
                    side_effects: false,
                    mnemonic: synth_mnemonic("unbox", tps, ins, false),
                })
            }

            InstrKind::BoxVal => {
                let t = one_type_param(tps)?;
                if t != pint {
                    return Err(format!("type parameter must be {}, got {}", pint, t));
                }
                valid_count(ins, 1)?;
                if ins[0] != pint {
                    return Err(format!("operand must be {}, got {}", pint, ins[0]));
                }
                Ok(Sig {
                    ty: IrType::Box,
                    side_effects: false,
                    mnemonic: synth_mnemonic("box", tps, ins, false),
                })
            }

            InstrKind::ICast => {
                let t = one_type_param(tps)?;
                let castable = |t: IrType| t.is_int() || t.is_ptr();
                if !castable(t) {
                    return Err(format!("type parameter must be integer, box, or rptr, got {}", t));
                }
                valid_count(ins, 1)?;
                if !castable(ins[0]) {
                    return Err(format!("operand must be integer, box, or rptr, got {}", ins[0]));
                }
                Ok(Sig {
                    ty: t,
                    side_effects: false,
                    mnemonic: synth_mnemonic("icast", tps, ins, false),
                })
            }

            InstrKind::IToF => {
                let t = one_type_param(tps)?;
                if t != IrType::F64 {
                    return Err(format!("type parameter must be f64, got {}", t));
                }
                valid_count(ins, 1)?;
                if ins[0] != pint {
                    return Err(format!("operand must be {}, got {}", pint, ins[0]));
                }
                Ok(Sig {
                    ty: IrType::F64,
                    side_effects: false,
                    mnemonic: synth_mnemonic("itof", tps, ins, false),
                })
            }

            InstrKind::FToI => {
                let t = one_type_param(tps)?;
                if t != pint {
                    return Err(format!("type parameter must be {}, got {}", pint, t));
                }
                valid_count(ins, 1)?;
                if ins[0] != IrType::F64 {
                    return Err(format!("operand must be f64, got {}", ins[0]));
                }
                Ok(Sig {
                    ty: pint,
                    side_effects: false,
                    mnemonic: synth_mnemonic("ftoi", tps, ins, false),
                })
            }

            InstrKind::Load => {
                let t = one_type_param(tps)?;
                if t == IrType::None {
                    return Err("type parameter must name a value type".into());
                }
                valid_count(ins, 2)?;
                if !ins[0].is_ptr() {
                    return Err(format!("pointer operand must be box or rptr, got {}", ins[0]));
                }
                if ins[1] != pint {
                    return Err(format!("offset operand must be {}, got {}", pint, ins[1]));
                }
                Ok(Sig {
                    ty: t,
                    side_effects: false,
                    mnemonic: synth_mnemonic("load", tps, ins, false),
                })
            }

            InstrKind::Store => {
                let t = one_type_param(tps)?;
                if t == IrType::None {
                    return Err("type parameter must name a value type".into());
                }
                valid_count(ins, 3)?;
                if !ins[0].is_ptr() {
                    return Err(format!("pointer operand must be box or rptr, got {}", ins[0]));
                }
                if ins[1] != pint {
                    return Err(format!("offset operand must be {}, got {}", pint, ins[1]));
                }
                if ins[2] != t {
                    return Err(format!("value operand must be {}, got {}", t, ins[2]));
                }
                Ok(Sig {
                    ty: IrType::None,
                    side_effects: true,
                    mnemonic: synth_mnemonic("store", tps, ins, false),
                })
            }

            InstrKind::GetCtx => {
                no_type_params(tps)?;
                valid_count(ins, 0)?;
                Ok(Sig { ty: IrType::Rptr, side_effects: false, mnemonic: "get_ctx".into() })
            }

            InstrKind::SetCtx => {
                no_type_params(tps)?;
                valid_count(ins, 1)?;
                if ins[0] != IrType::Rptr {
                    return Err(format!("operand must be rptr, got {}", ins[0]));
                }
                Ok(Sig { ty: IrType::None, side_effects: true, mnemonic: "set_ctx".into() })
            }

            InstrKind::Move => {
                no_type_params(tps)?;
                valid_count(ins, 2)?;
                Ok(Sig { ty: IrType::None, side_effects: false, mnemonic: "move".into() })
            }

            InstrKind::Phi => {
                no_type_params(tps)?;
                valid_count(ins, 0)?;
                Ok(Sig { ty: IrType::None, side_effects: false, mnemonic: "phi".into() })
            }
        }
    }
}

/// An IR instruction.
///
/// The `dests` set is the inverse of the use lists: `a` is in `b.dests`
/// exactly when `b` is in `a.uses` and both are instructions. Insertion and
/// removal are set-semantic.
#[derive(Debug, Clone)]
pub struct Instr {
    pub kind: InstrKind,
    /// Output type; `IrType::None` for void instructions and for a phi with
    /// no incoming values yet.
    pub ty: IrType,
    /// Explicit output name; the printer falls back to `$t_<id>`.
    pub out_name: Option<String>,
    pub(crate) mnemonic: String,
    pub type_params: Vec<IrType>,
    pub uses: Vec<ValueId>,
    /// Branch targets, one slot per role. Non-call kinds keep every slot
    /// present; the call family may hold an absent slot before a present
    /// one, and trailing absent slots are trimmed.
    pub targets: Vec<Option<BlockId>>,
    /// Phi only: predecessor block per input, parallel to `uses`.
    pub preds: Vec<BlockId>,
    pub side_effects: bool,
    pub parent: Option<BlockId>,
    pub dests: Vec<ValueId>,
}

impl Instr {
    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    /// An instruction is a branch iff it has targets; `ret` and `throw` are
    /// always terminal.
    pub fn is_branch(&self) -> bool {
        matches!(self.kind, InstrKind::Ret | InstrKind::Throw)
            || self.targets.iter().any(Option::is_some)
    }

    pub fn is_pseudo(&self) -> bool {
        self.kind.is_pseudo()
    }

    pub fn is_phi(&self) -> bool {
        matches!(self.kind, InstrKind::Phi)
    }

    /// Present branch targets in role order.
    pub fn succ_targets(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.targets.iter().filter_map(|t| *t)
    }

    /// Role names for this kind's target slots.
    pub fn target_roles(&self) -> &'static [&'static str] {
        match self.kind.target_spec() {
            TargetSpec::Fixed(roles) | TargetSpec::Optional(roles) => roles,
            TargetSpec::None => &[],
        }
    }

    pub(crate) fn add_dest(&mut self, d: ValueId) {
        if !self.dests.contains(&d) {
            self.dests.push(d);
        }
    }

    pub(crate) fn remove_dest(&mut self, d: ValueId) {
        self.dests.retain(|x| *x != d);
    }

    // --- call continuation/throw target accessors ---

    fn call_slot(&self, role: usize) -> Option<BlockId> {
        assert!(
            matches!(self.kind, InstrKind::Call { .. }),
            "{}: continuation targets exist only on call instructions",
            self.mnemonic
        );
        self.targets.get(role).copied().flatten()
    }

    pub fn cont_target(&self) -> Option<BlockId> {
        self.call_slot(0)
    }

    pub fn throw_target(&self) -> Option<BlockId> {
        self.call_slot(1)
    }

    fn set_call_slot(&mut self, role: usize, t: Option<BlockId>) {
        assert!(
            matches!(self.kind, InstrKind::Call { .. }),
            "{}: continuation targets exist only on call instructions",
            self.mnemonic
        );
        while self.targets.len() <= role {
            self.targets.push(None);
        }
        self.targets[role] = t;
        while self.targets.last() == Some(&None) {
            self.targets.pop();
        }
    }

    pub fn set_cont_target(&mut self, t: Option<BlockId>) {
        self.set_call_slot(0, t);
    }

    pub fn set_throw_target(&mut self, t: Option<BlockId>) {
        self.set_call_slot(1, t);
    }
}

pub(crate) fn wrap_invalid(kind: &InstrKind, reason: String) -> IrError {
    IrError::construction(kind.base_mnemonic(), reason)
}
