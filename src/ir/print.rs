//! Textual IR: pretty-printing and the block-scoped reader.
//!
//! The printed form is a diagnostic surface, not a serialisation format:
//!
//! ```text
//! <type> <name> = <mnemonic> <operand>, ... <role> <target> ...
//! ```
//!
//! Phi rows print their incoming pairs as `[<value> <predName>]`, and the
//! LIR move prints `move <src>, <dst>`. Instructions with no output omit
//! the `<type> <name> =` head. The reader re-parses one printed instruction
//! with operand names resolved against a caller-supplied scope; round-trip
//! tests rely on print-then-read yielding a structurally equal instruction.

use rustc_hash::FxHashMap;

use super::block::BlockId;
use super::func::IrFunction;
use super::instr::{CallKind, HirOp, InstrKind, TargetSpec};
use super::ops::{ArithOp, BitOp, CmpOp};
use super::types::IrType;
use super::value::{ConstLit, ValueId};

impl IrFunction {
    /// Render one instruction in the textual form.
    pub fn print_instr(&self, id: ValueId) -> String {
        let instr = self.instr(id);
        let mut s = String::new();
        if instr.ty != IrType::None {
            s.push_str(instr.ty.name());
            s.push(' ');
            s.push_str(&self.value_name(id));
            s.push_str(" = ");
        }
        s.push_str(instr.mnemonic());
        if instr.is_phi() {
            for (k, (u, p)) in instr.uses.iter().zip(instr.preds.iter()).enumerate() {
                s.push_str(if k == 0 { " " } else { ", " });
                s.push('[');
                s.push_str(&self.value_name(*u));
                s.push(' ');
                s.push_str(&self.block(*p).name);
                s.push(']');
            }
            return s;
        }
        for (k, u) in instr.uses.iter().enumerate() {
            s.push_str(if k == 0 { " " } else { ", " });
            s.push_str(&self.value_name(*u));
        }
        let roles = instr.target_roles();
        for (k, t) in instr.targets.iter().enumerate() {
            if let Some(t) = t {
                s.push(' ');
                if !roles[k].is_empty() {
                    s.push_str(roles[k]);
                    s.push(' ');
                }
                s.push_str(&self.block(*t).name);
            }
        }
        s
    }

    /// Render a whole block: label line plus indented instructions.
    pub fn print_block(&self, id: BlockId) -> String {
        let b = self.block(id);
        let mut s = format!("{}:\n", b.name);
        for i in &b.instrs {
            s.push_str("  ");
            s.push_str(&self.print_instr(*i));
            s.push('\n');
        }
        s
    }

    /// Render the whole function.
    pub fn print(&self) -> String {
        let mut s = format!("function {}(", self.name);
        for (k, a) in self.args().iter().enumerate() {
            if k > 0 {
                s.push_str(", ");
            }
            s.push_str(self.value_type(*a).name());
            s.push(' ');
            s.push_str(&self.value_name(*a));
        }
        s.push_str(")\n");
        for b in self.block_ids() {
            s.push_str(&self.print_block(b));
        }
        s
    }
}

/// Resolve a printed mnemonic back to its kind plus explicit type
/// parameters. Suffix type tokens that merely echo a uniform input type are
/// reported separately so constant operands can be re-typed.
fn resolve_mnemonic(m: &str) -> Option<(InstrKind, Vec<IrType>, Option<IrType>)> {
    // Fixed mnemonics first.
    for op in HirOp::all() {
        if m == op.mnemonic() {
            return Some((InstrKind::Hir(*op), Vec::new(), None));
        }
    }
    match m {
        "jump" => return Some((InstrKind::Jump, Vec::new(), None)),
        "ret" => return Some((InstrKind::Ret, Vec::new(), None)),
        "throw" => return Some((InstrKind::Throw, Vec::new(), None)),
        "move" => return Some((InstrKind::Move, Vec::new(), None)),
        "phi" => return Some((InstrKind::Phi, Vec::new(), None)),
        "get_ctx" => return Some((InstrKind::GetCtx, Vec::new(), None)),
        "set_ctx" => return Some((InstrKind::SetCtx, Vec::new(), None)),
        "if" => return Some((InstrKind::If(CmpOp::Neq), Vec::new(), None)),
        "call" => {
            return Some((InstrKind::Call { kind: CallKind::Call, ret: None }, Vec::new(), None))
        }
        "construct" => {
            return Some((
                InstrKind::Call { kind: CallKind::Construct, ret: None },
                Vec::new(),
                None,
            ))
        }
        "get_prop_val" => {
            return Some((
                InstrKind::Call { kind: CallKind::GetPropVal, ret: None },
                Vec::new(),
                None,
            ))
        }
        "put_prop_val" => {
            return Some((
                InstrKind::Call { kind: CallKind::PutPropVal, ret: None },
                Vec::new(),
                None,
            ))
        }
        _ => {}
    }
    if let Some(tok) = m.strip_prefix("if_").and_then(CmpOp::from_mnemonic) {
        return Some((InstrKind::If(tok), Vec::new(), None));
    }
    // Kinds whose suffix is an explicit type parameter.
    let tp_kinds: &[(&str, fn() -> InstrKind)] = &[
        ("unbox", || InstrKind::Unbox),
        ("box", || InstrKind::BoxVal),
        ("icast", || InstrKind::ICast),
        ("itof", || InstrKind::IToF),
        ("ftoi", || InstrKind::FToI),
        ("load", || InstrKind::Load),
        ("store", || InstrKind::Store),
    ];
    for (base, make) in tp_kinds {
        if let Some(rest) = m.strip_prefix(base) {
            if rest.is_empty() {
                return Some((make(), Vec::new(), None));
            }
            if let Some(ty) = rest.strip_prefix('_').and_then(IrType::from_name) {
                return Some((make(), vec![ty], None));
            }
        }
    }
    // Families whose suffix echoes the uniform input type. Longest base
    // first so `add_ovf_i64` does not resolve as `add` with junk.
    let mut bases: Vec<(String, InstrKind)> = Vec::new();
    for op in [ArithOp::Add, ArithOp::Sub, ArithOp::Mul, ArithOp::Div, ArithOp::Mod] {
        bases.push((op.mnemonic().to_string(), InstrKind::Arith(op)));
        if op.has_ovf_form() {
            bases.push((format!("{}_ovf", op.mnemonic()), InstrKind::ArithOvf(op)));
        }
    }
    for op in [BitOp::And, BitOp::Or, BitOp::Xor, BitOp::Lsft, BitOp::Rsft, BitOp::Ursft] {
        bases.push((op.mnemonic().to_string(), InstrKind::Bit(op)));
    }
    bases.push(("not".to_string(), InstrKind::BitNot));
    for op in [
        CmpOp::Lt,
        CmpOp::Lte,
        CmpOp::Gt,
        CmpOp::Gte,
        CmpOp::Eq,
        CmpOp::Neq,
        CmpOp::Seq,
        CmpOp::Nseq,
    ] {
        bases.push((op.mnemonic().to_string(), InstrKind::Cmp(op)));
    }
    bases.sort_by_key(|(b, _)| std::cmp::Reverse(b.len()));
    for (base, kind) in bases {
        if m == base {
            return Some((kind, Vec::new(), None));
        }
        if let Some(rest) = m.strip_prefix(&base) {
            // Remaining tokens must all be type names; the last one is the
            // uniform input type for constant re-typing.
            let toks: Vec<&str> = rest.split('_').filter(|t| !t.is_empty()).collect();
            if !toks.is_empty() {
                let mut tys = Vec::new();
                let mut ok = true;
                for t in &toks {
                    match IrType::from_name(t) {
                        Some(ty) => tys.push(ty),
                        None => {
                            ok = false;
                            break;
                        }
                    }
                }
                if ok {
                    return Some((kind, Vec::new(), tys.last().copied()));
                }
            }
        }
    }
    None
}

/// Names in scope when re-parsing a printed instruction: the values of the
/// enclosing block's scope keyed by printed name, and the blocks of the
/// function keyed by block name (resolved through the function itself).
pub struct ReadScope {
    pub values: FxHashMap<String, ValueId>,
}

impl ReadScope {
    pub fn new() -> Self {
        ReadScope { values: FxHashMap::default() }
    }

    pub fn bind(&mut self, name: impl Into<String>, v: ValueId) {
        self.values.insert(name.into(), v);
    }
}

impl Default for ReadScope {
    fn default() -> Self {
        Self::new()
    }
}

/// Re-parse one printed instruction inside `f`, resolving operand names
/// through `scope` and block names through the function. Returns the newly
/// built (orphan) instruction.
pub fn parse_instr(f: &mut IrFunction, line: &str, scope: &ReadScope) -> Result<ValueId, String> {
    let line = line.trim();
    let (head, rhs) = match line.split_once(" = ") {
        Some((head, rhs)) => (Some(head), rhs),
        None => (None, line),
    };
    let out_name = match head {
        Some(h) => {
            let mut it = h.split_whitespace();
            let ty = it.next().ok_or("missing output type")?;
            IrType::from_name(ty).ok_or_else(|| format!("unknown type {}", ty))?;
            let name = it.next().ok_or("missing output name")?;
            Some(name.to_string())
        }
        None => None,
    };
    let (mnemonic, rest) = match rhs.split_once(' ') {
        Some((m, r)) => (m, r.trim()),
        None => (rhs, ""),
    };
    let (kind, tps, uniform) =
        resolve_mnemonic(mnemonic).ok_or_else(|| format!("unknown mnemonic {}", mnemonic))?;

    if matches!(kind, InstrKind::Phi) {
        let phi = f.build_phi();
        for part in rest.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let inner = part
                .strip_prefix('[')
                .and_then(|p| p.strip_suffix(']'))
                .ok_or_else(|| format!("malformed phi row {}", part))?;
            let (vname, pname) =
                inner.rsplit_once(' ').ok_or_else(|| format!("malformed phi row {}", part))?;
            let v = resolve_operand(f, scope, vname.trim(), None)?;
            let p = f
                .find_block(pname.trim())
                .ok_or_else(|| format!("unknown block {}", pname))?;
            f.add_incoming(phi, v, p).map_err(|e| e.to_string())?;
        }
        return Ok(phi);
    }

    // Split the tail into operand text and role/target pairs. Roles are
    // word tokens outside commas; the jump form has a bare target.
    let roles: &[&str] = match kind.target_spec() {
        TargetSpec::Fixed(r) | TargetSpec::Optional(r) => r,
        TargetSpec::None => &[],
    };
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    let mut split_at = tokens.len();
    for (i, t) in tokens.iter().enumerate() {
        if roles.iter().any(|r| !r.is_empty() && r == t) {
            split_at = i;
            break;
        }
    }
    let mut targets: Vec<BlockId> = Vec::new();
    let mut role_targets: Vec<(usize, BlockId)> = Vec::new();
    if roles.len() == 1 && roles[0].is_empty() {
        // jump <block>
        let bname = tokens.last().ok_or("missing jump target")?;
        split_at = tokens.len() - 1;
        targets
            .push(f.find_block(bname).ok_or_else(|| format!("unknown block {}", bname))?);
    } else {
        let mut i = split_at;
        while i < tokens.len() {
            let role = tokens[i];
            let bname = tokens.get(i + 1).ok_or_else(|| format!("role {} missing target", role))?;
            let ri = roles
                .iter()
                .position(|r| *r == role)
                .ok_or_else(|| format!("unknown target role {}", role))?;
            let block =
                f.find_block(bname).ok_or_else(|| format!("unknown block {}", bname))?;
            targets.push(block);
            role_targets.push((ri, block));
            i += 2;
        }
    }
    let opnd_text = tokens[..split_at].join(" ");
    let pint = f.platform.pint();
    // Memory operands are positional: the offset is always the platform
    // integer and a store's value takes the type parameter; everywhere else
    // constants take the mnemonic's uniform input type.
    let operand_ty = |idx: usize| -> Option<IrType> {
        match kind {
            InstrKind::Load if idx == 1 => Some(pint),
            InstrKind::Store if idx == 1 => Some(pint),
            InstrKind::Store if idx == 2 => tps.first().copied(),
            _ => uniform,
        }
    };
    let mut inputs = Vec::new();
    for (idx, part) in
        opnd_text.split(',').map(str::trim).filter(|p| !p.is_empty()).enumerate()
    {
        inputs.push(resolve_operand(f, scope, part, operand_ty(idx))?);
    }

    // Call targets are optional per role, so they are assigned by role
    // rather than by position; everything else is positional.
    let is_call = matches!(kind, InstrKind::Call { .. });
    let build_targets: &[BlockId] = if is_call { &[] } else { &targets };
    let id = f.build(kind, &tps, &inputs, build_targets).map_err(|e| e.to_string())?;
    if is_call {
        for (ri, block) in role_targets {
            match ri {
                0 => f.instr_mut(id).set_cont_target(Some(block)),
                _ => f.instr_mut(id).set_throw_target(Some(block)),
            }
        }
    }
    if let Some(name) = out_name {
        if !name.starts_with("$t_") {
            f.set_out_name(id, name);
        }
    }
    Ok(id)
}

/// Resolve one printed operand: a scope name, or a literal. Integer
/// literals take the mnemonic's uniform input type when it has one, else
/// `box`; decimal literals are `f64` numbers at `box` unless the uniform
/// type is `f64`.
fn resolve_operand(
    f: &mut IrFunction,
    scope: &ReadScope,
    text: &str,
    uniform: Option<IrType>,
) -> Result<ValueId, String> {
    if let Some(v) = scope.values.get(text) {
        return Ok(*v);
    }
    if text == "undef" {
        return f.get_const(ConstLit::Undef).map_err(|e| e.to_string());
    }
    if text.starts_with('"') {
        let inner: String = unescape_str(text)?;
        return f.get_const(ConstLit::Str(inner)).map_err(|e| e.to_string());
    }
    if let Ok(v) = text.parse::<i64>() {
        let ty = uniform.unwrap_or(IrType::Box);
        return f.get_const_typed(ConstLit::Int(v), ty).map_err(|e| e.to_string());
    }
    if let Ok(v) = text.parse::<f64>() {
        let ty = match uniform {
            Some(IrType::F64) => IrType::F64,
            _ => IrType::Box,
        };
        return f.get_const_typed(ConstLit::Num(v), ty).map_err(|e| e.to_string());
    }
    Err(format!("unresolved operand {}", text))
}

/// Minimal unescape for the printer's `{:?}` string form.
fn unescape_str(text: &str) -> Result<String, String> {
    let inner = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .ok_or_else(|| format!("malformed string literal {}", text))?;
    let mut out = String::new();
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('\\') => out.push('\\'),
                Some('"') => out.push('"'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => return Err("dangling escape".into()),
            }
        } else {
            out.push(c);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ops::ArithOp;
    use crate::ir::types::{Platform, WordSize};
    use crate::ir::IrFunction;

    fn func() -> IrFunction {
        IrFunction::new("test", Platform::new(WordSize::W64))
    }

    /// Print an instruction, re-parse it, and require structural equality.
    fn round_trip(f: &mut IrFunction, id: ValueId, scope: &ReadScope) -> ValueId {
        let line = f.print_instr(id);
        let re = parse_instr(f, &line, scope).unwrap_or_else(|e| panic!("{}: {}", line, e));
        let (a, b) = (f.instr(id), f.instr(re));
        assert_eq!(a.mnemonic(), b.mnemonic(), "{}", line);
        assert_eq!(a.ty, b.ty, "{}", line);
        assert_eq!(a.type_params, b.type_params, "{}", line);
        assert_eq!(a.uses, b.uses, "{}", line);
        assert_eq!(a.targets, b.targets, "{}", line);
        assert_eq!(a.preds, b.preds, "{}", line);
        re
    }

    #[test]
    fn prints_the_documented_shape() {
        let mut f = func();
        let a = f.get_const_typed(ConstLit::Int(1), IrType::I32).unwrap();
        let b = f.get_const_typed(ConstLit::Int(2), IrType::I32).unwrap();
        let add = f.build(InstrKind::Arith(ArithOp::Add), &[], &[a, b], &[]).unwrap();
        assert_eq!(f.print_instr(add), format!("i32 $t_{} = add_i32 1, 2", add.0));

        let t = f.add_block("t");
        let e = f.add_block("e");
        let x = f.add_arg("x", IrType::I64).unwrap();
        let y = f.add_arg("y", IrType::I64).unwrap();
        let br = f.build(InstrKind::If(CmpOp::Lt), &[], &[x, y], &[t, e]).unwrap();
        assert_eq!(f.print_instr(br), "if_lt x, y then t else e");

        let jump = f.build(InstrKind::Jump, &[], &[], &[t]).unwrap();
        assert_eq!(f.print_instr(jump), "jump t");

        let mv = f.build(InstrKind::Move, &[], &[x, y], &[]).unwrap();
        assert_eq!(f.print_instr(mv), "move x, y");
    }

    #[test]
    fn phi_prints_incoming_pairs() {
        let mut f = func();
        let p1 = f.add_block("left");
        let p2 = f.add_block("right");
        let v1 = f.add_arg("v1", IrType::Box).unwrap();
        let v2 = f.add_arg("v2", IrType::Box).unwrap();
        let phi = f.build_phi();
        f.add_incoming(phi, v1, p1).unwrap();
        f.add_incoming(phi, v2, p2).unwrap();
        assert_eq!(f.print_instr(phi), format!("box $t_{} = phi [v1 left], [v2 right]", phi.0));
    }

    #[test]
    fn named_outputs_survive() {
        let mut f = func();
        let a = f.add_arg("a", IrType::I64).unwrap();
        let b = f.add_arg("b", IrType::I64).unwrap();
        let add = f.build(InstrKind::Arith(ArithOp::Add), &[], &[a, b], &[]).unwrap();
        f.set_out_name(add, "sum");
        assert_eq!(f.print_instr(add), "i64 sum = add_i64 a, b");
    }

    #[test]
    fn round_trips_ordinary_instructions() {
        let mut f = func();
        let mut scope = ReadScope::new();
        let a = f.add_arg("a", IrType::I64).unwrap();
        let b = f.add_arg("b", IrType::I64).unwrap();
        scope.bind("a", a);
        scope.bind("b", b);

        let add = f.build(InstrKind::Arith(ArithOp::Add), &[], &[a, b], &[]).unwrap();
        round_trip(&mut f, add, &scope);

        let k = f.get_const_typed(ConstLit::Int(3), IrType::I64).unwrap();
        let mul = f.build(InstrKind::Arith(ArithOp::Mul), &[], &[a, k], &[]).unwrap();
        round_trip(&mut f, mul, &scope);

        let lt = f.build(InstrKind::Cmp(CmpOp::Lt), &[], &[a, b], &[]).unwrap();
        round_trip(&mut f, lt, &scope);

        let bx = f.add_arg("bx", IrType::Box).unwrap();
        scope.bind("bx", bx);
        let un = f.build(InstrKind::Unbox, &[IrType::I64], &[bx], &[]).unwrap();
        round_trip(&mut f, un, &scope);

        let tof = f.build(InstrKind::IToF, &[IrType::F64], &[a], &[]).unwrap();
        round_trip(&mut f, tof, &scope);

        let ret = f.build(InstrKind::Ret, &[], &[bx], &[]).unwrap();
        round_trip(&mut f, ret, &scope);
    }

    #[test]
    fn round_trips_branches_and_phis() {
        let mut f = func();
        let mut scope = ReadScope::new();
        let t = f.add_block("t");
        let e = f.add_block("e");
        let x = f.add_arg("x", IrType::I64).unwrap();
        let y = f.add_arg("y", IrType::I64).unwrap();
        scope.bind("x", x);
        scope.bind("y", y);

        let br = f.build(InstrKind::If(CmpOp::Lt), &[], &[x, y], &[t, e]).unwrap();
        round_trip(&mut f, br, &scope);

        let jump = f.build(InstrKind::Jump, &[], &[], &[t]).unwrap();
        round_trip(&mut f, jump, &scope);

        let n = f.add_block("n");
        let o = f.add_block("o");
        let ovf = f.build(InstrKind::ArithOvf(ArithOp::Add), &[], &[x, y], &[n, o]).unwrap();
        round_trip(&mut f, ovf, &scope);

        let bv = f.add_arg("bv", IrType::Box).unwrap();
        scope.bind("bv", bv);
        let throw = f.build(InstrKind::Throw, &[], &[bv], &[t]).unwrap();
        round_trip(&mut f, throw, &scope);

        let call = f
            .build_call(CallKind::Call, &[bv, bv], None, Some(t), Some(e))
            .unwrap();
        round_trip(&mut f, call, &scope);

        let v2 = f.add_arg("v2", IrType::Box).unwrap();
        scope.bind("v2", v2);
        let phi = f.build_phi();
        f.add_incoming(phi, bv, t).unwrap();
        f.add_incoming(phi, v2, e).unwrap();
        scope.bind("bv", bv);
        round_trip(&mut f, phi, &scope);
    }

    #[test]
    fn round_trips_memory_ops() {
        let mut f = func();
        let mut scope = ReadScope::new();
        let p = f.add_arg("p", IrType::Rptr).unwrap();
        let v = f.add_arg("v", IrType::I32).unwrap();
        scope.bind("p", p);
        scope.bind("v", v);
        let off = f.get_const_typed(ConstLit::Int(8), IrType::I64).unwrap();

        let load = f.build(InstrKind::Load, &[IrType::I32], &[p, off], &[]).unwrap();
        round_trip(&mut f, load, &scope);

        let store = f.build(InstrKind::Store, &[IrType::I32], &[p, off, v], &[]).unwrap();
        round_trip(&mut f, store, &scope);
    }

    #[test]
    fn function_print_includes_blocks_and_args() {
        let mut f = func();
        let entry = f.add_block("entry");
        let x = f.add_arg("x", IrType::Box).unwrap();
        let ret = f.build(InstrKind::Ret, &[], &[x], &[]).unwrap();
        f.append(entry, ret);
        let text = f.print();
        assert!(text.starts_with("function test(box x)\n"), "{}", text);
        assert!(text.contains("entry:\n  ret x\n"), "{}", text);
    }

    #[test]
    fn reader_rejects_unknown_names() {
        let mut f = func();
        let scope = ReadScope::new();
        assert!(parse_instr(&mut f, "box $t_9 = log_not ghost", &scope).is_err());
        assert!(parse_instr(&mut f, "i64 $t_9 = bogus_i64 1, 2", &scope).is_err());
    }
}
