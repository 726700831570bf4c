//! The function-level IR graph.
//!
//! An `IrFunction` owns three arenas: values (constants, arguments,
//! instructions, all addressed by [`ValueId`]), and basic blocks (addressed
//! by [`BlockId`]). Cross-links between instructions, their users, and
//! their blocks are stable indices, so the cyclic use/def and block/CFG
//! structure needs no shared ownership.
//!
//! The constant-uniquing table lives here too: a function graph is the
//! explicit compilation session, so constant identity holds within it and
//! concurrent compilation of distinct functions shares no mutable state.

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::common::IrError;
use super::block::{Block, BlockId};
use super::instr::{wrap_invalid, CallKind, Instr, InstrKind, TargetSpec};
use super::types::{IrType, Platform};
use super::value::{ConstKey, ConstLit, ValueData, ValueId};

/// A function under compilation: the value arena, the block list, and the
/// constant pool.
#[derive(Debug)]
pub struct IrFunction {
    pub name: String,
    pub platform: Platform,
    values: Vec<ValueData>,
    blocks: Vec<Block>,
    consts: FxHashMap<ConstKey, FxHashMap<IrType, ValueId>>,
    args: Vec<ValueId>,
}

impl IrFunction {
    pub fn new(name: impl Into<String>, platform: Platform) -> Self {
        IrFunction {
            name: name.into(),
            platform,
            values: Vec::new(),
            blocks: Vec::new(),
            consts: FxHashMap::default(),
            args: Vec::new(),
        }
    }

    // --- value arena ---

    fn alloc(&mut self, data: ValueData) -> ValueId {
        let id = ValueId(self.values.len() as u32);
        self.values.push(data);
        id
    }

    pub fn value(&self, id: ValueId) -> &ValueData {
        &self.values[id.index()]
    }

    pub fn value_type(&self, id: ValueId) -> IrType {
        self.values[id.index()].ty()
    }

    /// The instruction behind `id`. Panics if `id` is not an instruction;
    /// graph bookkeeping that reaches a non-instruction here is broken.
    pub fn instr(&self, id: ValueId) -> &Instr {
        self.values[id.index()]
            .as_instr()
            .unwrap_or_else(|| panic!("value {} is not an instruction", id.0))
    }

    pub fn instr_mut(&mut self, id: ValueId) -> &mut Instr {
        self.values[id.index()]
            .as_instr_mut()
            .unwrap_or_else(|| panic!("value {} is not an instruction", id.0))
    }

    pub fn is_instr(&self, id: ValueId) -> bool {
        self.values[id.index()].is_instr()
    }

    pub fn value_ids(&self) -> impl Iterator<Item = ValueId> {
        (0..self.values.len() as u32).map(ValueId)
    }

    /// The printable name of a value: a constant's literal, an argument's
    /// user-visible name, an instruction's output name or `$t_<id>`.
    pub fn value_name(&self, id: ValueId) -> String {
        match &self.values[id.index()] {
            ValueData::Const { lit, .. } => lit.to_string(),
            ValueData::Arg { name, .. } => name.clone(),
            ValueData::Instr(i) => {
                i.out_name.clone().unwrap_or_else(|| format!("$t_{}", id.0))
            }
        }
    }

    // --- arguments ---

    /// Declare the next formal parameter. The declared type must exist on
    /// the target platform and carry a value, the same rule the constant
    /// factory enforces; an `i64` argument on a 32-bit function is rejected
    /// here, before it can enter the graph.
    pub fn add_arg(&mut self, name: impl Into<String>, ty: IrType) -> Result<ValueId, IrError> {
        let name = name.into();
        if ty == IrType::None || !ty.available_on(self.platform.word) {
            return Err(IrError::BadArgType { name, ty: ty.name() });
        }
        let index = self.args.len();
        let id = self.alloc(ValueData::Arg { name, ty, index });
        self.args.push(id);
        Ok(id)
    }

    pub fn args(&self) -> &[ValueId] {
        &self.args
    }

    // --- constant uniquing ---

    /// The unique constant for `lit` at type `box`.
    pub fn get_const(&mut self, lit: ConstLit) -> Result<ValueId, IrError> {
        self.get_const_typed(lit, IrType::Box)
    }

    /// The unique constant for the (literal, type) pair. Integer types
    /// require whole-number literals, `f64` requires numeric literals, and
    /// strings exist only at `box`. Equal pairs yield the same id.
    pub fn get_const_typed(&mut self, lit: ConstLit, ty: IrType) -> Result<ValueId, IrError> {
        let valid = match ty {
            t if t.is_int() => lit.is_integer(),
            IrType::F64 => lit.is_numeric(),
            IrType::Box => true,
            IrType::Rptr => lit.is_integer(),
            _ => false,
        };
        if !valid || !ty.available_on(self.platform.word) {
            return Err(IrError::BadConstant { literal: lit.to_string(), ty: ty.name() });
        }
        let key = lit.key();
        if let Some(id) = self.consts.get(&key).and_then(|by_ty| by_ty.get(&ty)) {
            return Ok(*id);
        }
        let id = self.alloc(ValueData::Const { lit, ty });
        self.consts.entry(key).or_default().insert(ty, id);
        Ok(id)
    }

    // --- blocks ---

    pub fn add_block(&mut self, name: impl Into<String>) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(Block::new(id, name.into()));
        id
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.index()]
    }

    pub fn block_mut(&mut self, id: BlockId) -> &mut Block {
        &mut self.blocks[id.index()]
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    pub fn block_ids(&self) -> impl Iterator<Item = BlockId> {
        (0..self.blocks.len() as u32).map(BlockId)
    }

    /// The entry block (the first one created).
    pub fn entry(&self) -> Option<BlockId> {
        self.blocks.first().map(|b| b.id)
    }

    pub fn find_block(&self, name: &str) -> Option<BlockId> {
        self.blocks.iter().find(|b| b.name == name).map(|b| b.id)
    }

    // --- instruction construction ---

    /// Build an instruction. `tps` are explicit type parameters, `inputs`
    /// the input values, `targets` the branch targets in role order. The
    /// kind's initialiser validates counts and types and fixes the output
    /// type and side-effect flag; failures are wrapped with the mnemonic.
    ///
    /// The new instruction is an orphan until [`IrFunction::append`] places
    /// it in a block; its use/def links are live immediately.
    pub fn build(
        &mut self,
        kind: InstrKind,
        tps: &[IrType],
        inputs: &[ValueId],
        targets: &[BlockId],
    ) -> Result<ValueId, IrError> {
        match kind.target_spec() {
            TargetSpec::None => {
                if !targets.is_empty() {
                    return Err(wrap_invalid(&kind, "takes no branch targets".into()));
                }
            }
            TargetSpec::Fixed(roles) => {
                if targets.len() != roles.len() {
                    return Err(wrap_invalid(
                        &kind,
                        format!("expected {} target(s), got {}", roles.len(), targets.len()),
                    ));
                }
            }
            TargetSpec::Optional(roles) => {
                if targets.len() > roles.len() {
                    return Err(wrap_invalid(
                        &kind,
                        format!("expected at most {} target(s), got {}", roles.len(), targets.len()),
                    ));
                }
            }
        }
        let in_types: Vec<IrType> = inputs.iter().map(|v| self.value_type(*v)).collect();
        let sig = kind
            .validate(self.platform, tps, &in_types)
            .map_err(|reason| wrap_invalid(&kind, reason))?;
        let instr = Instr {
            kind,
            ty: sig.ty,
            out_name: None,
            mnemonic: sig.mnemonic,
            type_params: tps.to_vec(),
            uses: inputs.to_vec(),
            targets: targets.iter().map(|t| Some(*t)).collect(),
            preds: Vec::new(),
            side_effects: sig.side_effects,
            parent: None,
            dests: Vec::new(),
        };
        let id = self.alloc(ValueData::Instr(instr));
        for u in inputs {
            if self.is_instr(*u) {
                self.instr_mut(*u).add_dest(id);
            }
        }
        trace!(id = id.0, mnemonic = %self.instr(id).mnemonic, "built instruction");
        Ok(id)
    }

    /// Build a call-family instruction with its optional continuation and
    /// throw targets and, for plain calls, the callee's declared return
    /// type when known.
    pub fn build_call(
        &mut self,
        kind: CallKind,
        inputs: &[ValueId],
        ret: Option<IrType>,
        cont: Option<BlockId>,
        throw: Option<BlockId>,
    ) -> Result<ValueId, IrError> {
        let id = self.build(InstrKind::Call { kind, ret }, &[], inputs, &[])?;
        let instr = self.instr_mut(id);
        instr.set_cont_target(cont);
        instr.set_throw_target(throw);
        Ok(id)
    }

    /// Build an empty phi. Its type is `none` until the first incoming
    /// value is added.
    pub fn build_phi(&mut self) -> ValueId {
        self.build(InstrKind::Phi, &[], &[], &[])
            .expect("empty phi construction cannot fail")
    }

    /// Name the output of an instruction (used by lowering for variables
    /// with source-level names).
    pub fn set_out_name(&mut self, id: ValueId, name: impl Into<String>) {
        self.instr_mut(id).out_name = Some(name.into());
    }

    // --- block membership ---

    /// Append an instruction to a block, linking its parent pointer.
    /// Re-registers the instruction in its uses' dest sets, which makes
    /// appending an orphan produced by [`IrFunction::copy_instr`] restore
    /// the use/def symmetry.
    pub fn append(&mut self, block: BlockId, id: ValueId) {
        self.place(block, id, None);
    }

    /// Insert an instruction at `index` within a block (passes use this to
    /// put edge moves ahead of the terminator).
    pub fn insert(&mut self, block: BlockId, index: usize, id: ValueId) {
        self.place(block, id, Some(index));
    }

    fn place(&mut self, block: BlockId, id: ValueId, index: Option<usize>) {
        {
            let instr = self.instr(id);
            assert!(
                instr.parent.is_none(),
                "{}: instruction {} already placed in a block",
                instr.mnemonic,
                id.0
            );
        }
        let uses = self.instr(id).uses.clone();
        for u in uses {
            if self.is_instr(u) {
                self.instr_mut(u).add_dest(id);
            }
        }
        self.instr_mut(id).parent = Some(block);
        match index {
            Some(i) => self.blocks[block.index()].instrs.insert(i, id),
            None => self.blocks[block.index()].instrs.push(id),
        }
    }

    /// Remove an instruction from its block. Its uses drop it from their
    /// dest sets; after this the graph no longer references it.
    pub fn remove_instr(&mut self, id: ValueId) {
        let parent = match self.instr(id).parent {
            Some(b) => b,
            None => panic!("{}: instruction {} is not in a block", self.instr(id).mnemonic, id.0),
        };
        self.blocks[parent.index()].instrs.retain(|x| *x != id);
        let uses = self.instr(id).uses.clone();
        for u in uses {
            if self.is_instr(u) {
                self.instr_mut(u).remove_dest(id);
            }
        }
        self.instr_mut(id).parent = None;
        trace!(id = id.0, "removed instruction");
    }

    // --- in-place rewriting ---

    /// Replace every occurrence of `old` in the instruction's use list with
    /// `new`, keeping the dest sets of both in sync.
    pub fn repl_use(&mut self, id: ValueId, old: ValueId, new: ValueId) {
        let mut replaced = false;
        {
            let instr = self.instr_mut(id);
            for u in instr.uses.iter_mut() {
                if *u == old {
                    *u = new;
                    replaced = true;
                }
            }
        }
        if !replaced {
            return;
        }
        if self.is_instr(old) {
            self.instr_mut(old).remove_dest(id);
        }
        if self.is_instr(new) {
            self.instr_mut(new).add_dest(id);
        }
    }

    /// Replace `old` with `new` in the instruction's dest set
    /// (set-semantic: if `new` is already present, `old` is just dropped).
    pub fn repl_dest(&mut self, id: ValueId, old: ValueId, new: ValueId) {
        let instr = self.instr_mut(id);
        instr.remove_dest(old);
        instr.add_dest(new);
    }

    /// Clone an instruction into an orphan: same kind, mnemonic, type
    /// parameters, uses, targets, and output name, but no parent block and
    /// no dests. The clone gets a fresh id.
    pub fn copy_instr(&mut self, id: ValueId) -> ValueId {
        let mut clone = self.instr(id).clone();
        clone.parent = None;
        clone.dests = Vec::new();
        self.alloc(ValueData::Instr(clone))
    }

    // --- phi bookkeeping ---

    /// Append an incoming (value, predecessor) pair to a phi. The first
    /// incoming value fixes the phi's type; later ones must match it.
    pub fn add_incoming(
        &mut self,
        phi: ValueId,
        value: ValueId,
        pred: BlockId,
    ) -> Result<(), IrError> {
        let vty = self.value_type(value);
        {
            let instr = self.instr(phi);
            assert!(instr.is_phi(), "{}: not a phi", instr.mnemonic);
            if instr.uses.is_empty() {
                if vty == IrType::None {
                    return Err(IrError::PhiTypeMismatch { got: vty.name(), want: "a value type" });
                }
            } else if vty != instr.ty {
                return Err(IrError::PhiTypeMismatch { got: vty.name(), want: instr.ty.name() });
            }
        }
        let instr = self.instr_mut(phi);
        if instr.uses.is_empty() {
            instr.ty = vty;
        }
        instr.uses.push(value);
        instr.preds.push(pred);
        if self.is_instr(value) {
            self.instr_mut(value).add_dest(phi);
        }
        Ok(())
    }

    /// The incoming value flowing from `pred`. Fatal if `pred` is not a
    /// predecessor of the phi.
    pub fn get_incoming(&self, phi: ValueId, pred: BlockId) -> ValueId {
        let instr = self.instr(phi);
        assert!(instr.is_phi(), "{}: not a phi", instr.mnemonic);
        match instr.preds.iter().position(|p| *p == pred) {
            Some(k) => instr.uses[k],
            None => panic!("phi: {} is not a predecessor", pred),
        }
    }

    /// Rewrite the predecessor slot `old` to `new`, leaving the parallel
    /// use untouched. Fatal if `old` is not a predecessor.
    pub fn repl_pred(&mut self, phi: ValueId, old: BlockId, new: BlockId) {
        let instr = self.instr_mut(phi);
        assert!(instr.is_phi(), "{}: not a phi", instr.mnemonic);
        match instr.preds.iter().position(|p| *p == old) {
            Some(k) => instr.preds[k] = new,
            None => panic!("phi: {} is not a predecessor", old),
        }
    }

    // --- CFG maintenance ---

    /// Recompute every block's predecessor and successor list from the
    /// terminators. Idempotent; passes call it after CFG surgery.
    pub fn compute_cfg(&mut self) {
        for b in &mut self.blocks {
            b.preds.clear();
            b.succs.clear();
        }
        let mut edges: Vec<(BlockId, BlockId)> = Vec::new();
        for b in &self.blocks {
            if let Some(last) = b.last_instr() {
                for succ in self.instr(last).succ_targets() {
                    if !edges.contains(&(b.id, succ)) {
                        edges.push((b.id, succ));
                    }
                }
            }
        }
        for (pred, succ) in edges {
            self.blocks[pred.index()].succs.push(succ);
            self.blocks[succ.index()].preds.push(pred);
        }
    }

    // --- verification ---

    /// Check the graph invariants: use/def symmetry, phi arity and type
    /// uniformity, terminator placement, and each instruction's output type
    /// against its family rule. Returns human-readable violations; empty
    /// means the graph is well formed.
    pub fn verify(&self) -> Vec<String> {
        let mut bad = Vec::new();
        for id in self.value_ids() {
            let instr = match self.value(id).as_instr() {
                Some(i) => i,
                None => continue,
            };
            // use -> dest
            for u in &instr.uses {
                if let Some(used) = self.value(*u).as_instr() {
                    if !used.dests.contains(&id) {
                        bad.push(format!(
                            "{} ({}): use {} does not list it as a dest",
                            instr.mnemonic, id.0, u.0
                        ));
                    }
                }
            }
            // dest -> use
            for d in &instr.dests {
                if !self.instr(*d).uses.contains(&id) {
                    bad.push(format!(
                        "{} ({}): dest {} does not use it",
                        instr.mnemonic, id.0, d.0
                    ));
                }
            }
            if instr.is_phi() {
                if instr.uses.len() != instr.preds.len() {
                    bad.push(format!(
                        "phi ({}): {} uses but {} predecessors",
                        id.0,
                        instr.uses.len(),
                        instr.preds.len()
                    ));
                }
                for u in &instr.uses {
                    if self.value_type(*u) != instr.ty {
                        bad.push(format!(
                            "phi ({}): incoming type {} differs from phi type {}",
                            id.0,
                            self.value_type(*u),
                            instr.ty
                        ));
                    }
                }
            } else {
                // Re-run the family rule against the current input types.
                let in_types: Vec<IrType> =
                    instr.uses.iter().map(|u| self.value_type(*u)).collect();
                match instr.kind.validate(self.platform, &instr.type_params, &in_types) {
                    Ok(sig) => {
                        if sig.ty != instr.ty {
                            bad.push(format!(
                                "{} ({}): output type {} violates family rule (expected {})",
                                instr.mnemonic, id.0, instr.ty, sig.ty
                            ));
                        }
                    }
                    Err(reason) => {
                        bad.push(format!("{} ({}): {}", instr.mnemonic, id.0, reason));
                    }
                }
            }
        }
        for b in &self.blocks {
            for (i, id) in b.instrs.iter().enumerate() {
                let instr = self.instr(*id);
                let last = i + 1 == b.instrs.len();
                if last && !instr.is_branch() {
                    bad.push(format!("block {}: final instruction {} is not a branch", b.name, id.0));
                }
                if !last && instr.is_branch() {
                    bad.push(format!(
                        "block {}: non-terminal instruction {} is a branch",
                        b.name, id.0
                    ));
                }
                if instr.parent != Some(b.id) {
                    bad.push(format!(
                        "block {}: instruction {} has parent {:?}",
                        b.name, id.0, instr.parent
                    ));
                }
            }
        }
        bad
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::instr::HirOp;
    use crate::ir::ops::{ArithOp, CmpOp};
    use crate::ir::types::WordSize;

    fn func() -> IrFunction {
        IrFunction::new("test", Platform::new(WordSize::W64))
    }

    #[test]
    fn constants_are_uniqued_per_literal_and_type() {
        let mut f = func();
        let a = f.get_const_typed(ConstLit::Int(0), IrType::Box).unwrap();
        let b = f.get_const_typed(ConstLit::Int(0), IrType::Box).unwrap();
        let c = f.get_const_typed(ConstLit::Int(0), IrType::I32).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(f.value_type(a), IrType::Box);
        assert_eq!(f.value_type(c), IrType::I32);
    }

    #[test]
    fn constant_typing_rules() {
        let mut f = func();
        assert!(f.get_const_typed(ConstLit::Num(1.5), IrType::I32).is_err());
        assert!(f.get_const_typed(ConstLit::Num(2.0), IrType::I32).is_ok());
        assert!(f.get_const_typed(ConstLit::Num(1.5), IrType::F64).is_ok());
        assert!(f.get_const_typed(ConstLit::Str("s".into()), IrType::I64).is_err());
        assert!(f.get_const_typed(ConstLit::Str("s".into()), IrType::F64).is_err());
        assert!(f.get_const(ConstLit::Str("s".into())).is_ok());
        assert!(f.get_const_typed(ConstLit::Int(1), IrType::None).is_err());
    }

    #[test]
    fn sixty_four_bit_constants_rejected_on_32bit() {
        let mut f = IrFunction::new("t32", Platform::new(WordSize::W32));
        assert!(f.get_const_typed(ConstLit::Int(1), IrType::I64).is_err());
        assert!(f.get_const_typed(ConstLit::Int(1), IrType::I32).is_ok());
        assert_eq!(f.platform.pint(), IrType::I32);
    }

    #[test]
    fn arguments_obey_the_platform_lattice() {
        let mut narrow = IrFunction::new("t32", Platform::new(WordSize::W32));
        let err = narrow.add_arg("a", IrType::I64).unwrap_err();
        assert!(err.to_string().contains("cannot have type i64"), "{}", err);
        assert!(narrow.add_arg("a", IrType::U64).is_err());
        assert!(narrow.add_arg("a", IrType::I32).is_ok());
        assert!(narrow.add_arg("b", IrType::Box).is_ok());
        // `none` never names an argument, on any platform.
        let mut wide = IrFunction::new("t64", Platform::new(WordSize::W64));
        assert!(wide.add_arg("v", IrType::None).is_err());
        assert!(wide.add_arg("v", IrType::I64).is_ok());
    }

    #[test]
    fn use_def_links_stay_symmetric() {
        let mut f = func();
        let a = f.add_arg("a", IrType::I64).unwrap();
        let b = f.add_arg("b", IrType::I64).unwrap();
        let x = f.build(InstrKind::Arith(ArithOp::Add), &[], &[a, b], &[]).unwrap();
        let y = f.build(InstrKind::Arith(ArithOp::Mul), &[], &[x, x], &[]).unwrap();
        assert_eq!(f.instr(x).dests, vec![y]);
        assert_eq!(f.instr(y).uses, vec![x, x]);

        let z = f.build(InstrKind::Arith(ArithOp::Sub), &[], &[a, b], &[]).unwrap();
        f.repl_use(y, x, z);
        assert_eq!(f.instr(y).uses, vec![z, z]);
        assert!(f.instr(x).dests.is_empty());
        assert_eq!(f.instr(z).dests, vec![y]);
    }

    #[test]
    fn repl_dest_mirrors_repl_use() {
        let mut f = func();
        let a = f.add_arg("a", IrType::I64).unwrap();
        let b = f.add_arg("b", IrType::I64).unwrap();
        let x = f.build(InstrKind::Arith(ArithOp::Add), &[], &[a, b], &[]).unwrap();
        let y = f.build(InstrKind::Arith(ArithOp::Mul), &[], &[x, x], &[]).unwrap();
        let w = f.build(InstrKind::Arith(ArithOp::Sub), &[], &[x, x], &[]).unwrap();
        assert_eq!(f.instr(x).dests, vec![y, w]);
        f.repl_dest(x, y, w);
        assert_eq!(f.instr(x).dests, vec![w]);
    }

    #[test]
    fn removal_unlinks_uses() {
        let mut f = func();
        let bb = f.add_block("entry");
        let a = f.add_arg("a", IrType::I64).unwrap();
        let b = f.add_arg("b", IrType::I64).unwrap();
        let x = f.build(InstrKind::Arith(ArithOp::Add), &[], &[a, b], &[]).unwrap();
        let y = f.build(InstrKind::Arith(ArithOp::Mul), &[], &[x, b], &[]).unwrap();
        f.append(bb, x);
        f.append(bb, y);
        f.remove_instr(y);
        assert!(f.instr(x).dests.is_empty());
        assert!(f.instr(y).parent.is_none());
        assert_eq!(f.block(bb).instrs, vec![x]);
    }

    #[test]
    fn copies_are_orphans_until_appended() {
        let mut f = func();
        let bb = f.add_block("entry");
        let a = f.add_arg("a", IrType::I64).unwrap();
        let b = f.add_arg("b", IrType::I64).unwrap();
        let x = f.build(InstrKind::Arith(ArithOp::Add), &[], &[a, b], &[]).unwrap();
        f.set_out_name(x, "sum");
        f.append(bb, x);

        let c = f.copy_instr(x);
        assert_ne!(c, x);
        let (orig, copy) = (f.instr(x), f.instr(c));
        assert_eq!(copy.mnemonic(), orig.mnemonic());
        assert_eq!(copy.uses, orig.uses);
        assert_eq!(copy.targets, orig.targets);
        assert_eq!(copy.type_params, orig.type_params);
        assert_eq!(copy.out_name.as_deref(), Some("sum"));
        assert!(copy.parent.is_none());
        assert!(copy.dests.is_empty());

        let y = f.build(InstrKind::Arith(ArithOp::Mul), &[], &[x, x], &[]).unwrap();
        f.append(bb, y);
        // Appending the clone restores use/def symmetry for it too.
        let bb2 = f.add_block("tail");
        f.append(bb2, c);
        assert!(f.verify().iter().all(|v| !v.contains("does not list")), "{:?}", f.verify());
    }

    #[test]
    fn phi_type_grows_from_first_incoming() {
        let mut f = func();
        let p1 = f.add_block("p1");
        let p2 = f.add_block("p2");
        let phi = f.build_phi();
        assert_eq!(f.instr(phi).ty, IrType::None);

        let v1 = f.add_arg("v1", IrType::Box).unwrap();
        f.add_incoming(phi, v1, p1).unwrap();
        assert_eq!(f.instr(phi).ty, IrType::Box);

        let v2 = f.add_arg("v2", IrType::I32).unwrap();
        let err = f.add_incoming(phi, v2, p2).unwrap_err();
        assert!(err.to_string().contains("does not match"), "{}", err);

        let v3 = f.add_arg("v3", IrType::Box).unwrap();
        f.add_incoming(phi, v3, p2).unwrap();
        assert_eq!(f.get_incoming(phi, p1), v1);
        assert_eq!(f.get_incoming(phi, p2), v3);

        let p3 = f.add_block("p3");
        f.repl_pred(phi, p1, p3);
        assert_eq!(f.get_incoming(phi, p3), v1);
        // The parallel use is untouched.
        assert_eq!(f.instr(phi).uses, vec![v1, v3]);
    }

    #[test]
    #[should_panic(expected = "not a predecessor")]
    fn get_incoming_unknown_pred_is_fatal() {
        let mut f = func();
        let p1 = f.add_block("p1");
        let p2 = f.add_block("p2");
        let phi = f.build_phi();
        let v = f.add_arg("v", IrType::Box).unwrap();
        f.add_incoming(phi, v, p1).unwrap();
        f.get_incoming(phi, p2);
    }

    #[test]
    #[should_panic(expected = "not a predecessor")]
    fn repl_pred_unknown_pred_is_fatal() {
        let mut f = func();
        let p1 = f.add_block("p1");
        let p2 = f.add_block("p2");
        let phi = f.build_phi();
        let v = f.add_arg("v", IrType::Box).unwrap();
        f.add_incoming(phi, v, p1).unwrap();
        f.repl_pred(phi, p2, p1);
    }

    #[test]
    fn phi_dest_linkage() {
        let mut f = func();
        let p1 = f.add_block("p1");
        let a = f.add_arg("a", IrType::I64).unwrap();
        let b = f.add_arg("b", IrType::I64).unwrap();
        let x = f.build(InstrKind::Arith(ArithOp::Add), &[], &[a, b], &[]).unwrap();
        let phi = f.build_phi();
        f.add_incoming(phi, x, p1).unwrap();
        assert_eq!(f.instr(x).dests, vec![phi]);
    }

    #[test]
    fn cfg_follows_terminator_targets() {
        let mut f = func();
        let entry = f.add_block("entry");
        let then_b = f.add_block("then_b");
        let else_b = f.add_block("else_b");
        let c = f.add_arg("c", IrType::Box).unwrap();

        let br = f.build(InstrKind::If(CmpOp::Neq), &[], &[c], &[then_b, else_b]).unwrap();
        f.append(entry, br);
        let r1 = f.build(InstrKind::Ret, &[], &[c], &[]).unwrap();
        f.append(then_b, r1);
        let r2 = f.build(InstrKind::Ret, &[], &[c], &[]).unwrap();
        f.append(else_b, r2);

        f.compute_cfg();
        assert_eq!(f.block(entry).succs, vec![then_b, else_b]);
        assert_eq!(f.block(then_b).preds, vec![entry]);
        assert_eq!(f.block(else_b).preds, vec![entry]);
        assert!(f.verify().is_empty(), "{:?}", f.verify());
    }

    #[test]
    fn verify_flags_misplaced_branches() {
        let mut f = func();
        let entry = f.add_block("entry");
        let next = f.add_block("next");
        let c = f.add_arg("c", IrType::Box).unwrap();
        let jump = f.build(InstrKind::Jump, &[], &[], &[next]).unwrap();
        let lnot = f.build(InstrKind::Hir(HirOp::LogNot), &[], &[c], &[]).unwrap();
        f.append(entry, jump);
        f.append(entry, lnot);
        let bad = f.verify();
        assert!(bad.iter().any(|v| v.contains("not a branch")), "{:?}", bad);
        assert!(bad.iter().any(|v| v.contains("is a branch")), "{:?}", bad);
    }

    #[test]
    fn verify_flags_broken_dest_sets() {
        let mut f = func();
        let a = f.add_arg("a", IrType::I64).unwrap();
        let b = f.add_arg("b", IrType::I64).unwrap();
        let x = f.build(InstrKind::Arith(ArithOp::Add), &[], &[a, b], &[]).unwrap();
        let y = f.build(InstrKind::Arith(ArithOp::Mul), &[], &[x, x], &[]).unwrap();
        f.instr_mut(x).dests.clear();
        let bad = f.verify();
        assert!(bad.iter().any(|v| v.contains("does not list")), "{:?}", bad);
        let _ = y;
    }
}

#[cfg(test)]
mod prop_tests {
    use proptest::prelude::*;

    use super::*;
    use crate::ir::ops::ArithOp;
    use crate::ir::types::WordSize;
    use crate::ir::value::ConstLit;

    fn arith_op() -> impl Strategy<Value = ArithOp> {
        prop_oneof![
            Just(ArithOp::Add),
            Just(ArithOp::Sub),
            Just(ArithOp::Mul),
            Just(ArithOp::Div),
            Just(ArithOp::Mod),
        ]
    }

    proptest! {
        /// Random chains of arithmetic over a growing value pool keep the
        /// use/def links symmetric and every output type on the family rule.
        #[test]
        fn random_graphs_stay_well_formed(
            ops in prop::collection::vec((arith_op(), any::<prop::sample::Index>(), any::<prop::sample::Index>()), 1..40),
        ) {
            let mut f = IrFunction::new("p", Platform::new(WordSize::W64));
            let mut pool = vec![
                f.add_arg("a", IrType::I64).unwrap(),
                f.add_arg("b", IrType::I64).unwrap(),
                f.get_const_typed(ConstLit::Int(7), IrType::I64).unwrap(),
            ];
            for (op, i, j) in ops {
                let x = pool[i.index(pool.len())];
                let y = pool[j.index(pool.len())];
                let id = f.build(InstrKind::Arith(op), &[], &[x, y], &[]).unwrap();
                pool.push(id);
            }
            prop_assert!(f.verify().is_empty());
        }

        /// The constant factory is idempotent per (literal, type) pair and
        /// never aliases across types.
        #[test]
        fn constant_uniquing_is_stable(lits in prop::collection::vec(any::<i64>(), 1..50)) {
            let mut f = IrFunction::new("c", Platform::new(WordSize::W64));
            for v in &lits {
                let boxed = f.get_const_typed(ConstLit::Int(*v), IrType::Box).unwrap();
                let int = f.get_const_typed(ConstLit::Int(*v), IrType::I64).unwrap();
                let boxed2 = f.get_const_typed(ConstLit::Int(*v), IrType::Box).unwrap();
                prop_assert_eq!(boxed, boxed2);
                prop_assert_ne!(boxed, int);
            }
        }

        /// Phi nodes accept only their established type and keep the
        /// parallel arrays in step.
        #[test]
        fn phi_arrays_stay_parallel(n in 1usize..12) {
            let mut f = IrFunction::new("phi", Platform::new(WordSize::W64));
            let phi = f.build_phi();
            for k in 0..n {
                let p = f.add_block(format!("p{}", k));
                let v = f.add_arg(format!("v{}", k), IrType::Box).unwrap();
                f.add_incoming(phi, v, p).unwrap();
            }
            let bad = f.add_arg("bad", IrType::I32).unwrap();
            let p = f.add_block("pbad");
            prop_assert!(f.add_incoming(phi, bad, p).is_err());
            let instr = f.instr(phi);
            prop_assert_eq!(instr.uses.len(), n);
            prop_assert_eq!(instr.preds.len(), n);
            prop_assert_eq!(instr.ty, IrType::Box);
        }
    }
}
