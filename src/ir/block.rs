//! Basic blocks and CFG edges.
//!
//! A block is an ordered instruction list whose last instruction is the
//! terminator; the terminator's targets define the successor list. Edges
//! are (pred, succ) pairs keyed in [`EdgeMap`], the map shape phi
//! resolution and the emission driver use for merge moves and edge labels.

use rustc_hash::FxHashMap;

use super::value::ValueId;

/// A basic block identifier. A u32 index into the function's block arena;
/// zero-cost to copy and stable across graph mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u32);

impl BlockId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "B{}", self.0)
    }
}

/// A basic block.
#[derive(Debug, Clone)]
pub struct Block {
    pub id: BlockId,
    pub name: String,
    /// Ordered instruction list; the last entry is the terminator once the
    /// block is complete.
    pub instrs: Vec<ValueId>,
    /// Predecessors, filled by [`crate::ir::IrFunction::compute_cfg`].
    pub preds: Vec<BlockId>,
    /// Successors (the terminator's present targets), filled alongside
    /// `preds`.
    pub succs: Vec<BlockId>,
}

impl Block {
    pub(crate) fn new(id: BlockId, name: String) -> Self {
        Block { id, name, instrs: Vec::new(), preds: Vec::new(), succs: Vec::new() }
    }

    /// The terminator slot, if the block has any instruction.
    pub fn last_instr(&self) -> Option<ValueId> {
        self.instrs.last().copied()
    }
}

/// A map keyed by CFG edge. Merge moves and edge-transition labels are both
/// per-edge, so the emission path passes these around instead of raw hash
/// maps.
#[derive(Debug, Clone)]
pub struct EdgeMap<T> {
    entries: FxHashMap<(BlockId, BlockId), T>,
}

impl<T> EdgeMap<T> {
    pub fn new() -> Self {
        EdgeMap { entries: FxHashMap::default() }
    }

    pub fn insert(&mut self, pred: BlockId, succ: BlockId, v: T) -> Option<T> {
        self.entries.insert((pred, succ), v)
    }

    pub fn get(&self, pred: BlockId, succ: BlockId) -> Option<&T> {
        self.entries.get(&(pred, succ))
    }

    pub fn contains(&self, pred: BlockId, succ: BlockId) -> bool {
        self.entries.contains_key(&(pred, succ))
    }

    pub fn iter(&self) -> impl Iterator<Item = (BlockId, BlockId, &T)> {
        self.entries.iter().map(|((p, s), v)| (*p, *s, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for EdgeMap<T> {
    fn default() -> Self {
        Self::new()
    }
}
