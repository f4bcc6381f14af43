//! Edge deletion bookkeeping and the pruned CFG view.
//!
//! The null-pointer analysis never rewrites the graph it is given. It
//! collects impossible edges into a [`NegativeEdges`] set during a single
//! pass over the blocks and then wraps the input graph in a [`PrunedCfg`]
//! that filters the deleted edges out of every query.

use rustc_hash::FxHashSet;

use crate::cfg::{BlockId, CfgEdge, ControlFlowGraph, EdgeKind};

/// The set of CFG edges scheduled for deletion.
///
/// Deletions are keyed by `(source, target, kind)` so that a normal and an
/// exceptional edge between the same pair of blocks can be removed
/// independently. Insertion is idempotent; deleting the same edge twice
/// counts once.
#[derive(Debug, Clone, Default)]
pub struct NegativeEdges {
    deleted: FxHashSet<(BlockId, BlockId, EdgeKind)>,
}

impl NegativeEdges {
    /// Creates an empty deletion set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the edge `from -> to` of the given kind as deleted.
    ///
    /// Returns `true` if the edge was not already marked.
    pub fn delete(&mut self, from: BlockId, to: BlockId, kind: EdgeKind) -> bool {
        self.deleted.insert((from, to, kind))
    }

    /// Returns `true` if the edge is marked as deleted.
    #[must_use]
    pub fn contains(&self, from: BlockId, to: BlockId, kind: EdgeKind) -> bool {
        self.deleted.contains(&(from, to, kind))
    }

    /// Returns the number of deleted edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.deleted.len()
    }

    /// Returns `true` if nothing was deleted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deleted.is_empty()
    }
}

/// A control flow graph with impossible edges filtered out.
///
/// The view shares the node set of the underlying graph — blocks whose
/// every incoming edge was deleted remain present but isolated. All
/// successor and predecessor queries skip deleted edges.
///
/// # Examples
///
/// ```rust
/// use whittle::cfg::{
///     BlockId, CfgEdge, ControlFlowGraph, EdgeKind, NegativeEdges, PrunedCfg,
/// };
///
/// let mut cfg = ControlFlowGraph::new(3);
/// cfg.add_edge(BlockId::new(0), CfgEdge::fallthrough(BlockId::new(1)));
/// cfg.add_edge(BlockId::new(0), CfgEdge::exception(BlockId::new(2)));
///
/// let mut deleted = NegativeEdges::new();
/// deleted.delete(BlockId::new(0), BlockId::new(2), EdgeKind::Exception);
///
/// let pruned = PrunedCfg::new(&cfg, deleted);
/// assert_eq!(pruned.block_count(), cfg.block_count());
/// assert_eq!(pruned.successors(BlockId::new(0)).count(), 1);
/// assert_eq!(pruned.deleted_edge_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct PrunedCfg<'a> {
    cfg: &'a ControlFlowGraph,
    deleted: NegativeEdges,
}

impl<'a> PrunedCfg<'a> {
    /// Wraps `cfg` with the given deletion set.
    #[must_use]
    pub fn new(cfg: &'a ControlFlowGraph, deleted: NegativeEdges) -> Self {
        Self { cfg, deleted }
    }

    /// Wraps `cfg` with nothing deleted; every query matches the input.
    #[must_use]
    pub fn unpruned(cfg: &'a ControlFlowGraph) -> Self {
        Self::new(cfg, NegativeEdges::new())
    }

    /// Returns the underlying unpruned graph.
    #[must_use]
    pub const fn original(&self) -> &'a ControlFlowGraph {
        self.cfg
    }

    /// Returns the entry block.
    #[must_use]
    pub const fn entry(&self) -> BlockId {
        self.cfg.entry()
    }

    /// Returns the number of blocks; always equal to the input's.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.cfg.block_count()
    }

    /// Returns `true` if `block` belongs to the underlying graph.
    #[must_use]
    pub fn contains(&self, block: BlockId) -> bool {
        self.cfg.contains(block)
    }

    /// Returns the number of edges removed from the input graph.
    #[must_use]
    pub fn deleted_edge_count(&self) -> usize {
        self.deleted.len()
    }

    /// Returns the surviving out-edges of `block`.
    pub fn successors(&self, block: BlockId) -> impl Iterator<Item = &CfgEdge> + '_ {
        self.cfg
            .successors(block)
            .iter()
            .filter(move |e| !self.deleted.contains(block, e.target(), e.kind()))
    }

    /// Returns the targets of the surviving non-exceptional out-edges.
    pub fn normal_successors(&self, block: BlockId) -> impl Iterator<Item = BlockId> + '_ {
        self.successors(block)
            .filter(|e| !e.kind().is_exceptional())
            .map(CfgEdge::target)
    }

    /// Returns the targets of the surviving exceptional out-edges.
    pub fn exceptional_successors(&self, block: BlockId) -> impl Iterator<Item = BlockId> + '_ {
        self.successors(block)
            .filter(|e| e.kind().is_exceptional())
            .map(CfgEdge::target)
    }

    /// Returns the predecessors of `block` along surviving edges.
    ///
    /// A block with no surviving predecessors (other than the entry) is
    /// unreachable in the pruned graph.
    pub fn predecessors(&self, block: BlockId) -> impl Iterator<Item = BlockId> + '_ {
        self.cfg
            .in_edges(block)
            .filter(move |&(pred, kind)| !self.deleted.contains(pred, block, kind))
            .map(|(pred, _)| pred)
    }
}
