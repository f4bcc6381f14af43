//! The control flow graph consumed by the analyses.
//!
//! Blocks are dense indices; edges live in per-block adjacency lists with
//! cached predecessor lists for backward queries. Block 0 is the entry.
//!
//! The analyses never mutate a graph they are handed. All pruning happens
//! through [`NegativeEdges`](crate::cfg::NegativeEdges) and the
//! [`PrunedCfg`](crate::cfg::PrunedCfg) view.

use crate::cfg::{BlockId, CfgEdge, EdgeKind};

/// A control flow graph over dense block ids.
///
/// A graph is built once — [`new`](Self::new) with the block count, then
/// [`add_edge`](Self::add_edge) per transfer — and queried read-only from
/// then on. Parallel edges of different kinds between the same pair of
/// blocks are permitted (a block commonly has both a normal and an
/// exceptional edge to distinct targets, and occasionally to the same
/// target).
///
/// # Examples
///
/// ```rust
/// use whittle::cfg::{BlockId, CfgEdge, ControlFlowGraph};
///
/// // B0 -> B1 (normal), B0 -> B2 (exceptional)
/// let mut cfg = ControlFlowGraph::new(3);
/// cfg.add_edge(BlockId::new(0), CfgEdge::fallthrough(BlockId::new(1)));
/// cfg.add_edge(BlockId::new(0), CfgEdge::exception(BlockId::new(2)));
///
/// let entry = cfg.entry();
/// assert_eq!(cfg.normal_successors(entry).count(), 1);
/// assert_eq!(cfg.exceptional_successors(entry).count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ControlFlowGraph {
    /// Out-edges per block, indexed by block id.
    edges: Vec<Vec<CfgEdge>>,
    /// Cached predecessor lists, one entry per incoming edge.
    predecessors: Vec<Vec<BlockId>>,
    /// Cached incoming edges as `(source, kind)` pairs.
    incoming: Vec<Vec<(BlockId, EdgeKind)>>,
}

impl ControlFlowGraph {
    /// Creates a graph with `block_count` blocks and no edges.
    ///
    /// Block 0 is the entry block.
    #[must_use]
    pub fn new(block_count: usize) -> Self {
        Self {
            edges: vec![Vec::new(); block_count],
            predecessors: vec![Vec::new(); block_count],
            incoming: vec![Vec::new(); block_count],
        }
    }

    /// Adds an edge leaving `from`.
    ///
    /// # Panics
    ///
    /// Panics if `from` or the edge target lies outside the block range;
    /// graphs are constructed from trusted front-end output and a stray
    /// index is a construction bug, not a recoverable condition.
    pub fn add_edge(&mut self, from: BlockId, edge: CfgEdge) {
        assert!(
            from.index() < self.edges.len() && edge.target().index() < self.edges.len(),
            "edge {from} -> {} outside block range",
            edge.target()
        );
        self.predecessors[edge.target().index()].push(from);
        self.incoming[edge.target().index()].push((from, edge.kind()));
        self.edges[from.index()].push(edge);
    }

    /// Returns the entry block.
    #[must_use]
    pub const fn entry(&self) -> BlockId {
        BlockId::new(0)
    }

    /// Returns the number of blocks.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns the total number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(Vec::len).sum()
    }

    /// Returns `true` if `block` belongs to this graph.
    #[must_use]
    pub fn contains(&self, block: BlockId) -> bool {
        block.index() < self.edges.len()
    }

    /// Returns an iterator over all block ids.
    pub fn blocks(&self) -> impl Iterator<Item = BlockId> {
        (0..self.edges.len()).map(BlockId::new)
    }

    /// Returns the out-edges of `block`.
    #[must_use]
    pub fn successors(&self, block: BlockId) -> &[CfgEdge] {
        self.edges.get(block.index()).map_or(&[], Vec::as_slice)
    }

    /// Returns the targets of the non-exceptional out-edges of `block`.
    pub fn normal_successors(&self, block: BlockId) -> impl Iterator<Item = BlockId> + '_ {
        self.successors(block)
            .iter()
            .filter(|e| !e.kind().is_exceptional())
            .map(CfgEdge::target)
    }

    /// Returns the targets of the exceptional out-edges of `block`.
    pub fn exceptional_successors(&self, block: BlockId) -> impl Iterator<Item = BlockId> + '_ {
        self.successors(block)
            .iter()
            .filter(|e| e.kind().is_exceptional())
            .map(CfgEdge::target)
    }

    /// Returns the predecessors of `block`, one entry per incoming edge.
    #[must_use]
    pub fn predecessors(&self, block: BlockId) -> &[BlockId] {
        self.predecessors
            .get(block.index())
            .map_or(&[], Vec::as_slice)
    }

    /// Returns the incoming edges of `block` as `(source, kind)` pairs,
    /// one per edge.
    pub fn in_edges(&self, block: BlockId) -> impl Iterator<Item = (BlockId, EdgeKind)> + '_ {
        self.incoming
            .get(block.index())
            .map_or(&[][..], Vec::as_slice)
            .iter()
            .copied()
    }

    /// Returns the blocks in reverse postorder from the entry.
    ///
    /// Reverse postorder visits a block before its successors (loops
    /// aside), which keeps the forward solver's worklist short. Blocks
    /// unreachable from the entry are appended after the ordered prefix so
    /// every block is visited at least once.
    #[must_use]
    pub fn reverse_postorder(&self) -> Vec<BlockId> {
        let n = self.edges.len();
        let mut visited = vec![false; n];
        let mut order = Vec::with_capacity(n);

        if n > 0 {
            // Iterative DFS; the explicit stack carries the next out-edge
            // index to resume from.
            let mut stack: Vec<(usize, usize)> = vec![(0, 0)];
            visited[0] = true;
            while let Some(top) = stack.len().checked_sub(1) {
                let (block, next) = stack[top];
                if let Some(edge) = self.edges[block].get(next) {
                    stack[top].1 += 1;
                    let t = edge.target().index();
                    if !visited[t] {
                        visited[t] = true;
                        stack.push((t, 0));
                    }
                } else {
                    stack.pop();
                    order.push(BlockId::new(block));
                }
            }
        }

        order.reverse();
        for (idx, seen) in visited.iter().enumerate() {
            if !seen {
                order.push(BlockId::new(idx));
            }
        }
        order
    }
}
