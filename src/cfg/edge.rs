//! Control flow edge types for the CFG.
//!
//! Edges carry semantic information about how control transfers between
//! blocks. The distinction matters twice over: the solver refines values
//! along the two conditional kinds, and the pruning pass deletes normal
//! versus exceptional edges independently.

use crate::cfg::BlockId;

/// The kind of control flow represented by an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Unconditional control flow (direct jump or fall-through).
    Fallthrough,

    /// The edge taken when a two-way conditional branch evaluates to true.
    ///
    /// When the branch compares a value against the null constant, the
    /// solver refines that value along this edge.
    BranchTaken,

    /// The edge taken when a two-way conditional branch evaluates to false.
    BranchNotTaken,

    /// Exceptional control transfer to a handler or to the method exit.
    ///
    /// These are the edges the null-pointer analysis deletes when the
    /// faulting instruction provably cannot raise.
    Exception,
}

impl EdgeKind {
    /// Returns `true` if this is one of the two conditional branch kinds.
    #[must_use]
    pub const fn is_branch(&self) -> bool {
        matches!(self, Self::BranchTaken | Self::BranchNotTaken)
    }

    /// Returns `true` if this edge models exceptional control transfer.
    #[must_use]
    pub const fn is_exceptional(&self) -> bool {
        matches!(self, Self::Exception)
    }
}

/// An edge in the control flow graph.
///
/// Each edge connects its source block (implicit in the adjacency list) to
/// a target block and carries the kind of transfer it represents.
///
/// # Examples
///
/// ```rust
/// use whittle::cfg::{BlockId, CfgEdge, EdgeKind};
///
/// let edge = CfgEdge::fallthrough(BlockId::new(1));
/// assert_eq!(edge.target(), BlockId::new(1));
/// assert!(!edge.kind().is_exceptional());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CfgEdge {
    /// The target block of this edge.
    target: BlockId,
    /// The kind of control flow this edge represents.
    kind: EdgeKind,
}

impl CfgEdge {
    /// Creates a new edge.
    #[must_use]
    pub const fn new(target: BlockId, kind: EdgeKind) -> Self {
        Self { target, kind }
    }

    /// Returns the target block of this edge.
    #[must_use]
    pub const fn target(&self) -> BlockId {
        self.target
    }

    /// Returns the kind of control flow this edge represents.
    #[must_use]
    pub const fn kind(&self) -> EdgeKind {
        self.kind
    }

    /// Creates an unconditional edge to `target`.
    #[must_use]
    pub const fn fallthrough(target: BlockId) -> Self {
        Self::new(target, EdgeKind::Fallthrough)
    }

    /// Creates the true-branch edge of a conditional to `target`.
    #[must_use]
    pub const fn branch_taken(target: BlockId) -> Self {
        Self::new(target, EdgeKind::BranchTaken)
    }

    /// Creates the false-branch edge of a conditional to `target`.
    #[must_use]
    pub const fn branch_not_taken(target: BlockId) -> Self {
        Self::new(target, EdgeKind::BranchNotTaken)
    }

    /// Creates an exceptional edge to `target`.
    #[must_use]
    pub const fn exception(target: BlockId) -> Self {
        Self::new(target, EdgeKind::Exception)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_kind_classification() {
        assert!(EdgeKind::BranchTaken.is_branch());
        assert!(EdgeKind::BranchNotTaken.is_branch());
        assert!(!EdgeKind::Fallthrough.is_branch());
        assert!(!EdgeKind::Exception.is_branch());

        assert!(EdgeKind::Exception.is_exceptional());
        assert!(!EdgeKind::Fallthrough.is_exceptional());
        assert!(!EdgeKind::BranchTaken.is_exceptional());
    }

    #[test]
    fn edge_constructors() {
        let b = BlockId::new(3);
        assert_eq!(CfgEdge::fallthrough(b).kind(), EdgeKind::Fallthrough);
        assert_eq!(CfgEdge::branch_taken(b).kind(), EdgeKind::BranchTaken);
        assert_eq!(
            CfgEdge::branch_not_taken(b).kind(),
            EdgeKind::BranchNotTaken
        );
        assert_eq!(CfgEdge::exception(b).kind(), EdgeKind::Exception);
        assert_eq!(CfgEdge::exception(b).target(), b);
    }
}
