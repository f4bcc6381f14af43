//! Lattice traits and the four-point null-state domain.
//!
//! A lattice defines how abstract values combine when control flow merges.
//! The traits here are deliberately small: the solver only ever needs join
//! (at block joins) and meet (for branch-scoped refinement), plus the two
//! bound predicates.

use std::fmt;
use std::fmt::Debug;

use strum::{EnumCount, EnumIter};

/// A join semi-lattice: least upper bound plus a top test.
///
/// `join` must be idempotent, commutative, and associative. The solver
/// relies on join being monotone: joining can only move a value up toward
/// top, which is what bounds the fixpoint iteration.
pub trait JoinSemiLattice: Clone + Debug + PartialEq {
    /// Computes the least upper bound of two elements.
    #[must_use]
    fn join(&self, other: &Self) -> Self;

    /// Returns `true` if this is the top element (no usable information).
    fn is_top(&self) -> bool;
}

/// A meet semi-lattice: greatest lower bound plus a bottom test.
///
/// Meet is the dual of join; the null-pointer analysis uses it only for
/// branch-sensitive refinement, where a guard *narrows* what a value can
/// be along one edge.
pub trait MeetSemiLattice: Clone + Debug + PartialEq {
    /// Computes the greatest lower bound of two elements.
    #[must_use]
    fn meet(&self, other: &Self) -> Self;

    /// Returns `true` if this is the bottom element.
    fn is_bottom(&self) -> bool;
}

/// The nullness of one SSA value.
///
/// `Unknown` doubles as the unreachable-so-far state: a value keeps it
/// until some path actually defines or constrains it. A contradictory
/// refinement (e.g. a never-null value guarded by `== null`) meets back
/// down to `Unknown`, which correctly marks the guarded edge as
/// infeasible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumCount, EnumIter)]
pub enum NullState {
    /// No path has constrained this value yet (bottom).
    #[default]
    Unknown,
    /// The value is a non-null reference on every path.
    NeverNull,
    /// The value is the null reference on every path.
    AlwaysNull,
    /// Paths disagree; the value may or may not be null (top).
    MaybeNull,
}

impl NullState {
    /// Returns `true` for [`NullState::NeverNull`].
    #[must_use]
    pub const fn is_never_null(self) -> bool {
        matches!(self, Self::NeverNull)
    }

    /// Returns `true` for [`NullState::AlwaysNull`].
    #[must_use]
    pub const fn is_always_null(self) -> bool {
        matches!(self, Self::AlwaysNull)
    }
}

impl JoinSemiLattice for NullState {
    fn join(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Unknown, x) | (x, Self::Unknown) => *x,
            (Self::MaybeNull, _) | (_, Self::MaybeNull) => Self::MaybeNull,
            (Self::NeverNull, Self::NeverNull) => Self::NeverNull,
            (Self::AlwaysNull, Self::AlwaysNull) => Self::AlwaysNull,
            (Self::NeverNull, Self::AlwaysNull) | (Self::AlwaysNull, Self::NeverNull) => {
                Self::MaybeNull
            }
        }
    }

    fn is_top(&self) -> bool {
        matches!(self, Self::MaybeNull)
    }
}

impl MeetSemiLattice for NullState {
    fn meet(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::MaybeNull, x) | (x, Self::MaybeNull) => *x,
            (Self::Unknown, _) | (_, Self::Unknown) => Self::Unknown,
            (Self::NeverNull, Self::NeverNull) => Self::NeverNull,
            (Self::AlwaysNull, Self::AlwaysNull) => Self::AlwaysNull,
            (Self::NeverNull, Self::AlwaysNull) | (Self::AlwaysNull, Self::NeverNull) => {
                Self::Unknown
            }
        }
    }

    fn is_bottom(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl fmt::Display for NullState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unknown => "unknown",
            Self::NeverNull => "never-null",
            Self::AlwaysNull => "always-null",
            Self::MaybeNull => "maybe-null",
        };
        f.write_str(s)
    }
}
