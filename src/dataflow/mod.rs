//! The abstract domain of the null-pointer analysis.
//!
//! This module defines the lattice machinery: the semi-lattice traits, the
//! four-point [`NullState`] element tracked per SSA value, and the
//! [`NullPointerState`] block state mapping every value of a method to an
//! element.
//!
//! # The domain
//!
//! Per SSA value the analysis tracks one of four facts:
//!
//! ```text
//!            MaybeNull            (top - could be anything)
//!           /         \
//!     NeverNull     AlwaysNull
//!           \         /
//!            Unknown              (bottom - unreachable so far)
//! ```
//!
//! The lattice has height 3, so pointwise joins over a method's finite
//! value set converge quickly.

mod lattice;
mod state;

pub use lattice::{JoinSemiLattice, MeetSemiLattice, NullState};
pub use state::{NullPointerState, ParameterState};
