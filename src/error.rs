use thiserror::Error;

use crate::cfg::BlockId;

/// The generic Error type, covering every failure the analyses in this
/// library can report.
///
/// The analyses are deliberately conservative: conditions like an empty IR,
/// a block with nothing to prune, or a callee with too few parameters are
/// *not* errors and yield the conservative answer instead (unpruned CFG,
/// base context). Only genuine misuse, cancellation, and IR inconsistencies
/// surface as an [`Error`].
///
/// # Examples
///
/// ```rust
/// use whittle::{Error, Result};
///
/// fn check(result: Result<usize>) {
///     match result {
///         Ok(count) => println!("{count} edges deleted"),
///         Err(Error::NotRun) => eprintln!("call run() first"),
///         Err(e) => eprintln!("analysis failed: {e}"),
///     }
/// }
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The analysis was interrupted by its progress monitor.
    ///
    /// The solver polls the caller-supplied monitor between worklist steps
    /// and abandons the fixpoint iteration as soon as cancellation is
    /// signalled. A cancelled analysis leaves no results behind; accessors
    /// keep failing with [`Error::NotRun`] until a later `run` completes.
    #[error("analysis cancelled by progress monitor")]
    Cancelled,

    /// A result accessor was invoked before the analysis ran to completion.
    ///
    /// The pruned CFG, deleted-edge count, and per-block states only exist
    /// after a successful `run`.
    #[error("analysis has not been run yet (call run() first)")]
    NotRun,

    /// A block reference does not belong to the control flow graph under
    /// analysis.
    #[error("block {0} is not part of the control flow graph")]
    UnknownBlock(BlockId),

    /// The edge-pruning pass was dispatched on an instruction that cannot
    /// throw.
    ///
    /// This indicates an inconsistency between the IR and the CFG: the
    /// block carries exceptional successors, but none of its instructions
    /// declare an exceptional exit.
    #[error("block {0}: pruning dispatched on a non-throwing instruction")]
    NotThrowing(BlockId),
}

/// Result type alias used throughout this library.
pub type Result<T> = core::result::Result<T, Error>;
