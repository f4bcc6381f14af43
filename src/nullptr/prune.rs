//! The edge-pruning pass: turn solved states into deleted edges.
//!
//! For each block, the pass looks at the instruction responsible for the
//! block's exceptional successors and asks two questions:
//!
//! - After subtracting the ignored exceptions, is the null-pointer error
//!   the *only* way this instruction can fail? If so, a never-null
//!   reference kills the exceptional edges and an always-null reference
//!   kills the normal ones.
//! - Can the instruction fail at all? Allocations and static invokes
//!   dereference nothing; when their remaining exception set is empty,
//!   their exceptional edges die unconditionally.
//!
//! Invokes get the careful treatment: even with a non-null receiver the
//! callee may throw on its own, so both questions defer to the
//! method-summary oracle and an absent oracle keeps every edge.
//!
//! The pass is a single sweep over the blocks in arbitrary order;
//! deletions land in a [`NegativeEdges`] set and are applied as one filter
//! afterwards, so deleting the same edge twice is harmless.

use crate::cfg::{BlockId, ControlFlowGraph, NegativeEdges};
use crate::dataflow::NullPointerState;
use crate::ir::{ExceptionSet, IrBlock, IrOp};
use crate::{Error, Result};

use super::MethodState;

/// Collects the impossible edges of one method.
pub(crate) struct NegativeCfgBuilder<'a> {
    cfg: &'a ControlFlowGraph,
    ignore_exceptions: ExceptionSet,
    method_state: Option<&'a dyn MethodState>,
    deleted: NegativeEdges,
}

impl<'a> NegativeCfgBuilder<'a> {
    pub(crate) fn new(
        cfg: &'a ControlFlowGraph,
        ignore_exceptions: ExceptionSet,
        method_state: Option<&'a dyn MethodState>,
    ) -> Self {
        Self {
            cfg,
            ignore_exceptions,
            method_state,
            deleted: NegativeEdges::new(),
        }
    }

    /// Visits one block with its solved IN state.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownBlock`] if the block is not part of the CFG.
    pub(crate) fn visit(&mut self, block: &IrBlock, state: &NullPointerState) -> Result<()> {
        if !self.cfg.contains(block.id()) {
            return Err(Error::UnknownBlock(block.id()));
        }
        match block.throwing_instruction() {
            Some(op) => self.dispatch(block.id(), op, state),
            None => Ok(()),
        }
    }

    /// Consumes the builder, yielding the collected deletions.
    pub(crate) fn into_negative_edges(self) -> NegativeEdges {
        self.deleted
    }

    fn dispatch(&mut self, block: BlockId, op: &IrOp, state: &NullPointerState) -> Result<()> {
        if !op.may_throw() {
            return Err(Error::NotThrowing(block));
        }

        // A cast of null succeeds, so nullness decides nothing here.
        if matches!(op, IrOp::CheckCast { .. }) {
            return Ok(());
        }

        match op.dereferenced_ref() {
            Some(reference) => {
                if self.only_null_pointer(op) {
                    if state.is_never_null(reference) {
                        self.delete_exceptional(block);
                    } else if state.is_always_null(reference) {
                        self.delete_normal(block);
                    }
                }
            }
            // Allocations and static invokes: no reference to test, but a
            // remaining exception set of nothing means the exceptional
            // edges are unreachable.
            None => {
                if self.no_exceptions(op) {
                    self.delete_exceptional(block);
                }
            }
        }
        Ok(())
    }

    /// Is the null-pointer error the only remaining failure mode?
    ///
    /// For invokes the declared set is meaningless; only a negative
    /// answer from the oracle rules out exceptions thrown inside the
    /// callee.
    fn only_null_pointer(&self, op: &IrOp) -> bool {
        if op.is_invoke() {
            self.method_state
                .is_some_and(|summary| !summary.throws_exception(op))
        } else {
            op.declared_exceptions() - self.ignore_exceptions == ExceptionSet::NULL_POINTER
        }
    }

    /// Can the instruction fail at all, once ignored exceptions are
    /// subtracted?
    fn no_exceptions(&self, op: &IrOp) -> bool {
        if op.is_invoke() {
            self.method_state
                .is_some_and(|summary| !summary.throws_exception(op))
        } else {
            (op.declared_exceptions() - self.ignore_exceptions).is_empty()
        }
    }

    fn delete_exceptional(&mut self, block: BlockId) {
        for edge in self.cfg.successors(block) {
            if edge.kind().is_exceptional() {
                self.deleted.delete(block, edge.target(), edge.kind());
            }
        }
    }

    fn delete_normal(&mut self, block: BlockId) {
        for edge in self.cfg.successors(block) {
            if !edge.kind().is_exceptional() {
                self.deleted.delete(block, edge.target(), edge.kind());
            }
        }
    }
}
