//! Intraprocedural null-dereference analysis and CFG pruning.
//!
//! Given a method's SSA IR and its control flow graph, this analysis
//! computes, for every basic block, which SSA values are definitely null,
//! never null, maybe null, or not yet reachable — then deletes the CFG
//! edges that correspond to impossible control transfers:
//!
//! - an instruction whose dereferenced reference is *never null* and whose
//!   only remaining failure mode is the null-pointer error cannot take its
//!   exceptional edges;
//! - an instruction whose dereferenced reference is *always null* cannot
//!   complete normally, so its normal edges die instead.
//!
//! The input CFG is never mutated; the result is a
//! [`PrunedCfg`](crate::cfg::PrunedCfg) view with the same node set and
//! fewer edges.
//!
//! # Usage
//!
//! ```rust
//! use whittle::cfg::{BlockId, CfgEdge, ControlFlowGraph};
//! use whittle::dataflow::{NullState, ParameterState};
//! use whittle::ir::{ExceptionSet, FieldId, IrBlock, IrFunction, IrOp, MethodRef};
//! use whittle::nullptr::NullPointerAnalysis;
//! use whittle::progress::NeverCancel;
//!
//! // fn m(x) { return x.f; }  with x known never-null
//! let mut func = IrFunction::new(MethodRef::new(1), 1);
//! let x = func.symbols().parameter_value(0);
//! let loaded = func.symbols_mut().fresh_value();
//! let mut entry = IrBlock::new(BlockId::new(0));
//! entry.push(IrOp::GetField {
//!     dest: loaded,
//!     object: x,
//!     field: FieldId::new(0),
//!     exceptions: ExceptionSet::NULL_POINTER,
//! });
//! entry.push(IrOp::Return { value: Some(loaded) });
//! func.add_block(entry);
//!
//! let mut cfg = ControlFlowGraph::new(2);
//! cfg.add_edge(BlockId::new(0), CfgEdge::exception(BlockId::new(1)));
//!
//! let mut params = ParameterState::unknown(1);
//! params.set(0, NullState::NeverNull);
//!
//! let mut analysis =
//!     NullPointerAnalysis::new(&func, &cfg, ExceptionSet::empty(), params, None);
//! analysis.run(&NeverCancel).unwrap();
//! assert_eq!(analysis.deleted_edge_count().unwrap(), 1);
//! ```

mod prune;
mod solver;
mod transfer;

use crate::cfg::{BlockId, ControlFlowGraph, PrunedCfg};
use crate::dataflow::{NullPointerState, ParameterState};
use crate::ir::{ExceptionSet, IrFunction, IrOp};
use crate::progress::ProgressMonitor;
use crate::{Error, Result};

use self::prune::NegativeCfgBuilder;
use self::solver::NullPointerSolver;

/// Method-summary oracle: does an invoked callee itself throw?
///
/// A non-null receiver does *not* make an invoke safe — the callee may
/// dereference null internally. Only a negative answer from this oracle
/// lets the pruning pass delete an invoke's exceptional edges. When no
/// oracle is supplied, every callee is assumed to throw.
pub trait MethodState {
    /// Returns `true` if the callee invoked by `invoke` may throw any
    /// exception.
    fn throws_exception(&self, invoke: &IrOp) -> bool;
}

/// The intraprocedural null-pointer analysis for one method.
///
/// Create it with the method's IR and CFG, [`run`](Self::run) it once,
/// then query [`pruned_cfg`](Self::pruned_cfg),
/// [`deleted_edge_count`](Self::deleted_edge_count), and
/// [`state`](Self::state). Running again is a no-op; querying before a
/// successful run fails with [`Error::NotRun`].
pub struct NullPointerAnalysis<'a> {
    ir: &'a IrFunction,
    cfg: &'a ControlFlowGraph,
    ignore_exceptions: ExceptionSet,
    parameters: ParameterState,
    method_state: Option<&'a dyn MethodState>,
    solver: Option<NullPointerSolver<'a>>,
    pruned: Option<PrunedCfg<'a>>,
}

impl<'a> NullPointerAnalysis<'a> {
    /// Creates the analysis.
    ///
    /// # Arguments
    ///
    /// * `ir` - The method's SSA IR; may be empty.
    /// * `cfg` - The method's CFG; block ids must agree with the IR's.
    /// * `ignore_exceptions` - Exception kinds to subtract from every
    ///   instruction's declared set before judging prunability.
    /// * `parameters` - Caller-supplied initial nullness per parameter.
    /// * `method_state` - Optional method-summary oracle for invokes.
    #[must_use]
    pub fn new(
        ir: &'a IrFunction,
        cfg: &'a ControlFlowGraph,
        ignore_exceptions: ExceptionSet,
        parameters: ParameterState,
        method_state: Option<&'a dyn MethodState>,
    ) -> Self {
        Self {
            ir,
            cfg,
            ignore_exceptions,
            parameters,
            method_state,
            solver: None,
            pruned: None,
        }
    }

    /// Runs the analysis: solve to a fixpoint, then collect impossible
    /// edges.
    ///
    /// An empty IR short-circuits — the pruned CFG equals the input and no
    /// edges are deleted. A second call after a successful run returns
    /// immediately with the same results.
    ///
    /// # Errors
    ///
    /// [`Error::Cancelled`] when the progress monitor cancels the solve;
    /// the analysis stays un-run. [`Error::UnknownBlock`] /
    /// [`Error::NotThrowing`] signal IR/CFG inconsistencies.
    pub fn run(&mut self, progress: &dyn ProgressMonitor) -> Result<()> {
        if self.pruned.is_some() {
            return Ok(());
        }

        if self.ir.is_empty() {
            self.pruned = Some(PrunedCfg::unpruned(self.cfg));
            return Ok(());
        }

        let mut solver = NullPointerSolver::new(self.ir, self.cfg, &self.parameters);
        solver.solve(progress)?;

        let mut builder =
            NegativeCfgBuilder::new(self.cfg, self.ignore_exceptions, self.method_state);
        for block in self.ir.blocks() {
            if !self.cfg.contains(block.id()) {
                return Err(Error::UnknownBlock(block.id()));
            }
            builder.visit(block, solver.in_state(block.id()))?;
        }

        self.pruned = Some(PrunedCfg::new(self.cfg, builder.into_negative_edges()));
        self.solver = Some(solver);
        Ok(())
    }

    /// Returns the pruned CFG.
    ///
    /// # Errors
    ///
    /// [`Error::NotRun`] if the analysis has not completed.
    pub fn pruned_cfg(&self) -> Result<&PrunedCfg<'a>> {
        self.pruned.as_ref().ok_or(Error::NotRun)
    }

    /// Returns the number of edges removed from the input CFG.
    ///
    /// Zero when nothing could be pruned or the IR was empty.
    ///
    /// # Errors
    ///
    /// [`Error::NotRun`] if the analysis has not completed.
    pub fn deleted_edge_count(&self) -> Result<usize> {
        self.pruned
            .as_ref()
            .map(PrunedCfg::deleted_edge_count)
            .ok_or(Error::NotRun)
    }

    /// Returns the IN state of `block`: what holds on entry to the block
    /// on every path that reaches it.
    ///
    /// For an empty IR the state is freshly seeded from the parameter
    /// state, since nothing in the method could have changed it.
    ///
    /// # Errors
    ///
    /// [`Error::NotRun`] before a successful run,
    /// [`Error::UnknownBlock`] if `block` is not part of the CFG.
    pub fn state(&self, block: BlockId) -> Result<NullPointerState> {
        if self.pruned.is_none() {
            return Err(Error::NotRun);
        }
        if !self.cfg.contains(block) {
            return Err(Error::UnknownBlock(block));
        }
        match &self.solver {
            Some(solver) => Ok(solver.in_state(block).clone()),
            None => Ok(NullPointerState::seeded(
                self.ir.symbols(),
                &self.parameters,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::CfgEdge;
    use crate::ir::{IrBlock, MethodRef};
    use crate::progress::{CancelFlag, NeverCancel};

    fn empty_method() -> (IrFunction, ControlFlowGraph) {
        let func = IrFunction::new(MethodRef::new(1), 1);
        let mut cfg = ControlFlowGraph::new(2);
        cfg.add_edge(BlockId::new(0), CfgEdge::fallthrough(BlockId::new(1)));
        (func, cfg)
    }

    #[test]
    fn accessors_fail_before_run() {
        let (func, cfg) = empty_method();
        let analysis = NullPointerAnalysis::new(
            &func,
            &cfg,
            ExceptionSet::empty(),
            ParameterState::default(),
            None,
        );
        assert_eq!(analysis.pruned_cfg().unwrap_err(), Error::NotRun);
        assert_eq!(analysis.deleted_edge_count().unwrap_err(), Error::NotRun);
        assert_eq!(analysis.state(BlockId::new(0)).unwrap_err(), Error::NotRun);
    }

    #[test]
    fn empty_ir_short_circuits() {
        let (func, cfg) = empty_method();
        let mut analysis = NullPointerAnalysis::new(
            &func,
            &cfg,
            ExceptionSet::empty(),
            ParameterState::default(),
            None,
        );
        analysis.run(&NeverCancel).unwrap();

        assert_eq!(analysis.deleted_edge_count().unwrap(), 0);
        let pruned = analysis.pruned_cfg().unwrap();
        assert_eq!(pruned.block_count(), cfg.block_count());
        assert_eq!(pruned.successors(BlockId::new(0)).count(), 1);

        // States come freshly seeded.
        let state = analysis.state(BlockId::new(1)).unwrap();
        assert_eq!(state.len(), func.symbols().max_value_number() + 1);
    }

    #[test]
    fn unknown_block_is_an_argument_error() {
        let (func, cfg) = empty_method();
        let mut analysis = NullPointerAnalysis::new(
            &func,
            &cfg,
            ExceptionSet::empty(),
            ParameterState::default(),
            None,
        );
        analysis.run(&NeverCancel).unwrap();
        assert_eq!(
            analysis.state(BlockId::new(9)).unwrap_err(),
            Error::UnknownBlock(BlockId::new(9))
        );
    }

    #[test]
    fn cancellation_leaves_the_analysis_unrun() {
        // A method with a body, so the solver actually runs.
        let mut func = IrFunction::new(MethodRef::new(1), 1);
        let mut entry = IrBlock::new(BlockId::new(0));
        entry.push(IrOp::Return { value: None });
        func.add_block(entry);
        let cfg = ControlFlowGraph::new(1);

        let flag = CancelFlag::new();
        flag.cancel();

        let mut analysis = NullPointerAnalysis::new(
            &func,
            &cfg,
            ExceptionSet::empty(),
            ParameterState::default(),
            None,
        );
        assert_eq!(analysis.run(&flag).unwrap_err(), Error::Cancelled);
        assert_eq!(analysis.pruned_cfg().unwrap_err(), Error::NotRun);
    }
}
