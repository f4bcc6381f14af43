//! The forward, edge-sensitive worklist solver.
//!
//! # Algorithm
//!
//! The solver keeps one IN state per block and treats OUT states as
//! transient, recomputed per outgoing edge whenever a block is visited:
//!
//! 1. Seed the entry IN from the symbol table and the caller's parameter
//!    state; every other IN starts at bottom (unreachable so far).
//! 2. Visit blocks in reverse postorder; for each, push the IN through the
//!    block's instructions to obtain the base OUT.
//! 3. For every outgoing edge, clone the base OUT and specialise it:
//!    branch edges of a null test refine the tested value, the target's
//!    π-nodes bind their edge-scoped copies, and the target's φ-nodes
//!    receive this edge's operand state.
//! 4. Join the specialised state into the target's IN; re-enqueue the
//!    target when the join changed anything.
//!
//! IN states only ever move up the lattice, so the iteration terminates
//! after at most height x values x blocks joins. The progress monitor is
//! polled once per worklist pop; cancellation abandons the solve.
//!
//! # Edge sensitivity
//!
//! Keeping OUT per edge (rather than per block) is what makes the
//! conditional refinement sound: `v` may be never-null on the fall-through
//! edge and always-null on the taken edge of the same branch, and the two
//! facts never meet until a later join deliberately merges them.

use std::collections::VecDeque;

use crate::cfg::{BlockId, ControlFlowGraph, EdgeKind};
use crate::dataflow::{NullPointerState, NullState, ParameterState};
use crate::ir::{IrBlock, IrFunction};
use crate::progress::ProgressMonitor;
use crate::{Error, Result};

use super::transfer;

/// Fixpoint solver for the null-pointer domain over one method.
pub(crate) struct NullPointerSolver<'a> {
    ir: &'a IrFunction,
    cfg: &'a ControlFlowGraph,
    /// IN state per block, indexed by block id.
    in_states: Vec<NullPointerState>,
    /// Number of worklist pops performed.
    iterations: usize,
}

impl<'a> NullPointerSolver<'a> {
    /// Creates the solver with seeded entry state.
    pub(crate) fn new(
        ir: &'a IrFunction,
        cfg: &'a ControlFlowGraph,
        parameters: &ParameterState,
    ) -> Self {
        let max = ir.symbols().max_value_number();
        let mut in_states = vec![NullPointerState::bottom(max); cfg.block_count()];
        if cfg.block_count() > 0 {
            in_states[cfg.entry().index()] = NullPointerState::seeded(ir.symbols(), parameters);
        }
        Self {
            ir,
            cfg,
            in_states,
            iterations: 0,
        }
    }

    /// Runs the worklist to a fixpoint.
    ///
    /// # Errors
    ///
    /// [`Error::Cancelled`] when the progress monitor signals
    /// cancellation between worklist steps.
    pub(crate) fn solve(&mut self, progress: &dyn ProgressMonitor) -> Result<()> {
        let block_count = self.cfg.block_count();
        let mut in_worklist = vec![false; block_count];
        let mut worklist: VecDeque<BlockId> = VecDeque::with_capacity(block_count);

        for block in self.cfg.reverse_postorder() {
            worklist.push_back(block);
            in_worklist[block.index()] = true;
        }

        while let Some(block) = worklist.pop_front() {
            if progress.is_cancelled() {
                return Err(Error::Cancelled);
            }
            in_worklist[block.index()] = false;
            self.iterations += 1;
            progress.worked(1);

            let Some(ir_block) = self.ir.block(block) else {
                continue;
            };

            // Base OUT: the IN pushed through the block's instructions.
            let mut out = self.in_states[block.index()].clone();
            for op in ir_block.instructions() {
                transfer::apply(op, &mut out);
            }

            for edge in self.cfg.successors(block) {
                let target = edge.target();
                // The entry keeps its boundary value; parameters must
                // retain at least their initial state there.
                if target == self.cfg.entry() {
                    continue;
                }

                let incoming = self.edge_state(ir_block, &out, edge.kind(), target);
                if self.in_states[target.index()].join_with(&incoming)
                    && !in_worklist[target.index()]
                {
                    worklist.push_back(target);
                    in_worklist[target.index()] = true;
                }
            }
        }

        Ok(())
    }

    /// Specialises the base OUT state for one outgoing edge.
    fn edge_state(
        &self,
        block: &IrBlock,
        out: &NullPointerState,
        kind: EdgeKind,
        target: BlockId,
    ) -> NullPointerState {
        let mut state = out.clone();

        if kind.is_branch() {
            if let Some(cond) = block.last_instruction() {
                transfer::refine_branch(
                    cond,
                    kind == EdgeKind::BranchTaken,
                    self.ir.symbols(),
                    &mut state,
                );
            }
        }

        if let Some(target_block) = self.ir.block(target) {
            // π-nodes bind their refined copies on this edge only.
            for pi in target_block.pis() {
                if pi.predecessor() == block.id() {
                    state.assign(pi.result(), pi.source());
                }
            }
            // φ results take this edge's operand state; the join across
            // edges happens in the target's IN.
            for phi in target_block.phis() {
                match phi.operand_from(block.id()) {
                    Some(operand) => state.assign(phi.result(), operand.value()),
                    // No operand for this edge: contribute nothing.
                    None => state.set(phi.result(), NullState::Unknown),
                }
            }
        }

        state
    }

    /// Returns the IN state of `block`.
    pub(crate) fn in_state(&self, block: BlockId) -> &NullPointerState {
        &self.in_states[block.index()]
    }

    /// Returns the number of worklist pops performed.
    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn iterations(&self) -> usize {
        self.iterations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::CfgEdge;
    use crate::ir::{
        Constant, ExceptionSet, FieldId, IrOp, MethodRef, PhiNode, PhiOperand, PiNode,
    };
    use crate::progress::NeverCancel;

    #[test]
    fn straight_line_propagation() {
        // B0: v2 = new; goto B1.  B1: return.
        let mut func = IrFunction::new(MethodRef::new(1), 0);
        let obj = func.symbols_mut().fresh_value();
        let mut b0 = IrBlock::new(BlockId::new(0));
        b0.push(IrOp::New {
            dest: obj,
            exceptions: ExceptionSet::empty(),
        });
        b0.push(IrOp::Goto);
        func.add_block(b0);
        let mut b1 = IrBlock::new(BlockId::new(1));
        b1.push(IrOp::Return { value: None });
        func.add_block(b1);

        let mut cfg = ControlFlowGraph::new(2);
        cfg.add_edge(BlockId::new(0), CfgEdge::fallthrough(BlockId::new(1)));

        let mut solver = NullPointerSolver::new(&func, &cfg, &ParameterState::default());
        solver.solve(&NeverCancel).unwrap();

        // The allocation's fact reaches B1's entry.
        assert!(solver.in_state(BlockId::new(1)).is_never_null(obj));
        // But not B0's own entry.
        assert_eq!(
            solver.in_state(BlockId::new(0)).value(obj),
            NullState::Unknown
        );
        assert!(solver.iterations() >= 2);
    }

    #[test]
    fn null_test_refines_both_edges() {
        // B0: if v1 == null then B1 else B2; both return.
        let mut func = IrFunction::new(MethodRef::new(1), 1);
        let v = func.symbols().parameter_value(0);
        let nil = func.symbols_mut().constant(Constant::Null);

        let mut b0 = IrBlock::new(BlockId::new(0));
        b0.push(IrOp::Conditional {
            lhs: v,
            rhs: nil,
            equal: true,
        });
        func.add_block(b0);
        let mut b1 = IrBlock::new(BlockId::new(1));
        b1.push(IrOp::Return { value: None });
        func.add_block(b1);
        let mut b2 = IrBlock::new(BlockId::new(2));
        b2.push(IrOp::Return { value: None });
        func.add_block(b2);

        let mut cfg = ControlFlowGraph::new(3);
        cfg.add_edge(BlockId::new(0), CfgEdge::branch_taken(BlockId::new(1)));
        cfg.add_edge(BlockId::new(0), CfgEdge::branch_not_taken(BlockId::new(2)));

        let mut solver = NullPointerSolver::new(&func, &cfg, &ParameterState::default());
        solver.solve(&NeverCancel).unwrap();

        assert!(solver.in_state(BlockId::new(1)).is_always_null(v));
        assert!(solver.in_state(BlockId::new(2)).is_never_null(v));
    }

    #[test]
    fn phi_joins_per_edge() {
        // B0 branches on v1 == null; B1 defines a fresh object, B2 loads a
        // field; B3 merges the two into a phi.
        let mut func = IrFunction::new(MethodRef::new(1), 1);
        let v = func.symbols().parameter_value(0);
        let nil = func.symbols_mut().constant(Constant::Null);
        let fresh = func.symbols_mut().fresh_value();
        let loaded = func.symbols_mut().fresh_value();
        let merged = func.symbols_mut().fresh_value();

        let mut b0 = IrBlock::new(BlockId::new(0));
        b0.push(IrOp::Conditional {
            lhs: v,
            rhs: nil,
            equal: true,
        });
        func.add_block(b0);

        let mut b1 = IrBlock::new(BlockId::new(1));
        b1.push(IrOp::New {
            dest: fresh,
            exceptions: ExceptionSet::empty(),
        });
        b1.push(IrOp::Goto);
        func.add_block(b1);

        let mut b2 = IrBlock::new(BlockId::new(2));
        b2.push(IrOp::GetField {
            dest: loaded,
            object: v,
            field: FieldId::new(0),
            exceptions: ExceptionSet::NULL_POINTER,
        });
        b2.push(IrOp::Goto);
        func.add_block(b2);

        let mut b3 = IrBlock::new(BlockId::new(3));
        b3.add_phi(PhiNode::new(
            merged,
            vec![
                PhiOperand::new(fresh, BlockId::new(1)),
                PhiOperand::new(loaded, BlockId::new(2)),
            ],
        ));
        b3.push(IrOp::Return { value: Some(merged) });
        func.add_block(b3);

        let mut cfg = ControlFlowGraph::new(4);
        cfg.add_edge(BlockId::new(0), CfgEdge::branch_taken(BlockId::new(1)));
        cfg.add_edge(BlockId::new(0), CfgEdge::branch_not_taken(BlockId::new(2)));
        cfg.add_edge(BlockId::new(1), CfgEdge::fallthrough(BlockId::new(3)));
        cfg.add_edge(BlockId::new(2), CfgEdge::fallthrough(BlockId::new(3)));

        let mut solver = NullPointerSolver::new(&func, &cfg, &ParameterState::default());
        solver.solve(&NeverCancel).unwrap();

        // never-null ⊔ maybe-null = maybe-null.
        assert_eq!(
            solver.in_state(BlockId::new(3)).value(merged),
            NullState::MaybeNull
        );
    }

    #[test]
    fn pi_node_carries_refinement_past_a_join() {
        // B0: if v1 != null then B1 else B2. B1 carries a pi-refined copy
        // of v1 scoped to the edge from B0.
        let mut func = IrFunction::new(MethodRef::new(1), 1);
        let v = func.symbols().parameter_value(0);
        let nil = func.symbols_mut().constant(Constant::Null);
        let refined = func.symbols_mut().fresh_value();

        let mut b0 = IrBlock::new(BlockId::new(0));
        b0.push(IrOp::Conditional {
            lhs: v,
            rhs: nil,
            equal: false,
        });
        func.add_block(b0);

        let mut b1 = IrBlock::new(BlockId::new(1));
        b1.add_pi(PiNode::new(refined, v, BlockId::new(0)));
        b1.push(IrOp::Return { value: Some(refined) });
        func.add_block(b1);

        let mut b2 = IrBlock::new(BlockId::new(2));
        b2.push(IrOp::Return { value: None });
        func.add_block(b2);

        let mut cfg = ControlFlowGraph::new(3);
        cfg.add_edge(BlockId::new(0), CfgEdge::branch_taken(BlockId::new(1)));
        cfg.add_edge(BlockId::new(0), CfgEdge::branch_not_taken(BlockId::new(2)));

        let mut solver = NullPointerSolver::new(&func, &cfg, &ParameterState::default());
        solver.solve(&NeverCancel).unwrap();

        assert!(solver.in_state(BlockId::new(1)).is_never_null(refined));
    }

    #[test]
    fn loop_converges() {
        // B0 -> B1; B1 -> B1 (taken) | B2. The loop re-joins its own out.
        let mut func = IrFunction::new(MethodRef::new(1), 2);
        let cond = func.symbols().parameter_value(1);
        let nil = func.symbols_mut().constant(Constant::Null);

        let mut b0 = IrBlock::new(BlockId::new(0));
        b0.push(IrOp::Goto);
        func.add_block(b0);
        let mut b1 = IrBlock::new(BlockId::new(1));
        b1.push(IrOp::Conditional {
            lhs: cond,
            rhs: nil,
            equal: false,
        });
        func.add_block(b1);
        let mut b2 = IrBlock::new(BlockId::new(2));
        b2.push(IrOp::Return { value: None });
        func.add_block(b2);

        let mut cfg = ControlFlowGraph::new(3);
        cfg.add_edge(BlockId::new(0), CfgEdge::fallthrough(BlockId::new(1)));
        cfg.add_edge(BlockId::new(1), CfgEdge::branch_taken(BlockId::new(1)));
        cfg.add_edge(BlockId::new(1), CfgEdge::branch_not_taken(BlockId::new(2)));

        let mut solver = NullPointerSolver::new(&func, &cfg, &ParameterState::default());
        solver.solve(&NeverCancel).unwrap();
        // On loop exit the tested value is known null.
        assert!(solver.in_state(BlockId::new(2)).is_always_null(cond));
    }
}
