//! Transfer functions: how each instruction moves the null state.
//!
//! Reads and writes *use* their reference operand without changing its
//! state; whether the dereference succeeds is decided by the pruning pass,
//! not here. Only definitions move the state:
//!
//! - allocations, caught exceptions, array lengths, and existence tests
//!   define non-null values;
//! - loads and invoke results are unconstrained (the callee's return is
//!   not summarized);
//! - a cast passes its operand's state through unchanged.
//!
//! Branch refinement lives in [`refine_branch`]: when a conditional
//! compares a value against the null constant, the two outgoing edges each
//! learn the opposite fact about it.

use crate::dataflow::{NullPointerState, NullState};
use crate::ir::{IrOp, SymbolTable, ValueNum};

/// Applies one instruction's effect to the state.
pub(crate) fn apply(op: &IrOp, state: &mut NullPointerState) {
    match op {
        IrOp::New { dest, .. }
        | IrOp::CaughtException { dest }
        | IrOp::ArrayLength { dest, .. }
        | IrOp::IsDefined { dest, .. } => state.set(*dest, NullState::NeverNull),

        IrOp::GetField { dest, .. }
        | IrOp::GetStatic { dest, .. }
        | IrOp::PropertyGet { dest, .. }
        | IrOp::ArrayLoad { dest, .. }
        | IrOp::Compute { dest, .. } => state.set(*dest, NullState::MaybeNull),

        IrOp::Invoke { dest: Some(dest), .. } => state.set(*dest, NullState::MaybeNull),

        IrOp::CheckCast { dest, object, .. } => state.assign(*dest, *object),

        // Stores, monitors, throws, branches, and returns define nothing.
        IrOp::Invoke { dest: None, .. }
        | IrOp::PutField { .. }
        | IrOp::PutStatic { .. }
        | IrOp::PropertySet { .. }
        | IrOp::ArrayStore { .. }
        | IrOp::Monitor { .. }
        | IrOp::Throw { .. }
        | IrOp::Conditional { .. }
        | IrOp::Return { .. }
        | IrOp::Goto => {}
    }
}

/// Returns the value a conditional branch tests against null, if it is a
/// null test at all.
pub(crate) fn null_tested_value(op: &IrOp, symbols: &SymbolTable) -> Option<(ValueNum, bool)> {
    let IrOp::Conditional { lhs, rhs, equal } = op else {
        return None;
    };
    if symbols.is_null_constant(*rhs) {
        Some((*lhs, *equal))
    } else if symbols.is_null_constant(*lhs) {
        Some((*rhs, *equal))
    } else {
        None
    }
}

/// Refines the branch-edge state of a conditional null test.
///
/// For `v == null`, the taken edge pins `v` to always-null and the
/// fall-through edge to never-null; `v != null` swaps the two. A
/// refinement that contradicts what the state already knows lands on
/// bottom, marking the edge infeasible for that value.
pub(crate) fn refine_branch(
    op: &IrOp,
    taken: bool,
    symbols: &SymbolTable,
    state: &mut NullPointerState,
) {
    if let Some((value, equal)) = null_tested_value(op, symbols) {
        let refined = if taken == equal {
            NullState::AlwaysNull
        } else {
            NullState::NeverNull
        };
        state.refine(value, refined);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataflow::ParameterState;
    use crate::ir::{CallSiteRef, Constant, ExceptionSet, FieldId, MethodRef};

    fn state_for(symbols: &SymbolTable) -> NullPointerState {
        NullPointerState::seeded(symbols, &ParameterState::default())
    }

    #[test]
    fn allocation_defines_never_null() {
        let mut symbols = SymbolTable::new(0);
        let obj = symbols.fresh_value();
        let mut state = state_for(&symbols);

        apply(
            &IrOp::New {
                dest: obj,
                exceptions: ExceptionSet::ALLOC_FAILED,
            },
            &mut state,
        );
        assert!(state.is_never_null(obj));
    }

    #[test]
    fn load_defines_maybe_null() {
        let mut symbols = SymbolTable::new(1);
        let o = symbols.parameter_value(0);
        let loaded = symbols.fresh_value();
        let mut state = state_for(&symbols);

        apply(
            &IrOp::GetField {
                dest: loaded,
                object: o,
                field: FieldId::new(0),
                exceptions: ExceptionSet::NULL_POINTER,
            },
            &mut state,
        );
        assert_eq!(state.value(loaded), NullState::MaybeNull);
        // The dereferenced operand keeps its state.
        assert_eq!(state.value(o), NullState::MaybeNull);
    }

    #[test]
    fn invoke_result_is_unconstrained() {
        let mut symbols = SymbolTable::new(0);
        let result = symbols.fresh_value();
        let mut state = state_for(&symbols);

        apply(
            &IrOp::Invoke {
                dest: Some(result),
                receiver: None,
                args: vec![],
                callee: MethodRef::new(2),
                site: CallSiteRef::new(0),
            },
            &mut state,
        );
        assert_eq!(state.value(result), NullState::MaybeNull);
    }

    #[test]
    fn cast_inherits_the_operand_state() {
        let mut symbols = SymbolTable::new(0);
        let nil = symbols.constant(Constant::Null);
        let cast = symbols.fresh_value();
        let mut state = state_for(&symbols);

        apply(
            &IrOp::CheckCast {
                dest: cast,
                object: nil,
                exceptions: ExceptionSet::CAST,
            },
            &mut state,
        );
        assert!(state.is_always_null(cast));
    }

    #[test]
    fn null_test_recognition() {
        let mut symbols = SymbolTable::new(1);
        let v = symbols.parameter_value(0);
        let nil = symbols.constant(Constant::Null);
        let other = symbols.constant(Constant::Number);

        let eq_null = IrOp::Conditional {
            lhs: v,
            rhs: nil,
            equal: true,
        };
        assert_eq!(null_tested_value(&eq_null, &symbols), Some((v, true)));

        // The null constant may sit on either side.
        let flipped = IrOp::Conditional {
            lhs: nil,
            rhs: v,
            equal: false,
        };
        assert_eq!(null_tested_value(&flipped, &symbols), Some((v, false)));

        let not_null_test = IrOp::Conditional {
            lhs: v,
            rhs: other,
            equal: true,
        };
        assert_eq!(null_tested_value(&not_null_test, &symbols), None);
    }

    #[test]
    fn branch_refinement_splits_the_edges() {
        let mut symbols = SymbolTable::new(1);
        let v = symbols.parameter_value(0);
        let nil = symbols.constant(Constant::Null);
        let test = IrOp::Conditional {
            lhs: v,
            rhs: nil,
            equal: true,
        };

        let mut taken = state_for(&symbols);
        refine_branch(&test, true, &symbols, &mut taken);
        assert!(taken.is_always_null(v));

        let mut fallthrough = state_for(&symbols);
        refine_branch(&test, false, &symbols, &mut fallthrough);
        assert!(fallthrough.is_never_null(v));
    }

    #[test]
    fn inequality_test_swaps_the_edges() {
        let mut symbols = SymbolTable::new(1);
        let v = symbols.parameter_value(0);
        let nil = symbols.constant(Constant::Null);
        let test = IrOp::Conditional {
            lhs: v,
            rhs: nil,
            equal: false,
        };

        let mut taken = state_for(&symbols);
        refine_branch(&test, true, &symbols, &mut taken);
        assert!(taken.is_never_null(v));
    }
}
