//! Backward tracing of call arguments to caller parameters.
//!
//! When a property-name clone calls on into another method, the marker
//! should follow only if the callee actually receives something derived
//! from the caller's distinguished parameter. This module answers which
//! argument positions of a call site transitively read from a given
//! caller parameter, by walking def chains backward through field and
//! property reads.
//!
//! The walk is an explicit worklist over a value set — no recursion, so
//! deeply chained reads (`a.b.c.d[k]`) cannot exhaust the stack — and it
//! terminates because SSA def chains only ever add already-numbered
//! values: the first re-insertion is a no-op and drops the chain.

use rustc_hash::FxHashSet;

use crate::ir::{CallSiteRef, DefUse, IrOp, ValueNum};

use super::CgNode;

/// Returns the argument positions of `site` whose values transitively
/// derive from the caller's distinguished parameter at `index`.
///
/// Each position's value set is seeded with the argument itself and
/// saturated with the reference (and key) operands of every field or
/// property read on the def chain. A position is dependent when its
/// saturated set contains parameter value `index + 1`. A site without an
/// invoke yields the empty set.
#[must_use]
pub fn dependent_parameters(
    caller: &CgNode<'_>,
    site: CallSiteRef,
    index: usize,
) -> FxHashSet<usize> {
    let mut dependent = FxHashSet::default();
    let ir = caller.ir();
    let Some(call) = ir.calls_at(site).next() else {
        return dependent;
    };
    let du = DefUse::build(ir);
    let parameter = ValueNum::new(index + 1);

    for (position, argument) in call.invoke_arguments().into_iter().enumerate() {
        let mut values: FxHashSet<ValueNum> = FxHashSet::default();
        let mut worklist = vec![argument];
        values.insert(argument);

        while let Some(value) = worklist.pop() {
            match du.def_op(value) {
                Some(IrOp::GetField { object, .. }) => {
                    if values.insert(*object) {
                        worklist.push(*object);
                    }
                }
                Some(IrOp::PropertyGet { object, key, .. }) => {
                    for &operand in &[*object, *key] {
                        if values.insert(operand) {
                            worklist.push(operand);
                        }
                    }
                }
                _ => {}
            }
        }

        if values.contains(&parameter) {
            dependent.insert(position);
        }
    }

    dependent
}
