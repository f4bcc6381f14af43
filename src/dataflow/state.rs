//! The per-block analysis state and the caller-supplied parameter seed.

use std::fmt;

use crate::dataflow::{JoinSemiLattice, MeetSemiLattice, NullState};
use crate::ir::{SymbolTable, ValueNum};

/// Optional per-parameter initial nullness, supplied by the caller.
///
/// Interprocedural drivers that already know something about a call's
/// arguments seed the intraprocedural analysis through this. A parameter
/// without an assignment starts at [`NullState::MaybeNull`] — the sound
/// default for an arbitrary caller.
///
/// # Examples
///
/// ```rust
/// use whittle::dataflow::{NullState, ParameterState};
///
/// let mut params = ParameterState::unknown(2);
/// params.set(0, NullState::NeverNull);
/// assert_eq!(params.state_of(0), Some(NullState::NeverNull));
/// assert_eq!(params.state_of(1), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterState {
    states: Vec<Option<NullState>>,
}

impl ParameterState {
    /// Creates a state with no assignment for any of `parameter_count`
    /// parameters.
    #[must_use]
    pub fn unknown(parameter_count: usize) -> Self {
        Self {
            states: vec![None; parameter_count],
        }
    }

    /// Creates a state from explicit per-parameter assignments.
    #[must_use]
    pub fn new(states: Vec<Option<NullState>>) -> Self {
        Self { states }
    }

    /// Assigns the `index`-th parameter (0-based).
    pub fn set(&mut self, index: usize, state: NullState) {
        if index >= self.states.len() {
            self.states.resize(index + 1, None);
        }
        self.states[index] = Some(state);
    }

    /// Returns the assignment of the `index`-th parameter, if any.
    #[must_use]
    pub fn state_of(&self, index: usize) -> Option<NullState> {
        self.states.get(index).copied().flatten()
    }

    /// Returns the number of parameter slots carried.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns `true` if no slots are carried.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// A total map from a method's SSA values to their [`NullState`].
///
/// The state is dense — one slot per value number up to the symbol
/// table's maximum — because the solver touches most values of a method
/// on every transfer.
///
/// # Seeding
///
/// [`seeded`](Self::seeded) builds the method-entry state: everything
/// bottom, parameters overridden from the [`ParameterState`] (absent
/// assignment ⇒ maybe-null), the null literal pinned to always-null and
/// every other literal to never-null.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NullPointerState {
    values: Box<[NullState]>,
}

impl NullPointerState {
    /// Creates the all-bottom state for values `0..=max_value_number`.
    ///
    /// This is the state of a block no path has reached yet.
    #[must_use]
    pub fn bottom(max_value_number: usize) -> Self {
        Self {
            values: vec![NullState::Unknown; max_value_number + 1].into_boxed_slice(),
        }
    }

    /// Creates the method-entry state from the symbol table and the
    /// caller-supplied parameter seed.
    #[must_use]
    pub fn seeded(symbols: &SymbolTable, parameters: &ParameterState) -> Self {
        let mut state = Self::bottom(symbols.max_value_number());

        for (index, value) in symbols.parameter_values().enumerate() {
            let seeded = parameters.state_of(index).unwrap_or(NullState::MaybeNull);
            state.set(value, seeded);
        }

        for value in (0..=symbols.max_value_number()).map(ValueNum::new) {
            if symbols.is_null_constant(value) {
                state.set(value, NullState::AlwaysNull);
            } else if symbols.is_nonnull_constant(value) {
                state.set(value, NullState::NeverNull);
            }
        }

        state
    }

    /// Returns the number of value slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the state carries no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the state of `value`.
    ///
    /// Out-of-range values report [`NullState::MaybeNull`]; a value the
    /// state does not track can be anything.
    #[must_use]
    pub fn value(&self, value: ValueNum) -> NullState {
        self.values
            .get(value.index())
            .copied()
            .unwrap_or(NullState::MaybeNull)
    }

    /// Returns `true` if `value` is never null in this state.
    #[must_use]
    pub fn is_never_null(&self, value: ValueNum) -> bool {
        self.value(value).is_never_null()
    }

    /// Returns `true` if `value` is always null in this state.
    #[must_use]
    pub fn is_always_null(&self, value: ValueNum) -> bool {
        self.value(value).is_always_null()
    }

    /// Overwrites the state of `value`.
    pub(crate) fn set(&mut self, value: ValueNum, state: NullState) {
        if let Some(slot) = self.values.get_mut(value.index()) {
            *slot = state;
        }
    }

    /// Copies the state of `src` into `dst`.
    pub(crate) fn assign(&mut self, dst: ValueNum, src: ValueNum) {
        let state = self.value(src);
        self.set(dst, state);
    }

    /// Narrows `value` by meeting it with `refinement`.
    ///
    /// Used for branch-scoped facts; a contradictory refinement lands on
    /// bottom, marking the edge infeasible for that value.
    pub(crate) fn refine(&mut self, value: ValueNum, refinement: NullState) {
        let narrowed = self.value(value).meet(&refinement);
        self.set(value, narrowed);
    }

    /// Joins `value` upward with `incoming`, reporting whether the slot
    /// changed.
    pub(crate) fn join_value(&mut self, value: ValueNum, incoming: NullState) -> bool {
        let old = self.value(value);
        let new = old.join(&incoming);
        if new == old {
            false
        } else {
            self.set(value, new);
            true
        }
    }

    /// Pointwise join with another state, reporting whether anything
    /// changed.
    pub(crate) fn join_with(&mut self, other: &Self) -> bool {
        debug_assert_eq!(self.values.len(), other.values.len());
        let mut changed = false;
        for (slot, incoming) in self.values.iter_mut().zip(other.values.iter()) {
            let new = slot.join(incoming);
            if new != *slot {
                *slot = new;
                changed = true;
            }
        }
        changed
    }
}

impl fmt::Display for NullPointerState {
    /// Lists only the constrained values; bottom slots are noise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        let mut first = true;
        for (index, state) in self.values.iter().enumerate() {
            if *state == NullState::Unknown {
                continue;
            }
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "v{index}: {state}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Constant;

    #[test]
    fn seeding_pins_parameters_and_constants() {
        let mut symbols = SymbolTable::new(2);
        let nil = symbols.constant(Constant::Null);
        let name = symbols.constant(Constant::String);

        let mut params = ParameterState::unknown(2);
        params.set(0, NullState::NeverNull);

        let state = NullPointerState::seeded(&symbols, &params);
        assert!(state.is_never_null(symbols.parameter_value(0)));
        assert_eq!(state.value(symbols.parameter_value(1)), NullState::MaybeNull);
        assert!(state.is_always_null(nil));
        assert!(state.is_never_null(name));
    }

    #[test]
    fn empty_parameter_state_defaults_to_maybe_null() {
        let symbols = SymbolTable::new(1);
        let state = NullPointerState::seeded(&symbols, &ParameterState::default());
        assert_eq!(state.value(symbols.parameter_value(0)), NullState::MaybeNull);
    }

    #[test]
    fn join_with_reports_change() {
        let symbols = SymbolTable::new(1);
        let mut a = NullPointerState::bottom(symbols.max_value_number());
        let seeded = NullPointerState::seeded(&symbols, &ParameterState::default());

        assert!(a.join_with(&seeded));
        assert!(!a.join_with(&seeded));
        assert_eq!(a, seeded);
    }

    #[test]
    fn join_never_moves_down() {
        let symbols = SymbolTable::new(1);
        let v = symbols.parameter_value(0);
        let mut state = NullPointerState::bottom(symbols.max_value_number());

        assert!(state.join_value(v, NullState::NeverNull));
        assert!(state.join_value(v, NullState::AlwaysNull));
        assert_eq!(state.value(v), NullState::MaybeNull);
        assert!(!state.join_value(v, NullState::NeverNull));
    }

    #[test]
    fn refinement_narrows_and_contradicts() {
        let symbols = SymbolTable::new(1);
        let v = symbols.parameter_value(0);
        let mut state = NullPointerState::seeded(&symbols, &ParameterState::default());

        state.refine(v, NullState::AlwaysNull);
        assert!(state.is_always_null(v));
        state.refine(v, NullState::NeverNull);
        assert_eq!(state.value(v), NullState::Unknown);
    }

    #[test]
    fn out_of_range_values_are_maybe_null() {
        let state = NullPointerState::bottom(1);
        assert_eq!(state.value(ValueNum::new(40)), NullState::MaybeNull);
    }

    #[test]
    fn display_skips_bottom_slots() {
        let mut symbols = SymbolTable::new(0);
        let nil = symbols.constant(Constant::Null);
        let state = NullPointerState::seeded(&symbols, &ParameterState::default());
        assert_eq!(format!("{state}"), format!("{{{nil}: always-null}}"));
    }
}
