// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Variable-state tracking for operators.
//!
//! `VarState` owns, for a fixed set of variables, the current and
//! reference values, activation bits, and the change-tracking machinery
//! that turns mutations into deltas. Operators mutate state through
//! `set_value` / `activate` / `deactivate`; `apply_changes` then emits
//! every touched index into the delta (and, for incremental operators,
//! into the deltadelta); `revert_changes` rolls the state back between
//! neighbors.
//!
//! Invariants maintained here: `has_changed[i]` holds exactly when `i` is
//! in the change list; only indices in the change list may differ from
//! their reference values; after a full revert, observable state equals
//! the state right after `start`.
//!
//! `SeqState` is the sequence-variable variant: forward/backward integer
//! sequences instead of scalar values, with the backward sequence cleared
//! (not restored) on every revert.

use fixedbitset::FixedBitSet;
use sextant_model::assignment::Assignment;
use sextant_model::index::VarIndex;
use sextant_search::num::SolverNumeric;

/// Tracking state over a fixed set of integer variables.
#[derive(Debug, Clone)]
pub struct VarState<T> {
    vars: Vec<VarIndex>,
    values: Vec<T>,
    old_values: Vec<T>,
    activated: FixedBitSet,
    was_activated: FixedBitSet,
    changes: Vec<usize>,
    has_changed: FixedBitSet,
    has_delta_changed: FixedBitSet,
    cleared: bool,
}

impl<T> VarState<T>
where
    T: SolverNumeric,
{
    /// Creates tracking state for the given variables.
    pub fn new(vars: Vec<VarIndex>) -> Self {
        let size = vars.len();
        Self {
            vars,
            values: vec![T::ZERO; size],
            old_values: vec![T::ZERO; size],
            activated: FixedBitSet::with_capacity(size),
            was_activated: FixedBitSet::with_capacity(size),
            changes: Vec::with_capacity(size),
            has_changed: FixedBitSet::with_capacity(size),
            has_delta_changed: FixedBitSet::with_capacity(size),
            cleared: true,
        }
    }

    /// Returns the number of tracked variables.
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.vars.len()
    }

    /// Returns the variable at `index`.
    #[inline(always)]
    pub fn var(&self, index: usize) -> VarIndex {
        self.vars[index]
    }

    /// Returns the current value at `index`.
    #[inline(always)]
    pub fn value(&self, index: usize) -> T {
        self.values[index]
    }

    /// Returns the reference value at `index`.
    #[inline(always)]
    pub fn old_value(&self, index: usize) -> T {
        self.old_values[index]
    }

    /// Returns whether `index` is currently activated.
    #[inline(always)]
    pub fn activated(&self, index: usize) -> bool {
        self.activated.contains(index)
    }

    /// Returns the indices mutated since the last full revert.
    #[inline(always)]
    pub fn changes(&self) -> &[usize] {
        &self.changes
    }

    /// Returns `true` if the last revert was a full revert.
    #[inline(always)]
    pub fn cleared(&self) -> bool {
        self.cleared
    }

    /// Synchronizes the state on a reference assignment.
    ///
    /// # Panics
    ///
    /// Panics if the assignment does not contain one of the tracked
    /// variables.
    pub fn start(&mut self, assignment: &Assignment<T>) {
        for i in 0..self.vars.len() {
            let var = self.vars[i];
            // Positional fast path: references usually list variables in
            // operator order.
            let element = if i < assignment.num_int_elements()
                && assignment.element_at(i).var() == var
            {
                assignment.element_at(i)
            } else {
                assignment.element(var).unwrap_or_else(|| {
                    panic!("assignment does not contain operator variable {}", var)
                })
            };
            let value = element.value();
            self.values[i] = value;
            self.old_values[i] = value;
            let activated = element.activated();
            self.activated.set(i, activated);
            self.was_activated.set(i, activated);
        }
        self.changes.clear();
        self.has_changed.clear();
        self.has_delta_changed.clear();
        self.cleared = true;
    }

    /// Sets the current value at `index`, recording the change.
    #[inline]
    pub fn set_value(&mut self, index: usize, value: T) {
        self.values[index] = value;
        self.mark_change(index);
    }

    /// Activates `index`, recording the change.
    #[inline]
    pub fn activate(&mut self, index: usize) {
        self.activated.set(index, true);
        self.mark_change(index);
    }

    /// Deactivates `index`, recording the change.
    #[inline]
    pub fn deactivate(&mut self, index: usize) {
        self.activated.set(index, false);
        self.mark_change(index);
    }

    #[inline]
    fn mark_change(&mut self, index: usize) {
        if !self.has_delta_changed.contains(index) {
            self.has_delta_changed.set(index, true);
        }
        if !self.has_changed.contains(index) {
            self.changes.push(index);
            self.has_changed.set(index, true);
        }
    }

    /// Emits every changed index into `delta`.
    ///
    /// A deactivated index is emitted as a deactivation; an activated one
    /// as its current value, unless the value equals the reference and
    /// `skip_unchanged` allows skipping it. When the operator is
    /// incremental and the last revert was not a full revert, indices
    /// changed since the previous emission are also appended to
    /// `deltadelta`.
    pub fn apply_changes<F>(
        &self,
        delta: &mut Assignment<T>,
        deltadelta: &mut Assignment<T>,
        incremental: bool,
        skip_unchanged: F,
    ) -> bool
    where
        F: Fn(&Self, usize) -> bool,
    {
        for &index in &self.changes {
            let var = self.vars[index];
            let value = self.values[index];
            let activated = self.activated.contains(index);
            if !activated {
                if !self.cleared && self.has_delta_changed.contains(index) && incremental {
                    deltadelta.fast_add(var).deactivate();
                }
                delta.fast_add(var).deactivate();
            } else if value != self.old_values[index] || !skip_unchanged(self, index) {
                if !self.cleared && self.has_delta_changed.contains(index) && incremental {
                    deltadelta.fast_add(var).set_value(value);
                }
                delta.fast_add(var).set_value(value);
            }
        }
        true
    }

    /// Reverts mutations made since the last emission.
    ///
    /// With `revert_incremental` set and an incremental operator, only
    /// the per-delta bookkeeping is reset and values are left in place,
    /// so the next emission describes the change relative to the previous
    /// neighbor. Otherwise every changed index is restored from the
    /// reference and the change list is emptied.
    pub fn revert_changes(&mut self, revert_incremental: bool, incremental: bool) {
        self.cleared = false;
        self.has_delta_changed.clear();
        if revert_incremental && incremental {
            return;
        }
        self.cleared = true;
        for &index in &self.changes {
            self.values[index] = self.old_values[index];
            let was = self.was_activated.contains(index);
            self.activated.set(index, was);
            self.has_changed.set(index, false);
        }
        self.changes.clear();
    }
}

/// Tracking state over a fixed set of sequence variables.
///
/// Structurally identical to [`VarState`], with forward/backward integer
/// sequences as values. The backward sequence is auxiliary: it is always
/// cleared on revert rather than restored from the reference.
#[derive(Debug, Clone)]
pub struct SeqState {
    vars: Vec<VarIndex>,
    values: Vec<Vec<usize>>,
    backward_values: Vec<Vec<usize>>,
    old_values: Vec<Vec<usize>>,
    activated: FixedBitSet,
    was_activated: FixedBitSet,
    changes: Vec<usize>,
    has_changed: FixedBitSet,
    has_delta_changed: FixedBitSet,
    cleared: bool,
}

impl SeqState {
    /// Creates tracking state for the given sequence variables.
    pub fn new(vars: Vec<VarIndex>) -> Self {
        let size = vars.len();
        Self {
            vars,
            values: vec![Vec::new(); size],
            backward_values: vec![Vec::new(); size],
            old_values: vec![Vec::new(); size],
            activated: FixedBitSet::with_capacity(size),
            was_activated: FixedBitSet::with_capacity(size),
            changes: Vec::with_capacity(size),
            has_changed: FixedBitSet::with_capacity(size),
            has_delta_changed: FixedBitSet::with_capacity(size),
            cleared: true,
        }
    }

    /// Returns the number of tracked variables.
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.vars.len()
    }

    /// Returns the current forward sequence at `index`.
    #[inline(always)]
    pub fn sequence(&self, index: usize) -> &[usize] {
        &self.values[index]
    }

    /// Returns the reference forward sequence at `index`.
    #[inline(always)]
    pub fn old_sequence(&self, index: usize) -> &[usize] {
        &self.old_values[index]
    }

    /// Returns whether `index` is currently activated.
    #[inline(always)]
    pub fn activated(&self, index: usize) -> bool {
        self.activated.contains(index)
    }

    /// Synchronizes the state on a reference assignment.
    ///
    /// # Panics
    ///
    /// Panics if the assignment does not contain one of the tracked
    /// variables.
    pub fn start<T: SolverNumeric>(&mut self, assignment: &Assignment<T>) {
        for i in 0..self.vars.len() {
            let var = self.vars[i];
            let element = assignment.sequence_element(var).unwrap_or_else(|| {
                panic!("assignment does not contain operator variable {}", var)
            });
            self.values[i] = element.forward_sequence().to_vec();
            self.backward_values[i].clear();
            self.old_values[i] = element.forward_sequence().to_vec();
            let activated = element.activated();
            self.activated.set(i, activated);
            self.was_activated.set(i, activated);
        }
        self.changes.clear();
        self.has_changed.clear();
        self.has_delta_changed.clear();
        self.cleared = true;
    }

    /// Replaces the forward sequence at `index`, recording the change.
    #[inline]
    pub fn set_forward_sequence(&mut self, index: usize, value: Vec<usize>) {
        self.values[index] = value;
        self.mark_change(index);
    }

    /// Replaces the backward sequence at `index`, recording the change.
    #[inline]
    pub fn set_backward_sequence(&mut self, index: usize, value: Vec<usize>) {
        self.backward_values[index] = value;
        self.mark_change(index);
    }

    /// Activates `index`, recording the change.
    #[inline]
    pub fn activate(&mut self, index: usize) {
        self.activated.set(index, true);
        self.mark_change(index);
    }

    /// Deactivates `index`, recording the change.
    #[inline]
    pub fn deactivate(&mut self, index: usize) {
        self.activated.set(index, false);
        self.mark_change(index);
    }

    #[inline]
    fn mark_change(&mut self, index: usize) {
        if !self.has_delta_changed.contains(index) {
            self.has_delta_changed.set(index, true);
        }
        if !self.has_changed.contains(index) {
            self.changes.push(index);
            self.has_changed.set(index, true);
        }
    }

    /// Emits every changed index into `delta`, both sequences included.
    pub fn apply_changes<T: SolverNumeric>(
        &self,
        delta: &mut Assignment<T>,
        deltadelta: &mut Assignment<T>,
        incremental: bool,
    ) -> bool {
        for &index in &self.changes {
            let var = self.vars[index];
            let activated = self.activated.contains(index);
            if !activated {
                if !self.cleared && self.has_delta_changed.contains(index) && incremental {
                    deltadelta.fast_add_sequence(var).deactivate();
                }
                delta.fast_add_sequence(var).deactivate();
            } else if self.values[index] != self.old_values[index] {
                if !self.cleared && self.has_delta_changed.contains(index) && incremental {
                    let element = deltadelta.fast_add_sequence(var);
                    element.set_forward_sequence(self.values[index].clone());
                    element.set_backward_sequence(self.backward_values[index].clone());
                }
                let element = delta.fast_add_sequence(var);
                element.set_forward_sequence(self.values[index].clone());
                element.set_backward_sequence(self.backward_values[index].clone());
            }
        }
        true
    }

    /// Reverts mutations made since the last emission. The backward
    /// sequences are cleared unconditionally.
    pub fn revert_changes(&mut self, revert_incremental: bool, incremental: bool) {
        self.cleared = false;
        self.has_delta_changed.clear();
        if revert_incremental && incremental {
            return;
        }
        self.cleared = true;
        for &index in &self.changes {
            self.values[index] = self.old_values[index].clone();
            self.backward_values[index].clear();
            let was = self.was_activated.contains(index);
            self.activated.set(index, was);
            self.has_changed.set(index, false);
        }
        self.changes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[inline]
    fn v(n: usize) -> VarIndex {
        VarIndex::new(n)
    }

    fn reference(values: &[i64]) -> Assignment<i64> {
        let mut a = Assignment::new();
        for (i, &value) in values.iter().enumerate() {
            a.add(v(i), value);
        }
        a
    }

    fn fresh_state(values: &[i64]) -> VarState<i64> {
        let mut state = VarState::new((0..values.len()).map(v).collect());
        state.start(&reference(values));
        state
    }

    #[test]
    fn test_start_synchronizes_values_and_activation() {
        let state = fresh_state(&[3, 5, 2]);
        assert_eq!(state.size(), 3);
        for i in 0..3 {
            assert_eq!(state.value(i), state.old_value(i));
            assert!(state.activated(i));
        }
        assert!(state.changes().is_empty());
        assert!(state.cleared());
    }

    #[test]
    #[should_panic(expected = "does not contain operator variable")]
    fn test_start_panics_on_missing_variable() {
        let mut state = VarState::<i64>::new(vec![v(0), v(9)]);
        state.start(&reference(&[1, 2]));
    }

    #[test]
    fn test_set_value_tracks_changes_once() {
        let mut state = fresh_state(&[3, 5, 2]);
        state.set_value(1, 7);
        state.set_value(1, 8);
        assert_eq!(state.changes(), &[1]);
        assert_eq!(state.value(1), 8);
    }

    #[test]
    fn test_revert_soundness() {
        // After a full revert, observable state equals the state right
        // after start.
        let mut state = fresh_state(&[3, 5, 2]);
        state.set_value(0, 99);
        state.deactivate(2);
        state.revert_changes(false, false);
        for i in 0..3 {
            assert_eq!(state.value(i), state.old_value(i));
            assert!(state.activated(i));
        }
        assert!(state.changes().is_empty());
        assert!(state.cleared());
    }

    #[test]
    fn test_delta_fidelity() {
        let mut state = fresh_state(&[3, 5, 2]);
        state.set_value(1, 4);
        state.deactivate(2);

        let mut delta = Assignment::new();
        let mut deltadelta = Assignment::new();
        assert!(state.apply_changes(&mut delta, &mut deltadelta, false, |_, _| true));

        assert_eq!(delta.num_int_elements(), 2);
        assert_eq!(delta.element(v(1)).unwrap().value(), 4);
        assert!(!delta.element(v(2)).unwrap().activated());
        // Non-incremental operator: deltadelta stays empty.
        assert!(deltadelta.is_empty());

        // Applying the delta to the reference reproduces current values.
        let mut applied = reference(&[3, 5, 2]);
        applied.copy_from(&delta);
        assert_eq!(applied.element(v(1)).unwrap().value(), state.value(1));
        assert_eq!(applied.element(v(0)).unwrap().value(), 3);
    }

    #[test]
    fn test_unchanged_value_is_skipped() {
        let mut state = fresh_state(&[3, 5, 2]);
        state.set_value(0, 3); // same as reference
        let mut delta = Assignment::new();
        let mut deltadelta = Assignment::new();
        state.apply_changes(&mut delta, &mut deltadelta, false, |_, _| true);
        assert!(delta.is_empty());

        // With skipping disabled the element is emitted anyway.
        let mut delta = Assignment::new();
        state.apply_changes(&mut delta, &mut deltadelta, false, |_, _| false);
        assert_eq!(delta.num_int_elements(), 1);
    }

    #[test]
    fn test_deltadelta_composability() {
        // For an incremental operator, apply(apply(a, delta_prev),
        // deltadelta) == apply(a, delta_current) across consecutive
        // emissions with no full revert in between.
        let a = reference(&[3, 5, 2]);
        let mut state = fresh_state(&[3, 5, 2]);

        // First neighbor.
        state.revert_changes(true, true);
        state.set_value(0, 10);
        let mut delta_prev = Assignment::new();
        let mut dd = Assignment::new();
        state.apply_changes(&mut delta_prev, &mut dd, true, |_, _| true);

        // Second neighbor, incremental revert keeps values.
        state.revert_changes(true, true);
        state.set_value(1, 20);
        let mut delta_current = Assignment::new();
        let mut deltadelta = Assignment::new();
        state.apply_changes(&mut delta_current, &mut deltadelta, true, |_, _| true);

        // deltadelta only contains the change since the last emission.
        assert_eq!(deltadelta.num_int_elements(), 1);
        assert_eq!(deltadelta.element(v(1)).unwrap().value(), 20);
        // delta_current contains the cumulative change.
        assert_eq!(delta_current.num_int_elements(), 2);

        let mut via_incremental = a.clone();
        via_incremental.copy_from(&delta_prev);
        via_incremental.copy_from(&deltadelta);
        let mut via_full = a.clone();
        via_full.copy_from(&delta_current);
        assert_eq!(via_incremental, via_full);
    }

    #[test]
    fn test_incremental_revert_keeps_values() {
        let mut state = fresh_state(&[1, 2]);
        state.set_value(0, 9);
        state.revert_changes(true, true);
        assert_eq!(state.value(0), 9);
        assert!(!state.cleared());
        // A full revert still restores.
        state.revert_changes(false, true);
        assert_eq!(state.value(0), 1);
        assert!(state.cleared());
    }

    fn seq_reference(sequences: &[&[usize]]) -> Assignment<i64> {
        let mut a = Assignment::<i64>::new();
        for (i, seq) in sequences.iter().enumerate() {
            a.fast_add_sequence(v(i)).set_forward_sequence(seq.to_vec());
        }
        a
    }

    #[test]
    fn test_seq_state_start_and_revert() {
        let mut state = SeqState::new(vec![v(0), v(1)]);
        state.start(&seq_reference(&[&[0, 1, 2], &[2, 1]]));
        assert_eq!(state.sequence(0), &[0, 1, 2]);

        state.set_forward_sequence(0, vec![2, 1, 0]);
        state.set_backward_sequence(0, vec![0, 1, 2]);
        state.revert_changes(false, false);
        assert_eq!(state.sequence(0), &[0, 1, 2]);
        // Backward sequences are cleared, not restored.
        assert!(state.backward_values[0].is_empty());
    }

    #[test]
    fn test_seq_state_apply_changes_emits_both_sequences() {
        let mut state = SeqState::new(vec![v(0)]);
        state.start(&seq_reference(&[&[0, 1, 2]]));
        state.set_forward_sequence(0, vec![1, 0, 2]);
        state.set_backward_sequence(0, vec![2, 0, 1]);

        let mut delta = Assignment::<i64>::new();
        let mut deltadelta = Assignment::<i64>::new();
        state.apply_changes(&mut delta, &mut deltadelta, false);
        let element = delta.sequence_element(v(0)).unwrap();
        assert_eq!(element.forward_sequence(), &[1, 0, 2]);
        assert_eq!(element.backward_sequence(), &[2, 0, 1]);
    }

    #[test]
    fn test_seq_state_deactivation_emitted() {
        let mut state = SeqState::new(vec![v(0)]);
        state.start(&seq_reference(&[&[0, 1]]));
        state.deactivate(0);
        let mut delta = Assignment::<i64>::new();
        let mut deltadelta = Assignment::<i64>::new();
        state.apply_changes(&mut delta, &mut deltadelta, false);
        assert!(!delta.sequence_element(v(0)).unwrap().activated());
    }
}
