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

//! Scalar single-variable operators.
//!
//! `ChangeValue` applies a value transformation to one variable per
//! neighbor, sweeping the variables in order; increment and decrement
//! are its two standard instantiations. `MoveTowardTarget` reassigns one
//! variable per neighbor from its current value to the value a target
//! assignment prescribes.

use crate::operator::state::VarState;
use crate::operator::LocalSearchOperator;
use sextant_model::assignment::Assignment;
use sextant_model::index::VarIndex;
use sextant_search::num::SolverNumeric;

/// Applies `modify` to one variable per neighbor, in variable order.
#[derive(Debug, Clone)]
pub struct ChangeValue<T> {
    state: VarState<T>,
    index: usize,
    modify: fn(usize, T) -> T,
    name: &'static str,
}

impl<T> ChangeValue<T>
where
    T: SolverNumeric,
{
    /// Creates an operator applying an arbitrary value transformation.
    pub fn new(vars: Vec<VarIndex>, modify: fn(usize, T) -> T, name: &'static str) -> Self {
        Self {
            state: VarState::new(vars),
            index: 0,
            modify,
            name,
        }
    }

    /// Creates the increment operator: `value + 1` for each variable in
    /// turn.
    pub fn increment(vars: Vec<VarIndex>) -> Self {
        Self::new(vars, |_, value| value + T::PLUS_ONE, "IncrementValue")
    }

    /// Creates the decrement operator: `value - 1` for each variable in
    /// turn.
    pub fn decrement(vars: Vec<VarIndex>) -> Self {
        Self::new(vars, |_, value| value - T::PLUS_ONE, "DecrementValue")
    }

    fn make_one_neighbor(&mut self) -> bool {
        if self.index < self.state.size() {
            let value = (self.modify)(self.index, self.state.value(self.index));
            self.state.set_value(self.index, value);
            self.index += 1;
            return true;
        }
        false
    }
}

impl<T> LocalSearchOperator<T> for ChangeValue<T>
where
    T: SolverNumeric,
{
    fn name(&self) -> &str {
        self.name
    }

    fn start(&mut self, assignment: &Assignment<T>) {
        self.state.start(assignment);
        self.index = 0;
    }

    fn make_next_neighbor(
        &mut self,
        delta: &mut Assignment<T>,
        deltadelta: &mut Assignment<T>,
    ) -> bool {
        loop {
            self.state.revert_changes(true, false);
            if !self.make_one_neighbor() {
                return false;
            }
            if self
                .state
                .apply_changes(delta, deltadelta, false, |_, _| true)
            {
                return true;
            }
        }
    }
}

/// Compares the reference assignment with a target one and generates
/// neighbors reassigning a single variable from its current value to its
/// target value.
#[derive(Debug, Clone)]
pub struct MoveTowardTarget<T> {
    state: VarState<T>,
    target: Vec<T>,
    // Index of the next variable to try to restore. Deliberately kept
    // across starts: variables just checked are less likely to be
    // restorable than the ones not visited yet, and restarting from 0
    // after each accepted move degenerates to a quadratic sweep.
    variable_index: usize,
    num_var_since_last_start: usize,
}

impl<T> MoveTowardTarget<T>
where
    T: SolverNumeric,
{
    /// Creates the operator from parallel variable and target-value
    /// lists.
    ///
    /// # Panics
    ///
    /// Panics if the lists have different lengths or are empty.
    pub fn new(vars: Vec<VarIndex>, target_values: Vec<T>) -> Self {
        assert_eq!(
            vars.len(),
            target_values.len(),
            "called `MoveTowardTarget::new` with mismatched lengths: {} variables but {} target values",
            vars.len(),
            target_values.len()
        );
        assert!(
            !vars.is_empty(),
            "called `MoveTowardTarget::new` with no variables"
        );
        // Start one before index 0 so the first increment tries index 0.
        let variable_index = vars.len() - 1;
        Self {
            state: VarState::new(vars),
            target: target_values,
            variable_index,
            num_var_since_last_start: 0,
        }
    }

    /// Creates the operator from a target assignment, taking variables
    /// in container order.
    pub fn from_assignment(target: &Assignment<T>) -> Self {
        let mut vars = Vec::with_capacity(target.num_int_elements());
        let mut values = Vec::with_capacity(target.num_int_elements());
        for element in target.int_elements() {
            vars.push(element.var());
            values.push(element.value());
        }
        Self::new(vars, values)
    }

    fn make_one_neighbor(&mut self) -> bool {
        while self.num_var_since_last_start < self.state.size() {
            self.num_var_since_last_start += 1;
            self.variable_index = (self.variable_index + 1) % self.state.size();
            let target_value = self.target[self.variable_index];
            let current_value = self.state.old_value(self.variable_index);
            if current_value != target_value {
                self.state.set_value(self.variable_index, target_value);
                return true;
            }
        }
        false
    }
}

impl<T> LocalSearchOperator<T> for MoveTowardTarget<T>
where
    T: SolverNumeric,
{
    fn name(&self) -> &str {
        "MoveTowardTarget"
    }

    fn start(&mut self, assignment: &Assignment<T>) {
        self.state.start(assignment);
        self.num_var_since_last_start = 0;
    }

    fn make_next_neighbor(
        &mut self,
        delta: &mut Assignment<T>,
        deltadelta: &mut Assignment<T>,
    ) -> bool {
        loop {
            self.state.revert_changes(true, false);
            if !self.make_one_neighbor() {
                return false;
            }
            if self
                .state
                .apply_changes(delta, deltadelta, false, |_, _| true)
            {
                return true;
            }
        }
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

    fn collect_deltas<O: LocalSearchOperator<i64>>(
        op: &mut O,
        reference: &Assignment<i64>,
    ) -> Vec<Assignment<i64>> {
        op.start(reference);
        let mut out = Vec::new();
        let mut delta = Assignment::new();
        let mut deltadelta = Assignment::new();
        loop {
            delta.clear();
            deltadelta.clear();
            if !op.make_next_neighbor(&mut delta, &mut deltadelta) {
                break;
            }
            out.push(delta.clone());
            assert!(out.len() < 64, "operator failed to terminate");
        }
        out
    }

    #[test]
    fn test_increment_sweeps_variables() {
        let a = reference(&[10, 20, 30]);
        let mut op = ChangeValue::<i64>::increment((0..3).map(v).collect());
        assert_eq!(op.name(), "IncrementValue");
        let deltas = collect_deltas(&mut op, &a);
        assert_eq!(deltas.len(), 3);
        assert_eq!(deltas[0].element(v(0)).unwrap().value(), 11);
        assert_eq!(deltas[1].element(v(1)).unwrap().value(), 21);
        assert_eq!(deltas[2].element(v(2)).unwrap().value(), 31);
        // One variable per neighbor.
        for delta in &deltas {
            assert_eq!(delta.num_int_elements(), 1);
        }
    }

    #[test]
    fn test_decrement_sweeps_variables() {
        let a = reference(&[5, 7]);
        let mut op = ChangeValue::<i64>::decrement((0..2).map(v).collect());
        let deltas = collect_deltas(&mut op, &a);
        assert_eq!(deltas.len(), 2);
        assert_eq!(deltas[0].element(v(0)).unwrap().value(), 4);
        assert_eq!(deltas[1].element(v(1)).unwrap().value(), 6);
    }

    #[test]
    fn test_move_toward_target_skips_matching_variables() {
        let a = reference(&[1, 5, 3]);
        let mut op = MoveTowardTarget::new((0..3).map(v).collect(), vec![1, 9, 7]);
        let deltas = collect_deltas(&mut op, &a);
        // Variables 1 and 2 differ from the target; variable 0 matches.
        assert_eq!(deltas.len(), 2);
        assert_eq!(deltas[0].element(v(1)).unwrap().value(), 9);
        assert_eq!(deltas[1].element(v(2)).unwrap().value(), 7);
    }

    #[test]
    fn test_move_toward_target_keeps_cursor_across_starts() {
        let a = reference(&[1, 5, 3]);
        let mut op = MoveTowardTarget::new((0..3).map(v).collect(), vec![9, 9, 9]);
        op.start(&a);
        let mut delta = Assignment::new();
        let mut deltadelta = Assignment::new();
        assert!(op.make_next_neighbor(&mut delta, &mut deltadelta));
        assert!(delta.contains(v(0)));

        // A restart resumes after the last modified variable instead of
        // rescanning from index 0.
        op.start(&a);
        delta.clear();
        assert!(op.make_next_neighbor(&mut delta, &mut deltadelta));
        assert!(delta.contains(v(1)));
    }

    #[test]
    fn test_move_toward_target_from_assignment() {
        let mut target = Assignment::new();
        target.add(v(0), 4);
        target.add(v(1), 2);
        let a = reference(&[4, 0]);
        let mut op = MoveTowardTarget::from_assignment(&target);
        let deltas = collect_deltas(&mut op, &a);
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].element(v(1)).unwrap().value(), 2);
    }

    #[test]
    #[should_panic(expected = "mismatched lengths")]
    fn test_mismatched_target_lengths_are_rejected() {
        let _ = MoveTowardTarget::<i64>::new(vec![v(0)], vec![1, 2]);
    }
}
