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

//! Operator combinators.
//!
//! Combinators are the only part of the operator layer that deals in
//! boxed trait objects: `CompoundOperator` concatenates a list of
//! operators under a priority evaluator, `RandomCompoundOperator`
//! shuffles the list on every call, and `NeighborhoodLimit` caps the
//! number of neighborhood calls of a single child.

use crate::operator::LocalSearchOperator;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sextant_model::assignment::Assignment;
use sextant_search::num::SolverNumeric;

/// Ordering key for no-restart concatenation: rotates the previously
/// active operator to the front so exploration resumes where it
/// stopped.
fn compound_operator_no_restart(size: usize, active_index: usize, operator_index: usize) -> i64 {
    if operator_index < active_index {
        (size + operator_index - active_index) as i64
    } else {
        (operator_index - active_index) as i64
    }
}

/// Ordering key for restart concatenation: every start resets to the
/// construction order.
fn compound_operator_restart(_active_index: usize, _operator_index: usize) -> i64 {
    0
}

/// Sequential concatenation of operators.
///
/// On `start`, children are started and their order is re-derived from
/// the evaluator, keyed by the previously active child; ties break on
/// the child index. `make_next_neighbor` advances through the sorted
/// list, wrapping once, and fails after a full cycle without a
/// neighbor.
pub struct CompoundOperator<T> {
    operators: Vec<Box<dyn LocalSearchOperator<T>>>,
    operator_indices: Vec<usize>,
    index: usize,
    evaluator: Box<dyn Fn(usize, usize) -> i64>,
}

impl<T> CompoundOperator<T>
where
    T: SolverNumeric,
{
    /// Concatenates operators under a custom `(active, index) -> key`
    /// evaluator.
    ///
    /// # Panics
    ///
    /// Panics if `operators` is empty.
    pub fn with_evaluator(
        operators: Vec<Box<dyn LocalSearchOperator<T>>>,
        evaluator: Box<dyn Fn(usize, usize) -> i64>,
    ) -> Self {
        assert!(
            !operators.is_empty(),
            "called `CompoundOperator` constructor with no operators"
        );
        let operator_indices = (0..operators.len()).collect();
        Self {
            operators,
            operator_indices,
            index: 0,
            evaluator,
        }
    }

    /// Concatenates operators so that exploration resumes from the
    /// operator that produced the last neighbor.
    pub fn concatenate(operators: Vec<Box<dyn LocalSearchOperator<T>>>) -> Self {
        let size = operators.len();
        Self::with_evaluator(
            operators,
            Box::new(move |active, index| compound_operator_no_restart(size, active, index)),
        )
    }

    /// Concatenates operators restarting from the first one on every
    /// start.
    pub fn concatenate_restart(operators: Vec<Box<dyn LocalSearchOperator<T>>>) -> Self {
        Self::with_evaluator(operators, Box::new(compound_operator_restart))
    }
}

impl<T> LocalSearchOperator<T> for CompoundOperator<T>
where
    T: SolverNumeric,
{
    fn name(&self) -> &str {
        "CompoundOperator"
    }

    fn start(&mut self, assignment: &Assignment<T>) {
        for operator in &mut self.operators {
            operator.start(assignment);
        }
        let active = self.operator_indices[self.index];
        let evaluator = &self.evaluator;
        self.operator_indices.sort_by(|&lhs, &rhs| {
            let lhs_value = evaluator(active, lhs);
            let rhs_value = evaluator(active, rhs);
            lhs_value.cmp(&rhs_value).then(lhs.cmp(&rhs))
        });
        self.index = 0;
    }

    fn make_next_neighbor(
        &mut self,
        delta: &mut Assignment<T>,
        deltadelta: &mut Assignment<T>,
    ) -> bool {
        let size = self.operators.len();
        loop {
            let operator_index = self.operator_indices[self.index];
            if self.operators[operator_index].make_next_neighbor(delta, deltadelta) {
                return true;
            }
            self.index += 1;
            if self.index == size {
                self.index = 0;
            }
            if self.index == 0 {
                return false;
            }
        }
    }
}

/// Concatenation trying children in a fresh random order on every call.
pub struct RandomCompoundOperator<T> {
    operators: Vec<Box<dyn LocalSearchOperator<T>>>,
    rng: ChaCha8Rng,
}

impl<T> RandomCompoundOperator<T>
where
    T: SolverNumeric,
{
    /// Creates a random concatenation with an entropy-derived seed.
    pub fn new(operators: Vec<Box<dyn LocalSearchOperator<T>>>) -> Self {
        Self::with_rng(operators, ChaCha8Rng::from_entropy())
    }

    /// Creates a random concatenation with an explicit seed.
    pub fn with_seed(operators: Vec<Box<dyn LocalSearchOperator<T>>>, seed: u64) -> Self {
        Self::with_rng(operators, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(operators: Vec<Box<dyn LocalSearchOperator<T>>>, rng: ChaCha8Rng) -> Self {
        assert!(
            !operators.is_empty(),
            "called `RandomCompoundOperator` constructor with no operators"
        );
        Self { operators, rng }
    }
}

impl<T> LocalSearchOperator<T> for RandomCompoundOperator<T>
where
    T: SolverNumeric,
{
    fn name(&self) -> &str {
        "RandomCompoundOperator"
    }

    fn start(&mut self, assignment: &Assignment<T>) {
        for operator in &mut self.operators {
            operator.start(assignment);
        }
    }

    fn make_next_neighbor(
        &mut self,
        delta: &mut Assignment<T>,
        deltadelta: &mut Assignment<T>,
    ) -> bool {
        let mut indices: Vec<usize> = (0..self.operators.len()).collect();
        indices.shuffle(&mut self.rng);
        for index in indices {
            if self.operators[index].make_next_neighbor(delta, deltadelta) {
                return true;
            }
        }
        false
    }
}

/// Fails after a fixed number of neighborhood calls.
pub struct NeighborhoodLimit<T, O> {
    operator: O,
    limit: u64,
    next_neighborhood_calls: u64,
    _phantom: std::marker::PhantomData<T>,
}

impl<T, O> NeighborhoodLimit<T, O>
where
    T: SolverNumeric,
    O: LocalSearchOperator<T>,
{
    /// Wraps `operator`, allowing at most `limit` neighborhood calls per
    /// start.
    ///
    /// # Panics
    ///
    /// Panics if `limit` is zero.
    pub fn new(operator: O, limit: u64) -> Self {
        assert!(
            limit > 0,
            "called `NeighborhoodLimit::new` with a zero limit"
        );
        Self {
            operator,
            limit,
            next_neighborhood_calls: 0,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T, O> LocalSearchOperator<T> for NeighborhoodLimit<T, O>
where
    T: SolverNumeric,
    O: LocalSearchOperator<T>,
{
    fn name(&self) -> &str {
        "NeighborhoodLimit"
    }

    fn start(&mut self, assignment: &Assignment<T>) {
        self.next_neighborhood_calls = 0;
        self.operator.start(assignment);
    }

    fn make_next_neighbor(
        &mut self,
        delta: &mut Assignment<T>,
        deltadelta: &mut Assignment<T>,
    ) -> bool {
        if self.next_neighborhood_calls >= self.limit {
            return false;
        }
        self.next_neighborhood_calls += 1;
        self.operator.make_next_neighbor(delta, deltadelta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::scalar::ChangeValue;
    use sextant_model::index::VarIndex;

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

    /// Identifies which child produced a delta by the sign of the value
    /// change.
    fn produced_by_increment(reference: &Assignment<i64>, delta: &Assignment<i64>) -> bool {
        let element = &delta.int_elements()[0];
        element.value() > reference.element(element.var()).unwrap().value()
    }

    fn boxed_pair(size: usize) -> Vec<Box<dyn LocalSearchOperator<i64>>> {
        vec![
            Box::new(ChangeValue::<i64>::increment((0..size).map(v).collect())),
            Box::new(ChangeValue::<i64>::decrement((0..size).map(v).collect())),
        ]
    }

    #[test]
    fn test_compound_exhausts_all_children() {
        let a = reference(&[1, 2]);
        let mut op = CompoundOperator::concatenate(boxed_pair(2));
        op.start(&a);
        let mut delta = Assignment::new();
        let mut deltadelta = Assignment::new();
        let mut count = 0;
        loop {
            delta.clear();
            deltadelta.clear();
            if !op.make_next_neighbor(&mut delta, &mut deltadelta) {
                break;
            }
            count += 1;
            assert!(count <= 4, "compound failed to terminate");
        }
        // Two children with two neighbors each.
        assert_eq!(count, 4);
    }

    #[test]
    fn test_compound_no_restart_resumes_at_active_child() {
        // Exhaust the increment child, let the decrement child produce
        // the last neighbor, then restart: exploration must resume at
        // the decrement child.
        let a = reference(&[1, 2]);
        let mut op = CompoundOperator::concatenate(boxed_pair(2));
        op.start(&a);
        let mut delta = Assignment::new();
        let mut deltadelta = Assignment::new();
        // Consume the two increment neighbors and one decrement
        // neighbor.
        for _ in 0..3 {
            delta.clear();
            deltadelta.clear();
            assert!(op.make_next_neighbor(&mut delta, &mut deltadelta));
        }
        assert!(!produced_by_increment(&a, &delta));

        op.start(&a);
        delta.clear();
        deltadelta.clear();
        assert!(op.make_next_neighbor(&mut delta, &mut deltadelta));
        // No-restart ordering: the decrement child goes first now.
        assert!(!produced_by_increment(&a, &delta));
    }

    #[test]
    fn test_compound_restart_keeps_construction_order() {
        let a = reference(&[1, 2]);
        let mut op = CompoundOperator::concatenate_restart(boxed_pair(2));
        op.start(&a);
        let mut delta = Assignment::new();
        let mut deltadelta = Assignment::new();
        for _ in 0..3 {
            delta.clear();
            deltadelta.clear();
            assert!(op.make_next_neighbor(&mut delta, &mut deltadelta));
        }
        op.start(&a);
        delta.clear();
        deltadelta.clear();
        assert!(op.make_next_neighbor(&mut delta, &mut deltadelta));
        // Restart ordering: back to the increment child.
        assert!(produced_by_increment(&a, &delta));
    }

    #[test]
    fn test_random_compound_is_deterministic_under_seed() {
        let a = reference(&[1, 2, 3]);
        let mut op1 = RandomCompoundOperator::with_seed(boxed_pair(3), 11);
        let mut op2 = RandomCompoundOperator::with_seed(boxed_pair(3), 11);
        op1.start(&a);
        op2.start(&a);
        let mut d1 = Assignment::new();
        let mut d2 = Assignment::new();
        let mut dd = Assignment::new();
        for _ in 0..6 {
            d1.clear();
            d2.clear();
            dd.clear();
            let r1 = op1.make_next_neighbor(&mut d1, &mut dd);
            dd.clear();
            let r2 = op2.make_next_neighbor(&mut d2, &mut dd);
            assert_eq!(r1, r2);
            assert_eq!(d1, d2);
        }
    }

    #[test]
    fn test_neighborhood_limit_cuts_off_calls() {
        let a = reference(&[1, 2, 3]);
        let inner = ChangeValue::<i64>::increment((0..3).map(v).collect());
        let mut op = NeighborhoodLimit::new(inner, 2);
        op.start(&a);
        let mut delta = Assignment::new();
        let mut deltadelta = Assignment::new();
        assert!(op.make_next_neighbor(&mut delta, &mut deltadelta));
        delta.clear();
        assert!(op.make_next_neighbor(&mut delta, &mut deltadelta));
        delta.clear();
        // Third call exceeds the limit even though the child has one
        // more neighbor.
        assert!(!op.make_next_neighbor(&mut delta, &mut deltadelta));

        // The budget resets on start.
        op.start(&a);
        delta.clear();
        assert!(op.make_next_neighbor(&mut delta, &mut deltadelta));
    }

    #[test]
    #[should_panic(expected = "zero limit")]
    fn test_zero_limit_is_rejected() {
        let inner = ChangeValue::<i64>::increment(vec![v(0)]);
        let _ = NeighborhoodLimit::new(inner, 0);
    }
}
