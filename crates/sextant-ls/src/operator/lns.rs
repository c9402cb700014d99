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

//! Large neighborhood search operators.
//!
//! LNS operators do not build complete neighbors: they *free* a fragment
//! of variables by deactivating them, and leave the re-insertion to the
//! nested solve. `SimpleLns` frees contiguous fragments, `RandomLns`
//! random ones, and `PathLns` frees chains of consecutive path nodes
//! starting at each of its base nodes.

use crate::operator::path::{self, PathOperator, PathState};
use crate::operator::state::VarState;
use crate::operator::LocalSearchOperator;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sextant_model::assignment::Assignment;
use sextant_model::index::VarIndex;
use sextant_search::num::SolverNumeric;

/// Frees `number_of_variables` contiguous variables per fragment,
/// sliding the fragment start by one each neighbor.
#[derive(Debug, Clone)]
pub struct SimpleLns<T> {
    state: VarState<T>,
    index: usize,
    number_of_variables: usize,
}

impl<T> SimpleLns<T>
where
    T: SolverNumeric,
{
    /// Creates a simple LNS operator freeing `number_of_variables`
    /// variables per neighbor.
    ///
    /// # Panics
    ///
    /// Panics if `number_of_variables` is zero.
    pub fn new(vars: Vec<VarIndex>, number_of_variables: usize) -> Self {
        assert!(
            number_of_variables > 0,
            "called `SimpleLns::new` with a zero fragment size"
        );
        Self {
            state: VarState::new(vars),
            index: 0,
            number_of_variables,
        }
    }

    fn next_fragment(&mut self) -> Option<Vec<usize>> {
        let size = self.state.size();
        if self.index < size {
            let fragment = (self.index..self.index + self.number_of_variables)
                .map(|i| i % size)
                .collect();
            self.index += 1;
            Some(fragment)
        } else {
            None
        }
    }
}

impl<T> LocalSearchOperator<T> for SimpleLns<T>
where
    T: SolverNumeric,
{
    fn name(&self) -> &str {
        "SimpleLns"
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
            match self.next_fragment() {
                Some(fragment) => {
                    for index in fragment {
                        debug_assert!(
                            index < self.state.size(),
                            "called `SimpleLns::make_next_neighbor` with fragment index out of bounds: the size is {} but the index is {}",
                            self.state.size(),
                            index
                        );
                        self.state.deactivate(index);
                    }
                }
                None => return false,
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

/// Frees up to `number_of_variables` random variables per neighbor,
/// drawing with replacement. The neighborhood never exhausts on its own;
/// it is meant to be stopped by search limits.
#[derive(Debug, Clone)]
pub struct RandomLns<T> {
    state: VarState<T>,
    number_of_variables: usize,
    rng: ChaCha8Rng,
}

impl<T> RandomLns<T>
where
    T: SolverNumeric,
{
    /// Creates a random LNS operator with an entropy-derived seed.
    ///
    /// # Panics
    ///
    /// Panics if `number_of_variables` is zero or exceeds the number of
    /// variables.
    pub fn new(vars: Vec<VarIndex>, number_of_variables: usize) -> Self {
        Self::with_rng(vars, number_of_variables, ChaCha8Rng::from_entropy())
    }

    /// Creates a random LNS operator with an explicit seed.
    pub fn with_seed(vars: Vec<VarIndex>, number_of_variables: usize, seed: u64) -> Self {
        Self::with_rng(vars, number_of_variables, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(vars: Vec<VarIndex>, number_of_variables: usize, rng: ChaCha8Rng) -> Self {
        assert!(
            number_of_variables > 0,
            "called `RandomLns` constructor with a zero fragment size"
        );
        assert!(
            number_of_variables <= vars.len(),
            "called `RandomLns` constructor with fragment size {} exceeding {} variables",
            number_of_variables,
            vars.len()
        );
        Self {
            state: VarState::new(vars),
            number_of_variables,
            rng,
        }
    }
}

impl<T> LocalSearchOperator<T> for RandomLns<T>
where
    T: SolverNumeric,
{
    fn name(&self) -> &str {
        "RandomLns"
    }

    fn start(&mut self, assignment: &Assignment<T>) {
        self.state.start(assignment);
    }

    fn make_next_neighbor(
        &mut self,
        delta: &mut Assignment<T>,
        deltadelta: &mut Assignment<T>,
    ) -> bool {
        self.state.revert_changes(true, false);
        let size = self.state.size();
        for _ in 0..self.number_of_variables {
            let index = self.rng.gen_range(0..size);
            self.state.deactivate(index);
        }
        self.state
            .apply_changes(delta, deltadelta, false, |_, _| true)
    }
}

/// Frees `number_of_chunks` chains of `chunk_size` consecutive path
/// nodes, one chain per base node. With `unactive_fragments` set, every
/// currently-inactive node is freed as well, so its re-insertion is
/// reconsidered by the nested solve.
#[derive(Debug, Clone)]
pub struct PathLns<T> {
    state: PathState<T>,
    chunk_size: usize,
    unactive_fragments: bool,
}

impl<T> PathLns<T>
where
    T: SolverNumeric,
{
    /// Creates a path LNS operator.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    pub fn new(
        next_vars: Vec<VarIndex>,
        path_vars: Option<Vec<VarIndex>>,
        number_of_chunks: usize,
        chunk_size: usize,
        unactive_fragments: bool,
    ) -> Self {
        assert!(
            chunk_size > 0,
            "called `PathLns::new` with a zero chunk size"
        );
        Self {
            state: PathState::new(next_vars, path_vars, number_of_chunks),
            chunk_size,
            unactive_fragments,
        }
    }

    fn deactivate_chain(&mut self, node: usize) {
        let number_of_nexts = self.state.number_of_nexts();
        let ignore_path_vars = self.state.ignore_path_vars();
        let mut current = node;
        for _ in 0..self.chunk_size {
            if self.state.is_path_end(current) {
                break;
            }
            self.state.var_state_mut().deactivate(current);
            if !ignore_path_vars {
                self.state
                    .var_state_mut()
                    .deactivate(number_of_nexts + current);
            }
            current = self.state.next(current);
        }
    }

    fn deactivate_unactives(&mut self) {
        if !self.unactive_fragments {
            return;
        }
        let number_of_nexts = self.state.number_of_nexts();
        let ignore_path_vars = self.state.ignore_path_vars();
        for i in 0..number_of_nexts {
            if self.state.is_inactive(i) {
                self.state.var_state_mut().deactivate(i);
                if !ignore_path_vars {
                    self.state.var_state_mut().deactivate(number_of_nexts + i);
                }
            }
        }
    }
}

impl<T> PathOperator<T> for PathLns<T>
where
    T: SolverNumeric,
{
    fn path_state(&self) -> &PathState<T> {
        &self.state
    }

    fn path_state_mut(&mut self) -> &mut PathState<T> {
        &mut self.state
    }

    fn make_neighbor(&mut self) -> bool {
        for i in 0..self.state.num_base_nodes() {
            let base = self.state.base_node(i);
            self.deactivate_chain(base);
        }
        self.deactivate_unactives();
        true
    }
}

impl<T> LocalSearchOperator<T> for PathLns<T>
where
    T: SolverNumeric,
{
    fn name(&self) -> &str {
        "PathLns"
    }

    fn start(&mut self, assignment: &Assignment<T>) {
        path::start(self, assignment);
    }

    fn make_next_neighbor(
        &mut self,
        delta: &mut Assignment<T>,
        deltadelta: &mut Assignment<T>,
    ) -> bool {
        path::make_next_neighbor(self, delta, deltadelta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::path::test_support::path_assignment;

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

    fn deactivated_set(delta: &Assignment<i64>) -> Vec<usize> {
        let mut out: Vec<usize> = delta
            .int_elements()
            .iter()
            .filter(|e| !e.activated())
            .map(|e| e.var().get())
            .collect();
        out.sort_unstable();
        out
    }

    #[test]
    fn test_simple_lns_slides_fragments_and_wraps() {
        // Fragment size 2 over 5 variables: {0,1}, {1,2}, {2,3}, {3,4},
        // {4,0}, then exhaustion.
        let mut op = SimpleLns::<i64>::new((0..5).map(v).collect(), 2);
        op.start(&reference(&[0, 1, 2, 3, 4]));
        let mut fragments = Vec::new();
        let mut delta = Assignment::new();
        let mut deltadelta = Assignment::new();
        loop {
            delta.clear();
            deltadelta.clear();
            if !op.make_next_neighbor(&mut delta, &mut deltadelta) {
                break;
            }
            fragments.push(deactivated_set(&delta));
        }
        assert_eq!(
            fragments,
            vec![
                vec![0, 1],
                vec![1, 2],
                vec![2, 3],
                vec![3, 4],
                vec![0, 4],
            ]
        );
    }

    #[test]
    fn test_simple_lns_restarts_on_start() {
        let mut op = SimpleLns::<i64>::new((0..3).map(v).collect(), 1);
        let a = reference(&[0, 1, 2]);
        op.start(&a);
        let mut delta = Assignment::new();
        let mut deltadelta = Assignment::new();
        assert!(op.make_next_neighbor(&mut delta, &mut deltadelta));
        op.start(&a);
        delta.clear();
        assert!(op.make_next_neighbor(&mut delta, &mut deltadelta));
        assert_eq!(deactivated_set(&delta), vec![0]);
    }

    #[test]
    fn test_random_lns_is_deterministic_under_seed() {
        let a = reference(&[0, 1, 2, 3, 4, 5]);
        let mut op1 = RandomLns::<i64>::with_seed((0..6).map(v).collect(), 3, 42);
        let mut op2 = RandomLns::<i64>::with_seed((0..6).map(v).collect(), 3, 42);
        op1.start(&a);
        op2.start(&a);
        let mut delta1 = Assignment::new();
        let mut delta2 = Assignment::new();
        let mut dd = Assignment::new();
        for _ in 0..8 {
            delta1.clear();
            delta2.clear();
            dd.clear();
            assert!(op1.make_next_neighbor(&mut delta1, &mut dd));
            dd.clear();
            assert!(op2.make_next_neighbor(&mut delta2, &mut dd));
            assert_eq!(deactivated_set(&delta1), deactivated_set(&delta2));
            // Drawing with replacement: at most 3 distinct indices.
            assert!(deactivated_set(&delta1).len() <= 3);
            assert!(!delta1.is_empty());
        }
    }

    #[test]
    #[should_panic(expected = "exceeding")]
    fn test_random_lns_rejects_oversized_fragment() {
        let _ = RandomLns::<i64>::with_seed((0..2).map(v).collect(), 3, 0);
    }

    #[test]
    fn test_path_lns_deactivates_chunks() {
        // Path 0→1→2→3→4, one chunk of size 2.
        let a = path_assignment(5, &[&[0, 1, 2, 3, 4]]);
        let mut op =
            PathLns::<i64>::new((0..5).map(v).collect(), None, 1, 2, false);
        op.start(&a);
        let mut delta = Assignment::new();
        let mut deltadelta = Assignment::new();
        assert!(op.make_next_neighbor(&mut delta, &mut deltadelta));
        // The first chunk frees the first two path nodes.
        assert_eq!(deactivated_set(&delta), vec![0, 1]);
    }

    #[test]
    fn test_path_lns_reemits_inactive_nodes() {
        // Node 4 is inactive; with unactive_fragments it is freed in
        // every neighbor.
        let a = path_assignment(5, &[&[0, 1, 2, 3]]);
        let mut op =
            PathLns::<i64>::new((0..5).map(v).collect(), None, 1, 1, true);
        op.start(&a);
        let mut delta = Assignment::new();
        let mut deltadelta = Assignment::new();
        assert!(op.make_next_neighbor(&mut delta, &mut deltadelta));
        let freed = deactivated_set(&delta);
        assert!(freed.contains(&4), "inactive node not freed: {:?}", freed);
    }
}
