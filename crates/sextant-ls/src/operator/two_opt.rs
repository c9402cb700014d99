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

//! The 2-opt operator.
//!
//! Reverses a sub-chain of a path; the name comes from breaking two arcs.
//! Possible neighbors for the path `1 → 2 → 3 → 4 → 5` (where 1 and 5 are
//! the fixed extremities):
//!
//! - `1 → 3 → 2 → 4 → 5`
//! - `1 → 4 → 3 → 2 → 5`
//! - `1 → 2 → 4 → 3 → 5`
//!
//! The operator is incremental: for a fixed outer base it extends the
//! reversed chain by sliding one node per neighbor with a single
//! `move_chain`, instead of re-reversing from scratch.

use crate::operator::path::{self, PathOperator, PathState};
use crate::operator::LocalSearchOperator;
use sextant_model::assignment::Assignment;
use sextant_model::index::VarIndex;
use sextant_search::num::SolverNumeric;

/// Reverses sub-chains of a path, extending the reversal incrementally.
#[derive(Debug, Clone)]
pub struct TwoOpt<T> {
    state: PathState<T>,
    last_base: Option<usize>,
    last: Option<usize>,
}

impl<T> TwoOpt<T>
where
    T: SolverNumeric,
{
    /// Creates a 2-opt operator over the given `next` variables.
    pub fn new(next_vars: Vec<VarIndex>, path_vars: Option<Vec<VarIndex>>) -> Self {
        Self {
            state: PathState::new(next_vars, path_vars, 2),
            last_base: None,
            last: None,
        }
    }
}

impl<T> PathOperator<T> for TwoOpt<T>
where
    T: SolverNumeric,
{
    fn path_state(&self) -> &PathState<T> {
        &self.state
    }

    fn path_state_mut(&mut self) -> &mut PathState<T> {
        &mut self.state
    }

    fn is_incremental(&self) -> bool {
        true
    }

    fn on_same_path_as_previous_base(&self, _base_index: usize) -> bool {
        // Both base nodes have to be on the same path.
        true
    }

    fn on_node_initialization(&mut self) {
        self.last = None;
    }

    fn make_neighbor(&mut self) -> bool {
        debug_assert_eq!(
            self.state.start_node(0),
            self.state.start_node(1),
            "called `TwoOpt::make_neighbor` with base nodes on distinct paths"
        );
        let base0 = self.state.base_node(0);
        let base1 = self.state.base_node(1);
        if self.last_base != Some(base0) || self.last.is_none() {
            self.state.revert_full();
            if self.state.is_path_end(base0) {
                self.last = None;
                return false;
            }
            self.last_base = Some(base0);
            self.last = Some(self.state.next(base0));
            if self.state.reverse_chain(base0, base1).is_some() {
                true
            } else {
                self.last = None;
                false
            }
        } else {
            let last = self.last.expect("sliding branch requires a chain");
            let to_move = self.state.next(last);
            // The sliding chain can break when the inner base reaches a
            // path end mid-sequence; report no neighbor instead of
            // panicking.
            if self.state.is_path_end(to_move) || self.state.next(to_move) != base1 {
                return false;
            }
            self.state.move_chain(last, to_move, base0)
        }
    }
}

impl<T> LocalSearchOperator<T> for TwoOpt<T>
where
    T: SolverNumeric,
{
    fn name(&self) -> &str {
        "TwoOpt"
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
    use crate::operator::path::test_support::{path_assignment, read_path};

    /// Runs the operator to exhaustion, returning every distinct
    /// non-empty neighbor as the path it induces from `start`.
    fn collect_neighbors(
        op: &mut TwoOpt<i64>,
        reference: &Assignment<i64>,
        start: usize,
        num_nodes: usize,
    ) -> Vec<Vec<usize>> {
        op.start(reference);
        let mut neighbors = Vec::new();
        let mut delta = Assignment::new();
        let mut deltadelta = Assignment::new();
        loop {
            delta.clear();
            deltadelta.clear();
            if !op.make_next_neighbor(&mut delta, &mut deltadelta) {
                break;
            }
            if delta.is_empty() {
                continue;
            }
            let mut candidate = reference.clone();
            candidate.copy_from(&delta);
            neighbors.push(read_path(&candidate, start, num_nodes));
            assert!(neighbors.len() < 64, "two-opt failed to terminate");
        }
        neighbors
    }

    #[test]
    fn test_two_opt_neighborhood_on_five_node_path() {
        // 0→1→2→3→4: the three interior reversals.
        let reference = path_assignment(5, &[&[0, 1, 2, 3, 4]]);
        let mut op = TwoOpt::<i64>::new((0..5).map(VarIndex::new).collect(), None);
        let mut neighbors = collect_neighbors(&mut op, &reference, 0, 5);
        neighbors.sort();
        let mut expected = vec![
            vec![0, 2, 1, 3, 4],
            vec![0, 3, 2, 1, 4],
            vec![0, 1, 3, 2, 4],
        ];
        expected.sort();
        assert_eq!(neighbors, expected);
    }

    #[test]
    fn test_two_opt_emits_deltadeltas_while_sliding() {
        let reference = path_assignment(5, &[&[0, 1, 2, 3, 4]]);
        let mut op = TwoOpt::<i64>::new((0..5).map(VarIndex::new).collect(), None);
        op.start(&reference);

        let mut delta = Assignment::new();
        let mut deltadelta = Assignment::new();
        let mut delta_prev = Assignment::new();
        let mut composed = 0;
        while {
            delta.clear();
            deltadelta.clear();
            op.make_next_neighbor(&mut delta, &mut deltadelta)
        } {
            if !deltadelta.is_empty() {
                // apply(apply(a, delta_prev), deltadelta) equals
                // apply(a, delta_current).
                let mut via_incremental = reference.clone();
                via_incremental.copy_from(&delta_prev);
                via_incremental.copy_from(&deltadelta);
                let mut via_full = reference.clone();
                via_full.copy_from(&delta);
                assert_eq!(via_incremental, via_full);
                composed += 1;
            }
            delta_prev = delta.clone();
        }
        assert!(composed > 0, "expected at least one incremental emission");
    }

    #[test]
    fn test_two_opt_terminates_on_trivial_path() {
        // A two-node path has no interior chain to reverse.
        let reference = path_assignment(2, &[&[0, 1]]);
        let mut op = TwoOpt::<i64>::new((0..2).map(VarIndex::new).collect(), None);
        let neighbors = collect_neighbors(&mut op, &reference, 0, 2);
        assert!(neighbors.is_empty());
    }
}
