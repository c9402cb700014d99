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

//! The exchange operator.
//!
//! Swaps the successors of the two base nodes via two chained
//! `move_chain` calls, with the two adjacency configurations handled as
//! single-move special cases. Possible neighbors for `1 → 2 → 3 → 4 → 5`
//! (1 and 5 fixed):
//!
//! - `1 → 3 → 2 → 4 → 5`
//! - `1 → 4 → 3 → 2 → 5`
//! - `1 → 2 → 4 → 3 → 5`

use crate::operator::path::{self, PathOperator, PathState};
use crate::operator::LocalSearchOperator;
use sextant_model::assignment::Assignment;
use sextant_model::index::VarIndex;
use sextant_search::num::SolverNumeric;

/// Exchanges the positions of two nodes.
#[derive(Debug, Clone)]
pub struct Exchange<T> {
    state: PathState<T>,
}

impl<T> Exchange<T>
where
    T: SolverNumeric,
{
    /// Creates an exchange operator over the given `next` variables.
    pub fn new(next_vars: Vec<VarIndex>, path_vars: Option<Vec<VarIndex>>) -> Self {
        Self {
            state: PathState::new(next_vars, path_vars, 2),
        }
    }
}

impl<T> PathOperator<T> for Exchange<T>
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
        let prev_node0 = self.state.base_node(0);
        if self.state.is_path_end(prev_node0) {
            return false;
        }
        let node0 = self.state.next(prev_node0);
        let prev_node1 = self.state.base_node(1);
        if self.state.is_path_end(prev_node1) {
            return false;
        }
        let node1 = self.state.next(prev_node1);
        if node0 == prev_node1 {
            self.state.move_chain(prev_node1, node1, prev_node0)
        } else if node1 == prev_node0 {
            self.state.move_chain(prev_node0, node0, prev_node1)
        } else {
            self.state.move_chain(prev_node0, node0, prev_node1) && {
                let after_node0 = self.state.next(node0);
                self.state.move_chain(node0, after_node0, prev_node0)
            }
        }
    }
}

impl<T> LocalSearchOperator<T> for Exchange<T>
where
    T: SolverNumeric,
{
    fn name(&self) -> &str {
        "Exchange"
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

    fn collect_neighbors(
        op: &mut Exchange<i64>,
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
            let mut candidate = reference.clone();
            candidate.copy_from(&delta);
            neighbors.push(read_path(&candidate, start, num_nodes));
            assert!(neighbors.len() < 128, "exchange failed to terminate");
        }
        neighbors
    }

    #[test]
    fn test_exchange_swaps_distant_nodes() {
        // 0→1→2→3→4 with bases 0 and 2 swaps nodes 1 and 3.
        let reference = path_assignment(5, &[&[0, 1, 2, 3, 4]]);
        let mut op = Exchange::<i64>::new((0..5).map(VarIndex::new).collect(), None);
        let neighbors = collect_neighbors(&mut op, &reference, 0, 5);
        assert!(neighbors.contains(&vec![0, 3, 2, 1, 4]));
    }

    #[test]
    fn test_exchange_swaps_adjacent_nodes() {
        let reference = path_assignment(4, &[&[0, 1, 2, 3]]);
        let mut op = Exchange::<i64>::new((0..4).map(VarIndex::new).collect(), None);
        let neighbors = collect_neighbors(&mut op, &reference, 0, 4);
        // Adjacent swap of 1 and 2.
        assert!(neighbors.contains(&vec![0, 2, 1, 3]));
    }

    #[test]
    fn test_exchange_preserves_node_set() {
        let reference = path_assignment(5, &[&[0, 1, 2, 3, 4]]);
        let mut op = Exchange::<i64>::new((0..5).map(VarIndex::new).collect(), None);
        for neighbor in collect_neighbors(&mut op, &reference, 0, 5) {
            let mut nodes = neighbor.clone();
            nodes.sort_unstable();
            assert_eq!(nodes, vec![0, 1, 2, 3, 4], "node set broken: {:?}", neighbor);
        }
    }
}
