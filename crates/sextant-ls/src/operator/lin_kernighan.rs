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

//! The Lin-Kernighan operator.
//!
//! While the accumulated local gain stays positive, performs an optional
//! 3-opt step followed by a series of 2-opt moves, returning the first
//! neighbor whose closing gain is positive. Candidate target nodes come
//! from a lazily-built nearest-neighbor oracle: for each node, the
//! cheapest `LIN_KERNIGHAN_NEIGHBORS` outgoing targets over the node's
//! domain, found with a quickselect partial sort.

use crate::eval::IndexEvaluator3;
use crate::operator::path::{self, PathOperator, PathState};
use crate::operator::LocalSearchOperator;
use sextant_model::assignment::Assignment;
use sextant_model::domain::VarDomains;
use sextant_model::index::VarIndex;
use sextant_search::num::SolverNumeric;
use std::collections::HashSet;

/// Number of candidate targets kept per node.
pub const LIN_KERNIGHAN_NEIGHBORS: usize = 5 + 1;

/// For each node, the `size` cheapest outgoing targets according to the
/// evaluator, sorted by node id. Computed once per operator lifetime.
///
/// Selection runs in O(domain size) per node on average, quicksort
/// style: partition around a pivot and recurse into the half containing
/// the k-th cheapest element.
#[derive(Debug, Clone)]
pub struct NearestNeighbors {
    neighbors: Vec<Vec<usize>>,
    size: usize,
    initialized: bool,
}

impl NearestNeighbors {
    /// Creates an empty oracle keeping `size` targets per node.
    pub fn new(size: usize) -> Self {
        Self {
            neighbors: Vec::new(),
            size,
            initialized: false,
        }
    }

    /// Returns whether the table has been built.
    #[inline(always)]
    pub fn initialized(&self) -> bool {
        self.initialized
    }

    /// Builds the table if it has not been built yet.
    pub fn initialize<T, E, D>(&mut self, state: &PathState<T>, evaluator: &E, domains: &D)
    where
        T: SolverNumeric,
        E: IndexEvaluator3<T>,
        D: VarDomains<T>,
    {
        if self.initialized {
            return;
        }
        self.initialized = true;
        for row in 0..state.number_of_nexts() {
            self.neighbors.push(Vec::new());
            self.compute_nearest(row, state, evaluator, domains);
        }
    }

    /// Returns the candidate targets of `index`, sorted by node id.
    #[inline(always)]
    pub fn neighbors(&self, index: usize) -> &[usize] {
        &self.neighbors[index]
    }

    fn compute_nearest<T, E, D>(
        &mut self,
        row: usize,
        state: &PathState<T>,
        evaluator: &E,
        domains: &D,
    ) where
        T: SolverNumeric,
        E: IndexEvaluator3<T>,
        D: VarDomains<T>,
    {
        let path = state.path(row);
        let var = state.var_state().var(row);
        let var_min = domains
            .min(var)
            .to_usize()
            .expect("domain minimum is not a valid node index");
        let var_max = domains
            .max(var)
            .to_usize()
            .expect("domain maximum is not a valid node index");
        let var_size = var_max - var_min + 1;
        let mut neighbors: Vec<usize> = (0..var_size).map(|i| i + var_min).collect();
        let mut row_data: Vec<T> = neighbors
            .iter()
            .map(|&index| evaluator.run(row, path::node_value(index), path))
            .collect();

        if var_size > self.size {
            let mut start = 0usize;
            let mut end = var_size;
            let mut size = self.size as isize;
            while size > 0 {
                let mut index = (end - start) / 2;
                Self::pivot(start, end, &mut neighbors, &mut row_data, &mut index);
                if (index - start) as isize >= size {
                    end = index;
                } else {
                    start = index + 1;
                    size -= start as isize;
                }
            }
        }

        let keep = self.size.min(var_size);
        self.neighbors[row].extend_from_slice(&neighbors[..keep]);
        self.neighbors[row].sort_unstable();
    }

    fn pivot<T: Copy + PartialOrd>(
        start: usize,
        end: usize,
        neighbors: &mut [usize],
        row: &mut [T],
        index: &mut usize,
    ) {
        Self::swap(start, *index, neighbors, row);
        let mut j = start;
        for i in start + 1..end {
            if row[i] < row[j] {
                Self::swap(j, i, neighbors, row);
                j += 1;
                Self::swap(i, j, neighbors, row);
            }
        }
        *index = j;
    }

    #[inline]
    fn swap<T: Copy>(i: usize, j: usize, neighbors: &mut [usize], row: &mut [T]) {
        neighbors.swap(i, j);
        row.swap(i, j);
    }
}

/// Sequential-gain edge exchange seeded at the base node.
pub struct LinKernighan<T, E, D> {
    state: PathState<T>,
    evaluator: E,
    domains: D,
    neighbors: NearestNeighbors,
    marked: HashSet<usize>,
    topt: bool,
}

impl<T, E, D> LinKernighan<T, E, D>
where
    T: SolverNumeric,
    E: IndexEvaluator3<T>,
    D: VarDomains<T>,
{
    /// Creates a Lin-Kernighan operator. With `topt` set, each neighbor
    /// starts with a 3-opt step before the 2-opt series.
    pub fn new(
        next_vars: Vec<VarIndex>,
        path_vars: Option<Vec<VarIndex>>,
        evaluator: E,
        domains: D,
        topt: bool,
    ) -> Self {
        evaluator.check_is_repeatable();
        Self {
            state: PathState::new(next_vars, path_vars, 1),
            evaluator,
            domains,
            neighbors: NearestNeighbors::new(LIN_KERNIGHAN_NEIGHBORS),
            marked: HashSet::new(),
            topt,
        }
    }

    /// Picks the best untried target leaving `in_j` with positive
    /// cumulative gain. On success `out` holds the target and `gain` the
    /// new cumulative gain.
    fn in_from_out(&self, in_i: usize, in_j: usize, out: &mut usize, gain: &mut T) -> bool {
        let nexts = self.neighbors.neighbors(in_j);
        let mut best_gain = T::min_value();
        let path = self.state.path(in_i);
        let out_cost = self.evaluator.run(in_i, path::node_value(in_j), path);
        let current_gain = *gain + out_cost;
        for &next in nexts {
            if next != in_j {
                let in_cost = self.evaluator.run(in_j, path::node_value(next), path);
                let new_gain = current_gain - in_cost;
                if new_gain > T::ZERO
                    && next != self.state.next(in_j)
                    && !self.marked.contains(&in_j)
                    && !self.marked.contains(&next)
                    && best_gain < new_gain
                {
                    *out = next;
                    best_gain = new_gain;
                }
            }
        }
        *gain = best_gain;
        best_gain > T::min_value()
    }
}

impl<T, E, D> PathOperator<T> for LinKernighan<T, E, D>
where
    T: SolverNumeric,
    E: IndexEvaluator3<T>,
    D: VarDomains<T>,
{
    fn path_state(&self) -> &PathState<T> {
        &self.state
    }

    fn path_state_mut(&mut self) -> &mut PathState<T> {
        &mut self.state
    }

    fn on_node_initialization(&mut self) {
        let Self {
            state,
            evaluator,
            domains,
            neighbors,
            ..
        } = self;
        neighbors.initialize(state, evaluator, domains);
    }

    fn make_neighbor(&mut self) -> bool {
        self.marked.clear();
        let mut node = self.state.base_node(0);
        if self.state.is_path_end(node) {
            return false;
        }
        let path = self.state.path(node);
        let base = node;
        let mut next = self.state.next(node);
        if self.state.is_path_end(next) {
            return false;
        }
        let mut out = usize::MAX;
        let mut gain = T::ZERO;
        self.marked.insert(node);
        if self.topt {
            // Try a 3-opt step first.
            if !self.in_from_out(node, next, &mut out, &mut gain) {
                return false;
            }
            self.marked.insert(next);
            self.marked.insert(out);
            let node1 = out;
            if self.state.is_path_end(node1) {
                return false;
            }
            let next1 = self.state.next(node1);
            if self.state.is_path_end(next1) {
                return false;
            }
            if !self.in_from_out(node1, next1, &mut out, &mut gain) {
                return false;
            }
            self.marked.insert(next1);
            self.marked.insert(out);
            if !self.state.move_chain(out, node1, node) {
                return false;
            }
            let next_out = self.state.next(out);
            let in_cost = self.evaluator.run(node, path::node_value(next_out), path);
            let out_cost = self.evaluator.run(out, path::node_value(next_out), path);
            if gain - in_cost + out_cost > T::ZERO {
                return true;
            }
            node = out;
            if self.state.is_path_end(node) {
                return false;
            }
            next = next_out;
            if self.state.is_path_end(next) {
                return false;
            }
        }
        // 2-opt series.
        while self.in_from_out(node, next, &mut out, &mut gain) {
            self.marked.insert(next);
            self.marked.insert(out);
            let chain_last = match self.state.reverse_chain(node, out) {
                Some(last) => last,
                None => return false,
            };
            let in_cost = self.evaluator.run(base, path::node_value(chain_last), path);
            let out_cost = self
                .evaluator
                .run(chain_last, path::node_value(out), path);
            if gain - in_cost + out_cost > T::ZERO {
                return true;
            }
            node = chain_last;
            if self.state.is_path_end(node) {
                return false;
            }
            next = out;
            if self.state.is_path_end(next) {
                return false;
            }
        }
        false
    }
}

impl<T, E, D> LocalSearchOperator<T> for LinKernighan<T, E, D>
where
    T: SolverNumeric,
    E: IndexEvaluator3<T>,
    D: VarDomains<T>,
{
    fn name(&self) -> &str {
        if self.topt {
            "LinKernighan3Opt"
        } else {
            "LinKernighan"
        }
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
    use sextant_model::domain::DomainStore;

    fn line_evaluator(positions: &'static [i64]) -> impl Fn(usize, i64, i64) -> i64 {
        move |from, to, _path| (positions[from] - positions[to as usize]).abs()
    }

    #[test]
    fn test_nearest_neighbors_selects_cheapest_targets() {
        // Node 1 sits at position 10; its two cheapest targets over the
        // domain 0..=4 are itself (cost 0) and the end sentinel 4.
        let mut state = PathState::<i64>::new((0..4).map(VarIndex::new).collect(), None, 1);
        state
            .var_state_mut()
            .start(&path_assignment(4, &[&[0, 1, 2, 3]]));
        let evaluator = line_evaluator(&[0, 10, 2, 3, 4]);
        let domains = DomainStore::uniform(4, 0i64, 4);
        let mut oracle = NearestNeighbors::new(2);
        oracle.initialize(&state, &evaluator, &domains);
        assert!(oracle.initialized());
        assert_eq!(oracle.neighbors(1), &[1, 4]);
        // Lists are sorted by node id.
        for row in 0..4 {
            let mut sorted = oracle.neighbors(row).to_vec();
            sorted.sort_unstable();
            assert_eq!(oracle.neighbors(row), sorted.as_slice());
        }
    }

    #[test]
    fn test_nearest_neighbors_initializes_once() {
        let mut state = PathState::<i64>::new((0..3).map(VarIndex::new).collect(), None, 1);
        state
            .var_state_mut()
            .start(&path_assignment(3, &[&[0, 1, 2]]));
        let evaluator = line_evaluator(&[0, 1, 2, 3]);
        let domains = DomainStore::uniform(3, 0i64, 3);
        let mut oracle = NearestNeighbors::new(2);
        oracle.initialize(&state, &evaluator, &domains);
        let before = oracle.neighbors(0).to_vec();
        oracle.initialize(&state, &evaluator, &domains);
        assert_eq!(oracle.neighbors(0), before.as_slice());
    }

    fn run_lk(
        positions: &'static [i64],
        num_nodes: usize,
        order: &[usize],
        topt: bool,
    ) -> Vec<Vec<usize>> {
        let reference = path_assignment(num_nodes, &[order]);
        let mut op = LinKernighan::new(
            (0..num_nodes).map(VarIndex::new).collect(),
            None,
            line_evaluator(positions),
            DomainStore::uniform(num_nodes, 0i64, num_nodes as i64),
            topt,
        );
        op.start(&reference);
        let mut neighbors = Vec::new();
        let mut delta = Assignment::new();
        let mut deltadelta = Assignment::new();
        for _ in 0..32 {
            delta.clear();
            deltadelta.clear();
            if !op.make_next_neighbor(&mut delta, &mut deltadelta) {
                break;
            }
            let mut candidate = reference.clone();
            candidate.copy_from(&delta);
            neighbors.push(read_path(&candidate, order[0], num_nodes));
        }
        neighbors
    }

    #[test]
    fn test_lin_kernighan_preserves_path_invariants() {
        // A scrambled line: plenty of improving exchanges exist; every
        // emitted neighbor must keep the node set and endpoints intact.
        let neighbors = run_lk(&[0, 4, 2, 3, 1, 5, 6], 6, &[0, 1, 2, 3, 4, 5], false);
        for neighbor in &neighbors {
            let mut nodes = neighbor.clone();
            nodes.sort_unstable();
            assert_eq!(nodes, (0..6).collect::<Vec<_>>());
            assert_eq!(neighbor[0], 0);
        }
    }

    #[test]
    fn test_lin_kernighan_finds_no_gain_on_uniform_costs() {
        // All arcs cost the same: no exchange has positive gain.
        let neighbors = run_lk(&[1, 1, 1, 1, 1], 4, &[0, 1, 2, 3], false);
        assert!(neighbors.is_empty());
    }

    #[test]
    fn test_lin_kernighan_with_topt_terminates() {
        let neighbors = run_lk(&[0, 4, 2, 3, 1, 5, 6], 6, &[0, 1, 2, 3, 4, 5], true);
        for neighbor in &neighbors {
            let mut nodes = neighbor.clone();
            nodes.sort_unstable();
            assert_eq!(nodes, (0..6).collect::<Vec<_>>());
        }
    }
}
