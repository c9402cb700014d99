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

//! TSP-based operators.
//!
//! Both operators reduce a portion of a path to a small traveling
//! salesman instance and hand it to an external exact solver through the
//! [`HamiltonianSolver`] interface.
//!
//! `TspOpt` slides a window of `chain_length + 1` nodes along the path
//! and reorders the window optimally. For a sub-chain
//! `1 → 2 → 3 → 4 → 5 → 6` it solves the TSP on `A, 2, 3, 4, 5`, where
//! `A` merges nodes 1 and 6 so that `cost(A, i) = cost(1, i)` and
//! `cost(i, A) = cost(i, 6)`.
//!
//! `TspLns` contracts a path into `tsp_size` meta-nodes between randomly
//! chosen break nodes and reorders the meta-nodes. The neighborhood is
//! explicitly unlimited: neighbor generation loops until a change is
//! produced and relies on search limits for termination.

use crate::eval::IndexEvaluator3;
use crate::operator::path::{self, default_make_one_neighbor, PathOperator, PathState};
use crate::operator::LocalSearchOperator;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sextant_model::assignment::Assignment;
use sextant_model::index::VarIndex;
use sextant_search::num::SolverNumeric;
use std::collections::HashSet;

/// Default window length of the sliding TSP operator.
pub const DEFAULT_TSP_OPT_SIZE: usize = 13;

/// Default meta-node count of the TSP-LNS operator.
pub const DEFAULT_TSP_LNS_SIZE: usize = 10;

/// An exact solver for small traveling salesman instances.
///
/// The engine treats the solver as a black box: after
/// `change_cost_matrix` installs an `n × n` matrix, `traveling_salesman_path`
/// must produce a minimum-cost tour as a permutation of `0..n` starting
/// and ending at node 0 (`n + 1` entries in total).
pub trait HamiltonianSolver<T> {
    /// Installs the cost matrix of the next instance.
    fn change_cost_matrix(&mut self, cost: Vec<Vec<T>>);

    /// Writes the optimal tour into `path`.
    fn traveling_salesman_path(&mut self, path: &mut Vec<usize>);
}

/// Reorders sliding windows of a path optimally.
pub struct TspOpt<T, E, H> {
    state: PathState<T>,
    evaluator: E,
    hamiltonian_solver: H,
    chain_length: usize,
}

impl<T, E, H> TspOpt<T, E, H>
where
    T: SolverNumeric,
    E: IndexEvaluator3<T>,
    H: HamiltonianSolver<T>,
{
    /// Creates a sliding TSP operator over windows of `chain_length + 1`
    /// nodes.
    ///
    /// # Panics
    ///
    /// Panics if `chain_length` is zero.
    pub fn new(
        next_vars: Vec<VarIndex>,
        path_vars: Option<Vec<VarIndex>>,
        evaluator: E,
        hamiltonian_solver: H,
        chain_length: usize,
    ) -> Self {
        assert!(
            chain_length > 0,
            "called `TspOpt::new` with a zero chain length"
        );
        evaluator.check_is_repeatable();
        Self {
            state: PathState::new(next_vars, path_vars, 1),
            evaluator,
            hamiltonian_solver,
            chain_length,
        }
    }
}

impl<T, E, H> PathOperator<T> for TspOpt<T, E, H>
where
    T: SolverNumeric,
    E: IndexEvaluator3<T>,
    H: HamiltonianSolver<T>,
{
    fn path_state(&self) -> &PathState<T> {
        &self.state
    }

    fn path_state_mut(&mut self) -> &mut PathState<T> {
        &mut self.state
    }

    fn make_neighbor(&mut self) -> bool {
        let mut nodes = Vec::with_capacity(self.chain_length + 1);
        let mut chain_end = self.state.base_node(0);
        for _ in 0..self.chain_length + 1 {
            nodes.push(chain_end);
            if self.state.is_path_end(chain_end) {
                break;
            }
            chain_end = self.state.next(chain_end);
        }
        if nodes.len() <= 3 {
            return false;
        }
        let chain_path = self.state.path(self.state.base_node(0));
        let size = nodes.len() - 1;
        let mut cost = vec![vec![T::ZERO; size]; size];
        for i in 0..size {
            // Column 0 carries the arc to the chain exit.
            cost[i][0] = self
                .evaluator
                .run(nodes[i], path::node_value(nodes[size]), chain_path);
            for j in 1..size {
                cost[i][j] = self
                    .evaluator
                    .run(nodes[i], path::node_value(nodes[j]), chain_path);
            }
        }
        self.hamiltonian_solver.change_cost_matrix(cost);
        let mut tour = Vec::new();
        self.hamiltonian_solver.traveling_salesman_path(&mut tour);
        assert_eq!(
            size + 1,
            tour.len(),
            "hamiltonian solver returned a tour of {} entries for {} nodes",
            tour.len(),
            size
        );
        for i in 0..size - 1 {
            self.state.set_next(nodes[tour[i]], nodes[tour[i + 1]], chain_path);
        }
        self.state.set_next(nodes[tour[size - 1]], nodes[size], chain_path);
        true
    }
}

impl<T, E, H> LocalSearchOperator<T> for TspOpt<T, E, H>
where
    T: SolverNumeric,
    E: IndexEvaluator3<T>,
    H: HamiltonianSolver<T>,
{
    fn name(&self) -> &str {
        "TspOpt"
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

/// Contracts a path into meta-nodes and reorders them optimally.
///
/// Break nodes are drawn at random but always include the base node, so
/// the enumeration forces every node to eventually serve as a meta-node
/// boundary (diversification).
pub struct TspLns<T, E, H> {
    state: PathState<T>,
    evaluator: E,
    hamiltonian_solver: H,
    tsp_size: usize,
    rng: ChaCha8Rng,
}

impl<T, E, H> TspLns<T, E, H>
where
    T: SolverNumeric,
    E: IndexEvaluator3<T>,
    H: HamiltonianSolver<T>,
{
    /// Creates a TSP-LNS operator with an entropy-derived seed.
    ///
    /// # Panics
    ///
    /// Panics if `tsp_size` is smaller than 2.
    pub fn new(
        next_vars: Vec<VarIndex>,
        path_vars: Option<Vec<VarIndex>>,
        evaluator: E,
        hamiltonian_solver: H,
        tsp_size: usize,
    ) -> Self {
        Self::with_rng(
            next_vars,
            path_vars,
            evaluator,
            hamiltonian_solver,
            tsp_size,
            ChaCha8Rng::from_entropy(),
        )
    }

    /// Creates a TSP-LNS operator with an explicit seed.
    pub fn with_seed(
        next_vars: Vec<VarIndex>,
        path_vars: Option<Vec<VarIndex>>,
        evaluator: E,
        hamiltonian_solver: H,
        tsp_size: usize,
        seed: u64,
    ) -> Self {
        Self::with_rng(
            next_vars,
            path_vars,
            evaluator,
            hamiltonian_solver,
            tsp_size,
            ChaCha8Rng::seed_from_u64(seed),
        )
    }

    fn with_rng(
        next_vars: Vec<VarIndex>,
        path_vars: Option<Vec<VarIndex>>,
        evaluator: E,
        hamiltonian_solver: H,
        tsp_size: usize,
        rng: ChaCha8Rng,
    ) -> Self {
        assert!(
            tsp_size >= 2,
            "called `TspLns` constructor with fewer than two meta-nodes"
        );
        evaluator.check_is_repeatable();
        Self {
            state: PathState::new(next_vars, path_vars, 1),
            evaluator,
            hamiltonian_solver,
            tsp_size,
            rng,
        }
    }
}

impl<T, E, H> PathOperator<T> for TspLns<T, E, H>
where
    T: SolverNumeric,
    E: IndexEvaluator3<T>,
    H: HamiltonianSolver<T>,
{
    fn path_state(&self) -> &PathState<T> {
        &self.state
    }

    fn path_state_mut(&mut self) -> &mut PathState<T> {
        &mut self.state
    }

    fn make_one_neighbor(&mut self) -> bool {
        // Unlimited neighborhood: retry until a change is produced. The
        // surrounding search limits are responsible for stopping this.
        loop {
            if default_make_one_neighbor(self) {
                return true;
            }
        }
    }

    fn make_neighbor(&mut self) -> bool {
        let base_node = self.state.base_node(0);
        if self.state.is_path_end(base_node) {
            return false;
        }
        let mut nodes = Vec::new();
        let mut node = self.state.start_node(0);
        while !self.state.is_path_end(node) {
            nodes.push(node);
            node = self.state.next(node);
        }
        if nodes.len() <= self.tsp_size {
            return false;
        }
        // Randomly select break nodes (the final node of each meta-node,
        // after which an arc is relaxed); the base node always breaks.
        let mut breaks_set = HashSet::new();
        breaks_set.insert(base_node);
        while breaks_set.len() < self.tsp_size {
            let one_break = nodes[self.rng.gen_range(0..nodes.len())];
            breaks_set.insert(one_break);
        }
        // Meta-node internal costs (partial route from the first node of
        // the meta-node to its break) must be added to the TSP matrix to
        // respect the triangle inequality.
        let mut breaks = Vec::with_capacity(self.tsp_size);
        let mut meta_node_costs: Vec<T> = Vec::with_capacity(self.tsp_size);
        let mut cost = T::ZERO;
        let mut node = self.state.start_node(0);
        let node_path = self.state.path(node);
        while !self.state.is_path_end(node) {
            let next = self.state.next(node);
            if breaks_set.contains(&node) {
                breaks.push(node);
                meta_node_costs.push(cost);
                cost = T::ZERO;
            } else {
                cost = cost + self.evaluator.run(node, path::node_value(next), node_path);
            }
            node = next;
        }
        meta_node_costs[0] = meta_node_costs[0] + cost;
        debug_assert_eq!(breaks.len(), self.tsp_size);

        let tsp_size = self.tsp_size;
        let mut matrix = vec![vec![T::ZERO; tsp_size]; tsp_size];
        for i in 0..tsp_size {
            matrix[i][0] = meta_node_costs[i]
                + self.evaluator.run(
                    breaks[i],
                    path::node_value(self.state.next(breaks[tsp_size - 1])),
                    node_path,
                );
            for j in 1..tsp_size {
                matrix[i][j] = meta_node_costs[i]
                    + self.evaluator.run(
                        breaks[i],
                        path::node_value(self.state.next(breaks[j - 1])),
                        node_path,
                    );
            }
            matrix[i][i] = T::ZERO;
        }
        self.hamiltonian_solver.change_cost_matrix(matrix);
        let mut tour = Vec::new();
        self.hamiltonian_solver.traveling_salesman_path(&mut tour);
        // Only a permutation that differs from identity yields a new
        // solution.
        if tour[..tour.len() - 1].iter().enumerate().all(|(i, &p)| p == i) {
            return false;
        }
        assert_eq!(
            tour[tour.len() - 1],
            0,
            "hamiltonian solver returned a tour not ending at the start"
        );
        for i in 0..tsp_size - 1 {
            let meta_start = self.state.old_next(breaks[tour[i + 1] - 1]);
            self.state.set_next(breaks[tour[i]], meta_start, node_path);
        }
        let suffix_start = self.state.old_next(breaks[tsp_size - 1]);
        self.state
            .set_next(breaks[tour[tsp_size - 1]], suffix_start, node_path);
        true
    }
}

impl<T, E, H> LocalSearchOperator<T> for TspLns<T, E, H>
where
    T: SolverNumeric,
    E: IndexEvaluator3<T>,
    H: HamiltonianSolver<T>,
{
    fn name(&self) -> &str {
        "TspLns"
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
pub(crate) mod test_support {
    use super::HamiltonianSolver;

    /// Brute-force tour enumeration, good enough for the small matrices
    /// used in tests.
    #[derive(Debug, Clone, Default)]
    pub struct BruteForceHamiltonian {
        cost: Vec<Vec<i64>>,
    }

    impl BruteForceHamiltonian {
        pub fn new() -> Self {
            Self::default()
        }

        fn tour_cost(&self, tour: &[usize]) -> i64 {
            tour.windows(2).map(|w| self.cost[w[0]][w[1]]).sum()
        }
    }

    impl HamiltonianSolver<i64> for BruteForceHamiltonian {
        fn change_cost_matrix(&mut self, cost: Vec<Vec<i64>>) {
            self.cost = cost;
        }

        fn traveling_salesman_path(&mut self, path: &mut Vec<usize>) {
            let n = self.cost.len();
            assert!(n >= 2 && n <= 8, "test solver limited to tiny instances");
            let mut interior: Vec<usize> = (1..n).collect();
            let mut best: Option<(i64, Vec<usize>)> = None;
            permute(&mut interior, 0, &mut |perm| {
                let mut tour = Vec::with_capacity(n + 1);
                tour.push(0);
                tour.extend_from_slice(perm);
                tour.push(0);
                let cost = self.tour_cost(&tour);
                if best.as_ref().map_or(true, |(b, _)| cost < *b) {
                    best = Some((cost, tour));
                }
            });
            *path = best.expect("no tour found").1;
        }
    }

    fn permute(items: &mut Vec<usize>, k: usize, visit: &mut impl FnMut(&[usize])) {
        if k == items.len() {
            visit(items);
            return;
        }
        for i in k..items.len() {
            items.swap(k, i);
            permute(items, k + 1, visit);
            items.swap(k, i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::BruteForceHamiltonian;
    use super::*;
    use crate::operator::path::test_support::{path_assignment, read_path};

    /// Distances on a line; reordering 0→1→2→3 by position is optimal.
    fn line_evaluator(positions: &'static [i64]) -> impl Fn(usize, i64, i64) -> i64 {
        move |from, to, _path| {
            let to = to as usize;
            (positions[from] - positions[to]).abs()
        }
    }

    #[test]
    fn test_tsp_opt_reorders_window() {
        // Path 0→1→2→3→4 with positions [0, 3, 1, 2, 4]: the window
        // {0, 1, 2} with exit 3 is cheaper as 0→2→1→3.
        let reference = path_assignment(5, &[&[0, 1, 2, 3, 4]]);
        let mut op = TspOpt::new(
            (0..5).map(VarIndex::new).collect(),
            None,
            line_evaluator(&[0, 3, 1, 2, 4]),
            BruteForceHamiltonian::new(),
            3,
        );
        op.start(&reference);
        let mut delta = Assignment::new();
        let mut deltadelta = Assignment::new();
        assert!(op.make_next_neighbor(&mut delta, &mut deltadelta));
        let mut candidate = reference.clone();
        candidate.copy_from(&delta);
        assert_eq!(read_path(&candidate, 0, 5), vec![0, 2, 1, 3, 4]);
    }

    #[test]
    fn test_tsp_opt_skips_short_windows() {
        // Two-node path: fewer than four collected nodes, no neighbor.
        let reference = path_assignment(2, &[&[0, 1]]);
        let mut op = TspOpt::new(
            (0..2).map(VarIndex::new).collect(),
            None,
            line_evaluator(&[0, 1, 2]),
            BruteForceHamiltonian::new(),
            3,
        );
        op.start(&reference);
        let mut delta = Assignment::new();
        let mut deltadelta = Assignment::new();
        assert!(!op.make_next_neighbor(&mut delta, &mut deltadelta));
    }

    #[test]
    fn test_tsp_lns_rewires_path() {
        // A path whose reference order is far from optimal; some break
        // selection must produce a rewiring.
        let reference = path_assignment(8, &[&[0, 5, 2, 7, 4, 1, 6, 3]]);
        let mut op = TspLns::with_seed(
            (0..8).map(VarIndex::new).collect(),
            None,
            line_evaluator(&[0, 1, 2, 3, 4, 5, 6, 7, 8]),
            BruteForceHamiltonian::new(),
            4,
            7,
        );
        op.start(&reference);
        let mut delta = Assignment::new();
        let mut deltadelta = Assignment::new();
        assert!(op.make_next_neighbor(&mut delta, &mut deltadelta));
        assert!(!delta.is_empty());
        let mut candidate = reference.clone();
        candidate.copy_from(&delta);
        let neighbor = read_path(&candidate, 0, 8);
        let mut nodes = neighbor.clone();
        nodes.sort_unstable();
        assert_eq!(nodes, (0..8).collect::<Vec<_>>(), "node set broken");
        assert_ne!(neighbor, vec![0, 5, 2, 7, 4, 1, 6, 3]);
    }
}
