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

//! The neighbor-exploration driver.
//!
//! The engine hands a reference assignment to the operator, offers every
//! produced `(delta, deltadelta)` pair to the commit delegate's global
//! acceptance and the filter stack, and commits candidates the delegate
//! approves. A committed neighbor does not interrupt the exploration:
//! the operator keeps producing against the old reference until it is
//! exhausted, at which point the improved solution is registered with
//! the pool and the operator is restarted on it. Exhaustion without any
//! accepted neighbor is the local-optimum signal.
//!
//! Cancellation is cooperative through a `SearchMonitor` consulted once
//! per iteration; the pool is polled every `sync_frequency` iterations
//! for an externally improved reference.

use crate::filter::{self, LocalSearchFilter};
use crate::monitor::local_search_monitor::LocalSearchMonitor;
use crate::operator::LocalSearchOperator;
use crate::pool::{DefaultSolutionPool, SolutionPool};
use crate::result::{LocalSearchOutcome, LocalSearchTerminationReason};
use crate::stats::LocalSearchStatistics;
use sextant_model::assignment::Assignment;
use sextant_search::monitor::search_monitor::{DummyMonitor, SearchCommand, SearchMonitor};
use sextant_search::num::SolverNumeric;
use std::time::Instant;

/// Iterations between two pool sync checks.
pub const DEFAULT_SYNC_FREQUENCY: u32 = 16;

/// Depth at which a decision-builder embedding of this driver stops
/// balancing its search tree. The iterative driver does not branch; the
/// constant is part of the configuration surface for embedders staging
/// the engine inside a backtracking search.
pub const BALANCED_TREE_DEPTH: u32 = 32;

/// Tuning knobs of the exploration driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalSearchConfig {
    /// Iterations between two `sync_needed` checks on the pool.
    pub sync_frequency: u32,

    /// Tree-balancing depth for decision-builder embeddings.
    pub balanced_tree_depth: u32,
}

impl Default for LocalSearchConfig {
    fn default() -> Self {
        Self {
            sync_frequency: DEFAULT_SYNC_FREQUENCY,
            balanced_tree_depth: BALANCED_TREE_DEPTH,
        }
    }
}

impl LocalSearchConfig {
    /// Overrides the pool sync frequency.
    ///
    /// # Panics
    ///
    /// Panics if `sync_frequency` is zero.
    pub fn with_sync_frequency(mut self, sync_frequency: u32) -> Self {
        assert!(
            sync_frequency > 0,
            "called `LocalSearchConfig::with_sync_frequency` with a zero frequency"
        );
        self.sync_frequency = sync_frequency;
        self
    }
}

/// The solver-side seam of the engine.
///
/// `accept_delta` mirrors the surrounding search's global filtering;
/// `commit` stands in for the nested solve that applies a delta
/// atomically, possibly extending or repairing the candidate, and
/// reports whether the solver accepted it.
pub trait DeltaCommitter<T>
where
    T: SolverNumeric,
{
    /// Returns the name of the committer.
    fn name(&self) -> &str;

    /// Global acceptance check, called for every generated neighbor.
    fn accept_delta(&mut self, _delta: &Assignment<T>, _deltadelta: &Assignment<T>) -> bool {
        true
    }

    /// Attempts to commit `candidate`; `false` rejects the neighbor.
    fn commit(&mut self, candidate: &mut Assignment<T>) -> bool;
}

/// Commits every filtered candidate unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GreedyCommitter;

impl<T> DeltaCommitter<T> for GreedyCommitter
where
    T: SolverNumeric,
{
    fn name(&self) -> &str {
        "GreedyCommitter"
    }

    fn commit(&mut self, _candidate: &mut Assignment<T>) -> bool {
        true
    }
}

/// The collaborator bundle consumed by the driver: pool, filters, limit
/// and commit delegate.
pub struct LocalSearchParameters<T>
where
    T: SolverNumeric,
{
    pool: Box<dyn SolutionPool<T>>,
    filters: Vec<Box<dyn LocalSearchFilter<T>>>,
    limit: Box<dyn SearchMonitor<T>>,
    committer: Box<dyn DeltaCommitter<T>>,
}

impl<T> LocalSearchParameters<T>
where
    T: SolverNumeric + 'static,
{
    /// Creates a bundle with the default pool, no filters, no limit and
    /// the greedy committer.
    pub fn new() -> Self {
        Self {
            pool: Box::new(DefaultSolutionPool::new()),
            filters: Vec::new(),
            limit: Box::new(DummyMonitor),
            committer: Box::new(GreedyCommitter),
        }
    }

    /// Replaces the solution pool.
    pub fn with_pool(mut self, pool: Box<dyn SolutionPool<T>>) -> Self {
        self.pool = pool;
        self
    }

    /// Appends a filter to the stack.
    pub fn add_filter(mut self, filter: Box<dyn LocalSearchFilter<T>>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Replaces the search limit.
    pub fn with_limit(mut self, limit: Box<dyn SearchMonitor<T>>) -> Self {
        self.limit = limit;
        self
    }

    /// Replaces the commit delegate.
    pub fn with_committer(mut self, committer: Box<dyn DeltaCommitter<T>>) -> Self {
        self.committer = committer;
        self
    }
}

impl<T> Default for LocalSearchParameters<T>
where
    T: SolverNumeric + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// The exploration driver.
#[derive(Debug, Clone, Default)]
pub struct LocalSearchEngine<T> {
    config: LocalSearchConfig,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> LocalSearchEngine<T>
where
    T: SolverNumeric,
{
    /// Creates an engine with the default configuration.
    pub fn new() -> Self {
        Self::with_config(LocalSearchConfig::default())
    }

    /// Creates an engine with an explicit configuration.
    pub fn with_config(config: LocalSearchConfig) -> Self {
        Self {
            config,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &LocalSearchConfig {
        &self.config
    }

    /// Runs neighborhood exploration from `initial` until a local
    /// optimum or a limit is hit.
    pub fn run<O, M>(
        &mut self,
        operator: &mut O,
        parameters: &mut LocalSearchParameters<T>,
        monitor: &mut M,
        initial: &Assignment<T>,
    ) -> LocalSearchOutcome<T>
    where
        O: LocalSearchOperator<T>,
        M: LocalSearchMonitor<T>,
    {
        let start_time = Instant::now();
        let mut stats = LocalSearchStatistics::default();
        let mut reference = initial.clone();
        let mut candidate = initial.clone();
        let mut incumbent = initial.clone();
        let mut delta = Assignment::new();
        let mut deltadelta = Assignment::new();
        let mut neighbor_found = false;
        let mut counter: u32 = 0;

        parameters.pool.initialize(initial);
        monitor.on_start(initial);
        parameters.limit.on_enter_search();
        synchronize_all(
            &mut *parameters.pool,
            operator,
            &mut parameters.filters,
            &mut reference,
        );

        let termination_reason = loop {
            stats.on_iteration();
            delta.clear();
            deltadelta.clear();

            counter += 1;
            if counter >= self.config.sync_frequency
                && parameters.pool.sync_needed(&reference)
            {
                counter = 0;
                synchronize_all(
                    &mut *parameters.pool,
                    operator,
                    &mut parameters.filters,
                    &mut reference,
                );
                neighbor_found = false;
            }

            let command = parameters.limit.search_command();
            let produced = matches!(command, SearchCommand::Continue)
                && operator.make_next_neighbor(&mut delta, &mut deltadelta);
            if produced {
                stats.on_neighbor();
                parameters.limit.on_neighbor();
                // Incremental filters must see every candidate, so the
                // global check and the filter chain both always run.
                let solver_accept = parameters.committer.accept_delta(&delta, &deltadelta);
                let filters_accept =
                    filter::filter_accept(&mut parameters.filters, &delta, &deltadelta);
                if solver_accept && filters_accept {
                    stats.on_filtered_neighbor();
                    monitor.on_neighbor_filtered(&delta, &stats);
                    candidate.copy_from(&reference);
                    candidate.copy_from(&delta);
                    if parameters.committer.commit(&mut candidate) {
                        stats.on_accepted_neighbor();
                        incumbent.copy_from(&candidate);
                        parameters.limit.on_solution(&incumbent);
                        monitor.on_solution_accepted(&incumbent, &stats);
                        neighbor_found = true;
                    } else {
                        monitor.on_solution_rejected(&delta, &stats);
                    }
                } else {
                    monitor.on_solution_rejected(&delta, &stats);
                }
            } else if neighbor_found {
                // The neighborhood is spent but produced improvements:
                // restart exploration from the improved reference.
                parameters.pool.register_new_solution(&incumbent);
                synchronize_all(
                    &mut *parameters.pool,
                    operator,
                    &mut parameters.filters,
                    &mut reference,
                );
                neighbor_found = false;
            } else if let SearchCommand::Terminate(reason) = command {
                break LocalSearchTerminationReason::Aborted(reason);
            } else {
                break LocalSearchTerminationReason::LocalOptimum;
            }

            monitor.on_iteration(&reference, &stats);
        };

        parameters.limit.on_exit_search();
        stats.set_total_time(start_time.elapsed());
        monitor.on_end(&incumbent, &stats);

        match termination_reason {
            LocalSearchTerminationReason::LocalOptimum => {
                LocalSearchOutcome::local_optimum(incumbent, stats)
            }
            LocalSearchTerminationReason::Aborted(reason) => {
                LocalSearchOutcome::aborted(incumbent, reason, stats)
            }
        }
    }
}

fn synchronize_all<T, O>(
    pool: &mut dyn SolutionPool<T>,
    operator: &mut O,
    filters: &mut [Box<dyn LocalSearchFilter<T>>],
    reference: &mut Assignment<T>,
) where
    T: SolverNumeric,
    O: LocalSearchOperator<T>,
{
    pool.get_next_solution(reference);
    operator.start(reference);
    for filter in filters.iter_mut() {
        filter.synchronize(reference);
    }
}

/// A producer of first solutions for searches that do not start from an
/// existing assignment.
pub trait FirstSolutionBuilder<T>
where
    T: SolverNumeric,
{
    /// Builds a feasible starting assignment, or `None` when none
    /// exists.
    fn build_solution(&mut self) -> Option<Assignment<T>>;
}

/// Bundles an operator, parameters and an engine behind one `solve`
/// call: first-solution construction, neighbor exploration and
/// local-optimum reporting.
pub struct LocalSearch<T, O>
where
    T: SolverNumeric,
{
    operator: O,
    parameters: LocalSearchParameters<T>,
    engine: LocalSearchEngine<T>,
}

impl<T, O> LocalSearch<T, O>
where
    T: SolverNumeric + 'static,
    O: LocalSearchOperator<T>,
{
    /// Creates a solver from an operator and a parameter bundle.
    pub fn new(operator: O, parameters: LocalSearchParameters<T>) -> Self {
        Self {
            operator,
            parameters,
            engine: LocalSearchEngine::new(),
        }
    }

    /// Creates a solver with an explicit engine configuration.
    pub fn with_config(
        operator: O,
        parameters: LocalSearchParameters<T>,
        config: LocalSearchConfig,
    ) -> Self {
        Self {
            operator,
            parameters,
            engine: LocalSearchEngine::with_config(config),
        }
    }

    /// Improves `initial` until a local optimum or a limit is hit.
    pub fn solve<M>(&mut self, initial: &Assignment<T>, monitor: &mut M) -> LocalSearchOutcome<T>
    where
        M: LocalSearchMonitor<T>,
    {
        self.engine
            .run(&mut self.operator, &mut self.parameters, monitor, initial)
    }

    /// Builds a first solution and improves it. Returns `None` when the
    /// builder cannot produce a starting assignment.
    pub fn solve_with_first_solution<F, M>(
        &mut self,
        first_solution: &mut F,
        monitor: &mut M,
    ) -> Option<LocalSearchOutcome<T>>
    where
        F: FirstSolutionBuilder<T>,
        M: LocalSearchMonitor<T>,
    {
        let initial = first_solution.build_solution()?;
        Some(self.solve(&initial, monitor))
    }

    /// Returns the wrapped operator.
    pub fn operator(&self) -> &O {
        &self.operator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::IndexEvaluator3;
    use crate::filter::domain::VariableDomainFilter;
    use crate::monitor::local_search_monitor::NoopMonitor;
    use crate::operator::path::test_support::{path_assignment, read_path};
    use crate::operator::scalar::ChangeValue;
    use crate::operator::two_opt::TwoOpt;
    use sextant_model::domain::DomainStore;
    use sextant_model::index::VarIndex;
    use sextant_search::monitor::neighbor_limit::NeighborLimitMonitor;

    #[inline]
    fn v(n: usize) -> VarIndex {
        VarIndex::new(n)
    }

    /// Commits only candidates that strictly improve the path cost.
    struct ImprovingCommitter {
        positions: &'static [i64],
        num_nodes: usize,
        best: i64,
    }

    impl ImprovingCommitter {
        fn new(positions: &'static [i64], num_nodes: usize) -> Self {
            Self {
                positions,
                num_nodes,
                best: i64::MAX,
            }
        }

        fn cost(&self, assignment: &Assignment<i64>) -> i64 {
            let evaluator =
                |from: usize, to: i64, _path: i64| {
                    (self.positions[from] - self.positions[to as usize]).abs()
                };
            (0..self.num_nodes)
                .map(|node| {
                    let next = assignment.element(v(node)).unwrap().value();
                    evaluator.run(node, next, 0)
                })
                .sum()
        }
    }

    impl DeltaCommitter<i64> for ImprovingCommitter {
        fn name(&self) -> &str {
            "ImprovingCommitter"
        }

        fn commit(&mut self, candidate: &mut Assignment<i64>) -> bool {
            let cost = self.cost(candidate);
            if cost < self.best {
                self.best = cost;
                true
            } else {
                false
            }
        }
    }

    #[test]
    fn test_two_opt_descent_reaches_local_optimum() {
        // Positions [0, 2, 1, 3, 3]: the path 0→1→2→3 costs 5; the
        // 2-opt neighbor 0→2→1→3 costs 3 and is optimal.
        let initial = path_assignment(4, &[&[0, 1, 2, 3]]);
        let mut operator = TwoOpt::<i64>::new((0..4).map(v).collect(), None);
        let mut parameters = LocalSearchParameters::new()
            .with_committer(Box::new(ImprovingCommitter::new(&[0, 2, 1, 3, 3], 4)));
        let mut engine = LocalSearchEngine::new();
        let outcome = engine.run(
            &mut operator,
            &mut parameters,
            &mut NoopMonitor,
            &initial,
        );

        assert!(outcome.is_local_optimum());
        assert_eq!(read_path(outcome.solution(), 0, 4), vec![0, 2, 1, 3]);
        assert!(outcome.statistics().accepted_neighbors >= 1);
        assert!(outcome.statistics().neighbors >= outcome.statistics().accepted_neighbors);
    }

    #[test]
    fn test_neighbor_limit_aborts_run() {
        let mut initial = Assignment::new();
        for i in 0..4 {
            initial.add(v(i), 0);
        }
        let mut operator = ChangeValue::<i64>::increment((0..4).map(v).collect());
        let mut parameters = LocalSearchParameters::new()
            .with_limit(Box::new(NeighborLimitMonitor::<i64>::new(3)));
        let mut engine = LocalSearchEngine::new();
        let outcome = engine.run(
            &mut operator,
            &mut parameters,
            &mut NoopMonitor,
            &initial,
        );

        assert_eq!(
            outcome.termination_reason(),
            &LocalSearchTerminationReason::Aborted("neighbor limit reached".into())
        );
        assert_eq!(outcome.statistics().neighbors, 3);
    }

    #[test]
    fn test_domain_filter_blocks_all_neighbors() {
        // Single variable already at its domain maximum: the increment
        // operator only proposes out-of-domain values.
        let mut initial = Assignment::new();
        initial.add(v(0), 5);
        let mut operator = ChangeValue::<i64>::increment(vec![v(0)]);
        let mut parameters = LocalSearchParameters::new().add_filter(Box::new(
            VariableDomainFilter::new(DomainStore::uniform(1, 0i64, 5)),
        ));
        let mut engine = LocalSearchEngine::new();
        let outcome = engine.run(
            &mut operator,
            &mut parameters,
            &mut NoopMonitor,
            &initial,
        );

        assert!(outcome.is_local_optimum());
        assert_eq!(outcome.statistics().neighbors, 1);
        assert_eq!(outcome.statistics().filtered_neighbors, 0);
        assert_eq!(outcome.solution().element(v(0)).unwrap().value(), 5);
    }

    #[test]
    fn test_local_search_facade_with_first_solution() {
        struct FixedFirstSolution(Option<Assignment<i64>>);

        impl FirstSolutionBuilder<i64> for FixedFirstSolution {
            fn build_solution(&mut self) -> Option<Assignment<i64>> {
                self.0.take()
            }
        }

        let initial = path_assignment(4, &[&[0, 1, 2, 3]]);
        let operator = TwoOpt::<i64>::new((0..4).map(v).collect(), None);
        let parameters = LocalSearchParameters::new()
            .with_committer(Box::new(ImprovingCommitter::new(&[0, 2, 1, 3, 3], 4)));
        let mut solver = LocalSearch::new(operator, parameters);

        let mut builder = FixedFirstSolution(Some(initial));
        let outcome = solver
            .solve_with_first_solution(&mut builder, &mut NoopMonitor)
            .expect("first solution available");
        assert!(outcome.is_local_optimum());

        // A drained builder yields no outcome.
        assert!(solver
            .solve_with_first_solution(&mut builder, &mut NoopMonitor)
            .is_none());
    }

    #[test]
    fn test_restart_on_improvement_resynchronizes_reference() {
        // The improving committer forces the engine through at least one
        // register-and-restart cycle before declaring a local optimum.
        let initial = path_assignment(5, &[&[0, 4, 2, 3, 1]]);
        let mut operator = TwoOpt::<i64>::new((0..5).map(v).collect(), None);
        let mut parameters = LocalSearchParameters::new()
            .with_committer(Box::new(ImprovingCommitter::new(&[0, 1, 2, 3, 4, 5], 5)));
        let mut engine = LocalSearchEngine::new();
        let outcome = engine.run(
            &mut operator,
            &mut parameters,
            &mut NoopMonitor,
            &initial,
        );

        assert!(outcome.is_local_optimum());
        let final_path = read_path(outcome.solution(), 0, 5);
        let mut nodes = final_path.clone();
        nodes.sort_unstable();
        assert_eq!(nodes, vec![0, 1, 2, 3, 4]);
        // The scrambled start 0→4→2→3→1 costs 13 under these positions;
        // any accepted improvement beats it.
        let positions = [0i64, 1, 2, 3, 4, 5];
        let final_cost: i64 = (0..5)
            .map(|node| {
                let next = outcome.solution().element(v(node)).unwrap().value() as usize;
                (positions[node] - positions[next]).abs()
            })
            .sum();
        assert!(final_cost < 13);
    }
}
