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

//! Monitoring interface for local search runs.
//!
//! Callbacks for observing the lifecycle of the engine: start/end
//! events, per-iteration updates, and notifications on neighbors that
//! passed filtering, were committed, or were rejected. Implementations
//! can stream logs or collect metrics; the default no-op bodies keep
//! monitors free when unused.

use crate::stats::LocalSearchStatistics;
use sextant_model::assignment::Assignment;
use sextant_search::num::SolverNumeric;

/// A monitor for local search runs.
pub trait LocalSearchMonitor<T>
where
    T: SolverNumeric,
{
    /// Returns the name of the monitor.
    fn name(&self) -> &str;

    /// Called at the start of the run.
    fn on_start(&mut self, _initial_solution: &Assignment<T>) {}

    /// Called at the end of the run.
    fn on_end(&mut self, _best_solution: &Assignment<T>, _statistics: &LocalSearchStatistics) {}

    /// Called at each iteration of the driver loop.
    fn on_iteration(
        &mut self,
        _current_solution: &Assignment<T>,
        _statistics: &LocalSearchStatistics,
    ) {
    }

    /// Called when a neighbor passed the filter stack.
    fn on_neighbor_filtered(
        &mut self,
        _delta: &Assignment<T>,
        _statistics: &LocalSearchStatistics,
    ) {
    }

    /// Called when a neighbor was committed as the new solution.
    fn on_solution_accepted(
        &mut self,
        _solution: &Assignment<T>,
        _statistics: &LocalSearchStatistics,
    ) {
    }

    /// Called when a neighbor was rejected by a filter or the commit
    /// step.
    fn on_solution_rejected(
        &mut self,
        _delta: &Assignment<T>,
        _statistics: &LocalSearchStatistics,
    ) {
    }
}

impl<T> std::fmt::Debug for dyn LocalSearchMonitor<T>
where
    T: SolverNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LocalSearchMonitor {{ name: {} }}", self.name())
    }
}

/// A monitor that observes nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoopMonitor;

impl<T> LocalSearchMonitor<T> for NoopMonitor
where
    T: SolverNumeric,
{
    fn name(&self) -> &str {
        "NoopMonitor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_monitor_has_a_name() {
        let monitor = NoopMonitor;
        assert_eq!(LocalSearchMonitor::<i64>::name(&monitor), "NoopMonitor");
    }
}
