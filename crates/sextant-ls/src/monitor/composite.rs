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

//! Composite local search monitor.

use crate::monitor::local_search_monitor::LocalSearchMonitor;
use crate::stats::LocalSearchStatistics;
use sextant_model::assignment::Assignment;
use sextant_search::num::SolverNumeric;

/// Forwards every hook to a list of monitors, in insertion order.
pub struct CompositeMonitor<T> {
    monitors: Vec<Box<dyn LocalSearchMonitor<T>>>,
}

impl<T> CompositeMonitor<T>
where
    T: SolverNumeric,
{
    /// Creates an empty composite.
    pub fn new() -> Self {
        Self {
            monitors: Vec::new(),
        }
    }

    /// Adds a child monitor.
    pub fn push(&mut self, monitor: Box<dyn LocalSearchMonitor<T>>) {
        self.monitors.push(monitor);
    }

    /// Returns the number of child monitors.
    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    /// Returns `true` if there are no child monitors.
    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }
}

impl<T> Default for CompositeMonitor<T>
where
    T: SolverNumeric,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LocalSearchMonitor<T> for CompositeMonitor<T>
where
    T: SolverNumeric,
{
    fn name(&self) -> &str {
        "CompositeMonitor"
    }

    fn on_start(&mut self, initial_solution: &Assignment<T>) {
        for monitor in &mut self.monitors {
            monitor.on_start(initial_solution);
        }
    }

    fn on_end(&mut self, best_solution: &Assignment<T>, statistics: &LocalSearchStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_end(best_solution, statistics);
        }
    }

    fn on_iteration(
        &mut self,
        current_solution: &Assignment<T>,
        statistics: &LocalSearchStatistics,
    ) {
        for monitor in &mut self.monitors {
            monitor.on_iteration(current_solution, statistics);
        }
    }

    fn on_neighbor_filtered(&mut self, delta: &Assignment<T>, statistics: &LocalSearchStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_neighbor_filtered(delta, statistics);
        }
    }

    fn on_solution_accepted(
        &mut self,
        solution: &Assignment<T>,
        statistics: &LocalSearchStatistics,
    ) {
        for monitor in &mut self.monitors {
            monitor.on_solution_accepted(solution, statistics);
        }
    }

    fn on_solution_rejected(&mut self, delta: &Assignment<T>, statistics: &LocalSearchStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_solution_rejected(delta, statistics);
        }
    }
}
