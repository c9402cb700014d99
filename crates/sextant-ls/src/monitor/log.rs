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

//! Progress logging monitor.
//!
//! Streams a tabular progress view of the run to stdout. The clock is
//! consulted only on iterations matching a bitmask-based step filter,
//! keeping the monitor cheap enough for hot loops.

use crate::monitor::local_search_monitor::LocalSearchMonitor;
use crate::stats::LocalSearchStatistics;
use sextant_model::assignment::Assignment;
use sextant_search::num::SolverNumeric;
use std::time::{Duration, Instant};

/// Prints a progress row at a fixed wall-clock interval.
#[derive(Debug, Clone)]
pub struct LogMonitor<T> {
    start_time: Instant,
    last_log_time: Instant,
    log_interval: Duration,
    clock_check_mask: u64,
    steps: u64,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> LogMonitor<T> {
    /// Creates a monitor logging at the given interval, checking the
    /// clock on iterations where `steps & clock_check_mask == 0`.
    pub fn new(log_interval: Duration, clock_check_mask: u64) -> Self {
        Self {
            start_time: Instant::now(),
            last_log_time: Instant::now(),
            log_interval,
            clock_check_mask,
            steps: 0,
            _phantom: std::marker::PhantomData,
        }
    }

    fn print_header(&self) {
        println!(
            "{:<9} | {:<12} | {:<12} | {:<12} | {:<12}",
            "Elapsed", "Iterations", "Neighbors", "Filtered", "Accepted"
        );
        println!("{}", "-".repeat(68));
    }

    fn log_line(&mut self, statistics: &LocalSearchStatistics) {
        let now = Instant::now();
        let elapsed_field = format!("{:.1}s", now.duration_since(self.start_time).as_secs_f32());
        println!(
            "{:<9} | {:<12} | {:<12} | {:<12} | {:<12}",
            elapsed_field,
            statistics.iterations,
            statistics.neighbors,
            statistics.filtered_neighbors,
            statistics.accepted_neighbors
        );
        self.last_log_time = now;
    }
}

impl<T> Default for LogMonitor<T> {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), 4095)
    }
}

impl<T> LocalSearchMonitor<T> for LogMonitor<T>
where
    T: SolverNumeric,
{
    fn name(&self) -> &str {
        "LogMonitor"
    }

    fn on_start(&mut self, _initial_solution: &Assignment<T>) {
        self.start_time = Instant::now();
        self.last_log_time = self.start_time;
        self.steps = 0;
        self.print_header();
    }

    fn on_iteration(
        &mut self,
        _current_solution: &Assignment<T>,
        statistics: &LocalSearchStatistics,
    ) {
        let check = (self.steps & self.clock_check_mask) == 0;
        self.steps = self.steps.wrapping_add(1);
        if check && self.last_log_time.elapsed() >= self.log_interval {
            self.log_line(statistics);
        }
    }

    fn on_end(&mut self, _best_solution: &Assignment<T>, statistics: &LocalSearchStatistics) {
        self.log_line(statistics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_monitor_lifecycle_does_not_panic() {
        let mut monitor = LogMonitor::<i64>::new(Duration::from_millis(0), 0);
        let assignment = Assignment::<i64>::new();
        let stats = LocalSearchStatistics::default();
        monitor.on_start(&assignment);
        for _ in 0..3 {
            monitor.on_iteration(&assignment, &stats);
        }
        monitor.on_end(&assignment, &stats);
    }
}
