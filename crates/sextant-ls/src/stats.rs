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

//! Statistics reporting for local search runs.
//!
//! A lightweight container tracking aggregate metrics of an exploration:
//! loop iterations, neighbors generated, neighbors that passed the
//! filter stack, neighbors committed, and total elapsed time. Updates
//! use saturating arithmetic so the hot loop never traps on overflow.

use sextant_core::num::ops::SaturatingAddVal;
use std::time::Duration;

/// Aggregate metrics of a local search run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalSearchStatistics {
    /// Number of driver loop iterations.
    pub iterations: u64,

    /// Number of neighbors produced by the operator.
    pub neighbors: u64,

    /// Number of neighbors accepted by the filter stack.
    pub filtered_neighbors: u64,

    /// Number of neighbors committed as new solutions.
    pub accepted_neighbors: u64,

    /// Total time taken by the run.
    pub time_total: Duration,
}

impl Default for LocalSearchStatistics {
    fn default() -> Self {
        Self {
            iterations: 0,
            neighbors: 0,
            filtered_neighbors: 0,
            accepted_neighbors: 0,
            time_total: Duration::ZERO,
        }
    }
}

impl LocalSearchStatistics {
    /// Called at each iteration of the driver loop.
    #[inline]
    pub fn on_iteration(&mut self) {
        self.iterations = self.iterations.saturating_add_val(1);
    }

    /// Called when the operator produced a neighbor.
    #[inline]
    pub fn on_neighbor(&mut self) {
        self.neighbors = self.neighbors.saturating_add_val(1);
    }

    /// Called when a neighbor passed all filters.
    #[inline]
    pub fn on_filtered_neighbor(&mut self) {
        self.filtered_neighbors = self.filtered_neighbors.saturating_add_val(1);
    }

    /// Called when a neighbor was committed.
    #[inline]
    pub fn on_accepted_neighbor(&mut self) {
        self.accepted_neighbors = self.accepted_neighbors.saturating_add_val(1);
    }

    /// Sets the total time taken by the run.
    #[inline]
    pub fn set_total_time(&mut self, duration: Duration) {
        self.time_total = duration;
    }

    /// Neighbors rejected by filters or the commit step.
    #[inline]
    pub fn rejected_neighbors(&self) -> u64 {
        self.neighbors.saturating_sub(self.accepted_neighbors)
    }
}

impl std::fmt::Display for LocalSearchStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Sextant-LS Statistics:")?;
        writeln!(f, "   Iterations:          {}", self.iterations)?;
        writeln!(f, "   Neighbors:           {}", self.neighbors)?;
        writeln!(f, "   Filtered Neighbors:  {}", self.filtered_neighbors)?;
        writeln!(f, "   Accepted Neighbors:  {}", self.accepted_neighbors)?;
        writeln!(f, "   Rejected Neighbors:  {}", self.rejected_neighbors())?;
        writeln!(f, "   Total Time:          {:?}", self.time_total)?;
        Ok(())
    }
}
