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

//! # Neighbor Limit Monitor
//!
//! Caps the number of neighbors a search may generate. Useful to bound
//! explicitly unlimited neighborhoods (TSP-LNS, Lin-Kernighan) and to
//! make test runs deterministic.

use crate::monitor::search_monitor::{SearchCommand, SearchMonitor};

/// A monitor enforcing a neighbor-count budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborLimitMonitor<T> {
    limit: u64,
    neighbors: u64,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> NeighborLimitMonitor<T> {
    /// Creates a monitor allowing at most `limit` neighbors.
    ///
    /// # Panics
    ///
    /// Panics if `limit` is zero.
    #[inline]
    pub fn new(limit: u64) -> Self {
        assert!(
            limit > 0,
            "called `NeighborLimitMonitor::new` with a zero limit"
        );
        Self {
            limit,
            neighbors: 0,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Returns the number of neighbors counted so far.
    #[inline]
    pub fn neighbors(&self) -> u64 {
        self.neighbors
    }
}

impl<T> SearchMonitor<T> for NeighborLimitMonitor<T> {
    fn name(&self) -> &str {
        "NeighborLimitMonitor"
    }

    fn on_enter_search(&mut self) {
        self.neighbors = 0;
    }

    fn on_neighbor(&mut self) {
        self.neighbors = self.neighbors.saturating_add(1);
    }

    fn search_command(&self) -> SearchCommand {
        if self.neighbors >= self.limit {
            SearchCommand::Terminate("neighbor limit reached".into())
        } else {
            SearchCommand::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "zero limit")]
    fn test_zero_limit_is_rejected() {
        let _ = NeighborLimitMonitor::<i64>::new(0);
    }

    #[test]
    fn test_limit_terminates_after_exact_count() {
        let mut monitor = NeighborLimitMonitor::<i64>::new(3);
        SearchMonitor::<i64>::on_enter_search(&mut monitor);
        for _ in 0..2 {
            SearchMonitor::<i64>::on_neighbor(&mut monitor);
            assert_eq!(
                SearchMonitor::<i64>::search_command(&monitor),
                SearchCommand::Continue
            );
        }
        SearchMonitor::<i64>::on_neighbor(&mut monitor);
        assert_eq!(
            SearchMonitor::<i64>::search_command(&monitor),
            SearchCommand::Terminate("neighbor limit reached".into())
        );
    }

    #[test]
    fn test_enter_search_resets_count() {
        let mut monitor = NeighborLimitMonitor::<i64>::new(1);
        SearchMonitor::<i64>::on_enter_search(&mut monitor);
        SearchMonitor::<i64>::on_neighbor(&mut monitor);
        assert!(matches!(
            SearchMonitor::<i64>::search_command(&monitor),
            SearchCommand::Terminate(_)
        ));
        SearchMonitor::<i64>::on_enter_search(&mut monitor);
        assert_eq!(monitor.neighbors(), 0);
        assert_eq!(
            SearchMonitor::<i64>::search_command(&monitor),
            SearchCommand::Continue
        );
    }
}
