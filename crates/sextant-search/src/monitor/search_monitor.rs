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

//! # Search Monitoring Interface
//!
//! A callback interface for observing and controlling the lifecycle of a
//! neighborhood search. Implementations can collect metrics, enforce
//! budget limits, and issue termination commands based on external
//! criteria. The engine consults `search_command` once per iteration, so
//! cancellation stays cooperative: no monitor can interrupt a running
//! neighbor generation, only prevent the next one.
//!
//! ## Core Concepts
//!
//! - `SearchMonitor<T>`: Lifecycle hooks plus `search_command`, which
//!   returns `Continue` or `Terminate(reason)`.
//! - `SearchCommand`: The control signal emitted by monitors.
//! - `DummyMonitor`: A no-op implementation useful for tests or as a
//!   template for custom monitors.

use sextant_model::assignment::Assignment;

/// Control signal emitted by monitors to continue or abort the search.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub enum SearchCommand {
    #[default]
    Continue,
    Terminate(String),
}

impl std::fmt::Display for SearchCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchCommand::Continue => write!(f, "Continue"),
            SearchCommand::Terminate(reason) => write!(f, "Terminate: {}", reason),
        }
    }
}

/// A monitor observing the lifecycle of a neighborhood search.
pub trait SearchMonitor<T> {
    /// Returns the name of the monitor.
    fn name(&self) -> &str;

    /// Called once before the search produces its first neighbor.
    fn on_enter_search(&mut self) {}

    /// Called once after the search has terminated.
    fn on_exit_search(&mut self) {}

    /// Called for every neighbor the operator produced.
    fn on_neighbor(&mut self) {}

    /// Called when a neighbor has been committed as the new reference.
    fn on_solution(&mut self, _assignment: &Assignment<T>) {}

    /// Determines whether the search may continue.
    fn search_command(&self) -> SearchCommand {
        SearchCommand::Continue
    }
}

impl<T> std::fmt::Debug for dyn SearchMonitor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SearchMonitor {{ name: {} }}", self.name())
    }
}

/// A monitor that observes nothing and never terminates the search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DummyMonitor;

impl<T> SearchMonitor<T> for DummyMonitor {
    fn name(&self) -> &str {
        "DummyMonitor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_command_display() {
        assert_eq!(SearchCommand::Continue.to_string(), "Continue");
        assert_eq!(
            SearchCommand::Terminate("budget".into()).to_string(),
            "Terminate: budget"
        );
    }

    #[test]
    fn test_dummy_monitor_never_terminates() {
        let mut monitor = DummyMonitor;
        SearchMonitor::<i64>::on_enter_search(&mut monitor);
        SearchMonitor::<i64>::on_neighbor(&mut monitor);
        assert_eq!(
            SearchMonitor::<i64>::search_command(&monitor),
            SearchCommand::Continue
        );
    }
}
