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

//! # Composite Search Monitor
//!
//! Fans every lifecycle hook out to a list of monitors. The composite
//! terminates as soon as any child requests termination, reporting the
//! first child's reason.

use crate::monitor::search_monitor::{SearchCommand, SearchMonitor};
use sextant_model::assignment::Assignment;

/// A monitor forwarding all hooks to its children.
pub struct CompositeSearchMonitor<T> {
    monitors: Vec<Box<dyn SearchMonitor<T>>>,
}

impl<T> CompositeSearchMonitor<T> {
    /// Creates an empty composite.
    #[inline]
    pub fn new() -> Self {
        Self {
            monitors: Vec::new(),
        }
    }

    /// Adds a child monitor.
    #[inline]
    pub fn push(&mut self, monitor: Box<dyn SearchMonitor<T>>) {
        self.monitors.push(monitor);
    }

    /// Returns the number of child monitors.
    #[inline]
    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    /// Returns `true` if there are no child monitors.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }
}

impl<T> Default for CompositeSearchMonitor<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SearchMonitor<T> for CompositeSearchMonitor<T> {
    fn name(&self) -> &str {
        "CompositeSearchMonitor"
    }

    fn on_enter_search(&mut self) {
        for monitor in &mut self.monitors {
            monitor.on_enter_search();
        }
    }

    fn on_exit_search(&mut self) {
        for monitor in &mut self.monitors {
            monitor.on_exit_search();
        }
    }

    fn on_neighbor(&mut self) {
        for monitor in &mut self.monitors {
            monitor.on_neighbor();
        }
    }

    fn on_solution(&mut self, assignment: &Assignment<T>) {
        for monitor in &mut self.monitors {
            monitor.on_solution(assignment);
        }
    }

    fn search_command(&self) -> SearchCommand {
        for monitor in &self.monitors {
            if let SearchCommand::Terminate(reason) = monitor.search_command() {
                return SearchCommand::Terminate(reason);
            }
        }
        SearchCommand::Continue
    }
}
