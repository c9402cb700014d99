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

//! The cross operator.
//!
//! Exchanges the starting chains of two paths, up to and including the
//! two base nodes; exchanging whole paths is a degenerate case. First
//! and last nodes are not moved. Possible neighbors for the paths
//! `1 → 2 → 3 → 4 → 5` and `6 → 7 → 8`:
//!
//! - `1 → 7 → 3 → 4 → 5` and `6 → 2 → 8`
//! - `1 → 7 → 4 → 5` and `6 → 2 → 3 → 8`
//! - `1 → 7 → 5` and `6 → 2 → 3 → 4 → 8`

use crate::operator::path::{self, PathOperator, PathState};
use crate::operator::LocalSearchOperator;
use sextant_model::assignment::Assignment;
use sextant_model::index::VarIndex;
use sextant_search::num::SolverNumeric;

/// Exchanges path prefixes between two distinct paths.
#[derive(Debug, Clone)]
pub struct Cross<T> {
    state: PathState<T>,
}

impl<T> Cross<T>
where
    T: SolverNumeric,
{
    /// Creates a cross operator over the given `next` variables.
    pub fn new(next_vars: Vec<VarIndex>, path_vars: Option<Vec<VarIndex>>) -> Self {
        Self {
            state: PathState::new(next_vars, path_vars, 2),
        }
    }
}

impl<T> PathOperator<T> for Cross<T>
where
    T: SolverNumeric,
{
    fn path_state(&self) -> &PathState<T> {
        &self.state
    }

    fn path_state_mut(&mut self) -> &mut PathState<T> {
        &mut self.state
    }

    fn make_neighbor(&mut self) -> bool {
        let node0 = self.state.base_node(0);
        let start0 = self.state.start_node(0);
        let node1 = self.state.base_node(1);
        let start1 = self.state.start_node(1);
        if start1 == start0 {
            return false;
        }
        if !self.state.is_path_end(node0) && !self.state.is_path_end(node1) {
            self.state.move_chain(start0, node0, start1)
                && self.state.move_chain(node0, node1, start0)
        } else if !self.state.is_path_end(node0) {
            self.state.move_chain(start0, node0, start1)
        } else if !self.state.is_path_end(node1) {
            self.state.move_chain(start1, node1, start0)
        } else {
            false
        }
    }
}

impl<T> LocalSearchOperator<T> for Cross<T>
where
    T: SolverNumeric,
{
    fn name(&self) -> &str {
        "Cross"
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
