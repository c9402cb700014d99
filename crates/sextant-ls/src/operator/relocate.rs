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

//! The relocate operator.
//!
//! Moves the chain of fixed length `chain_length` starting after the
//! first base node to the position after the second base node. With a
//! chain length of 1 this simply moves one node. Possible neighbors for
//! `1 → 2 → 3 → 4 → 5` with chain length 2 (1 and 5 fixed):
//!
//! - `1 → 4 → 2 → 3 → 5`
//! - `1 → 3 → 4 → 2 → 5`
//!
//! Concatenating relocates with chain lengths 1, 2 and 3 restricted to a
//! single path yields the classic or-opt neighborhood, a limited form of
//! 3-opt.

use crate::operator::path::{self, PathOperator, PathState};
use crate::operator::LocalSearchOperator;
use sextant_model::assignment::Assignment;
use sextant_model::index::VarIndex;
use sextant_search::num::SolverNumeric;

/// Moves fixed-length chains to new positions.
#[derive(Debug, Clone)]
pub struct Relocate<T> {
    state: PathState<T>,
    chain_length: usize,
    single_path: bool,
}

impl<T> Relocate<T>
where
    T: SolverNumeric,
{
    /// Creates a relocate operator moving single nodes across paths.
    pub fn new(next_vars: Vec<VarIndex>, path_vars: Option<Vec<VarIndex>>) -> Self {
        Self::with_chain_length(next_vars, path_vars, 1, false)
    }

    /// Creates a relocate operator for chains of `chain_length` nodes,
    /// optionally restricted to moves within one path.
    ///
    /// # Panics
    ///
    /// Panics if `chain_length` is zero.
    pub fn with_chain_length(
        next_vars: Vec<VarIndex>,
        path_vars: Option<Vec<VarIndex>>,
        chain_length: usize,
        single_path: bool,
    ) -> Self {
        assert!(
            chain_length > 0,
            "called `Relocate::with_chain_length` with a zero chain length"
        );
        Self {
            state: PathState::new(next_vars, path_vars, 2),
            chain_length,
            single_path,
        }
    }
}

impl<T> PathOperator<T> for Relocate<T>
where
    T: SolverNumeric,
{
    fn path_state(&self) -> &PathState<T> {
        &self.state
    }

    fn path_state_mut(&mut self) -> &mut PathState<T> {
        &mut self.state
    }

    fn on_same_path_as_previous_base(&self, _base_index: usize) -> bool {
        // Both base nodes have to be on the same path in the single-path
        // version.
        self.single_path
    }

    fn make_neighbor(&mut self) -> bool {
        debug_assert!(
            !self.single_path || self.state.start_node(0) == self.state.start_node(1),
            "called `Relocate::make_neighbor` with bases on distinct paths in single-path mode"
        );
        let before_chain = self.state.base_node(0);
        let mut chain_end = before_chain;
        for _ in 0..self.chain_length {
            if self.state.is_path_end(chain_end) {
                return false;
            }
            chain_end = self.state.next(chain_end);
        }
        let destination = self.state.base_node(1);
        self.state.move_chain(before_chain, chain_end, destination)
    }
}

impl<T> LocalSearchOperator<T> for Relocate<T>
where
    T: SolverNumeric,
{
    fn name(&self) -> &str {
        "Relocate"
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
