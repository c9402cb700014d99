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

//! Operators moving nodes between paths and the inactive set.
//!
//! The activating operators share a cursor over the currently-inactive
//! nodes: for each inactive node, the path enumeration is exhausted
//! before the cursor advances. `MakeInactiveOperator` works the other
//! way around and needs no cursor.
//!
//! For the path `1 → 2 → 3 → 4` with node 5 inactive (1 and 4 fixed):
//!
//! - `MakeActiveOperator` inserts 5 at every position.
//! - `MakeInactiveOperator` removes 2 or 3 from the path.
//! - `SwapActiveOperator` replaces 2 or 3 by 5 in place.
//! - `ExtendedSwapActiveOperator` additionally tries all insertion
//!   positions for 5 after removing 2 or 3.

use crate::operator::path::{
    self, inactive_make_one_neighbor, inactive_on_node_initialization, InactiveNodeCursor,
    PathOperator, PathState,
};
use crate::operator::LocalSearchOperator;
use sextant_model::assignment::Assignment;
use sextant_model::index::VarIndex;
use sextant_search::num::SolverNumeric;

/// Inserts an inactive node into a path.
#[derive(Debug, Clone)]
pub struct MakeActiveOperator<T> {
    state: PathState<T>,
    inactive_node: usize,
}

impl<T> MakeActiveOperator<T>
where
    T: SolverNumeric,
{
    pub fn new(next_vars: Vec<VarIndex>, path_vars: Option<Vec<VarIndex>>) -> Self {
        Self {
            state: PathState::new(next_vars, path_vars, 1),
            inactive_node: 0,
        }
    }
}

impl<T> PathOperator<T> for MakeActiveOperator<T>
where
    T: SolverNumeric,
{
    fn path_state(&self) -> &PathState<T> {
        &self.state
    }

    fn path_state_mut(&mut self) -> &mut PathState<T> {
        &mut self.state
    }

    fn on_node_initialization(&mut self) {
        inactive_on_node_initialization(self);
    }

    fn make_one_neighbor(&mut self) -> bool {
        inactive_make_one_neighbor(self)
    }

    fn make_neighbor(&mut self) -> bool {
        let node = self.inactive_node;
        let destination = self.state.base_node(0);
        self.state.make_active(node, destination)
    }
}

impl<T> InactiveNodeCursor<T> for MakeActiveOperator<T>
where
    T: SolverNumeric,
{
    fn inactive_node(&self) -> usize {
        self.inactive_node
    }

    fn set_inactive_node(&mut self, node: usize) {
        self.inactive_node = node;
    }
}

impl<T> LocalSearchOperator<T> for MakeActiveOperator<T>
where
    T: SolverNumeric,
{
    fn name(&self) -> &str {
        "MakeActiveOperator"
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

/// Makes path nodes inactive.
#[derive(Debug, Clone)]
pub struct MakeInactiveOperator<T> {
    state: PathState<T>,
}

impl<T> MakeInactiveOperator<T>
where
    T: SolverNumeric,
{
    pub fn new(next_vars: Vec<VarIndex>, path_vars: Option<Vec<VarIndex>>) -> Self {
        Self {
            state: PathState::new(next_vars, path_vars, 1),
        }
    }
}

impl<T> PathOperator<T> for MakeInactiveOperator<T>
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
        let base = self.state.base_node(0);
        if self.state.is_path_end(base) {
            return false;
        }
        let next = self.state.next(base);
        self.state.make_chain_inactive(base, next)
    }
}

impl<T> LocalSearchOperator<T> for MakeInactiveOperator<T>
where
    T: SolverNumeric,
{
    fn name(&self) -> &str {
        "MakeInactiveOperator"
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

/// Replaces an active node by an inactive one at the same position.
#[derive(Debug, Clone)]
pub struct SwapActiveOperator<T> {
    state: PathState<T>,
    inactive_node: usize,
}

impl<T> SwapActiveOperator<T>
where
    T: SolverNumeric,
{
    pub fn new(next_vars: Vec<VarIndex>, path_vars: Option<Vec<VarIndex>>) -> Self {
        Self {
            state: PathState::new(next_vars, path_vars, 1),
            inactive_node: 0,
        }
    }
}

impl<T> PathOperator<T> for SwapActiveOperator<T>
where
    T: SolverNumeric,
{
    fn path_state(&self) -> &PathState<T> {
        &self.state
    }

    fn path_state_mut(&mut self) -> &mut PathState<T> {
        &mut self.state
    }

    fn on_node_initialization(&mut self) {
        inactive_on_node_initialization(self);
    }

    fn make_one_neighbor(&mut self) -> bool {
        inactive_make_one_neighbor(self)
    }

    fn make_neighbor(&mut self) -> bool {
        let base = self.state.base_node(0);
        if self.state.is_path_end(base) {
            return false;
        }
        let next = self.state.next(base);
        let node = self.inactive_node;
        self.state.make_chain_inactive(base, next) && self.state.make_active(node, base)
    }
}

impl<T> InactiveNodeCursor<T> for SwapActiveOperator<T>
where
    T: SolverNumeric,
{
    fn inactive_node(&self) -> usize {
        self.inactive_node
    }

    fn set_inactive_node(&mut self, node: usize) {
        self.inactive_node = node;
    }
}

impl<T> LocalSearchOperator<T> for SwapActiveOperator<T>
where
    T: SolverNumeric,
{
    fn name(&self) -> &str {
        "SwapActiveOperator"
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

/// Activates an inactive node and deactivates an active one, trying all
/// insertion positions instead of just the vacated one.
#[derive(Debug, Clone)]
pub struct ExtendedSwapActiveOperator<T> {
    state: PathState<T>,
    inactive_node: usize,
}

impl<T> ExtendedSwapActiveOperator<T>
where
    T: SolverNumeric,
{
    pub fn new(next_vars: Vec<VarIndex>, path_vars: Option<Vec<VarIndex>>) -> Self {
        Self {
            state: PathState::new(next_vars, path_vars, 2),
            inactive_node: 0,
        }
    }
}

impl<T> PathOperator<T> for ExtendedSwapActiveOperator<T>
where
    T: SolverNumeric,
{
    fn path_state(&self) -> &PathState<T> {
        &self.state
    }

    fn path_state_mut(&mut self) -> &mut PathState<T> {
        &mut self.state
    }

    fn on_node_initialization(&mut self) {
        inactive_on_node_initialization(self);
    }

    fn make_one_neighbor(&mut self) -> bool {
        inactive_make_one_neighbor(self)
    }

    fn make_neighbor(&mut self) -> bool {
        let base0 = self.state.base_node(0);
        if self.state.is_path_end(base0) {
            return false;
        }
        let base1 = self.state.base_node(1);
        if self.state.is_path_end(base1) {
            return false;
        }
        if self.state.next(base0) == base1 {
            return false;
        }
        let next0 = self.state.next(base0);
        let node = self.inactive_node;
        self.state.make_chain_inactive(base0, next0) && self.state.make_active(node, base1)
    }
}

impl<T> InactiveNodeCursor<T> for ExtendedSwapActiveOperator<T>
where
    T: SolverNumeric,
{
    fn inactive_node(&self) -> usize {
        self.inactive_node
    }

    fn set_inactive_node(&mut self, node: usize) {
        self.inactive_node = node;
    }
}

impl<T> LocalSearchOperator<T> for ExtendedSwapActiveOperator<T>
where
    T: SolverNumeric,
{
    fn name(&self) -> &str {
        "ExtendedSwapActiveOperator"
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
