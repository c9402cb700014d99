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

//! Path-structured operator base.
//!
//! `PathState` interprets the first `number_of_nexts` tracked variables
//! as a `next[]` array encoding one or more disjoint paths. A node whose
//! value is at least `number_of_nexts` points at a *path end*: a fixed
//! sentinel that is never moved. A node pointing at itself is *inactive*
//! and excluded from every path. When a second block of variables is
//! tracked, `path[i]` carries the identifier of the path node `i` lies
//! on, with `-1` as the no-path sentinel for inactive nodes.
//!
//! On top of the raw view, this module provides the chain primitives
//! (`move_chain`, `reverse_chain`, `make_active`, `make_chain_inactive`,
//! guarded by `check_chain_validity`) and the multi-index enumeration
//! cursor that `PathOperator` implementations advance through
//! `increment_position`. Cycle detection is by construction: any chain
//! walk longer than `number_of_nexts` is treated as a cycle and rejected.

use crate::operator::state::VarState;
use sextant_model::assignment::Assignment;
use sextant_model::index::VarIndex;
use sextant_search::num::SolverNumeric;
use smallvec::SmallVec;

/// Cursor arrays are sized for the common operator arities (1 or 2 base
/// nodes, a handful for path LNS).
type BaseNodes = SmallVec<[usize; 4]>;

/// Lifts a node index into the solver value space, for handing nodes to
/// evaluators.
#[inline(always)]
pub(crate) fn node_value<T: SolverNumeric>(node: usize) -> T {
    <T as From<i64>>::from(node as i64)
}

/// Variable state specialized to the `next[]` path view.
#[derive(Debug, Clone)]
pub struct PathState<T> {
    state: VarState<T>,
    number_of_nexts: usize,
    ignore_path_vars: bool,
    base_nodes: BaseNodes,
    end_nodes: BaseNodes,
    base_paths: BaseNodes,
    path_starts: Vec<usize>,
    inactives: Vec<bool>,
    pub(crate) just_started: bool,
    first_start: bool,
}

impl<T> PathState<T>
where
    T: SolverNumeric,
{
    /// Creates path state over `next_vars`, optionally tracking the
    /// paired `path_vars`.
    ///
    /// # Panics
    ///
    /// Panics if `number_of_base_nodes` is zero or the variable blocks
    /// have mismatched sizes.
    pub fn new(
        next_vars: Vec<VarIndex>,
        path_vars: Option<Vec<VarIndex>>,
        number_of_base_nodes: usize,
    ) -> Self {
        assert!(
            number_of_base_nodes > 0,
            "called `PathState::new` with zero base nodes"
        );
        let number_of_nexts = next_vars.len();
        let ignore_path_vars = path_vars.is_none();
        let mut vars = next_vars;
        if let Some(path_vars) = path_vars {
            assert_eq!(
                number_of_nexts,
                path_vars.len(),
                "called `PathState::new` with mismatched variable blocks: {} next vars but {} path vars",
                number_of_nexts,
                path_vars.len()
            );
            vars.extend(path_vars);
        }
        Self {
            state: VarState::new(vars),
            number_of_nexts,
            ignore_path_vars,
            base_nodes: SmallVec::from_elem(0, number_of_base_nodes),
            end_nodes: SmallVec::from_elem(0, number_of_base_nodes),
            base_paths: SmallVec::from_elem(0, number_of_base_nodes),
            path_starts: Vec::new(),
            inactives: Vec::new(),
            just_started: false,
            first_start: true,
        }
    }

    /// Returns the underlying variable state.
    #[inline(always)]
    pub fn var_state(&self) -> &VarState<T> {
        &self.state
    }

    /// Returns the underlying variable state, mutably.
    #[inline(always)]
    pub fn var_state_mut(&mut self) -> &mut VarState<T> {
        &mut self.state
    }

    /// Returns the number of `next` variables.
    #[inline(always)]
    pub fn number_of_nexts(&self) -> usize {
        self.number_of_nexts
    }

    /// Returns whether path variables are tracked.
    #[inline(always)]
    pub fn ignore_path_vars(&self) -> bool {
        self.ignore_path_vars
    }

    /// Returns the number of base nodes of the enumeration cursor.
    #[inline(always)]
    pub fn num_base_nodes(&self) -> usize {
        self.base_nodes.len()
    }

    /// Returns the current position of base `index`.
    #[inline(always)]
    pub fn base_node(&self, index: usize) -> usize {
        self.base_nodes[index]
    }

    /// Returns the start of the path base `index` currently explores.
    #[inline(always)]
    pub fn start_node(&self, index: usize) -> usize {
        self.path_starts[self.base_paths[index]]
    }

    /// Returns the paths' start nodes, recomputed on every `start`.
    #[inline(always)]
    pub fn path_starts(&self) -> &[usize] {
        &self.path_starts
    }

    #[inline(always)]
    fn to_node(&self, value: T) -> usize {
        value
            .to_usize()
            .expect("path value is not a valid node index")
    }

    #[inline(always)]
    fn from_node(node: usize) -> T {
        node_value(node)
    }

    /// Returns the current successor of `node`.
    #[inline(always)]
    pub fn next(&self, node: usize) -> usize {
        debug_assert!(
            node < self.number_of_nexts,
            "called `PathState::next` with node out of bounds: the number of nexts is {} but the node is {}",
            self.number_of_nexts,
            node
        );
        self.to_node(self.state.value(node))
    }

    /// Returns the successor of `node` in the reference assignment.
    #[inline(always)]
    pub fn old_next(&self, node: usize) -> usize {
        debug_assert!(
            node < self.number_of_nexts,
            "called `PathState::old_next` with node out of bounds: the number of nexts is {} but the node is {}",
            self.number_of_nexts,
            node
        );
        self.to_node(self.state.old_value(node))
    }

    /// Returns the path identifier of `node`, or zero when path
    /// variables are not tracked.
    #[inline(always)]
    pub fn path(&self, node: usize) -> T {
        if self.ignore_path_vars {
            T::ZERO
        } else {
            self.state.value(self.number_of_nexts + node)
        }
    }

    /// A node is a path end when it lies beyond the `next` block; path
    /// ends are fixed and never moved.
    #[inline(always)]
    pub fn is_path_end(&self, node: usize) -> bool {
        node >= self.number_of_nexts
    }

    /// A node is inactive when it was its own successor in the reference
    /// assignment.
    #[inline(always)]
    pub fn is_inactive(&self, node: usize) -> bool {
        !self.is_path_end(node) && self.inactives[node]
    }

    /// Sets `next[node]` and, when tracked, `path[node]`.
    #[inline]
    pub fn set_next(&mut self, node: usize, next: usize, path: T) {
        debug_assert!(
            node < self.number_of_nexts,
            "called `PathState::set_next` with node out of bounds: the number of nexts is {} but the node is {}",
            self.number_of_nexts,
            node
        );
        self.state.set_value(node, Self::from_node(next));
        if !self.ignore_path_vars {
            self.state.set_value(self.number_of_nexts + node, path);
        }
    }

    /// Checks that `(before_chain → … → chain_end]` is a proper chain.
    ///
    /// Rejects if `before_chain == chain_end`, if a path end is hit
    /// before `chain_end`, if `exclude` lies on the chain (or equals
    /// `before_chain`), or if the walk exceeds `number_of_nexts` steps
    /// (which can only mean a cycle).
    pub fn check_chain_validity(
        &self,
        before_chain: usize,
        chain_end: usize,
        exclude: Option<usize>,
    ) -> bool {
        if before_chain == chain_end || Some(before_chain) == exclude {
            return false;
        }
        let mut current = before_chain;
        let mut chain_size = 0;
        while current != chain_end {
            if chain_size > self.number_of_nexts {
                return false;
            }
            if self.is_path_end(current) {
                return false;
            }
            current = self.next(current);
            chain_size += 1;
            if Some(current) == exclude {
                return false;
            }
        }
        true
    }

    /// Removes the chain `(before_chain → … → chain_end]` from its path
    /// and splices it after `destination`.
    ///
    /// Returns `false` without touching state when the chain is invalid
    /// or `chain_end` / `destination` is a path end. When path variables
    /// are tracked, every moved node is rewritten to the destination
    /// path.
    pub fn move_chain(&mut self, before_chain: usize, chain_end: usize, destination: usize) -> bool {
        if self.check_chain_validity(before_chain, chain_end, Some(destination))
            && !self.is_path_end(chain_end)
            && !self.is_path_end(destination)
        {
            let destination_path = self.path(destination);
            let after_chain = self.next(chain_end);
            self.set_next(chain_end, self.next(destination), destination_path);
            if !self.ignore_path_vars {
                let mut current = destination;
                let mut next = self.next(before_chain);
                while current != chain_end {
                    self.set_next(current, next, destination_path);
                    current = next;
                    next = self.next(next);
                }
            } else {
                self.set_next(destination, self.next(before_chain), destination_path);
            }
            let before_path = self.path(before_chain);
            self.set_next(before_chain, after_chain, before_path);
            return true;
        }
        false
    }

    /// Reverses the open chain between `before_chain` (exclusive) and
    /// `after_chain` (exclusive), returning its last node.
    ///
    /// Returns `None` if the chain is empty or invalid.
    pub fn reverse_chain(&mut self, before_chain: usize, after_chain: usize) -> Option<usize> {
        if self.check_chain_validity(before_chain, after_chain, None) {
            let path = self.path(before_chain);
            let mut current = self.next(before_chain);
            if current == after_chain {
                return None;
            }
            let mut current_next = self.next(current);
            self.set_next(current, after_chain, path);
            while current_next != after_chain {
                let next = self.next(current_next);
                self.set_next(current_next, current, path);
                current = current_next;
                current_next = next;
            }
            self.set_next(before_chain, current, path);
            return Some(current);
        }
        None
    }

    /// Inserts the inactive `node` immediately after `destination`.
    pub fn make_active(&mut self, node: usize, destination: usize) -> bool {
        if !self.is_path_end(destination) {
            let destination_path = self.path(destination);
            self.set_next(node, self.next(destination), destination_path);
            self.set_next(destination, node, destination_path);
            return true;
        }
        false
    }

    /// Deactivates every node of `(before_chain → … → chain_end]` and
    /// stitches `before_chain` to the node after the chain.
    pub fn make_chain_inactive(&mut self, before_chain: usize, chain_end: usize) -> bool {
        if self.check_chain_validity(before_chain, chain_end, None) && !self.is_path_end(chain_end)
        {
            let after_chain = self.next(chain_end);
            let mut current = self.next(before_chain);
            while current != after_chain {
                let next = self.next(current);
                self.set_next(current, current, T::MINUS_ONE);
                current = next;
            }
            let before_path = self.path(before_chain);
            self.set_next(before_chain, after_chain, before_path);
            return true;
        }
        false
    }

    /// Returns whether `node1` and `node2` lie on the same path of the
    /// reference assignment.
    pub fn on_same_path(&self, node1: usize, node2: usize) -> bool {
        if self.is_inactive(node1) != self.is_inactive(node2) {
            return false;
        }
        let mut node = node1;
        while !self.is_path_end(node) {
            if node == node2 {
                return true;
            }
            node = self.old_next(node);
        }
        let mut node = node2;
        while !self.is_path_end(node) {
            if node == node1 {
                return true;
            }
            node = self.old_next(node);
        }
        false
    }

    /// A node is a path start when no node has it as reference successor.
    pub(crate) fn initialize_path_starts(&mut self) {
        self.path_starts.clear();
        let mut has_prevs = vec![false; self.number_of_nexts];
        for i in 0..self.number_of_nexts {
            let next = self.old_next(i);
            if next < self.number_of_nexts {
                has_prevs[next] = true;
            }
        }
        for (i, &has_prev) in has_prevs.iter().enumerate() {
            if !has_prev {
                self.path_starts.push(i);
            }
        }
    }

    pub(crate) fn initialize_inactives(&mut self) {
        self.inactives.clear();
        for i in 0..self.number_of_nexts {
            self.inactives.push(self.old_next(i) == i);
        }
    }

    /// Confirms the cursor still differs from the snapshot taken at
    /// `start`; equality means a full unproductive cycle.
    pub(crate) fn check_ends(&self) -> bool {
        self.base_nodes
            .iter()
            .zip(self.end_nodes.iter())
            .any(|(base, end)| base != end)
    }

    /// Re-runs the enumeration from the current cursor on the next
    /// `increment_position` call.
    #[inline]
    pub fn reset_position(&mut self) {
        self.just_started = true;
    }

    /// Emits the tracked changes, skipping elements whose paired
    /// variable did not change either.
    pub fn apply_changes(
        &self,
        delta: &mut Assignment<T>,
        deltadelta: &mut Assignment<T>,
        incremental: bool,
    ) -> bool {
        let number_of_nexts = self.number_of_nexts;
        let ignore_path_vars = self.ignore_path_vars;
        self.state
            .apply_changes(delta, deltadelta, incremental, move |state, index| {
                if ignore_path_vars {
                    return true;
                }
                let paired = if index < number_of_nexts {
                    index + number_of_nexts
                } else {
                    index - number_of_nexts
                };
                state.value(paired) == state.old_value(paired)
            })
    }

    /// Fully reverts to the reference assignment.
    #[inline]
    pub fn revert_full(&mut self) {
        self.state.revert_changes(false, false);
    }
}

/// A path-structured operator: state by composition plus the hooks the
/// enumeration machinery consults.
///
/// Implementations provide `make_neighbor`, which mutates the path state
/// at the current cursor and reports whether a candidate was produced.
/// The provided `make_one_neighbor` advances the cursor until a neighbor
/// is found or the enumeration is exhausted; operators with their own
/// outer loops (the inactive-node family, TSP-LNS) override it.
pub trait PathOperator<T>
where
    T: SolverNumeric,
{
    /// Returns the path state.
    fn path_state(&self) -> &PathState<T>;

    /// Returns the path state, mutably.
    fn path_state_mut(&mut self) -> &mut PathState<T>;

    /// Produces a neighbor at the current cursor position.
    fn make_neighbor(&mut self) -> bool;

    /// Whether successive neighbors are reported relative to the
    /// previous emission instead of the reference.
    fn is_incremental(&self) -> bool {
        false
    }

    /// Whether base `base_index` must stay on the path of base
    /// `base_index - 1`.
    fn on_same_path_as_previous_base(&self, _base_index: usize) -> bool {
        false
    }

    /// Position a restarted base is re-planted on. Defaults to the start
    /// of the base's current path.
    fn base_node_restart_position(&mut self, base_index: usize) -> usize {
        self.path_state().start_node(base_index)
    }

    /// When `true`, every `start` re-plants the cursor at the first
    /// path start instead of resuming from the previous position.
    fn init_position(&self) -> bool {
        false
    }

    /// When `true`, bases are moved back to their path starts on every
    /// synchronization.
    fn restart_at_path_start_on_synchronize(&self) -> bool {
        false
    }

    /// Hook invoked after the cursor has been synchronized.
    fn on_node_initialization(&mut self) {}

    /// Advances the cursor until `make_neighbor` succeeds.
    fn make_one_neighbor(&mut self) -> bool
    where
        Self: Sized,
    {
        default_make_one_neighbor(self)
    }
}

/// Synchronizes a path operator on a reference assignment.
pub fn start<T, O>(op: &mut O, assignment: &Assignment<T>)
where
    T: SolverNumeric,
    O: PathOperator<T> + ?Sized,
{
    op.path_state_mut().var_state_mut().start(assignment);
    initialize_base_nodes(op);
    op.on_node_initialization();
}

/// The generic neighbor loop shared by all path operators: revert,
/// advance, emit.
pub fn make_next_neighbor<T, O>(
    op: &mut O,
    delta: &mut Assignment<T>,
    deltadelta: &mut Assignment<T>,
) -> bool
where
    T: SolverNumeric,
    O: PathOperator<T>,
{
    loop {
        let incremental = op.is_incremental();
        op.path_state_mut()
            .var_state_mut()
            .revert_changes(true, incremental);
        if !op.make_one_neighbor() {
            return false;
        }
        if op.path_state().apply_changes(delta, deltadelta, incremental) {
            return true;
        }
    }
}

/// Default cursor-driven neighbor production.
pub(crate) fn default_make_one_neighbor<T, O>(op: &mut O) -> bool
where
    T: SolverNumeric,
    O: PathOperator<T> + ?Sized,
{
    while increment_position(op) {
        // MakeNeighbor might have mutated state before failing on the
        // previous cursor position.
        let incremental = op.is_incremental();
        op.path_state_mut()
            .var_state_mut()
            .revert_changes(true, incremental);
        if op.make_neighbor() {
            return true;
        }
    }
    false
}

fn initialize_base_nodes<T, O>(op: &mut O)
where
    T: SolverNumeric,
    O: PathOperator<T> + ?Sized,
{
    {
        let ps = op.path_state_mut();
        ps.initialize_path_starts();
        ps.initialize_inactives();
    }
    let init = {
        let ps = op.path_state();
        ps.first_start
    } || op.init_position();
    if init {
        // Only once; later starts continue from the preceding position.
        let ps = op.path_state_mut();
        for i in 0..ps.base_nodes.len() {
            ps.base_paths[i] = 0;
            ps.base_nodes[i] = ps.path_starts[0];
        }
        ps.first_start = false;
    }
    let restart = op.restart_at_path_start_on_synchronize();
    {
        let ps = op.path_state_mut();
        for i in 0..ps.base_nodes.len() {
            let mut base_node = ps.base_nodes[i];
            // A base node made inactive by an accepted move is replanted
            // on the start of its path.
            if restart || ps.is_inactive(base_node) {
                base_node = ps.path_starts[ps.base_paths[i]];
                ps.base_nodes[i] = base_node;
            }
            ps.end_nodes[i] = base_node;
        }
    }
    // Repair bases that must share a path with their predecessor but no
    // longer do (other operators may have moved these nodes).
    for i in 1..op.path_state().base_nodes.len() {
        if op.on_same_path_as_previous_base(i) {
            let ps = op.path_state();
            if !ps.on_same_path(ps.base_nodes[i - 1], ps.base_nodes[i]) {
                let ps = op.path_state_mut();
                let base_node = ps.base_nodes[i - 1];
                ps.base_nodes[i] = base_node;
                ps.end_nodes[i] = base_node;
            }
        }
    }
    op.path_state_mut().just_started = true;
}

/// Advances the enumeration cursor by one position.
///
/// The innermost base moves one step along the reference path; a base
/// falling off the end of its path restarts at the path start and the
/// next-outer base advances instead. Once every base has restarted, the
/// bases move to new paths in lexicographic order. Returns `false` once
/// a full cycle has been completed without progress.
pub(crate) fn increment_position<T, O>(op: &mut O) -> bool
where
    T: SolverNumeric,
    O: PathOperator<T> + ?Sized,
{
    let base_node_size = op.path_state().num_base_nodes();
    if op.path_state().just_started {
        op.path_state_mut().just_started = false;
        return true;
    }
    let number_of_paths = op.path_state().path_starts.len();
    let number_of_nexts = op.path_state().number_of_nexts;

    // Advance inner bases first; a base at a path end restarts at its
    // path start and passes the advance on to the next-outer base.
    let mut last_restarted = base_node_size;
    for i in (0..base_node_size).rev() {
        let node = op.path_state().base_nodes[i];
        if node < number_of_nexts {
            let next = op.path_state().old_next(node);
            op.path_state_mut().base_nodes[i] = next;
            break;
        }
        let start = op.path_state().start_node(i);
        op.path_state_mut().base_nodes[i] = start;
        last_restarted = i;
    }
    // Restarted bases are re-placed in ascending order so each sees the
    // final position of the bases below it.
    for i in last_restarted..base_node_size {
        let position = op.base_node_restart_position(i);
        op.path_state_mut().base_nodes[i] = position;
    }
    if last_restarted > 0 {
        return op.path_state().check_ends();
    }
    // Every base restarted: move bases to new paths.
    for i in (0..base_node_size).rev() {
        let next_path_index = op.path_state().base_paths[i] + 1;
        if next_path_index < number_of_paths {
            {
                let ps = op.path_state_mut();
                ps.base_paths[i] = next_path_index;
                ps.base_nodes[i] = ps.path_starts[next_path_index];
            }
            if i == 0 || !op.on_same_path_as_previous_base(i) {
                return op.path_state().check_ends();
            }
        } else {
            let ps = op.path_state_mut();
            ps.base_paths[i] = 0;
            ps.base_nodes[i] = ps.path_starts[0];
        }
    }
    op.path_state().check_ends()
}

/// Shared cursor over currently-inactive nodes, used by the operators
/// that re-insert inactive nodes into paths.
pub(crate) trait InactiveNodeCursor<T>: PathOperator<T>
where
    T: SolverNumeric,
{
    fn inactive_node(&self) -> usize;
    fn set_inactive_node(&mut self, node: usize);
}

/// For each inactive node, exhausts the path enumeration before moving
/// the inactive cursor forward.
pub(crate) fn inactive_make_one_neighbor<T, O>(op: &mut O) -> bool
where
    T: SolverNumeric,
    O: InactiveNodeCursor<T>,
{
    let size = op.path_state().number_of_nexts();
    while op.inactive_node() < size {
        let node = op.inactive_node();
        if !op.path_state().is_inactive(node) || !default_make_one_neighbor(op) {
            op.path_state_mut().reset_position();
            op.set_inactive_node(node + 1);
        } else {
            return true;
        }
    }
    false
}

/// Plants the inactive cursor on the first inactive node.
pub(crate) fn inactive_on_node_initialization<T, O>(op: &mut O)
where
    T: SolverNumeric,
    O: InactiveNodeCursor<T>,
{
    let size = op.path_state().number_of_nexts();
    for i in 0..size {
        if op.path_state().is_inactive(i) {
            op.set_inactive_node(i);
            return;
        }
    }
    op.set_inactive_node(size);
}
