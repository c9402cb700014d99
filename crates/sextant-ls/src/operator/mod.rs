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

//! Local search operators.
//!
//! An operator maintains state while exploring a neighborhood of a
//! reference assignment. The engine calls `start` once per reference,
//! then `make_next_neighbor` repeatedly; each successful call leaves a
//! candidate change in `delta` (and, for incremental operators, the
//! change relative to the previous neighbor in `deltadelta`). A `false`
//! return means the neighborhood is exhausted.
//!
//! Concrete operators do not form a deep inheritance tree; they hold one
//! of two state bases by composition (`state::VarState` for plain
//! variable moves, `path::PathState` for moves on a `next[]` array) and
//! implement the small capability trait below. Only the combinators in
//! [`compound`] deal in boxed trait objects.

pub mod active;
pub mod compound;
pub mod cross;
pub mod exchange;
pub mod factory;
pub mod lin_kernighan;
pub mod lns;
pub mod path;
pub mod relocate;
pub mod scalar;
pub mod state;
pub mod tsp;
pub mod two_opt;

use sextant_model::assignment::Assignment;
use sextant_search::num::SolverNumeric;

/// A stateful operator exploring one neighborhood of the reference
/// assignment.
///
/// ## Lifecycle
///
/// 1. **`start`**: Synchronizes the operator on a new reference
///    assignment. Fails loudly if the assignment lacks one of the
///    operator's variables.
/// 2. **`make_next_neighbor`**: Produces the next candidate into `delta`
///    (cleared by the caller beforehand). Incremental operators also emit
///    the change since the previous neighbor into `deltadelta`. Returns
///    `false` once the neighborhood is exhausted.
///
/// After a `start`, the engine issues a monotone sequence of
/// `make_next_neighbor` calls until exhaustion or a restart; nothing in
/// the operator survives a restart except the cursor fields required to
/// resume enumeration.
pub trait LocalSearchOperator<T>
where
    T: SolverNumeric,
{
    /// Returns the name of the operator for logging and identification.
    fn name(&self) -> &str;

    /// Synchronizes the operator on the given reference assignment.
    fn start(&mut self, assignment: &Assignment<T>);

    /// Produces the next candidate change, or returns `false` when the
    /// neighborhood is exhausted.
    fn make_next_neighbor(
        &mut self,
        delta: &mut Assignment<T>,
        deltadelta: &mut Assignment<T>,
    ) -> bool;
}

impl<T> std::fmt::Debug for dyn LocalSearchOperator<T>
where
    T: SolverNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LocalSearchOperator {{ name: {} }}", self.name())
    }
}
