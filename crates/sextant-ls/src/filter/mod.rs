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

//! Delta filters.
//!
//! Filters decide cheaply whether a candidate delta is worth handing to
//! the solver. They are synchronized on every new reference assignment
//! and then offered each `(delta, deltadelta)` pair.
//!
//! Incremental filters maintain internal caches keyed to the sequence of
//! offered deltas; the driver therefore calls them on *every* candidate,
//! even after an earlier filter has rejected, and sends them empty
//! deltas too. Non-incremental filters are short-circuited on the first
//! rejection.

pub mod domain;
pub mod objective;

use sextant_model::assignment::Assignment;
use sextant_search::num::SolverNumeric;

/// A cheap acceptance test over candidate deltas.
pub trait LocalSearchFilter<T>
where
    T: SolverNumeric,
{
    /// Returns the name of the filter.
    fn name(&self) -> &str;

    /// Re-synchronizes internal state on a new reference assignment.
    fn synchronize(&mut self, assignment: &Assignment<T>);

    /// Accepts or rejects a candidate change.
    fn accept(&mut self, delta: &Assignment<T>, deltadelta: &Assignment<T>) -> bool;

    /// Whether this filter keeps incremental caches and must see every
    /// candidate.
    fn is_incremental(&self) -> bool {
        false
    }
}

impl<T> std::fmt::Debug for dyn LocalSearchFilter<T>
where
    T: SolverNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LocalSearchFilter {{ name: {} }}", self.name())
    }
}

/// Runs a filter chain over a candidate.
///
/// Incremental filters are always consulted so their caches stay
/// coherent; non-incremental filters are skipped once the candidate is
/// already rejected.
pub fn filter_accept<T>(
    filters: &mut [Box<dyn LocalSearchFilter<T>>],
    delta: &Assignment<T>,
    deltadelta: &Assignment<T>,
) -> bool
where
    T: SolverNumeric,
{
    let mut ok = true;
    for filter in filters.iter_mut() {
        if filter.is_incremental() {
            ok = filter.accept(delta, deltadelta) && ok;
        } else {
            ok = ok && filter.accept(delta, deltadelta);
        }
    }
    ok
}
