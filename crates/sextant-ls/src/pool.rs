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

//! Solution pools.
//!
//! A pool is the pluggable source of the reference assignment operators
//! are restarted on. The engine initializes it with the first solution,
//! registers every committed neighbor, and periodically asks whether the
//! reference should be re-fetched (`sync_needed`), which lets exotic
//! pools inject solutions found elsewhere.

use sextant_model::assignment::Assignment;
use sextant_search::num::SolverNumeric;

/// A source of reference assignments.
pub trait SolutionPool<T>
where
    T: SolverNumeric,
{
    /// Installs the initial solution.
    fn initialize(&mut self, assignment: &Assignment<T>);

    /// Records a newly committed solution.
    fn register_new_solution(&mut self, assignment: &Assignment<T>);

    /// Writes the current reference into `assignment`.
    fn get_next_solution(&mut self, assignment: &mut Assignment<T>);

    /// Whether the engine should re-fetch its reference outside the
    /// regular improvement cycle.
    fn sync_needed(&mut self, local_assignment: &Assignment<T>) -> bool;
}

/// Single-slot pool: keeps the last registered solution and never
/// requests an extra sync.
#[derive(Debug, Clone, Default)]
pub struct DefaultSolutionPool<T> {
    reference: Option<Assignment<T>>,
}

impl<T> DefaultSolutionPool<T>
where
    T: SolverNumeric,
{
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self { reference: None }
    }

    fn reference_mut(&mut self) -> &mut Assignment<T> {
        self.reference
            .as_mut()
            .expect("solution pool used before initialization")
    }
}

impl<T> SolutionPool<T> for DefaultSolutionPool<T>
where
    T: SolverNumeric,
{
    fn initialize(&mut self, assignment: &Assignment<T>) {
        self.reference = Some(assignment.clone());
    }

    fn register_new_solution(&mut self, assignment: &Assignment<T>) {
        self.reference_mut().copy_from(assignment);
    }

    fn get_next_solution(&mut self, assignment: &mut Assignment<T>) {
        let reference = self
            .reference
            .as_ref()
            .expect("solution pool used before initialization");
        assignment.copy_from(reference);
    }

    fn sync_needed(&mut self, _local_assignment: &Assignment<T>) -> bool {
        false
    }
}
