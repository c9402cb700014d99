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

//! Local search outcome and termination reporting.
//!
//! The outcome bundles the best assignment discovered, aggregate run
//! statistics and a concise termination reason, so downstream consumers
//! can audit how a run ended without inspecting engine internals.

use crate::stats::LocalSearchStatistics;
use sextant_model::assignment::Assignment;

/// Why the engine stopped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LocalSearchTerminationReason {
    /// The neighborhood was fully explored without an accepted
    /// neighbor: the reference assignment is a local optimum.
    LocalOptimum,

    /// A search limit requested termination; the string carries the
    /// limit's reason.
    Aborted(String),
}

impl std::fmt::Display for LocalSearchTerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocalSearchTerminationReason::LocalOptimum => write!(f, "Local Optimum Reached"),
            LocalSearchTerminationReason::Aborted(reason) => write!(f, "Aborted: {}", reason),
        }
    }
}

/// Result of a local search run.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalSearchOutcome<T> {
    termination_reason: LocalSearchTerminationReason,
    solution: Assignment<T>,
    statistics: LocalSearchStatistics,
}

impl<T> LocalSearchOutcome<T> {
    /// Creates a local-optimum outcome.
    #[inline]
    pub fn local_optimum(solution: Assignment<T>, statistics: LocalSearchStatistics) -> Self {
        Self {
            termination_reason: LocalSearchTerminationReason::LocalOptimum,
            solution,
            statistics,
        }
    }

    /// Creates an aborted outcome.
    #[inline]
    pub fn aborted<R>(solution: Assignment<T>, reason: R, statistics: LocalSearchStatistics) -> Self
    where
        R: Into<String>,
    {
        Self {
            termination_reason: LocalSearchTerminationReason::Aborted(reason.into()),
            solution,
            statistics,
        }
    }

    /// Returns the termination reason.
    #[inline]
    pub fn termination_reason(&self) -> &LocalSearchTerminationReason {
        &self.termination_reason
    }

    /// Returns `true` if the run ended at a local optimum.
    #[inline]
    pub fn is_local_optimum(&self) -> bool {
        self.termination_reason == LocalSearchTerminationReason::LocalOptimum
    }

    /// Returns the best assignment discovered.
    #[inline]
    pub fn solution(&self) -> &Assignment<T> {
        &self.solution
    }

    /// Returns the run statistics.
    #[inline]
    pub fn statistics(&self) -> &LocalSearchStatistics {
        &self.statistics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sextant_model::index::VarIndex;

    #[test]
    fn test_outcome_accessors() {
        let mut solution = Assignment::<i64>::new();
        solution.add(VarIndex::new(0), 3);
        let outcome = LocalSearchOutcome::local_optimum(solution, LocalSearchStatistics::default());
        assert!(outcome.is_local_optimum());
        assert_eq!(
            outcome.termination_reason().to_string(),
            "Local Optimum Reached"
        );
        assert_eq!(outcome.solution().num_int_elements(), 1);
    }

    #[test]
    fn test_aborted_outcome_carries_reason() {
        let outcome = LocalSearchOutcome::<i64>::aborted(
            Assignment::new(),
            "time limit reached",
            LocalSearchStatistics::default(),
        );
        assert!(!outcome.is_local_optimum());
        assert_eq!(
            outcome.termination_reason().to_string(),
            "Aborted: time limit reached"
        );
    }
}
