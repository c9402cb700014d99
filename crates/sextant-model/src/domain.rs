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

//! Variable domain oracle.
//!
//! The local search engine does not own variable domains; they belong to
//! the surrounding constraint solver. Filters consult them through the
//! `VarDomains` trait. `DomainStore` is a concrete interval-based
//! implementation used by the engine's tests and by callers that do not
//! have a full solver behind them.

use crate::index::VarIndex;
use num_traits::PrimInt;

/// Read-only access to the domains of the decision variables.
///
/// Implementations are expected to answer for every `VarIndex` the engine
/// was configured with; querying an unknown variable is a caller error.
pub trait VarDomains<T> {
    /// Returns the smallest value in the domain of `var`.
    fn min(&self, var: VarIndex) -> T;

    /// Returns the largest value in the domain of `var`.
    fn max(&self, var: VarIndex) -> T;

    /// Returns whether `value` is in the domain of `var`.
    fn contains(&self, var: VarIndex, value: T) -> bool;

    /// Returns whether the domain of `var` is a singleton.
    fn is_bound(&self, var: VarIndex) -> bool;
}

/// Errors raised when building a `DomainStore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An interval with `min > max` was supplied for the given variable
    /// position.
    EmptyInterval { position: usize },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::EmptyInterval { position } => {
                write!(f, "empty domain interval at variable position {}", position)
            }
        }
    }
}

impl std::error::Error for DomainError {}

/// An interval-based domain store.
///
/// Each variable's domain is the closed interval `[min, max]`, which is
/// all the engine's filters need. Variables are indexed densely from 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainStore<T> {
    intervals: Vec<(T, T)>,
}

impl<T> DomainStore<T>
where
    T: PrimInt,
{
    /// Builds a store from per-variable closed intervals.
    pub fn from_intervals(intervals: Vec<(T, T)>) -> Result<Self, DomainError> {
        for (position, &(min, max)) in intervals.iter().enumerate() {
            if min > max {
                return Err(DomainError::EmptyInterval { position });
            }
        }
        Ok(Self { intervals })
    }

    /// Builds a store of `size` variables that all share `[min, max]`.
    ///
    /// # Panics
    ///
    /// Panics if `min > max`.
    pub fn uniform(size: usize, min: T, max: T) -> Self {
        assert!(
            min <= max,
            "called `DomainStore::uniform` with an empty interval"
        );
        Self {
            intervals: vec![(min, max); size],
        }
    }

    /// Returns the number of variables covered by this store.
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.intervals.len()
    }

    #[inline(always)]
    fn interval(&self, var: VarIndex) -> (T, T) {
        let index = var.get();
        debug_assert!(
            index < self.intervals.len(),
            "called `DomainStore::interval` with variable out of bounds: the size is {} but the index is {}",
            self.intervals.len(),
            index
        );
        self.intervals[index]
    }
}

impl<T> VarDomains<T> for DomainStore<T>
where
    T: PrimInt,
{
    #[inline]
    fn min(&self, var: VarIndex) -> T {
        self.interval(var).0
    }

    #[inline]
    fn max(&self, var: VarIndex) -> T {
        self.interval(var).1
    }

    #[inline]
    fn contains(&self, var: VarIndex, value: T) -> bool {
        let (min, max) = self.interval(var);
        min <= value && value <= max
    }

    #[inline]
    fn is_bound(&self, var: VarIndex) -> bool {
        let (min, max) = self.interval(var);
        min == max
    }
}
