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

//! Variable domain filter.
//!
//! Rejects a delta as soon as one of its activated elements assigns a
//! value outside the variable's domain. Stateless, therefore not
//! incremental.

use crate::filter::LocalSearchFilter;
use sextant_model::assignment::Assignment;
use sextant_model::domain::VarDomains;
use sextant_search::num::SolverNumeric;

/// Rejects assignments to values outside the domain of variables.
#[derive(Debug, Clone)]
pub struct VariableDomainFilter<D> {
    domains: D,
}

impl<D> VariableDomainFilter<D> {
    /// Creates the filter over the given domain oracle.
    pub fn new(domains: D) -> Self {
        Self { domains }
    }
}

impl<T, D> LocalSearchFilter<T> for VariableDomainFilter<D>
where
    T: SolverNumeric,
    D: VarDomains<T>,
{
    fn name(&self) -> &str {
        "VariableDomainFilter"
    }

    fn synchronize(&mut self, _assignment: &Assignment<T>) {}

    fn accept(&mut self, delta: &Assignment<T>, _deltadelta: &Assignment<T>) -> bool {
        for element in delta.int_elements() {
            if element.activated() && !self.domains.contains(element.var(), element.value()) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sextant_model::domain::DomainStore;
    use sextant_model::index::VarIndex;

    #[inline]
    fn v(n: usize) -> VarIndex {
        VarIndex::new(n)
    }

    #[test]
    fn test_accepts_values_inside_domains() {
        let mut filter = VariableDomainFilter::new(DomainStore::uniform(3, 0i64, 10));
        let mut delta = Assignment::new();
        delta.fast_add(v(0)).set_value(0);
        delta.fast_add(v(2)).set_value(10);
        assert!(filter.accept(&delta, &Assignment::new()));
    }

    #[test]
    fn test_rejects_out_of_domain_values() {
        let mut filter = VariableDomainFilter::new(DomainStore::uniform(3, 0i64, 10));
        let mut delta = Assignment::new();
        delta.fast_add(v(1)).set_value(11);
        assert!(!filter.accept(&delta, &Assignment::new()));
    }

    #[test]
    fn test_deactivated_elements_are_ignored() {
        let mut filter = VariableDomainFilter::new(DomainStore::uniform(3, 0i64, 10));
        let mut delta = Assignment::<i64>::new();
        let element = delta.fast_add(v(1));
        element.set_value(99);
        element.deactivate();
        assert!(filter.accept(&delta, &Assignment::new()));
    }
}
