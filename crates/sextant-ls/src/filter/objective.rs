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

//! Objective filter.
//!
//! Maintains a running objective value over per-variable contributions
//! and accepts a delta when the predicted value satisfies the configured
//! bound against the objective variable's domain (further tightened by
//! bounds the delta itself carries).
//!
//! The filter caches each variable's contribution at the reference
//! assignment (`cache`) and after the last offered incremental delta
//! (`delta_cache`). A non-empty deltadelta switches the filter into
//! incremental mode, replaying only the deltadelta on top of the
//! previous prediction; an empty deltadelta drops back to a from-scratch
//! replay of the delta against the reference caches. The driver
//! guarantees `accept` is called after every emission and `synchronize`
//! whenever the reference changes, which keeps the replay exact.

use crate::eval::{IndexEvaluator2, IndexEvaluator3};
use crate::filter::LocalSearchFilter;
use sextant_model::assignment::Assignment;
use sextant_model::domain::VarDomains;
use sextant_model::index::VarIndex;
use sextant_search::num::SolverNumeric;
use std::collections::{BTreeMap, HashMap};

/// Acceptance condition on the predicted objective value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterBound {
    /// Accept when the value is at most the objective maximum.
    Le,
    /// Accept when the value is at least the objective minimum.
    Ge,
    /// Accept when the value lies within the objective bounds.
    Eq,
}

/// Aggregation applied to the per-variable contributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LsOperationKind {
    Sum,
    Product,
    Max,
    Min,
}

/// Aggregation state; the max/min variants keep a multiset so removing
/// one occurrence of a duplicated contribution stays exact.
#[derive(Debug, Clone)]
enum LsOperation<T> {
    Sum(T),
    Product(T),
    Max(BTreeMap<T, usize>),
    Min(BTreeMap<T, usize>),
}

impl<T> LsOperation<T>
where
    T: SolverNumeric,
{
    fn new(kind: LsOperationKind) -> Self {
        let mut op = match kind {
            LsOperationKind::Sum => LsOperation::Sum(T::ZERO),
            LsOperationKind::Product => LsOperation::Product(T::PLUS_ONE),
            LsOperationKind::Max => LsOperation::Max(BTreeMap::new()),
            LsOperationKind::Min => LsOperation::Min(BTreeMap::new()),
        };
        op.init();
        op
    }

    fn init(&mut self) {
        match self {
            LsOperation::Sum(value) => *value = T::ZERO,
            LsOperation::Product(value) => *value = T::PLUS_ONE,
            LsOperation::Max(values) | LsOperation::Min(values) => values.clear(),
        }
    }

    fn update(&mut self, update: T) {
        match self {
            LsOperation::Sum(value) => *value = value.saturating_add_val(update),
            LsOperation::Product(value) => *value = *value * update,
            LsOperation::Max(values) | LsOperation::Min(values) => {
                *values.entry(update).or_insert(0) += 1;
            }
        }
    }

    fn remove(&mut self, remove: T) {
        match self {
            LsOperation::Sum(value) => *value = value.saturating_sub_val(remove),
            LsOperation::Product(value) => {
                if remove != T::ZERO {
                    *value = *value / remove;
                }
            }
            LsOperation::Max(values) | LsOperation::Min(values) => {
                if let Some(count) = values.get_mut(&remove) {
                    *count -= 1;
                    if *count == 0 {
                        values.remove(&remove);
                    }
                }
            }
        }
    }

    fn value(&self) -> T {
        match self {
            LsOperation::Sum(value) | LsOperation::Product(value) => *value,
            LsOperation::Max(values) => values
                .last_key_value()
                .map(|(&value, _)| value)
                .unwrap_or(T::ZERO),
            LsOperation::Min(values) => values
                .first_key_value()
                .map(|(&value, _)| value)
                .unwrap_or(T::ZERO),
        }
    }

    fn set_value(&mut self, new_value: T) {
        match self {
            LsOperation::Sum(value) | LsOperation::Product(value) => *value = new_value,
            // Max/min aggregation is carried by the multiset itself.
            LsOperation::Max(_) | LsOperation::Min(_) => {}
        }
    }
}

/// How a single element's contribution is evaluated.
enum ObjectiveEvaluator<T> {
    /// `f(index, value)`.
    Binary(Box<dyn IndexEvaluator2<T>>),
    /// `f(index, value, secondary_value)`.
    Ternary(Box<dyn IndexEvaluator3<T>>),
}

/// Accepts deltas whose predicted objective value satisfies the
/// configured bound.
pub struct ObjectiveFilter<T, D> {
    vars: Vec<VarIndex>,
    values: Vec<T>,
    var_to_index: HashMap<VarIndex, usize>,
    primary_vars_size: usize,
    cache: Vec<T>,
    delta_cache: Vec<T>,
    objective: VarIndex,
    bound: FilterBound,
    op: LsOperation<T>,
    old_value: T,
    old_delta_value: T,
    incremental: bool,
    domains: D,
    evaluator: ObjectiveEvaluator<T>,
}

impl<T, D> ObjectiveFilter<T, D>
where
    T: SolverNumeric,
    D: VarDomains<T>,
{
    /// Creates a filter whose contributions come from a binary
    /// evaluator.
    pub fn binary(
        vars: Vec<VarIndex>,
        evaluator: Box<dyn IndexEvaluator2<T>>,
        objective: VarIndex,
        bound: FilterBound,
        operation: LsOperationKind,
        domains: D,
    ) -> Self {
        evaluator.check_is_repeatable();
        Self::with_evaluator(vars, ObjectiveEvaluator::Binary(evaluator), objective, bound, operation, domains)
    }

    /// Creates a filter whose contributions come from a ternary
    /// evaluator reading a paired secondary variable.
    ///
    /// # Panics
    ///
    /// Panics if the secondary block has a different size than the
    /// primary one.
    pub fn ternary(
        vars: Vec<VarIndex>,
        secondary_vars: Vec<VarIndex>,
        evaluator: Box<dyn IndexEvaluator3<T>>,
        objective: VarIndex,
        bound: FilterBound,
        operation: LsOperationKind,
        domains: D,
    ) -> Self {
        assert_eq!(
            vars.len(),
            secondary_vars.len(),
            "called `ObjectiveFilter::ternary` with mismatched blocks: {} primary but {} secondary variables",
            vars.len(),
            secondary_vars.len()
        );
        evaluator.check_is_repeatable();
        let mut all_vars = vars;
        all_vars.extend(secondary_vars);
        let primary = all_vars.len() / 2;
        let mut filter = Self::with_evaluator(
            all_vars,
            ObjectiveEvaluator::Ternary(evaluator),
            objective,
            bound,
            operation,
            domains,
        );
        filter.primary_vars_size = primary;
        filter.cache.truncate(primary);
        filter.delta_cache.truncate(primary);
        filter
    }

    fn with_evaluator(
        vars: Vec<VarIndex>,
        evaluator: ObjectiveEvaluator<T>,
        objective: VarIndex,
        bound: FilterBound,
        operation: LsOperationKind,
        domains: D,
    ) -> Self {
        let size = vars.len();
        let var_to_index = vars
            .iter()
            .enumerate()
            .map(|(i, &var)| (var, i))
            .collect();
        let op = LsOperation::new(operation);
        let old_value = op.value();
        Self {
            vars,
            values: vec![T::ZERO; size],
            var_to_index,
            primary_vars_size: size,
            cache: vec![T::ZERO; size],
            delta_cache: vec![T::ZERO; size],
            objective,
            bound,
            op,
            old_value,
            old_delta_value: old_value,
            incremental: false,
            domains,
            evaluator,
        }
    }

    fn synchronized_element_value(&self, index: usize) -> T {
        match &self.evaluator {
            ObjectiveEvaluator::Binary(evaluator) => evaluator.run(index, self.values[index]),
            ObjectiveEvaluator::Ternary(evaluator) => evaluator.run(
                index,
                self.values[index],
                self.values[index + self.primary_vars_size],
            ),
        }
    }

    /// Evaluates one delta element's contribution, or `None` when the
    /// element is deactivated and its variables are not bound.
    ///
    /// The ternary arm first probes the next container position: deltas
    /// list a primary variable's element right before its secondary
    /// one, so the hint avoids a by-variable lookup on the hot path.
    fn evaluate_element_value(
        &self,
        container: &Assignment<T>,
        index: usize,
        container_index: &mut usize,
    ) -> Option<T> {
        let elements = container.int_elements();
        let element = &elements[*container_index];
        match &self.evaluator {
            ObjectiveEvaluator::Binary(evaluator) => {
                if element.activated() {
                    Some(evaluator.run(index, element.value()))
                } else if self.domains.is_bound(element.var()) {
                    Some(evaluator.run(index, self.domains.min(element.var())))
                } else {
                    None
                }
            }
            ObjectiveEvaluator::Ternary(evaluator) => {
                let secondary_var = self.vars[index + self.primary_vars_size];
                if element.activated() {
                    let value = element.value();
                    let hint_index = *container_index + 1;
                    let secondary_value = if hint_index < elements.len()
                        && elements[hint_index].var() == secondary_var
                    {
                        *container_index = hint_index;
                        elements[hint_index].value()
                    } else {
                        container
                            .element(secondary_var)
                            .unwrap_or_else(|| {
                                panic!(
                                    "delta does not contain secondary variable {}",
                                    secondary_var
                                )
                            })
                            .value()
                    };
                    Some(evaluator.run(index, value, secondary_value))
                } else if self.domains.is_bound(element.var())
                    && self.domains.is_bound(secondary_var)
                {
                    Some(evaluator.run(
                        index,
                        self.domains.min(element.var()),
                        self.domains.min(secondary_var),
                    ))
                } else {
                    None
                }
            }
        }
    }

    fn evaluate(
        &mut self,
        container: &Assignment<T>,
        current_value: T,
        from_delta_cache: bool,
        cache_delta_values: bool,
    ) -> T {
        if current_value == T::max_value() {
            return current_value;
        }
        self.op.set_value(current_value);
        let size = container.num_int_elements();
        let mut i = 0;
        while i < size {
            let var = container.element_at(i).var();
            if let Some(&index) = self.var_to_index.get(&var) {
                if index < self.primary_vars_size {
                    let out_value = if from_delta_cache {
                        self.delta_cache[index]
                    } else {
                        self.cache[index]
                    };
                    self.op.remove(out_value);
                    if let Some(obj_value) = self.evaluate_element_value(container, index, &mut i)
                    {
                        self.op.update(obj_value);
                        if cache_delta_values {
                            self.delta_cache[index] = obj_value;
                        }
                    }
                }
            }
            i += 1;
        }
        self.op.value()
    }

    fn on_synchronize(&mut self) {
        self.op.init();
        for i in 0..self.primary_vars_size {
            let obj_value = self.synchronized_element_value(i);
            self.cache[i] = obj_value;
            self.delta_cache[i] = obj_value;
            self.op.update(obj_value);
        }
        self.old_value = self.op.value();
        self.old_delta_value = self.old_value;
        self.incremental = false;
    }
}

impl<T, D> LocalSearchFilter<T> for ObjectiveFilter<T, D>
where
    T: SolverNumeric,
    D: VarDomains<T>,
{
    fn name(&self) -> &str {
        "ObjectiveFilter"
    }

    fn synchronize(&mut self, assignment: &Assignment<T>) {
        for (i, element) in assignment.int_elements().iter().enumerate() {
            let var = element.var();
            if i < self.vars.len() && self.vars[i] == var {
                self.values[i] = element.value();
            } else if let Some(&index) = self.var_to_index.get(&var) {
                self.values[index] = element.value();
            }
        }
        self.on_synchronize();
    }

    fn accept(&mut self, delta: &Assignment<T>, deltadelta: &Assignment<T>) -> bool {
        let value;
        if !deltadelta.is_empty() {
            if !self.incremental {
                value = self.evaluate(delta, self.old_value, false, true);
            } else {
                value = self.evaluate(deltadelta, self.old_delta_value, true, true);
            }
            self.incremental = true;
        } else {
            if self.incremental {
                // Falling out of incremental mode: reset the delta view
                // to the reference before the from-scratch replay.
                self.delta_cache.copy_from_slice(&self.cache);
                self.old_delta_value = self.old_value;
            }
            self.incremental = false;
            value = self.evaluate(delta, self.old_value, false, false);
        }
        self.old_delta_value = value;

        let mut var_min = self.domains.min(self.objective);
        let mut var_max = self.domains.max(self.objective);
        if delta.objective() == Some(self.objective) {
            if let Some(min) = delta.objective_min() {
                var_min = var_min.max(min);
            }
            if let Some(max) = delta.objective_max() {
                var_max = var_max.min(max);
            }
        }
        match self.bound {
            FilterBound::Le => value <= var_max,
            FilterBound::Ge => value >= var_min,
            FilterBound::Eq => value <= var_max && value >= var_min,
        }
    }

    fn is_incremental(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sextant_model::domain::DomainStore;

    #[inline]
    fn v(n: usize) -> VarIndex {
        VarIndex::new(n)
    }

    fn reference(values: &[i64]) -> Assignment<i64> {
        let mut a = Assignment::new();
        for (i, &value) in values.iter().enumerate() {
            a.add(v(i), value);
        }
        a
    }

    fn sum_filter(
        num_vars: usize,
        objective_max: i64,
    ) -> ObjectiveFilter<i64, DomainStore<i64>> {
        // One extra variable slot serves as the objective variable.
        let domains = DomainStore::uniform(num_vars + 1, 0i64, objective_max);
        ObjectiveFilter::binary(
            (0..num_vars).map(v).collect(),
            Box::new(|_, value: i64| value),
            v(num_vars),
            FilterBound::Le,
            LsOperationKind::Sum,
            domains,
        )
    }

    #[test]
    fn test_sum_filter_accepts_and_rejects_on_bound() {
        // values [3, 5, 2], bound max = 10: setting index 1 to 4
        // predicts 9 (accept); setting it to 8 predicts 13 (reject).
        let mut filter = sum_filter(3, 10);
        filter.synchronize(&reference(&[3, 5, 2]));

        let empty = Assignment::new();
        let mut delta = Assignment::new();
        delta.fast_add(v(1)).set_value(4);
        assert!(filter.accept(&delta, &empty));

        let mut delta = Assignment::new();
        delta.fast_add(v(1)).set_value(8);
        assert!(!filter.accept(&delta, &empty));
    }

    #[test]
    fn test_incremental_replay_matches_from_scratch() {
        let mut filter = sum_filter(3, 1000);
        filter.synchronize(&reference(&[3, 5, 2]));
        let empty = Assignment::new();

        // First incremental emission: delta == deltadelta.
        let mut delta1 = Assignment::new();
        delta1.fast_add(v(0)).set_value(10);
        assert!(filter.accept(&delta1, &delta1.clone()));

        // Second emission extends the first: deltadelta only carries
        // the new change.
        let mut delta2 = Assignment::new();
        delta2.fast_add(v(0)).set_value(10);
        delta2.fast_add(v(1)).set_value(20);
        let mut dd2 = Assignment::new();
        dd2.fast_add(v(1)).set_value(20);
        assert!(filter.accept(&delta2, &dd2));
        // 10 + 20 + 2 = 32.
        assert_eq!(filter.old_delta_value, 32);

        // Dropping out of incremental mode replays from scratch and
        // must agree with a direct computation.
        let mut delta3 = Assignment::new();
        delta3.fast_add(v(2)).set_value(7);
        assert!(filter.accept(&delta3, &empty));
        // 3 + 5 + 7 = 15.
        assert_eq!(filter.old_delta_value, 15);
    }

    #[test]
    fn test_empty_delta_predicts_reference_value() {
        let mut filter = sum_filter(3, 100);
        filter.synchronize(&reference(&[3, 5, 2]));
        let empty = Assignment::new();
        assert!(filter.accept(&empty, &empty));
        assert_eq!(filter.old_delta_value, 10);
    }

    #[test]
    fn test_delta_objective_bounds_tighten_acceptance() {
        let mut filter = sum_filter(3, 10);
        filter.synchronize(&reference(&[3, 5, 2]));
        let empty = Assignment::new();

        // Predicted value 9 is fine against the domain bound 10 but not
        // against the delta's own bound of 8.
        let mut delta = Assignment::new();
        delta.fast_add(v(1)).set_value(4);
        delta.set_objective(v(3));
        delta.set_objective_max(8);
        assert!(!filter.accept(&delta, &empty));
    }

    #[test]
    fn test_deactivated_element_uses_bound_domain_value() {
        // Variable 1 is bound to 5 in its domain; deactivating it keeps
        // the contribution at the domain value.
        let domains = DomainStore::from_intervals(vec![
            (0i64, 100),
            (5, 5),
            (0, 100),
            (0, 100),
        ])
        .unwrap();
        let mut filter = ObjectiveFilter::binary(
            (0..3).map(v).collect(),
            Box::new(|_, value: i64| value),
            v(3),
            FilterBound::Le,
            LsOperationKind::Sum,
            domains,
        );
        filter.synchronize(&reference(&[3, 5, 2]));
        let empty = Assignment::new();
        let mut delta = Assignment::<i64>::new();
        delta.fast_add(v(1)).deactivate();
        assert!(filter.accept(&delta, &empty));
        assert_eq!(filter.old_delta_value, 10);
    }

    #[test]
    fn test_max_aggregation_tracks_duplicates() {
        let domains = DomainStore::uniform(4, 0i64, 100);
        let mut filter = ObjectiveFilter::binary(
            (0..3).map(v).collect(),
            Box::new(|_, value: i64| value),
            v(3),
            FilterBound::Le,
            LsOperationKind::Max,
            domains,
        );
        // Two variables share the maximum; lowering one keeps it.
        filter.synchronize(&reference(&[7, 7, 2]));
        let empty = Assignment::new();
        let mut delta = Assignment::new();
        delta.fast_add(v(0)).set_value(1);
        assert!(filter.accept(&delta, &empty));
        assert_eq!(filter.old_delta_value, 7);
    }

    #[test]
    fn test_product_aggregation() {
        let domains = DomainStore::uniform(4, 0i64, 1000);
        let mut filter = ObjectiveFilter::binary(
            (0..3).map(v).collect(),
            Box::new(|_, value: i64| value),
            v(3),
            FilterBound::Le,
            LsOperationKind::Product,
            domains,
        );
        filter.synchronize(&reference(&[2, 3, 4]));
        let empty = Assignment::new();
        let mut delta = Assignment::new();
        delta.fast_add(v(1)).set_value(5);
        assert!(filter.accept(&delta, &empty));
        // 2 * 5 * 4 = 40.
        assert_eq!(filter.old_delta_value, 40);
    }

    #[test]
    fn test_ternary_filter_uses_container_hint() {
        // Primary vars 0..2, secondary vars 2..4; contribution is
        // value * secondary value.
        let domains = DomainStore::uniform(5, 0i64, 1000);
        let mut filter = ObjectiveFilter::ternary(
            (0..2).map(v).collect(),
            (2..4).map(v).collect(),
            Box::new(|_, value: i64, secondary: i64| value * secondary),
            v(4),
            FilterBound::Le,
            LsOperationKind::Sum,
            domains,
        );
        // Reference: v0=2, v1=3, v2=10, v3=100 -> 2*10 + 3*100 = 320.
        filter.synchronize(&reference(&[2, 3, 10, 100]));
        let empty = Assignment::new();

        // Delta listing the secondary element right after the primary
        // one exercises the one-step hint.
        let mut delta = Assignment::new();
        delta.fast_add(v(0)).set_value(4);
        delta.fast_add(v(2)).set_value(20);
        assert!(filter.accept(&delta, &empty));
        // 4*20 + 3*100 = 380.
        assert_eq!(filter.old_delta_value, 380);
    }

    #[test]
    #[should_panic(expected = "does not contain secondary variable")]
    fn test_ternary_filter_requires_secondary_in_delta() {
        let domains = DomainStore::uniform(5, 0i64, 1000);
        let mut filter = ObjectiveFilter::ternary(
            (0..2).map(v).collect(),
            (2..4).map(v).collect(),
            Box::new(|_, value: i64, secondary: i64| value * secondary),
            v(4),
            FilterBound::Le,
            LsOperationKind::Sum,
            domains,
        );
        filter.synchronize(&reference(&[2, 3, 10, 100]));
        let empty = Assignment::new();
        let mut delta = Assignment::new();
        delta.fast_add(v(0)).set_value(4);
        let _ = filter.accept(&delta, &empty);
    }

    #[test]
    fn test_ge_and_eq_bounds() {
        let domains = DomainStore::uniform(3, 0i64, 10);
        let mut ge = ObjectiveFilter::binary(
            (0..2).map(v).collect(),
            Box::new(|_, value: i64| value),
            v(2),
            FilterBound::Ge,
            LsOperationKind::Sum,
            domains.clone(),
        );
        ge.synchronize(&reference(&[3, 4]));
        let empty = Assignment::new();
        let mut lowering = Assignment::new();
        lowering.fast_add(v(0)).set_value(-5);
        // -5 + 4 = -1 falls below the domain minimum 0.
        assert!(!ge.accept(&lowering, &empty));

        let mut eq = ObjectiveFilter::binary(
            (0..2).map(v).collect(),
            Box::new(|_, value: i64| value),
            v(2),
            FilterBound::Eq,
            LsOperationKind::Sum,
            domains,
        );
        eq.synchronize(&reference(&[3, 4]));
        let mut inside = Assignment::new();
        inside.fast_add(v(0)).set_value(5);
        // 5 + 4 = 9 lies in [0, 10].
        assert!(eq.accept(&inside, &empty));
    }
}
