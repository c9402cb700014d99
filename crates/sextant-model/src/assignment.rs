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

//! Assignment containers.
//!
//! An `Assignment` is an ordered collection of `(variable, value,
//! activated)` elements, plus an optional container of sequence elements
//! carrying forward/backward orderings. The same type serves three roles
//! in the engine: the *reference* assignment operators are started on,
//! the *delta* describing a candidate change relative to the reference,
//! and the *deltadelta* describing the change relative to the previously
//! emitted delta.
//!
//! The container supports positional access (the order elements were
//! added) and lookup by variable. `fast_add` is the hot-path append used
//! during delta construction; it assumes the variable is not yet present.
//! `copy_from` overwrites the intersection of two assignments, which is
//! exactly the operation needed to apply a delta on top of a reference
//! copy.

use crate::index::VarIndex;
use sextant_core::num::constants::Zero;
use std::collections::HashMap;

/// A single integer element of an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntVarElement<T> {
    var: VarIndex,
    value: T,
    activated: bool,
}

impl<T> IntVarElement<T>
where
    T: Copy,
{
    /// Creates a new activated element with the given value.
    #[inline]
    pub fn new(var: VarIndex, value: T) -> Self {
        Self {
            var,
            value,
            activated: true,
        }
    }

    /// Returns the variable this element assigns.
    #[inline(always)]
    pub fn var(&self) -> VarIndex {
        self.var
    }

    /// Returns the assigned value.
    #[inline(always)]
    pub fn value(&self) -> T {
        self.value
    }

    /// Sets the assigned value.
    #[inline(always)]
    pub fn set_value(&mut self, value: T) {
        self.value = value;
    }

    /// Returns whether the element is activated.
    #[inline(always)]
    pub fn activated(&self) -> bool {
        self.activated
    }

    /// Activates the element.
    #[inline(always)]
    pub fn activate(&mut self) {
        self.activated = true;
    }

    /// Deactivates the element.
    #[inline(always)]
    pub fn deactivate(&mut self) {
        self.activated = false;
    }
}

/// A single sequence element of an assignment.
///
/// The forward sequence is the primary ordering; the backward sequence is
/// auxiliary data some operators maintain alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeqVarElement {
    var: VarIndex,
    forward: Vec<usize>,
    backward: Vec<usize>,
    activated: bool,
}

impl SeqVarElement {
    /// Creates a new activated element with empty sequences.
    #[inline]
    pub fn new(var: VarIndex) -> Self {
        Self {
            var,
            forward: Vec::new(),
            backward: Vec::new(),
            activated: true,
        }
    }

    /// Returns the variable this element assigns.
    #[inline(always)]
    pub fn var(&self) -> VarIndex {
        self.var
    }

    /// Returns the forward sequence.
    #[inline(always)]
    pub fn forward_sequence(&self) -> &[usize] {
        &self.forward
    }

    /// Returns the backward sequence.
    #[inline(always)]
    pub fn backward_sequence(&self) -> &[usize] {
        &self.backward
    }

    /// Replaces the forward sequence.
    #[inline]
    pub fn set_forward_sequence(&mut self, sequence: Vec<usize>) {
        self.forward = sequence;
    }

    /// Replaces the backward sequence.
    #[inline]
    pub fn set_backward_sequence(&mut self, sequence: Vec<usize>) {
        self.backward = sequence;
    }

    /// Returns whether the element is activated.
    #[inline(always)]
    pub fn activated(&self) -> bool {
        self.activated
    }

    /// Activates the element.
    #[inline(always)]
    pub fn activate(&mut self) {
        self.activated = true;
    }

    /// Deactivates the element.
    #[inline(always)]
    pub fn deactivate(&mut self) {
        self.activated = false;
    }
}

/// An ordered container of variable assignments.
///
/// Elements keep their insertion order; lookup by variable is O(1) through
/// an internal index map.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment<T> {
    int_elements: Vec<IntVarElement<T>>,
    int_index: HashMap<VarIndex, usize>,
    seq_elements: Vec<SeqVarElement>,
    seq_index: HashMap<VarIndex, usize>,
    objective: Option<VarIndex>,
    objective_min: Option<T>,
    objective_max: Option<T>,
}

impl<T> Default for Assignment<T>
where
    T: Copy,
{
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Assignment<T>
where
    T: Copy,
{
    /// Creates an empty assignment.
    #[inline]
    pub fn new() -> Self {
        Self {
            int_elements: Vec::new(),
            int_index: HashMap::new(),
            seq_elements: Vec::new(),
            seq_index: HashMap::new(),
            objective: None,
            objective_min: None,
            objective_max: None,
        }
    }

    /// Creates an empty assignment with preallocated capacity for
    /// `capacity` integer elements.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            int_elements: Vec::with_capacity(capacity),
            int_index: HashMap::with_capacity(capacity),
            seq_elements: Vec::new(),
            seq_index: HashMap::new(),
            objective: None,
            objective_min: None,
            objective_max: None,
        }
    }

    /// Adds a new integer element for `var` with the given value.
    ///
    /// # Panics
    ///
    /// Panics if `var` is already present.
    pub fn add(&mut self, var: VarIndex, value: T) -> &mut IntVarElement<T> {
        assert!(
            !self.int_index.contains_key(&var),
            "called `Assignment::add` with a variable that is already present: {}",
            var
        );
        let position = self.int_elements.len();
        self.int_index.insert(var, position);
        self.int_elements.push(IntVarElement::new(var, value));
        &mut self.int_elements[position]
    }

    /// Appends an element for `var`, assuming it is not present yet.
    ///
    /// This is the hot-path append used during delta construction; the
    /// presence check only runs in debug builds.
    #[inline]
    pub fn fast_add(&mut self, var: VarIndex) -> &mut IntVarElement<T>
    where
        T: Zero,
    {
        debug_assert!(
            !self.int_index.contains_key(&var),
            "called `Assignment::fast_add` with a variable that is already present: {}",
            var
        );
        let position = self.int_elements.len();
        self.int_index.insert(var, position);
        self.int_elements.push(IntVarElement::new(var, T::ZERO));
        &mut self.int_elements[position]
    }

    /// Appends a sequence element for `var`, assuming it is not present
    /// yet.
    #[inline]
    pub fn fast_add_sequence(&mut self, var: VarIndex) -> &mut SeqVarElement {
        debug_assert!(
            !self.seq_index.contains_key(&var),
            "called `Assignment::fast_add_sequence` with a variable that is already present: {}",
            var
        );
        let position = self.seq_elements.len();
        self.seq_index.insert(var, position);
        self.seq_elements.push(SeqVarElement::new(var));
        &mut self.seq_elements[position]
    }

    /// Returns whether the integer container holds `var`.
    #[inline(always)]
    pub fn contains(&self, var: VarIndex) -> bool {
        self.int_index.contains_key(&var)
    }

    /// Looks up the integer element assigned to `var`.
    #[inline]
    pub fn element(&self, var: VarIndex) -> Option<&IntVarElement<T>> {
        self.int_index.get(&var).map(|&i| &self.int_elements[i])
    }

    /// Looks up the integer element assigned to `var`, mutably.
    #[inline]
    pub fn element_mut(&mut self, var: VarIndex) -> Option<&mut IntVarElement<T>> {
        match self.int_index.get(&var) {
            Some(&i) => Some(&mut self.int_elements[i]),
            None => None,
        }
    }

    /// Positional access into the integer container.
    #[inline(always)]
    pub fn element_at(&self, position: usize) -> &IntVarElement<T> {
        &self.int_elements[position]
    }

    /// Returns the integer elements in insertion order.
    #[inline(always)]
    pub fn int_elements(&self) -> &[IntVarElement<T>] {
        &self.int_elements
    }

    /// Looks up the sequence element assigned to `var`.
    #[inline]
    pub fn sequence_element(&self, var: VarIndex) -> Option<&SeqVarElement> {
        self.seq_index.get(&var).map(|&i| &self.seq_elements[i])
    }

    /// Returns the sequence elements in insertion order.
    #[inline(always)]
    pub fn seq_elements(&self) -> &[SeqVarElement] {
        &self.seq_elements
    }

    /// Returns the number of integer elements.
    #[inline(always)]
    pub fn num_int_elements(&self) -> usize {
        self.int_elements.len()
    }

    /// Returns `true` if both containers are empty.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.int_elements.is_empty() && self.seq_elements.is_empty()
    }

    /// Removes all elements and objective information.
    pub fn clear(&mut self) {
        self.int_elements.clear();
        self.int_index.clear();
        self.seq_elements.clear();
        self.seq_index.clear();
        self.objective = None;
        self.objective_min = None;
        self.objective_max = None;
    }

    /// Copies the intersection of `other` into `self`.
    ///
    /// Every element of `other` whose variable is present in `self`
    /// overwrites the local element; variables absent from `self` are
    /// ignored. Applying a delta on top of a reference copy is exactly
    /// this operation. Objective information is taken from `other` when
    /// set.
    pub fn copy_from(&mut self, other: &Assignment<T>) {
        for element in &other.int_elements {
            if let Some(&i) = self.int_index.get(&element.var()) {
                self.int_elements[i] = *element;
            }
        }
        for element in &other.seq_elements {
            if let Some(&i) = self.seq_index.get(&element.var()) {
                self.seq_elements[i] = element.clone();
            }
        }
        if other.objective.is_some() {
            self.objective = other.objective;
            self.objective_min = other.objective_min;
            self.objective_max = other.objective_max;
        }
    }

    /// Declares `var` as the objective variable of this assignment.
    #[inline]
    pub fn set_objective(&mut self, var: VarIndex) {
        self.objective = Some(var);
    }

    /// Returns the objective variable, if declared.
    #[inline(always)]
    pub fn objective(&self) -> Option<VarIndex> {
        self.objective
    }

    /// Tightens the lower objective bound carried by this assignment.
    #[inline]
    pub fn set_objective_min(&mut self, min: T) {
        self.objective_min = Some(min);
    }

    /// Tightens the upper objective bound carried by this assignment.
    #[inline]
    pub fn set_objective_max(&mut self, max: T) {
        self.objective_max = Some(max);
    }

    /// Returns the lower objective bound, if set.
    #[inline(always)]
    pub fn objective_min(&self) -> Option<T> {
        self.objective_min
    }

    /// Returns the upper objective bound, if set.
    #[inline(always)]
    pub fn objective_max(&self) -> Option<T> {
        self.objective_max
    }
}

impl<T> std::fmt::Display for Assignment<T>
where
    T: Copy + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Assignment(")?;
        for (i, element) in self.int_elements.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if element.activated() {
                write!(f, "{} = {}", element.var(), element.value())?;
            } else {
                write!(f, "{} deactivated", element.var())?;
            }
        }
        write!(f, ")")
    }
}
