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

//! Index evaluator callbacks.
//!
//! Filters and evaluator-driven operators read problem costs through
//! these function-object interfaces. A binary evaluator maps a variable
//! index and a value to a cost contribution; a ternary evaluator also
//! receives a secondary value (for path operators, the path identifier).
//!
//! Both traits are blanket-implemented for plain closures, so call sites
//! can pass `|i, v| ...` directly. Evaluators must be *repeatable*:
//! calling them twice with the same arguments must return the same value,
//! since the objective filter replays contributions incrementally. The
//! `check_is_repeatable` hook is invoked once at construction; stateful
//! implementations that cannot guarantee repeatability should panic there.

/// A binary cost evaluator: `(index, value) -> cost`.
pub trait IndexEvaluator2<T> {
    /// Evaluates the contribution of assigning `value` at `index`.
    fn run(&self, index: usize, value: T) -> T;

    /// Called once when the evaluator is installed. Implementations that
    /// are not repeatable must panic here.
    fn check_is_repeatable(&self) {}
}

impl<T, F> IndexEvaluator2<T> for F
where
    F: Fn(usize, T) -> T,
{
    #[inline(always)]
    fn run(&self, index: usize, value: T) -> T {
        self(index, value)
    }
}

/// A ternary cost evaluator: `(index, value, secondary) -> cost`.
pub trait IndexEvaluator3<T> {
    /// Evaluates the contribution of assigning `value` at `index` given
    /// the `secondary` value.
    fn run(&self, index: usize, value: T, secondary: T) -> T;

    /// Called once when the evaluator is installed. Implementations that
    /// are not repeatable must panic here.
    fn check_is_repeatable(&self) {}
}

impl<T, F> IndexEvaluator3<T> for F
where
    F: Fn(usize, T, T) -> T,
{
    #[inline(always)]
    fn run(&self, index: usize, value: T, secondary: T) -> T {
        self(index, value, secondary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closures_are_evaluators() {
        let binary = |i: usize, v: i64| (i as i64) * 10 + v;
        binary.check_is_repeatable();
        assert_eq!(binary.run(2, 3), 23);

        let ternary = |i: usize, v: i64, w: i64| (i as i64) + v * w;
        ternary.check_is_repeatable();
        assert_eq!(ternary.run(1, 2, 3), 7);
    }
}
