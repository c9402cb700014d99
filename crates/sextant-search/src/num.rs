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

//! Numeric trait alias for solver values.

use sextant_core::num::{
    constants::{MinusOne, PlusOne, Zero},
    ops::{
        CheckedAddVal, CheckedDivVal, CheckedMulVal, CheckedSubVal, SaturatingAddVal,
        SaturatingMulVal, SaturatingNegVal, SaturatingSubVal,
    },
};

use num_traits::{FromPrimitive, PrimInt, Signed};

/// A trait alias for numeric types usable as solver values.
///
/// This covers signed integer types that support the constant and
/// by-value arithmetic traits from `sextant-core`, with both saturating
/// and checked semantics. In practice this is `i64`; `i128` is
/// intentionally excluded for performance reasons, as it is significantly
/// slower on many platforms.
pub trait SolverNumeric:
    PrimInt
    + Signed
    + FromPrimitive
    + From<i64>
    + std::fmt::Debug
    + std::fmt::Display
    + MinusOne
    + PlusOne
    + Zero
    + SaturatingAddVal
    + SaturatingSubVal
    + SaturatingMulVal
    + SaturatingNegVal
    + CheckedAddVal
    + CheckedSubVal
    + CheckedMulVal
    + CheckedDivVal
    + Send
    + Sync
{
}

impl<T> SolverNumeric for T where
    T: PrimInt
        + Signed
        + FromPrimitive
        + From<i64>
        + std::fmt::Debug
        + std::fmt::Display
        + MinusOne
        + PlusOne
        + Zero
        + SaturatingAddVal
        + SaturatingSubVal
        + SaturatingMulVal
        + SaturatingNegVal
        + CheckedAddVal
        + CheckedSubVal
        + CheckedMulVal
        + CheckedDivVal
        + Send
        + Sync
{
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_solver_numeric<T: SolverNumeric>() {}

    #[test]
    fn test_i64_is_solver_numeric() {
        assert_solver_numeric::<i64>();
    }

    #[test]
    fn test_generic_sentinel_round_trip() {
        fn no_path<T: SolverNumeric>() -> T {
            T::MINUS_ONE
        }
        let sentinel: i64 = no_path();
        assert_eq!(sentinel, -1);
    }
}
