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

//! # Integer Constant Traits
//!
//! Compile-time constants for common numeric sentinel values across the
//! signed integer types. These traits provide a uniform way to access
//! `-1`, `0` and `+1` as associated constants, so generic code can use
//! sentinel values (such as the no-path marker of the path operators)
//! without littering call sites with type-specific literals.
//!
//! ## Usage
//!
//! ```rust
//! use sextant_core::num::constants::{MinusOne, PlusOne, Zero};
//!
//! fn is_unassigned<T: MinusOne + PartialEq>(x: T) -> bool {
//!     x == T::MINUS_ONE
//! }
//!
//! fn successor<T: PlusOne + core::ops::Add<Output = T>>(x: T) -> T {
//!     x + T::PLUS_ONE
//! }
//!
//! assert!(is_unassigned(-1i64));
//! assert_eq!(successor(41i32), 42);
//! assert_eq!(i16::ZERO, 0);
//! ```

/// A trait for integer types that have a constant representing -1.
pub trait MinusOne {
    /// The constant representing -1 for the implementing type.
    const MINUS_ONE: Self;
}

/// A trait for integer types that have a constant representing 0.
pub trait Zero {
    /// The constant representing 0 for the implementing type.
    const ZERO: Self;
}

/// A trait for integer types that have a constant representing +1.
pub trait PlusOne {
    /// The constant representing +1 for the implementing type.
    const PLUS_ONE: Self;
}

macro_rules! impl_signed_constants {
    ($($t:ty),*) => {
        $(
            impl MinusOne for $t {
                const MINUS_ONE: Self = -1;
            }
            impl Zero for $t {
                const ZERO: Self = 0;
            }
            impl PlusOne for $t {
                const PLUS_ONE: Self = 1;
            }
        )*
    };
}

impl_signed_constants!(i8, i16, i32, i64, i128, isize);

macro_rules! impl_unsigned_constants {
    ($($t:ty),*) => {
        $(
            impl Zero for $t {
                const ZERO: Self = 0;
            }
            impl PlusOne for $t {
                const PLUS_ONE: Self = 1;
            }
        )*
    };
}

impl_unsigned_constants!(u8, u16, u32, u64, u128, usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_constants() {
        assert_eq!(i8::MINUS_ONE, -1);
        assert_eq!(i64::MINUS_ONE, -1);
        assert_eq!(isize::MINUS_ONE, -1);
        assert_eq!(i32::ZERO, 0);
        assert_eq!(i64::PLUS_ONE, 1);
    }

    #[test]
    fn test_unsigned_constants() {
        assert_eq!(u8::ZERO, 0);
        assert_eq!(u64::PLUS_ONE, 1);
        assert_eq!(usize::ZERO, 0);
    }

    #[test]
    fn test_generic_sentinel_use() {
        fn sentinel<T: MinusOne>() -> T {
            T::MINUS_ONE
        }
        let s: i64 = sentinel();
        assert_eq!(s, -1);
    }
}
