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

//! # Sextant Core
//!
//! Foundational utilities for the Sextant local search ecosystem. This
//! crate consolidates small, reusable building blocks that underpin the
//! model and engine crates without pulling in any dependencies of its own.
//!
//! ## Modules
//!
//! - `num`: Integer-centric utilities, including associated-constant traits
//!   (`MinusOne`, `Zero`, `PlusOne`) and by-value arithmetic traits for
//!   checked (`Option<T>`) and saturating operations.
//! - `utils`: Phantom-tagged, strongly typed indices (`TypedIndex<T>`) that
//!   prevent mixing indices from different domains at zero runtime cost.
//!
//! These primitives keep the higher-level crates generic over the numeric
//! value type while avoiding accidental bugs such as index mixing or silent
//! overflow in objective aggregation.

pub mod num;
pub mod utils;
