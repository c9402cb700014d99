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

//! # Sextant Local Search
//!
//! The local search engine of the Sextant constraint-solving stack. Given
//! a feasible reference assignment, the engine explores neighborhoods of
//! that assignment by applying local moves (*operators*), evaluates each
//! candidate cheaply through a stack of *filters*, and commits moves that
//! the surrounding solver accepts.
//!
//! ## Architecture
//!
//! * **`operator`**: The operator contract and its two state bases (plain
//!   variable tracking and the `next[]` path view), the concrete
//!   neighborhoods (2-opt, relocate, exchange, cross, the active family,
//!   TSP-based moves, Lin-Kernighan, the LNS family, scalar moves), the
//!   combinators, and the catalogue factory.
//! * **`filter`**: Cheap delta acceptance — the variable-domain filter and
//!   the incremental objective filter.
//! * **`pool`**: The pluggable source of reference assignments.
//! * **`engine`**: The exploration driver stitching operators, filters,
//!   pool, limits and the commit delegate together.
//! * **`monitor`**: Lifecycle observability with zero hot-loop cost when
//!   unused.
//!
//! Operators and filters communicate through *deltas*: small assignments
//! describing a candidate change relative to the reference, optionally
//! accompanied by a *deltadelta* relative to the previously emitted
//! neighbor. See `operator::state` for the exact protocol.

pub mod engine;
pub mod eval;
pub mod filter;
pub mod monitor;
pub mod operator;
pub mod pool;
pub mod result;
pub mod stats;
