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

//! # Sextant Model
//!
//! **The data interchange layer of the Sextant local search engine.**
//!
//! This crate defines the structures exchanged between the local search
//! engine and the surrounding constraint solver:
//!
//! * **`index`**: The strongly-typed `VarIndex` identifying decision
//!   variables across assignments, operators and filters.
//! * **`assignment`**: The `Assignment` container of integer and sequence
//!   elements, with the fast-append path used for delta construction and
//!   the intersection copy used to apply deltas.
//! * **`domain`**: The `VarDomains` oracle through which filters consult
//!   variable domains, plus a concrete interval-based `DomainStore`.
//!
//! ## Design Philosophy
//!
//! 1. **Type Safety**: Variable indices are a distinct type; positions in
//!    a container and variable identities cannot be confused.
//! 2. **Deltas are assignments**: A candidate change is expressed as a
//!    (usually small) `Assignment` over the touched variables only, so the
//!    same container type serves references, deltas and deltadeltas.
//! 3. **Fail-Fast**: Builders validate eagerly; the engine never sees an
//!    inconsistent container.

pub mod assignment;
pub mod domain;
pub mod index;
