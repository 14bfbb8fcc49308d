// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Visitor and transformer infrastructure for tree traversal.
//!
//! # Traversal Order
//!
//! - **Depth-first, pre-order** for `visit_*` methods
//! - **Post-order** for `leave_*` methods
//! - Children are visited in source order; declared names before their
//!   types, types before initializers
//!
//! # Visitor Pattern
//!
//! The [`Visitor`] trait provides read-only traversal. Identifier roles and
//! scope boundaries are decided once, in the walk functions, so the scope
//! builder and the rename pass cannot disagree about them.
//!
//! # Transformer Pattern
//!
//! The [`Transformer`] trait rewrites identifiers in place through
//! [`transform_source_file`]. Any `FnMut(&mut Ident)` closure is a
//! transformer:
//!
//! ```
//! use tugscope_cst::visitor::transform_source_file;
//! use tugscope_cst::{parse_source, Ident};
//! use tugscope_core::types::SourceId;
//!
//! let mut file = parse_source("a := 1\na++", SourceId(0)).unwrap();
//! let mut count = 0;
//! transform_source_file(&mut |ident: &mut Ident| {
//!     ident.name.make_ascii_uppercase();
//!     count += 1;
//! }, &mut file);
//! assert_eq!(count, 2);
//! ```

mod dispatch;
mod traits;
mod transform;

pub use dispatch::*;
pub use traits::{Transformer, VisitResult, Visitor};
pub use transform::transform_source_file;
