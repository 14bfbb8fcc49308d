// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! A parser, syntax tree and printer for a subset of Go.
//!
//! # Overview
//!
//! - **Parsing**: [`parse_source`] turns text into a [`SourceFile`]. Syntax
//!   errors are fatal and carry the line and column of the failure.
//! - **Traversal**: the [`visitor`] module walks the tree, reporting each
//!   identifier with its [`IdentRole`] and each lexical scope boundary.
//! - **Printing**: [`codegen::render`] prints a (possibly renamed) tree.
//!
//! # Quick Start
//!
//! ```
//! use tugscope_cst::{codegen, parse_source};
//! use tugscope_core::types::SourceId;
//!
//! let source = "func hello() {\n\tprintln(\"world\")\n}";
//! let file = parse_source(source, SourceId(0)).expect("parse error");
//! assert_eq!(codegen::render(&file).unwrap(), source);
//! ```

mod nodes;
pub use nodes::*;

pub mod codegen;
pub mod parser;
pub use parser::ParseError;

pub mod visitor;
pub use visitor::{Transformer, VisitResult, Visitor};

use tugscope_core::text::LineIndex;
use tugscope_core::types::SourceId;

/// Parse `text` as the source identified by `source`.
pub fn parse_source(text: &str, source: SourceId) -> Result<SourceFile, ParseError> {
    let ids = NodeIdGen::new();
    let body = parser::parse_file_body(text, &ids)?;
    tracing::trace!(%source, items = body.items.len(), "parsed source");
    Ok(SourceFile {
        source_id: source,
        text: text.to_string(),
        line_index: LineIndex::new(text),
        package: body.package,
        imports: body.imports,
        items: body.items,
        span: body.span,
    })
}
