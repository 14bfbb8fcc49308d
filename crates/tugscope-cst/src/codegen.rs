// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Printing a tree back to text.
//!
//! The tree keeps the text it was parsed from, so printing is a splice:
//! every identifier whose current name differs from the text under its
//! original span becomes a [`SpanEdit`], and the edits are applied to the
//! original text. An unmodified tree prints byte-for-byte identical to its
//! input, comments and whitespace included.

use tugscope_core::patch::{apply_edits, EditError, SpanEdit};

use crate::nodes::{Ident, IdentRole, SourceFile};
use crate::visitor::{walk_source_file, VisitResult, Visitor};

/// Collects one edit per renamed identifier.
struct EditCollector<'a> {
    text: &'a str,
    edits: Vec<SpanEdit>,
}

impl Visitor for EditCollector<'_> {
    fn visit_ident(&mut self, ident: &Ident, _role: IdentRole) -> VisitResult {
        if ident.span.slice(self.text) != Some(ident.name.as_str()) {
            self.edits.push(SpanEdit::new(ident.span, ident.name.clone()));
        }
        VisitResult::Continue
    }
}

/// Spans whose identifier text has changed since parsing.
pub fn pending_edits(file: &SourceFile) -> Vec<SpanEdit> {
    let mut collector = EditCollector {
        text: &file.text,
        edits: Vec::new(),
    };
    walk_source_file(&mut collector, file);
    collector.edits
}

/// Render `file` to source text.
pub fn render(file: &SourceFile) -> Result<String, EditError> {
    let edits = pending_edits(file);
    if edits.is_empty() {
        return Ok(file.text.clone());
    }
    tracing::trace!(edits = edits.len(), "rendering modified tree");
    apply_edits(&file.text, edits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_source;
    use crate::visitor::transform_source_file;
    use tugscope_core::types::SourceId;

    #[test]
    fn unmodified_tree_round_trips() {
        let text = "package main\n\n// Do things.\nfunc Do(fld int) {\n\tfld += 5 /* five */\n}\n";
        let file = parse_source(text, SourceId(0)).unwrap();
        assert!(pending_edits(&file).is_empty());
        assert_eq!(render(&file).unwrap(), text);
    }

    #[test]
    fn renamed_identifiers_are_spliced() {
        let text = "{\n  a := 0\n  a++ // bump\n}";
        let mut file = parse_source(text, SourceId(0)).unwrap();
        transform_source_file(
            &mut |ident: &mut Ident| {
                if ident.name == "a" {
                    ident.name = "counter".to_string();
                }
            },
            &mut file,
        );
        assert_eq!(pending_edits(&file).len(), 2);
        assert_eq!(render(&file).unwrap(), "{\n  counter := 0\n  counter++ // bump\n}");
    }

    #[test]
    fn renaming_to_same_name_is_no_edit() {
        let mut file = parse_source("x := 1", SourceId(0)).unwrap();
        transform_source_file(&mut |ident: &mut Ident| ident.name = "x".to_string(), &mut file);
        assert!(pending_edits(&file).is_empty());
    }
}
