//! Single-file operations: lookup, positions and rename.
//!
//! Each operation parses a [`SourceDocument`], runs the resolver and
//! converts the result into the JSON response types of
//! [`tugscope_core::output`]. Failures are lifted into [`RefactorError`]
//! with the document's path attached.
//!
//! A position that hits no identifier is `SymbolNotFound` here, even
//! though the resolver itself reports it as an empty result.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, info};
use tugscope_core::config::UnboundPolicy;
use tugscope_core::error::RefactorError;
use tugscope_core::output::{EditInfo, LookupResponse, PositionGroup, RenameResponse, SymbolInfo};
use tugscope_core::patch::content_hash;
use tugscope_core::types::{Location, SourceId};
use tugscope_cst::{codegen, parse_source, SourceFile};
use tugscope_resolve::{Resolution, Resolved, RenameTransformer, ScopeTree, SiteGroup, SymbolLocator};

use crate::error_bridges::resolve_error;

/// A source file read into memory, addressed by the path the caller gave.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub path: String,
    pub text: String,
}

impl SourceDocument {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        SourceDocument {
            path: path.into(),
            text: text.into(),
        }
    }

    /// Read `path` from disk.
    pub fn read(path: &str) -> Result<Self, RefactorError> {
        match fs::read_to_string(Path::new(path)) {
            Ok(text) => Ok(SourceDocument::new(path, text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(RefactorError::file_not_found(path))
            }
            Err(err) => Err(RefactorError::internal(format!(
                "failed to read {path}: {err}"
            ))),
        }
    }

    /// Parse the document. A single document is always source 0.
    pub fn parse(&self) -> Result<SourceFile, RefactorError> {
        let file = parse_source(&self.text, SourceId(0))
            .map_err(|err| resolve_error(&self.path, err.into()))?;
        debug!(path = %self.path, bytes = self.text.len(), "parsed document");
        Ok(file)
    }

    /// SHA-256 of the document text.
    pub fn hash(&self) -> String {
        content_hash(&self.text)
    }

    /// Byte offset of `line:col`, or `InvalidArguments` when the position
    /// lies outside the text.
    pub fn offset_of(
        &self,
        file: &SourceFile,
        line: u32,
        col: u32,
    ) -> Result<usize, RefactorError> {
        file.line_index.offset(line, col).ok_or_else(|| {
            RefactorError::invalid_args(format!(
                "position {}:{}:{} is outside the file ({} lines)",
                self.path,
                line,
                col,
                file.line_index.line_count()
            ))
        })
    }

    fn locator(
        &self,
        file: &SourceFile,
        policy: UnboundPolicy,
    ) -> Result<SymbolLocator, RefactorError> {
        SymbolLocator::with_policy(file, policy).map_err(|err| resolve_error(&self.path, err))
    }
}

// ============================================================================
// Conversions
// ============================================================================

/// Describe a resolved symbol for output.
pub fn symbol_info(path: &str, tree: &ScopeTree, resolved: &Resolved) -> SymbolInfo {
    let declaration = match resolved.resolution {
        Resolution::Bound => tree
            .scope(resolved.declaring_scope)
            .get_declaration(&resolved.symbol.name)
            .map(|position| Location::from_position(path, position)),
        Resolution::Free => None,
    };
    SymbolInfo {
        name: resolved.symbol.name.clone(),
        location: Location::from_position(path, &resolved.symbol.position),
        declaration,
        scope_kind: resolved.declaring_kind.as_str().to_string(),
        resolution: resolved.resolution.as_str().to_string(),
    }
}

/// Convert a resolver group into its output form.
pub fn position_group(path: &str, group: &SiteGroup) -> PositionGroup {
    PositionGroup {
        depth: group.depth,
        scope_kind: group.kind.as_str().to_string(),
        positions: group
            .positions
            .iter()
            .map(|position| Location::from_position(path, position))
            .collect(),
    }
}

// ============================================================================
// Operations
// ============================================================================

/// Resolve the identifier at `line:col` and group its occurrences by
/// scope, innermost first, up to the declaring scope.
pub fn lookup(
    doc: &SourceDocument,
    line: u32,
    col: u32,
    policy: UnboundPolicy,
) -> Result<LookupResponse, RefactorError> {
    let file = doc.parse()?;
    doc.offset_of(&file, line, col)?;
    let locator = doc.locator(&file, policy)?;
    let found = locator
        .positions_for_symbol_at(line, col)
        .map_err(|err| resolve_error(&doc.path, err))?
        .ok_or_else(|| RefactorError::symbol_not_found(&doc.path, line, col))?;

    let symbol = symbol_info(&doc.path, locator.tree(), &found.resolved);
    let groups: Vec<PositionGroup> = found
        .groups
        .iter()
        .map(|group| position_group(&doc.path, group))
        .collect();
    info!(
        path = %doc.path,
        name = %symbol.name,
        resolution = %symbol.resolution,
        groups = groups.len(),
        "lookup"
    );
    Ok(LookupResponse::new(symbol, groups))
}

/// Every occurrence bound to the same declaration as the identifier at
/// `line:col`, in source order.
pub fn positions(
    doc: &SourceDocument,
    line: u32,
    col: u32,
    policy: UnboundPolicy,
) -> Result<Vec<Location>, RefactorError> {
    let file = doc.parse()?;
    doc.offset_of(&file, line, col)?;
    let locator = doc.locator(&file, policy)?;
    let binding = locator
        .binding_occurrences_at(line, col)
        .map_err(|err| resolve_error(&doc.path, err))?
        .ok_or_else(|| RefactorError::symbol_not_found(&doc.path, line, col))?;
    debug!(
        path = %doc.path,
        name = %binding.resolved.symbol.name,
        occurrences = binding.occurrences.len(),
        "binding occurrences"
    );
    Ok(binding
        .occurrences
        .iter()
        .map(|position| Location::from_position(&doc.path, position))
        .collect())
}

/// A computed rename: the response plus the rendered text.
#[derive(Debug, Clone)]
pub struct RenamePlan {
    pub response: RenameResponse,
    pub rendered: String,
}

impl RenamePlan {
    /// Write the rendered text over `path`.
    ///
    /// Refuses when the file no longer hashes to the text the plan was
    /// computed from.
    pub fn write(&self, path: &str) -> Result<(), RefactorError> {
        let current = SourceDocument::read(path)?;
        if current.hash() != self.response.before_hash {
            return Err(RefactorError::apply(
                "file changed since the rename was computed",
                Some(path.to_string()),
            ));
        }
        fs::write(path, &self.rendered)
            .map_err(|err| RefactorError::apply(err.to_string(), Some(path.to_string())))?;
        info!(path, edits = self.response.edits.len(), "applied rename");
        Ok(())
    }
}

/// Rename the binding of the identifier at `line:col` to `new_name`.
///
/// The document itself is not touched; see [`RenamePlan::write`].
pub fn rename(
    doc: &SourceDocument,
    line: u32,
    col: u32,
    new_name: &str,
    policy: UnboundPolicy,
) -> Result<RenamePlan, RefactorError> {
    let mut file = doc.parse()?;
    doc.offset_of(&file, line, col)?;
    let (symbol, old_name) = {
        let locator = doc.locator(&file, policy)?;
        let resolved = locator
            .resolve_at(line, col)
            .map_err(|err| resolve_error(&doc.path, err))?
            .ok_or_else(|| RefactorError::symbol_not_found(&doc.path, line, col))?;
        (
            symbol_info(&doc.path, locator.tree(), &resolved),
            resolved.symbol.name,
        )
    };

    let outcome = RenameTransformer::new(&old_name, new_name, line, col)
        .with_policy(policy)
        .apply(&mut file)
        .map_err(|err| resolve_error(&doc.path, err))?;
    let rendered =
        codegen::render(&file).map_err(|err| resolve_error(&doc.path, err.into()))?;

    let edits: Vec<EditInfo> = outcome
        .renamed
        .iter()
        .map(|position| EditInfo {
            location: Location::from_position(&doc.path, position),
            old_text: outcome.old_name.clone(),
            new_text: outcome.new_name.clone(),
        })
        .collect();
    info!(
        path = %doc.path,
        from = %outcome.old_name,
        to = %outcome.new_name,
        edits = edits.len(),
        "rename"
    );

    let response = RenameResponse::new(
        symbol,
        new_name,
        edits,
        doc.hash(),
        content_hash(&rendered),
        rendered.clone(),
    );
    Ok(RenamePlan { response, rendered })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_FUNCS: &str = "func A() {\n\tintegerVariable := 1\n\tprintln(integerVariable)\n}\n\nfunc B() {\n\tintegerVariable := 1\n\tprintln(integerVariable)\n}\n";

    fn doc(text: &str) -> SourceDocument {
        SourceDocument::new("main.go", text)
    }

    mod lookups {
        use super::*;

        #[test]
        fn groups_stop_at_the_declaring_function() {
            let response = lookup(&doc(TWO_FUNCS), 3, 10, UnboundPolicy::default()).unwrap();
            assert_eq!(response.symbol.name, "integerVariable");
            assert_eq!(response.symbol.scope_kind, "function");
            assert_eq!(response.symbol.resolution, "bound");
            assert_eq!(
                response.symbol.declaration,
                Some(Location {
                    file: "main.go".to_string(),
                    line: 2,
                    col: 2,
                    byte_start: Some(12),
                    byte_end: Some(27),
                })
            );
            assert_eq!(response.groups.len(), 1);
            assert_eq!(response.position_count(), 2);
        }

        #[test]
        fn free_names_resolve_to_the_file() {
            let response = lookup(&doc(TWO_FUNCS), 3, 2, UnboundPolicy::default()).unwrap();
            assert_eq!(response.symbol.name, "println");
            assert_eq!(response.symbol.resolution, "free");
            assert_eq!(response.symbol.scope_kind, "file");
            assert!(response.symbol.declaration.is_none());
        }

        #[test]
        fn rejected_free_names_are_errors() {
            let err = lookup(&doc(TWO_FUNCS), 3, 2, UnboundPolicy::Reject).unwrap_err();
            assert!(matches!(err, RefactorError::UnboundDeclaringScope { .. }));
        }

        #[test]
        fn whitespace_is_symbol_not_found() {
            let err = lookup(&doc(TWO_FUNCS), 5, 1, UnboundPolicy::default()).unwrap_err();
            assert!(matches!(
                err,
                RefactorError::SymbolNotFound { line: 5, col: 1, .. }
            ));
        }

        #[test]
        fn positions_outside_the_file_are_invalid_arguments() {
            for (line, col) in [(40, 1), (2, 80), (0, 1)] {
                let err =
                    lookup(&doc(TWO_FUNCS), line, col, UnboundPolicy::default()).unwrap_err();
                assert!(matches!(err, RefactorError::InvalidArguments { .. }), "{line}:{col}");
                assert_eq!(err.error_code().code(), 2);
            }
            let err = positions(&doc(TWO_FUNCS), 11, 1, UnboundPolicy::default()).unwrap_err();
            assert!(err.to_string().contains("(10 lines)"), "{err}");
        }

        #[test]
        fn parse_failures_carry_the_path() {
            let err = lookup(&doc("func ("), 1, 1, UnboundPolicy::default()).unwrap_err();
            assert!(matches!(err, RefactorError::ParseFailure { ref file, .. } if file == "main.go"));
        }
    }

    mod renames {
        use super::*;

        #[test]
        fn edits_cover_one_function() {
            let plan = rename(&doc(TWO_FUNCS), 2, 2, "count", UnboundPolicy::default()).unwrap();
            assert_eq!(
                plan.rendered,
                TWO_FUNCS.replacen("integerVariable", "count", 2)
            );
            let response = &plan.response;
            assert_eq!(response.edits.len(), 2);
            assert_eq!(response.summary.edits_count, 2);
            assert_eq!(response.before_hash, content_hash(TWO_FUNCS));
            assert_eq!(response.after_hash, content_hash(&plan.rendered));
            assert_eq!(response.preview.as_deref(), Some(plan.rendered.as_str()));
        }

        #[test]
        fn positions_match_edits() {
            let document = doc(TWO_FUNCS);
            let plan = rename(&document, 7, 2, "count", UnboundPolicy::default()).unwrap();
            let found = positions(&document, 7, 2, UnboundPolicy::default()).unwrap();
            let edited: Vec<_> = plan.response.edits.iter().map(|e| e.location.clone()).collect();
            assert_eq!(found, edited);
        }

        #[test]
        fn invalid_names_are_rejected() {
            let err = rename(&doc(TWO_FUNCS), 2, 2, "func", UnboundPolicy::default()).unwrap_err();
            assert!(matches!(err, RefactorError::InvalidIdentifier { .. }));
            assert_eq!(err.error_code().code(), 2);
        }

        #[test]
        fn anchor_outside_the_file_is_rejected() {
            let err = rename(&doc(TWO_FUNCS), 3, 30, "x", UnboundPolicy::default()).unwrap_err();
            assert!(matches!(err, RefactorError::InvalidArguments { .. }));
        }

        #[test]
        fn missing_symbol_is_not_found() {
            let err = rename(&doc(TWO_FUNCS), 4, 1, "x", UnboundPolicy::default()).unwrap_err();
            assert!(matches!(err, RefactorError::SymbolNotFound { .. }));
        }
    }
}
