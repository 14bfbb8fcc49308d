//! Conversions from resolver errors to `RefactorError`.
//!
//! `ResolveError` knows positions but not file paths, so the bridge takes
//! the path of the document the operation ran on. Both types live in other
//! crates, which rules out a `From` impl here.

use tugscope_core::error::RefactorError;
use tugscope_core::types::Location;
use tugscope_resolve::ResolveError;

// ============================================================================
// Bridge: ResolveError -> RefactorError
// ============================================================================

/// Attach `file` to a resolver error and lift it into the unified error.
pub(crate) fn resolve_error(file: &str, err: ResolveError) -> RefactorError {
    match err {
        ResolveError::Parse(parse) => RefactorError::ParseFailure {
            file: file.to_string(),
            line: parse.line,
            col: parse.column,
            expected: parse.expected,
        },
        ResolveError::UnboundDeclaringScope { name, position } => {
            RefactorError::UnboundDeclaringScope {
                name,
                location: Location::from_position(file, &position),
            }
        }
        ResolveError::RenameTargetNotFound { name, line, column } => {
            RefactorError::RenameTargetNotFound {
                name,
                location: Location::new(file, line, column),
            }
        }
        ResolveError::InvalidIdentifier { name, reason } => {
            RefactorError::InvalidIdentifier { name, reason }
        }
        ResolveError::Render(edit) => {
            RefactorError::apply(edit.to_string(), Some(file.to_string()))
        }
        ResolveError::Producer(message) => RefactorError::internal(message),
    }
}

// ============================================================================
// Tests
// ============================================================================
