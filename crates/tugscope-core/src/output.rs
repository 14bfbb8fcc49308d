//! JSON output types and serialization for CLI responses.
//!
//! ## Design Principles
//!
//! 1. **Status first:** Every response has `status` as first field
//! 2. **Deterministic:** Same input -> same output (field order, array ordering)
//! 3. **Nullable vs absent:** absent field means "not applicable"
//! 4. **Versioned:** Schema version in response enables forward compatibility
//!
//! Position groups keep the order the resolver produced them in: innermost
//! scope first. Positions inside a group stay in discovery order.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::{OutputErrorCode, RefactorError};

pub use crate::types::Location;

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Shared Types
// ============================================================================

/// The symbol a query resolved to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SymbolInfo {
    /// Identifier text.
    pub name: String,
    /// Occurrence the query position landed on.
    pub location: Location,
    /// Binding site, absent for free names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declaration: Option<Location>,
    /// Kind of the declaring scope (`file`, `function`, `block`, `if`, `for`).
    pub scope_kind: String,
    /// `bound` when a declaration was found, `free` otherwise.
    pub resolution: String,
}

/// Occurrences collected from one scope of the bounded chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PositionGroup {
    /// Depth of the scope in the tree, 0 for the file scope.
    pub depth: u32,
    /// Kind of the scope the group came from.
    pub scope_kind: String,
    /// Positions in discovery order.
    pub positions: Vec<Location>,
}

/// A single identifier rewrite.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EditInfo {
    /// Where the identifier was.
    pub location: Location,
    /// Text before the rename.
    pub old_text: String,
    /// Text after the rename.
    pub new_text: String,
}

/// Edit statistics for a rename.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Summary {
    /// Number of identifiers rewritten.
    pub edits_count: u32,
    /// Bytes added across all edits.
    pub bytes_added: i64,
    /// Bytes removed across all edits.
    pub bytes_removed: i64,
}

impl Summary {
    /// Compute statistics from a list of edits.
    pub fn from_edits(edits: &[EditInfo]) -> Self {
        let mut bytes_added = 0i64;
        let mut bytes_removed = 0i64;
        for edit in edits {
            bytes_added += edit.new_text.len() as i64;
            bytes_removed += edit.old_text.len() as i64;
        }
        Summary {
            edits_count: edits.len() as u32,
            bytes_added,
            bytes_removed,
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Error information for error responses.
///
/// - `code`: Numeric error code (required)
/// - `message`: Human-readable message (required)
/// - `details`: Error-specific structured data (optional)
/// - `location`: Where the error occurred (optional)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code.
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// Error-specific structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Where the error occurred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl ErrorInfo {
    /// Create from a RefactorError.
    pub fn from_error(err: &RefactorError) -> Self {
        let code = OutputErrorCode::from(err).code();
        let message = err.to_string();

        let (details, location) = match err {
            RefactorError::SymbolNotFound { file, line, col } => {
                (None, Some(Location::new(file.clone(), *line, *col)))
            }
            RefactorError::UnboundDeclaringScope { name, location }
            | RefactorError::RenameTargetNotFound { name, location } => (
                Some(serde_json::json!({ "name": name })),
                Some(location.clone()),
            ),
            RefactorError::ParseFailure {
                file,
                line,
                col,
                expected,
            } => (
                Some(serde_json::json!({ "expected": expected })),
                Some(Location::new(file.clone(), *line, *col)),
            ),
            RefactorError::InvalidIdentifier { name, reason } => (
                Some(serde_json::json!({ "name": name, "reason": reason })),
                None,
            ),
            RefactorError::InvalidArguments { details, .. } => (details.clone(), None),
            RefactorError::FileNotFound { path } => {
                (Some(serde_json::json!({ "path": path })), None)
            }
            RefactorError::ApplyError { file, .. } => {
                let details = file.as_ref().map(|f| serde_json::json!({ "file": f }));
                (details, None)
            }
            _ => (None, None),
        };

        ErrorInfo {
            code,
            message,
            details,
            location,
        }
    }
}

// ============================================================================
// Response Structs
// ============================================================================

/// Response for the `lookup` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupResponse {
    /// Status: "ok".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// The resolved symbol.
    pub symbol: SymbolInfo,
    /// Occurrences grouped by scope, innermost first.
    pub groups: Vec<PositionGroup>,
}

impl LookupResponse {
    /// Create a new lookup response.
    pub fn new(symbol: SymbolInfo, groups: Vec<PositionGroup>) -> Self {
        LookupResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            symbol,
            groups,
        }
    }

    /// Total positions across all groups.
    pub fn position_count(&self) -> usize {
        self.groups.iter().map(|g| g.positions.len()).sum()
    }
}

/// Response for the `rename` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameResponse {
    /// Status: "ok".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// The renamed symbol.
    pub symbol: SymbolInfo,
    /// Replacement name.
    pub new_name: String,
    /// Identifier rewrites in source order.
    pub edits: Vec<EditInfo>,
    /// Edit statistics.
    pub summary: Summary,
    /// SHA-256 of the source before the rename.
    pub before_hash: String,
    /// SHA-256 of the rendered result.
    pub after_hash: String,
    /// Rendered source (present on dry runs).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    /// Whether the file was written (present when --apply used).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied: Option<bool>,
}

impl RenameResponse {
    /// Create a dry-run rename response carrying the rendered preview.
    pub fn new(
        symbol: SymbolInfo,
        new_name: impl Into<String>,
        edits: Vec<EditInfo>,
        before_hash: impl Into<String>,
        after_hash: impl Into<String>,
        preview: String,
    ) -> Self {
        let summary = Summary::from_edits(&edits);
        RenameResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            symbol,
            new_name: new_name.into(),
            edits,
            summary,
            before_hash: before_hash.into(),
            after_hash: after_hash.into(),
            preview: Some(preview),
            applied: None,
        }
    }

    /// Mark the response as applied. The preview is dropped since the file holds it.
    pub fn applied(mut self) -> Self {
        self.preview = None;
        self.applied = Some(true);
        self
    }
}

/// One line of `stream` output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamGroupLine {
    /// Status: "group".
    pub status: String,
    /// Symbol name the group belongs to.
    pub name: String,
    /// The group itself.
    #[serde(flatten)]
    pub group: PositionGroup,
}

impl StreamGroupLine {
    /// Wrap a group for line-oriented output.
    pub fn new(name: impl Into<String>, group: PositionGroup) -> Self {
        StreamGroupLine {
            status: "group".to_string(),
            name: name.into(),
            group,
        }
    }
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Error information.
    pub error: ErrorInfo,
}

impl ErrorResponse {
    /// Create an error response from a RefactorError.
    pub fn from_error(err: &RefactorError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

// ============================================================================
// Emission
// ============================================================================

/// Emit a response as pretty JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

/// Emit a response as compact JSON (single line) to a writer.
pub fn emit_response_compact<T: Serialize>(
    response: &T,
    writer: &mut impl Write,
) -> io::Result<()> {
    let json = serde_json::to_string(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol() -> SymbolInfo {
        SymbolInfo {
            name: "integerVariable".to_string(),
            location: Location::new("main.go", 3, 1),
            declaration: Some(Location::new("main.go", 3, 1)),
            scope_kind: "function".to_string(),
            resolution: "bound".to_string(),
        }
    }

    mod response_tests {
        use super::*;

        #[test]
        fn status_comes_first() {
            let response = LookupResponse::new(symbol(), vec![]);
            let json = serde_json::to_string(&response).unwrap();
            assert!(json.starts_with("{\"status\":\"ok\""));
            assert!(json.contains("\"schema_version\":\"1\""));
        }

        #[test]
        fn lookup_counts_positions_across_groups() {
            let groups = vec![
                PositionGroup {
                    depth: 0,
                    scope_kind: "block".to_string(),
                    positions: vec![Location::new("main.go", 4, 1)],
                },
                PositionGroup {
                    depth: 1,
                    scope_kind: "function".to_string(),
                    positions: vec![
                        Location::new("main.go", 2, 1),
                        Location::new("main.go", 6, 1),
                    ],
                },
            ];
            assert_eq!(LookupResponse::new(symbol(), groups).position_count(), 3);
        }

        #[test]
        fn rename_summary_and_apply() {
            let edits = vec![
                EditInfo {
                    location: Location::new("main.go", 2, 1),
                    old_text: "a".to_string(),
                    new_text: "bb".to_string(),
                },
                EditInfo {
                    location: Location::new("main.go", 3, 1),
                    old_text: "a".to_string(),
                    new_text: "bb".to_string(),
                },
            ];
            let response =
                RenameResponse::new(symbol(), "bb", edits, "h0", "h1", "preview".to_string());
            assert_eq!(response.summary.edits_count, 2);
            assert_eq!(response.summary.bytes_added, 4);
            assert_eq!(response.summary.bytes_removed, 2);
            assert!(response.applied.is_none());

            let applied = response.applied();
            assert_eq!(applied.applied, Some(true));
            let json = serde_json::to_string(&applied).unwrap();
            assert!(!json.contains("preview"));
        }

        #[test]
        fn stream_line_flattens_group() {
            let line = StreamGroupLine::new(
                "a",
                PositionGroup {
                    depth: 0,
                    scope_kind: "block".to_string(),
                    positions: vec![],
                },
            );
            let value: serde_json::Value = serde_json::to_value(&line).unwrap();
            assert_eq!(value["status"], "group");
            assert_eq!(value["depth"], 0);
            assert_eq!(value["scope_kind"], "block");
        }
    }

    mod error_response_tests {
        use super::*;

        #[test]
        fn error_response_carries_code_and_location() {
            let err = RefactorError::symbol_not_found("main.go", 1, 3);
            let response = ErrorResponse::from_error(&err);
            assert_eq!(response.status, "error");
            assert_eq!(response.error.code, 3);
            assert_eq!(response.error.location, Some(Location::new("main.go", 1, 3)));
        }

        #[test]
        fn parse_failure_details() {
            let err = RefactorError::ParseFailure {
                file: "main.go".to_string(),
                line: 2,
                col: 4,
                expected: "\"}\"".to_string(),
            };
            let info = ErrorInfo::from_error(&err);
            assert_eq!(info.code, 6);
            assert_eq!(info.details.unwrap()["expected"], "\"}\"");
        }
    }

    mod emit_tests {
        use super::*;

        #[test]
        fn emit_response_produces_valid_json() {
            let response = LookupResponse::new(symbol(), vec![]);
            let mut output = Vec::new();
            emit_response(&response, &mut output).unwrap();
            let json_str = String::from_utf8(output).unwrap();
            let _parsed: serde_json::Value = serde_json::from_str(&json_str).unwrap();
        }

        #[test]
        fn compact_output_is_one_line() {
            let response = ErrorResponse::from_error(&RefactorError::internal("boom"));
            let mut output = Vec::new();
            emit_response_compact(&response, &mut output).unwrap();
            let text = String::from_utf8(output).unwrap();
            assert_eq!(text.lines().count(), 1);
        }
    }
}
