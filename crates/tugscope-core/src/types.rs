//! Common types shared between the error, output and analysis layers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::patch::Span;

// ============================================================================
// SourceId
// ============================================================================

/// Identifier of a parsed source within one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct SourceId(pub u32);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source_{}", self.0)
    }
}

// ============================================================================
// Position
// ============================================================================

/// Location of an identifier occurrence.
///
/// Line and column are 1-indexed; columns count bytes. The byte span covers
/// the identifier's text, so `span.len()` is the identifier length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Source the position belongs to.
    pub source: SourceId,
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, bytes).
    pub column: u32,
    /// Byte span of the identifier.
    pub span: Span,
}

impl Position {
    /// Create a new position.
    pub fn new(source: SourceId, line: u32, column: u32, span: Span) -> Self {
        Position {
            source,
            line,
            column,
            span,
        }
    }

    /// Length of the identifier at this position, in bytes.
    pub fn len(&self) -> u32 {
        self.span.len() as u32
    }

    /// True for zero-length positions (never produced for identifiers).
    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }

    /// True if `(row, column)` falls inside `[column, column + len)` on this line.
    pub fn contains(&self, row: u32, column: u32) -> bool {
        row == self.line && self.column <= column && column < self.column + self.len()
    }

    /// Key for deterministic source ordering.
    fn sort_key(&self) -> (SourceId, u64) {
        (self.source, self.span.start)
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

// ============================================================================
// Location Type
// ============================================================================

/// Location in a source file, as shown to callers.
///
/// - `file`: path as given on the command line
/// - `line`: 1-indexed line number
/// - `col`: 1-indexed column, UTF-8 bytes
/// - `byte_start` / `byte_end`: optional byte span
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Location {
    /// File path.
    pub file: String,
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, UTF-8 bytes).
    pub col: u32,
    /// Byte offset from file start (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte_start: Option<u64>,
    /// Byte offset end, exclusive (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte_end: Option<u64>,
}

impl Location {
    /// Create a new location without byte offsets.
    pub fn new(file: impl Into<String>, line: u32, col: u32) -> Self {
        Location {
            file: file.into(),
            line,
            col,
            byte_start: None,
            byte_end: None,
        }
    }

    /// Create a location for an identifier position.
    pub fn from_position(file: impl Into<String>, position: &Position) -> Self {
        Location {
            file: file.into(),
            line: position.line,
            col: position.column,
            byte_start: Some(position.span.start),
            byte_end: Some(position.span.end),
        }
    }

    /// Parse a location from "path:line:col" format.
    ///
    /// Robust against paths containing colons (e.g., Windows paths).
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.rsplitn(3, ':').collect();
        if parts.len() != 3 {
            return None;
        }
        let col: u32 = parts[0].parse().ok()?;
        let line: u32 = parts[1].parse().ok()?;
        if line == 0 || col == 0 || parts[2].is_empty() {
            return None;
        }
        Some(Location::new(parts[2], line, col))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.col)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod position_tests {
        use super::*;

        fn pos(line: u32, column: u32, start: u64, len: u64) -> Position {
            Position::new(SourceId(0), line, column, Span::new(start, start + len))
        }

        #[test]
        fn contains_is_half_open() {
            // "myString" at 1:5
            let p = pos(1, 5, 4, 8);
            assert!(p.contains(1, 5));
            assert!(p.contains(1, 12));
            assert!(!p.contains(1, 13));
            assert!(!p.contains(1, 4));
            assert!(!p.contains(2, 5));
        }

        #[test]
        fn ordering_follows_byte_offset() {
            let mut positions = vec![pos(2, 1, 10, 1), pos(1, 3, 2, 1), pos(1, 1, 0, 1)];
            positions.sort();
            let starts: Vec<u64> = positions.iter().map(|p| p.span.start).collect();
            assert_eq!(starts, vec![0, 2, 10]);
        }
    }

    mod location_tests {
        use super::*;

        #[test]
        fn location_new_serializes_without_byte_offsets() {
            let loc = Location::new("main.go", 42, 8);
            let json = serde_json::to_string(&loc).unwrap();
            assert!(!json.contains("byte_start"));
            assert!(json.contains("\"file\":\"main.go\""));
            assert!(json.contains("\"line\":42"));
        }

        #[test]
        fn location_parse_valid() {
            let loc = Location::parse("src/main.go:42:5").unwrap();
            assert_eq!(loc.file, "src/main.go");
            assert_eq!(loc.line, 42);
            assert_eq!(loc.col, 5);
        }

        #[test]
        fn location_parse_windows_path() {
            let loc = Location::parse("C:/work/main.go:10:3").unwrap();
            assert_eq!(loc.file, "C:/work/main.go");
            assert_eq!(loc.line, 10);
        }

        #[test]
        fn location_parse_invalid() {
            assert!(Location::parse("main.go").is_none());
            assert!(Location::parse("main.go:42").is_none());
            assert!(Location::parse("main.go:abc:5").is_none());
            assert!(Location::parse("main.go:0:5").is_none());
            assert!(Location::parse(":1:1").is_none());
        }
    }
}
