//! Byte spans and span edits.
//!
//! A [`SpanEdit`] replaces a half-open byte range of a source text. Edits are
//! applied from end to start so that earlier spans stay valid while later text
//! changes length. This is the only way tugscope rewrites text: everything
//! outside an edited span is copied through untouched.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Byte offsets into file content.
///
/// Spans are half-open intervals: `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: u64,
    /// End byte offset (exclusive).
    pub end: u64,
}

impl Span {
    /// Create a new span.
    ///
    /// # Panics
    /// Panics if `start > end`.
    pub fn new(start: u64, end: u64) -> Self {
        assert!(
            start <= end,
            "Span start ({}) must be <= end ({})",
            start,
            end
        );
        Span { start, end }
    }

    /// Create a span from `usize` offsets (parser positions).
    pub fn from_offsets(start: usize, end: usize) -> Self {
        Span::new(start as u64, end as u64)
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// Check if span is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if this span overlaps with another.
    ///
    /// Adjacent spans (one ends where another starts) do NOT overlap.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Check if this span contains another span entirely.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Check if a byte offset falls inside the span.
    pub fn contains_offset(&self, offset: u64) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Smallest span covering both spans.
    pub fn cover(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// The text this span covers, if it lies on char boundaries inside `source`.
    pub fn slice<'s>(&self, source: &'s str) -> Option<&'s str> {
        source.get(self.start as usize..self.end as usize)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// A request to replace a span of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanEdit {
    /// The byte span to replace (start inclusive, end exclusive).
    pub span: Span,
    /// Replacement text.
    pub text: String,
}

impl SpanEdit {
    /// Create a new edit.
    pub fn new(span: Span, text: impl Into<String>) -> Self {
        Self {
            span,
            text: text.into(),
        }
    }
}

/// Errors raised while applying span edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// A span extends beyond the source text length.
    #[error("span {span} is out of bounds for source of length {source_len}")]
    SpanOutOfBounds { span: Span, source_len: u64 },

    /// A span does not fall on UTF-8 character boundaries.
    #[error("span {span} does not fall on character boundaries")]
    NotCharBoundary { span: Span },

    /// Two spans overlap.
    #[error("overlapping spans: {first} and {second}")]
    OverlappingSpans { first: Span, second: Span },
}

/// Apply edits to `source` and return the new text.
///
/// An empty edit list returns the source unchanged.
pub fn apply_edits(source: &str, mut edits: Vec<SpanEdit>) -> Result<String, EditError> {
    let source_len = source.len() as u64;

    for edit in &edits {
        if edit.span.end > source_len {
            return Err(EditError::SpanOutOfBounds {
                span: edit.span,
                source_len,
            });
        }
        if !source.is_char_boundary(edit.span.start as usize)
            || !source.is_char_boundary(edit.span.end as usize)
        {
            return Err(EditError::NotCharBoundary { span: edit.span });
        }
    }

    // End to start keeps the remaining spans valid.
    edits.sort_by(|a, b| b.span.start.cmp(&a.span.start));

    for pair in edits.windows(2) {
        let (later, earlier) = (&pair[0], &pair[1]);
        if earlier.span.end > later.span.start {
            return Err(EditError::OverlappingSpans {
                first: earlier.span,
                second: later.span,
            });
        }
    }

    let mut result = source.to_string();
    for edit in &edits {
        result.replace_range(edit.span.start as usize..edit.span.end as usize, &edit.text);
    }
    Ok(result)
}

/// SHA-256 of the content, hex encoded.
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
