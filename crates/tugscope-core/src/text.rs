//! Text position utilities for byte offset and line:column conversions.
//!
//! ## Coordinate Conventions
//!
//! - Lines and columns are **1-indexed** (matching editor conventions)
//! - Columns count **bytes**, the convention of Go's `token.Position`
//! - Byte offsets are **0-indexed**
//!
//! [`LineIndex`] precomputes line starts once per source so that the many
//! conversions done while building a scope tree are `O(log n)`.

/// Precomputed line start offsets for one source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Byte offset of the first byte of every line. Always starts with 0.
    line_starts: Vec<usize>,
    /// Total length of the indexed text.
    len: usize,
}

impl LineIndex {
    /// Index the given text.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| i + 1),
        );
        LineIndex {
            line_starts,
            len: text.len(),
        }
    }

    /// Number of lines (a trailing newline starts an empty last line).
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Convert a byte offset to 1-indexed `(line, col)`.
    ///
    /// Offsets past the end clamp to the end of the text.
    pub fn position(&self, offset: usize) -> (u32, u32) {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(next) => next - 1,
        };
        let col = offset - self.line_starts[line];
        (line as u32 + 1, col as u32 + 1)
    }

    /// Convert 1-indexed `(line, col)` to a byte offset.
    ///
    /// Returns `None` when the line does not exist or the column lies past the
    /// end of the line (the newline itself counts as the last column).
    pub fn offset(&self, line: u32, col: u32) -> Option<usize> {
        if line == 0 || col == 0 {
            return None;
        }
        let start = *self.line_starts.get(line as usize - 1)?;
        let line_end = self
            .line_starts
            .get(line as usize)
            .copied()
            .unwrap_or(self.len);
        let offset = start + col as usize - 1;
        if offset > line_end || (offset == line_end && line as usize != self.line_starts.len()) {
            return None;
        }
        Some(offset)
    }
}
