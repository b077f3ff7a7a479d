//! TextStore combines the gap buffer with the line index.
//!
//! It is the offset-addressed storage layer: every mutation keeps the line
//! index in sync, and every line/column conversion clamps out-of-range
//! input instead of failing. Policy (locking, history, events) lives a
//! layer up.

use crate::gap_buffer::GapBuffer;
use crate::line_index::LineIndex;
use crate::types::Position;

/// Scalar-addressed text storage with line/column conversions.
///
/// Invariants maintained across every edit:
/// - `line_count() == 1 +` number of `'\n'` scalars in the content;
/// - concatenating all lines reproduces the content exactly;
/// - `offset_at(position_at(o)) == o` for every `o` in `[0, len]`.
#[derive(Debug)]
pub struct TextStore {
    buffer: GapBuffer,
    lines: LineIndex,
}

impl TextStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            buffer: GapBuffer::new(),
            lines: LineIndex::new(),
        }
    }

    /// Creates a store initialized with the given text.
    pub fn from_str(text: &str) -> Self {
        let buffer = GapBuffer::from_str(text);
        let mut lines = LineIndex::new();
        lines.rebuild(text.chars());
        Self { buffer, lines }
    }

    // ==================== Reads ====================

    /// Returns the full content as a `String`.
    pub fn text(&self) -> String {
        self.buffer.text()
    }

    /// Returns the total scalar count.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if the store holds no text.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Returns the number of lines (at least 1).
    pub fn line_count(&self) -> usize {
        self.lines.line_count()
    }

    /// Returns the content of the given line, including its terminating
    /// `'\n'` if one exists. Out-of-range lines yield an empty string.
    pub fn line_content(&self, line: usize) -> String {
        let start = match self.lines.line_start(line) {
            Some(s) => s,
            None => return String::new(),
        };
        let end = self
            .lines
            .line_start(line + 1)
            .unwrap_or_else(|| self.buffer.len());
        self.buffer.slice(start, end)
    }

    /// Returns the length of the given line, excluding its newline.
    pub fn line_len(&self, line: usize) -> usize {
        self.lines.line_len(line, self.buffer.len()).unwrap_or(0)
    }

    /// Returns every line, as by [`TextStore::line_content`].
    pub fn lines(&self) -> Vec<String> {
        (0..self.line_count()).map(|i| self.line_content(i)).collect()
    }

    /// Returns the half-open scalar range `[start, end)` as a `String`.
    /// Invalid input yields an empty string.
    pub fn text_in_range(&self, start: usize, end: usize) -> String {
        self.buffer.slice(start, end)
    }

    /// Returns the scalar at the given offset.
    pub fn char_at(&self, offset: usize) -> Option<char> {
        self.buffer.char_at(offset)
    }

    /// Returns an iterator over all scalars in order.
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.buffer.chars()
    }

    // ==================== Addressing ====================

    /// Converts an absolute offset to a `(line, column)` position.
    ///
    /// The offset is clamped to `[0, len]`; the line is found by binary
    /// search on the line starts.
    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.buffer.len());
        let line = self.lines.line_at_offset(offset);
        let column = offset - self.lines.line_start(line).unwrap_or(0);
        Position::new(line, column)
    }

    /// Converts a `(line, column)` position to an absolute offset.
    ///
    /// Past-end lines map to `len`; the column is clamped to the line
    /// length (excluding the terminating newline).
    pub fn offset_at(&self, position: Position) -> usize {
        if position.line >= self.lines.line_count() {
            return self.buffer.len();
        }
        let start = self.lines.line_start(position.line).unwrap_or(0);
        let max = self.line_len(position.line);
        start + position.column.min(max)
    }

    // ==================== Mutations ====================

    /// Inserts `text` at the given offset (clamped). Empty text is a no-op.
    pub fn insert(&mut self, offset: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        let offset = offset.min(self.buffer.len());
        self.buffer.insert(offset, text);
        self.lines.apply_insert(offset, text);
    }

    /// Deletes the scalar range `[start, end)`. An empty or inverted range
    /// is a no-op.
    pub fn delete(&mut self, start: usize, end: usize) {
        let end = end.min(self.buffer.len());
        if start >= end {
            return;
        }
        self.buffer.delete(start, end);
        self.lines.apply_delete(start, end);
    }

    /// Empties the store.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.lines = LineIndex::new();
    }

    /// Replaces the whole content with `text`.
    pub fn set_text(&mut self, text: &str) {
        self.buffer.set_text(text);
        self.lines.rebuild(text.chars());
    }
}

impl Default for TextStore {
    fn default() -> Self {
        Self::new()
    }
}
