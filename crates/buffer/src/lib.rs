//! etch-buffer: scalar-addressed text storage for the etch editing engine.
//!
//! This crate provides the storage layer: a gap buffer over Unicode scalar
//! values plus an incrementally maintained line index, combined behind
//! [`TextStore`]. It knows nothing about history, locking, or events —
//! that policy lives in `etch-core`.
//!
//! # Overview
//!
//! The main type is [`TextStore`], which provides:
//! - Localized insert/delete in O(1) amortized time at the edit point
//! - Line-based access with the terminating newline included
//! - Clamped offset ↔ `(line, column)` conversions in O(log n)
//!
//! # Example
//!
//! ```
//! use etch_buffer::{Position, TextStore};
//!
//! let mut store = TextStore::from_str("hello\nworld");
//! assert_eq!(store.line_count(), 2);
//! assert_eq!(store.line_content(0), "hello\n");
//!
//! store.insert(store.offset_at(Position::new(1, 0)), "big ");
//! assert_eq!(store.text(), "hello\nbig world");
//! ```

mod gap_buffer;
mod line_index;
mod text_store;
mod types;

pub use gap_buffer::GapBuffer;
pub use line_index::LineIndex;
pub use text_store::TextStore;
pub use types::{Position, Range};
