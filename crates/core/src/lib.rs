//! etch-core: a concurrent, undo/redo-capable Unicode text-editing engine.
//!
//! The engine wraps the `etch-buffer` storage layer with everything a host
//! editor needs and nothing it renders: a reader/writer-locked
//! [`TextBuffer`] supporting localized edits on very large documents,
//! line/column addressing, searching (plain, case-insensitive, whole-word,
//! regex) with wrap-around, bulk replace, explicit end-of-line handling,
//! atomic file persistence, and asynchronous event fan-out.
//!
//! # Overview
//!
//! - [`TextBuffer`] — the only externally visible component; share one
//!   instance across threads directly or behind an `Arc`.
//! - [`SearchOptions`] — flags for `find_next` / `find_previous` /
//!   `replace_all`.
//! - [`EolType`] — the Unix / Windows / Mac line-terminator tag.
//! - [`BufferEvent`] / [`EventKind`] — the subscription surface; listeners
//!   run on a per-buffer dispatcher thread, never under the buffer lock.
//! - [`Error`] — every way an operation can fail.
//!
//! # Example
//!
//! ```
//! use etch_core::{Position, SearchOptions, TextBuffer};
//!
//! let buffer = TextBuffer::new();
//! buffer.set_text("one two one");
//!
//! let hit = buffer
//!     .find_next("one", Position::new(0, 4), &SearchOptions::default())
//!     .unwrap();
//! assert_eq!(hit.start, Position::new(0, 8));
//!
//! let count = buffer
//!     .replace_all("one", "1", &SearchOptions::default())
//!     .unwrap();
//! assert_eq!(count, 2);
//! assert_eq!(buffer.text(), "1 two 1");
//! ```

mod eol;
mod error;
mod events;
mod language;
mod search;
mod text_buffer;
mod undo;

pub use eol::EolType;
pub use error::{Error, Result};
pub use events::{BufferEvent, EventKind, Listener, SubscriptionId};
pub use language::language_for_path;
pub use search::SearchOptions;
pub use text_buffer::TextBuffer;
pub use undo::{EditOp, EditRecord, UndoLog, DEFAULT_UNDO_LIMIT};

pub use etch_buffer::{Position, Range};
