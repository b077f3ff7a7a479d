//! Edit records and the undo/redo log.
//!
//! The log stores records verbatim and never applies them; inversion is
//! the text buffer's job. Two ordered sequences (`past` and `future`) hold
//! the history, each bounded by the record limit.

use std::collections::VecDeque;

use etch_buffer::Position;
use tracing::trace;

/// Maximum number of records retained in each direction by default.
pub const DEFAULT_UNDO_LIMIT: usize = 100;

/// The operation tag carried by text-change events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOp {
    Insert,
    Delete,
    Replace,
    Clear,
    SetText,
}

/// One reversible edit, recorded before the mutation it describes.
///
/// Positions are stored in `(line, column)` form and re-resolved against
/// the buffer at inversion time, with the same clamping as the original
/// operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditRecord {
    Insert {
        position: Position,
        text: String,
    },
    Delete {
        position: Position,
        text: String,
    },
    Replace {
        position: Position,
        text: String,
        old_text: String,
    },
    Clear {
        old_text: String,
    },
    SetText {
        text: String,
        old_text: String,
    },
}

impl EditRecord {
    /// Returns the operation tag for event payloads.
    pub fn operation(&self) -> EditOp {
        match self {
            EditRecord::Insert { .. } => EditOp::Insert,
            EditRecord::Delete { .. } => EditOp::Delete,
            EditRecord::Replace { .. } => EditOp::Replace,
            EditRecord::Clear { .. } => EditOp::Clear,
            EditRecord::SetText { .. } => EditOp::SetText,
        }
    }
}

/// Bounded undo/redo history.
///
/// New records append to `past` and wipe `future`; `past` evicts its
/// oldest record when full.
#[derive(Debug)]
pub struct UndoLog {
    past: VecDeque<EditRecord>,
    future: Vec<EditRecord>,
    limit: usize,
}

impl UndoLog {
    /// Creates a log with the default record limit.
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_UNDO_LIMIT)
    }

    /// Creates a log bounded to `limit` records per direction.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Records a new edit, clearing the redo direction.
    pub fn push(&mut self, record: EditRecord) {
        self.future.clear();
        self.past.push_back(record);
        if self.past.len() > self.limit {
            self.past.pop_front();
            trace!(target: "etch.undo", limit = self.limit, "oldest record evicted");
        }
        trace!(target: "etch.undo", depth = self.past.len(), "record pushed");
    }

    /// Moves the most recent record from `past` to `future` and returns a
    /// copy of it, or `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<EditRecord> {
        let record = self.past.pop_back()?;
        self.future.push(record.clone());
        trace!(target: "etch.undo", depth = self.past.len(), "undo pop");
        Some(record)
    }

    /// Moves the most recent record from `future` back to `past` and
    /// returns a copy of it, or `None` when there is nothing to redo.
    pub fn redo(&mut self) -> Option<EditRecord> {
        let record = self.future.pop()?;
        self.past.push_back(record.clone());
        trace!(target: "etch.undo", depth = self.past.len(), "redo pop");
        Some(record)
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Empties both directions.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}

impl Default for UndoLog {
    fn default() -> Self {
        Self::new()
    }
}
