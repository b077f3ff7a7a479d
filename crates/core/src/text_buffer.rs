//! The public text buffer: concurrency, history, search, EOL policy,
//! persistence, and event fan-out over the storage layer.
//!
//! A single reader/writer lock protects the whole state (store, undo log,
//! tag fields, subscription table). Operations appear to take effect at a
//! single instant between lock acquisition and release; events are always
//! dispatched after the lock is dropped, through the per-buffer dispatcher
//! thread, so listeners never run under the lock.

use std::fs;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use etch_buffer::{Position, Range, TextStore};
use tracing::debug;

use crate::eol::EolType;
use crate::error::{Error, Result};
use crate::events::{BufferEvent, EventDispatcher, EventKind, SubscriberTable, SubscriptionId};
use crate::language::language_for_path;
use crate::search::{self, Matcher, SearchOptions};
use crate::undo::{EditOp, EditRecord, UndoLog};

/// Edits above this many scalars are not recorded in the undo log; the
/// whole log is dropped instead so history never pins huge strings.
const UNDO_CAPTURE_LIMIT: usize = 1024 * 1024;

/// Buffers above this many scalars take the chunked replace and
/// persistence paths.
const LARGE_TEXT_THRESHOLD: usize = 10 * 1024 * 1024;

/// Chunk size for streaming file I/O and chunked text assembly.
const IO_CHUNK_SIZE: usize = 1024 * 1024;

/// Everything the buffer lock protects.
struct BufferState {
    store: TextStore,
    history: UndoLog,
    eol: EolType,
    language_id: String,
    file_path: Option<PathBuf>,
    modified: bool,
    subscribers: SubscriberTable,
}

/// A shareable, mutable, undo/redo-capable Unicode text buffer.
///
/// All methods take `&self`; parallel threads may share one instance
/// directly or behind an `Arc`. Readers take the shared lock, writers the
/// exclusive one.
///
/// # Example
///
/// ```
/// use etch_core::{Position, Range, TextBuffer};
///
/// let buffer = TextBuffer::new();
/// buffer.insert(Position::new(0, 0), "Hello, World!").unwrap();
/// assert_eq!(buffer.text(), "Hello, World!");
///
/// buffer
///     .delete(Range::new(Position::new(0, 5), Position::new(0, 12)))
///     .unwrap();
/// assert_eq!(buffer.text(), "Hello!");
///
/// buffer.undo().unwrap();
/// assert_eq!(buffer.text(), "Hello, World!");
/// ```
pub struct TextBuffer {
    state: RwLock<BufferState>,
    dispatcher: EventDispatcher,
}

fn scalar_len(text: &str) -> usize {
    text.chars().count()
}

/// Appends the store range `[start, end)` to `dst` one chunk at a time.
fn append_chunks(store: &TextStore, dst: &mut String, start: usize, end: usize) {
    let mut offset = start;
    while offset < end {
        let next = (offset + IO_CHUNK_SIZE).min(end);
        dst.push_str(&store.text_in_range(offset, next));
        offset = next;
    }
}

impl TextBuffer {
    /// Creates an empty buffer with Unix line endings.
    pub fn new() -> Self {
        Self::with_text("")
    }

    /// Creates a buffer holding `text`, with the EOL tag detected from it.
    pub fn with_text(text: &str) -> Self {
        Self {
            state: RwLock::new(BufferState {
                store: TextStore::from_str(text),
                history: UndoLog::new(),
                eol: EolType::detect(text),
                language_id: "plaintext".to_string(),
                file_path: None,
                modified: false,
                subscribers: SubscriberTable::default(),
            }),
            dispatcher: EventDispatcher::new(),
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, BufferState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, BufferState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshots the listeners for `event` under the shared lock, then
    /// queues delivery outside it.
    fn emit(&self, event: BufferEvent) {
        let listeners = self.read_state().subscribers.snapshot(event.kind());
        self.dispatcher.dispatch(event, listeners);
    }

    // ==================== Reads ====================

    /// Returns the full content.
    pub fn text(&self) -> String {
        self.read_state().store.text()
    }

    /// Returns the total scalar count.
    pub fn len(&self) -> usize {
        self.read_state().store.len()
    }

    /// Returns true if the buffer holds no text.
    pub fn is_empty(&self) -> bool {
        self.read_state().store.is_empty()
    }

    /// Returns the number of lines (at least 1).
    pub fn line_count(&self) -> usize {
        self.read_state().store.line_count()
    }

    /// Returns the given line including its terminating `'\n'` if present;
    /// empty string when out of range.
    pub fn line_content(&self, line: usize) -> String {
        self.read_state().store.line_content(line)
    }

    /// Returns every line, as by [`TextBuffer::line_content`].
    pub fn lines(&self) -> Vec<String> {
        self.read_state().store.lines()
    }

    /// Returns the text spanned by `range` (positions clamped).
    pub fn text_in_range(&self, range: Range) -> String {
        let st = self.read_state();
        let start = st.store.offset_at(range.start);
        let end = st.store.offset_at(range.end);
        st.store.text_in_range(start, end)
    }

    /// Converts an absolute offset (clamped to `[0, len]`) to a position.
    pub fn position_at(&self, offset: usize) -> Position {
        self.read_state().store.position_at(offset)
    }

    /// Converts a position (clamped) to an absolute offset.
    pub fn offset_at(&self, position: Position) -> usize {
        self.read_state().store.offset_at(position)
    }

    // ==================== Editing ====================

    /// Inserts `text` at `position`. An empty string is a successful no-op
    /// with no undo record and no event.
    pub fn insert(&self, position: Position, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        let event = {
            let mut st = self.write_state();
            let offset = st.store.offset_at(position);
            // Record the clamped position so inversion resolves to the
            // exact offset this edit used.
            let position = st.store.position_at(offset);
            if scalar_len(text) > UNDO_CAPTURE_LIMIT {
                st.history.clear();
                debug!(target: "etch.buffer", "insert exceeds undo capture limit, history dropped");
            } else {
                st.history.push(EditRecord::Insert {
                    position,
                    text: text.to_string(),
                });
            }
            st.store.insert(offset, text);
            st.modified = true;
            BufferEvent::TextChanged {
                position,
                text: text.to_string(),
                old_text: String::new(),
                operation: EditOp::Insert,
            }
        };
        self.emit(event);
        Ok(())
    }

    /// Deletes the text spanned by `range`.
    ///
    /// An empty or inverted range fails with [`Error::InvalidRange`].
    pub fn delete(&self, range: Range) -> Result<()> {
        let event = {
            let mut st = self.write_state();
            let start = st.store.offset_at(range.start);
            let end = st.store.offset_at(range.end);
            if start >= end {
                return Err(Error::InvalidRange);
            }
            let position = st.store.position_at(start);
            let old_text = if end - start > UNDO_CAPTURE_LIMIT {
                st.history.clear();
                debug!(target: "etch.buffer", "delete exceeds undo capture limit, history dropped");
                String::new()
            } else {
                let old = st.store.text_in_range(start, end);
                st.history.push(EditRecord::Delete {
                    position,
                    text: old.clone(),
                });
                old
            };
            st.store.delete(start, end);
            st.modified = true;
            BufferEvent::TextChanged {
                position,
                text: String::new(),
                old_text,
                operation: EditOp::Delete,
            }
        };
        self.emit(event);
        Ok(())
    }

    /// Replaces the text spanned by `range` with `text`.
    ///
    /// `start > end` fails with [`Error::InvalidRange`]; an empty range
    /// behaves as an insert.
    pub fn replace(&self, range: Range, text: &str) -> Result<()> {
        let event = {
            let mut st = self.write_state();
            let start = st.store.offset_at(range.start);
            let end = st.store.offset_at(range.end);
            if start > end {
                return Err(Error::InvalidRange);
            }
            let position = st.store.position_at(start);
            let old_text = if end - start > UNDO_CAPTURE_LIMIT || scalar_len(text) > UNDO_CAPTURE_LIMIT
            {
                st.history.clear();
                debug!(target: "etch.buffer", "replace exceeds undo capture limit, history dropped");
                String::new()
            } else {
                let old = st.store.text_in_range(start, end);
                st.history.push(EditRecord::Replace {
                    position,
                    text: text.to_string(),
                    old_text: old.clone(),
                });
                old
            };
            st.store.delete(start, end);
            st.store.insert(start, text);
            st.modified = true;
            BufferEvent::TextChanged {
                position,
                text: text.to_string(),
                old_text,
                operation: EditOp::Replace,
            }
        };
        self.emit(event);
        Ok(())
    }

    /// Empties the buffer.
    pub fn clear(&self) {
        let event = {
            let mut st = self.write_state();
            let old_text = if st.store.len() > UNDO_CAPTURE_LIMIT {
                st.history.clear();
                String::new()
            } else {
                let old = st.store.text();
                st.history.push(EditRecord::Clear {
                    old_text: old.clone(),
                });
                old
            };
            st.store.clear();
            st.modified = true;
            BufferEvent::TextChanged {
                position: Position::default(),
                text: String::new(),
                old_text,
                operation: EditOp::Clear,
            }
        };
        self.emit(event);
    }

    /// Replaces the whole content with `text`, re-detecting the EOL tag.
    pub fn set_text(&self, text: &str) {
        let event = {
            let mut st = self.write_state();
            let old_text = if st.store.len() > UNDO_CAPTURE_LIMIT
                || scalar_len(text) > UNDO_CAPTURE_LIMIT
            {
                st.history.clear();
                String::new()
            } else {
                let old = st.store.text();
                st.history.push(EditRecord::SetText {
                    text: text.to_string(),
                    old_text: old.clone(),
                });
                old
            };
            st.store.set_text(text);
            st.eol = EolType::detect(text);
            st.modified = true;
            BufferEvent::TextChanged {
                position: Position::default(),
                text: text.to_string(),
                old_text,
                operation: EditOp::SetText,
            }
        };
        self.emit(event);
    }

    // ==================== Undo / redo ====================

    pub fn can_undo(&self) -> bool {
        self.read_state().history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.read_state().history.can_redo()
    }

    /// Reverts the most recent edit. Fails with [`Error::NoHistory`] when
    /// the past is empty.
    ///
    /// Undoing counts as a change: the modified flag is set, and a
    /// `TextChanged` event tagged with the original operation is emitted.
    pub fn undo(&self) -> Result<()> {
        let event = {
            let mut st = self.write_state();
            let record = st.history.undo().ok_or(Error::NoHistory)?;
            let event = match &record {
                EditRecord::Insert { position, text } => {
                    let start = st.store.offset_at(*position);
                    st.store.delete(start, start + scalar_len(text));
                    BufferEvent::TextChanged {
                        position: *position,
                        text: String::new(),
                        old_text: text.clone(),
                        operation: EditOp::Insert,
                    }
                }
                EditRecord::Delete { position, text } => {
                    let offset = st.store.offset_at(*position);
                    st.store.insert(offset, text);
                    BufferEvent::TextChanged {
                        position: *position,
                        text: text.clone(),
                        old_text: String::new(),
                        operation: EditOp::Delete,
                    }
                }
                EditRecord::Replace {
                    position,
                    text,
                    old_text,
                } => {
                    let start = st.store.offset_at(*position);
                    st.store.delete(start, start + scalar_len(text));
                    st.store.insert(start, old_text);
                    BufferEvent::TextChanged {
                        position: *position,
                        text: old_text.clone(),
                        old_text: text.clone(),
                        operation: EditOp::Replace,
                    }
                }
                EditRecord::Clear { old_text } => {
                    st.store.insert(0, old_text);
                    BufferEvent::TextChanged {
                        position: Position::default(),
                        text: old_text.clone(),
                        old_text: String::new(),
                        operation: EditOp::Clear,
                    }
                }
                EditRecord::SetText { text, old_text } => {
                    st.store.set_text(old_text);
                    BufferEvent::TextChanged {
                        position: Position::default(),
                        text: old_text.clone(),
                        old_text: text.clone(),
                        operation: EditOp::SetText,
                    }
                }
            };
            st.modified = true;
            event
        };
        self.emit(event);
        Ok(())
    }

    /// Reapplies the most recently undone edit. Fails with
    /// [`Error::NoHistory`] when the future is empty.
    pub fn redo(&self) -> Result<()> {
        let event = {
            let mut st = self.write_state();
            let record = st.history.redo().ok_or(Error::NoHistory)?;
            let event = match &record {
                EditRecord::Insert { position, text } => {
                    let offset = st.store.offset_at(*position);
                    st.store.insert(offset, text);
                    BufferEvent::TextChanged {
                        position: *position,
                        text: text.clone(),
                        old_text: String::new(),
                        operation: EditOp::Insert,
                    }
                }
                EditRecord::Delete { position, text } => {
                    let start = st.store.offset_at(*position);
                    st.store.delete(start, start + scalar_len(text));
                    BufferEvent::TextChanged {
                        position: *position,
                        text: String::new(),
                        old_text: text.clone(),
                        operation: EditOp::Delete,
                    }
                }
                EditRecord::Replace {
                    position,
                    text,
                    old_text,
                } => {
                    let start = st.store.offset_at(*position);
                    st.store.delete(start, start + scalar_len(old_text));
                    st.store.insert(start, text);
                    BufferEvent::TextChanged {
                        position: *position,
                        text: text.clone(),
                        old_text: old_text.clone(),
                        operation: EditOp::Replace,
                    }
                }
                EditRecord::Clear { old_text } => {
                    st.store.clear();
                    BufferEvent::TextChanged {
                        position: Position::default(),
                        text: String::new(),
                        old_text: old_text.clone(),
                        operation: EditOp::Clear,
                    }
                }
                EditRecord::SetText { text, old_text } => {
                    st.store.set_text(text);
                    BufferEvent::TextChanged {
                        position: Position::default(),
                        text: text.clone(),
                        old_text: old_text.clone(),
                        operation: EditOp::SetText,
                    }
                }
            };
            st.modified = true;
            event
        };
        self.emit(event);
        Ok(())
    }

    // ==================== Search / replace ====================

    /// Finds the first match at or after `from`, wrapping around to the
    /// start of the buffer when the tail holds none.
    pub fn find_next(
        &self,
        needle: &str,
        from: Position,
        options: &SearchOptions,
    ) -> Result<Range> {
        let matcher = search::build(needle, options)?;
        let st = self.read_state();
        let text = st.store.text();
        let from_offset = st.store.offset_at(from);
        let (start, end) = search::find_from(&text, &matcher, from_offset)
            .or_else(|| search::find_from(&text, &matcher, 0))
            .ok_or(Error::NotFound)?;
        Ok(Range::new(
            st.store.position_at(start),
            st.store.position_at(end),
        ))
    }

    /// Finds the last match ending at or before `from`, wrapping around to
    /// the end of the buffer when the head holds none.
    pub fn find_previous(
        &self,
        needle: &str,
        from: Position,
        options: &SearchOptions,
    ) -> Result<Range> {
        let matcher = search::build(needle, options)?;
        let st = self.read_state();
        let text = st.store.text();
        let before = st.store.offset_at(from);
        let len = st.store.len();
        let (start, end) = search::find_last_before(&text, &matcher, before)
            .or_else(|| search::find_last_before(&text, &matcher, len))
            .ok_or(Error::NotFound)?;
        Ok(Range::new(
            st.store.position_at(start),
            st.store.position_at(end),
        ))
    }

    /// Replaces every non-overlapping match of `needle` with `replacement`
    /// and returns the number of replacements.
    ///
    /// Zero matches fail with [`Error::NotFound`]; a bad pattern fails
    /// with [`Error::InvalidPattern`] and leaves the buffer untouched.
    /// Above the large-text threshold the scan streams through the store
    /// in chunks and the undo log is cleared instead of capturing the old
    /// text.
    pub fn replace_all(
        &self,
        needle: &str,
        replacement: &str,
        options: &SearchOptions,
    ) -> Result<usize> {
        let matcher = search::build(needle, options)?;
        let (event, count) = {
            let mut st = self.write_state();
            let len = st.store.len();
            if len > LARGE_TEXT_THRESHOLD {
                let matches = match &matcher {
                    Matcher::Plain {
                        needle,
                        fold,
                        whole_word,
                    } => search::find_all_scalars(st.store.chars(), needle, *fold, *whole_word),
                    Matcher::Pattern { .. } => {
                        let text = st.store.text();
                        search::find_all(&text, &matcher)
                    }
                };
                if matches.is_empty() {
                    return Err(Error::NotFound);
                }
                let mut new_text = String::with_capacity(len);
                let mut prev = 0;
                for &(start, end) in &matches {
                    append_chunks(&st.store, &mut new_text, prev, start);
                    new_text.push_str(replacement);
                    prev = end;
                }
                append_chunks(&st.store, &mut new_text, prev, len);

                st.history.clear();
                st.store.set_text(&new_text);
                st.modified = true;
                debug!(
                    target: "etch.buffer",
                    count = matches.len(),
                    "chunked replace-all, history dropped"
                );
                (
                    BufferEvent::TextChanged {
                        position: Position::default(),
                        text: new_text,
                        old_text: String::new(),
                        operation: EditOp::Replace,
                    },
                    matches.len(),
                )
            } else {
                let text = st.store.text();
                let matches = search::find_all(&text, &matcher);
                if matches.is_empty() {
                    return Err(Error::NotFound);
                }
                let chars: Vec<char> = text.chars().collect();
                let mut new_text = String::with_capacity(text.len());
                let mut prev = 0;
                for &(start, end) in &matches {
                    new_text.extend(&chars[prev..start]);
                    new_text.push_str(replacement);
                    prev = end;
                }
                new_text.extend(&chars[prev..]);

                st.history.push(EditRecord::Replace {
                    position: Position::default(),
                    text: new_text.clone(),
                    old_text: text.clone(),
                });
                st.store.set_text(&new_text);
                st.modified = true;
                (
                    BufferEvent::TextChanged {
                        position: Position::default(),
                        text: new_text,
                        old_text: text,
                        operation: EditOp::Replace,
                    },
                    matches.len(),
                )
            }
        };
        self.emit(event);
        Ok(count)
    }

    // ==================== EOL ====================

    /// Returns the current EOL tag.
    pub fn eol_type(&self) -> EolType {
        self.read_state().eol
    }

    /// Returns the current EOL tag's string form.
    pub fn eol_string(&self) -> &'static str {
        self.read_state().eol.as_str()
    }

    /// Normalises every line terminator in the buffer to `eol` and updates
    /// the tag.
    ///
    /// Recorded as a single whole-text replace. When the text already uses
    /// the target convention only the tag changes — no undo record, no
    /// event, no modified flag.
    pub fn set_eol_type(&self, eol: EolType) {
        let event = {
            let mut st = self.write_state();
            let old_text = st.store.text();
            let converted = eol.convert(&old_text);
            if converted == old_text {
                st.eol = eol;
                return;
            }
            let new_text = converted.into_owned();
            if scalar_len(&old_text) > UNDO_CAPTURE_LIMIT
                || scalar_len(&new_text) > UNDO_CAPTURE_LIMIT
            {
                st.history.clear();
            } else {
                st.history.push(EditRecord::Replace {
                    position: Position::default(),
                    text: new_text.clone(),
                    old_text: old_text.clone(),
                });
            }
            st.store.set_text(&new_text);
            st.eol = eol;
            st.modified = true;
            BufferEvent::TextChanged {
                position: Position::default(),
                text: new_text,
                old_text,
                operation: EditOp::Replace,
            }
        };
        self.emit(event);
    }

    // ==================== Persistence ====================

    /// Writes the buffer to `path` through a sibling temporary file and an
    /// atomic rename; the temporary is removed on any failure and the
    /// target is left untouched.
    ///
    /// Line terminators are produced according to the EOL tag. Large
    /// buffers stream out in chunks. The shared lock is held while
    /// writing, so concurrent readers proceed and the file reflects one
    /// consistent snapshot; the flag updates afterwards take the exclusive
    /// lock.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        {
            let st = self.read_state();
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => {
                    fs::create_dir_all(parent)?;
                    parent
                }
                _ => Path::new("."),
            };
            let mut tmp = tempfile::Builder::new()
                .prefix("temp_")
                .suffix(".txt")
                .tempfile_in(dir)?;
            let len = st.store.len();
            if len > LARGE_TEXT_THRESHOLD {
                let mut writer = BufWriter::with_capacity(IO_CHUNK_SIZE, tmp.as_file_mut());
                let mut offset = 0;
                while offset < len {
                    let mut next = (offset + IO_CHUNK_SIZE).min(len);
                    // Never split a "\r\n" pair across chunks; each chunk
                    // converts terminators independently.
                    if next < len
                        && st.store.char_at(next - 1) == Some('\r')
                        && st.store.char_at(next) == Some('\n')
                    {
                        next += 1;
                    }
                    let chunk = st.store.text_in_range(offset, next);
                    writer.write_all(st.eol.convert(&chunk).as_bytes())?;
                    offset = next;
                }
                writer.flush()?;
            } else {
                let text = st.store.text();
                tmp.as_file_mut().write_all(st.eol.convert(&text).as_bytes())?;
            }
            tmp.persist(path).map_err(|e| Error::Io(e.error))?;
            debug!(target: "etch.io", path = %path.display(), scalars = len, "buffer saved");
        }

        let events = {
            let mut st = self.write_state();
            let mut events = Vec::new();
            if st.file_path.as_deref() != Some(path) {
                let old_path = std::mem::replace(&mut st.file_path, Some(path.to_path_buf()));
                events.push(BufferEvent::FilePathChanged {
                    old_path,
                    new_path: Some(path.to_path_buf()),
                });
            }
            st.modified = false;
            events.push(BufferEvent::ModifiedChanged(false));
            events
        };
        for event in events {
            self.emit(event);
        }
        Ok(())
    }

    /// Writes the buffer to its associated file path.
    pub fn save(&self) -> Result<()> {
        let path = self.read_state().file_path.clone().ok_or_else(|| {
            Error::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "no file path associated with this buffer",
            ))
        })?;
        self.save_to_file(path)
    }

    /// Replaces the buffer content with the file at `path`.
    ///
    /// The EOL convention is detected, the in-memory text normalised to
    /// `'\n'`, the undo log cleared, and the language inferred from the
    /// file extension. On failure the buffer is left unchanged.
    pub fn load_from_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }

        let file = fs::File::open(path)?;
        let size = file.metadata()?.len() as usize;
        let bytes = if size > LARGE_TEXT_THRESHOLD {
            let mut reader = BufReader::with_capacity(IO_CHUNK_SIZE, file);
            let mut bytes = Vec::with_capacity(size);
            let mut chunk = vec![0u8; IO_CHUNK_SIZE];
            loop {
                let read = reader.read(&mut chunk)?;
                if read == 0 {
                    break;
                }
                bytes.extend_from_slice(&chunk[..read]);
            }
            bytes
        } else {
            drop(file);
            fs::read(path)?
        };
        let raw = String::from_utf8(bytes)
            .map_err(|e| Error::Io(io::Error::new(io::ErrorKind::InvalidData, e)))?;

        let eol = EolType::detect(&raw);
        let text = EolType::normalize(&raw);
        let language = language_for_path(path);
        debug!(
            target: "etch.io",
            path = %path.display(),
            bytes = raw.len(),
            language,
            "file loaded"
        );

        let events = {
            let mut st = self.write_state();
            st.store.set_text(&text);
            st.history.clear();
            st.eol = eol;
            let old_path = std::mem::replace(&mut st.file_path, Some(path.to_path_buf()));
            st.language_id = language.to_string();
            st.modified = false;
            vec![
                BufferEvent::FilePathChanged {
                    old_path,
                    new_path: Some(path.to_path_buf()),
                },
                BufferEvent::LanguageChanged {
                    language_id: language.to_string(),
                },
                BufferEvent::ModifiedChanged(false),
                BufferEvent::TextChanged {
                    position: Position::default(),
                    text: text.into_owned(),
                    old_text: String::new(),
                    operation: EditOp::SetText,
                },
            ]
        };
        for event in events {
            self.emit(event);
        }
        Ok(())
    }

    // ==================== Attributes ====================

    pub fn language_id(&self) -> String {
        self.read_state().language_id.clone()
    }

    /// Sets the language identifier, emitting `LanguageChanged` only when
    /// the value actually changes.
    pub fn set_language_id(&self, language_id: &str) {
        let event = {
            let mut st = self.write_state();
            if st.language_id == language_id {
                return;
            }
            st.language_id = language_id.to_string();
            BufferEvent::LanguageChanged {
                language_id: language_id.to_string(),
            }
        };
        self.emit(event);
    }

    pub fn file_path(&self) -> Option<PathBuf> {
        self.read_state().file_path.clone()
    }

    /// Associates the buffer with `path`, emitting `FilePathChanged` only
    /// when the value actually changes.
    pub fn set_file_path(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let event = {
            let mut st = self.write_state();
            if st.file_path.as_deref() == Some(path) {
                return;
            }
            let old_path = std::mem::replace(&mut st.file_path, Some(path.to_path_buf()));
            BufferEvent::FilePathChanged {
                old_path,
                new_path: Some(path.to_path_buf()),
            }
        };
        self.emit(event);
    }

    pub fn is_modified(&self) -> bool {
        self.read_state().modified
    }

    /// Sets the modified flag, emitting `ModifiedChanged` only when the
    /// value actually changes.
    pub fn set_modified(&self, modified: bool) {
        let event = {
            let mut st = self.write_state();
            if st.modified == modified {
                return;
            }
            st.modified = modified;
            BufferEvent::ModifiedChanged(modified)
        };
        self.emit(event);
    }

    // ==================== Events ====================

    /// Registers a listener for one event kind. The listener runs on the
    /// buffer's dispatcher thread, outside the lock, in emission order.
    pub fn subscribe(
        &self,
        kind: EventKind,
        listener: impl Fn(&BufferEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.write_state()
            .subscribers
            .subscribe(kind, std::sync::Arc::new(listener))
    }

    /// Removes a subscription; returns false if the id was unknown.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.write_state().subscribers.unsubscribe(id)
    }

    /// Host conduit: fans a `CursorMoved` event out to subscribers. The
    /// engine itself never moves a cursor.
    pub fn notify_cursor_moved(&self, old_position: Position, new_position: Position) {
        self.emit(BufferEvent::CursorMoved {
            old_position,
            new_position,
        });
    }

    /// Host conduit: fans a `SelectionChanged` event out to subscribers.
    pub fn notify_selection_changed(&self, old_range: Range, new_range: Range) {
        self.emit(BufferEvent::SelectionChanged {
            old_range,
            new_range,
        });
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}
