//! Event types and the out-of-lock dispatcher.
//!
//! Every mutation notifies subscribers through a single channel drained by
//! a dedicated dispatcher thread, so listeners always run outside the
//! buffer lock and observe events in per-buffer order.
//!
//! # Design
//!
//! We use `std::sync::mpsc` because:
//! - the buffer is the only producer, the dispatcher thread the only
//!   consumer, so a FIFO channel gives the ordering guarantee for free;
//! - `Sender` is `Send`, so emission works from whichever thread holds
//!   the buffer;
//! - dropping the sender ends the dispatcher thread cleanly when the
//!   buffer is dropped.
//!
//! Listener snapshots travel with each event: the subscriber table is read
//! under the shared lock, the lock is released, and only then does the
//! dispatcher invoke anyone. A listener may therefore call back into the
//! buffer freely; it runs on the dispatcher thread, not the mutating one.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;

use etch_buffer::{Position, Range};

use crate::undo::EditOp;

/// The event classes a listener can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    TextChanged,
    CursorMoved,
    SelectionChanged,
    LanguageChanged,
    ModifiedChanged,
    FilePathChanged,
}

/// A notification delivered to subscribers.
///
/// `CursorMoved` and `SelectionChanged` are never produced by the engine
/// itself; they exist as conduits for host UIs (see
/// [`crate::TextBuffer::notify_cursor_moved`]).
#[derive(Debug, Clone)]
pub enum BufferEvent {
    TextChanged {
        position: Position,
        text: String,
        old_text: String,
        operation: EditOp,
    },
    CursorMoved {
        old_position: Position,
        new_position: Position,
    },
    SelectionChanged {
        old_range: Range,
        new_range: Range,
    },
    LanguageChanged {
        language_id: String,
    },
    ModifiedChanged(bool),
    FilePathChanged {
        old_path: Option<PathBuf>,
        new_path: Option<PathBuf>,
    },
}

impl BufferEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            BufferEvent::TextChanged { .. } => EventKind::TextChanged,
            BufferEvent::CursorMoved { .. } => EventKind::CursorMoved,
            BufferEvent::SelectionChanged { .. } => EventKind::SelectionChanged,
            BufferEvent::LanguageChanged { .. } => EventKind::LanguageChanged,
            BufferEvent::ModifiedChanged(_) => EventKind::ModifiedChanged,
            BufferEvent::FilePathChanged { .. } => EventKind::FilePathChanged,
        }
    }
}

/// A subscriber callback. Shared so snapshots are cheap to take.
pub type Listener = Arc<dyn Fn(&BufferEvent) + Send + Sync + 'static>;

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Per-kind listener registry. Lives inside the buffer lock.
#[derive(Default)]
pub(crate) struct SubscriberTable {
    next_id: u64,
    entries: HashMap<EventKind, Vec<(SubscriptionId, Listener)>>,
}

impl SubscriberTable {
    pub fn subscribe(&mut self, kind: EventKind, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.entry(kind).or_default().push((id, listener));
        id
    }

    /// Removes the subscription; returns false if the id was unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for listeners in self.entries.values_mut() {
            if let Some(index) = listeners.iter().position(|(l, _)| *l == id) {
                listeners.remove(index);
                return true;
            }
        }
        false
    }

    /// Copies out the listeners registered for `kind`.
    pub fn snapshot(&self, kind: EventKind) -> Vec<Listener> {
        self.entries
            .get(&kind)
            .map(|listeners| listeners.iter().map(|(_, l)| l.clone()).collect())
            .unwrap_or_default()
    }
}

struct DispatchJob {
    event: BufferEvent,
    listeners: Vec<Listener>,
}

/// Owns the dispatcher thread. One per buffer.
pub(crate) struct EventDispatcher {
    sender: Option<Sender<DispatchJob>>,
    handle: Option<JoinHandle<()>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel::<DispatchJob>();
        let handle = std::thread::Builder::new()
            .name("etch-events".to_string())
            .spawn(move || {
                while let Ok(job) = receiver.recv() {
                    for listener in &job.listeners {
                        listener(&job.event);
                    }
                }
            })
            .expect("failed to spawn event dispatcher thread");

        Self {
            sender: Some(sender),
            handle: Some(handle),
        }
    }

    /// Queues `event` for delivery to the snapshotted `listeners`.
    pub fn dispatch(&self, event: BufferEvent, listeners: Vec<Listener>) {
        if listeners.is_empty() {
            return;
        }
        if let Some(sender) = &self.sender {
            // A send failure means the dispatcher is gone (shutdown); the
            // event is dropped, matching the no-subscribers case.
            let _ = sender.send(DispatchJob { event, listeners });
        }
    }
}

impl Drop for EventDispatcher {
    fn drop(&mut self) {
        // Close the channel first so the thread's recv loop ends, then
        // wait for in-flight deliveries to finish.
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
