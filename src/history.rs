//! Undo/redo history over snapshots of the object sequence.
//!
//! DESIGN
//! ======
//! History only ever sees the object sequence. Viewport, selection and
//! clipboard are never captured, so undo never moves the camera or empties
//! the clipboard. Snapshots are shared `Arc`s: recording compares handles
//! with `Arc::ptr_eq`, never contents, and storing an entry is one refcount.
//!
//! Recording has two states, ARMED (default) and PAUSED. `pause`/`resume`
//! are the only transitions. Remote-origin updates and composite operations
//! run while PAUSED; the board container offers scoped helpers so callers
//! cannot forget to resume.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::collections::VecDeque;
use std::sync::Arc;

use crate::doc::BoardObject;

/// Immutable, shareable snapshot of a board's object sequence.
pub type Snapshot = Arc<Vec<BoardObject>>;

/// Whether history records sequence changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Recording {
    #[default]
    Armed,
    Paused,
}

/// Bounded two-stack history.
#[derive(Debug)]
pub struct History {
    past: VecDeque<Snapshot>,
    future: Vec<Snapshot>,
    max_depth: usize,
    recording: Recording,
}

impl History {
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self { past: VecDeque::new(), future: Vec::new(), max_depth, recording: Recording::Armed }
    }

    /// Observe a sequence change from `previous` to `current`.
    ///
    /// Pushes `previous` when recording is armed and the handle actually
    /// changed. Returns whether an entry was recorded.
    pub fn record(&mut self, previous: &Snapshot, current: &Snapshot) -> bool {
        if self.recording == Recording::Paused || Arc::ptr_eq(previous, current) {
            return false;
        }
        self.push(Arc::clone(previous));
        true
    }

    /// Push an entry unconditionally (composite operations commit their
    /// pre-operation snapshot this way). Clears the redo stack.
    pub fn push(&mut self, entry: Snapshot) {
        self.future.clear();
        self.push_past(entry);
    }

    fn push_past(&mut self, entry: Snapshot) {
        self.past.push_back(entry);
        while self.past.len() > self.max_depth {
            self.past.pop_front();
        }
    }

    /// Step back. Returns the snapshot to restore, having moved `current` onto the redo stack.
    pub fn undo(&mut self, current: &Snapshot) -> Option<Snapshot> {
        let entry = self.past.pop_back()?;
        self.future.push(Arc::clone(current));
        Some(entry)
    }

    /// Step forward. Returns the snapshot to restore, having moved `current` onto the undo stack.
    pub fn redo(&mut self, current: &Snapshot) -> Option<Snapshot> {
        let entry = self.future.pop()?;
        self.push_past(Arc::clone(current));
        Some(entry)
    }

    pub fn pause(&mut self) {
        self.recording = Recording::Paused;
    }

    pub fn resume(&mut self) {
        self.recording = Recording::Armed;
    }

    #[must_use]
    pub fn recording(&self) -> Recording {
        self.recording
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.recording == Recording::Paused
    }

    /// Forget everything. Used when switching boards.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    #[must_use]
    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    #[must_use]
    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}
