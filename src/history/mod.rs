//! Linear undo/redo over editor snapshots.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::editor::source::ImageMeta;
use crate::foundation::raster::Raster;
use crate::layers::manager::LayerManager;

/// Default number of retained entries.
pub const DEFAULT_LIMIT: usize = 50;

/// Everything needed to put the editor back into a previous state.
///
/// Rasters are shared through `Arc`, so consecutive snapshots of an unchanged base cost one
/// pointer each.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub base: Option<Arc<Raster>>,
    pub original: Option<Arc<Raster>>,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub layers: LayerManager,
    pub meta: ImageMeta,
}

impl Snapshot {
    /// Whether restoring `self` over `other` changes the base pixels.
    pub fn base_differs(&self, other: Option<&Arc<Raster>>) -> bool {
        match (&self.base, other) {
            (Some(a), Some(b)) => !Arc::ptr_eq(a, b),
            (None, None) => false,
            _ => true,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HistoryEntry<T> {
    pub reason: String,
    pub state: T,
}

/// Bounded history stack with a cursor pointing at the entry that matches the current state.
///
/// Invariants: `cursor < len` whenever the stack is non-empty, and `len <= limit`.
#[derive(Clone, Debug)]
pub struct HistoryManager<T> {
    entries: VecDeque<HistoryEntry<T>>,
    cursor: usize,
    limit: usize,
    restoring: bool,
}

impl<T> Default for HistoryManager<T> {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT)
    }
}

impl<T> HistoryManager<T> {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: 0,
            limit: limit.max(1),
            restoring: false,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cursor position, `None` while empty.
    pub fn cursor(&self) -> Option<usize> {
        (!self.entries.is_empty()).then_some(self.cursor)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn current(&self) -> Option<&HistoryEntry<T>> {
        self.entries.get(self.cursor)
    }

    pub fn is_restoring(&self) -> bool {
        self.restoring
    }

    /// While set, [`push`](Self::push) is a no-op.
    pub fn set_restoring(&mut self, restoring: bool) {
        self.restoring = restoring;
    }

    /// Record `state` after the cursor, discarding any redo branch. Returns `false` when
    /// suppressed by an ongoing restore.
    pub fn push(&mut self, reason: impl Into<String>, state: T) -> bool {
        if self.restoring {
            return false;
        }
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push_back(HistoryEntry {
            reason: reason.into(),
            state,
        });
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len() - 1;
        true
    }

    /// Step back; returns the entry now current.
    pub fn undo(&mut self) -> Option<&HistoryEntry<T>> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward; returns the entry now current.
    pub fn redo(&mut self) -> Option<&HistoryEntry<T>> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }

    /// Reason labels, oldest first.
    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.reason.as_str()).collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry<T>> {
        self.entries.iter()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/history/history.rs"]
mod tests;
