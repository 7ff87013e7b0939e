//! Occurrence bookkeeping shared between the search worker and its callers.
//!
//! [`OccurrenceIndex`] owns the list of match positions produced by the most
//! recent completed search, plus the index of the "current" occurrence the
//! user is navigating. It is the only state touched by both the background
//! worker and the UI-facing thread, so every read and write goes through one
//! internal mutex with the smallest possible critical section.
//!
//! Invariants held across every structural mutation:
//!
//! - the list is sorted ascending by `start` and non-overlapping
//! - the current index is `None` or strictly less than the list length
//! - a completed search replaces the whole list in one atomic swap; readers
//!   never observe a partially-written list

use std::sync::{Mutex, MutexGuard, PoisonError};

/// A matched range of the search query within document text.
///
/// Offsets are 0-based character offsets into the document; the range is
/// half-open, so `width = end - start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Occurrence {
    /// Inclusive start character offset.
    pub start: usize,
    /// Exclusive end character offset.
    pub end: usize,
}

impl Occurrence {
    /// Create a new occurrence range.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the width of the range in characters.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if the range is empty (a caret).
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    fn shifted(self, delta: isize) -> Self {
        Self {
            start: self.start.saturating_add_signed(delta),
            end: self.end.saturating_add_signed(delta),
        }
    }
}

#[derive(Debug, Default)]
struct IndexState {
    occurrences: Vec<Occurrence>,
    current: Option<usize>,
}

/// Thread-safe list of search occurrences plus the current-occurrence cursor.
#[derive(Debug, Default)]
pub struct OccurrenceIndex {
    state: Mutex<IndexState>,
}

impl OccurrenceIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, IndexState> {
        // A panicked search job must not wedge the index for the next pass.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Atomically replace the whole occurrence list and current cursor.
    ///
    /// `occurrences` must be sorted ascending by `start` and non-overlapping;
    /// a `current` outside the list is stored as `None`.
    pub fn install(&self, occurrences: Vec<Occurrence>, current: Option<usize>) {
        let mut state = self.lock();
        state.current = current.filter(|&i| i < occurrences.len());
        state.occurrences = occurrences;
    }

    /// Drop every occurrence and clear the current cursor.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.occurrences.clear();
        state.current = None;
    }

    /// Returns a defensive copy of the occurrence list.
    pub fn occurrences(&self) -> Vec<Occurrence> {
        self.lock().occurrences.clone()
    }

    /// Returns the number of occurrences.
    pub fn len(&self) -> usize {
        self.lock().occurrences.len()
    }

    /// Returns `true` if the index holds no occurrences.
    pub fn is_empty(&self) -> bool {
        self.lock().occurrences.is_empty()
    }

    /// Returns the index of the current occurrence, if any.
    pub fn current(&self) -> Option<usize> {
        self.lock().current
    }

    /// Set the current occurrence index. `None` means "no selection".
    pub fn set_current(&self, current: Option<usize>) {
        self.lock().current = current;
    }

    /// Returns the occurrence at `index`, or `None` if out of range.
    ///
    /// Callers that computed `index` outside the lock must treat `None` as
    /// "nothing to select": the list may have shrunk in between.
    pub fn get(&self, index: usize) -> Option<Occurrence> {
        self.lock().occurrences.get(index).copied()
    }

    /// Advance the current cursor forward with wraparound and return the new
    /// index: no selection or last occurrence wraps to 0, otherwise +1.
    pub fn step_forward(&self) -> usize {
        let mut state = self.lock();
        if state.occurrences.is_empty() {
            state.current = None;
            return 0;
        }
        let last = state.occurrences.len() - 1;
        let next = match state.current {
            Some(i) if i < last => i + 1,
            _ => 0,
        };
        state.current = Some(next);
        next
    }

    /// Step the current cursor backward with wraparound and return the new
    /// index: no selection or first occurrence wraps to the last, otherwise -1.
    pub fn step_backward(&self) -> usize {
        let mut state = self.lock();
        if state.occurrences.is_empty() {
            state.current = None;
            return 0;
        }
        let last = state.occurrences.len() - 1;
        let prev = match state.current {
            Some(i) if i > 0 => i - 1,
            _ => last,
        };
        state.current = Some(prev);
        prev
    }

    /// Remove the occurrence at `index` and shift every later occurrence by
    /// `delta` characters.
    ///
    /// This is the analytic position correction applied after a replacement:
    /// the removed range was mutated in place, so everything strictly to its
    /// right drifts by the length difference of the replacement. Earlier
    /// occurrences are untouched. Out-of-range indices are a no-op.
    pub fn remove_and_shift(&self, index: usize, delta: isize) {
        let mut state = self.lock();
        if index >= state.occurrences.len() {
            return;
        }
        state.occurrences.remove(index);
        for occ in state.occurrences.iter_mut().skip(index) {
            *occ = occ.shifted(delta);
        }
        if state.current.is_some_and(|c| c >= state.occurrences.len()) {
            state.current = None;
        }
    }
}
