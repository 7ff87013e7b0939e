//! Reference in-memory host backed by a [`ropey::Rope`].
//!
//! [`MemoryHost`] is a headless buffer implementing [`EditorHost`]. It backs
//! the crate's own tests and examples and is usable as a starting point for
//! embedders that keep document text outside a widget toolkit. The rope is
//! char-indexed, which lines up directly with the engine's character-offset
//! data model.

use crate::host::{EditorHost, HighlightId, HighlightStyle, TextChangedCallback, TextChangedEvent};
use crate::occurrences::Occurrence;
use ropey::Rope;
use std::collections::HashMap;

/// A rope-backed in-memory editor host.
pub struct MemoryHost {
    text: Rope,
    selection: Occurrence,
    highlights: HashMap<HighlightId, (Occurrence, HighlightStyle)>,
    next_highlight: u64,
    listeners: Vec<TextChangedCallback>,
}

impl std::fmt::Debug for MemoryHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryHost")
            .field("len_chars", &self.text.len_chars())
            .field("selection", &self.selection)
            .field("highlights", &self.highlights.len())
            .finish_non_exhaustive()
    }
}

impl MemoryHost {
    /// Create a host holding `text`, with the caret at the start.
    pub fn new(text: &str) -> Self {
        Self {
            text: Rope::from_str(text),
            selection: Occurrence::new(0, 0),
            highlights: HashMap::new(),
            next_highlight: 0,
            listeners: Vec::new(),
        }
    }

    /// Returns the full document text.
    pub fn text(&self) -> String {
        self.text.to_string()
    }

    /// Returns the document length in characters.
    pub fn len_chars(&self) -> usize {
        self.text.len_chars()
    }

    /// Replace the whole document, clearing highlights and the selection.
    pub fn set_text(&mut self, text: &str) {
        self.text = Rope::from_str(text);
        self.selection = Occurrence::new(0, 0);
        self.highlights.clear();
        self.notify_changed();
    }

    /// Insert `text` at character offset `at`, as an ordinary user edit.
    pub fn insert(&mut self, at: usize, text: &str) {
        let at = at.min(self.text.len_chars());
        self.text.insert(at, text);
        self.notify_changed();
    }

    /// Returns active highlights sorted by range start.
    pub fn highlight_ranges(&self) -> Vec<(Occurrence, HighlightStyle)> {
        let mut out: Vec<_> = self.highlights.values().copied().collect();
        out.sort();
        out
    }

    fn clamp(&self, range: Occurrence) -> Occurrence {
        let len = self.text.len_chars();
        let start = range.start.min(len);
        Occurrence::new(start, range.end.clamp(start, len))
    }

    fn notify_changed(&self) {
        let event = TextChangedEvent {
            snapshot: self.text(),
            selection: self.selection,
        };
        for listener in &self.listeners {
            listener(&event);
        }
    }
}

impl EditorHost for MemoryHost {
    fn snapshot(&self) -> String {
        self.text()
    }

    fn selection(&self) -> Occurrence {
        self.selection
    }

    fn set_selection(&mut self, range: Occurrence) {
        self.selection = self.clamp(range);
    }

    fn replace_range(&mut self, range: Occurrence, text: &str) {
        let range = self.clamp(range);
        self.text.remove(range.start..range.end);
        self.text.insert(range.start, text);
        self.notify_changed();
    }

    fn add_highlight(&mut self, range: Occurrence, style: HighlightStyle) -> HighlightId {
        let id = HighlightId(self.next_highlight);
        self.next_highlight += 1;
        self.highlights.insert(id, (range, style));
        id
    }

    fn remove_highlight(&mut self, id: HighlightId) {
        self.highlights.remove(&id);
    }

    fn subscribe_text_changed(&mut self, callback: TextChangedCallback) {
        self.listeners.push(callback);
    }
}
