//! The seam between the engine and the embedding editor.
//!
//! The engine never talks to a widget toolkit. Everything it needs from the
//! surrounding editor goes through [`EditorHost`]: point-in-time text
//! snapshots, selection read/write, single-range replacement, highlight
//! decorations, and an edit notification the engine subscribes to so it can
//! re-run its search reactively.
//!
//! Hosts are expected to be driven from behind a `Mutex`; see
//! [`SearchEngine`](crate::engine::SearchEngine) for the threading contract.

use crate::occurrences::Occurrence;

/// Opaque handle for a highlight decoration created by a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HighlightId(pub u64);

/// An id-typed highlight style, resolved to concrete colors by the host.
///
/// The engine tags decorations with a style id and stays out of color
/// storage; hosts map ids to their own theme/property registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HighlightStyle(pub u32);

impl HighlightStyle {
    /// Style applied to every found occurrence.
    pub const SEARCH_MATCH: Self = Self(1);
    /// Style a host may use for the occurrence under the cursor.
    pub const CURRENT_MATCH: Self = Self(2);

    /// Create a new style id.
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Payload delivered to text-change subscribers.
///
/// The host builds the event *after* applying the edit, so the snapshot and
/// selection already reflect the new document state. Carrying the snapshot
/// in the event lets subscribers schedule background work without calling
/// back into the (possibly still locked) host.
#[derive(Debug, Clone)]
pub struct TextChangedEvent {
    /// Immutable copy of the document text after the edit.
    pub snapshot: String,
    /// The selection after the edit.
    pub selection: Occurrence,
}

/// Callback registered via [`EditorHost::subscribe_text_changed`].
pub type TextChangedCallback = Box<dyn Fn(&TextChangedEvent) + Send>;

/// The narrow editor interface the engine consumes.
///
/// All offsets are character offsets; ranges are half-open. Implementations
/// must invoke text-change callbacks synchronously after every text
/// mutation, and must not invoke them for pure selection changes.
pub trait EditorHost {
    /// Returns an immutable point-in-time copy of the document text.
    fn snapshot(&self) -> String;

    /// Returns the current cursor/selection range (a caret is an empty range).
    fn selection(&self) -> Occurrence;

    /// Select `range` in the editor.
    fn set_selection(&mut self, range: Occurrence);

    /// Replace exactly the text in `range` with `text`.
    fn replace_range(&mut self, range: Occurrence, text: &str);

    /// Add a highlight decoration over `range` and return its handle.
    fn add_highlight(&mut self, range: Occurrence, style: HighlightStyle) -> HighlightId;

    /// Remove a previously added highlight decoration.
    fn remove_highlight(&mut self, id: HighlightId);

    /// Subscribe to text-change notifications.
    fn subscribe_text_changed(&mut self, callback: TextChangedCallback);
}
