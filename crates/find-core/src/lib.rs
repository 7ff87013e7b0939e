#![warn(missing_docs)]
//! find-core - Headless Search-and-Replace Engine for Code Editors
//!
//! # Overview
//!
//! `find-core` is the search subsystem of a code-editing widget, extracted
//! into a toolkit-agnostic crate. It keeps an in-document search consistent
//! with a live, concurrently edited buffer: searches run debounced on a
//! background thread against an immutable snapshot, results land in a
//! thread-safe occurrence index in one atomic swap, and replacements correct
//! the remaining positions analytically instead of re-searching.
//!
//! The embedding editor (the "host") is reached through the narrow
//! [`EditorHost`] trait: snapshots, selection, single-range replacement,
//! highlight decorations, and text-change notifications. Everything
//! widget-shaped - panels, buttons, shortcuts, painting - stays on the host
//! side.
//!
//! # Core pieces
//!
//! - [`JobRunner`] - single-worker background executor with debouncing and
//!   last-write-wins coalescing, so typing in a search field triggers one
//!   scan, not one per keystroke
//! - [`OccurrenceIndex`] - mutex-guarded list of match positions plus the
//!   current-occurrence cursor, with remove-and-shift offset correction
//! - [`SearchEngine`] - orchestration: request debouncing, the background
//!   scan pass, highlight redraw, next/previous navigation, and
//!   single/all replacement
//! - [`MemoryHost`] - reference rope-backed host for tests, examples, and
//!   headless embedders
//!
//! # Quick start
//!
//! Scanning text directly:
//!
//! ```rust
//! use find_core::{find_all, Occurrence, SearchOptions};
//!
//! let matches = find_all("foo bar foo baz foo", "foo", SearchOptions::default()).unwrap();
//! assert_eq!(
//!     matches,
//!     vec![
//!         Occurrence::new(0, 3),
//!         Occurrence::new(8, 11),
//!         Occurrence::new(16, 19),
//!     ]
//! );
//! ```
//!
//! Driving a full engine requires a host behind an `Arc<Mutex<_>>`; see
//! `examples/find_replace_session.rs` for an end-to-end session.
//!
//! # Concurrency model
//!
//! One worker thread per engine. The UI-facing thread never blocks on the
//! worker; superseded requests are discarded before they start, so delivered
//! results always correspond to the most recently started pass. The
//! occurrence index is the only state shared between the worker and callers.

pub mod engine;
pub mod host;
pub mod memory;
pub mod occurrences;
pub mod runner;
pub mod search;

pub use engine::{DEFAULT_DEBOUNCE, SearchEngine, SearchFinished, SearchFinishedCallback};
pub use host::{
    EditorHost, HighlightId, HighlightStyle, TextChangedCallback, TextChangedEvent,
};
pub use memory::MemoryHost;
pub use occurrences::{Occurrence, OccurrenceIndex};
pub use runner::{CancelToken, JobRunner};
pub use search::{SearchError, SearchOptions, find_all};
