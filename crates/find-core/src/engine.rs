//! Search-and-replace orchestration.
//!
//! [`SearchEngine`] ties the pieces together: it debounces search requests
//! through a [`JobRunner`], scans an immutable document snapshot on the
//! worker thread, publishes results into an [`OccurrenceIndex`] with one
//! atomic swap, and drives selection, highlighting, and replacement against
//! the host editor.
//!
//! # Threading contract
//!
//! One engine is bound to one host/document pair. The host lives behind an
//! `Arc<Mutex<_>>` shared with the embedder; engine methods lock it for
//! short critical sections and must not be called while the caller already
//! holds that lock. The completion notification (and the highlight redraw
//! preceding it) runs on the worker thread.
//!
//! The engine re-runs its search reactively after every host edit, except
//! for edits it performs itself during replacement: those correct occurrence
//! positions analytically instead, so the user never loses their place.

use crate::host::{EditorHost, HighlightId, HighlightStyle, TextChangedEvent};
use crate::occurrences::{Occurrence, OccurrenceIndex};
use crate::runner::JobRunner;
use crate::search::{self, SearchOptions};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

/// Debounce window applied to search requests unless overridden.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Payload delivered to completion listeners after every finished search
/// (including the explicit clear performed for an empty query).
#[derive(Debug, Clone, Copy)]
pub struct SearchFinished {
    /// Number of occurrences found.
    pub match_count: usize,
    /// Index of the current occurrence after auto-advance, if any.
    pub current: Option<usize>,
}

/// Callback registered via [`SearchEngine::on_search_finished`].
pub type SearchFinishedCallback = Box<dyn Fn(&SearchFinished) + Send>;

#[derive(Debug, Clone)]
struct EngineState {
    query: String,
    replacement: String,
    options: SearchOptions,
}

struct EngineInner<H: EditorHost> {
    host: Arc<Mutex<H>>,
    index: OccurrenceIndex,
    runner: JobRunner,
    state: Mutex<EngineState>,
    highlights: Mutex<Vec<HighlightId>>,
    suppress_reactive: AtomicBool,
    listeners: Mutex<Vec<SearchFinishedCallback>>,
}

/// An incremental, cancellable search-and-replace engine bound to one host.
pub struct SearchEngine<H: EditorHost> {
    inner: Arc<EngineInner<H>>,
}

impl<H: EditorHost> Clone for SearchEngine<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H: EditorHost> std::fmt::Debug for SearchEngine<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchEngine")
            .field("match_count", &self.inner.index.len())
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<H: EditorHost + Send + 'static> SearchEngine<H> {
    /// Create an engine for `host` with the default debounce window.
    ///
    /// The caller must not hold the host lock: the engine subscribes to the
    /// host's text-change notifications during construction.
    pub fn new(host: Arc<Mutex<H>>) -> Self {
        Self::with_debounce(host, DEFAULT_DEBOUNCE)
    }

    /// Create an engine with an explicit debounce window.
    pub fn with_debounce(host: Arc<Mutex<H>>, debounce: Duration) -> Self {
        let inner = Arc::new(EngineInner {
            host: Arc::clone(&host),
            index: OccurrenceIndex::new(),
            runner: JobRunner::new(Some(debounce)),
            state: Mutex::new(EngineState {
                query: String::new(),
                replacement: String::new(),
                options: SearchOptions::default(),
            }),
            highlights: Mutex::new(Vec::new()),
            suppress_reactive: AtomicBool::new(false),
            listeners: Mutex::new(Vec::new()),
        });

        // Weak subscription: dropping the engine must not be kept alive by
        // the host, and vice versa.
        let weak: Weak<EngineInner<H>> = Arc::downgrade(&inner);
        lock(&host).subscribe_text_changed(Box::new(move |event: &TextChangedEvent| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if inner.suppress_reactive.load(Ordering::SeqCst) {
                return;
            }
            let engine = SearchEngine { inner };
            engine.schedule_from_event(event);
        }));

        Self { inner }
    }

    /// Register a completion listener.
    ///
    /// Listeners run on the worker thread after every finished search pass,
    /// and on the calling thread for the explicit empty-query clear.
    pub fn on_search_finished<F>(&self, listener: F)
    where
        F: Fn(&SearchFinished) + Send + 'static,
    {
        lock(&self.inner.listeners).push(Box::new(listener));
    }

    /// Returns the active search options.
    pub fn options(&self) -> SearchOptions {
        lock(&self.inner.state).options
    }

    /// Set the search options used by subsequent requests.
    pub fn set_options(&self, options: SearchOptions) {
        lock(&self.inner.state).options = options;
    }

    /// Returns the stored query text.
    pub fn query(&self) -> String {
        lock(&self.inner.state).query.clone()
    }

    /// Returns the stored replacement text.
    pub fn replacement_text(&self) -> String {
        lock(&self.inner.state).replacement.clone()
    }

    /// Set the replacement text used when [`Self::replace_current`] and
    /// [`Self::replace_all`] are called without an explicit argument.
    pub fn set_replacement_text(&self, text: &str) {
        lock(&self.inner.state).replacement = text.to_string();
    }

    /// Request a search.
    ///
    /// `Some(query)` stores the query first; `None` reuses the stored one.
    /// An empty query explicitly clears results, highlights, and pending
    /// work, then fires the completion notification with zero matches. A
    /// non-empty query captures a snapshot, the current selection, and the
    /// live options now, and submits a debounced background pass.
    pub fn request_search(&self, query: Option<&str>) {
        let (query, options) = {
            let mut state = lock(&self.inner.state);
            if let Some(q) = query {
                state.query = q.to_string();
            }
            (state.query.clone(), state.options)
        };

        if query.is_empty() {
            self.inner.runner.cancel_requests();
            self.inner.runner.stop_job();
            self.inner.index.clear();
            self.finish_search();
            return;
        }

        let (snapshot, origin) = {
            let host = lock(&self.inner.host);
            (host.snapshot(), host.selection())
        };
        self.schedule_scan(query, options, snapshot, origin);
    }

    /// Seed the query from the host's current selection and search for it.
    ///
    /// An empty (caret) selection clears results, like an empty query.
    pub fn search_selection(&self) {
        let selected = {
            let host = lock(&self.inner.host);
            let sel = host.selection();
            let snapshot = host.snapshot();
            snapshot
                .chars()
                .skip(sel.start)
                .take(sel.len())
                .collect::<String>()
        };
        self.request_search(Some(&selected));
    }

    /// Cancel pending and in-flight work (e.g. when the search UI loses
    /// focus). Best-effort and non-blocking.
    pub fn cancel_pending(&self) {
        self.inner.runner.cancel_requests();
        self.inner.runner.stop_job();
    }

    /// Returns a defensive copy of the current occurrence list.
    pub fn occurrences(&self) -> Vec<Occurrence> {
        self.inner.index.occurrences()
    }

    /// Returns the number of occurrences found by the last search.
    pub fn match_count(&self) -> usize {
        self.inner.index.len()
    }

    /// Returns the current occurrence range, if one is selected.
    pub fn current_occurrence(&self) -> Option<Occurrence> {
        let index = self.inner.index.current()?;
        self.inner.index.get(index)
    }

    /// Select the next occurrence, wrapping past the end.
    ///
    /// Returns `false` if there was nothing to select. The indexed read is
    /// re-validated after the wraparound step: the list may have shrunk in
    /// between, and that must degrade to "nothing to select", not a panic.
    pub fn select_next(&self) -> bool {
        let index = self.inner.index.step_forward();
        self.select_occurrence(index)
    }

    /// Select the previous occurrence, wrapping past the start.
    ///
    /// Returns `false` if there was nothing to select.
    pub fn select_previous(&self) -> bool {
        let index = self.inner.index.step_backward();
        self.select_occurrence(index)
    }

    fn select_occurrence(&self, index: usize) -> bool {
        let Some(occurrence) = self.inner.index.get(index) else {
            return false;
        };
        lock(&self.inner.host).set_selection(occurrence);
        true
    }

    /// Replace the current occurrence.
    ///
    /// `Some(text)` replaces with `text`; `None` uses the stored replacement
    /// text. If no occurrence is current, the first one is selected and
    /// replaced. Remaining occurrence positions are corrected analytically
    /// by the replacement's length difference (later occurrences only), and
    /// the following occurrence becomes current. The engine's reactive
    /// re-search stays suppressed for the duration of the edit.
    ///
    /// Returns `false` when no occurrence remained to replace.
    pub fn replace_current(&self, text: Option<&str>) -> bool {
        let replacement = match text {
            Some(t) => t.to_string(),
            None => lock(&self.inner.state).replacement.clone(),
        };

        if self.inner.index.current().is_none() {
            self.select_next();
        }
        let Some(current) = self.inner.index.current() else {
            return false;
        };
        let Some(occurrence) = self.inner.index.get(current) else {
            return false;
        };

        let replacement_len = replacement.chars().count();
        let delta = replacement_len as isize - occurrence.len() as isize;

        // The edit below must not trigger a reactive re-search: positions
        // are corrected analytically instead.
        self.inner.suppress_reactive.store(true, Ordering::SeqCst);
        {
            let mut host = lock(&self.inner.host);
            host.replace_range(occurrence, &replacement);
            host.set_selection(Occurrence::new(
                occurrence.start,
                occurrence.start + replacement_len,
            ));
        }
        self.inner.suppress_reactive.store(false, Ordering::SeqCst);

        self.inner.index.remove_and_shift(current, delta);
        self.inner.index.set_current(current.checked_sub(1));
        self.select_next();
        true
    }

    /// Replace every remaining occurrence, in ascending-position order, and
    /// return how many were replaced.
    ///
    /// This is a sequential loop over [`Self::replace_current`]: each step
    /// mutates the host text and corrects the remaining positions
    /// analytically. The replacement text is never re-scanned mid-loop, so a
    /// replacement containing the query does not yield new occurrences until
    /// the next full search.
    pub fn replace_all(&self, text: Option<&str>) -> usize {
        let mut replaced = 0;
        while self.replace_current(text) {
            replaced += 1;
        }
        replaced
    }

    /// Reactive path: a host edit happened outside the engine.
    fn schedule_from_event(&self, event: &TextChangedEvent) {
        let (query, options) = {
            let state = lock(&self.inner.state);
            (state.query.clone(), state.options)
        };
        if query.is_empty() {
            return;
        }
        self.schedule_scan(query, options, event.snapshot.clone(), event.selection);
    }

    fn schedule_scan(
        &self,
        query: String,
        options: SearchOptions,
        snapshot: String,
        origin: Occurrence,
    ) {
        let weak = Arc::downgrade(&self.inner);
        self.inner.runner.request_job(true, move |token| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            match search::scan(&snapshot, &query, options, token) {
                Ok(Some(occurrences)) => {
                    let current = occurrences.iter().position(|occ| *occ == origin);
                    inner.index.install(occurrences, current);
                    let engine = SearchEngine { inner };
                    engine.finish_search();
                }
                // Stopped mid-pass: results are stale, keep the prior list.
                Ok(None) => {}
                // Scan failures stay inside the worker; the index is untouched.
                Err(_) => {}
            }
        });
    }

    /// Post-pass bookkeeping: redraw highlights, auto-advance so a hit is
    /// always selected, and notify listeners.
    fn finish_search(&self) {
        let occurrences = self.inner.index.occurrences();
        {
            let mut host = lock(&self.inner.host);
            let mut handles = lock(&self.inner.highlights);
            for handle in handles.drain(..) {
                host.remove_highlight(handle);
            }
            for occurrence in &occurrences {
                handles.push(host.add_highlight(*occurrence, HighlightStyle::SEARCH_MATCH));
            }
        }

        if self.inner.index.current().is_none() && !occurrences.is_empty() {
            self.select_next();
        }

        let finished = SearchFinished {
            match_count: self.inner.index.len(),
            current: self.inner.index.current(),
        };
        for listener in lock(&self.inner.listeners).iter() {
            listener(&finished);
        }
    }
}
