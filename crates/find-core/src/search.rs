//! Literal text search over a document snapshot.
//!
//! Queries are plain strings, never patterns: they are escaped and compiled
//! into a [`regex::Regex`] so that case-insensitive matching uses proper
//! Unicode case folding instead of byte comparison. All public inputs and
//! outputs use **character offsets** (not byte offsets), matching the
//! occurrence data model of the rest of the crate.
//!
//! Supported query modes:
//!
//! - plain substring search
//! - case-insensitive search
//! - whole-word matching (word characters are alphanumerics and `_`)

use crate::occurrences::Occurrence;
use crate::runner::CancelToken;
use regex::RegexBuilder;

/// How often the scan loop polls its cancellation token, in accepted matches.
const CANCEL_POLL_STRIDE: usize = 256;

/// Options that control how a search pass matches text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// If `true`, performs a case-sensitive search.
    pub case_sensitive: bool,
    /// If `true`, matches only whole words (alphanumeric and `_`).
    pub whole_word: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            whole_word: false,
        }
    }
}

/// Search errors.
#[derive(Debug)]
pub enum SearchError {
    /// The query could not be compiled into a matcher.
    ///
    /// Queries are escaped before compilation, so this only occurs for
    /// degenerate inputs (e.g. queries exceeding the matcher's size limit).
    Query(regex::Error),
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Query(err) => write!(f, "query cannot be compiled: {}", err),
        }
    }
}

impl std::error::Error for SearchError {}

fn compile_query(query: &str, options: SearchOptions) -> Result<regex::Regex, SearchError> {
    RegexBuilder::new(&regex::escape(query))
        .case_insensitive(!options.case_sensitive)
        .multi_line(true)
        .build()
        .map_err(SearchError::Query)
}

fn is_word_char(ch: char) -> bool {
    ch == '_' || ch.is_alphanumeric()
}

/// Whole-word check on a byte-offset match range.
///
/// A match qualifies when neither the character immediately before `start`
/// nor the one at `end` is a word character.
fn on_word_boundary(text: &str, start_byte: usize, end_byte: usize) -> bool {
    let before = text[..start_byte].chars().next_back();
    let after = text[end_byte..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

/// Byte offset of the character boundary just past `at`.
fn past_char(text: &str, at: usize) -> usize {
    at + text[at..].chars().next().map_or(1, char::len_utf8)
}

/// Shared scan loop. `poll` is consulted once every [`CANCEL_POLL_STRIDE`]
/// candidates; returning `true` abandons the pass, yielding `Ok(None)`.
///
/// Accepted matches are non-overlapping and ascending: the scan resumes past
/// the end of each one, so `"aa"` in `"aaa"` yields a single occurrence. A
/// candidate rejected by the whole-word filter only advances the scan past
/// its *start*: a query containing a non-word character can have a valid
/// whole-word match overlapping the rejected span (`"a a"` in `"ba a a"`),
/// and that match must still be found. Byte offsets from the matcher are
/// converted to character offsets with a running counter, which stays O(n)
/// over the whole pass.
fn collect_matches(
    text: &str,
    query: &str,
    options: SearchOptions,
    mut poll: impl FnMut() -> bool,
) -> Result<Option<Vec<Occurrence>>, SearchError> {
    if query.is_empty() {
        return Ok(Some(Vec::new()));
    }

    let re = compile_query(query, options)?;
    let mut occurrences: Vec<Occurrence> = Vec::new();
    let mut chars_seen = 0usize;
    let mut bytes_seen = 0usize;
    let mut pos = 0usize;
    let mut candidates = 0usize;

    while pos <= text.len() {
        let Some(m) = re.find_at(text, pos) else {
            break;
        };
        if candidates % CANCEL_POLL_STRIDE == 0 && poll() {
            return Ok(None);
        }
        candidates += 1;

        // Match starts never move backward, so the counter only advances.
        chars_seen += text[bytes_seen..m.start()].chars().count();
        bytes_seen = m.start();

        if options.whole_word && !on_word_boundary(text, m.start(), m.end()) {
            pos = past_char(text, m.start());
            continue;
        }

        let end = chars_seen + text[m.start()..m.end()].chars().count();
        occurrences.push(Occurrence::new(chars_seen, end));
        pos = m.end();
    }

    Ok(Some(occurrences))
}

/// Find every occurrence of `query` in `text`.
///
/// - Returns an empty list if `query` is empty.
/// - Occurrences are character-offset, half-open (`[start, end)`), sorted
///   ascending by `start`, and non-overlapping.
pub fn find_all(
    text: &str,
    query: &str,
    options: SearchOptions,
) -> Result<Vec<Occurrence>, SearchError> {
    // The poll closure never requests cancellation, so the pass always completes.
    Ok(collect_matches(text, query, options, || false)?.unwrap_or_default())
}

/// Cancellable variant of [`find_all`] used by the background search pass.
///
/// Returns `Ok(None)` when `cancel` was raised mid-scan; the partial results
/// are discarded.
pub(crate) fn scan(
    text: &str,
    query: &str,
    options: SearchOptions,
    cancel: &CancelToken,
) -> Result<Option<Vec<Occurrence>>, SearchError> {
    collect_matches(text, query, options, || cancel.is_cancelled())
}
