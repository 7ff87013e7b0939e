use find_core::{EditorHost, MemoryHost, Occurrence, SearchEngine, SearchFinished};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex, mpsc};
use std::time::Duration;

const DEBOUNCE: Duration = Duration::from_millis(20);
const FINISH_TIMEOUT: Duration = Duration::from_secs(2);

type Setup = (
    Arc<Mutex<MemoryHost>>,
    SearchEngine<MemoryHost>,
    Receiver<SearchFinished>,
);

fn setup_with_search(text: &str, query: &str) -> Setup {
    let host = Arc::new(Mutex::new(MemoryHost::new(text)));
    let engine = SearchEngine::with_debounce(Arc::clone(&host), DEBOUNCE);
    let (tx, rx) = mpsc::channel();
    engine.on_search_finished(move |finished| {
        let _ = tx.send(*finished);
    });
    engine.request_search(Some(query));
    rx.recv_timeout(FINISH_TIMEOUT).expect("search never finished");
    (host, engine, rx)
}

fn occ(start: usize, end: usize) -> Occurrence {
    Occurrence::new(start, end)
}

#[test]
fn test_replace_current_same_length() {
    let (host, engine, _rx) = setup_with_search("foo bar foo baz foo", "foo");

    assert!(engine.replace_current(Some("qux")));

    assert_eq!(host.lock().unwrap().text(), "qux bar foo baz foo");
    // Equal-length replacement: later occurrences keep their positions.
    assert_eq!(engine.occurrences(), vec![occ(8, 11), occ(16, 19)]);
    assert_eq!(engine.match_count(), 2);
    // The following match became current and selected.
    assert_eq!(engine.current_occurrence(), Some(occ(8, 11)));
    assert_eq!(host.lock().unwrap().selection(), occ(8, 11));
}

#[test]
fn test_replace_current_longer_shifts_later_occurrences() {
    let (host, engine, _rx) = setup_with_search("foo bar foo baz foo", "foo");

    assert!(engine.replace_current(Some("foobar")));

    assert_eq!(host.lock().unwrap().text(), "foobar bar foo baz foo");
    assert_eq!(engine.occurrences(), vec![occ(11, 14), occ(19, 22)]);
}

#[test]
fn test_replace_current_shorter_shifts_later_occurrences() {
    let (host, engine, _rx) = setup_with_search("foo bar foo baz foo", "foo");

    assert!(engine.replace_current(Some("f")));

    assert_eq!(host.lock().unwrap().text(), "f bar foo baz foo");
    assert_eq!(engine.occurrences(), vec![occ(6, 9), occ(14, 17)]);
}

#[test]
fn test_replace_respects_the_current_occurrence() {
    let (host, engine, _rx) = setup_with_search("foo bar foo baz foo", "foo");
    assert!(engine.select_next()); // move from the first hit to the second

    assert!(engine.replace_current(Some("qux")));

    assert_eq!(host.lock().unwrap().text(), "foo bar qux baz foo");
    assert_eq!(engine.occurrences(), vec![occ(0, 3), occ(16, 19)]);
    // The occurrence that took the removed slot's position is now current.
    assert_eq!(engine.current_occurrence(), Some(occ(16, 19)));
}

#[test]
fn test_replace_uses_stored_replacement_text() {
    let (host, engine, _rx) = setup_with_search("foo bar foo", "foo");
    engine.set_replacement_text("yak");

    assert!(engine.replace_current(None));
    assert_eq!(host.lock().unwrap().text(), "yak bar foo");
}

#[test]
fn test_replace_with_nothing_found_fails() {
    let (_host, engine, _rx) = setup_with_search("foo bar", "quux");
    assert!(!engine.replace_current(Some("x")));
}

#[test]
fn test_replace_all() {
    let (host, engine, _rx) = setup_with_search("foo bar foo baz foo", "foo");

    assert_eq!(engine.replace_all(Some("qux")), 3);

    assert_eq!(host.lock().unwrap().text(), "qux bar qux baz qux");
    assert_eq!(engine.match_count(), 0);
    assert!(!engine.replace_current(Some("qux")));
}

#[test]
fn test_replace_all_with_growing_replacement() {
    let (host, engine, _rx) = setup_with_search("a-a-a", "a");

    assert_eq!(engine.replace_all(Some("aaa")), 3);
    assert_eq!(host.lock().unwrap().text(), "aaa-aaa-aaa");
}

#[test]
fn test_replace_all_terminates_when_replacement_contains_query() {
    // Positions are corrected analytically, never re-scanned mid-loop, so a
    // replacement containing the query cannot make the loop run forever.
    let (host, engine, _rx) = setup_with_search("foo foo", "foo");

    assert_eq!(engine.replace_all(Some("food")), 2);
    assert_eq!(host.lock().unwrap().text(), "food food");
    assert_eq!(engine.match_count(), 0);
}

#[test]
fn test_replacement_does_not_trigger_reactive_research() {
    let (_host, engine, rx) = setup_with_search("foo bar foo baz foo", "foo");

    assert!(engine.replace_current(Some("food")));
    assert_eq!(engine.match_count(), 2);

    // A reactive pass would find "foo" inside "food" again and bump the
    // count back to 3. None may run.
    match rx.recv_timeout(DEBOUNCE * 5) {
        Err(RecvTimeoutError::Timeout) => {}
        other => panic!("replacement triggered a re-search: {:?}", other),
    }
    assert_eq!(engine.match_count(), 2);
}

#[test]
fn test_external_edit_triggers_reactive_research() {
    let (host, engine, rx) = setup_with_search("foo bar foo", "foo");
    assert_eq!(engine.match_count(), 2);

    host.lock().unwrap().insert(0, "foo ");

    let finished = rx.recv_timeout(FINISH_TIMEOUT).expect("no reactive pass ran");
    assert_eq!(finished.match_count, 3);
    assert_eq!(
        engine.occurrences(),
        vec![occ(0, 3), occ(4, 7), occ(12, 15)]
    );
}

#[test]
fn test_replace_without_prior_search_fails() {
    let host = Arc::new(Mutex::new(MemoryHost::new("foo bar")));
    let engine = SearchEngine::with_debounce(Arc::clone(&host), DEBOUNCE);

    assert!(!engine.replace_current(Some("x")));
    assert_eq!(engine.replace_all(Some("x")), 0);
    assert_eq!(host.lock().unwrap().text(), "foo bar");
}
