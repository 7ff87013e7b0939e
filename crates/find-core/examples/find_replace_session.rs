//! End-to-end find/replace session against the in-memory reference host.
//!
//! Run with: cargo run --example find_replace_session

use find_core::{MemoryHost, SearchEngine, SearchFinished, SearchOptions};
use std::sync::{Arc, Mutex, mpsc};
use std::time::Duration;

const SOURCE: &str = "\
fn total(items: &[u32]) -> u32 {
    let mut total = 0;
    for item in items {
        total += item;
    }
    total
}
";

fn main() {
    let host = Arc::new(Mutex::new(MemoryHost::new(SOURCE)));
    let engine = SearchEngine::with_debounce(Arc::clone(&host), Duration::from_millis(10));

    // Completion events arrive on the worker thread; bridge them to main.
    let (tx, rx) = mpsc::channel::<SearchFinished>();
    engine.on_search_finished(move |finished| {
        let _ = tx.send(*finished);
    });

    engine.set_options(SearchOptions {
        case_sensitive: true,
        whole_word: true,
    });
    engine.request_search(Some("total"));
    let finished = rx
        .recv_timeout(Duration::from_secs(2))
        .expect("search did not finish");

    println!("{} matches for \"total\":", finished.match_count);
    for occurrence in engine.occurrences() {
        println!("  [{}, {})", occurrence.start, occurrence.end);
    }

    println!("\nstepping through matches:");
    println!("  current: {:?}", engine.current_occurrence());
    for _ in 1..finished.match_count {
        engine.select_next();
        println!("  current: {:?}", engine.current_occurrence());
    }

    let replaced = engine.replace_all(Some("sum"));
    println!("\nreplaced {} occurrences:", replaced);
    println!("{}", host.lock().unwrap().text());
}
