use find_core::JobRunner;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const DEBOUNCE: Duration = Duration::from_millis(50);

fn runner() -> JobRunner {
    JobRunner::new(Some(DEBOUNCE))
}

/// Polls `predicate` until it holds or the timeout elapses.
fn wait_until(timeout: Duration, predicate: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if predicate() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    predicate()
}

#[test]
fn test_debounce_coalesces_to_most_recent() {
    let runner = runner();
    let executed = Arc::new(Mutex::new(Vec::<u32>::new()));

    for arg in [1u32, 2, 3] {
        let executed = Arc::clone(&executed);
        runner.request_job(true, move |_| {
            executed.lock().unwrap().push(arg);
        });
    }

    assert!(wait_until(Duration::from_secs(2), || {
        !executed.lock().unwrap().is_empty()
    }));
    // Give a superseded job a chance to (wrongly) run as well.
    std::thread::sleep(DEBOUNCE * 3);
    assert_eq!(*executed.lock().unwrap(), vec![3]);
}

#[test]
fn test_non_debounced_job_runs_promptly() {
    let runner = runner();
    let ran = Arc::new(AtomicUsize::new(0));
    let ran_in_job = Arc::clone(&ran);
    runner.request_job(false, move |_| {
        ran_in_job.fetch_add(1, Ordering::SeqCst);
    });
    // No debounce window applies: well under the configured delay would
    // also pass, but allow scheduling slack.
    assert!(wait_until(Duration::from_millis(100), || {
        ran.load(Ordering::SeqCst) == 1
    }));
}

#[test]
fn test_cancel_requests_drops_pending_job() {
    let runner = runner();
    let ran = Arc::new(AtomicUsize::new(0));
    let ran_in_job = Arc::clone(&ran);
    runner.request_job(true, move |_| {
        ran_in_job.fetch_add(1, Ordering::SeqCst);
    });
    runner.cancel_requests();

    std::thread::sleep(DEBOUNCE * 4);
    assert_eq!(ran.load(Ordering::SeqCst), 0);
}

#[test]
fn test_submissions_during_execution_keep_only_newest() {
    let runner = runner();
    let executed = Arc::new(Mutex::new(Vec::<&'static str>::new()));

    let executed_long = Arc::clone(&executed);
    runner.request_job(false, move |_| {
        std::thread::sleep(Duration::from_millis(150));
        executed_long.lock().unwrap().push("long");
    });
    // Queued while the long job runs; only "c" may execute.
    std::thread::sleep(Duration::from_millis(30));
    for name in ["a", "b", "c"] {
        let executed = Arc::clone(&executed);
        runner.request_job(false, move |_| {
            executed.lock().unwrap().push(name);
        });
    }

    assert!(wait_until(Duration::from_secs(2), || {
        executed.lock().unwrap().len() == 2
    }));
    std::thread::sleep(Duration::from_millis(100));
    assert_eq!(*executed.lock().unwrap(), vec!["long", "c"]);
}

#[test]
fn test_stop_job_raises_the_cancel_token() {
    let runner = runner();
    let outcome = Arc::new(Mutex::new(None::<bool>));

    let outcome_in_job = Arc::clone(&outcome);
    runner.request_job(false, move |token| {
        let started = Instant::now();
        while !token.is_cancelled() && started.elapsed() < Duration::from_secs(2) {
            std::thread::sleep(Duration::from_millis(5));
        }
        *outcome_in_job.lock().unwrap() = Some(token.is_cancelled());
    });

    std::thread::sleep(Duration::from_millis(50));
    runner.stop_job();

    assert!(wait_until(Duration::from_secs(3), || {
        outcome.lock().unwrap().is_some()
    }));
    assert_eq!(*outcome.lock().unwrap(), Some(true));
}

#[test]
fn test_worker_survives_a_panicking_job() {
    let runner = runner();
    runner.request_job(false, |_| panic!("scan exploded"));

    let ran = Arc::new(AtomicUsize::new(0));
    let ran_in_job = Arc::clone(&ran);
    runner.request_job(false, move |_| {
        ran_in_job.fetch_add(1, Ordering::SeqCst);
    });

    assert!(wait_until(Duration::from_secs(2), || {
        ran.load(Ordering::SeqCst) == 1
    }));
}

#[test]
fn test_fresh_job_starts_with_a_clean_token() {
    let runner = runner();
    runner.stop_job();

    let cancelled = Arc::new(Mutex::new(None::<bool>));
    let cancelled_in_job = Arc::clone(&cancelled);
    runner.request_job(false, move |token| {
        *cancelled_in_job.lock().unwrap() = Some(token.is_cancelled());
    });

    assert!(wait_until(Duration::from_secs(2), || {
        cancelled.lock().unwrap().is_some()
    }));
    assert_eq!(*cancelled.lock().unwrap(), Some(false));
}
