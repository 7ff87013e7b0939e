//! Debounced single-worker background job executor.
//!
//! [`JobRunner`] owns one worker thread and feeds it jobs over an `mpsc`
//! channel, so it stays runtime-agnostic (no async runtime required). It is
//! designed for "re-run on every keystroke" workloads:
//!
//! - **Debounce**: a debounced submission only runs after a quiet period of
//!   no newer submissions; rapid repeats coalesce down to the most recent
//!   one (last-write-wins).
//! - **At-most-one-pending, at-most-one-running**: submissions that arrive
//!   while a job executes are queued but only the newest survives; older
//!   queued jobs are dropped without ever starting.
//! - **Cancellation**: [`JobRunner::cancel_requests`] drops pending work,
//!   [`JobRunner::stop_job`] raises a cooperative [`CancelToken`] that the
//!   running job may poll at safe points. Neither call blocks.
//!
//! Panics inside a job are contained at the runner boundary: the worker
//! thread survives and serves the next request. Job outcomes are therefore
//! only observable through whatever completion signal the job itself emits.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Cooperative cancellation token handed to every executing job.
///
/// Cancellation is advisory: a job that never polls the token simply runs to
/// completion.
#[derive(Debug, Clone)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Returns `true` once [`JobRunner::stop_job`] has been called for the
    /// job holding this token.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

type Job = Box<dyn FnOnce(&CancelToken) + Send + 'static>;

enum WorkerMsg {
    Run { job: Job, deadline: Option<Instant> },
    CancelPending,
    Shutdown,
}

/// A single-worker background task executor with optional debouncing.
pub struct JobRunner {
    tx: mpsc::Sender<WorkerMsg>,
    stop_flag: Arc<AtomicBool>,
    delay: Option<Duration>,
    worker: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for JobRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobRunner")
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

impl JobRunner {
    /// Create a runner. `delay` is the debounce window applied to debounced
    /// submissions; `None` disables debouncing entirely.
    pub fn new(delay: Option<Duration>) -> Self {
        let (tx, rx) = mpsc::channel::<WorkerMsg>();
        let stop_flag = Arc::new(AtomicBool::new(false));
        let worker_flag = Arc::clone(&stop_flag);
        let worker = thread::spawn(move || worker_loop(rx, worker_flag));
        Self {
            tx,
            stop_flag,
            delay,
            worker: Some(worker),
        }
    }

    /// Schedule `job` on the worker.
    ///
    /// With `debounce` set (and a delay configured), execution is deferred
    /// until the debounce window elapses without a newer submission; each
    /// newer debounced submission restarts the window and replaces the
    /// pending job. Without `debounce`, the job is submitted immediately,
    /// replacing any job that is queued but not yet started. The job that is
    /// currently executing is never affected.
    pub fn request_job<F>(&self, debounce: bool, job: F)
    where
        F: FnOnce(&CancelToken) + Send + 'static,
    {
        let deadline = if debounce {
            self.delay.map(|d| Instant::now() + d)
        } else {
            None
        };
        let _ = self.tx.send(WorkerMsg::Run {
            job: Box::new(job),
            deadline,
        });
    }

    /// Discard any pending (not-yet-started) job and disarm a live debounce
    /// window. Does not interrupt a job already executing.
    pub fn cancel_requests(&self) {
        let _ = self.tx.send(WorkerMsg::CancelPending);
    }

    /// Request cooperative cancellation of the currently executing job.
    ///
    /// Fire-and-forget: this sets the job's [`CancelToken`] and returns
    /// without waiting for the job to notice.
    pub fn stop_job(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }
}

impl Drop for JobRunner {
    fn drop(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
        let _ = self.tx.send(WorkerMsg::Shutdown);
        if let Some(worker) = self.worker.take() {
            // A job may hold the last reference to the runner's owner, in
            // which case this drop runs on the worker thread itself. The
            // loop still exits on the shutdown message; it must be detached
            // rather than self-joined.
            if worker.thread().id() != thread::current().id() {
                let _ = worker.join();
            }
        }
    }
}

fn worker_loop(rx: mpsc::Receiver<WorkerMsg>, stop_flag: Arc<AtomicBool>) {
    'serve: loop {
        let Ok(msg) = rx.recv() else {
            break;
        };
        let (mut pending, mut deadline) = match msg {
            WorkerMsg::Run { job, deadline } => (Some(job), deadline),
            WorkerMsg::CancelPending => continue,
            WorkerMsg::Shutdown => break,
        };

        // Coalesce everything that queued up while the previous job ran:
        // only the newest submission survives.
        loop {
            match rx.try_recv() {
                Ok(WorkerMsg::Run { job, deadline: d }) => {
                    pending = Some(job);
                    deadline = d;
                }
                Ok(WorkerMsg::CancelPending) => {
                    pending = None;
                    deadline = None;
                }
                Ok(WorkerMsg::Shutdown) => break 'serve,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        // Debounce window: keep absorbing newer submissions until the
        // newest deadline passes quietly.
        while let Some(due) = deadline {
            let now = Instant::now();
            if now >= due {
                break;
            }
            match rx.recv_timeout(due - now) {
                Ok(WorkerMsg::Run { job, deadline: d }) => {
                    pending = Some(job);
                    deadline = d;
                }
                Ok(WorkerMsg::CancelPending) => {
                    pending = None;
                    deadline = None;
                }
                Ok(WorkerMsg::Shutdown) => break 'serve,
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        let Some(job) = pending else {
            continue;
        };

        stop_flag.store(false, Ordering::SeqCst);
        let token = CancelToken {
            flag: Arc::clone(&stop_flag),
        };
        // Contain job panics; the worker must stay available.
        let _ = catch_unwind(AssertUnwindSafe(|| job(&token)));
    }
}
