//! Bounded worker pool with index-ordered delivery.
//!
//! Layout of one run:
//!
//! ```text
//! dispatcher ──jobs──▶ worker × N ──outcomes──▶ collector (caller thread)
//!      ▲                                           │
//!      └──────────────── credits ──────────────────┘
//! ```
//!
//! - The dispatcher needs a credit per job, so at most `inflight` items exist
//!   between the source and the sink at any time.
//! - Workers finish in any order. The collector parks results in a table keyed
//!   by index and hands them to the sink strictly in index order.
//! - The first error of the run lands in a `FailureCell`. After that nothing new
//!   is scheduled, in-flight tasks finish, and their results are dropped.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::OnceLock;
use std::thread;

use crossbeam::channel::{bounded, unbounded, Receiver, Sender};
use log::{debug, warn};

use crate::stream::parallelism::ParallelismProfile;
use crate::types::{PipelineError, PipelineResult};

/// Work items that know their position in the stream.
pub trait Indexed {
    fn index(&self) -> u64;
}

/// Holds the first failure of a run. Later failures are dropped.
#[derive(Debug, Default)]
pub struct FailureCell {
    first: OnceLock<PipelineError>,
}

impl FailureCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if this call stored the error.
    pub fn record(&self, err: PipelineError) -> bool {
        match self.first.set(err) {
            Ok(()) => true,
            Err(later) => {
                debug!("[POOL] dropping later failure: {}", later);
                false
            }
        }
    }

    pub fn is_failed(&self) -> bool {
        self.first.get().is_some()
    }

    pub fn into_inner(self) -> Option<PipelineError> {
        self.first.into_inner()
    }
}

/// Index-addressed result table. Each index is filled at most once and
/// released only when every lower index has been released.
#[derive(Debug)]
pub struct ReorderBuffer<U> {
    next: u64,
    pending: BTreeMap<u64, U>,
}

impl<U> ReorderBuffer<U> {
    pub fn new() -> Self {
        Self {
            next: 0,
            pending: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, index: u64, item: U) -> PipelineResult<()> {
        if index < self.next || self.pending.contains_key(&index) {
            return Err(PipelineError::Internal(format!("chunk {} produced twice", index)));
        }
        self.pending.insert(index, item);
        Ok(())
    }

    /// Next item in index order, if it has arrived.
    pub fn pop_ready(&mut self) -> Option<U> {
        let item = self.pending.remove(&self.next)?;
        self.next += 1;
        Some(item)
    }

    /// Index the sink is waiting for.
    pub fn next_index(&self) -> u64 {
        self.next
    }

    pub fn parked(&self) -> usize {
        self.pending.len()
    }

    /// Drop everything parked; returns how many entries were dropped.
    pub fn clear(&mut self) -> usize {
        let n = self.pending.len();
        self.pending.clear();
        n
    }
}

impl<U> Default for ReorderBuffer<U> {
    fn default() -> Self {
        Self::new()
    }
}

enum Outcome<U> {
    Done(u64, U),
    Failed,
    Skipped,
}

pub struct TaskPool {
    profile: ParallelismProfile,
}

impl TaskPool {
    pub fn new(profile: ParallelismProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &ParallelismProfile {
        &self.profile
    }

    /// Run `task` over every item of `source` on the pool and feed the results
    /// to `sink` in index order. Returns how many results reached the sink.
    ///
    /// `source` must yield indices 0, 1, 2, ... with no gaps.
    pub fn run<T, U, S, F, K>(&self, source: S, task: F, mut sink: K) -> PipelineResult<u64>
    where
        T: Indexed + Send,
        U: Send,
        S: Iterator<Item = PipelineResult<T>> + Send,
        F: Fn(T) -> PipelineResult<U> + Sync,
        K: FnMut(U) -> PipelineResult<()>,
    {
        self.profile.validate()?;
        let workers = self.profile.workers;
        let window = self.profile.inflight;

        let failure = FailureCell::new();
        let (job_tx, job_rx) = bounded::<T>(window);
        let (out_tx, out_rx) = unbounded::<Outcome<U>>();
        let (credit_tx, credit_rx) = bounded::<()>(window);
        for _ in 0..window {
            // Capacity is exactly `window`; cannot block.
            let _ = credit_tx.try_send(());
        }

        let mut table = ReorderBuffer::new();
        let mut delivered = 0u64;

        thread::scope(|scope| {
            // ---- Dispatcher ----
            let failure_ref = &failure;
            scope.spawn(move || dispatch(source, job_tx, credit_rx, failure_ref));

            // ---- Workers ----
            for i in 0..workers {
                let rx = job_rx.clone();
                let tx = out_tx.clone();
                let task = &task;
                let failure = &failure;
                scope.spawn(move || run_worker(i, rx, tx, task, failure));
            }
            drop(job_rx);
            drop(out_tx);

            // ---- Ordered collector ----
            for outcome in out_rx.iter() {
                if let Outcome::Done(index, item) = outcome {
                    if !failure.is_failed() {
                        if let Err(e) = table.insert(index, item) {
                            failure.record(e);
                        }
                    }
                }

                while !failure.is_failed() {
                    let Some(item) = table.pop_ready() else { break };
                    match sink(item) {
                        Ok(()) => {
                            delivered += 1;
                            let _ = credit_tx.try_send(());
                        }
                        Err(e) => {
                            failure.record(e);
                        }
                    }
                }

                if failure.is_failed() {
                    let dropped = table.clear();
                    if dropped > 0 {
                        debug!("[POOL] discarded {} parked results after failure", dropped);
                    }
                    // Wake the dispatcher if it is waiting so it sees the failure.
                    let _ = credit_tx.try_send(());
                }
            }
        });

        if let Some(e) = failure.into_inner() {
            warn!("[POOL] run failed after {} delivered results: {}", delivered, e);
            return Err(e);
        }
        if table.parked() > 0 {
            return Err(PipelineError::Internal(format!(
                "{} results never delivered; missing chunk {}",
                table.parked(),
                table.next_index()
            )));
        }

        Ok(delivered)
    }
}

fn dispatch<T, S>(mut source: S, job_tx: Sender<T>, credit_rx: Receiver<()>, failure: &FailureCell)
where
    T: Indexed,
    S: Iterator<Item = PipelineResult<T>>,
{
    let mut expected = 0u64;
    loop {
        if failure.is_failed() || credit_rx.recv().is_err() || failure.is_failed() {
            break;
        }
        match source.next() {
            None => break,
            Some(Ok(job)) => {
                // A gap would park results forever and starve the credit window.
                if job.index() != expected {
                    failure.record(PipelineError::Internal(format!(
                        "source yielded chunk {} where {} was expected",
                        job.index(),
                        expected
                    )));
                    break;
                }
                expected += 1;
                debug!("[DISPATCH] chunk {}", job.index());
                if job_tx.send(job).is_err() {
                    break;
                }
            }
            Some(Err(e)) => {
                failure.record(e);
                break;
            }
        }
    }
    debug!("[DISPATCH] finished, closing job queue");
}

fn run_worker<T, U, F>(id: usize, rx: Receiver<T>, tx: Sender<Outcome<U>>, task: &F, failure: &FailureCell)
where
    T: Indexed,
    F: Fn(T) -> PipelineResult<U>,
{
    for job in rx.iter() {
        let index = job.index();
        if failure.is_failed() {
            debug!("[WORKER-{id}] skipping chunk {index} after failure");
            let _ = tx.send(Outcome::Skipped);
            continue;
        }

        // A panicking task must still report back, or the credit window never refills.
        let result = panic::catch_unwind(AssertUnwindSafe(|| task(job)))
            .unwrap_or_else(|_| Err(PipelineError::Internal(format!("task for chunk {index} panicked"))));

        match result {
            Ok(out) => {
                if tx.send(Outcome::Done(index, out)).is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!("[WORKER-{id}] chunk {index} failed: {e}");
                failure.record(e);
                let _ = tx.send(Outcome::Failed);
            }
        }
    }
}
