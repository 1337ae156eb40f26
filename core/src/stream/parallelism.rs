use log::debug;

use crate::constants::{INFLIGHT_PER_WORKER, MAX_INFLIGHT, MAX_WORKERS};
use crate::types::{PipelineError, PipelineResult};

/// Parallelism configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParallelismProfile {
    /// Worker threads running codec tasks.
    pub workers: usize,
    /// Chunks dispatched but not yet written out, across all workers.
    pub inflight: usize,
}

impl ParallelismProfile {
    pub fn single_threaded() -> Self {
        Self {
            workers: 1,
            inflight: 1,
        }
    }

    /// Values of 0 or above `MAX_WORKERS` yield a profile that fails `validate`.
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers,
            inflight: workers.saturating_mul(INFLIGHT_PER_WORKER),
        }
    }

    /// One worker per available core, capped at `MAX_WORKERS`.
    pub fn dynamic() -> Self {
        let cores = num_cpus::get();
        debug!("[PROFILE] {} cores available", cores);
        Self::with_workers(cores.min(MAX_WORKERS))
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if self.workers == 0 || self.workers > MAX_WORKERS {
            return Err(PipelineError::Config(format!(
                "invalid worker count: {}, must be within 1..={}",
                self.workers, MAX_WORKERS
            )));
        }
        if self.inflight == 0 || self.inflight > MAX_INFLIGHT {
            return Err(PipelineError::Config(format!(
                "invalid in-flight window: {}, must be within 1..={}",
                self.inflight, MAX_INFLIGHT
            )));
        }
        Ok(())
    }
}

impl Default for ParallelismProfile {
    fn default() -> Self {
        Self::dynamic()
    }
}
