//! telemetry/snapshot.rs
//! Immutable stats for one pipeline run.

use std::time::Duration;
use serde::{Serialize, Deserialize};

use crate::telemetry::counters::{TelemetryCounters, TelemetryTimer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Compress,
    Decompress,
}

/// Stats snapshot.
/// `bytes_in` / `bytes_out` are what the run read and wrote, container overhead included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub direction: Direction,
    pub chunks: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub workers: usize,
    pub chunk_size: usize,
    pub elapsed: Duration,
}

impl PipelineStats {
    pub fn from(
        direction: Direction,
        counters: &TelemetryCounters,
        timer: &TelemetryTimer,
        workers: usize,
        chunk_size: usize,
    ) -> Self {
        Self {
            direction,
            chunks: counters.chunks,
            bytes_in: counters.bytes_in,
            bytes_out: counters.bytes_out,
            workers,
            chunk_size,
            elapsed: timer.elapsed(),
        }
    }

    /// Compressed size over uncompressed size, whichever direction the run went.
    pub fn ratio(&self) -> f64 {
        let (raw, packed) = match self.direction {
            Direction::Compress => (self.bytes_in, self.bytes_out),
            Direction::Decompress => (self.bytes_out, self.bytes_in),
        };
        if raw == 0 {
            0.0
        } else {
            packed as f64 / raw as f64
        }
    }

    pub fn throughput_bytes_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.bytes_in as f64 / secs
        } else {
            0.0
        }
    }
}
