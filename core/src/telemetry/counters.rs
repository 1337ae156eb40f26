//! telemetry/counters.rs
//! Mutable counters used while a pipeline runs.
//!
//! Converted into an immutable `PipelineStats` at pipeline end.
use std::time::{Duration, Instant};

/// Counters collected on the ordered (collecting) side of the pipeline.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct TelemetryCounters {
    pub chunks: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

impl TelemetryCounters {
    /// Record one chunk: `raw_len` uncompressed bytes, `encoded_len` compressed payload bytes.
    pub fn add_chunk(&mut self, raw_len: usize, encoded_len: usize, compressing: bool) {
        self.chunks += 1;
        if compressing {
            self.bytes_in += raw_len as u64;
            self.bytes_out += encoded_len as u64;
        } else {
            self.bytes_in += encoded_len as u64;
            self.bytes_out += raw_len as u64;
        }
    }

    /// Container bytes that are not chunk payload (magic tag, record headers).
    pub fn add_overhead_in(&mut self, len: usize) {
        self.bytes_in += len as u64;
    }

    pub fn add_overhead_out(&mut self, len: usize) {
        self.bytes_out += len as u64;
    }
}

/// Wall-clock timer for a whole run.
#[derive(Debug, Clone)]
pub struct TelemetryTimer {
    start: Instant,
}

impl TelemetryTimer {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for TelemetryTimer {
    fn default() -> Self {
        Self::new()
    }
}
