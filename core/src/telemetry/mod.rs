//! telemetry/mod.rs
//! Run counters, stage names and the immutable stats snapshot returned by every pipeline run.

pub mod counters;
pub mod snapshot;

pub use counters::*;
pub use snapshot::*;

use std::fmt;
use serde::{Serialize, Deserialize};

/// Pipeline stages, used for error context and log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Open,
    Read,
    Encode,
    Decode,
    Verify,
    Write,
    Commit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Open   => "open",
            Stage::Read   => "read",
            Stage::Encode => "encode",
            Stage::Decode => "decode",
            Stage::Verify => "verify",
            Stage::Write  => "write",
            Stage::Commit => "commit",
        };
        f.write_str(name)
    }
}
