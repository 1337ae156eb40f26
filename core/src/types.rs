use std::io;
use thiserror::Error;

use crate::{
    compression::CodecError,
    stream::framing::FrameError,
    telemetry::Stage,
};

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Unified pipeline error covering I/O, container format, codec and validation.
/// - `From<T>` impls enable `?` across the pipeline.
/// - Every variant names the stage it came from, so one message is enough to diagnose a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// File open/read/write/commit failure.
    #[error("I/O error during {stage}: {source}")]
    Io {
        stage: Stage,
        #[source]
        source: io::Error,
    },

    /// Bad magic, truncated or corrupted container.
    #[error("format error: {0}")]
    Format(#[from] FrameError),

    /// Codec primitive failed on one chunk.
    #[error("codec error in chunk {index} during {stage}: {source}")]
    Codec {
        index: u64,
        stage: Stage,
        #[source]
        source: CodecError,
    },

    /// Invalid chunk size, worker count, level.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A pipeline invariant was broken (lost or duplicated chunk).
    #[error("pipeline error: {0}")]
    Internal(String),
}

impl PipelineError {
    pub fn io(stage: Stage, source: io::Error) -> Self {
        PipelineError::Io { stage, source }
    }

    pub fn codec(index: u64, stage: Stage, source: CodecError) -> Self {
        PipelineError::Codec { index, stage, source }
    }

    pub fn is_io(&self) -> bool {
        matches!(self, PipelineError::Io { .. })
    }

    pub fn is_format(&self) -> bool {
        matches!(self, PipelineError::Format(_))
    }

    pub fn is_codec(&self) -> bool {
        matches!(self, PipelineError::Codec { .. })
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::Io { stage, .. } | PipelineError::Codec { stage, .. } => Some(*stage),
            PipelineError::Format(_) => Some(Stage::Read),
            _ => None,
        }
    }
}
