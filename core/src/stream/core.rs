//! Stable public API: configuration plus file- and buffer-level entry points.

use std::io::Cursor;
use std::path::Path;

use log::info;

use crate::compression::DeflateCodec;
use crate::constants::{DEFAULT_CHUNK_SIZE, DEFAULT_LEVEL_DEFLATE, MAX_CHUNK_SIZE, MAX_LEVEL_DEFLATE};
use crate::stream::framing::{inspect_container, ContainerSummary};
use crate::stream::io::{open_input, AtomicOutput};
use crate::stream::parallelism::ParallelismProfile;
use crate::stream::pipeline::{run_compress_pipeline, run_decompress_pipeline};
use crate::telemetry::PipelineStats;
use crate::types::{PipelineError, PipelineResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Upper bound on raw bytes per chunk; only the last chunk may be smaller.
    pub chunk_size: usize,
    /// zlib level, 0..=9.
    pub level: u32,
    pub profile: ParallelismProfile,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            level: DEFAULT_LEVEL_DEFLATE,
            profile: ParallelismProfile::dynamic(),
        }
    }
}

impl PipelineConfig {
    pub fn new(chunk_size: usize, level: u32, profile: ParallelismProfile) -> Self {
        Self { chunk_size, level, profile }
    }

    pub fn single_threaded() -> Self {
        Self {
            profile: ParallelismProfile::single_threaded(),
            ..Self::default()
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.profile = ParallelismProfile::with_workers(workers);
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if self.chunk_size == 0 || self.chunk_size > MAX_CHUNK_SIZE {
            return Err(PipelineError::Config(format!(
                "invalid chunk size: {}, must be within 1..={}",
                self.chunk_size, MAX_CHUNK_SIZE
            )));
        }
        if self.level > MAX_LEVEL_DEFLATE {
            return Err(PipelineError::Config(format!(
                "invalid compression level: {}, must be within 0..={}",
                self.level, MAX_LEVEL_DEFLATE
            )));
        }
        self.profile.validate()
    }

    pub fn codec(&self) -> DeflateCodec {
        DeflateCodec::new(self.level)
    }
}

/// Compress `input` into a container at `output`.
///
/// The container is staged next to `output` and only renamed into place once
/// every chunk has been written; on error nothing is left at `output`.
pub fn compress_file(input: &Path, output: &Path, config: &PipelineConfig) -> PipelineResult<PipelineStats> {
    config.validate()?;
    info!("[CORE] compress {} -> {}", input.display(), output.display());

    let reader = open_input(input)?;
    let sink = AtomicOutput::create(output)?;
    let codec = config.codec();

    let (sink, stats) = run_compress_pipeline(reader, sink, &codec, config)?;
    sink.commit()?;
    Ok(stats)
}

/// Restore the original file from the container at `input`.
pub fn decompress_file(input: &Path, output: &Path, config: &PipelineConfig) -> PipelineResult<PipelineStats> {
    config.validate()?;
    info!("[CORE] decompress {} -> {}", input.display(), output.display());

    let reader = open_input(input)?;
    let sink = AtomicOutput::create(output)?;
    let codec = config.codec();

    let (sink, stats) = run_decompress_pipeline(reader, sink, &codec, config)?;
    info!("[CORE] committing {}", sink.target().display());
    sink.commit()?;
    Ok(stats)
}

/// List the records of a container without decoding them.
pub fn inspect_file(input: &Path) -> PipelineResult<ContainerSummary> {
    let reader = open_input(input)?;
    inspect_container(reader)
}

pub fn compress_bytes(data: &[u8], config: &PipelineConfig) -> PipelineResult<Vec<u8>> {
    let codec = config.codec();
    let (out, _) = run_compress_pipeline(Cursor::new(data), Vec::new(), &codec, config)?;
    Ok(out)
}

pub fn decompress_bytes(container: &[u8], config: &PipelineConfig) -> PipelineResult<Vec<u8>> {
    let codec = config.codec();
    let (out, _) = run_decompress_pipeline(Cursor::new(container), Vec::new(), &codec, config)?;
    Ok(out)
}
