//! Chunk partitioning.
//!
//! Responsibilities:
//! - Define the raw and encoded chunk records that travel through the pool
//! - Split an input stream into bounded, index-ordered chunks
//!
//! Non-responsibilities:
//! - Compression
//! - Framing
//! - Parallelism

use std::io::Read;
use bytes::Bytes;
use log::debug;

use crate::constants::MAX_CHUNK_SIZE;
use crate::stream::io::read_exact_or_eof;
use crate::stream::worker_pool::Indexed;
use crate::telemetry::Stage;
use crate::types::{PipelineError, PipelineResult};

/// A contiguous slice of the original input. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Monotonic chunk number starting at 0
    pub index: u64,
    pub payload: Bytes,
}

impl Chunk {
    pub fn raw_size(&self) -> usize {
        self.payload.len()
    }
}

impl Indexed for Chunk {
    fn index(&self) -> u64 {
        self.index
    }
}

/// A compressed chunk plus what decode needs to restore it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedChunk {
    pub index: u64,
    /// Uncompressed length; sizes the decode buffer.
    pub original_size: u32,
    /// CRC32 of the uncompressed bytes.
    pub checksum: u32,
    pub payload: Bytes,
}

impl Indexed for EncodedChunk {
    fn index(&self) -> u64 {
        self.index
    }
}

/// Lazy, finite, non-restartable chunk sequence over a reader.
///
/// Every chunk but the last is exactly `chunk_size` bytes. Empty input yields
/// nothing. A read failure is yielded once, then the source is exhausted.
pub struct ChunkSource<R: Read> {
    inner: R,
    chunk_size: usize,
    next_index: u64,
    done: bool,
}

impl<R: Read> ChunkSource<R> {
    /// Fails with `Config` unless `chunk_size` is within `1..=MAX_CHUNK_SIZE`.
    pub fn new(inner: R, chunk_size: usize) -> PipelineResult<Self> {
        if chunk_size == 0 || chunk_size > MAX_CHUNK_SIZE {
            return Err(PipelineError::Config(format!(
                "invalid chunk size: {}, must be within 1..={}",
                chunk_size, MAX_CHUNK_SIZE
            )));
        }
        Ok(Self {
            inner,
            chunk_size,
            next_index: 0,
            done: false,
        })
    }

    /// Chunks handed out so far.
    pub fn produced(&self) -> u64 {
        self.next_index
    }
}

impl<R: Read> Iterator for ChunkSource<R> {
    type Item = PipelineResult<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match read_exact_or_eof(&mut self.inner, self.chunk_size) {
            Ok(buf) if buf.is_empty() => {
                debug!("[CHUNKER] EOF after {} chunks", self.next_index);
                self.done = true;
                None
            }
            Ok(buf) => {
                if buf.len() < self.chunk_size {
                    // A short read only happens at end of stream.
                    self.done = true;
                }
                let chunk = Chunk {
                    index: self.next_index,
                    payload: Bytes::from(buf),
                };
                self.next_index += 1;
                Some(Ok(chunk))
            }
            Err(e) => {
                self.done = true;
                Some(Err(PipelineError::io(Stage::Read, e)))
            }
        }
    }
}

impl<R: Read> std::iter::FusedIterator for ChunkSource<R> {}
