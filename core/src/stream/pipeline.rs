//! Pipeline wiring over arbitrary readers and writers.
//!
//! compress:   ChunkSource ─▶ TaskPool(encode) ─▶ FrameWriter
//! decompress: FrameReader ─▶ TaskPool(decode) ─▶ raw writer

use std::io::{Read, Write};
use bytes::Bytes;
use log::{debug, info};

use crate::compression::{ChunkCodec, CodecError};
use crate::stream::chunking::{Chunk, ChunkSource, EncodedChunk};
use crate::stream::core::PipelineConfig;
use crate::stream::framing::{FrameError, FrameReader, FrameWriter, RecordHeader, MAGIC_LEN};
use crate::stream::worker_pool::TaskPool;
use crate::telemetry::{Direction, PipelineStats, Stage, TelemetryCounters, TelemetryTimer};
use crate::types::{PipelineError, PipelineResult};
use crate::utils::compute_checksum;

/// Encode one chunk and record what decode will need.
pub fn encode_chunk(codec: &dyn ChunkCodec, chunk: Chunk) -> PipelineResult<EncodedChunk> {
    let original_size = u32::try_from(chunk.raw_size()).map_err(|_| FrameError::RecordTooLarge {
        index: chunk.index,
        field: "original_size",
        have: chunk.raw_size(),
        max: u32::MAX as usize,
    })?;
    let checksum = compute_checksum(&chunk.payload);
    let payload = codec
        .encode(&chunk.payload)
        .map_err(|e| PipelineError::codec(chunk.index, Stage::Encode, e))?;

    debug!("[ENCODE] chunk {}: {} -> {} bytes", chunk.index, original_size, payload.len());
    Ok(EncodedChunk {
        index: chunk.index,
        original_size,
        checksum,
        payload: Bytes::from(payload),
    })
}

/// Decode one chunk, sized by its stored original length, and verify its checksum.
pub fn decode_chunk(codec: &dyn ChunkCodec, chunk: &EncodedChunk) -> PipelineResult<Bytes> {
    let raw = codec
        .decode(&chunk.payload, chunk.original_size as usize)
        .map_err(|e| PipelineError::codec(chunk.index, Stage::Decode, e))?;

    let actual = compute_checksum(&raw);
    if actual != chunk.checksum {
        return Err(PipelineError::codec(
            chunk.index,
            Stage::Verify,
            CodecError::ChecksumMismatch { expected: chunk.checksum, actual },
        ));
    }

    debug!("[DECODE] chunk {}: {} -> {} bytes", chunk.index, chunk.payload.len(), raw.len());
    Ok(Bytes::from(raw))
}

// ============================================================
// Compress pipeline
// ============================================================
pub fn run_compress_pipeline<R, W>(
    reader: R,
    writer: W,
    codec: &dyn ChunkCodec,
    config: &PipelineConfig,
) -> PipelineResult<(W, PipelineStats)>
where
    R: Read + Send,
    W: Write,
{
    config.validate()?;
    let timer = TelemetryTimer::new();
    let mut counters = TelemetryCounters::default();
    info!(
        "[PIPELINE] start compress: codec={}, chunk_size={}, workers={}",
        codec.name(),
        config.chunk_size,
        config.profile.workers
    );

    let mut frames = FrameWriter::begin(writer)?;
    counters.add_overhead_out(MAGIC_LEN);

    let source = ChunkSource::new(reader, config.chunk_size)?;
    let pool = TaskPool::new(config.profile.clone());

    pool.run(
        source,
        |chunk: Chunk| encode_chunk(codec, chunk),
        |encoded: EncodedChunk| {
            frames.write_record(&encoded)?;
            counters.add_chunk(encoded.original_size as usize, encoded.payload.len(), true);
            counters.add_overhead_out(RecordHeader::LEN);
            Ok(())
        },
    )?;

    debug!("[PIPELINE] {} records, {} container bytes", frames.records(), frames.bytes_written());
    let writer = frames.finish()?;

    let stats = PipelineStats::from(
        Direction::Compress,
        &counters,
        &timer,
        config.profile.workers,
        config.chunk_size,
    );
    info!(
        "[PIPELINE] compress done: {} chunks, {} -> {} bytes in {:?}",
        stats.chunks, stats.bytes_in, stats.bytes_out, stats.elapsed
    );
    Ok((writer, stats))
}

// ============================================================
// Decompress pipeline
// ============================================================
pub fn run_decompress_pipeline<R, W>(
    reader: R,
    mut writer: W,
    codec: &dyn ChunkCodec,
    config: &PipelineConfig,
) -> PipelineResult<(W, PipelineStats)>
where
    R: Read + Send,
    W: Write,
{
    config.validate()?;
    let timer = TelemetryTimer::new();
    let mut counters = TelemetryCounters::default();
    info!(
        "[PIPELINE] start decompress: codec={}, workers={}",
        codec.name(),
        config.profile.workers
    );

    // Magic is checked here, before any chunk reaches the pool.
    let frames = FrameReader::open(reader)?;
    counters.add_overhead_in(MAGIC_LEN);

    let pool = TaskPool::new(config.profile.clone());
    let mut largest_chunk = 0usize;

    pool.run(
        frames,
        |encoded: EncodedChunk| {
            let raw = decode_chunk(codec, &encoded)?;
            Ok((encoded.payload.len(), raw))
        },
        |(compressed_len, raw): (usize, Bytes)| {
            writer
                .write_all(&raw)
                .map_err(|e| PipelineError::io(Stage::Write, e))?;
            counters.add_chunk(raw.len(), compressed_len, false);
            counters.add_overhead_in(RecordHeader::LEN);
            largest_chunk = largest_chunk.max(raw.len());
            Ok(())
        },
    )?;

    writer.flush().map_err(|e| PipelineError::io(Stage::Write, e))?;

    let stats = PipelineStats::from(
        Direction::Decompress,
        &counters,
        &timer,
        config.profile.workers,
        largest_chunk,
    );
    info!(
        "[PIPELINE] decompress done: {} chunks, {} -> {} bytes in {:?}",
        stats.chunks, stats.bytes_in, stats.bytes_out, stats.elapsed
    );
    Ok((writer, stats))
}
