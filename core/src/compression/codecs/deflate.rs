//! Deflate (zlib wrapper) via flate2, one zlib stream per chunk.

use std::io::{Read, Write};
use flate2::{Compression, write::ZlibEncoder, read::ZlibDecoder};

use crate::compression::types::{ChunkCodec, CodecError};
use crate::constants::{DEFAULT_LEVEL_DEFLATE, MAX_LEVEL_DEFLATE, compress_bound};

const CODEC_NAME: &str = "deflate";

#[derive(Debug, Clone, Copy)]
pub struct DeflateCodec {
    level: Compression,
}

impl DeflateCodec {
    /// Levels outside 0..=9 fall back to the default level.
    pub fn new(level: u32) -> Self {
        let lvl = match level {
            0..=MAX_LEVEL_DEFLATE => Compression::new(level),
            _ => Compression::new(DEFAULT_LEVEL_DEFLATE),
        };
        Self { level: lvl }
    }

    pub fn level(&self) -> u32 {
        self.level.level()
    }
}

impl Default for DeflateCodec {
    fn default() -> Self {
        Self::new(DEFAULT_LEVEL_DEFLATE)
    }
}

impl ChunkCodec for DeflateCodec {
    fn name(&self) -> &'static str {
        CODEC_NAME
    }

    fn encode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        let buf = Vec::with_capacity(compress_bound(data.len()));
        let mut enc = ZlibEncoder::new(buf, self.level);
        enc.write_all(data)
            .map_err(|e| CodecError::Encode { codec: CODEC_NAME, msg: e.to_string() })?;
        enc.finish()
            .map_err(|e| CodecError::Encode { codec: CODEC_NAME, msg: e.to_string() })
    }

    fn decode(&self, data: &[u8], expected_size: usize) -> Result<Vec<u8>, CodecError> {
        let mut dec = ZlibDecoder::new(data);
        let mut out = Vec::with_capacity(expected_size);

        // One byte of headroom tells "exactly expected_size" apart from "more".
        (&mut dec)
            .take(expected_size as u64 + 1)
            .read_to_end(&mut out)
            .map_err(|e| CodecError::Decode { codec: CODEC_NAME, msg: e.to_string() })?;

        if out.len() > expected_size {
            return Err(CodecError::Overflow { expected: expected_size });
        }
        if out.len() != expected_size {
            return Err(CodecError::SizeMismatch { expected: expected_size, actual: out.len() });
        }

        let consumed = dec.total_in() as usize;
        if consumed != data.len() {
            return Err(CodecError::TrailingBytes { trailing: data.len().saturating_sub(consumed) });
        }

        Ok(out)
    }
}
