//! compression/types.rs
//! Codec trait and codec-level errors.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("codec {codec} encode failed: {msg}")]
    Encode { codec: &'static str, msg: String },

    #[error("codec {codec} decode failed: {msg}")]
    Decode { codec: &'static str, msg: String },

    #[error("decoded size {actual} != expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("decoded stream exceeds expected size {expected}")]
    Overflow { expected: usize },

    #[error("{trailing} trailing bytes after end of compressed stream")]
    TrailingBytes { trailing: usize },

    #[error("checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },
}

/// Byte-array-in, byte-array-out compression primitive.
// Sync so a single codec can be borrowed by every worker thread.
pub trait ChunkCodec: Send + Sync {
    fn name(&self) -> &'static str;

    /// Compress one chunk into a self-contained stream.
    fn encode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError>;

    /// Decompress one chunk. `expected_size` is the chunk's original length and
    /// sizes the output buffer; any other decoded length is an error.
    fn decode(&self, data: &[u8], expected_size: usize) -> Result<Vec<u8>, CodecError>;
}
