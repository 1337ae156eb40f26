use byteorder::{ByteOrder, LittleEndian};
use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::constants::{MAX_CHUNK_SIZE, compress_bound};

pub const MAGIC_LEN: usize = 4;

/// Largest compressed payload a well-formed record can carry.
pub const MAX_RECORD_PAYLOAD: usize = compress_bound(MAX_CHUNK_SIZE);

/// Fixed-size record header.
///
/// All fields are little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// Compressed payload bytes following this header.
    pub compressed_len: u32,
    /// Uncompressed chunk length (decode size hint).
    pub original_size: u32,
    /// CRC32 of the uncompressed chunk.
    pub checksum: u32,
}

impl RecordHeader {
    pub const LEN: usize = 4  // compressed_len
        + 4                  // original_size
        + 4;                 // checksum

    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut buf = [0u8; Self::LEN];
        LittleEndian::write_u32(&mut buf[0..4], self.compressed_len);
        LittleEndian::write_u32(&mut buf[4..8], self.original_size);
        LittleEndian::write_u32(&mut buf[8..12], self.checksum);
        buf
    }

    pub fn from_bytes(buf: &[u8; Self::LEN]) -> Self {
        Self {
            compressed_len: LittleEndian::read_u32(&buf[0..4]),
            original_size: LittleEndian::read_u32(&buf[4..8]),
            checksum: LittleEndian::read_u32(&buf[8..12]),
        }
    }

    /// Reject sizes no writer could have produced, before anything is allocated.
    pub fn validate(&self, index: u64) -> Result<(), FrameError> {
        if self.compressed_len as usize > MAX_RECORD_PAYLOAD {
            return Err(FrameError::RecordTooLarge {
                index,
                field: "compressed_len",
                have: self.compressed_len as usize,
                max: MAX_RECORD_PAYLOAD,
            });
        }
        if self.original_size as usize > MAX_CHUNK_SIZE {
            return Err(FrameError::RecordTooLarge {
                index,
                field: "original_size",
                have: self.original_size as usize,
                max: MAX_CHUNK_SIZE,
            });
        }
        Ok(())
    }
}

/// One record as seen by `inspect_container`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordInfo {
    pub index: u64,
    pub compressed_len: u32,
    pub original_size: u32,
    pub checksum: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSummary {
    pub records: Vec<RecordInfo>,
    pub container_bytes: u64,
}

impl ContainerSummary {
    pub fn total_original(&self) -> u64 {
        self.records.iter().map(|r| r.original_size as u64).sum()
    }

    pub fn total_compressed(&self) -> u64 {
        self.records.iter().map(|r| r.compressed_len as u64).sum()
    }
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("invalid container magic: {0:?}")]
    InvalidMagic([u8; MAGIC_LEN]),

    #[error("truncated container: {actual} of 4 magic bytes")]
    TruncatedMagic { actual: usize },

    #[error("corrupted container: record {index} {part} truncated ({actual} of {expected} bytes)")]
    Truncated {
        index: u64,
        part: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("corrupted container: record {index} {field} {have} exceeds {max}")]
    RecordTooLarge {
        index: u64,
        field: &'static str,
        have: usize,
        max: usize,
    },

    #[error("record out of order: expected index {expected}, got {actual}")]
    OutOfOrder { expected: u64, actual: u64 },
}
