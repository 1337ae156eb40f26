use std::io::Read;
use bytes::Bytes;
use log::debug;

use crate::constants::MAGIC_CMP1;
use crate::stream::chunking::EncodedChunk;
use crate::stream::framing::types::{ContainerSummary, FrameError, RecordHeader, RecordInfo, MAGIC_LEN};
use crate::stream::io::read_exact_or_eof;
use crate::telemetry::Stage;
use crate::types::{PipelineError, PipelineResult};

/// Reads records back out of a container, assigning indices 0.. in order.
///
/// Ends cleanly only at a record boundary. Fuses after the first error.
pub struct FrameReader<R: Read> {
    inner: R,
    next: u64,
    bytes_read: u64,
    done: bool,
}

impl<R: Read> FrameReader<R> {
    /// Read and validate the magic tag.
    pub fn open(mut inner: R) -> PipelineResult<Self> {
        let magic = read_exact_or_eof(&mut inner, MAGIC_LEN)
            .map_err(|e| PipelineError::io(Stage::Read, e))?;
        if magic.len() < MAGIC_LEN {
            return Err(FrameError::TruncatedMagic { actual: magic.len() }.into());
        }
        if magic[..] != MAGIC_CMP1[..] {
            let mut m = [0u8; MAGIC_LEN];
            m.copy_from_slice(&magic);
            return Err(FrameError::InvalidMagic(m).into());
        }

        Ok(Self {
            inner,
            next: 0,
            bytes_read: MAGIC_LEN as u64,
            done: false,
        })
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    fn read_record(&mut self) -> PipelineResult<Option<EncodedChunk>> {
        let index = self.next;

        let raw = read_exact_or_eof(&mut self.inner, RecordHeader::LEN)
            .map_err(|e| PipelineError::io(Stage::Read, e))?;
        if raw.is_empty() {
            debug!("[FRAME READER] end of container after {} records", index);
            return Ok(None);
        }
        let raw: [u8; RecordHeader::LEN] = raw.as_slice().try_into().map_err(|_| FrameError::Truncated {
            index,
            part: "header",
            expected: RecordHeader::LEN,
            actual: raw.len(),
        })?;

        let header = RecordHeader::from_bytes(&raw);
        header.validate(index)?;

        // Grow the buffer as bytes arrive; a corrupted length never drives the allocation.
        let expected = header.compressed_len as usize;
        let mut payload = Vec::new();
        (&mut self.inner)
            .take(expected as u64)
            .read_to_end(&mut payload)
            .map_err(|e| PipelineError::io(Stage::Read, e))?;
        if payload.len() != expected {
            return Err(FrameError::Truncated {
                index,
                part: "payload",
                expected,
                actual: payload.len(),
            }
            .into());
        }

        self.next += 1;
        self.bytes_read += (RecordHeader::LEN + expected) as u64;

        Ok(Some(EncodedChunk {
            index,
            original_size: header.original_size,
            checksum: header.checksum,
            payload: Bytes::from(payload),
        }))
    }
}

impl<R: Read> Iterator for FrameReader<R> {
    type Item = PipelineResult<EncodedChunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_record() {
            Ok(Some(chunk)) => Some(Ok(chunk)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read> std::iter::FusedIterator for FrameReader<R> {}

/// Walk every record of a container without decoding payloads.
pub fn inspect_container<R: Read>(reader: R) -> PipelineResult<ContainerSummary> {
    let mut frames = FrameReader::open(reader)?;
    let mut records = Vec::new();

    for chunk in frames.by_ref() {
        let chunk = chunk?;
        records.push(RecordInfo {
            index: chunk.index,
            compressed_len: chunk.payload.len() as u32,
            original_size: chunk.original_size,
            checksum: chunk.checksum,
        });
    }

    Ok(ContainerSummary {
        records,
        container_bytes: frames.bytes_read(),
    })
}
