use std::io::Write;

use crate::constants::MAGIC_CMP1;
use crate::stream::chunking::EncodedChunk;
use crate::stream::framing::types::{FrameError, RecordHeader, MAGIC_LEN};
use crate::telemetry::Stage;
use crate::types::{PipelineError, PipelineResult};

/// Serializes encoded chunks into the container.
///
/// Layout:
///
/// ```text
/// [ magic "CMP1" (4) ]
/// per chunk, ascending index:
///   [ compressed_len (4) ]
///   [ original_size (4) ]
///   [ checksum (4) ]
///   [ payload (compressed_len) ]
/// ```
pub struct FrameWriter<W: Write> {
    inner: W,
    next: u64,
    bytes_written: u64,
}

impl<W: Write> FrameWriter<W> {
    /// Write the magic tag and return a writer positioned at the first record.
    pub fn begin(mut inner: W) -> PipelineResult<Self> {
        inner.write_all(&MAGIC_CMP1)
            .map_err(|e| PipelineError::io(Stage::Write, e))?;
        Ok(Self {
            inner,
            next: 0,
            bytes_written: MAGIC_LEN as u64,
        })
    }

    /// Append one record. Records must arrive in index order, starting at 0.
    pub fn write_record(&mut self, chunk: &EncodedChunk) -> PipelineResult<()> {
        if chunk.index != self.next {
            return Err(FrameError::OutOfOrder { expected: self.next, actual: chunk.index }.into());
        }

        let compressed_len = u32::try_from(chunk.payload.len()).map_err(|_| FrameError::RecordTooLarge {
            index: chunk.index,
            field: "compressed_len",
            have: chunk.payload.len(),
            max: u32::MAX as usize,
        })?;
        let header = RecordHeader {
            compressed_len,
            original_size: chunk.original_size,
            checksum: chunk.checksum,
        };

        self.inner.write_all(&header.to_bytes())
            .map_err(|e| PipelineError::io(Stage::Write, e))?;
        self.inner.write_all(&chunk.payload)
            .map_err(|e| PipelineError::io(Stage::Write, e))?;

        self.next += 1;
        self.bytes_written += (RecordHeader::LEN + chunk.payload.len()) as u64;
        Ok(())
    }

    pub fn records(&self) -> u64 {
        self.next
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Flush and hand the underlying writer back.
    pub fn finish(mut self) -> PipelineResult<W> {
        self.inner.flush()
            .map_err(|e| PipelineError::io(Stage::Write, e))?;
        Ok(self.inner)
    }
}
