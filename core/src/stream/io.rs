//! Normalized file I/O for the pipeline.
//!
//! - `read_exact_or_eof` coalesces short reads into full chunks / record headers.
//! - `AtomicOutput` stages output in a temp file next to the destination and
//!   only renames it into place on `commit`. Dropping it uncommitted deletes the temp file.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use log::debug;
use tempfile::NamedTempFile;

use crate::telemetry::Stage;
use crate::types::{PipelineError, PipelineResult};

/// Read up to `len` bytes, stopping early only at end of stream.
pub fn read_exact_or_eof<R: Read>(r: &mut R, len: usize) -> io::Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    let mut off = 0;

    while off < len {
        match r.read(&mut buf[off..]) {
            Ok(0) => break,
            Ok(n) => off += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    buf.truncate(off);
    Ok(buf)
}

pub fn open_input(path: &Path) -> PipelineResult<BufReader<File>> {
    let file = File::open(path).map_err(|e| PipelineError::io(Stage::Open, e))?;
    Ok(BufReader::new(file))
}

/// Output file that only becomes visible at its destination after a successful run.
pub struct AtomicOutput {
    target: PathBuf,
    file: BufWriter<NamedTempFile>,
}

impl AtomicOutput {
    pub fn create(target: &Path) -> PipelineResult<Self> {
        let dir = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let tmp = tempfile::Builder::new()
            .prefix(".parachunk-")
            .suffix(".tmp")
            .tempfile_in(&dir)
            .map_err(|e| PipelineError::io(Stage::Open, e))?;
        debug!("[OUTPUT] staging {} via {}", target.display(), tmp.path().display());

        Ok(Self {
            target: target.to_path_buf(),
            file: BufWriter::new(tmp),
        })
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Flush, sync and rename the staged file over the destination.
    pub fn commit(self) -> PipelineResult<()> {
        let tmp = self.file
            .into_inner()
            .map_err(|e| PipelineError::io(Stage::Write, e.into_error()))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| PipelineError::io(Stage::Commit, e))?;
        tmp.persist(&self.target)
            .map_err(|e| PipelineError::io(Stage::Commit, e.error))?;

        debug!("[OUTPUT] committed {}", self.target.display());
        Ok(())
    }
}

impl Write for AtomicOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}
