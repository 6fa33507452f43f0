//! Append-only length-prefixed record log (`.awf`).
//!
//! Frame format: an 8-byte little-endian payload length followed by that
//! many bytes of MessagePack. No file header, no checksum; the read-side
//! length sanity bound is the only corruption detector.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use thiserror::Error;

use crate::models::PageRecord;

/// Flush once this many bytes sit in the write buffer.
const FLUSH_THRESHOLD: usize = 100 * 1024;

/// Any frame claiming a larger payload is treated as corruption.
pub const MAX_FRAME_LEN: u64 = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("record log I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode record: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("frame length {0} exceeds the {MAX_FRAME_LEN} byte bound")]
    OversizedFrame(u64),

    #[error("truncated frame at end of log")]
    TruncatedFrame,
}

/// Shared append-only writer.
///
/// The file opens lazily on the first save. Serialization happens outside
/// the lock; only the length+payload pair is written under it, so frames
/// never interleave.
pub struct RecordLog {
    path: PathBuf,
    writer: Mutex<Option<BufWriter<File>>>,
}

impl RecordLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize and append one record. Errors are reported to the caller,
    /// who logs and moves on; a bad record never stops the crawl.
    pub fn save(&self, record: &PageRecord) -> Result<(), LogError> {
        let payload = rmp_serde::to_vec_named(record)?;
        self.write_frame(&payload)
    }

    fn write_frame(&self, payload: &[u8]) -> Result<(), LogError> {
        let mut guard = self.writer.lock();

        if guard.is_none() {
            let file = OpenOptions::new()
                .append(true)
                .create(true)
                .open(&self.path)?;
            // Capacity above the threshold so the explicit flush policy,
            // not the buffer size, decides when bytes hit the disk.
            *guard = Some(BufWriter::with_capacity(FLUSH_THRESHOLD * 2, file));
        }
        let writer = guard.as_mut().expect("writer opened above");

        writer.write_all(&(payload.len() as u64).to_le_bytes())?;
        writer.write_all(payload)?;

        if writer.buffer().len() > FLUSH_THRESHOLD {
            writer.flush()?;
        }
        Ok(())
    }

    /// Flush buffered frames and drop the file handle. Called on normal
    /// completion and from the signal handler; safe to call twice.
    pub fn close(&self) {
        let mut guard = self.writer.lock();
        if let Some(mut writer) = guard.take() {
            if let Err(e) = writer.flush() {
                tracing::error!(path = %self.path.display(), error = %e, "final flush failed");
            }
        }
    }
}

impl Drop for RecordLog {
    fn drop(&mut self) {
        self.close();
    }
}

/// Frame-by-frame reader over one log stream.
pub struct FrameReader<R: Read> {
    reader: R,
}

impl FrameReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LogError> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Read the next raw payload. `Ok(None)` at a clean end of stream;
    /// a partial length header or short payload is `TruncatedFrame`.
    pub fn read_frame(&mut self) -> Result<Option<Vec<u8>>, LogError> {
        let mut header = [0u8; 8];
        let mut filled = 0;
        while filled < header.len() {
            match self.reader.read(&mut header[filled..])? {
                0 if filled == 0 => return Ok(None),
                0 => return Err(LogError::TruncatedFrame),
                n => filled += n,
            }
        }

        let length = u64::from_le_bytes(header);
        if length > MAX_FRAME_LEN {
            return Err(LogError::OversizedFrame(length));
        }

        let mut payload = vec![0u8; length as usize];
        self.reader
            .read_exact(&mut payload)
            .map_err(|_| LogError::TruncatedFrame)?;
        Ok(Some(payload))
    }
}

/// Append a pre-encoded payload as one frame. The compactor uses this to
/// rewrite merged logs with the same framing the crawler produces.
pub fn write_frame_to(writer: &mut impl Write, payload: &[u8]) -> std::io::Result<()> {
    writer.write_all(&(payload.len() as u64).to_le_bytes())?;
    writer.write_all(payload)?;
    Ok(())
}
