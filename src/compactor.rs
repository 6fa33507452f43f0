//! Offline merge/dedup pass over one or more record logs ("blower").
//!
//! Ingestion keeps the first record seen per URL and preserves insertion
//! order. A frame-level problem (oversized length, truncated payload)
//! aborts the whole compaction; a payload that fails to decode is logged
//! and skipped, since the framing itself is still trustworthy.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::PageRecord;
use crate::record_log::{write_frame_to, FrameReader, LogError};

#[derive(Debug, Error)]
pub enum CompactError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: LogError,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode record for {url}: {source}")]
    Encode {
        url: String,
        #[source]
        source: rmp_serde::encode::Error,
    },
}

#[derive(Default)]
pub struct Compactor {
    seen: HashSet<String>,
    pages: Vec<PageRecord>,
}

impl Compactor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unique records accumulated so far
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Scan one log file frame by frame, keeping first-seen URLs.
    pub fn ingest_file(&mut self, path: impl AsRef<Path>) -> Result<(), CompactError> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "processing");

        let mut reader = FrameReader::open(path).map_err(|source| CompactError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        loop {
            let payload = reader.read_frame().map_err(|source| CompactError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            let Some(payload) = payload else { break };

            match rmp_serde::from_slice::<PageRecord>(&payload) {
                Ok(page) => {
                    if self.seen.insert(page.url.clone()) {
                        self.pages.push(page);
                    }
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping undecodable record");
                }
            }
        }
        Ok(())
    }

    /// Write the deduplicated union as a combined log, insertion order.
    pub fn write_combined(&self, path: impl AsRef<Path>) -> Result<(), CompactError> {
        let path = path.as_ref();
        let map_io = |source| CompactError::Write {
            path: path.to_path_buf(),
            source,
        };

        let file = File::create(path).map_err(map_io)?;
        let mut writer = BufWriter::new(file);

        for page in &self.pages {
            let payload = rmp_serde::to_vec_named(page).map_err(|source| CompactError::Encode {
                url: page.url.clone(),
                source,
            })?;
            write_frame_to(&mut writer, &payload).map_err(map_io)?;
        }

        writer.flush().map_err(map_io)?;
        tracing::info!(path = %path.display(), records = self.pages.len(), "combined log written");
        Ok(())
    }

    /// Write the human-readable dump: each record pretty-printed as JSON,
    /// blank-line separated, most recently modified first.
    pub fn write_json_dump(&self, path: impl AsRef<Path>) -> Result<(), CompactError> {
        let path = path.as_ref();
        let map_io = |source| CompactError::Write {
            path: path.to_path_buf(),
            source,
        };

        let mut ordered: Vec<&PageRecord> = self.pages.iter().collect();
        ordered.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));

        let file = File::create(path).map_err(map_io)?;
        let mut writer = BufWriter::new(file);

        for page in ordered {
            let json = serde_json::to_string_pretty(page).map_err(|e| CompactError::Write {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            })?;
            writer.write_all(json.as_bytes()).map_err(map_io)?;
            writer.write_all(b"\n\n").map_err(map_io)?;
        }

        writer.flush().map_err(map_io)?;
        tracing::info!(path = %path.display(), "json dump written");
        Ok(())
    }
}
