//! Staging of a batch in the transfer format.
//!
//! A batch is written in full to an anonymous temporary file before any byte
//! is transferred, so the store only ever sees complete, well-formed batches.
//! The file has no name on disk and disappears when the [`StagedBatch`] is
//! dropped, whether the load succeeded or not.

use std::fs::File;
use std::io::{BufReader, BufWriter, Seek, SeekFrom, Write};

use log::debug;

use crate::changeset::Changeset;
use crate::error_handling::BulkLoadError;

/// A batch serialized as newline-terminated tab-separated rows.
#[derive(Debug)]
pub struct StagedBatch {
    file: File,
    rows: usize,
    bytes: u64,
}

impl StagedBatch {
    /// Number of rows in the staged batch.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Size of the staged payload in bytes.
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Consumes the batch and returns a reader positioned at the first row.
    pub fn into_reader(self) -> BufReader<File> {
        BufReader::new(self.file)
    }
}

/// Serializes `records` into a fresh staging file, one row per record.
pub fn stage_batch(records: &[Changeset]) -> Result<StagedBatch, BulkLoadError> {
    let mut writer = BufWriter::new(tempfile::tempfile()?);
    for record in records {
        writer.write_all(record.to_tsv_row().as_bytes())?;
        writer.write_all(b"\n")?;
    }
    let mut file = writer
        .into_inner()
        .map_err(|e| BulkLoadError::Staging(e.into_error()))?;
    let bytes = file.stream_position()?;
    file.seek(SeekFrom::Start(0))?;

    debug!("Staged {} rows ({} bytes)", records.len(), bytes);
    Ok(StagedBatch {
        file,
        rows: records.len(),
        bytes,
    })
}
