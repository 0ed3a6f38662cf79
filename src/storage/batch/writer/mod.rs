//! Batch writer implementation.
//!
//! This module provides the BatchWriter struct and its methods for
//! collecting records and handing full batches to a loader.

mod flush;

use crate::changeset::Changeset;
use crate::error_handling::BulkLoadError;
use crate::storage::loader::BulkLoader;

use super::types::{BatchConfig, BatchStats};

/// Batch writer that collects records and loads them in batches
pub struct BatchWriter<'a, L: BulkLoader> {
    loader: &'a mut L,
    pub(crate) config: BatchConfig,
    pub(crate) buffer: Vec<Changeset>,
    stats: BatchStats,
}

impl<'a, L: BulkLoader> BatchWriter<'a, L> {
    pub fn new(loader: &'a mut L, config: BatchConfig) -> Self {
        // Capacity is capped so a huge batch size does not reserve memory up front
        let capacity = config.batch_size.min(64 * 1024);
        BatchWriter {
            loader,
            config,
            buffer: Vec::with_capacity(capacity),
            stats: BatchStats::default(),
        }
    }

    /// Adds a record to the buffer and flushes if the batch is full
    pub async fn add_record(&mut self, record: Changeset) -> Result<(), BulkLoadError> {
        self.buffer.push(record);

        if self.buffer.len() >= self.config.batch_size {
            self.flush().await?;
        }

        Ok(())
    }

    /// Records buffered but not yet flushed.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    pub fn stats(&self) -> &BatchStats {
        &self.stats
    }
}
