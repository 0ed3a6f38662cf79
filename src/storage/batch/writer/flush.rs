//! Batch flushing logic.

use log::info;

use crate::error_handling::BulkLoadError;
use crate::storage::batch::types::{BatchStats, FlushResult};
use crate::storage::loader::BulkLoader;
use crate::storage::staging::stage_batch;

use super::BatchWriter;

impl<L: BulkLoader> BatchWriter<'_, L> {
    /// Stages the buffered records and loads them as one transaction.
    ///
    /// The buffer is emptied once the batch is staged, so a failed load loses
    /// the batch; the error is returned and the run is expected to stop.
    /// An empty buffer is a no-op.
    pub async fn flush(&mut self) -> Result<FlushResult, BulkLoadError> {
        if self.buffer.is_empty() {
            return Ok(FlushResult {
                staged: 0,
                loaded: 0,
            });
        }

        let count = self.buffer.len();
        log::debug!("Flushing batch of {} records", count);

        let staged = stage_batch(&self.buffer)?;
        self.buffer.clear();
        let loaded = self.loader.load(staged).await?;

        let result = FlushResult {
            staged: count,
            loaded,
        };
        self.stats.record(result);
        info!(
            "Committed batch {} ({} rows, {} total)",
            self.stats.batches, loaded, self.stats.rows_loaded
        );
        Ok(result)
    }

    /// Flushes the final partial batch and returns the writer's totals.
    pub async fn finish(mut self) -> Result<BatchStats, BulkLoadError> {
        self.flush().await?;
        Ok(self.stats)
    }
}
