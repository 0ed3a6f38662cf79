//! Batch configuration and bookkeeping types.

use crate::config::DEFAULT_BATCH_SIZE;

/// Configuration for batch writing.
#[derive(Debug, Clone, Copy)]
pub struct BatchConfig {
    /// Records per batch. Must be at least 1.
    pub batch_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Outcome of one flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushResult {
    /// Rows staged for transfer.
    pub staged: usize,
    /// Rows the store reported as loaded.
    pub loaded: u64,
}

/// Running totals of a writer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub batches: usize,
    pub rows_staged: usize,
    pub rows_loaded: u64,
    /// Size of every committed batch, in commit order.
    pub batch_sizes: Vec<usize>,
}

impl BatchStats {
    pub(crate) fn record(&mut self, result: FlushResult) {
        self.batches += 1;
        self.rows_staged += result.staged;
        self.rows_loaded += result.loaded;
        self.batch_sizes.push(result.staged);
    }
}
