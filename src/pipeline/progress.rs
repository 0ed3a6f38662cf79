//! Progress reporting for long ingests.

use std::time::Instant;

use log::info;

/// Counts constructed records and logs a progress line every `interval` records.
pub(crate) struct Progress {
    interval: u64,
    records: u64,
    start: Instant,
}

impl Progress {
    /// An `interval` of zero disables progress lines.
    pub(crate) fn new(interval: usize) -> Self {
        Self {
            interval: interval as u64,
            records: 0,
            start: Instant::now(),
        }
    }

    /// Counts one record and returns whether a progress line was logged.
    pub(crate) fn record(&mut self) -> bool {
        self.records += 1;
        if self.interval == 0 || self.records % self.interval != 0 {
            return false;
        }
        let elapsed_secs = self.elapsed_seconds();
        let rate = if elapsed_secs > 0.0 {
            self.records as f64 / elapsed_secs
        } else {
            0.0
        };
        info!(
            "Processed {} changesets in {:.2} seconds (~{:.2} changesets/sec)",
            self.records, elapsed_secs, rate
        );
        true
    }

    pub(crate) fn records(&self) -> u64 {
        self.records
    }

    pub(crate) fn elapsed_seconds(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}
