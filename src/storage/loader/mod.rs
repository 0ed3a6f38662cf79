//! Bulk loaders.
//!
//! A loader owns the run's database connection and turns one [`StagedBatch`]
//! into one committed transaction. There is no retry and no row-level
//! isolation: any failure leaves the transaction uncommitted and is returned
//! to the caller.

mod postgres;
mod sqlite;

use log::warn;

use super::staging::StagedBatch;
use super::Backend;
use crate::error_handling::BulkLoadError;

pub use postgres::PgLoader;
pub use sqlite::SqliteLoader;

/// Destination of staged batches.
#[allow(async_fn_in_trait)]
pub trait BulkLoader {
    /// Storage engine this loader writes to.
    fn backend(&self) -> Backend;

    /// Creates the target table if it does not exist yet.
    async fn create_table(&mut self, unique_ids: bool) -> Result<(), BulkLoadError>;

    /// Transfers a staged batch and commits it as one transaction.
    ///
    /// Returns the number of rows the store accepted.
    async fn load(&mut self, staged: StagedBatch) -> Result<u64, BulkLoadError>;

    /// Closes the underlying connection.
    async fn close(self) -> Result<(), BulkLoadError>
    where
        Self: Sized;
}

/// Fails when the store accepted a different number of rows than were staged.
pub(crate) fn check_row_count(expected: u64, loaded: u64) -> Result<u64, BulkLoadError> {
    if loaded != expected {
        warn!("Store accepted {loaded} rows but {expected} were staged; rolling back");
        return Err(BulkLoadError::RowCountMismatch {
            expected,
            actual: loaded,
        });
    }
    Ok(loaded)
}
