//! Storage: batching, staging and bulk loading into the target table.

pub mod batch;
pub mod connection;
pub mod loader;
pub mod schema;
pub mod staging;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use batch::{BatchConfig, BatchStats, BatchWriter, FlushResult};
pub use connection::Backend;
pub use loader::{BulkLoader, PgLoader, SqliteLoader};
pub use schema::create_table_statement;
pub use staging::{stage_batch, StagedBatch};
