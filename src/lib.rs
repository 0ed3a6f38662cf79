//! osm_changesets library: streaming bulk load of OSM changeset dumps
//!
//! This library reads a compressed OpenStreetMap changeset dump, validates every
//! `<changeset>` element into a typed [`Changeset`], and loads the records into
//! a `changesets` table in large batches. Each batch is staged to a temporary
//! file and transferred in one transaction (`COPY ... FROM STDIN` on
//! PostgreSQL).
//!
//! # Example
//!
//! ```no_run
//! use osm_changesets::{ingest, Config};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     file: std::path::PathBuf::from("changesets-latest.osm.bz2"),
//!     batch_size: 100_000,
//!     ..Default::default()
//! };
//!
//! let report = ingest(&config).await?;
//! println!("Loaded {} changesets in {} batches", report.rows_loaded, report.batches);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. The pipeline is sequential, so a
//! `current_thread` runtime is sufficient.

pub mod changeset;
pub mod config;
pub mod error_handling;
pub mod initialization;
pub mod pipeline;
pub mod source;
pub mod storage;

// Re-export public API
pub use changeset::{Changeset, RawAttributes};
pub use config::{Config, DatabaseConfig, LogFormat, LogLevel, Opt};
pub use error_handling::{
    BulkLoadError, ConfigError, IngestError, MalformedRecordError, StreamParseError, UsageError,
};
pub use pipeline::{ingest, ingest_with_loader, run_with_loader, IngestReport};
pub use source::ChangesetReader;
pub use storage::{BatchConfig, BatchWriter, BulkLoader, PgLoader, SqliteLoader};
