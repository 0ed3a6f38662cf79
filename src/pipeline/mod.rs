//! The ingest pipeline.
//!
//! One sequential control path: decompress, parse, construct, batch, load.
//! Loading batch *n* completes (commit or error) before parsing resumes, so
//! after a failure the store holds exactly the batches committed before it.

mod progress;

use log::{error, info, warn};

use crate::changeset::Changeset;
use crate::config::{validate_input_path, Config};
use crate::error_handling::{ConfigError, IngestError};
use crate::source::ChangesetReader;
use crate::storage::{Backend, BatchConfig, BatchWriter, BulkLoader, PgLoader, SqliteLoader};

use progress::Progress;

/// Summary of a completed ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport {
    /// Records parsed and constructed
    pub records: u64,
    /// Batches committed
    pub batches: usize,
    /// Rows the store reported as loaded
    pub rows_loaded: u64,
    /// Size of every committed batch, in commit order
    pub batch_sizes: Vec<usize>,
    /// Wall-clock duration of the run
    pub elapsed_seconds: f64,
}

/// Ingests `config.file` into the store described by `config.database`.
///
/// Opens one connection, optionally creates the table, loads every record in
/// batches of `config.batch_size`, and closes the connection on every exit
/// path. Any error is fatal to the run.
///
/// # Errors
///
/// - [`IngestError::Usage`] if the input path does not name a file
/// - [`IngestError::Config`] for an unusable batch size or database URL
/// - [`IngestError::StreamParse`] for unreadable or malformed input
/// - [`IngestError::MalformedRecord`] for a record that fails validation
/// - [`IngestError::BulkLoad`] for connection, staging or load failures
pub async fn ingest(config: &Config) -> Result<IngestReport, IngestError> {
    validate_input_path(&config.file)?;
    if config.batch_size == 0 {
        return Err(ConfigError::InvalidValue {
            key: "batch_size",
            value: "0".to_string(),
            reason: "batch size must be at least 1".to_string(),
        }
        .into());
    }

    let url = config.database.connection_url();
    match Backend::from_url(&url)? {
        Backend::Postgres => run_with_loader(config, PgLoader::connect(&url).await?).await,
        Backend::Sqlite => run_with_loader(config, SqliteLoader::connect(&url).await?).await,
    }
}

/// Runs an ingest on an open loader and closes it afterwards.
///
/// An error from the run takes precedence over an error while closing.
pub async fn run_with_loader<L: BulkLoader>(
    config: &Config,
    mut loader: L,
) -> Result<IngestReport, IngestError> {
    let result = prepare_and_ingest(config, &mut loader).await;
    let closed = loader.close().await;

    match (result, closed) {
        (Ok(report), Ok(())) => Ok(report),
        (Ok(_), Err(close_error)) => Err(close_error.into()),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(close_error)) => {
            warn!("Failed to close connection after error: {close_error}");
            Err(e)
        }
    }
}

async fn prepare_and_ingest<L: BulkLoader>(
    config: &Config,
    loader: &mut L,
) -> Result<IngestReport, IngestError> {
    if config.create_table {
        info!(
            "Creating table if missing (unique ids: {})",
            config.unique_ids
        );
        loader.create_table(config.unique_ids).await?;
    }
    ingest_with_loader(config, loader).await
}

/// Streams every changeset of `config.file` through a batch writer into `loader`.
///
/// The loader is borrowed, not closed.
pub async fn ingest_with_loader<L: BulkLoader>(
    config: &Config,
    loader: &mut L,
) -> Result<IngestReport, IngestError> {
    info!(
        "Ingesting {} into {} (batch size {})",
        config.file.display(),
        loader.backend().name(),
        config.batch_size
    );

    let reader = ChangesetReader::open(&config.file)?;
    let mut writer = BatchWriter::new(
        loader,
        BatchConfig {
            batch_size: config.batch_size,
        },
    );
    let mut progress = Progress::new(config.progress_interval);

    for attributes in reader {
        let attributes = attributes.inspect_err(|e| error!("Input stream failed: {e}"))?;
        let record = Changeset::from_attributes(&attributes).inspect_err(|e| {
            error!(
                "Changeset #{} (id {}) is malformed: {e}",
                progress.records() + 1,
                attributes.get("id").map(String::as_str).unwrap_or("?")
            )
        })?;
        writer.add_record(record).await?;
        progress.record();
    }

    let stats = writer.finish().await?;
    let report = IngestReport {
        records: progress.records(),
        batches: stats.batches,
        rows_loaded: stats.rows_loaded,
        batch_sizes: stats.batch_sizes,
        elapsed_seconds: progress.elapsed_seconds(),
    };
    info!(
        "Ingest complete: {} changesets in {} batches ({:.1}s)",
        report.records, report.batches, report.elapsed_seconds
    );
    Ok(report)
}
