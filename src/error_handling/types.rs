//! Error type definitions.
//!
//! This module defines the error taxonomy of an ingestion run. Every variant is
//! fatal to the run; nothing in the pipeline retries.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use log::SetLoggerError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}

/// Bad or missing command-line input. No work is performed.
#[derive(Error, Debug)]
pub enum UsageError {
    /// The input path does not exist.
    #[error("input file does not exist: {}", .0.display())]
    MissingInput(PathBuf),

    /// The input path exists but is not a regular file.
    #[error("input path is not a file: {}", .0.display())]
    NotAFile(PathBuf),
}

/// Invalid externalized configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A configuration value failed to parse or is out of range.
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    /// The database URL names a backend this crate cannot load into.
    #[error("unsupported database URL (expected postgres:// or sqlite:): {0}")]
    UnsupportedDatabaseUrl(String),
}

/// Malformed or truncated compressed/XML input.
#[derive(Error, Debug)]
pub enum StreamParseError {
    /// The input could not be opened.
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The XML (or the decompressor underneath it) failed.
    #[error("XML error at byte {position}: {message}")]
    Xml { position: u64, message: String },

    /// A record element carried an attribute that could not be decoded.
    #[error("invalid attribute at byte {position}: {message}")]
    Attribute { position: u64, message: String },

    /// The stream ended before every open element was closed.
    #[error("input ended with {depth} unclosed element(s); the stream is truncated")]
    Truncated { depth: usize },

    /// The stream ended without a single element: empty, not XML, or still
    /// compressed.
    #[error("input has no root element after {bytes} bytes; it is empty or not an XML dump")]
    NoRootElement { bytes: u64 },
}

/// A record whose required field is absent or fails coercion.
///
/// Always names the offending field, and the raw value when there is one.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MalformedRecordError {
    /// A required attribute is absent.
    #[error("missing required attribute `{field}`")]
    Missing { field: &'static str },

    /// An attribute is present but cannot be coerced to its column type.
    #[error("invalid value {value:?} for attribute `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// `closed_at` precedes `created_at`.
    #[error("changeset {id} closed at {closed_at} before it was created at {created_at}")]
    ClosedBeforeCreated {
        id: i64,
        created_at: DateTime<Utc>,
        closed_at: DateTime<Utc>,
    },
}

impl MalformedRecordError {
    /// Name of the attribute the error is about.
    pub fn field(&self) -> &'static str {
        match self {
            MalformedRecordError::Missing { field } => field,
            MalformedRecordError::Invalid { field, .. } => field,
            MalformedRecordError::ClosedBeforeCreated { .. } => "closed_at",
        }
    }
}

/// Staging, transfer or commit failure at the storage layer.
///
/// The batch in flight is never committed when one of these is returned.
#[derive(Error, Debug)]
pub enum BulkLoadError {
    /// Opening the database connection failed.
    #[error("failed to connect to {backend} database: {source}")]
    Connect {
        backend: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// Writing or reading the staging file failed.
    #[error("staging error: {0}")]
    Staging(#[from] std::io::Error),

    /// The bulk transfer itself failed.
    #[error("bulk transfer failed: {0}")]
    Transfer(#[source] sqlx::Error),

    /// The transfer succeeded but the commit did not.
    #[error("commit failed: {0}")]
    Commit(#[source] sqlx::Error),

    /// The store accepted a different number of rows than were staged.
    #[error("bulk transfer loaded {actual} rows, expected {expected}")]
    RowCountMismatch { expected: u64, actual: u64 },

    /// A staged line does not match the transfer format.
    #[error("staged row {line} is malformed: {reason}")]
    MalformedStagedRow { line: usize, reason: String },

    /// Schema bootstrap failed.
    #[error("failed to create table: {0}")]
    Schema(#[source] sqlx::Error),

    /// Closing the connection failed.
    #[error("failed to close database connection: {0}")]
    Close(#[source] sqlx::Error),
}

/// Top-level error of an ingestion run.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("usage error: {0}")]
    Usage(#[from] UsageError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("stream parse error: {0}")]
    StreamParse(#[from] StreamParseError),

    #[error("malformed record: {0}")]
    MalformedRecord(#[from] MalformedRecordError),

    #[error("bulk load error: {0}")]
    BulkLoad(#[from] BulkLoadError),
}

impl IngestError {
    /// Process exit status for this error: `2` for usage problems (the same
    /// status clap uses), `1` for everything that aborted a run.
    pub fn exit_code(&self) -> i32 {
        match self {
            IngestError::Usage(_) | IngestError::Config(_) => 2,
            _ => 1,
        }
    }
}
