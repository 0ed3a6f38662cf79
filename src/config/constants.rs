//! Configuration constants.
//!
//! This module defines the fixed names, formats and operational limits used
//! throughout the ingestion pipeline.

/// Number of changesets collected before a batch is bulk-loaded.
///
/// Each batch is one transaction, so this also bounds how much work a failed
/// run throws away.
pub const DEFAULT_BATCH_SIZE: usize = 1_000_000;

/// Emit a progress line every this many parsed records.
pub const PROGRESS_INTERVAL: usize = 100_000;

/// Target table for the loaded changesets.
pub const TABLE_NAME: &str = "changesets";

/// XML element name of one record in the dump.
pub const RECORD_TAG: &str = "changeset";

/// Timestamp format used by the dump (UTC, literal `Z`, no offsets).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Timestamp format written to the transfer format and insert statements.
pub const STORE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Null-marker token of the COPY text format.
pub const NULL_MARKER: &str = "\\N";

/// Value substituted for a missing `uid` ("unknown user").
pub const UNKNOWN_UID: i64 = -1;

/// Value substituted for a missing spatial bound.
///
/// This is a lossy default: it cannot be told apart from a real zero
/// coordinate once stored.
pub const DEFAULT_BOUND: f64 = 0.0;

/// Size of the chunks streamed from the staging file into `COPY`.
pub const COPY_CHUNK_SIZE: usize = 64 * 1024;

/// Buffer size for the decompressed XML stream.
pub const READ_BUFFER_SIZE: usize = 256 * 1024;

// Connection defaults
pub const DEFAULT_DB_NAME: &str = "osm";
pub const DEFAULT_DB_USER: &str = "osm";
pub const DEFAULT_DB_HOST: &str = "localhost";
pub const DEFAULT_DB_PORT: u16 = 5432;

// Environment variables that externalize the fixed configuration
pub const ENV_DB_NAME: &str = "OSM_DB_NAME";
pub const ENV_DB_USER: &str = "OSM_DB_USER";
pub const ENV_DB_HOST: &str = "OSM_DB_HOST";
pub const ENV_DB_PORT: &str = "OSM_DB_PORT";
pub const ENV_DATABASE_URL: &str = "OSM_DATABASE_URL";
pub const ENV_BATCH_SIZE: &str = "OSM_BATCH_SIZE";
pub const ENV_CREATE_TABLE: &str = "OSM_CREATE_TABLE";
pub const ENV_UNIQUE_IDS: &str = "OSM_UNIQUE_IDS";
