//! Error handling.
//!
//! Errors are grouped by the stage that raises them:
//! - **Usage**: bad command line or missing input, nothing has run
//! - **Stream parse**: the compressed XML cannot be read
//! - **Malformed record**: a changeset element fails validation
//! - **Bulk load**: staging, transfer or commit failed
//!
//! [`IngestError`] wraps all of them for the pipeline driver.

mod types;

// Re-export public API
pub use types::{
    BulkLoadError, ConfigError, IngestError, InitializationError, MalformedRecordError,
    StreamParseError, UsageError,
};
