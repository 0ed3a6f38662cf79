//! Application initialization.
//!
//! Process-wide setup that has to happen before a run starts. The database
//! connection is opened by the pipeline and owned by the bulk loader.

mod logger;

// Re-export public API
pub use logger::init_logger_with;
