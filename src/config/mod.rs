//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (table name, formats, limits)
//! - CLI option types and parsing
//! - Library configuration with environment overrides

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{validate_input_path, Config, DatabaseConfig, LogFormat, LogLevel, Opt};
