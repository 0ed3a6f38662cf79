//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};

use crate::config::constants::*;
use crate::error_handling::{ConfigError, UsageError};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Command-line options.
///
/// The only positional argument is the dump to ingest. Connection parameters
/// are fixed configuration and come from [`DatabaseConfig`], not from flags.
///
/// # Examples
///
/// ```bash
/// osm_changesets changesets-latest.osm.bz2
///
/// # Verbose, machine-readable logs
/// osm_changesets changesets-latest.osm.bz2 --log-level debug --log-format json
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "osm_changesets",
    about = "Bulk-loads a compressed OSM changeset dump into the changesets table."
)]
pub struct Opt {
    /// Compressed XML changeset dump (.bz2, .gz or plain .osm)
    #[arg(value_parser = parse_input_path)]
    pub file: PathBuf,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

/// Clap value parser that rejects paths which do not exist, so a bad path is
/// reported with the usage text like any other argument error.
fn parse_input_path(raw: &str) -> Result<PathBuf, UsageError> {
    let path = PathBuf::from(raw);
    validate_input_path(&path)?;
    Ok(path)
}

/// Checks that the input dump exists and is a regular file.
pub fn validate_input_path(path: &Path) -> Result<(), UsageError> {
    if !path.exists() {
        return Err(UsageError::MissingInput(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(UsageError::NotAFile(path.to_path_buf()));
    }
    Ok(())
}

/// Connection parameters for the target store.
///
/// `url`, when set, wins over the individual parts and may point at either
/// PostgreSQL (`postgres://`) or SQLite (`sqlite:`).
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub name: String,
    pub user: String,
    pub host: String,
    pub port: u16,
    pub url: Option<String>,
}

impl DatabaseConfig {
    /// Returns the URL used to open the connection.
    pub fn connection_url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!(
                "postgres://{}@{}:{}/{}",
                self.user, self.host, self.port, self.name
            ),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_DB_NAME.to_string(),
            user: DEFAULT_DB_USER.to_string(),
            host: DEFAULT_DB_HOST.to_string(),
            port: DEFAULT_DB_PORT,
            url: None,
        }
    }
}

/// Library configuration (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use osm_changesets::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     file: PathBuf::from("changesets.osm.bz2"),
///     batch_size: 50_000,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Dump to ingest
    pub file: PathBuf,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Records per bulk-load transaction
    pub batch_size: usize,

    /// Records between progress log lines
    pub progress_interval: usize,

    /// Target store connection
    pub database: DatabaseConfig,

    /// Issue `CREATE TABLE IF NOT EXISTS` before loading
    pub create_table: bool,

    /// Declare `id` as primary key when creating the table
    pub unique_ids: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file: PathBuf::from("changesets-latest.osm.bz2"),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            batch_size: DEFAULT_BATCH_SIZE,
            progress_interval: PROGRESS_INTERVAL,
            database: DatabaseConfig::default(),
            create_table: false,
            unique_ids: true,
        }
    }
}

impl Config {
    /// Builds the configuration from parsed CLI options and the process environment.
    pub fn from_env(opt: Opt) -> Result<Self, ConfigError> {
        Self::from_lookup(opt, |key| std::env::var(key).ok())
    }

    /// Builds the configuration from parsed CLI options and a variable lookup.
    pub fn from_lookup<F>(opt: Opt, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let mut database = DatabaseConfig::default();
        if let Some(name) = lookup(ENV_DB_NAME) {
            database.name = name;
        }
        if let Some(user) = lookup(ENV_DB_USER) {
            database.user = user;
        }
        if let Some(host) = lookup(ENV_DB_HOST) {
            database.host = host;
        }
        if let Some(port) = lookup(ENV_DB_PORT) {
            database.port = parse_number(ENV_DB_PORT, &port)?;
        }
        database.url = lookup(ENV_DATABASE_URL).filter(|url| !url.trim().is_empty());

        let batch_size = match lookup(ENV_BATCH_SIZE) {
            Some(raw) => parse_number(ENV_BATCH_SIZE, &raw)?,
            None => defaults.batch_size,
        };
        if batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: ENV_BATCH_SIZE,
                value: "0".to_string(),
                reason: "batch size must be at least 1".to_string(),
            });
        }

        let create_table = match lookup(ENV_CREATE_TABLE) {
            Some(raw) => parse_flag(ENV_CREATE_TABLE, &raw)?,
            None => defaults.create_table,
        };
        let unique_ids = match lookup(ENV_UNIQUE_IDS) {
            Some(raw) => parse_flag(ENV_UNIQUE_IDS, &raw)?,
            None => defaults.unique_ids,
        };

        Ok(Self {
            file: opt.file,
            log_level: opt.log_level,
            log_format: opt.log_format,
            batch_size,
            progress_interval: defaults.progress_interval,
            database,
            create_table,
            unique_ids,
        })
    }
}

fn parse_number<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
            reason: e.to_string(),
        })
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
            reason: "expected a boolean (true/false/1/0)".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn opt_for(path: &str) -> Opt {
        Opt {
            file: PathBuf::from(path),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.batch_size, 1_000_000);
        assert!(!config.create_table);
        assert!(config.unique_ids);
        assert_eq!(
            config.database.connection_url(),
            "postgres://osm@localhost:5432/osm"
        );
    }

    #[test]
    fn test_from_lookup_without_overrides_uses_defaults() {
        let config = Config::from_lookup(opt_for("dump.osm.bz2"), lookup_from(&[]))
            .expect("defaults should be valid");
        assert_eq!(config.file, PathBuf::from("dump.osm.bz2"));
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.database, DatabaseConfig::default());
    }

    #[test]
    fn test_from_lookup_applies_overrides() {
        let config = Config::from_lookup(
            opt_for("dump.osm.bz2"),
            lookup_from(&[
                (ENV_DB_NAME, "planet"),
                (ENV_DB_USER, "loader"),
                (ENV_DB_HOST, "db.internal"),
                (ENV_DB_PORT, "6432"),
                (ENV_BATCH_SIZE, "5000"),
                (ENV_CREATE_TABLE, "yes"),
                (ENV_UNIQUE_IDS, "0"),
            ]),
        )
        .expect("overrides should be valid");
        assert_eq!(config.batch_size, 5000);
        assert!(config.create_table);
        assert!(!config.unique_ids);
        assert_eq!(
            config.database.connection_url(),
            "postgres://loader@db.internal:6432/planet"
        );
    }

    #[test]
    fn test_database_url_wins_over_parts() {
        let config = Config::from_lookup(
            opt_for("dump.osm"),
            lookup_from(&[
                (ENV_DB_NAME, "ignored"),
                (ENV_DATABASE_URL, "sqlite://./changesets.db"),
            ]),
        )
        .unwrap();
        assert_eq!(
            config.database.connection_url(),
            "sqlite://./changesets.db"
        );
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let err = Config::from_lookup(opt_for("dump.osm"), lookup_from(&[(ENV_BATCH_SIZE, "0")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: ENV_BATCH_SIZE,
                ..
            }
        ));
    }

    #[test]
    fn test_non_numeric_port_is_rejected() {
        let err = Config::from_lookup(opt_for("dump.osm"), lookup_from(&[(ENV_DB_PORT, "pg")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_DB_PORT));
    }

    #[test]
    fn test_bad_flag_is_rejected() {
        let err = Config::from_lookup(
            opt_for("dump.osm"),
            lookup_from(&[(ENV_CREATE_TABLE, "maybe")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_validate_input_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("dump.osm");
        std::fs::write(&file, "<osm/>").unwrap();

        assert!(validate_input_path(&file).is_ok());
        assert!(matches!(
            validate_input_path(&dir.path().join("absent.osm.bz2")),
            Err(UsageError::MissingInput(_))
        ));
        assert!(matches!(
            validate_input_path(dir.path()),
            Err(UsageError::NotAFile(_))
        ));
    }
}
