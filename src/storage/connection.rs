//! Database connection management.
//!
//! A run uses exactly one connection. It is opened here, moved into a bulk
//! loader, and closed by the pipeline when the run ends.

use std::str::FromStr;

use log::{error, info};
use sqlx::postgres::PgConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection};

use crate::error_handling::{BulkLoadError, ConfigError};

/// Storage engine behind a connection URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    Sqlite,
}

impl Backend {
    /// Picks the backend from the URL scheme.
    pub fn from_url(url: &str) -> Result<Self, ConfigError> {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(Backend::Postgres)
        } else if url.starts_with("sqlite:") {
            Ok(Backend::Sqlite)
        } else {
            Err(ConfigError::UnsupportedDatabaseUrl(redact(url)))
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Backend::Postgres => "PostgreSQL",
            Backend::Sqlite => "SQLite",
        }
    }
}

/// Opens a PostgreSQL connection.
pub async fn connect_postgres(url: &str) -> Result<PgConnection, BulkLoadError> {
    let conn = PgConnection::connect(url).await.map_err(|e| {
        error!("Failed to connect to {}: {e}", redact(url));
        BulkLoadError::Connect {
            backend: Backend::Postgres.name(),
            source: e,
        }
    })?;
    info!("Connected to {}", redact(url));
    Ok(conn)
}

/// Opens a SQLite connection, creating the database file if it does not exist.
pub async fn connect_sqlite(url: &str) -> Result<SqliteConnection, BulkLoadError> {
    let connect_error = |e: sqlx::Error| {
        error!("Failed to connect to {url}: {e}");
        BulkLoadError::Connect {
            backend: Backend::Sqlite.name(),
            source: e,
        }
    };
    let conn = SqliteConnectOptions::from_str(url)
        .map_err(connect_error)?
        .create_if_missing(true)
        .connect()
        .await
        .map_err(connect_error)?;
    info!("Connected to {url}");
    Ok(conn)
}

/// Strips the password from a URL before it is logged.
fn redact(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    match rest.split_once('@') {
        Some((credentials, host)) => match credentials.split_once(':') {
            Some((user, _password)) => format!("{scheme}://{user}:***@{host}"),
            None => url.to_string(),
        },
        None => url.to_string(),
    }
}
