//! SQLite loader.
//!
//! SQLite has no COPY protocol, so the staged rows are read back, decoded
//! column by column and inserted through one prepared statement inside a
//! single transaction per batch.

use std::io::BufRead;

use sqlx::sqlite::{SqliteArguments, SqliteConnection};
use sqlx::{Connection, Sqlite};
use strum::IntoEnumIterator;

use crate::changeset::{quoted_column_list, unescape_copy_text, Column, ColumnKind};
use crate::config::{NULL_MARKER, TABLE_NAME};
use crate::error_handling::BulkLoadError;
use crate::storage::connection::connect_sqlite;
use crate::storage::schema::create_table_statement;
use crate::storage::staging::StagedBatch;
use crate::storage::Backend;

use super::{check_row_count, BulkLoader};

type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// Loads staged batches into SQLite.
pub struct SqliteLoader {
    conn: SqliteConnection,
    insert_statement: String,
}

/// One decoded field of a staged row.
#[derive(Debug, Clone, PartialEq)]
enum StagedValue {
    Null,
    Integer(i64),
    Real(f64),
    Bool(bool),
    Text(String),
}

impl SqliteLoader {
    /// Connects to `url`, creating the database file when missing.
    pub async fn connect(url: &str) -> Result<Self, BulkLoadError> {
        Ok(Self::new(connect_sqlite(url).await?))
    }

    pub fn new(conn: SqliteConnection) -> Self {
        Self {
            conn,
            insert_statement: insert_statement(),
        }
    }

    /// Direct access to the connection, for inspection after a load.
    pub fn connection(&mut self) -> &mut SqliteConnection {
        &mut self.conn
    }
}

impl BulkLoader for SqliteLoader {
    fn backend(&self) -> Backend {
        Backend::Sqlite
    }

    async fn create_table(&mut self, unique_ids: bool) -> Result<(), BulkLoadError> {
        sqlx::query(&create_table_statement(Backend::Sqlite, unique_ids))
            .execute(&mut self.conn)
            .await
            .map_err(BulkLoadError::Schema)?;
        Ok(())
    }

    async fn load(&mut self, staged: StagedBatch) -> Result<u64, BulkLoadError> {
        let expected = staged.rows() as u64;
        let mut tx = self.conn.begin().await.map_err(BulkLoadError::Transfer)?;

        let mut loaded = 0u64;
        for (index, line) in staged.into_reader().lines().enumerate() {
            let line = line?;
            let values = parse_staged_row(&line).map_err(|reason| {
                BulkLoadError::MalformedStagedRow {
                    line: index + 1,
                    reason,
                }
            })?;
            let query = values
                .into_iter()
                .fold(sqlx::query(&self.insert_statement), bind_value);
            let result = query
                .execute(&mut *tx)
                .await
                .map_err(BulkLoadError::Transfer)?;
            loaded += result.rows_affected();
        }

        check_row_count(expected, loaded)?;

        tx.commit().await.map_err(BulkLoadError::Commit)?;
        Ok(loaded)
    }

    async fn close(self) -> Result<(), BulkLoadError> {
        self.conn.close().await.map_err(BulkLoadError::Close)
    }
}

fn insert_statement() -> String {
    let placeholders = vec!["?"; Column::COUNT].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        TABLE_NAME,
        quoted_column_list(),
        placeholders
    )
}

fn bind_value(query: SqliteQuery<'_>, value: StagedValue) -> SqliteQuery<'_> {
    match value {
        StagedValue::Null => query.bind(None::<String>),
        StagedValue::Integer(v) => query.bind(v),
        StagedValue::Real(v) => query.bind(v),
        StagedValue::Bool(v) => query.bind(v),
        StagedValue::Text(v) => query.bind(v),
    }
}

/// Decodes one staged line back into typed values.
fn parse_staged_row(line: &str) -> Result<Vec<StagedValue>, String> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != Column::COUNT {
        return Err(format!(
            "expected {} fields, found {}",
            Column::COUNT,
            fields.len()
        ));
    }

    Column::iter()
        .zip(fields)
        .map(|(column, field)| parse_staged_field(column, field))
        .collect()
}

fn parse_staged_field(column: Column, field: &str) -> Result<StagedValue, String> {
    if field == NULL_MARKER {
        return if column.is_nullable() {
            Ok(StagedValue::Null)
        } else {
            Err(format!("null marker in non-nullable column {}", column.as_str()))
        };
    }

    let invalid = |reason: &dyn std::fmt::Display| {
        format!("column {}: {:?}: {}", column.as_str(), field, reason)
    };
    match column.kind() {
        ColumnKind::BigInt | ColumnKind::Integer => field
            .parse::<i64>()
            .map(StagedValue::Integer)
            .map_err(|e| invalid(&e)),
        ColumnKind::Double => field
            .parse::<f64>()
            .map(StagedValue::Real)
            .map_err(|e| invalid(&e)),
        ColumnKind::Boolean => match field {
            "true" => Ok(StagedValue::Bool(true)),
            "false" => Ok(StagedValue::Bool(false)),
            _ => Err(invalid(&"expected true or false")),
        },
        ColumnKind::Text | ColumnKind::Timestamp => {
            Ok(StagedValue::Text(unescape_copy_text(field).into_owned()))
        }
    }
}
