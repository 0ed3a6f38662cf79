//! Column layout of the `changesets` table.

use strum_macros::EnumIter as EnumIterMacro;

use crate::storage::Backend;

/// Columns of the target table, in declaration order.
///
/// The declaration order is the field order of the transfer format, so the
/// variants must never be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum Column {
    Id,
    CreatedAt,
    ClosedAt,
    Open,
    User,
    Uid,
    MinLat,
    MaxLat,
    MinLon,
    MaxLon,
    CommentsCount,
    NumChanges,
}

/// Storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    BigInt,
    Integer,
    Timestamp,
    Boolean,
    Text,
    Double,
}

impl Column {
    /// Number of columns in a row.
    pub const COUNT: usize = 12;

    /// Column name, identical to the XML attribute name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::CreatedAt => "created_at",
            Column::ClosedAt => "closed_at",
            Column::Open => "open",
            Column::User => "user",
            Column::Uid => "uid",
            Column::MinLat => "min_lat",
            Column::MaxLat => "max_lat",
            Column::MinLon => "min_lon",
            Column::MaxLon => "max_lon",
            Column::CommentsCount => "comments_count",
            Column::NumChanges => "num_changes",
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Id | Column::Uid => ColumnKind::BigInt,
            Column::CommentsCount | Column::NumChanges => ColumnKind::Integer,
            Column::CreatedAt | Column::ClosedAt => ColumnKind::Timestamp,
            Column::Open => ColumnKind::Boolean,
            Column::User => ColumnKind::Text,
            Column::MinLat | Column::MaxLat | Column::MinLon | Column::MaxLon => {
                ColumnKind::Double
            }
        }
    }

    /// Whether the column can hold the null marker. Defaulted columns
    /// (`uid`, bounds) always carry a value.
    pub fn is_nullable(&self) -> bool {
        matches!(self, Column::ClosedAt | Column::User)
    }

    /// Whether an insert statement quotes this column's literal.
    pub fn is_quoted(&self) -> bool {
        matches!(self.kind(), ColumnKind::Text | ColumnKind::Timestamp)
    }
}

impl ColumnKind {
    /// SQL type used when creating the table on `backend`.
    pub fn sql_type(&self, backend: Backend) -> &'static str {
        match (backend, self) {
            (Backend::Postgres, ColumnKind::BigInt) => "BIGINT",
            (Backend::Postgres, ColumnKind::Integer) => "INTEGER",
            (Backend::Postgres, ColumnKind::Timestamp) => "TIMESTAMP",
            (Backend::Postgres, ColumnKind::Boolean) => "BOOLEAN",
            (Backend::Postgres, ColumnKind::Text) => "TEXT",
            (Backend::Postgres, ColumnKind::Double) => "DOUBLE PRECISION",
            (Backend::Sqlite, ColumnKind::BigInt | ColumnKind::Integer) => "INTEGER",
            (Backend::Sqlite, ColumnKind::Timestamp | ColumnKind::Text) => "TEXT",
            (Backend::Sqlite, ColumnKind::Boolean) => "BOOLEAN",
            (Backend::Sqlite, ColumnKind::Double) => "REAL",
        }
    }
}

/// Double-quoted, comma-separated column list in declaration order.
pub fn quoted_column_list() -> String {
    use strum::IntoEnumIterator;

    Column::iter()
        .map(|column| format!("\"{}\"", column.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}
