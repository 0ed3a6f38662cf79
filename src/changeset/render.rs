//! Serialization views of a changeset.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use strum::IntoEnumIterator;

use crate::config::{NULL_MARKER, STORE_TIMESTAMP_FORMAT, TABLE_NAME};

use super::{quoted_column_list, Changeset, Column};

impl Changeset {
    /// Renders the changeset as one row of the bulk-load transfer format.
    ///
    /// Fields follow [`Column`] declaration order and are joined by a single
    /// tab. Absent values (`closed_at`, `user`) become the null marker `\N`;
    /// defaulted values (`uid = -1`, bounds `0.0`) are rendered as values.
    /// The row carries no line terminator.
    pub fn to_tsv_row(&self) -> String {
        Column::iter()
            .map(|column| match self.column_value(column) {
                Some(value) => escape_copy_text(&value).into_owned(),
                None => NULL_MARKER.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\t")
    }

    /// Renders a literal single-row `INSERT` for this changeset.
    ///
    /// Not used by the bulk path.
    pub fn to_insert_statement(&self) -> String {
        let values = Column::iter()
            .map(|column| match self.column_value(column) {
                None => "NULL".to_string(),
                Some(value) if column.is_quoted() => format!("'{}'", value.replace('\'', "''")),
                Some(value) => value,
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            TABLE_NAME,
            quoted_column_list(),
            values
        )
    }

    /// Textual value of one column, `None` for a true null.
    fn column_value(&self, column: Column) -> Option<String> {
        match column {
            Column::Id => Some(self.id.to_string()),
            Column::CreatedAt => Some(format_timestamp(&self.created_at)),
            Column::ClosedAt => self.closed_at.as_ref().map(format_timestamp),
            Column::Open => Some(self.open.to_string()),
            Column::User => self.user.clone(),
            Column::Uid => Some(self.uid.to_string()),
            Column::MinLat => Some(format_float(self.min_lat)),
            Column::MaxLat => Some(format_float(self.max_lat)),
            Column::MinLon => Some(format_float(self.min_lon)),
            Column::MaxLon => Some(format_float(self.max_lon)),
            Column::CommentsCount => Some(self.comments_count.to_string()),
            Column::NumChanges => Some(self.num_changes.to_string()),
        }
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(STORE_TIMESTAMP_FORMAT).to_string()
}

/// `Debug` keeps the decimal point (`0.0`, `12.5`) and round-trips exactly.
fn format_float(value: f64) -> String {
    format!("{value:?}")
}

/// Escapes backslash, tab, newline and carriage return for the COPY text format.
pub(crate) fn escape_copy_text(value: &str) -> Cow<'_, str> {
    if !value.contains(['\\', '\t', '\n', '\r']) {
        return Cow::Borrowed(value);
    }
    let mut escaped = String::with_capacity(value.len() + 4);
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '\t' => escaped.push_str("\\t"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

/// Reverses [`escape_copy_text`]. Unknown escapes keep the escaped character.
pub(crate) fn unescape_copy_text(field: &str) -> Cow<'_, str> {
    if !field.contains('\\') {
        return Cow::Borrowed(field);
    }
    let mut unescaped = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            unescaped.push(ch);
            continue;
        }
        match chars.next() {
            Some('t') => unescaped.push('\t'),
            Some('n') => unescaped.push('\n'),
            Some('r') => unescaped.push('\r'),
            Some(other) => unescaped.push(other),
            None => unescaped.push('\\'),
        }
    }
    Cow::Owned(unescaped)
}
