//! Table bootstrap.
//!
//! There is no migration history: the table either exists already or is
//! created once with `CREATE TABLE IF NOT EXISTS`.

use strum::IntoEnumIterator;

use crate::changeset::Column;
use crate::config::TABLE_NAME;

use super::Backend;

/// `CREATE TABLE IF NOT EXISTS` statement for the changesets table.
///
/// With `unique_ids`, `id` is the primary key and reloading an already loaded
/// dump fails on the first duplicate instead of duplicating rows.
pub fn create_table_statement(backend: Backend, unique_ids: bool) -> String {
    let definitions = Column::iter()
        .map(|column| {
            let mut definition = format!(
                "\"{}\" {}",
                column.as_str(),
                column.kind().sql_type(backend)
            );
            if column == Column::Id && unique_ids {
                definition.push_str(" PRIMARY KEY");
            } else if !column.is_nullable() {
                definition.push_str(" NOT NULL");
            }
            definition
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE IF NOT EXISTS {TABLE_NAME} ({definitions})")
}
