// Shared test helpers for fixture dumps and database inspection.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use sqlx::{Connection, SqliteConnection};

use osm_changesets::{Config, DatabaseConfig};

/// One `<changeset>` element with the required attributes plus `extra`.
#[allow(dead_code)] // Used by other test files
pub fn changeset_xml(id: i64, extra: &str) -> String {
    format!(
        "  <changeset id=\"{id}\" created_at=\"2016-07-04T09:30:00Z\" open=\"false\" \
         comments_count=\"0\" num_changes=\"4\" {extra}/>"
    )
}

/// Wraps changeset elements in an `<osm>` document.
#[allow(dead_code)]
pub fn osm_document(elements: &[String]) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <osm version=\"0.6\" generator=\"planet-dump-ng 1.2.4\">\n\
         {}\n</osm>\n",
        elements.join("\n")
    )
}

/// Writes `xml` to `dir/name`, compressed according to the extension.
#[allow(dead_code)]
pub fn write_dump(dir: &Path, name: &str, xml: &str) -> PathBuf {
    let path = dir.join(name);
    let file = File::create(&path).expect("Failed to create fixture file");
    if name.ends_with(".bz2") {
        let mut encoder = bzip2::write::BzEncoder::new(file, bzip2::Compression::default());
        encoder.write_all(xml.as_bytes()).expect("Failed to write bz2 fixture");
        encoder.finish().expect("Failed to finish bz2 fixture");
    } else if name.ends_with(".gz") {
        let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        encoder.write_all(xml.as_bytes()).expect("Failed to write gz fixture");
        encoder.finish().expect("Failed to finish gz fixture");
    } else {
        let mut file = file;
        file.write_all(xml.as_bytes()).expect("Failed to write fixture");
    }
    path
}

/// SQLite URL for a database file inside `dir`.
#[allow(dead_code)]
pub fn sqlite_url(dir: &Path) -> String {
    format!("sqlite://{}", dir.join("changesets.db").display())
}

/// Ingest configuration targeting a SQLite database that is created on demand.
#[allow(dead_code)]
pub fn sqlite_config(file: PathBuf, url: &str, batch_size: usize, unique_ids: bool) -> Config {
    Config {
        file,
        batch_size,
        database: DatabaseConfig {
            url: Some(url.to_string()),
            ..Default::default()
        },
        create_table: true,
        unique_ids,
        ..Default::default()
    }
}

/// Ids stored in the changesets table, in ascending order.
#[allow(dead_code)]
pub async fn stored_ids(url: &str) -> Vec<i64> {
    let mut conn = SqliteConnection::connect(url)
        .await
        .expect("Failed to open test database");
    let ids = sqlx::query_scalar::<_, i64>("SELECT id FROM changesets ORDER BY id")
        .fetch_all(&mut conn)
        .await
        .expect("Failed to query ids");
    conn.close().await.expect("Failed to close test database");
    ids
}
