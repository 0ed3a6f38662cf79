//! Shared test helpers for storage module tests.
//!
//! This module provides sample records, an in-memory SQLite loader and a
//! loader that only records what it was given.

use std::io::BufRead;

use crate::changeset::{Changeset, RawAttributes};
use crate::error_handling::BulkLoadError;
use crate::storage::loader::{BulkLoader, SqliteLoader};
use crate::storage::staging::StagedBatch;
use crate::storage::Backend;

/// A closed, valid changeset with `user = "mapper{id}"` and no bounds.
pub fn sample_changeset(id: i64) -> Changeset {
    let attrs: RawAttributes = [
        ("id", id.to_string()),
        ("created_at", "2012-05-01T10:00:00Z".to_string()),
        ("open", "false".to_string()),
        ("user", format!("mapper{id}")),
        ("uid", (id * 10).to_string()),
        ("comments_count", "0".to_string()),
        ("num_changes", "3".to_string()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();
    Changeset::from_attributes(&attrs).expect("sample changeset is valid")
}

/// SQLite loader over a fresh in-memory database with the table created.
pub async fn memory_loader(unique_ids: bool) -> SqliteLoader {
    let mut loader = SqliteLoader::connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    loader
        .create_table(unique_ids)
        .await
        .expect("Failed to create changesets table");
    loader
}

/// Loader that keeps the ids of every batch it receives.
#[derive(Debug, Default)]
pub struct RecordingLoader {
    pub batches: Vec<Vec<i64>>,
    /// 1-based load call that fails, if any.
    pub fail_on: Option<usize>,
    calls: usize,
}

impl RecordingLoader {
    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on: Some(call),
            ..Self::default()
        }
    }
}

impl BulkLoader for RecordingLoader {
    fn backend(&self) -> Backend {
        Backend::Sqlite
    }

    async fn create_table(&mut self, _unique_ids: bool) -> Result<(), BulkLoadError> {
        Ok(())
    }

    async fn load(&mut self, staged: StagedBatch) -> Result<u64, BulkLoadError> {
        self.calls += 1;
        if self.fail_on == Some(self.calls) {
            return Err(BulkLoadError::Transfer(sqlx::Error::Protocol(
                "injected failure".to_string(),
            )));
        }
        let mut ids = Vec::new();
        for line in staged.into_reader().lines() {
            let line = line?;
            let id = line
                .split('\t')
                .next()
                .and_then(|field| field.parse().ok())
                .expect("staged row starts with an id");
            ids.push(id);
        }
        let loaded = ids.len() as u64;
        self.batches.push(ids);
        Ok(loaded)
    }

    async fn close(self) -> Result<(), BulkLoadError> {
        Ok(())
    }
}
