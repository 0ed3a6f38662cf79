//! PostgreSQL loader using `COPY ... FROM STDIN`.

use std::io::Read;

use log::debug;
use sqlx::postgres::{PgConnection, PgCopyIn};
use sqlx::Connection;

use crate::changeset::quoted_column_list;
use crate::config::{COPY_CHUNK_SIZE, TABLE_NAME};
use crate::error_handling::BulkLoadError;
use crate::storage::connection::connect_postgres;
use crate::storage::schema::create_table_statement;
use crate::storage::staging::StagedBatch;
use crate::storage::Backend;

use super::{check_row_count, BulkLoader};

/// Streams staged batches into PostgreSQL with the COPY text protocol.
///
/// Each batch runs `BEGIN; COPY ...; COMMIT`. The text format's defaults
/// (tab delimiter, `\N` null marker) are exactly the staging format.
pub struct PgLoader {
    conn: PgConnection,
    copy_statement: String,
}

impl PgLoader {
    /// Connects to `url` and wraps the connection.
    pub async fn connect(url: &str) -> Result<Self, BulkLoadError> {
        Ok(Self::new(connect_postgres(url).await?))
    }

    pub fn new(conn: PgConnection) -> Self {
        Self {
            conn,
            copy_statement: copy_statement(),
        }
    }
}

impl BulkLoader for PgLoader {
    fn backend(&self) -> Backend {
        Backend::Postgres
    }

    async fn create_table(&mut self, unique_ids: bool) -> Result<(), BulkLoadError> {
        sqlx::query(&create_table_statement(Backend::Postgres, unique_ids))
            .execute(&mut self.conn)
            .await
            .map_err(BulkLoadError::Schema)?;
        Ok(())
    }

    async fn load(&mut self, staged: StagedBatch) -> Result<u64, BulkLoadError> {
        let expected = staged.rows() as u64;
        let mut tx = self.conn.begin().await.map_err(BulkLoadError::Transfer)?;

        let mut copy = tx
            .copy_in_raw(&self.copy_statement)
            .await
            .map_err(BulkLoadError::Transfer)?;
        if let Err(e) = send_staged(&mut copy, staged, COPY_CHUNK_SIZE).await {
            if let Err(abort_error) = copy.abort(e.to_string()).await {
                debug!("COPY abort reported: {abort_error}");
            }
            // Dropping the transaction rolls it back
            return Err(e);
        }
        let loaded = copy.finish().await.map_err(BulkLoadError::Transfer)?;
        check_row_count(expected, loaded)?;

        tx.commit().await.map_err(BulkLoadError::Commit)?;
        Ok(loaded)
    }

    async fn close(self) -> Result<(), BulkLoadError> {
        self.conn.close().await.map_err(BulkLoadError::Close)
    }
}

/// `COPY changesets ("id", ...) FROM STDIN`
pub(crate) fn copy_statement() -> String {
    format!(
        "COPY {} ({}) FROM STDIN",
        TABLE_NAME,
        quoted_column_list()
    )
}

/// Destination of raw COPY data.
pub(crate) trait CopySink {
    async fn send_chunk(&mut self, chunk: &[u8]) -> Result<(), sqlx::Error>;
}

impl CopySink for PgCopyIn<&mut PgConnection> {
    async fn send_chunk(&mut self, chunk: &[u8]) -> Result<(), sqlx::Error> {
        self.send(chunk).await.map(|_| ())
    }
}

/// Streams the staged file to `sink` in chunks of at most `chunk_size` bytes.
pub(crate) async fn send_staged<S: CopySink>(
    sink: &mut S,
    staged: StagedBatch,
    chunk_size: usize,
) -> Result<(), BulkLoadError> {
    let mut reader = staged.into_reader();
    let mut chunk = vec![0u8; chunk_size];
    loop {
        let read = reader.read(&mut chunk)?;
        if read == 0 {
            return Ok(());
        }
        sink.send_chunk(&chunk[..read])
            .await
            .map_err(BulkLoadError::Transfer)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::staging::stage_batch;
    use crate::storage::test_helpers::sample_changeset;

    /// Collects every chunk; fails on the given 1-based call.
    #[derive(Default)]
    struct CollectingSink {
        chunks: Vec<Vec<u8>>,
        fail_on: Option<usize>,
    }

    impl CopySink for CollectingSink {
        async fn send_chunk(&mut self, chunk: &[u8]) -> Result<(), sqlx::Error> {
            if self.fail_on == Some(self.chunks.len() + 1) {
                return Err(sqlx::Error::Protocol("connection reset".to_string()));
            }
            self.chunks.push(chunk.to_vec());
            Ok(())
        }
    }

    fn expected_payload(ids: std::ops::RangeInclusive<i64>) -> Vec<u8> {
        ids.map(|id| format!("{}\n", sample_changeset(id).to_tsv_row()))
            .collect::<String>()
            .into_bytes()
    }

    #[tokio::test]
    async fn test_staged_batch_larger_than_chunk_is_sent_whole() {
        let records: Vec<_> = (1..=2_000).map(sample_changeset).collect();
        let staged = stage_batch(&records).unwrap();
        let total = staged.bytes() as usize;
        assert!(total > COPY_CHUNK_SIZE);

        let mut sink = CollectingSink::default();
        send_staged(&mut sink, staged, COPY_CHUNK_SIZE).await.unwrap();

        assert!(sink.chunks.len() > 1);
        assert!(sink.chunks.iter().all(|c| !c.is_empty() && c.len() <= COPY_CHUNK_SIZE));
        assert_eq!(sink.chunks.concat(), expected_payload(1..=2_000));
    }

    #[tokio::test]
    async fn test_small_chunks_preserve_row_bytes() {
        let records: Vec<_> = (1..=5).map(sample_changeset).collect();
        let mut sink = CollectingSink::default();
        send_staged(&mut sink, stage_batch(&records).unwrap(), 7)
            .await
            .unwrap();
        assert!(sink.chunks.iter().all(|c| c.len() <= 7));
        assert_eq!(sink.chunks.concat(), expected_payload(1..=5));
    }

    #[tokio::test]
    async fn test_send_failure_stops_transfer() {
        let records: Vec<_> = (1..=50).map(sample_changeset).collect();
        let mut sink = CollectingSink {
            fail_on: Some(2),
            ..Default::default()
        };
        let err = send_staged(&mut sink, stage_batch(&records).unwrap(), 64)
            .await
            .unwrap_err();
        assert!(matches!(err, BulkLoadError::Transfer(_)));
        assert_eq!(sink.chunks.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_batch_sends_nothing() {
        let mut sink = CollectingSink::default();
        send_staged(&mut sink, stage_batch(&[]).unwrap(), COPY_CHUNK_SIZE)
            .await
            .unwrap();
        assert!(sink.chunks.is_empty());
    }

    #[test]
    fn test_copy_statement_lists_columns_in_order() {
        assert_eq!(
            copy_statement(),
            "COPY changesets (\"id\", \"created_at\", \"closed_at\", \"open\", \"user\", \"uid\", \
             \"min_lat\", \"max_lat\", \"min_lon\", \"max_lon\", \"comments_count\", \"num_changes\") \
             FROM STDIN"
        );
    }
}
