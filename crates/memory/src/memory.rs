use crate::Database;
use crate::error::{ErrorKind, Result};
use docwatch_repository::Snapshot;
use exn::{OptionExt, ResultExt};
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::instrument;

pub const DEFAULT_KEY: &str = "svn_files";

#[derive(sqlx::FromRow)]
struct SnapshotRow {
    payload: String,
    stored_at: i64,
}

/// A snapshot read back from memory, with the time it was stored.
#[derive(Debug, Clone)]
pub struct Remembered {
    pub snapshot: Snapshot,
    pub stored_at: OffsetDateTime,
}

/// The last known state of the repository, kept between passes.
///
/// Holds exactly one [`Snapshot`] per key. With `dry_run` set, reads go to
/// the database as usual and writes are skipped.
#[derive(Debug, Clone)]
pub struct Memory {
    pool: SqlitePool,
    key: String,
    dry_run: bool,
}
impl From<&Database> for Memory {
    fn from(db: &Database) -> Self {
        Self::new(db.pool().clone(), DEFAULT_KEY, false)
    }
}
impl Memory {
    pub fn new(pool: SqlitePool, key: impl Into<String>, dry_run: bool) -> Self {
        Self { pool, key: key.into(), dry_run }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Replace whatever is stored under the key with `snapshot`.
    #[instrument(level = "debug", skip_all, fields(key = %self.key))]
    pub async fn store(&self, snapshot: &Snapshot) -> Result<()> {
        if self.dry_run {
            tracing::info!(files = snapshot.file_count(), "Dry run; not storing snapshot");
            return Ok(());
        }
        let payload = serde_json::to_string(snapshot).or_raise(|| ErrorKind::InvalidData("snapshot"))?;
        sqlx::query(include_str!("../queries/store_snapshot.sql"))
            .bind(&self.key)
            .bind(payload)
            .bind(OffsetDateTime::now_utc().unix_timestamp())
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        tracing::debug!(folders = snapshot.folder_count(), files = snapshot.file_count(), "Snapshot stored");
        Ok(())
    }

    /// Read the stored snapshot back.
    ///
    /// Returns [`ErrorKind::Empty`] if nothing has been stored yet (or since
    /// the last [`clear`](Self::clear)).
    pub async fn retrieve(&self) -> Result<Snapshot> {
        Ok(self.remember().await?.snapshot)
    }

    /// Like [`retrieve`](Self::retrieve), but also says when the snapshot
    /// was stored.
    #[instrument(level = "debug", skip_all, fields(key = %self.key))]
    pub async fn remember(&self) -> Result<Remembered> {
        let row: Option<SnapshotRow> = sqlx::query_as(include_str!("../queries/retrieve_snapshot.sql"))
            .bind(&self.key)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let row = row.ok_or_raise(|| ErrorKind::Empty(self.key.clone()))?;
        let snapshot: Snapshot =
            serde_json::from_str(&row.payload).or_raise(|| ErrorKind::InvalidData("snapshot payload"))?;
        let stored_at =
            OffsetDateTime::from_unix_timestamp(row.stored_at).or_raise(|| ErrorKind::InvalidData("stored_at"))?;
        Ok(Remembered { snapshot, stored_at })
    }

    /// Forget the stored snapshot. The next pass behaves like the first one.
    #[instrument(level = "debug", skip_all, fields(key = %self.key))]
    pub async fn clear(&self) -> Result<()> {
        if self.dry_run {
            tracing::info!("Dry run; not clearing memory");
            return Ok(());
        }
        let result = sqlx::query(include_str!("../queries/clear_snapshot.sql"))
            .bind(&self.key)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        tracing::debug!(removed = result.rows_affected(), "Memory cleared");
        Ok(())
    }
}
