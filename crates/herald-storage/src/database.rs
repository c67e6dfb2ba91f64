// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management: PRAGMA setup, migrations, and lifecycle.
//!
//! Opening happens in two phases. A plain blocking connection first applies
//! persistent settings and migrations; then the write queue's writer and the
//! read-only pool are opened against the migrated file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use herald_config::model::StorageConfig;
use herald_core::HeraldError;
use tracing::{debug, info};

use crate::migrations;
use crate::writer::{WriteQueue, map_tr_err};

/// Connection settings, derived from `[storage]`.
#[derive(Debug, Clone)]
pub struct OpenOptions {
    pub wal_mode: bool,
    pub read_connections: usize,
    pub busy_timeout: Duration,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self::from(&StorageConfig::default())
    }
}

impl From<&StorageConfig> for OpenOptions {
    fn from(config: &StorageConfig) -> Self {
        Self {
            wal_mode: config.wal_mode,
            read_connections: config.read_connections.max(1),
            busy_timeout: Duration::from_millis(config.busy_timeout_ms),
        }
    }
}

/// The opened Herald database.
///
/// Every mutation goes through [`Database::submit`]; query modules take
/// `&Database` and never hold a writable handle of their own.
pub struct Database {
    path: PathBuf,
    queue: WriteQueue,
}

impl Database {
    /// Opens (creating if needed) and migrates the database described by `config`.
    pub async fn open(config: &StorageConfig) -> Result<Self, HeraldError> {
        Self::open_with(&config.database_path, OpenOptions::from(config)).await
    }

    /// Opens the database at `path` with explicit options.
    pub async fn open_with(
        path: impl AsRef<Path>,
        options: OpenOptions,
    ) -> Result<Self, HeraldError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| HeraldError::Storage {
                source: Box::new(e),
            })?;
        }

        let prepare_path = path.clone();
        let prepare_options = options.clone();
        let applied = tokio::task::spawn_blocking(move || prepare(&prepare_path, &prepare_options))
            .await
            .map_err(|e| HeraldError::Internal(format!("database setup task failed: {e}")))??;

        let writer = tokio_rusqlite::Connection::open(&path)
            .await
            .map_err(|e| HeraldError::Storage {
                source: Box::new(e),
            })?;
        let busy_timeout = options.busy_timeout;
        writer
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.busy_timeout(busy_timeout)?;
                conn.pragma_update(None, "foreign_keys", "ON")?;
                conn.pragma_update(None, "synchronous", "NORMAL")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;

        let mut readers = Vec::with_capacity(options.read_connections);
        for _ in 0..options.read_connections {
            let reader = tokio_rusqlite::Connection::open(&path)
                .await
                .map_err(|e| HeraldError::Storage {
                    source: Box::new(e),
                })?;
            reader
                .call(move |conn| -> Result<(), rusqlite::Error> {
                    conn.busy_timeout(busy_timeout)?;
                    conn.pragma_update(None, "query_only", "ON")?;
                    Ok(())
                })
                .await
                .map_err(map_tr_err)?;
            readers.push(reader);
        }

        info!(
            path = %path.display(),
            migrations_applied = applied,
            readers = readers.len(),
            wal = options.wal_mode,
            "database opened"
        );
        Ok(Self {
            path,
            queue: WriteQueue::new(writer, readers),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs `job` as the next write job. See [`WriteQueue::submit`].
    pub async fn submit<T, F>(&self, job: F) -> Result<T, HeraldError>
    where
        F: FnOnce(&rusqlite::Transaction<'_>) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.queue.submit(job).await
    }

    /// Runs `query` on a read-only connection. See [`WriteQueue::read`].
    pub async fn read<T, F>(&self, query: F) -> Result<T, HeraldError>
    where
        F: FnOnce(&rusqlite::Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.queue.read(query).await
    }

    /// Current schema version.
    pub async fn schema_version(&self) -> Result<i64, HeraldError> {
        self.read(|conn| migrations::schema_version(conn)).await
    }

    /// Drains the write queue, checkpoints the WAL and closes every handle.
    pub async fn close(&self) -> Result<(), HeraldError> {
        self.queue.close().await?;
        debug!(path = %self.path.display(), "database closed");
        Ok(())
    }
}

/// Applies persistent PRAGMAs and migrations on a short-lived connection.
fn prepare(path: &Path, options: &OpenOptions) -> Result<usize, HeraldError> {
    let storage_err = |e: rusqlite::Error| HeraldError::Storage {
        source: Box::new(e),
    };

    let mut conn = rusqlite::Connection::open(path).map_err(storage_err)?;
    conn.busy_timeout(options.busy_timeout).map_err(storage_err)?;
    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(storage_err)?;

    let mode = if options.wal_mode { "WAL" } else { "DELETE" };
    let journal_mode: String = conn
        .query_row(&format!("PRAGMA journal_mode = {mode}"), [], |row| row.get(0))
        .map_err(storage_err)?;
    debug!(journal_mode = %journal_mode, "journal mode set");

    migrations::run_migrations(&mut conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_creates_file_and_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("herald.db");

        let db = Database::open_with(&path, OpenOptions::default()).await.unwrap();
        assert!(path.exists());
        assert_eq!(db.schema_version().await.unwrap(), 2);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn open_applies_pragmas() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pragmas.db");
        let db = Database::open_with(&path, OpenOptions::default()).await.unwrap();

        let journal: String = db
            .read(|conn| conn.pragma_query_value(None, "journal_mode", |row| row.get(0)))
            .await
            .unwrap();
        assert_eq!(journal.to_ascii_lowercase(), "wal");

        let fk: i64 = db
            .submit(|tx| tx.pragma_query_value(None, "foreign_keys", |row| row.get(0)))
            .await
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[tokio::test]
    async fn read_connections_are_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_with(dir.path().join("ro.db"), OpenOptions::default())
            .await
            .unwrap();

        let result = db
            .read(|conn| conn.execute("INSERT INTO admins (admin_id) VALUES (1)", []))
            .await;
        assert!(matches!(result, Err(HeraldError::Storage { .. })));
    }

    #[tokio::test]
    async fn reopening_keeps_data_and_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reopen.db");

        let db = Database::open_with(&path, OpenOptions::default()).await.unwrap();
        db.submit(|tx| tx.execute("INSERT INTO admins (admin_id) VALUES (42)", []))
            .await
            .unwrap();
        db.close().await.unwrap();

        let db = Database::open_with(&path, OpenOptions::default()).await.unwrap();
        let count: i64 = db
            .read(|conn| conn.query_row("SELECT COUNT(*) FROM admins", [], |row| row.get(0)))
            .await
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(db.schema_version().await.unwrap(), 2);
    }
}
