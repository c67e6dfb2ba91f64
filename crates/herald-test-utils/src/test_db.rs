// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Temporary database harness.

use std::path::PathBuf;
use std::sync::Arc;

use herald_core::HeraldError;
use herald_storage::{Database, OpenOptions, SqliteStateStore};
use tempfile::TempDir;

/// A migrated database file that lives as long as this value.
pub struct TestDb {
    dir: TempDir,
    pub db: Arc<Database>,
    pub store: Arc<SqliteStateStore>,
}

impl TestDb {
    pub async fn new() -> Result<Self, HeraldError> {
        let dir = TempDir::new().map_err(|e| HeraldError::Storage { source: e.into() })?;
        Self::open_in(dir).await
    }

    async fn open_in(dir: TempDir) -> Result<Self, HeraldError> {
        let db = Arc::new(
            Database::open_with(dir.path().join("herald-test.db"), OpenOptions::default()).await?,
        );
        let store = Arc::new(SqliteStateStore::new(Arc::clone(&db)));
        Ok(Self { dir, db, store })
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().join("herald-test.db")
    }

    /// Closes the database and opens the same file again, like a process restart.
    pub async fn restart(self) -> Result<Self, HeraldError> {
        self.db.close().await?;
        Self::open_in(self.dir).await
    }
}

#[cfg(test)]
mod tests {
    use herald_core::{AdminId, ConversationState, StateStore, Step};

    use super::*;

    #[tokio::test]
    async fn state_survives_restart() {
        let test_db = TestDb::new().await.unwrap();
        let state = ConversationState::fresh(AdminId(1), Step::NewTypeEnterImage);
        test_db.store.save(&state).await.unwrap();

        let test_db = test_db.restart().await.unwrap();
        assert_eq!(test_db.store.get(AdminId(1)).await.unwrap(), state);
        assert!(test_db.path().exists());
    }
}
