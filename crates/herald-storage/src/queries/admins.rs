// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Administrator list operations.

use herald_core::{AdminId, HeraldError};
use rusqlite::params;

use crate::database::Database;

/// Adds an administrator. Returns `false` if it was already present.
pub async fn add_admin(db: &Database, admin: AdminId) -> Result<bool, HeraldError> {
    db.submit(move |tx| {
        let changed = tx.execute(
            "INSERT OR IGNORE INTO admins (admin_id) VALUES (?1)",
            params![admin.0],
        )?;
        Ok(changed > 0)
    })
    .await
}

/// Removes an administrator. Returns `false` if it was not present.
pub async fn remove_admin(db: &Database, admin: AdminId) -> Result<bool, HeraldError> {
    db.submit(move |tx| {
        let changed = tx.execute("DELETE FROM admins WHERE admin_id = ?1", params![admin.0])?;
        Ok(changed > 0)
    })
    .await
}

/// All administrators in ascending id order.
pub async fn list_admins(db: &Database) -> Result<Vec<AdminId>, HeraldError> {
    db.read(|conn| {
        let mut stmt = conn.prepare("SELECT admin_id FROM admins ORDER BY admin_id ASC")?;
        let rows = stmt.query_map([], |row| row.get(0).map(AdminId))?;
        rows.collect()
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::OpenOptions;

    async fn db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_with(dir.path().join("admins.db"), OpenOptions::default())
            .await
            .unwrap();
        (dir, db)
    }

    #[tokio::test]
    async fn add_is_idempotent_and_listing_is_sorted() {
        let (_dir, db) = db().await;
        assert!(add_admin(&db, AdminId(42)).await.unwrap());
        assert!(add_admin(&db, AdminId(7)).await.unwrap());
        assert!(!add_admin(&db, AdminId(42)).await.unwrap());

        assert_eq!(list_admins(&db).await.unwrap(), vec![AdminId(7), AdminId(42)]);
    }

    #[tokio::test]
    async fn remove_reports_presence() {
        let (_dir, db) = db().await;
        add_admin(&db, AdminId(1)).await.unwrap();
        assert!(remove_admin(&db, AdminId(1)).await.unwrap());
        assert!(!remove_admin(&db, AdminId(1)).await.unwrap());
        assert!(list_admins(&db).await.unwrap().is_empty());
    }
}
