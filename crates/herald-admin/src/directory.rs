// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authorization list and publish destination.
//!
//! The directory is consulted on every inbound event, so reads are served
//! from an in-memory snapshot swapped atomically after each mutation. Writes
//! go to the store first and only then replace the snapshot.

use std::collections::BTreeSet;
use std::sync::Arc;

use arc_swap::{ArcSwap, ArcSwapOption};
use tokio::sync::Mutex;
use tracing::{debug, info};

use herald_core::{AdminId, ForumTarget, HeraldError};
use herald_storage::Database;
use herald_storage::queries::{admins, config};

/// Administrators and the default forum target.
pub struct AdminDirectory {
    db: Arc<Database>,
    bootstrap: BTreeSet<AdminId>,
    admins: ArcSwap<BTreeSet<AdminId>>,
    forum: ArcSwapOption<ForumTarget>,
    /// Serializes store-then-swap updates so snapshots never go backwards.
    write_lock: Mutex<()>,
}

impl AdminDirectory {
    /// Seeds bootstrap admins into the store and loads the current snapshot.
    ///
    /// `initial_forum` is stored only when the store has no forum target yet.
    pub async fn load(
        db: Arc<Database>,
        bootstrap: impl IntoIterator<Item = AdminId>,
        initial_forum: Option<ForumTarget>,
    ) -> Result<Self, HeraldError> {
        let bootstrap: BTreeSet<AdminId> = bootstrap.into_iter().collect();
        for admin in &bootstrap {
            if admins::add_admin(&db, *admin).await? {
                info!(admin_id = %admin, "seeded bootstrap admin");
            }
        }

        let mut forum = config::get_forum_target(&db).await?;
        if forum.is_none() {
            if let Some(target) = initial_forum {
                config::set_forum_target(&db, target).await?;
                info!(chat_id = target.chat_id, "stored configured forum target");
                forum = Some(target);
            }
        }

        let stored: BTreeSet<AdminId> = admins::list_admins(&db).await?.into_iter().collect();
        debug!(count = stored.len(), "loaded admin directory");

        Ok(Self {
            db,
            bootstrap,
            admins: ArcSwap::from_pointee(stored),
            forum: ArcSwapOption::new(forum.map(Arc::new)),
            write_lock: Mutex::new(()),
        })
    }

    pub fn is_admin(&self, id: AdminId) -> bool {
        self.bootstrap.contains(&id) || self.admins.load().contains(&id)
    }

    /// All administrators, ascending.
    pub fn admins(&self) -> Vec<AdminId> {
        let stored = self.admins.load();
        stored.union(&self.bootstrap).copied().collect()
    }

    pub fn is_bootstrap(&self, id: AdminId) -> bool {
        self.bootstrap.contains(&id)
    }

    /// Adds an administrator. Returns `false` when it already was one.
    pub async fn add(&self, id: AdminId) -> Result<bool, HeraldError> {
        if id.0 <= 0 {
            return Err(HeraldError::Validation(format!(
                "{id} is not a user id; user ids are positive numbers"
            )));
        }
        let _guard = self.write_lock.lock().await;
        let added = admins::add_admin(&self.db, id).await?;
        self.refresh_admins().await?;
        if added {
            info!(admin_id = %id, "admin added");
        }
        Ok(added)
    }

    /// Removes an administrator. Bootstrap admins cannot be removed at runtime.
    pub async fn remove(&self, id: AdminId) -> Result<bool, HeraldError> {
        if self.is_bootstrap(id) {
            return Err(HeraldError::Validation(format!(
                "{id} is listed in the configuration and cannot be removed here"
            )));
        }
        let _guard = self.write_lock.lock().await;
        let removed = admins::remove_admin(&self.db, id).await?;
        self.refresh_admins().await?;
        if removed {
            info!(admin_id = %id, "admin removed");
        }
        Ok(removed)
    }

    pub fn forum_target(&self) -> Option<ForumTarget> {
        self.forum.load_full().map(|target| *target)
    }

    pub async fn set_forum_target(&self, target: ForumTarget) -> Result<(), HeraldError> {
        let _guard = self.write_lock.lock().await;
        config::set_forum_target(&self.db, target).await?;
        self.forum.store(Some(Arc::new(target)));
        info!(
            chat_id = target.chat_id,
            topic_id = ?target.topic_id,
            "forum target updated"
        );
        Ok(())
    }

    async fn refresh_admins(&self) -> Result<(), HeraldError> {
        let stored: BTreeSet<AdminId> = admins::list_admins(&self.db)
            .await?
            .into_iter()
            .collect();
        self.admins.store(Arc::new(stored));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use herald_test_utils::TestDb;
    use tracing_test::traced_test;

    use super::*;

    const FORUM: ForumTarget = ForumTarget {
        chat_id: -1001234567890,
        topic_id: Some(5),
    };

    #[tokio::test]
    #[traced_test]
    async fn bootstrap_admins_are_seeded() {
        let test_db = TestDb::new().await.unwrap();
        let directory = AdminDirectory::load(test_db.db.clone(), [AdminId(42)], None)
            .await
            .unwrap();

        assert!(directory.is_admin(AdminId(42)));
        assert!(!directory.is_admin(AdminId(43)));
        assert_eq!(
            admins::list_admins(&test_db.db).await.unwrap(),
            vec![AdminId(42)]
        );
        assert!(logs_contain("seeded bootstrap admin"));
    }

    #[tokio::test]
    async fn add_and_remove_update_snapshot_and_store() {
        let test_db = TestDb::new().await.unwrap();
        let directory = AdminDirectory::load(test_db.db.clone(), [AdminId(1)], None)
            .await
            .unwrap();

        assert!(directory.add(AdminId(7)).await.unwrap());
        assert!(!directory.add(AdminId(7)).await.unwrap());
        assert!(directory.is_admin(AdminId(7)));
        assert_eq!(directory.admins(), vec![AdminId(1), AdminId(7)]);

        assert!(directory.remove(AdminId(7)).await.unwrap());
        assert!(!directory.is_admin(AdminId(7)));
        assert!(!directory.remove(AdminId(7)).await.unwrap());
    }

    #[tokio::test]
    async fn bootstrap_admin_cannot_be_removed() {
        let test_db = TestDb::new().await.unwrap();
        let directory = AdminDirectory::load(test_db.db.clone(), [AdminId(1)], None)
            .await
            .unwrap();

        let err = directory.remove(AdminId(1)).await.unwrap_err();
        assert!(err.is_validation());
        assert!(directory.is_admin(AdminId(1)));
    }

    #[tokio::test]
    async fn non_positive_ids_are_rejected() {
        let test_db = TestDb::new().await.unwrap();
        let directory = AdminDirectory::load(test_db.db.clone(), [], None)
            .await
            .unwrap();
        assert!(directory.add(AdminId(-100)).await.unwrap_err().is_validation());
        assert!(directory.admins().is_empty());
    }

    #[tokio::test]
    async fn configured_forum_only_fills_an_empty_store() {
        let test_db = TestDb::new().await.unwrap();
        let directory = AdminDirectory::load(test_db.db.clone(), [], Some(FORUM))
            .await
            .unwrap();
        assert_eq!(directory.forum_target(), Some(FORUM));

        let moved = ForumTarget {
            chat_id: -1009999,
            topic_id: None,
        };
        directory.set_forum_target(moved).await.unwrap();

        let reloaded = AdminDirectory::load(test_db.db.clone(), [], Some(FORUM))
            .await
            .unwrap();
        assert_eq!(reloaded.forum_target(), Some(moved));
    }
}
