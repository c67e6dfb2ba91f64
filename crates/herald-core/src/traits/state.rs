// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence of per-administrator conversation state.

use async_trait::async_trait;

use crate::conversation::{Conversation, ConversationState, Step};
use crate::error::HeraldError;
use crate::types::AdminId;

/// Durable store of one conversation row per administrator.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Inserts or fully replaces the row for `state.admin_id`.
    async fn save(&self, state: &ConversationState) -> Result<(), HeraldError>;

    /// Loads the row for `admin`.
    ///
    /// Returns [`HeraldError::NotFound`] when no row exists and
    /// [`HeraldError::Integrity`] when the stored step is not a known step.
    async fn get(&self, admin: AdminId) -> Result<ConversationState, HeraldError>;

    /// Deletes the row for `admin`. Deleting a missing row is not an error.
    async fn clear(&self, admin: AdminId) -> Result<(), HeraldError>;

    /// Deletes the row for `admin` only while it is still at `step`.
    ///
    /// Returns `false` when another event already moved or cleared the row,
    /// so exactly one of several racing commits wins.
    async fn claim(&self, admin: AdminId, step: Step) -> Result<bool, HeraldError>;

    /// Records the id of the latest prompt sent to `admin`.
    ///
    /// Only touches an existing row; an idle administrator stays row-less.
    async fn remember_prompt(&self, admin: AdminId, message_id: i32) -> Result<(), HeraldError>;

    /// Tagged lookup: missing rows and rows without a step are [`Conversation::Idle`].
    async fn lookup(&self, admin: AdminId) -> Result<Conversation, HeraldError> {
        match self.get(admin).await {
            Ok(state) if state.is_idle() => Ok(Conversation::Idle),
            Ok(state) => Ok(Conversation::Active(state)),
            Err(e) if e.is_not_found() => Ok(Conversation::Idle),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct MapStore {
        rows: Mutex<HashMap<AdminId, ConversationState>>,
        broken: bool,
    }

    #[async_trait]
    impl StateStore for MapStore {
        async fn save(&self, state: &ConversationState) -> Result<(), HeraldError> {
            self.rows
                .lock()
                .unwrap()
                .insert(state.admin_id, state.clone());
            Ok(())
        }

        async fn get(&self, admin: AdminId) -> Result<ConversationState, HeraldError> {
            if self.broken {
                return Err(HeraldError::Integrity("bad step".into()));
            }
            self.rows
                .lock()
                .unwrap()
                .get(&admin)
                .cloned()
                .ok_or_else(|| HeraldError::not_found("conversation state", admin))
        }

        async fn clear(&self, admin: AdminId) -> Result<(), HeraldError> {
            self.rows.lock().unwrap().remove(&admin);
            Ok(())
        }

        async fn claim(&self, admin: AdminId, step: Step) -> Result<bool, HeraldError> {
            let mut rows = self.rows.lock().unwrap();
            if rows.get(&admin).and_then(|state| state.step) == Some(step) {
                rows.remove(&admin);
                return Ok(true);
            }
            Ok(false)
        }

        async fn remember_prompt(&self, _: AdminId, _: i32) -> Result<(), HeraldError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn lookup_tags_missing_and_stepless_rows_as_idle() {
        let store = MapStore::default();
        assert_eq!(store.lookup(AdminId(1)).await.unwrap(), Conversation::Idle);

        let mut stepless = ConversationState::fresh(AdminId(1), Step::NewPostSelectType);
        stepless.step = None;
        store.save(&stepless).await.unwrap();
        assert_eq!(store.lookup(AdminId(1)).await.unwrap(), Conversation::Idle);

        let active = ConversationState::fresh(AdminId(1), Step::EditPostEnterLink);
        store.save(&active).await.unwrap();
        assert_eq!(
            store.lookup(AdminId(1)).await.unwrap(),
            Conversation::Active(active)
        );
    }

    #[tokio::test]
    async fn lookup_propagates_integrity_errors() {
        let store = MapStore {
            broken: true,
            ..MapStore::default()
        };
        let err = store.lookup(AdminId(1)).await.unwrap_err();
        assert!(matches!(err, HeraldError::Integrity(_)));
    }
}
