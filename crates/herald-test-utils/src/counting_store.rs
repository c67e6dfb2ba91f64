// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A [`StateStore`] decorator that counts every call.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use herald_core::{AdminId, ConversationState, HeraldError, StateStore, Step};

pub struct CountingStateStore {
    inner: Arc<dyn StateStore>,
    calls: AtomicUsize,
}

impl CountingStateStore {
    pub fn new(inner: Arc<dyn StateStore>) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    /// Total calls to every [`StateStore`] method.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn count(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl StateStore for CountingStateStore {
    async fn save(&self, state: &ConversationState) -> Result<(), HeraldError> {
        self.count();
        self.inner.save(state).await
    }

    async fn get(&self, admin: AdminId) -> Result<ConversationState, HeraldError> {
        self.count();
        self.inner.get(admin).await
    }

    async fn clear(&self, admin: AdminId) -> Result<(), HeraldError> {
        self.count();
        self.inner.clear(admin).await
    }

    async fn claim(&self, admin: AdminId, step: Step) -> Result<bool, HeraldError> {
        self.count();
        self.inner.claim(admin, step).await
    }

    async fn remember_prompt(&self, admin: AdminId, message_id: i32) -> Result<(), HeraldError> {
        self.count();
        self.inner.remember_prompt(admin, message_id).await
    }
}
