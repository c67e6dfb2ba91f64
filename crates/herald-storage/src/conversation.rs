// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed conversation state store.
//!
//! One `conversation_state` row per administrator. `save` and `clear` are
//! write jobs, so a `clear` submitted after a `save` always runs after it.
//! Unset references are stored as `0` and absent file references as `''`.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use herald_core::{AdminId, ConversationState, HeraldError, StateStore, Step};
use rusqlite::{OptionalExtension, params};
use tracing::debug;

use crate::database::Database;
use crate::models::{file_ref_from_column, file_ref_to_column};
use crate::queries::posts::{decode_entities, encode_entities};

/// A `conversation_state` row exactly as stored.
struct StateRow {
    admin_id: i64,
    current_state: String,
    selected_type_id: i64,
    editing_post_id: i64,
    editing_type_id: i64,
    draft_text: String,
    draft_photo: String,
    draft_entities: String,
    temp_name: String,
    temp_emoji: String,
    temp_photo: String,
    temp_template: String,
    last_bot_message_id: i32,
    reply_target_chat_id: i64,
    reply_target_message_id: i32,
}

const COLUMNS: &str = "admin_id, current_state, selected_type_id, editing_post_id, editing_type_id, \
                       draft_text, draft_photo, draft_entities, temp_name, temp_emoji, temp_photo, \
                       temp_template, last_bot_message_id, reply_target_chat_id, reply_target_message_id";

fn unset_if_zero<T: Default + PartialEq>(value: T) -> Option<T> {
    if value == T::default() { None } else { Some(value) }
}

impl StateRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            admin_id: row.get(0)?,
            current_state: row.get(1)?,
            selected_type_id: row.get(2)?,
            editing_post_id: row.get(3)?,
            editing_type_id: row.get(4)?,
            draft_text: row.get(5)?,
            draft_photo: row.get(6)?,
            draft_entities: row.get(7)?,
            temp_name: row.get(8)?,
            temp_emoji: row.get(9)?,
            temp_photo: row.get(10)?,
            temp_template: row.get(11)?,
            last_bot_message_id: row.get(12)?,
            reply_target_chat_id: row.get(13)?,
            reply_target_message_id: row.get(14)?,
        })
    }

    fn from_state(state: &ConversationState) -> Result<Self, HeraldError> {
        Ok(Self {
            admin_id: state.admin_id.0,
            current_state: state.step.map(|s| s.to_string()).unwrap_or_default(),
            selected_type_id: state.selected_type_id.unwrap_or_default(),
            editing_post_id: state.editing_post_id.unwrap_or_default(),
            editing_type_id: state.editing_type_id.unwrap_or_default(),
            draft_text: state.draft_text.clone(),
            draft_photo: file_ref_to_column(state.draft_photo.as_deref()).to_string(),
            draft_entities: encode_entities(&state.draft_entities)?,
            temp_name: state.temp_name.clone(),
            temp_emoji: state.temp_emoji.clone(),
            temp_photo: file_ref_to_column(state.temp_photo.as_deref()).to_string(),
            temp_template: state.temp_template.clone(),
            last_bot_message_id: state.last_bot_message_id.unwrap_or_default(),
            reply_target_chat_id: state.reply_target_chat_id.unwrap_or_default(),
            reply_target_message_id: state.reply_target_message_id.unwrap_or_default(),
        })
    }

    /// Decodes the row. An unknown step string is an integrity error.
    fn into_state(self) -> Result<ConversationState, HeraldError> {
        let step = if self.current_state.is_empty() {
            None
        } else {
            Some(Step::from_str(&self.current_state).map_err(|_| {
                HeraldError::Integrity(format!(
                    "admin {} has unknown conversation step {:?}",
                    self.admin_id, self.current_state
                ))
            })?)
        };

        Ok(ConversationState {
            admin_id: AdminId(self.admin_id),
            step,
            selected_type_id: unset_if_zero(self.selected_type_id),
            editing_post_id: unset_if_zero(self.editing_post_id),
            editing_type_id: unset_if_zero(self.editing_type_id),
            draft_text: self.draft_text,
            draft_photo: file_ref_from_column(self.draft_photo),
            draft_entities: decode_entities(&self.draft_entities)?,
            temp_name: self.temp_name,
            temp_emoji: self.temp_emoji,
            temp_photo: file_ref_from_column(self.temp_photo),
            temp_template: self.temp_template,
            last_bot_message_id: unset_if_zero(self.last_bot_message_id),
            reply_target_chat_id: unset_if_zero(self.reply_target_chat_id),
            reply_target_message_id: unset_if_zero(self.reply_target_message_id),
        })
    }
}

/// [`StateStore`] over the `conversation_state` table.
pub struct SqliteStateStore {
    db: Arc<Database>,
}

impl SqliteStateStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StateStore for SqliteStateStore {
    async fn save(&self, state: &ConversationState) -> Result<(), HeraldError> {
        let row = StateRow::from_state(state)?;
        debug!(admin_id = row.admin_id, step = %row.current_state, "saving conversation state");
        self.db
            .submit(move |tx| {
                tx.execute(
                    &format!(
                        "INSERT INTO conversation_state ({COLUMNS}, updated_at)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                                 strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                         ON CONFLICT(admin_id) DO UPDATE SET
                            current_state = excluded.current_state,
                            selected_type_id = excluded.selected_type_id,
                            editing_post_id = excluded.editing_post_id,
                            editing_type_id = excluded.editing_type_id,
                            draft_text = excluded.draft_text,
                            draft_photo = excluded.draft_photo,
                            draft_entities = excluded.draft_entities,
                            temp_name = excluded.temp_name,
                            temp_emoji = excluded.temp_emoji,
                            temp_photo = excluded.temp_photo,
                            temp_template = excluded.temp_template,
                            last_bot_message_id = excluded.last_bot_message_id,
                            reply_target_chat_id = excluded.reply_target_chat_id,
                            reply_target_message_id = excluded.reply_target_message_id,
                            updated_at = excluded.updated_at"
                    ),
                    params![
                        row.admin_id,
                        row.current_state,
                        row.selected_type_id,
                        row.editing_post_id,
                        row.editing_type_id,
                        row.draft_text,
                        row.draft_photo,
                        row.draft_entities,
                        row.temp_name,
                        row.temp_emoji,
                        row.temp_photo,
                        row.temp_template,
                        row.last_bot_message_id,
                        row.reply_target_chat_id,
                        row.reply_target_message_id,
                    ],
                )?;
                Ok(())
            })
            .await
    }

    async fn get(&self, admin: AdminId) -> Result<ConversationState, HeraldError> {
        self.db
            .read(move |conn| {
                conn.query_row(
                    &format!("SELECT {COLUMNS} FROM conversation_state WHERE admin_id = ?1"),
                    params![admin.0],
                    StateRow::from_row,
                )
                .optional()
            })
            .await?
            .ok_or_else(|| HeraldError::not_found("conversation state", admin))?
            .into_state()
    }

    async fn clear(&self, admin: AdminId) -> Result<(), HeraldError> {
        debug!(admin_id = admin.0, "clearing conversation state");
        self.db
            .submit(move |tx| {
                tx.execute(
                    "DELETE FROM conversation_state WHERE admin_id = ?1",
                    params![admin.0],
                )?;
                Ok(())
            })
            .await
    }

    async fn claim(&self, admin: AdminId, step: Step) -> Result<bool, HeraldError> {
        let current = step.to_string();
        let claimed = self
            .db
            .submit(move |tx| {
                let deleted = tx.execute(
                    "DELETE FROM conversation_state WHERE admin_id = ?1 AND current_state = ?2",
                    params![admin.0, current],
                )?;
                Ok(deleted > 0)
            })
            .await?;
        debug!(admin_id = admin.0, %step, claimed, "claiming conversation state");
        Ok(claimed)
    }

    async fn remember_prompt(&self, admin: AdminId, message_id: i32) -> Result<(), HeraldError> {
        self.db
            .submit(move |tx| {
                tx.execute(
                    "UPDATE conversation_state SET last_bot_message_id = ?1 WHERE admin_id = ?2",
                    params![message_id, admin.0],
                )?;
                Ok(())
            })
            .await
    }
}
