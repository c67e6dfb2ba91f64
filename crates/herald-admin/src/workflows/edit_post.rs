// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Edit and delete a published post, both addressed by its link.

use tracing::info;

use herald_core::{
    ConversationState, HeraldError, LinkChat, PostLink, PublishedMessage, RenderedPost, Step,
};
use herald_storage::Post;
use herald_storage::queries::{post_types, posts};

use super::{missing_draft, require_text};
use crate::event::{AdminEvent, Payload};
use crate::machine::ConversationMachine;
use crate::render::{PLACEHOLDER, render_post};
use crate::response::Response;

const SEND_LINK: &str = "Send the link to the post, like https://t.me/c/123456/789";

impl ConversationMachine {
    pub(crate) async fn start_edit_post(&self, event: &AdminEvent) -> Result<Response, HeraldError> {
        let state = ConversationState::fresh(event.admin_id, Step::EditPostEnterLink);
        let dismiss = self.start(event, state).await?;
        Ok(Response {
            dismiss,
            ..Response::text(format!("Editing a post. {SEND_LINK}")).cancellable()
        })
    }

    pub(crate) async fn start_delete_post(
        &self,
        event: &AdminEvent,
    ) -> Result<Response, HeraldError> {
        let state = ConversationState::fresh(event.admin_id, Step::DeletePostEnterLink);
        let dismiss = self.start(event, state).await?;
        Ok(Response {
            dismiss,
            ..Response::text(format!("Deleting a post. {SEND_LINK}")).cancellable()
        })
    }

    pub(crate) async fn enter_edit_link(
        &self,
        mut state: ConversationState,
        payload: &Payload,
    ) -> Result<Response, HeraldError> {
        let post = self.resolve_link(payload).await?;

        state.editing_post_id = Some(post.id);
        state.reply_target_chat_id = Some(post.chat_id);
        state.reply_target_message_id = Some(post.message_id);
        self.save(&state.advance(Step::EditPostEnterText)).await?;

        Ok(Response::text("This is the current text. Send the new one.")
            .with_preview(RenderedPost {
                text: post.text,
                entities: post.entities,
                photo: None,
            })
            .cancellable())
    }

    /// Edits the published message first, then the stored row.
    pub(crate) async fn enter_edit_text(
        &self,
        state: ConversationState,
        payload: &Payload,
    ) -> Result<Response, HeraldError> {
        let (text, entities) = require_text(payload, "Send the new post text.")?;
        let post_id = state
            .editing_post_id
            .ok_or_else(|| missing_draft("the post being edited"))?;
        let post = posts::get_post(&self.db, post_id).await?;

        let template = match post.post_type_id {
            Some(type_id) => post_types::get_post_type(&self.db, type_id).await?.template,
            None => PLACEHOLDER.to_string(),
        };
        let rendered = render_post(&template, text, entities, post.photo_file_id.clone())?;

        self.messenger
            .edit_post(
                PublishedMessage {
                    chat_id: post.chat_id,
                    message_id: post.message_id,
                },
                &rendered,
            )
            .await?;
        posts::update_post_text(&self.db, post.id, text, entities).await?;
        self.finish(state.admin_id).await?;

        info!(admin_id = %state.admin_id, post_id = post.id, "post edited");
        Ok(Response::text("Post updated ✅"))
    }

    /// Deletes the published message first, then the stored row.
    pub(crate) async fn enter_delete_link(
        &self,
        state: ConversationState,
        payload: &Payload,
    ) -> Result<Response, HeraldError> {
        let post = self.resolve_link(payload).await?;

        self.messenger
            .delete_message(PublishedMessage {
                chat_id: post.chat_id,
                message_id: post.message_id,
            })
            .await?;
        posts::delete_post(&self.db, post.id).await?;
        self.finish(state.admin_id).await?;

        info!(admin_id = %state.admin_id, post_id = post.id, "post deleted");
        Ok(Response::text("Post deleted 🗑"))
    }

    /// Finds the stored post a link points at.
    ///
    /// Username links carry no chat id and are looked up in the forum chat.
    async fn resolve_link(&self, payload: &Payload) -> Result<Post, HeraldError> {
        let (text, _) = require_text(payload, SEND_LINK)?;
        let link: PostLink = text.parse()?;

        let chat_id = match &link.chat {
            LinkChat::Internal(_) => link
                .chat_id()
                .ok_or_else(|| HeraldError::Validation(SEND_LINK.into()))?,
            LinkChat::Public(_) => self
                .directory
                .forum_target()
                .map(|target| target.chat_id)
                .ok_or_else(|| HeraldError::Validation(SEND_LINK.into()))?,
        };

        posts::find_post_by_message(&self.db, chat_id, link.message_id)
            .await?
            .ok_or_else(|| {
                HeraldError::Validation(
                    "No post published by this bot was found at that link.".into(),
                )
            })
    }
}
