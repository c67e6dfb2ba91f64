// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! New post: select type, enter text, confirm.

use tracing::info;

use herald_core::{ConversationState, HeraldError, Step, message_url};
use herald_storage::queries::{post_types, posts};
use herald_storage::{NewPost, PostType};

use super::missing_draft;
use crate::event::{Action, AdminEvent, Payload};
use crate::machine::ConversationMachine;
use crate::render::render_post;
use crate::response::{Button, Response};

pub(crate) const NO_FORUM: &str =
    "No forum is set. Send /setforum inside the forum topic posts should go to.";

impl ConversationMachine {
    pub(crate) async fn start_new_post(&self, event: &AdminEvent) -> Result<Response, HeraldError> {
        let types = post_types::list_post_types(&self.db).await?;
        if types.is_empty() {
            return Err(HeraldError::Validation(
                "There are no post types yet. Create one with /newtype first.".into(),
            ));
        }
        if self.directory.forum_target().is_none() {
            return Err(HeraldError::Validation(NO_FORUM.into()));
        }

        let state = ConversationState::fresh(event.admin_id, Step::NewPostSelectType);
        let dismiss = self.start(event, state).await?;

        let mut response = Response::text("Choose the post type:");
        for post_type in &types {
            response = response.with_row(vec![Button::new(
                post_type.label(),
                Action::SelectType(post_type.id),
            )]);
        }
        response.dismiss = dismiss;
        Ok(response.cancellable())
    }

    pub(crate) async fn select_type(
        &self,
        mut state: ConversationState,
        payload: &Payload,
    ) -> Result<Response, HeraldError> {
        let Payload::Action(Action::SelectType(type_id)) = payload else {
            return Err(HeraldError::Validation(
                "Choose a post type with the buttons above.".into(),
            ));
        };
        let post_type = post_types::get_post_type(&self.db, *type_id).await?;

        state.selected_type_id = Some(post_type.id);
        self.save(&state.advance(Step::NewPostEnterText)).await?;

        Ok(Response::text(format!(
            "{}: send the post text, or a photo with a caption.",
            post_type.label()
        ))
        .cancellable())
    }

    pub(crate) async fn enter_post_text(
        &self,
        mut state: ConversationState,
        payload: &Payload,
    ) -> Result<Response, HeraldError> {
        let (text, entities, photo) = match payload {
            Payload::Text { text, entities } => (text, entities, None),
            Payload::Photo {
                file_id,
                caption,
                entities,
            } => (caption, entities, Some(file_id.clone())),
            _ => {
                return Err(HeraldError::Validation(
                    "Send the post text, or a photo with a caption.".into(),
                ));
            }
        };
        if text.trim().is_empty() {
            return Err(HeraldError::Validation(
                "The post text cannot be empty.".into(),
            ));
        }

        let post_type = self.selected_type(&state).await?;
        let preview = render_post(
            &post_type.template,
            text,
            entities,
            photo.clone().or_else(|| post_type.photo_file_id.clone()),
        )?;

        state.draft_text = text.clone();
        state.draft_entities = entities.clone();
        state.draft_photo = photo;
        self.save(&state.advance(Step::NewPostConfirm)).await?;

        Ok(Response::text("This is how the post will look. Publish it?")
            .with_preview(preview)
            .with_row(vec![Button::new("✅ Publish", Action::Confirm)])
            .cancellable())
    }

    /// Publishes first, records the post second, clears the draft last.
    pub(crate) async fn confirm_post(
        &self,
        state: ConversationState,
        payload: &Payload,
    ) -> Result<Response, HeraldError> {
        let confirmed = match payload {
            Payload::Action(Action::Confirm) => true,
            Payload::Text { text, .. } => text.trim().eq_ignore_ascii_case("confirm"),
            _ => false,
        };
        if !confirmed {
            return Err(HeraldError::Validation(
                "Press Publish to post it, or Cancel to discard it.".into(),
            ));
        }

        let post_type = self.selected_type(&state).await?;
        let target = self
            .directory
            .forum_target()
            .ok_or_else(|| HeraldError::Validation(NO_FORUM.into()))?;
        let rendered = render_post(
            &post_type.template,
            &state.draft_text,
            &state.draft_entities,
            state
                .draft_photo
                .clone()
                .or_else(|| post_type.photo_file_id.clone()),
        )?;

        // Claiming the row first makes a second confirm press a no-op.
        if !self.store.claim(state.admin_id, Step::NewPostConfirm).await? {
            return Err(HeraldError::Validation(
                "This draft was already published or cancelled.".into(),
            ));
        }
        let published = match self.messenger.send_post(target, &rendered).await {
            Ok(published) => published,
            Err(e) => {
                self.save(&state).await?;
                return Err(e);
            }
        };
        let post_id = posts::insert_post(
            &self.db,
            &NewPost {
                post_type_id: Some(post_type.id),
                chat_id: published.chat_id,
                topic_id: target.topic_id,
                message_id: published.message_id,
                text: state.draft_text.clone(),
                entities: state.draft_entities.clone(),
                photo_file_id: rendered.photo,
            },
        )
        .await?;

        info!(
            admin_id = %state.admin_id,
            post_id,
            message_id = published.message_id,
            "post published"
        );
        Ok(Response::text(
            match message_url(published.chat_id, published.message_id) {
                Some(url) => format!("Published ✅\n{url}"),
                None => "Published ✅".to_string(),
            },
        ))
    }

    async fn selected_type(&self, state: &ConversationState) -> Result<PostType, HeraldError> {
        let type_id = state
            .selected_type_id
            .ok_or_else(|| missing_draft("the selected post type"))?;
        post_types::get_post_type(&self.db, type_id).await
    }
}
