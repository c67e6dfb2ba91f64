// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post type creation, listing and single-field edits.

use tracing::info;

use herald_core::{ConversationState, HeraldError, Step};
use herald_storage::NewPostType;
use herald_storage::queries::post_types;

use super::{is_skip, missing_draft, require_text};
use crate::event::{Action, AdminEvent, Payload};
use crate::machine::ConversationMachine;
use crate::render::{PLACEHOLDER, split_type_name, validate_template};
use crate::response::{Button, Response};

fn template_prompt() -> String {
    format!(
        "Send the template. Put {PLACEHOLDER} where the post text goes, for example:\n\n\
         📰 {PLACEHOLDER}\n\n#news"
    )
}

fn skip_row(label: &str) -> Vec<Button> {
    vec![Button::new(label, Action::Skip)]
}

impl ConversationMachine {
    pub(crate) async fn start_new_type(&self, event: &AdminEvent) -> Result<Response, HeraldError> {
        let state = ConversationState::fresh(event.admin_id, Step::NewTypeEnterName);
        let dismiss = self.start(event, state).await?;
        Ok(Response {
            dismiss,
            ..Response::text(
                "Send the name of the new post type. It may start with an emoji, like: 📰 News",
            )
            .cancellable()
        })
    }

    pub(crate) async fn enter_type_name(
        &self,
        mut state: ConversationState,
        payload: &Payload,
    ) -> Result<Response, HeraldError> {
        let (input, _) = require_text(payload, "Send the name of the post type.")?;
        let (emoji, name) = split_type_name(input)?;
        self.ensure_unique_name(&name, None).await?;

        let prompt = format!("Send an image for {name} posts, or press Skip.");
        state.temp_name = name;
        state.temp_emoji = emoji;
        self.save(&state.advance(Step::NewTypeEnterImage)).await?;

        Ok(Response::text(prompt)
            .with_row(skip_row("⏭ Skip"))
            .cancellable())
    }

    pub(crate) async fn enter_type_image(
        &self,
        mut state: ConversationState,
        payload: &Payload,
    ) -> Result<Response, HeraldError> {
        state.temp_photo = match payload {
            Payload::Photo { file_id, .. } => Some(file_id.clone()),
            _ if is_skip(payload) => None,
            _ => {
                return Err(HeraldError::Validation(
                    "Send a photo, or press Skip for a type without an image.".into(),
                ));
            }
        };
        self.save(&state.advance(Step::NewTypeEnterTemplate)).await?;

        Ok(Response::text(template_prompt()).cancellable())
    }

    pub(crate) async fn enter_type_template(
        &self,
        state: ConversationState,
        payload: &Payload,
    ) -> Result<Response, HeraldError> {
        let (template, _) = require_text(payload, &template_prompt())?;
        validate_template(template)?;
        if state.temp_name.is_empty() {
            return Err(missing_draft("the type name"));
        }
        // Another admin may have taken the name since it was entered.
        self.ensure_unique_name(&state.temp_name, None).await?;

        let id = post_types::create_post_type(
            &self.db,
            &NewPostType {
                name: state.temp_name.clone(),
                emoji: state.temp_emoji.clone(),
                photo_file_id: state.temp_photo.clone(),
                template: template.to_string(),
            },
        )
        .await?;
        self.finish(state.admin_id).await?;

        info!(admin_id = %state.admin_id, type_id = id, name = %state.temp_name, "post type created");
        Ok(Response::text(format!(
            "Post type {} created ✅",
            state.temp_name
        )))
    }

    /// Lists post types with their management buttons. Touches no state.
    pub(crate) async fn list_types(&self) -> Result<Response, HeraldError> {
        let types = post_types::list_post_types(&self.db).await?;
        if types.is_empty() {
            return Ok(Response::text(
                "No post types yet. Create one with /newtype.",
            ));
        }

        let mut text = String::from("Post types:\n");
        let mut response = Response::default();
        for post_type in &types {
            let image = if post_type.photo_file_id.is_some() {
                " 🖼"
            } else {
                ""
            };
            text.push_str(&format!("\n{}{image}", post_type.label()));
            response = response.with_row(vec![
                Button::new(format!("✏️ {}", post_type.label()), Action::RenameType(post_type.id)),
                Button::new("🖼", Action::TypeImage(post_type.id)),
                Button::new("📝", Action::TypeTemplate(post_type.id)),
                Button::new("🗑", Action::DeleteType(post_type.id)),
            ]);
        }
        response.text = text;
        Ok(response)
    }

    pub(crate) async fn start_type_edit(
        &self,
        event: &AdminEvent,
        step: Step,
        type_id: i64,
    ) -> Result<Response, HeraldError> {
        let post_type = post_types::get_post_type(&self.db, type_id).await?;

        let mut state = ConversationState::fresh(event.admin_id, step);
        state.editing_type_id = Some(post_type.id);
        let dismiss = self.start(event, state).await?;

        let label = post_type.label();
        let response = match step {
            Step::EditTypeName => Response::text(format!("Send the new name for {label}.")),
            Step::EditTypeImage => Response::text(format!(
                "Send the new image for {label}, or press Skip to remove it."
            ))
            .with_row(skip_row("⏭ Remove image")),
            _ => Response::text(format!(
                "Current template of {label}:\n\n{}\n\n{}",
                post_type.template,
                template_prompt()
            )),
        };
        Ok(Response {
            dismiss,
            ..response.cancellable()
        })
    }

    pub(crate) async fn edit_type_name(
        &self,
        state: ConversationState,
        payload: &Payload,
    ) -> Result<Response, HeraldError> {
        let (input, _) = require_text(payload, "Send the new name of the post type.")?;
        let (emoji, name) = split_type_name(input)?;
        let type_id = editing_type(&state)?;
        self.ensure_unique_name(&name, Some(type_id)).await?;

        post_types::rename_post_type(&self.db, type_id, &name, &emoji).await?;
        self.finish(state.admin_id).await?;

        info!(admin_id = %state.admin_id, type_id, %name, "post type renamed");
        Ok(Response::text(format!("Renamed to {name} ✅")))
    }

    pub(crate) async fn edit_type_image(
        &self,
        state: ConversationState,
        payload: &Payload,
    ) -> Result<Response, HeraldError> {
        let photo = match payload {
            Payload::Photo { file_id, .. } => Some(file_id.as_str()),
            _ if is_skip(payload) => None,
            _ => {
                return Err(HeraldError::Validation(
                    "Send a photo, or press Skip to remove the image.".into(),
                ));
            }
        };
        let type_id = editing_type(&state)?;

        post_types::set_post_type_photo(&self.db, type_id, photo).await?;
        self.finish(state.admin_id).await?;

        info!(admin_id = %state.admin_id, type_id, removed = photo.is_none(), "post type image changed");
        Ok(Response::text(match photo {
            Some(_) => "Image updated ✅",
            None => "Image removed ✅",
        }))
    }

    pub(crate) async fn edit_type_template(
        &self,
        state: ConversationState,
        payload: &Payload,
    ) -> Result<Response, HeraldError> {
        let (template, _) = require_text(payload, &template_prompt())?;
        validate_template(template)?;
        let type_id = editing_type(&state)?;

        post_types::set_post_type_template(&self.db, type_id, template).await?;
        self.finish(state.admin_id).await?;

        info!(admin_id = %state.admin_id, type_id, "post type template changed");
        Ok(Response::text("Template updated ✅"))
    }

    pub(crate) async fn delete_type(&self, type_id: i64) -> Result<Response, HeraldError> {
        let post_type = post_types::get_post_type(&self.db, type_id).await?;
        post_types::delete_post_type(&self.db, type_id).await?;

        info!(type_id, name = %post_type.name, "post type deleted");
        Ok(Response::text(format!(
            "Post type {} deleted. Its posts stay published.",
            post_type.label()
        )))
    }

    async fn ensure_unique_name(&self, name: &str, except: Option<i64>) -> Result<(), HeraldError> {
        match post_types::find_post_type_by_name(&self.db, name).await? {
            Some(existing) if Some(existing.id) != except => Err(HeraldError::Validation(format!(
                "A post type named {} already exists.",
                existing.name
            ))),
            _ => Ok(()),
        }
    }
}

fn editing_type(state: &ConversationState) -> Result<i64, HeraldError> {
    state
        .editing_type_id
        .ok_or_else(|| missing_draft("the post type being edited"))
}
