// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisted conversation state of one administrator.
//!
//! A [`ConversationState`] records which workflow step an administrator is
//! on and every draft value entered so far. It is saved after each transition
//! so a workflow survives independent update deliveries and process restarts.

use strum::{Display, EnumIter, EnumString};

use crate::types::{AdminId, Entity};

/// A step of one of the fixed admin workflows.
///
/// The string forms are what gets persisted; anything else found in storage
/// is a data-integrity error, never "idle".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum Step {
    #[strum(serialize = "new_post:select_type")]
    NewPostSelectType,
    #[strum(serialize = "new_post:enter_text")]
    NewPostEnterText,
    #[strum(serialize = "new_post:confirm")]
    NewPostConfirm,
    #[strum(serialize = "edit_post:enter_link")]
    EditPostEnterLink,
    #[strum(serialize = "edit_post:enter_text")]
    EditPostEnterText,
    #[strum(serialize = "delete_post:enter_link")]
    DeletePostEnterLink,
    #[strum(serialize = "new_type:enter_name")]
    NewTypeEnterName,
    #[strum(serialize = "new_type:enter_image")]
    NewTypeEnterImage,
    #[strum(serialize = "new_type:enter_template")]
    NewTypeEnterTemplate,
    #[strum(serialize = "edit_type:name")]
    EditTypeName,
    #[strum(serialize = "edit_type:image")]
    EditTypeImage,
    #[strum(serialize = "edit_type:template")]
    EditTypeTemplate,
}

/// The workflow a [`Step`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Workflow {
    #[strum(serialize = "new post")]
    NewPost,
    #[strum(serialize = "edit post")]
    EditPost,
    #[strum(serialize = "delete post")]
    DeletePost,
    #[strum(serialize = "new type")]
    NewType,
    #[strum(serialize = "edit type")]
    EditType,
}

impl Step {
    pub fn workflow(self) -> Workflow {
        match self {
            Step::NewPostSelectType | Step::NewPostEnterText | Step::NewPostConfirm => {
                Workflow::NewPost
            }
            Step::EditPostEnterLink | Step::EditPostEnterText => Workflow::EditPost,
            Step::DeletePostEnterLink => Workflow::DeletePost,
            Step::NewTypeEnterName | Step::NewTypeEnterImage | Step::NewTypeEnterTemplate => {
                Workflow::NewType
            }
            Step::EditTypeName | Step::EditTypeImage | Step::EditTypeTemplate => {
                Workflow::EditType
            }
        }
    }
}

/// Conversation state row of one administrator.
///
/// Optional references use `None` for "not set" (stored as `0`), optional
/// photo references use `None` for "absent" (stored as `''`).
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationState {
    pub admin_id: AdminId,
    pub step: Option<Step>,
    pub selected_type_id: Option<i64>,
    pub editing_post_id: Option<i64>,
    pub editing_type_id: Option<i64>,
    pub draft_text: String,
    pub draft_photo: Option<String>,
    pub draft_entities: Vec<Entity>,
    pub temp_name: String,
    pub temp_emoji: String,
    pub temp_photo: Option<String>,
    pub temp_template: String,
    pub last_bot_message_id: Option<i32>,
    pub reply_target_chat_id: Option<i64>,
    pub reply_target_message_id: Option<i32>,
}

impl ConversationState {
    /// A state with every draft field reset, positioned at `step`.
    ///
    /// Every workflow starts from here, never from a previously loaded row.
    pub fn fresh(admin_id: AdminId, step: Step) -> Self {
        Self {
            admin_id,
            step: Some(step),
            selected_type_id: None,
            editing_post_id: None,
            editing_type_id: None,
            draft_text: String::new(),
            draft_photo: None,
            draft_entities: Vec::new(),
            temp_name: String::new(),
            temp_emoji: String::new(),
            temp_photo: None,
            temp_template: String::new(),
            last_bot_message_id: None,
            reply_target_chat_id: None,
            reply_target_message_id: None,
        }
    }

    /// Moves to `step`, keeping every captured draft value.
    pub fn advance(mut self, step: Step) -> Self {
        self.step = Some(step);
        self
    }

    pub fn is_idle(&self) -> bool {
        self.step.is_none()
    }
}

/// Result of looking up an administrator's conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum Conversation {
    /// No row, or a row without a step.
    Idle,
    Active(ConversationState),
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn every_step_roundtrips_through_its_stored_form() {
        for step in Step::iter() {
            let stored = step.to_string();
            assert_eq!(Step::from_str(&stored).unwrap(), step);
        }
    }

    #[test]
    fn unknown_step_string_is_rejected() {
        assert!(Step::from_str("new_post:teleport").is_err());
        assert!(Step::from_str("").is_err());
    }

    #[test]
    fn steps_name_their_workflow() {
        assert_eq!(Step::NewPostConfirm.workflow(), Workflow::NewPost);
        assert_eq!(Step::DeletePostEnterLink.workflow(), Workflow::DeletePost);
        assert_eq!(Step::EditTypeImage.workflow().to_string(), "edit type");
    }

    #[test]
    fn fresh_state_has_no_draft() {
        let state = ConversationState::fresh(AdminId(7), Step::NewTypeEnterName);
        assert_eq!(state.step, Some(Step::NewTypeEnterName));
        assert!(state.draft_text.is_empty());
        assert!(state.draft_entities.is_empty());
        assert!(state.temp_photo.is_none());
        assert!(state.selected_type_id.is_none());
        assert!(!state.is_idle());
    }

    #[test]
    fn advance_keeps_captured_values() {
        let mut state = ConversationState::fresh(AdminId(7), Step::NewPostSelectType);
        state.selected_type_id = Some(3);
        let state = state.advance(Step::NewPostEnterText);
        assert_eq!(state.step, Some(Step::NewPostEnterText));
        assert_eq!(state.selected_type_id, Some(3));
    }
}
