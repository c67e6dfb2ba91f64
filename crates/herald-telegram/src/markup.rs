// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion of responses into Bot API markup.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, MessageEntity};

use herald_admin::Button;
use herald_core::{Entity, HeraldError};

/// Inline keyboard with each button's action as callback data.
pub fn inline_keyboard(rows: &[Vec<Button>]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(rows.iter().map(|row| {
        row.iter()
            .map(|button| InlineKeyboardButton::callback(button.label.clone(), button.action.to_string()))
            .collect::<Vec<_>>()
    }))
}

/// Converts stored entities back into Bot API entities.
pub fn to_message_entities(entities: &[Entity]) -> Result<Vec<MessageEntity>, HeraldError> {
    entities
        .iter()
        .map(|entity| {
            serde_json::to_value(entity)
                .and_then(serde_json::from_value)
                .map_err(|e| {
                    HeraldError::Integrity(format!(
                        "stored {} entity is not valid: {e}",
                        entity.kind
                    ))
                })
        })
        .collect()
}
