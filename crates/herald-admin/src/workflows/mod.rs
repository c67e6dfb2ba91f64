// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Step handlers, one module per workflow family.

mod edit_post;
mod new_post;
mod post_type;
mod settings;

use herald_core::{Entity, HeraldError};

use crate::event::{Action, Payload};

/// Non-empty text of a text payload.
pub(crate) fn require_text<'a>(
    payload: &'a Payload,
    hint: &str,
) -> Result<(&'a str, &'a [Entity]), HeraldError> {
    match payload {
        Payload::Text { text, entities } if !text.trim().is_empty() => Ok((text, entities)),
        _ => Err(HeraldError::Validation(hint.to_string())),
    }
}

/// The Skip button, or the word "skip" typed out.
pub(crate) fn is_skip(payload: &Payload) -> bool {
    match payload {
        Payload::Action(Action::Skip) => true,
        Payload::Text { text, .. } => text.trim().eq_ignore_ascii_case("skip"),
        _ => false,
    }
}

pub(crate) fn missing_draft(field: &str) -> HeraldError {
    HeraldError::Integrity(format!("conversation state is missing {field}"))
}
