// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post templates and type names.

use herald_core::{Entity, HeraldError, RenderedPost};

/// Placeholder a template must contain exactly once.
pub const PLACEHOLDER: &str = "{text}";

/// Telegram's limit for message text, in UTF-16 units.
pub const MAX_TEXT_LEN: usize = 4096;

/// Telegram's limit for photo captions, in UTF-16 units.
pub const MAX_CAPTION_LEN: usize = 1024;

pub fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

pub fn validate_template(template: &str) -> Result<(), HeraldError> {
    match template.matches(PLACEHOLDER).count() {
        1 => Ok(()),
        0 => Err(HeraldError::Validation(format!(
            "The template must contain {PLACEHOLDER} where the post text goes."
        ))),
        _ => Err(HeraldError::Validation(format!(
            "The template must contain {PLACEHOLDER} only once."
        ))),
    }
}

/// Substitutes `text` into `template`, moving `entities` past the template prefix.
///
/// `photo` turns the body into a caption, which has a lower length limit.
pub fn render_post(
    template: &str,
    text: &str,
    entities: &[Entity],
    photo: Option<String>,
) -> Result<RenderedPost, HeraldError> {
    let (prefix, suffix) = template.split_once(PLACEHOLDER).ok_or_else(|| {
        HeraldError::Integrity(format!("stored template has no {PLACEHOLDER} placeholder"))
    })?;

    let shift = utf16_len(prefix);
    let body = format!("{prefix}{text}{suffix}");

    let limit = if photo.is_some() {
        MAX_CAPTION_LEN
    } else {
        MAX_TEXT_LEN
    };
    let len = utf16_len(&body);
    if len > limit {
        return Err(HeraldError::Validation(format!(
            "The post is too long ({len} characters, the limit is {limit}). Send a shorter text."
        )));
    }

    Ok(RenderedPost {
        text: body,
        entities: entities.iter().map(|e| e.shifted(shift)).collect(),
        photo,
    })
}

/// Splits an optional leading emoji off a type name: `"📰 News"` → `("📰", "News")`.
pub fn split_type_name(input: &str) -> Result<(String, String), HeraldError> {
    let input = input.trim();
    let split_at = input
        .char_indices()
        .find(|(_, c)| c.is_ascii() || c.is_alphanumeric())
        .map_or(input.len(), |(i, _)| i);
    let (emoji, name) = input.split_at(split_at);
    let name = name.trim();

    if name.is_empty() {
        return Err(HeraldError::Validation(
            "The type needs a name, for example: 📰 News".into(),
        ));
    }
    if name.chars().count() > 64 {
        return Err(HeraldError::Validation(
            "Type names are limited to 64 characters.".into(),
        ));
    }
    Ok((emoji.trim().to_string(), name.to_string()))
}
