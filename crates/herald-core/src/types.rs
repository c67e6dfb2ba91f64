// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by storage, the conversation engine and the transport.

use serde::{Deserialize, Serialize};

/// Identity of a bot administrator (the Telegram user id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AdminId(pub i64);

impl std::fmt::Display for AdminId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Default publish destination: a forum chat and optionally one of its topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumTarget {
    pub chat_id: i64,
    pub topic_id: Option<i32>,
}

/// A rich-text formatting span over a message text.
///
/// Mirrors the Bot API `MessageEntity` JSON shape. `offset` and `length` are
/// measured in UTF-16 code units. Kind-specific attributes (`url`, `user`,
/// `language`, `custom_emoji_id`) are carried opaquely in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "type")]
    pub kind: String,
    pub offset: usize,
    pub length: usize,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Entity {
    /// Creates an entity without kind-specific attributes.
    pub fn new(kind: impl Into<String>, offset: usize, length: usize) -> Self {
        Self {
            kind: kind.into(),
            offset,
            length,
            extra: serde_json::Map::new(),
        }
    }

    /// Returns a copy moved right by `shift` UTF-16 units.
    pub fn shifted(&self, shift: usize) -> Self {
        Self {
            offset: self.offset + shift,
            ..self.clone()
        }
    }
}

/// A post body ready to be sent or edited through the transport.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderedPost {
    pub text: String,
    pub entities: Vec<Entity>,
    /// Transport file reference of an attached photo; the text becomes its caption.
    pub photo: Option<String>,
}

/// Coordinates of a message the bot has published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishedMessage {
    pub chat_id: i64,
    pub message_id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_roundtrips_bot_api_json() {
        let json = r#"{"type":"text_link","offset":3,"length":5,"url":"https://example.com"}"#;
        let entity: Entity = serde_json::from_str(json).unwrap();
        assert_eq!(entity.kind, "text_link");
        assert_eq!(entity.offset, 3);
        assert_eq!(entity.extra["url"], "https://example.com");

        let back = serde_json::to_value(&entity).unwrap();
        assert_eq!(back["type"], "text_link");
        assert_eq!(back["url"], "https://example.com");
    }

    #[test]
    fn shifted_keeps_attributes() {
        let mut entity = Entity::new("bold", 0, 4);
        entity
            .extra
            .insert("note".into(), serde_json::Value::from("kept"));
        let moved = entity.shifted(10);
        assert_eq!(moved.offset, 10);
        assert_eq!(moved.length, 4);
        assert_eq!(moved.extra["note"], "kept");
    }
}
