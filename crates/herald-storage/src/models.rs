// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row types for the post catalogue.

use herald_core::types::Entity;

/// A post type: a name, an optional emoji and photo, and a body template.
#[derive(Debug, Clone, PartialEq)]
pub struct PostType {
    pub id: i64,
    pub name: String,
    pub emoji: String,
    /// Transport file reference; `None` when the type has no image.
    pub photo_file_id: Option<String>,
    /// Body template containing the `{text}` placeholder once.
    pub template: String,
    pub created_at: String,
}

impl PostType {
    /// Label used on buttons: `"<emoji> <name>"` or just the name.
    pub fn label(&self) -> String {
        if self.emoji.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.emoji, self.name)
        }
    }
}

/// Values for a post type that does not exist yet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewPostType {
    pub name: String,
    pub emoji: String,
    pub photo_file_id: Option<String>,
    pub template: String,
}

/// A post the bot has published.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: i64,
    /// `None` once the type has been deleted.
    pub post_type_id: Option<i64>,
    pub chat_id: i64,
    pub topic_id: Option<i32>,
    pub message_id: i32,
    /// The administrator's text, before templating.
    pub text: String,
    pub entities: Vec<Entity>,
    pub photo_file_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Values for a freshly published post.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub post_type_id: Option<i64>,
    pub chat_id: i64,
    pub topic_id: Option<i32>,
    pub message_id: i32,
    pub text: String,
    pub entities: Vec<Entity>,
    pub photo_file_id: Option<String>,
}

/// A forum message replying to a published post.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub id: i64,
    pub post_id: i64,
    pub chat_id: i64,
    pub message_id: i32,
    pub author_id: i64,
    pub text: String,
    pub created_at: String,
}

/// Values for a reply seen in the forum.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReply {
    pub post_id: i64,
    pub chat_id: i64,
    pub message_id: i32,
    pub author_id: i64,
    pub text: String,
}

/// Empty strings are stored for absent file references.
pub(crate) fn file_ref_to_column(value: Option<&str>) -> &str {
    value.unwrap_or("")
}

pub(crate) fn file_ref_from_column(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}
