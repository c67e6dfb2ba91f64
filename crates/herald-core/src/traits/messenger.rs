// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound side of the messaging transport.

use async_trait::async_trait;

use crate::error::HeraldError;
use crate::types::{ForumTarget, PublishedMessage, RenderedPost};

/// Publishes and maintains posts in the destination chat.
///
/// Implementations map transport failures to [`HeraldError::Transport`].
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Sends a new post to `target` and returns where it landed.
    async fn send_post(
        &self,
        target: ForumTarget,
        post: &RenderedPost,
    ) -> Result<PublishedMessage, HeraldError>;

    /// Replaces the body of a published post.
    ///
    /// When `post.photo` is set the caption is edited instead of the text.
    async fn edit_post(
        &self,
        message: PublishedMessage,
        post: &RenderedPost,
    ) -> Result<(), HeraldError>;

    async fn delete_message(&self, message: PublishedMessage) -> Result<(), HeraldError>;

    /// Uploads `contents` as a document named `file_name` to `chat_id`.
    async fn send_document(
        &self,
        chat_id: i64,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<(), HeraldError>;
}
