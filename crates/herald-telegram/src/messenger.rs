// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`Messenger`] over the Bot API.

use async_trait::async_trait;
use teloxide::RequestError;
use teloxide::prelude::*;
use teloxide::types::{InputFile, MessageId, ThreadId};
use tracing::debug;

use herald_core::{ForumTarget, HeraldError, Messenger, PublishedMessage, RenderedPost};

use crate::markup::to_message_entities;

pub(crate) fn transport_error(action: &str, e: RequestError) -> HeraldError {
    HeraldError::Transport {
        message: format!("failed to {action}: {e}"),
        source: Some(Box::new(e)),
    }
}

/// Editing a message to identical content is not a failure.
pub(crate) fn is_not_modified(e: &RequestError) -> bool {
    e.to_string().contains("message is not modified")
}

/// Publishes posts through a teloxide [`Bot`].
#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_post(
        &self,
        target: ForumTarget,
        post: &RenderedPost,
    ) -> Result<PublishedMessage, HeraldError> {
        let chat_id = ChatId(target.chat_id);
        let thread = target.topic_id.map(|topic| ThreadId(MessageId(topic)));
        let entities = to_message_entities(&post.entities)?;

        let sent = match &post.photo {
            Some(photo) => {
                let mut req = self
                    .bot
                    .send_photo(chat_id, InputFile::file_id(teloxide::types::FileId(photo.clone())));
                req.caption = Some(post.text.clone());
                req.caption_entities = Some(entities);
                req.message_thread_id = thread;
                req.await.map_err(|e| transport_error("send photo post", e))?
            }
            None => {
                let mut req = self.bot.send_message(chat_id, post.text.clone());
                req.entities = Some(entities);
                req.message_thread_id = thread;
                req.await.map_err(|e| transport_error("send post", e))?
            }
        };

        debug!(chat_id = target.chat_id, message_id = sent.id.0, "post sent");
        Ok(PublishedMessage {
            chat_id: sent.chat.id.0,
            message_id: sent.id.0,
        })
    }

    async fn edit_post(
        &self,
        message: PublishedMessage,
        post: &RenderedPost,
    ) -> Result<(), HeraldError> {
        let chat_id = ChatId(message.chat_id);
        let message_id = MessageId(message.message_id);
        let entities = to_message_entities(&post.entities)?;

        let result = if post.photo.is_some() {
            let mut req = self.bot.edit_message_caption(chat_id, message_id);
            req.caption = Some(post.text.clone());
            req.caption_entities = Some(entities);
            req.await.map(|_| ())
        } else {
            let mut req = self
                .bot
                .edit_message_text(chat_id, message_id, post.text.clone());
            req.entities = Some(entities);
            req.await.map(|_| ())
        };

        match result {
            Ok(()) => Ok(()),
            Err(e) if is_not_modified(&e) => Ok(()),
            Err(e) => Err(transport_error("edit post", e)),
        }
    }

    async fn delete_message(&self, message: PublishedMessage) -> Result<(), HeraldError> {
        self.bot
            .delete_message(ChatId(message.chat_id), MessageId(message.message_id))
            .await
            .map_err(|e| transport_error("delete message", e))?;
        Ok(())
    }

    async fn send_document(
        &self,
        chat_id: i64,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<(), HeraldError> {
        let file = InputFile::memory(contents).file_name(file_name.to_string());
        self.bot
            .send_document(ChatId(chat_id), file)
            .await
            .map_err(|e| transport_error("send document", e))?;
        Ok(())
    }
}
