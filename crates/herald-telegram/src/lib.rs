// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram transport for the Herald admin bot.
//!
//! Long-polls the Bot API via teloxide, hands admin events to the
//! [`ConversationMachine`], renders its responses as messages with inline
//! keyboards, and records forum replies to published posts.

pub mod handler;
pub mod markup;
pub mod messenger;

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::{MessageId, ReplyMarkup, ThreadId};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use herald_admin::{AdminEvent, Command, ConversationMachine, Outcome, Response};
use herald_config::model::TelegramConfig;
use herald_core::{HeraldError, RenderedPost};
use herald_storage::queries::{posts, replies};
use herald_storage::{Database, NewReply};

pub use messenger::TelegramMessenger;

use crate::markup::{inline_keyboard, to_message_entities};
use crate::messenger::{is_not_modified, transport_error};

/// Creates the teloxide client. Requires `telegram.bot_token`.
pub fn connect_bot(config: &TelegramConfig) -> Result<Bot, HeraldError> {
    let token = config.bot_token.as_deref().ok_or_else(|| {
        HeraldError::Config("telegram.bot_token is required to run the bot".into())
    })?;

    if token.is_empty() {
        return Err(HeraldError::Config(
            "telegram.bot_token cannot be empty".into(),
        ));
    }

    Ok(Bot::new(token))
}

/// The polling side of the transport.
pub struct TelegramChannel {
    bot: Bot,
    machine: Arc<ConversationMachine>,
    db: Arc<Database>,
}

impl TelegramChannel {
    pub fn new(bot: Bot, machine: Arc<ConversationMachine>, db: Arc<Database>) -> Self {
        Self { bot, machine, db }
    }

    /// Publishes the command menu shown in private chats.
    pub async fn register_commands(&self) -> Result<(), HeraldError> {
        let commands = Command::menu()
            .iter()
            .map(|(name, description)| teloxide::types::BotCommand::new(*name, *description))
            .collect::<Vec<_>>();
        self.bot
            .set_my_commands(commands)
            .await
            .map_err(|e| transport_error("register commands", e))?;
        Ok(())
    }

    /// Polls until `shutdown` is cancelled.
    pub async fn run(self, shutdown: CancellationToken) {
        let app = Arc::new(self);

        let on_message = {
            let app = app.clone();
            move |msg: Message| {
                let app = app.clone();
                async move {
                    app.on_message(msg).await;
                    respond(())
                }
            }
        };
        let on_callback = {
            let app = app.clone();
            move |q: CallbackQuery| {
                let app = app.clone();
                async move {
                    app.on_callback(q).await;
                    respond(())
                }
            }
        };

        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint(on_message))
            .branch(Update::filter_callback_query().endpoint(on_callback));

        let mut dispatcher = Dispatcher::builder(app.bot.clone(), handler)
            .default_handler(|_| async {})
            .build();

        let token = dispatcher.shutdown_token();
        tokio::spawn(async move {
            shutdown.cancelled().await;
            match token.shutdown() {
                Ok(stopped) => stopped.await,
                Err(e) => debug!(error = %e, "dispatcher was not running"),
            }
        });

        info!("starting Telegram long polling");
        dispatcher.dispatch().await;
        info!("Telegram polling stopped");
    }

    async fn on_message(&self, msg: Message) {
        if let Some(event) = handler::event_from_message(&msg) {
            self.process(event).await;
            return;
        }

        if let Some((parent_id, author_id, text)) = handler::reply_from_message(&msg) {
            if let Err(e) = self.record_reply(&msg, parent_id, author_id, text).await {
                warn!(error = %e, chat_id = msg.chat.id.0, "failed to record reply");
            }
            return;
        }

        debug!(msg_id = msg.id.0, chat_id = msg.chat.id.0, "ignoring message");
    }

    async fn on_callback(&self, q: CallbackQuery) {
        // Always stop the client-side spinner, even for presses we drop.
        if let Err(e) = self.bot.answer_callback_query(q.id.clone()).await {
            debug!(error = %e, "failed to answer callback query");
        }

        match handler::event_from_callback(&q) {
            Some(event) => self.process(event).await,
            None => debug!("ignoring callback query"),
        }
    }

    async fn record_reply(
        &self,
        msg: &Message,
        parent_id: i32,
        author_id: i64,
        text: String,
    ) -> Result<(), HeraldError> {
        let chat_id = msg.chat.id.0;
        let Some(post) = posts::find_post_by_message(&self.db, chat_id, parent_id).await? else {
            return Ok(());
        };

        let id = replies::record_reply(
            &self.db,
            &NewReply {
                post_id: post.id,
                chat_id,
                message_id: msg.id.0,
                author_id,
                text,
            },
        )
        .await?;
        debug!(reply_id = id, post_id = post.id, "reply recorded");
        Ok(())
    }

    async fn process(&self, event: AdminEvent) {
        let admin_id = event.admin_id;
        let outcome = match self.machine.handle(event.clone()).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let text = match &e {
                    HeraldError::NotFound { entity, .. } => format!("That {entity} no longer exists."),
                    _ => {
                        error!(admin_id = %admin_id, error = %e, "failed to handle admin event");
                        "Something went wrong, please try again.".to_string()
                    }
                };
                Outcome::Rejected(Response::text(text))
            }
        };

        let result = match &outcome {
            Outcome::Ignored => Ok(()),
            Outcome::Rejected(response) => self.send_text(&event, &response.text).await,
            Outcome::Respond(response) => self.deliver(&event, response).await,
        };
        if let Err(e) = result {
            warn!(admin_id = %admin_id, error = %e, "failed to deliver response");
        }
    }

    /// Shows a response and remembers it as the latest prompt.
    async fn deliver(&self, event: &AdminEvent, response: &Response) -> Result<(), HeraldError> {
        let chat_id = ChatId(event.chat_id);

        if let Some(stale) = response.dismiss {
            self.clear_keyboard(chat_id, stale).await;
        }
        if let Some(preview) = &response.preview {
            self.send_preview(event, preview).await?;
        }

        let markup = inline_keyboard(&response.keyboard);

        // A pressed button's message is edited in place unless a preview
        // has to come before the new prompt.
        let edited = match event.origin_message_id {
            Some(origin) if response.preview.is_none() => {
                let mut req = self.bot.edit_message_text(chat_id, MessageId(origin), response.text.clone());
                req.reply_markup = Some(markup.clone());
                match req.await {
                    Ok(_) => Some(origin),
                    Err(e) if is_not_modified(&e) => Some(origin),
                    Err(e) => {
                        debug!(error = %e, "editing prompt failed, sending a new one");
                        self.clear_keyboard(chat_id, origin).await;
                        None
                    }
                }
            }
            Some(origin) => {
                self.clear_keyboard(chat_id, origin).await;
                None
            }
            None => None,
        };

        let prompt_id = match edited {
            Some(id) => id,
            None => {
                let mut req = self.bot.send_message(chat_id, response.text.clone());
                req.message_thread_id = event.thread_id.map(|t| ThreadId(MessageId(t)));
                if !response.keyboard.is_empty() {
                    req.reply_markup = Some(ReplyMarkup::InlineKeyboard(markup));
                }
                req.await.map_err(|e| transport_error("send response", e))?.id.0
            }
        };

        self.machine.remember_prompt(event.admin_id, prompt_id).await
    }

    async fn send_preview(&self, event: &AdminEvent, preview: &RenderedPost) -> Result<(), HeraldError> {
        let chat_id = ChatId(event.chat_id);
        let entities = to_message_entities(&preview.entities)?;
        match &preview.photo {
            Some(photo) => {
                let mut req = self
                    .bot
                    .send_photo(chat_id, teloxide::types::InputFile::file_id(teloxide::types::FileId(photo.clone())));
                req.caption = Some(preview.text.clone());
                req.caption_entities = Some(entities);
                req.await.map_err(|e| transport_error("send preview", e))?;
            }
            None => {
                let mut req = self.bot.send_message(chat_id, preview.text.clone());
                req.entities = Some(entities);
                req.await.map_err(|e| transport_error("send preview", e))?;
            }
        }
        Ok(())
    }

    async fn send_text(&self, event: &AdminEvent, text: &str) -> Result<(), HeraldError> {
        let mut req = self.bot.send_message(ChatId(event.chat_id), text.to_string());
        req.message_thread_id = event.thread_id.map(|t| ThreadId(MessageId(t)));
        req.await.map_err(|e| transport_error("send message", e))?;
        Ok(())
    }

    /// Removes the inline keyboard of an earlier prompt. Failures are harmless.
    async fn clear_keyboard(&self, chat_id: ChatId, message_id: i32) {
        if let Err(e) = self
            .bot
            .edit_message_reply_markup(chat_id, MessageId(message_id))
            .await
        {
            debug!(error = %e, message_id, "could not clear keyboard");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_requires_bot_token() {
        let config = TelegramConfig { bot_token: None };
        assert!(matches!(connect_bot(&config), Err(HeraldError::Config(_))));
    }

    #[test]
    fn connect_rejects_empty_token() {
        let config = TelegramConfig {
            bot_token: Some(String::new()),
        };
        assert!(connect_bot(&config).is_err());
    }

    #[test]
    fn connect_accepts_valid_token() {
        let config = TelegramConfig {
            bot_token: Some("123456:ABC-DEF1234ghIkl-zyx57W2v1u123ew11".into()),
        };
        assert!(connect_bot(&config).is_ok());
    }
}
