// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot commands: export, forum target and administrators.

use tracing::info;

use herald_core::{AdminId, ForumTarget, HeraldError};
use herald_storage::export_dump;

use crate::event::AdminEvent;
use crate::machine::ConversationMachine;
use crate::response::Response;

const SET_FORUM_USAGE: &str =
    "Send /setforum inside the forum topic, or pass the ids: /setforum <chat id> [topic id]";

impl ConversationMachine {
    pub(crate) async fn export(&self, event: &AdminEvent) -> Result<Response, HeraldError> {
        let dump = export_dump(&self.db).await?;
        let file_name = format!(
            "herald-dump-{}.sql",
            chrono::Utc::now().format("%Y%m%d-%H%M%S")
        );
        let size = dump.len();
        self.messenger
            .send_document(event.chat_id, &file_name, dump.into_bytes())
            .await?;

        info!(admin_id = %event.admin_id, %file_name, size, "database exported");
        Ok(Response::text("Database export sent."))
    }

    pub(crate) async fn set_forum(
        &self,
        event: &AdminEvent,
        args: &str,
    ) -> Result<Response, HeraldError> {
        let target = if args.trim().is_empty() {
            // Private chats have positive ids.
            if event.chat_id > 0 {
                return Err(HeraldError::Validation(SET_FORUM_USAGE.into()));
            }
            ForumTarget {
                chat_id: event.chat_id,
                topic_id: event.thread_id,
            }
        } else {
            parse_forum_args(args)?
        };

        self.directory.set_forum_target(target).await?;
        Ok(Response::text(match target.topic_id {
            Some(topic) => format!(
                "Posts will be published to chat {} in topic {topic}.",
                target.chat_id
            ),
            None => format!("Posts will be published to chat {}.", target.chat_id),
        }))
    }

    pub(crate) async fn add_admin(&self, arg: &str) -> Result<Response, HeraldError> {
        let id = parse_user_id(arg, "/addadmin")?;
        Ok(Response::text(if self.directory.add(id).await? {
            format!("{id} is now an administrator.")
        } else {
            format!("{id} already is an administrator.")
        }))
    }

    pub(crate) async fn remove_admin(&self, arg: &str) -> Result<Response, HeraldError> {
        let id = parse_user_id(arg, "/removeadmin")?;
        Ok(Response::text(if self.directory.remove(id).await? {
            format!("{id} is no longer an administrator.")
        } else {
            format!("{id} was not an administrator.")
        }))
    }

    pub(crate) fn list_admins(&self) -> Response {
        let mut text = String::from("Administrators:");
        for id in self.directory.admins() {
            text.push_str(&format!("\n{id}"));
            if self.directory.is_bootstrap(id) {
                text.push_str(" (config)");
            }
        }
        Response::text(text)
    }
}

fn parse_user_id(arg: &str, command: &str) -> Result<AdminId, HeraldError> {
    arg.trim()
        .parse::<i64>()
        .map(AdminId)
        .map_err(|_| HeraldError::Validation(format!("Usage: {command} <user id>")))
}

fn parse_forum_args(args: &str) -> Result<ForumTarget, HeraldError> {
    let usage = || HeraldError::Validation(SET_FORUM_USAGE.into());
    let mut parts = args.split_whitespace();

    let chat_id: i64 = parts
        .next()
        .and_then(|chat| chat.parse().ok())
        .filter(|chat: &i64| *chat < 0)
        .ok_or_else(usage)?;
    let topic_id = parts
        .next()
        .map(|topic| topic.parse::<i32>().map_err(|_| usage()))
        .transpose()?;
    if parts.next().is_some() {
        return Err(usage());
    }

    Ok(ForumTarget { chat_id, topic_id })
}
