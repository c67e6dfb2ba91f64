// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport-neutral inbound events.

use std::fmt;
use std::str::FromStr;

use herald_core::{AdminId, Entity, HeraldError};

/// One inbound update, reduced to what the conversation engine needs.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminEvent {
    pub admin_id: AdminId,
    /// Chat the event arrived in; responses go back here.
    pub chat_id: i64,
    /// Forum topic of the chat, if any.
    pub thread_id: Option<i32>,
    /// The bot message whose button was pressed, for callback events.
    pub origin_message_id: Option<i32>,
    pub payload: Payload,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Command(Command),
    Text {
        text: String,
        entities: Vec<Entity>,
    },
    Photo {
        file_id: String,
        caption: String,
        entities: Vec<Entity>,
    },
    Action(Action),
    Cancel,
}

impl Payload {
    pub fn text(text: impl Into<String>) -> Self {
        Payload::Text {
            text: text.into(),
            entities: Vec::new(),
        }
    }

    /// `/cancel`, the cancel button, or an explicit cancel.
    pub fn is_cancel(&self) -> bool {
        matches!(
            self,
            Payload::Cancel | Payload::Command(Command::Cancel) | Payload::Action(Action::Cancel)
        )
    }
}

/// Slash commands understood by the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    NewPost,
    EditPost,
    DeletePost,
    NewType,
    Types,
    Cancel,
    Export,
    /// Raw arguments: empty, or `<chat_id> [topic_id]`.
    SetForum(String),
    AddAdmin(String),
    RemoveAdmin(String),
    Admins,
}

impl Command {
    /// Parses `/name[@bot] args`. Returns `None` for text that is not a known command.
    pub fn parse(text: &str) -> Option<Command> {
        let rest = text.trim().strip_prefix('/')?;
        let (head, args) = match rest.split_once(char::is_whitespace) {
            Some((head, args)) => (head, args.trim().to_string()),
            None => (rest, String::new()),
        };
        let name = head.split('@').next().unwrap_or(head).to_ascii_lowercase();

        let command = match name.as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            "newpost" => Command::NewPost,
            "editpost" => Command::EditPost,
            "deletepost" => Command::DeletePost,
            "newtype" => Command::NewType,
            "types" => Command::Types,
            "cancel" => Command::Cancel,
            "export" => Command::Export,
            "setforum" => Command::SetForum(args),
            "addadmin" => Command::AddAdmin(args),
            "removeadmin" => Command::RemoveAdmin(args),
            "admins" => Command::Admins,
            _ => return None,
        };
        Some(command)
    }

    /// Command list for the bot menu, as `(name, description)`.
    pub fn menu() -> &'static [(&'static str, &'static str)] {
        &[
            ("newpost", "Publish a new post"),
            ("editpost", "Edit a published post"),
            ("deletepost", "Delete a published post"),
            ("newtype", "Create a post type"),
            ("types", "Manage post types"),
            ("cancel", "Cancel the current action"),
            ("export", "Download a database dump"),
            ("setforum", "Publish into this forum topic"),
            ("admins", "List administrators"),
            ("help", "Show help"),
        ]
    }
}

/// Button presses, encoded as callback data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SelectType(i64),
    Confirm,
    Skip,
    Cancel,
    RenameType(i64),
    TypeImage(i64),
    TypeTemplate(i64),
    DeleteType(i64),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::SelectType(id) => write!(f, "type:{id}"),
            Action::Confirm => f.write_str("confirm"),
            Action::Skip => f.write_str("skip"),
            Action::Cancel => f.write_str("cancel"),
            Action::RenameType(id) => write!(f, "tname:{id}"),
            Action::TypeImage(id) => write!(f, "timg:{id}"),
            Action::TypeTemplate(id) => write!(f, "ttpl:{id}"),
            Action::DeleteType(id) => write!(f, "tdel:{id}"),
        }
    }
}

impl FromStr for Action {
    type Err = HeraldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || HeraldError::Validation(format!("unknown button: {s}"));

        match s {
            "confirm" => return Ok(Action::Confirm),
            "skip" => return Ok(Action::Skip),
            "cancel" => return Ok(Action::Cancel),
            _ => {}
        }

        let (kind, id) = s.split_once(':').ok_or_else(unknown)?;
        let id: i64 = id.parse().map_err(|_| unknown())?;
        match kind {
            "type" => Ok(Action::SelectType(id)),
            "tname" => Ok(Action::RenameType(id)),
            "timg" => Ok(Action::TypeImage(id)),
            "ttpl" => Ok(Action::TypeTemplate(id)),
            "tdel" => Ok(Action::DeleteType(id)),
            _ => Err(unknown()),
        }
    }
}
