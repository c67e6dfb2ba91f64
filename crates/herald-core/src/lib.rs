// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Herald admin bot.
//!
//! This crate provides the error type, the identity and value types shared by
//! storage, the conversation engine and the chat transport, and the trait
//! seams between them.

pub mod conversation;
pub mod error;
pub mod link;
pub mod traits;
pub mod types;

pub use conversation::{Conversation, ConversationState, Step, Workflow};
pub use error::HeraldError;
pub use link::{LinkChat, PostLink, message_url};
pub use types::{AdminId, Entity, ForumTarget, PublishedMessage, RenderedPost};

pub use traits::{Messenger, StateStore};
