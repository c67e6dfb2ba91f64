// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admin back-office for the Herald bot.
//!
//! [`ConversationMachine`] turns transport-neutral [`AdminEvent`]s into
//! persisted workflow transitions and [`Response`]s. [`AdminDirectory`]
//! decides who may talk to it and where posts are published.

pub mod directory;
pub mod event;
pub mod machine;
pub mod render;
pub mod response;
mod workflows;

pub use directory::AdminDirectory;
pub use event::{Action, AdminEvent, Command, Payload};
pub use machine::ConversationMachine;
pub use response::{Button, Outcome, Response};
