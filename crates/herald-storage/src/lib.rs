// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Herald admin bot.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, the single-writer
//! [`WriteQueue`] every mutation goes through, the conversation state store,
//! typed CRUD for admins, settings, post types, posts and replies, and a
//! replayable text dump.

pub mod conversation;
pub mod database;
pub mod export;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod writer;

pub use conversation::SqliteStateStore;
pub use database::{Database, OpenOptions};
pub use export::{export_dump, import_dump};
pub use models::*;
pub use writer::WriteQueue;
