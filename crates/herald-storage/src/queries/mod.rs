// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed CRUD operations. Writes go through the write queue, reads through
//! the read pool.

pub mod admins;
pub mod config;
pub mod post_types;
pub mod posts;
pub mod replies;
