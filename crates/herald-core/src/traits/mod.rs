// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seams between the conversation engine and its collaborators.
//!
//! Both traits use `#[async_trait]` so implementations can be held as
//! `Arc<dyn Trait>` and swapped for in-memory fakes in tests.

pub mod messenger;
pub mod state;

pub use messenger::Messenger;
pub use state::StateStore;
