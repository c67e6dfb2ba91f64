// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Herald integration tests.
//!
//! - [`MockMessenger`] - records every publish, edit, delete and upload
//! - [`TestDb`] - a migrated database in a temp directory, reopenable to simulate restarts
//! - [`CountingStateStore`] - wraps a state store and counts calls into it

pub mod counting_store;
pub mod mock_messenger;
pub mod test_db;

pub use counting_store::CountingStateStore;
pub use mock_messenger::MockMessenger;
pub use test_db::TestDb;
