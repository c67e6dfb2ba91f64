// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! reported at startup instead of silently ignored.

use serde::{Deserialize, Serialize};

use herald_core::types::ForumTarget;

/// Top-level Herald configuration.
///
/// Every section is optional and defaults to sensible values. Only
/// `telegram.bot_token` is required, and only for `herald serve`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HeraldConfig {
    #[serde(default)]
    pub bot: BotConfig,

    #[serde(default)]
    pub telegram: TelegramConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub admins: AdminsConfig,

    #[serde(default)]
    pub forum: ForumConfig,
}

/// Process-level settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Seconds to wait for in-flight updates and queued writes on shutdown.
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_shutdown_timeout_secs() -> u64 {
    10
}

/// Telegram Bot API settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: Option<String>,
}

/// SQLite storage settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// Number of read-only connections used for concurrent reads.
    #[serde(default = "default_read_connections")]
    pub read_connections: usize,

    /// SQLite busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            read_connections: default_read_connections(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("herald").join("herald.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("herald.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

fn default_read_connections() -> usize {
    4
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

/// Administrators that exist regardless of database contents.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AdminsConfig {
    /// Telegram user ids seeded into the admins table at startup.
    #[serde(default)]
    pub bootstrap: Vec<i64>,
}

/// Initial publish destination, used only while the database has none.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ForumConfig {
    #[serde(default)]
    pub chat_id: Option<i64>,

    #[serde(default)]
    pub topic_id: Option<i32>,
}

impl ForumConfig {
    pub fn target(&self) -> Option<ForumTarget> {
        self.chat_id.map(|chat_id| ForumTarget {
            chat_id,
            topic_id: self.topic_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = HeraldConfig::default();
        assert_eq!(config.bot.log_level, "info");
        assert_eq!(config.bot.shutdown_timeout_secs, 10);
        assert!(config.telegram.bot_token.is_none());
        assert!(config.storage.wal_mode);
        assert_eq!(config.storage.read_connections, 4);
        assert_eq!(config.storage.busy_timeout_ms, 5000);
        assert!(config.storage.database_path.ends_with("herald.db"));
        assert!(config.admins.bootstrap.is_empty());
        assert!(config.forum.target().is_none());
    }

    #[test]
    fn forum_target_requires_chat() {
        let forum = ForumConfig {
            chat_id: Some(-1001),
            topic_id: Some(5),
        };
        assert_eq!(
            forum.target(),
            Some(ForumTarget {
                chat_id: -1001,
                topic_id: Some(5)
            })
        );

        let topic_only = ForumConfig {
            chat_id: None,
            topic_id: Some(5),
        };
        assert!(topic_only.target().is_none());
    }

    #[test]
    fn unknown_storage_key_is_rejected() {
        let result = toml::from_str::<HeraldConfig>("[storage]\nread_conections = 2\n");
        assert!(result.is_err());
    }
}
