// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::HeraldConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

const READ_CONNECTIONS_RANGE: std::ops::RangeInclusive<usize> = 1..=32;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &HeraldConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if !READ_CONNECTIONS_RANGE.contains(&config.storage.read_connections) {
        errors.push(ConfigError::Validation {
            message: format!(
                "storage.read_connections must be between {} and {}, got {}",
                READ_CONNECTIONS_RANGE.start(),
                READ_CONNECTIONS_RANGE.end(),
                config.storage.read_connections
            ),
        });
    }

    let mut seen = HashSet::new();
    for (i, id) in config.admins.bootstrap.iter().enumerate() {
        if *id == 0 {
            errors.push(ConfigError::Validation {
                message: format!("admins.bootstrap[{i}] must be a non-zero user id"),
            });
        } else if !seen.insert(id) {
            errors.push(ConfigError::Validation {
                message: format!("duplicate admin id `{id}` in admins.bootstrap"),
            });
        }
    }

    if config.forum.topic_id.is_some() && config.forum.chat_id.is_none() {
        errors.push(ConfigError::Validation {
            message: "forum.topic_id requires forum.chat_id".to_string(),
        });
    }

    let level = config.bot.log_level.as_str();
    if !LOG_LEVELS.contains(&level) {
        errors.push(ConfigError::Validation {
            message: format!(
                "bot.log_level `{level}` is not one of {}",
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Additional checks for `herald serve`, which needs a bot token.
pub fn validate_for_serve(config: &HeraldConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = match validate_config(config) {
        Ok(()) => Vec::new(),
        Err(errors) => errors,
    };

    let has_token = config
        .telegram
        .bot_token
        .as_deref()
        .is_some_and(|t| !t.trim().is_empty());
    if !has_token {
        errors.push(ConfigError::MissingKey {
            key: "telegram.bot_token".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
