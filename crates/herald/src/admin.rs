// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `herald admin` and `herald migrate` command implementations.
//!
//! These work on the database directly and can run while the bot is stopped.
//! A running bot picks up changes made here on its next restart.

use herald_config::HeraldConfig;
use herald_core::{AdminId, HeraldError};
use herald_storage::Database;
use herald_storage::queries::admins;

pub async fn run_add(config: &HeraldConfig, user_id: i64) -> Result<(), HeraldError> {
    let db = Database::open(&config.storage).await?;
    let result = add(&db, user_id).await;
    db.close().await?;
    println!("{}", result?);
    Ok(())
}

pub async fn run_remove(config: &HeraldConfig, user_id: i64) -> Result<(), HeraldError> {
    let db = Database::open(&config.storage).await?;
    let result = remove(&db, &config.admins.bootstrap, user_id).await;
    db.close().await?;
    println!("{}", result?);
    Ok(())
}

pub async fn run_list(config: &HeraldConfig) -> Result<(), HeraldError> {
    let db = Database::open(&config.storage).await?;
    let result = list(&db, &config.admins.bootstrap).await;
    db.close().await?;
    for line in result? {
        println!("{line}");
    }
    Ok(())
}

/// Opening the database applies pending migrations.
pub async fn run_migrate(config: &HeraldConfig) -> Result<(), HeraldError> {
    let db = Database::open(&config.storage).await?;
    let version = db.schema_version().await;
    db.close().await?;
    println!("{}: schema version {}", db.path().display(), version?);
    Ok(())
}

async fn add(db: &Database, user_id: i64) -> Result<String, HeraldError> {
    if user_id <= 0 {
        return Err(HeraldError::Validation(format!(
            "{user_id} is not a Telegram user id"
        )));
    }
    Ok(if admins::add_admin(db, AdminId(user_id)).await? {
        format!("{user_id} is now an administrator")
    } else {
        format!("{user_id} is already an administrator")
    })
}

async fn remove(db: &Database, bootstrap: &[i64], user_id: i64) -> Result<String, HeraldError> {
    if bootstrap.contains(&user_id) {
        return Err(HeraldError::Validation(format!(
            "{user_id} is listed in admins.bootstrap; remove it from the configuration instead"
        )));
    }
    Ok(if admins::remove_admin(db, AdminId(user_id)).await? {
        format!("{user_id} is no longer an administrator")
    } else {
        format!("{user_id} was not an administrator")
    })
}

async fn list(db: &Database, bootstrap: &[i64]) -> Result<Vec<String>, HeraldError> {
    let mut ids: Vec<i64> = admins::list_admins(db)
        .await?
        .into_iter()
        .map(|admin| admin.0)
        .chain(bootstrap.iter().copied())
        .collect();
    ids.sort_unstable();
    ids.dedup();

    Ok(ids
        .into_iter()
        .map(|id| {
            if bootstrap.contains(&id) {
                format!("{id} (config)")
            } else {
                id.to_string()
            }
        })
        .collect())
}
