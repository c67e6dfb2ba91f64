// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `herald serve` command implementation.
//!
//! Wires storage, the admin directory, the conversation engine and the
//! Telegram transport together, polls until a shutdown signal arrives, then
//! drains the write queue.

use std::sync::Arc;
use std::time::Duration;

use herald_admin::{AdminDirectory, ConversationMachine};
use herald_config::HeraldConfig;
use herald_core::{AdminId, HeraldError, Messenger, StateStore};
use herald_storage::{Database, SqliteStateStore};
use herald_telegram::{TelegramChannel, TelegramMessenger, connect_bot};
use tracing::{info, warn};

use crate::shutdown;

/// Runs the bot until SIGINT or SIGTERM.
pub async fn run_serve(config: HeraldConfig) -> Result<(), HeraldError> {
    let bot = connect_bot(&config.telegram)?;

    let db = Arc::new(Database::open(&config.storage).await?);

    let bootstrap = config.admins.bootstrap.iter().copied().map(AdminId);
    let directory =
        Arc::new(AdminDirectory::load(db.clone(), bootstrap, config.forum.target()).await?);
    info!(
        admins = directory.admins().len(),
        forum_configured = directory.forum_target().is_some(),
        "admin directory loaded"
    );

    let store: Arc<dyn StateStore> = Arc::new(SqliteStateStore::new(db.clone()));
    let messenger: Arc<dyn Messenger> = Arc::new(TelegramMessenger::new(bot.clone()));
    let machine = Arc::new(ConversationMachine::new(
        db.clone(),
        store,
        directory,
        messenger,
    ));

    let channel = TelegramChannel::new(bot, machine, db.clone());
    if let Err(e) = channel.register_commands().await {
        warn!(error = %e, "failed to register the command menu");
    }

    let cancel = shutdown::install_signal_handler();
    channel.run(cancel).await;

    drain(&db, Duration::from_secs(config.bot.shutdown_timeout_secs)).await?;
    info!("herald stopped");
    Ok(())
}

/// Closes the database, giving queued writes up to `timeout` to finish.
async fn drain(db: &Database, timeout: Duration) -> Result<(), HeraldError> {
    match tokio::time::timeout(timeout, db.close()).await {
        Ok(result) => result,
        Err(_) => {
            warn!(
                timeout_secs = timeout.as_secs(),
                "timed out draining the write queue"
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use herald_storage::OpenOptions;
    use herald_storage::queries::admins;

    use super::*;

    #[tokio::test]
    async fn drain_completes_queued_writes() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_with(dir.path().join("herald.db"), OpenOptions::default())
            .await
            .unwrap();
        admins::add_admin(&db, AdminId(42)).await.unwrap();

        drain(&db, Duration::from_secs(5)).await.unwrap();
        assert!(matches!(
            admins::add_admin(&db, AdminId(43)).await,
            Err(HeraldError::QueueClosed)
        ));

        let reopened = Database::open_with(dir.path().join("herald.db"), OpenOptions::default())
            .await
            .unwrap();
        assert_eq!(admins::list_admins(&reopened).await.unwrap(), vec![AdminId(42)]);
    }

    #[tokio::test]
    async fn serve_requires_bot_token() {
        let config = HeraldConfig::default();
        assert!(matches!(
            run_serve(config).await,
            Err(HeraldError::Config(_))
        ));
    }
}
