// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key/value settings stored in the `config` table.

use herald_core::{ForumTarget, HeraldError};
use rusqlite::{OptionalExtension, params};

use crate::database::Database;

pub const FORUM_CHAT_ID: &str = "forum_chat_id";
pub const FORUM_TOPIC_ID: &str = "forum_topic_id";

pub async fn get_config(db: &Database, key: &str) -> Result<Option<String>, HeraldError> {
    let key = key.to_string();
    db.read(move |conn| {
        conn.query_row(
            "SELECT value FROM config WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
    })
    .await
}

pub async fn set_config(db: &Database, key: &str, value: &str) -> Result<(), HeraldError> {
    let key = key.to_string();
    let value = value.to_string();
    db.submit(move |tx| {
        upsert(tx, &key, &value)?;
        Ok(())
    })
    .await
}

fn upsert(conn: &rusqlite::Connection, key: &str, value: &str) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO config (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )
}

/// The stored publish destination, if one has been set.
pub async fn get_forum_target(db: &Database) -> Result<Option<ForumTarget>, HeraldError> {
    let (chat, topic) = db
        .read(|conn| {
            let get = |key: &str| -> rusqlite::Result<Option<String>> {
                conn.query_row(
                    "SELECT value FROM config WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()
            };
            Ok((get(FORUM_CHAT_ID)?, get(FORUM_TOPIC_ID)?))
        })
        .await?;

    let Some(chat) = chat.filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    let chat_id = chat
        .parse::<i64>()
        .map_err(|_| HeraldError::Integrity(format!("{FORUM_CHAT_ID} is not a chat id: {chat:?}")))?;
    let topic_id = match topic.filter(|v| !v.is_empty()) {
        Some(topic) => Some(topic.parse::<i32>().map_err(|_| {
            HeraldError::Integrity(format!("{FORUM_TOPIC_ID} is not a topic id: {topic:?}"))
        })?),
        None => None,
    };
    Ok(Some(ForumTarget { chat_id, topic_id }))
}

/// Stores the publish destination; both keys change in one job.
pub async fn set_forum_target(db: &Database, target: ForumTarget) -> Result<(), HeraldError> {
    db.submit(move |tx| {
        upsert(tx, FORUM_CHAT_ID, &target.chat_id.to_string())?;
        match target.topic_id {
            Some(topic) => upsert(tx, FORUM_TOPIC_ID, &topic.to_string())?,
            None => tx.execute("DELETE FROM config WHERE key = ?1", params![FORUM_TOPIC_ID])?,
        };
        Ok(())
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::OpenOptions;

    async fn db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_with(dir.path().join("config.db"), OpenOptions::default())
            .await
            .unwrap();
        (dir, db)
    }

    #[tokio::test]
    async fn set_overwrites_value() {
        let (_dir, db) = db().await;
        assert_eq!(get_config(&db, "greeting").await.unwrap(), None);
        set_config(&db, "greeting", "hi").await.unwrap();
        set_config(&db, "greeting", "hello").await.unwrap();
        assert_eq!(get_config(&db, "greeting").await.unwrap().as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn forum_target_roundtrip() {
        let (_dir, db) = db().await;
        assert_eq!(get_forum_target(&db).await.unwrap(), None);

        let with_topic = ForumTarget {
            chat_id: -1001234567890,
            topic_id: Some(12),
        };
        set_forum_target(&db, with_topic).await.unwrap();
        assert_eq!(get_forum_target(&db).await.unwrap(), Some(with_topic));

        let without_topic = ForumTarget {
            chat_id: -100999,
            topic_id: None,
        };
        set_forum_target(&db, without_topic).await.unwrap();
        assert_eq!(get_forum_target(&db).await.unwrap(), Some(without_topic));
    }

    #[tokio::test]
    async fn corrupt_forum_target_is_an_integrity_error() {
        let (_dir, db) = db().await;
        set_config(&db, FORUM_CHAT_ID, "not-a-number").await.unwrap();
        let err = get_forum_target(&db).await.unwrap_err();
        assert!(matches!(err, HeraldError::Integrity(_)));
    }
}
