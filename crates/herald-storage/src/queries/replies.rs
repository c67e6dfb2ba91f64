// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Replies to published posts.

use herald_core::HeraldError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{NewReply, Reply};

/// Record a reply. Returns its id.
pub async fn record_reply(db: &Database, reply: &NewReply) -> Result<i64, HeraldError> {
    let reply = reply.clone();
    db.submit(move |tx| {
        tx.execute(
            "INSERT INTO replies (post_id, chat_id, message_id, author_id, text)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                reply.post_id,
                reply.chat_id,
                reply.message_id,
                reply.author_id,
                reply.text,
            ],
        )?;
        Ok(tx.last_insert_rowid())
    })
    .await
}

/// Replies to `post_id` in the order they were recorded.
pub async fn list_replies(db: &Database, post_id: i64) -> Result<Vec<Reply>, HeraldError> {
    db.read(move |conn| {
        let mut stmt = conn.prepare(
            "SELECT id, post_id, chat_id, message_id, author_id, text, created_at
             FROM replies WHERE post_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![post_id], |row| {
            Ok(Reply {
                id: row.get(0)?,
                post_id: row.get(1)?,
                chat_id: row.get(2)?,
                message_id: row.get(3)?,
                author_id: row.get(4)?,
                text: row.get(5)?,
                created_at: row.get(6)?,
            })
        })?;
        rows.collect()
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::OpenOptions;
    use crate::models::NewPost;
    use crate::queries::posts;

    #[tokio::test]
    async fn replies_follow_their_post() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_with(dir.path().join("replies.db"), OpenOptions::default())
            .await
            .unwrap();
        let post_id = posts::insert_post(
            &db,
            &NewPost {
                post_type_id: None,
                chat_id: -100,
                topic_id: None,
                message_id: 10,
                text: "Hello".into(),
                entities: Vec::new(),
                photo_file_id: None,
            },
        )
        .await
        .unwrap();

        for (message_id, text) in [(11, "first"), (12, "second")] {
            record_reply(
                &db,
                &NewReply {
                    post_id,
                    chat_id: -100,
                    message_id,
                    author_id: 555,
                    text: text.into(),
                },
            )
            .await
            .unwrap();
        }

        let replies = list_replies(&db, post_id).await.unwrap();
        let texts: Vec<_> = replies.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);

        posts::delete_post(&db, post_id).await.unwrap();
        assert!(list_replies(&db, post_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reply_to_unknown_post_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_with(dir.path().join("replies.db"), OpenOptions::default())
            .await
            .unwrap();
        let err = record_reply(
            &db,
            &NewReply {
                post_id: 404,
                chat_id: -100,
                message_id: 1,
                author_id: 1,
                text: "orphan".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, HeraldError::Storage { .. }));
    }
}
