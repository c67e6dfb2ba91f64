// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Published post operations.
//!
//! Formatting entities are stored as Bot API JSON in the `entities` column.

use herald_core::HeraldError;
use herald_core::types::Entity;
use rusqlite::{OptionalExtension, params};

use crate::database::Database;
use crate::models::{NewPost, Post, file_ref_from_column, file_ref_to_column};

const COLUMNS: &str = "id, post_type_id, chat_id, topic_id, message_id, text, entities, \
                       photo_file_id, created_at, updated_at";

/// A `posts` row with the entity JSON still undecoded.
struct PostRow {
    id: i64,
    post_type_id: Option<i64>,
    chat_id: i64,
    topic_id: Option<i32>,
    message_id: i32,
    text: String,
    entities: String,
    photo_file_id: String,
    created_at: String,
    updated_at: String,
}

impl PostRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            post_type_id: row.get(1)?,
            chat_id: row.get(2)?,
            topic_id: row.get(3)?,
            message_id: row.get(4)?,
            text: row.get(5)?,
            entities: row.get(6)?,
            photo_file_id: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    fn into_post(self) -> Result<Post, HeraldError> {
        Ok(Post {
            id: self.id,
            post_type_id: self.post_type_id,
            chat_id: self.chat_id,
            topic_id: self.topic_id,
            message_id: self.message_id,
            text: self.text,
            entities: decode_entities(&self.entities)?,
            photo_file_id: file_ref_from_column(self.photo_file_id),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

pub(crate) fn encode_entities(entities: &[Entity]) -> Result<String, HeraldError> {
    serde_json::to_string(entities).map_err(|e| HeraldError::Internal(e.to_string()))
}

pub(crate) fn decode_entities(json: &str) -> Result<Vec<Entity>, HeraldError> {
    if json.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(json)
        .map_err(|e| HeraldError::Integrity(format!("stored entities are not valid JSON: {e}")))
}

fn not_found(id: i64) -> HeraldError {
    HeraldError::not_found("post", id)
}

/// Record a published post. Returns its id.
pub async fn insert_post(db: &Database, post: &NewPost) -> Result<i64, HeraldError> {
    let entities = encode_entities(&post.entities)?;
    let post = post.clone();
    db.submit(move |tx| {
        tx.execute(
            "INSERT INTO posts (post_type_id, chat_id, topic_id, message_id, text, entities, photo_file_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                post.post_type_id,
                post.chat_id,
                post.topic_id,
                post.message_id,
                post.text,
                entities,
                file_ref_to_column(post.photo_file_id.as_deref()),
            ],
        )?;
        Ok(tx.last_insert_rowid())
    })
    .await
}

pub async fn get_post(db: &Database, id: i64) -> Result<Post, HeraldError> {
    db.read(move |conn| {
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM posts WHERE id = ?1"),
            params![id],
            PostRow::from_row,
        )
        .optional()
    })
    .await?
    .ok_or_else(|| not_found(id))?
    .into_post()
}

/// Look up the post published as `message_id` in `chat_id`.
pub async fn find_post_by_message(
    db: &Database,
    chat_id: i64,
    message_id: i32,
) -> Result<Option<Post>, HeraldError> {
    db.read(move |conn| {
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM posts WHERE chat_id = ?1 AND message_id = ?2"),
            params![chat_id, message_id],
            PostRow::from_row,
        )
        .optional()
    })
    .await?
    .map(PostRow::into_post)
    .transpose()
}

/// Replace a post's text and entities.
pub async fn update_post_text(
    db: &Database,
    id: i64,
    text: &str,
    entities: &[Entity],
) -> Result<(), HeraldError> {
    let entities = encode_entities(entities)?;
    let text = text.to_string();
    let changed = db
        .submit(move |tx| {
            tx.execute(
                "UPDATE posts SET text = ?1, entities = ?2,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?3",
                params![text, entities, id],
            )
        })
        .await?;
    if changed == 0 {
        return Err(not_found(id));
    }
    Ok(())
}

/// Delete a post and, through the foreign key, its replies.
pub async fn delete_post(db: &Database, id: i64) -> Result<(), HeraldError> {
    let changed = db
        .submit(move |tx| tx.execute("DELETE FROM posts WHERE id = ?1", params![id]))
        .await?;
    if changed == 0 {
        return Err(not_found(id));
    }
    Ok(())
}

/// The `limit` most recently created posts, newest first.
pub async fn list_recent_posts(db: &Database, limit: u32) -> Result<Vec<Post>, HeraldError> {
    let rows = db
        .read(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM posts ORDER BY created_at DESC, id DESC LIMIT ?1"
            ))?;
            let rows = stmt.query_map(params![limit], PostRow::from_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
        })
        .await?;
    rows.into_iter().map(PostRow::into_post).collect()
}
