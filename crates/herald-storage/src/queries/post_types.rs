// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post type CRUD operations.

use herald_core::HeraldError;
use rusqlite::{OptionalExtension, params};

use crate::database::Database;
use crate::models::{NewPostType, PostType, file_ref_from_column, file_ref_to_column};

const COLUMNS: &str = "id, name, emoji, photo_file_id, template, created_at";

fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PostType> {
    Ok(PostType {
        id: row.get(0)?,
        name: row.get(1)?,
        emoji: row.get(2)?,
        photo_file_id: file_ref_from_column(row.get(3)?),
        template: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn not_found(id: i64) -> HeraldError {
    HeraldError::not_found("post type", id)
}

/// Create a post type. Returns its id.
pub async fn create_post_type(db: &Database, new: &NewPostType) -> Result<i64, HeraldError> {
    let new = new.clone();
    db.submit(move |tx| {
        tx.execute(
            "INSERT INTO post_types (name, emoji, photo_file_id, template) VALUES (?1, ?2, ?3, ?4)",
            params![
                new.name,
                new.emoji,
                file_ref_to_column(new.photo_file_id.as_deref()),
                new.template,
            ],
        )?;
        Ok(tx.last_insert_rowid())
    })
    .await
}

pub async fn get_post_type(db: &Database, id: i64) -> Result<PostType, HeraldError> {
    db.read(move |conn| {
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM post_types WHERE id = ?1"),
            params![id],
            from_row,
        )
        .optional()
    })
    .await?
    .ok_or_else(|| not_found(id))
}

/// Case-insensitive lookup by name.
pub async fn find_post_type_by_name(
    db: &Database,
    name: &str,
) -> Result<Option<PostType>, HeraldError> {
    let name = name.to_string();
    db.read(move |conn| {
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM post_types WHERE name = ?1 COLLATE NOCASE"),
            params![name],
            from_row,
        )
        .optional()
    })
    .await
}

/// All post types ordered by name.
pub async fn list_post_types(db: &Database) -> Result<Vec<PostType>, HeraldError> {
    db.read(|conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM post_types ORDER BY name COLLATE NOCASE ASC, id ASC"
        ))?;
        let rows = stmt.query_map([], from_row)?;
        rows.collect()
    })
    .await
}

async fn update_one(
    db: &Database,
    id: i64,
    sql: &'static str,
    value: String,
) -> Result<(), HeraldError> {
    let changed = db
        .submit(move |tx| tx.execute(sql, params![value, id]))
        .await?;
    if changed == 0 {
        return Err(not_found(id));
    }
    Ok(())
}

pub async fn rename_post_type(
    db: &Database,
    id: i64,
    name: &str,
    emoji: &str,
) -> Result<(), HeraldError> {
    let name = name.to_string();
    let emoji = emoji.to_string();
    let changed = db
        .submit(move |tx| {
            tx.execute(
                "UPDATE post_types SET name = ?1, emoji = ?2 WHERE id = ?3",
                params![name, emoji, id],
            )
        })
        .await?;
    if changed == 0 {
        return Err(not_found(id));
    }
    Ok(())
}

/// Set or, with `None`, remove the type's image.
pub async fn set_post_type_photo(
    db: &Database,
    id: i64,
    photo_file_id: Option<&str>,
) -> Result<(), HeraldError> {
    update_one(
        db,
        id,
        "UPDATE post_types SET photo_file_id = ?1 WHERE id = ?2",
        file_ref_to_column(photo_file_id).to_string(),
    )
    .await
}

pub async fn set_post_type_template(
    db: &Database,
    id: i64,
    template: &str,
) -> Result<(), HeraldError> {
    update_one(
        db,
        id,
        "UPDATE post_types SET template = ?1 WHERE id = ?2",
        template.to_string(),
    )
    .await
}

/// Delete a post type. Posts of that type keep existing without a type.
pub async fn delete_post_type(db: &Database, id: i64) -> Result<(), HeraldError> {
    let changed = db
        .submit(move |tx| tx.execute("DELETE FROM post_types WHERE id = ?1", params![id]))
        .await?;
    if changed == 0 {
        return Err(not_found(id));
    }
    Ok(())
}
