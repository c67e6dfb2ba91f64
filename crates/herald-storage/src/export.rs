// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text dump export and import.
//!
//! The dump is plain SQL: a header, `BEGIN;`, one `INSERT` per row in
//! foreign-key order, and `COMMIT;`. Export reads inside one transaction on a
//! read connection, so under WAL it sees a single committed snapshot and never
//! blocks or observes a half-applied write job.

use std::fmt::Write as _;

use herald_core::HeraldError;
use rusqlite::types::ValueRef;
use tracing::info;

use crate::database::Database;
use crate::migrations;

/// Data tables in dependency order.
pub const TABLES: &[&str] = &[
    "admins",
    "config",
    "post_types",
    "posts",
    "replies",
    "conversation_state",
];

const HEADER: &str = "-- herald dump";

/// Produce a replayable SQL snapshot of every data table.
pub async fn export_dump(db: &Database) -> Result<String, HeraldError> {
    let (dump, rows) = db
        .read(|conn| {
            let tx = conn.unchecked_transaction()?;
            let version = migrations::schema_version(&tx)?;

            let mut out = String::new();
            let mut rows = 0usize;
            let _ = writeln!(out, "{HEADER} (schema v{version})");
            let _ = writeln!(
                out,
                "-- exported at {}",
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
            );
            out.push_str("BEGIN;\n");
            for table in TABLES {
                rows += dump_table(&tx, table, &mut out)?;
            }
            out.push_str("COMMIT;\n");
            tx.finish()?;
            Ok((out, rows))
        })
        .await?;

    info!(rows, bytes = dump.len(), "exported database dump");
    Ok(dump)
}

fn dump_table(conn: &rusqlite::Connection, table: &str, out: &mut String) -> rusqlite::Result<usize> {
    let mut stmt = conn.prepare(&format!("SELECT * FROM {table} ORDER BY rowid"))?;
    let columns = stmt.column_names().join(", ");
    let width = stmt.column_count();

    let mut rows = stmt.query([])?;
    let mut count = 0;
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(width);
        for i in 0..width {
            values.push(sql_literal(row.get_ref(i)?));
        }
        let _ = writeln!(
            out,
            "INSERT INTO {table} ({columns}) VALUES ({});",
            values.join(", ")
        );
        count += 1;
    }
    Ok(count)
}

/// Render a column value as an SQL literal.
fn sql_literal(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => format!("{f:?}"),
        ValueRef::Text(bytes) => quote(&String::from_utf8_lossy(bytes)),
        ValueRef::Blob(bytes) => {
            let mut hex = String::with_capacity(bytes.len() * 2 + 3);
            hex.push_str("X'");
            for b in bytes {
                let _ = write!(hex, "{b:02x}");
            }
            hex.push('\'');
            hex
        }
    }
}

fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Replay a dump produced by [`export_dump`] into an empty database.
///
/// The whole replay is one write job: it either applies completely or not at
/// all. Returns a validation error if any data table already has rows.
pub async fn import_dump(db: &Database, dump: &str) -> Result<(), HeraldError> {
    let body = dump_body(dump)?.to_string();

    let imported = db
        .submit(move |tx| {
            for table in TABLES {
                let has_rows: bool = tx.query_row(
                    &format!("SELECT EXISTS (SELECT 1 FROM {table})"),
                    [],
                    |row| row.get(0),
                )?;
                if has_rows {
                    return Ok(false);
                }
            }
            tx.execute_batch(&body)?;
            Ok(true)
        })
        .await?;

    if !imported {
        return Err(HeraldError::Validation(
            "refusing to import into a database that already has data".into(),
        ));
    }
    info!(bytes = dump.len(), "imported database dump");
    Ok(())
}

/// The statements between the dump's `BEGIN;` and `COMMIT;` lines.
fn dump_body(dump: &str) -> Result<&str, HeraldError> {
    let invalid = |why: &str| HeraldError::Validation(format!("not a herald dump: {why}"));

    if !dump.starts_with(HEADER) {
        return Err(invalid("missing header"));
    }
    let start = dump
        .find("\nBEGIN;\n")
        .map(|i| i + "\nBEGIN;\n".len())
        .ok_or_else(|| invalid("missing BEGIN"))?;
    let end = dump
        .rfind("\nCOMMIT;")
        .filter(|end| *end + 1 >= start)
        .ok_or_else(|| invalid("missing COMMIT"))?;
    Ok(&dump[start..end + 1])
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use herald_core::{AdminId, ConversationState, Entity, ForumTarget, StateStore, Step};

    use super::*;
    use crate::conversation::SqliteStateStore;
    use crate::database::OpenOptions;
    use crate::models::{NewPost, NewPostType, NewReply};
    use crate::queries::{admins, config, post_types, posts, replies};

    async fn open(dir: &tempfile::TempDir, name: &str) -> Arc<Database> {
        Arc::new(
            Database::open_with(dir.path().join(name), OpenOptions::default())
                .await
                .unwrap(),
        )
    }

    async fn seed(db: &Arc<Database>) {
        admins::add_admin(db, AdminId(42)).await.unwrap();
        config::set_forum_target(
            db,
            ForumTarget {
                chat_id: -1001,
                topic_id: Some(3),
            },
        )
        .await
        .unwrap();
        let type_id = post_types::create_post_type(
            db,
            &NewPostType {
                name: "It's news".into(),
                emoji: "📰".into(),
                photo_file_id: Some("AgADtype".into()),
                template: "Line one\n{text}".into(),
            },
        )
        .await
        .unwrap();
        let post_id = posts::insert_post(
            db,
            &NewPost {
                post_type_id: Some(type_id),
                chat_id: -1001,
                topic_id: Some(3),
                message_id: 10,
                text: "Hello 'world'".into(),
                entities: vec![Entity::new("bold", 0, 5)],
                photo_file_id: None,
            },
        )
        .await
        .unwrap();
        replies::record_reply(
            db,
            &NewReply {
                post_id,
                chat_id: -1001,
                message_id: 11,
                author_id: 5,
                text: "nice".into(),
            },
        )
        .await
        .unwrap();
        let mut state = ConversationState::fresh(AdminId(42), Step::NewPostEnterText);
        state.selected_type_id = Some(type_id);
        SqliteStateStore::new(Arc::clone(db)).save(&state).await.unwrap();
    }

    #[tokio::test]
    async fn export_then_import_reproduces_the_data() {
        let dir = tempfile::tempdir().unwrap();
        let source = open(&dir, "source.db").await;
        seed(&source).await;

        let dump = export_dump(&source).await.unwrap();
        assert!(dump.starts_with("-- herald dump (schema v2)"));
        assert!(dump.contains("'Hello ''world'''"));
        assert!(dump.trim_end().ends_with("COMMIT;"));

        let target = open(&dir, "target.db").await;
        import_dump(&target, &dump).await.unwrap();

        // A second export of the copy differs only in the timestamp line.
        let again = export_dump(&target).await.unwrap();
        let strip = |d: &str| {
            d.lines()
                .filter(|l| !l.starts_with("-- exported at"))
                .collect::<Vec<_>>()
                .join("\n")
        };
        assert_eq!(strip(&dump), strip(&again));

        let state = SqliteStateStore::new(Arc::clone(&target))
            .get(AdminId(42))
            .await
            .unwrap();
        assert_eq!(state.step, Some(Step::NewPostEnterText));
        let post_type = post_types::find_post_type_by_name(&target, "It's news")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(post_type.template, "Line one\n{text}");
    }

    #[tokio::test]
    async fn import_refuses_non_empty_database() {
        let dir = tempfile::tempdir().unwrap();
        let db = open(&dir, "full.db").await;
        seed(&db).await;
        let dump = export_dump(&db).await.unwrap();

        let err = import_dump(&db, &dump).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(admins::list_admins(&db).await.unwrap(), vec![AdminId(42)]);
    }

    #[tokio::test]
    async fn broken_dump_applies_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let db = open(&dir, "empty.db").await;
        let dump = "-- herald dump (schema v2)\nBEGIN;\n\
                    INSERT INTO admins (admin_id, added_at) VALUES (1, 'x');\n\
                    INSERT INTO no_such_table VALUES (1);\n\
                    COMMIT;\n";

        assert!(matches!(
            import_dump(&db, dump).await,
            Err(HeraldError::Storage { .. })
        ));
        assert!(admins::list_admins(&db).await.unwrap().is_empty());
    }

    #[test]
    fn rejects_text_that_is_not_a_dump() {
        assert!(dump_body("DROP TABLE admins;").is_err());
        assert!(dump_body("-- herald dump\nBEGIN;\nINSERT 1;\n").is_err());
        assert_eq!(
            dump_body("-- herald dump\nBEGIN;\nINSERT 1;\nCOMMIT;\n").unwrap(),
            "INSERT 1;\n"
        );
        assert_eq!(dump_body("-- herald dump\nBEGIN;\nCOMMIT;\n").unwrap(), "");
    }

    #[test]
    fn literals_are_escaped() {
        assert_eq!(sql_literal(ValueRef::Null), "NULL");
        assert_eq!(sql_literal(ValueRef::Integer(-5)), "-5");
        assert_eq!(sql_literal(ValueRef::Text(b"it's")), "'it''s'");
        assert_eq!(sql_literal(ValueRef::Blob(&[0xde, 0xad])), "X'dead'");
    }
}
