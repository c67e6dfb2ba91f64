// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded schema migrations using refinery.
//!
//! SQL files under `migrations/` are compiled into the binary. Each version is
//! applied once and recorded in `refinery_schema_history`; re-running is a
//! no-op and any unexpected failure aborts the open.

use herald_core::HeraldError;
use tracing::info;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Apply all pending migrations. Returns the number newly applied.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<usize, HeraldError> {
    let report = embedded::migrations::runner()
        .run(conn)
        .map_err(|e| HeraldError::Storage {
            source: Box::new(e),
        })?;

    let applied = report.applied_migrations();
    for migration in applied {
        info!(
            version = migration.version(),
            name = migration.name(),
            "applied migration"
        );
    }
    Ok(applied.len())
}

/// Highest applied schema version, or 0 on an unmigrated database.
pub fn schema_version(conn: &rusqlite::Connection) -> rusqlite::Result<i64> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM sqlite_master
                        WHERE type = 'table' AND name = 'refinery_schema_history')",
        [],
        |row| row.get(0),
    )?;
    if !exists {
        return Ok(0);
    }
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM refinery_schema_history",
        [],
        |row| row.get(0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(conn: &rusqlite::Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare(&format!("SELECT name FROM pragma_table_info('{table}')"))
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn migrations_create_every_table() {
        let mut conn = rusqlite::Connection::open_in_memory().unwrap();
        assert_eq!(schema_version(&conn).unwrap(), 0);

        let applied = run_migrations(&mut conn).unwrap();
        assert_eq!(applied, 2);
        assert_eq!(schema_version(&conn).unwrap(), 2);

        for table in [
            "admins",
            "config",
            "post_types",
            "posts",
            "replies",
            "conversation_state",
        ] {
            assert!(!columns(&conn, table).is_empty(), "{table} missing");
        }
        let state_columns = columns(&conn, "conversation_state");
        assert!(state_columns.contains(&"temp_template".to_string()));
        assert!(state_columns.contains(&"reply_target_message_id".to_string()));
    }

    #[test]
    fn rerunning_is_a_noop() {
        let mut conn = rusqlite::Connection::open_in_memory().unwrap();
        run_migrations(&mut conn).unwrap();
        assert_eq!(run_migrations(&mut conn).unwrap(), 0);
        assert_eq!(schema_version(&conn).unwrap(), 2);
    }

    #[test]
    fn unexpected_schema_conflict_fails_loudly() {
        let mut conn = rusqlite::Connection::open_in_memory().unwrap();
        // A pre-existing, incompatible table makes V2's ALTER TABLE fail.
        conn.execute_batch("CREATE TABLE conversation_state (admin_id INTEGER PRIMARY KEY, temp_name TEXT);")
            .unwrap();
        let err = run_migrations(&mut conn).unwrap_err();
        assert!(matches!(err, HeraldError::Storage { .. }));
    }
}
