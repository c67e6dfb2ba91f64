// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `herald export` and `herald import` command implementations.

use std::io::Write as _;
use std::path::Path;

use herald_config::HeraldConfig;
use herald_core::HeraldError;
use herald_storage::{Database, export_dump, import_dump};
use tracing::info;

fn io_error(e: std::io::Error) -> HeraldError {
    HeraldError::Storage {
        source: Box::new(e),
    }
}

/// Writes the dump to `output`, or to stdout when no path is given.
pub async fn run_export(config: &HeraldConfig, output: Option<&Path>) -> Result<(), HeraldError> {
    let db = Database::open(&config.storage).await?;
    let dump = export_dump(&db).await;
    db.close().await?;
    let dump = dump?;

    match output {
        Some(path) => {
            std::fs::write(path, &dump).map_err(io_error)?;
            eprintln!(
                "Export complete: {} bytes written to {}",
                dump.len(),
                path.display()
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(dump.as_bytes()).map_err(io_error)?;
            stdout.flush().map_err(io_error)?;
        }
    }
    Ok(())
}

/// Loads a dump into the configured database, which must hold no data yet.
pub async fn run_import(config: &HeraldConfig, file: &Path) -> Result<(), HeraldError> {
    let dump = read_dump(file)?;
    let db = Database::open(&config.storage).await?;
    let result = import_dump(&db, &dump).await;
    db.close().await?;
    result?;

    info!(file = %file.display(), "dump imported");
    eprintln!(
        "Import complete: {} loaded into {}",
        file.display(),
        db.path().display()
    );
    Ok(())
}

fn read_dump(file: &Path) -> Result<String, HeraldError> {
    if !file.exists() {
        return Err(HeraldError::Storage {
            source: Box::new(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("dump not found: {}", file.display()),
            )),
        });
    }
    std::fs::read_to_string(file).map_err(io_error)
}

#[cfg(test)]
mod tests {
    use herald_config::model::StorageConfig;

    use super::*;

    fn config_at(path: &Path) -> HeraldConfig {
        HeraldConfig {
            storage: StorageConfig {
                database_path: path.to_string_lossy().into_owned(),
                ..StorageConfig::default()
            },
            ..HeraldConfig::default()
        }
    }

    #[tokio::test]
    async fn export_then_import_into_fresh_database() {
        let dir = tempfile::tempdir().unwrap();
        let source = config_at(&dir.path().join("source.db"));
        let target = config_at(&dir.path().join("target.db"));
        let dump_path = dir.path().join("dump.sql");

        crate::admin::run_add(&source, 42).await.unwrap();
        run_export(&source, Some(&dump_path)).await.unwrap();
        run_import(&target, &dump_path).await.unwrap();

        let db = Database::open(&target.storage).await.unwrap();
        let admins = herald_storage::queries::admins::list_admins(&db).await.unwrap();
        assert_eq!(admins, vec![herald_core::AdminId(42)]);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn import_refuses_populated_database() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_at(&dir.path().join("herald.db"));
        let dump_path = dir.path().join("dump.sql");

        crate::admin::run_add(&config, 42).await.unwrap();
        run_export(&config, Some(&dump_path)).await.unwrap();

        let err = run_import(&config, &dump_path).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn missing_dump_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_dump(&dir.path().join("nope.sql")).unwrap_err();
        assert!(err.to_string().contains("dump not found"));
    }
}
