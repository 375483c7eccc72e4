use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;

use dream_journal_core::journal::DreamJournal;

use crate::config::Config;
use crate::migrate;
use crate::sqlite_backend::SqliteBackend;

pub async fn connect(config: &Config) -> Result<SqlitePool> {
    let db_path = &config.db.path;

    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Open the configured database and wrap it in a journal for the
/// configured collection key. The schema is created if missing.
pub async fn open_journal(config: &Config) -> Result<(DreamJournal, SqlitePool)> {
    let pool = connect(config).await?;
    migrate::apply(&pool).await?;
    let backend = SqliteBackend::new(pool.clone());
    Ok((DreamJournal::new(Arc::new(backend), &config.journal.key), pool))
}
