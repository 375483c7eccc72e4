//! SQLite-backed [`KvBackend`] implementation.
//!
//! Each key is one row of `kv_store`; the value is the JSON text of the
//! whole entry. A write is a single upsert statement, so a failed `set`
//! leaves the previous value in place.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::debug;

use dream_journal_core::backend::KvBackend;
use dream_journal_core::error::BackendError;

/// SQLite implementation of the [`KvBackend`] trait.
pub struct SqliteBackend {
    pool: SqlitePool,
}

impl SqliteBackend {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KvBackend for SqliteBackend {
    async fn get(&self, key: &str) -> Result<Option<Value>, BackendError> {
        let raw: Option<String> = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(BackendError::io)?;

        let Some(raw) = raw else {
            debug!(key, "kv_store miss");
            return Ok(None);
        };
        debug!(key, bytes = raw.len(), "kv_store hit");

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| BackendError::Malformed {
                key: key.to_string(),
                reason: e.to_string(),
            })
    }

    async fn set(&self, key: &str, value: &Value) -> Result<(), BackendError> {
        let text = serde_json::to_string(value)?;
        let now = chrono::Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(&text)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(BackendError::io)?;

        debug!(key, bytes = text.len(), "kv_store write");
        Ok(())
    }
}
