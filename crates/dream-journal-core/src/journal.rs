//! The append-only dream collection.
//!
//! A [`DreamJournal`] owns one collection, identified by a fixed key in a
//! [`KvBackend`]. Construct one per key per process and hand it to callers;
//! its append lock only serializes appends that go through the same
//! instance.
//!
//! # Append cycle
//!
//! ```text
//! Idle → Normalizing → Validating → Reading → Writing → Committed
//!                          │           │          │
//!                          ▼           ▼          ▼
//!                     Validation   StoreRead   StoreWrite
//!                                  CorruptStore
//! ```
//!
//! Every failure is terminal for that attempt and is returned as a
//! [`JournalError`]. The caller may retry from `Idle`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::backend::KvBackend;
use crate::error::{BackendError, JournalError};
use crate::models::{DreamDraft, DreamRecord};
use crate::schema;

/// Storage key used by existing installs.
pub const DEFAULT_COLLECTION_KEY: &str = "dreamsArray";

/// Source of the timestamps stamped on accepted records.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Append-only collection of [`DreamRecord`]s stored under one key.
pub struct DreamJournal {
    backend: Arc<dyn KvBackend>,
    key: String,
    clock: Arc<dyn Clock>,
    append_lock: Mutex<()>,
}

impl DreamJournal {
    pub fn new(backend: Arc<dyn KvBackend>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
            clock: Arc::new(SystemClock),
            append_lock: Mutex::new(()),
        }
    }

    /// Replace the clock used to stamp `createdAt` and default `dreamDate`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the whole collection.
    ///
    /// An absent key is an empty collection. A value that is not an array of
    /// records is reported as [`JournalError::CorruptStore`] and left as is.
    pub async fn load_all(&self) -> Result<Vec<DreamRecord>, JournalError> {
        let (_, dreams) = self.read_collection().await?;
        Ok(dreams)
    }

    /// Read the stored array, returning each element as stored alongside its
    /// decoded record. Appends write the stored elements back unchanged.
    async fn read_collection(&self) -> Result<(Vec<Value>, Vec<DreamRecord>), JournalError> {
        let value = match self.backend.get(&self.key).await {
            Ok(value) => value,
            Err(BackendError::Malformed { reason, .. }) => {
                warn!(key = %self.key, %reason, "stored collection is not valid JSON");
                return Err(JournalError::CorruptStore {
                    key: self.key.clone(),
                    reason,
                });
            }
            Err(source) => {
                warn!(key = %self.key, error = %source, "failed to read collection");
                return Err(JournalError::StoreRead {
                    key: self.key.clone(),
                    source,
                });
            }
        };

        let Some(value) = value else {
            debug!(key = %self.key, "collection absent, starting empty");
            return Ok((Vec::new(), Vec::new()));
        };

        let dreams = Vec::<DreamRecord>::deserialize(&value).map_err(|e| {
            warn!(key = %self.key, error = %e, "stored collection does not match the record shape");
            self.corrupt(e.to_string())
        })?;
        let Value::Array(raw) = value else {
            return Err(self.corrupt("collection is not an array".to_string()));
        };
        debug!(key = %self.key, count = dreams.len(), "loaded collection");
        Ok((raw, dreams))
    }

    fn corrupt(&self, reason: String) -> JournalError {
        JournalError::CorruptStore {
            key: self.key.clone(),
            reason,
        }
    }

    /// Normalize, validate, and append one record, then persist the whole
    /// collection.
    ///
    /// Existing elements are written back exactly as they were read; only
    /// the new record is added. Returns the committed record, including its
    /// stamped `createdAt`. Appends through the same journal never
    /// interleave.
    pub async fn append(&self, candidate: &DreamDraft) -> Result<DreamRecord, JournalError> {
        let _guard = self.append_lock.lock().await;

        let normalized = schema::normalize(candidate, self.clock.now());
        let record = schema::validate(&normalized).map_err(|e| {
            warn!(key = %self.key, fields = ?e.field_names(), "rejected dream record");
            JournalError::from(e)
        })?;

        let (mut raw, _) = self.read_collection().await?;
        let encoded = serde_json::to_value(&record).map_err(|e| JournalError::StoreWrite {
            key: self.key.clone(),
            source: BackendError::Encode(e),
        })?;
        raw.push(encoded);
        let count = raw.len();

        let value = Value::Array(raw);
        if let Err(source) = self.backend.set(&self.key, &value).await {
            warn!(key = %self.key, error = %source, "failed to persist collection; append not committed");
            return Err(JournalError::StoreWrite {
                key: self.key.clone(),
                source,
            });
        }

        info!(
            key = %self.key,
            created_at = %record.created_at,
            count,
            "dream committed"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::InMemoryBackend;
    use serde_json::json;

    #[tokio::test]
    async fn test_empty_store_loads_empty() {
        let journal = DreamJournal::new(Arc::new(InMemoryBackend::new()), DEFAULT_COLLECTION_KEY);
        assert!(journal.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_array_is_corrupt() {
        let backend = InMemoryBackend::with_value("dreams", json!({"dreamText": "x"}));
        let journal = DreamJournal::new(Arc::new(backend), "dreams");
        let err = journal.load_all().await.unwrap_err();
        assert!(matches!(err, JournalError::CorruptStore { .. }));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_append_uses_own_key() {
        let backend = Arc::new(InMemoryBackend::new());
        let journal = DreamJournal::new(backend.clone(), "mine");
        let draft = DreamDraft {
            dream_text: "a door in the sea".to_string(),
            ..DreamDraft::default()
        };
        journal.append(&draft).await.unwrap();
        assert!(backend.get("mine").await.unwrap().is_some());
        assert!(backend.get(DEFAULT_COLLECTION_KEY).await.unwrap().is_none());
    }
}
