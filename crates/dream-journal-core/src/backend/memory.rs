//! In-memory [`KvBackend`] implementation for tests and embedding hosts.
//!
//! Values live in a `HashMap` behind `std::sync::RwLock`. Nothing survives
//! the process.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::BackendError;

use super::KvBackend;

/// In-memory key-value store.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    values: RwLock<HashMap<String, Value>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a backend pre-seeded with `value` under `key`.
    pub fn with_value(key: impl Into<String>, value: Value) -> Self {
        let backend = Self::new();
        if let Ok(mut values) = backend.values.write() {
            values.insert(key.into(), value);
        }
        backend
    }
}

fn poisoned<T>(_: PoisonError<T>) -> BackendError {
    BackendError::io("in-memory backend lock poisoned")
}

#[async_trait]
impl KvBackend for InMemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Value>, BackendError> {
        let values = self.values.read().map_err(poisoned)?;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &Value) -> Result<(), BackendError> {
        let mut values = self.values.write().map_err(poisoned)?;
        values.insert(key.to_string(), value.clone());
        Ok(())
    }
}
