//! Key-value backend abstraction.
//!
//! The [`KvBackend`] trait is the only durability primitive the journal
//! relies on: read a JSON value by key, or replace it. There is no atomic
//! read-modify-write, which is why [`DreamJournal`](crate::journal::DreamJournal)
//! serializes its own appends.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::BackendError;

/// Durable key-value storage holding JSON values.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`get`](KvBackend::get) | Read the value under a key, `None` if absent |
/// | [`set`](KvBackend::set) | Replace the value under a key |
///
/// `set` must be all-or-nothing: after a failed `set`, `get` returns the
/// previous value.
#[async_trait]
pub trait KvBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, BackendError>;

    async fn set(&self, key: &str, value: &Value) -> Result<(), BackendError>;
}
