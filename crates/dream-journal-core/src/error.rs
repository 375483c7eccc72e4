//! Error types returned by the schema, the backends, and the journal.

use std::fmt;

use thiserror::Error;

/// Failure reported by a [`KvBackend`](crate::backend::KvBackend).
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend could not be reached or the operation failed.
    #[error("backend I/O error: {0}")]
    Io(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The backend holds a value under `key` that is not valid JSON.
    #[error("value stored under '{key}' is not valid JSON: {reason}")]
    Malformed { key: String, reason: String },

    /// The value to be written could not be encoded.
    #[error("failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),
}

impl BackendError {
    pub fn io<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        BackendError::Io(err.into())
    }
}

/// One offending field of a rejected candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field name as it appears in the persisted JSON (camelCase).
    pub field: &'static str,
    pub reason: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// A candidate record failed validation. Carries every offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    /// Names of the offending fields, in the order they were checked.
    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.field).collect()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.field == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid dream record")?;
        for (i, field) in self.fields.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{}{}", sep, field)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Outcome of a failed [`DreamJournal`](crate::journal::DreamJournal) operation.
///
/// | Variant | Persisted state |
/// |---------|-----------------|
/// | `Validation` | untouched |
/// | `StoreRead` | untouched |
/// | `CorruptStore` | untouched; never repaired automatically |
/// | `StoreWrite` | unknown; treat the append as not committed |
#[derive(Debug, Error)]
pub enum JournalError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to read collection '{key}': {source}")]
    StoreRead {
        key: String,
        #[source]
        source: BackendError,
    },

    #[error("failed to write collection '{key}': {source}")]
    StoreWrite {
        key: String,
        #[source]
        source: BackendError,
    },

    #[error("collection '{key}' is corrupt: {reason}")]
    CorruptStore { key: String, reason: String },
}

impl JournalError {
    /// Whether retrying the whole operation could succeed without the
    /// caller changing its input or repairing storage.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            JournalError::StoreRead { .. } | JournalError::StoreWrite { .. }
        )
    }
}
