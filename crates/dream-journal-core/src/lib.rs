//! # Dream Journal Core
//!
//! Shared logic for Dream Journal: the dream record schema, the key-value
//! backend abstraction, and the append-only collection store.
//!
//! This crate contains no filesystem, sqlx, or other native-only
//! dependencies. Durable backends live in the application crate and plug in
//! through [`backend::KvBackend`].
//!
//! ## Flow
//!
//! ```text
//! DreamDraft ──▶ normalize ──▶ validate ──▶ load_all ──▶ push ──▶ set
//!  (caller)       (schema)     (schema)    (backend)            (backend)
//! ```

pub mod backend;
pub mod error;
pub mod journal;
pub mod models;
pub mod schema;
