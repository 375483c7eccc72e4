//! # Dream Journal
//!
//! A local-first, append-only dream journal.
//!
//! The record schema and the collection store live in
//! [`dream_journal_core`]; this crate supplies the durable SQLite backend,
//! configuration, and the `dreams` command-line front end.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌───────────────┐   ┌──────────┐
//! │   CLI    │──▶│ DreamJournal │──▶│ SqliteBackend │──▶│  SQLite  │
//! │ (dreams) │   │ norm+valid   │   │  get / set    │   │ kv_store │
//! └──────────┘   └──────────────┘   └───────────────┘   └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! dreams init
//! dreams add --text "flying over the sea" --type lucid --tag sky --intensity 7
//! dreams list
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection and journal wiring |
//! | [`migrate`] | Schema creation |
//! | [`sqlite_backend`] | SQLite key-value backend |
//! | [`add`] | `dreams add` |
//! | [`list`] | `dreams list` |

pub mod add;
pub mod config;
pub mod db;
pub mod list;
pub mod migrate;
pub mod sqlite_backend;
