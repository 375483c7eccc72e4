//! TOML configuration for the `dreams` binary.
//!
//! ```toml
//! [db]
//! path = "./data/dreams.sqlite"
//!
//! [journal]
//! key = "dreamsArray"
//!
//! [log]
//! level = "warn"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use dream_journal_core::journal::DEFAULT_COLLECTION_KEY;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub journal: JournalConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JournalConfig {
    /// Storage key the whole collection lives under.
    #[serde(default = "default_key")]
    pub key: String,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self { key: default_key() }
    }
}

fn default_key() -> String {
    DEFAULT_COLLECTION_KEY.to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "warn".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config(&content)
}

fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if config.db.path.as_os_str().is_empty() {
        anyhow::bail!("db.path must not be empty");
    }

    if config.journal.key.trim().is_empty() {
        anyhow::bail!("journal.key must not be empty");
    }

    Ok(config)
}
