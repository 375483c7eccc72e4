//! # Dream Journal CLI (`dreams`)
//!
//! ## Usage
//!
//! ```bash
//! dreams --config ./config/dreams.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dreams init` | Create the SQLite database and key-value table |
//! | `dreams add` | Record a new dream |
//! | `dreams list` | Print every recorded dream |

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dream_journal::add::{self, DraftInput};
use dream_journal::{config, list, migrate};

/// Dream Journal CLI — record dreams into a local, append-only journal.
#[derive(Parser)]
#[command(name = "dreams", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/dreams.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Idempotent: running it multiple times is safe.
    Init,

    /// Record a new dream.
    ///
    /// Unset fields take the same defaults as a fresh journaling form.
    /// Enumerated values are validated, not coerced: an unknown value
    /// rejects the whole record and nothing is saved.
    Add {
        /// Start from a JSON draft (camelCase fields, all optional).
        #[arg(long)]
        from_json: Option<PathBuf>,

        /// What happened in the dream.
        #[arg(long)]
        text: Option<String>,

        /// Mark the dream as lucid.
        #[arg(long)]
        lucid: bool,

        /// When the dream happened (YYYY-MM-DD or RFC 3339). Defaults to now.
        #[arg(long)]
        date: Option<String>,

        /// ordinary, lucid, nightmare, or daydream.
        #[arg(long = "type")]
        dream_type: Option<String>,

        /// Emotional state before: very_negative, negative, neutral, positive, very_positive.
        #[arg(long)]
        before: Option<String>,

        /// Emotional state after (same scale as --before).
        #[arg(long)]
        after: Option<String>,

        /// A character who appeared (repeatable).
        #[arg(long = "character")]
        characters: Vec<String>,

        /// Where the dream took place.
        #[arg(long)]
        location: Option<String>,

        /// Emotional intensity from 1 to 10; out-of-range values are clamped.
        #[arg(long, allow_hyphen_values = true)]
        intensity: Option<i64>,

        /// very_clear, clear, moderate, fuzzy, or very_fuzzy.
        #[arg(long)]
        clarity: Option<String>,

        /// A keyword (repeatable).
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Sleep quality: excellent, good, fair, poor, or very_poor.
        #[arg(long)]
        sleep: Option<String>,

        /// What the dream means to you.
        #[arg(long)]
        meaning: Option<String>,

        /// Overall tone: positive, negative, or neutral.
        #[arg(long)]
        tone: Option<String>,
    },

    /// Print every recorded dream in the order it was added.
    List {
        /// Print the raw JSON array instead of a summary.
        #[arg(long)]
        json: bool,
    },
}

/// Log to stderr so stdout stays clean for command output. `RUST_LOG`
/// overrides the configured level.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;
    init_tracing(&cfg.log.level);

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Add {
            from_json,
            text,
            lucid,
            date,
            dream_type,
            before,
            after,
            characters,
            location,
            intensity,
            clarity,
            tags,
            sleep,
            meaning,
            tone,
        } => {
            let input = DraftInput {
                from_json,
                text,
                lucid,
                date,
                dream_type,
                before,
                after,
                characters,
                location,
                intensity,
                clarity,
                tags,
                sleep,
                meaning,
                tone,
            };
            add::run_add(&cfg, &input).await?;
        }
        Commands::List { json } => {
            list::run_list(&cfg, json).await?;
        }
    }

    Ok(())
}
