//! The `dreams add` command.
//!
//! Builds a [`DreamDraft`] the way the journaling form does (defaults, then
//! the user's input, chip-style tags and characters) and appends it.

use anyhow::{Context, Result};
use std::path::PathBuf;

use dream_journal_core::error::JournalError;
use dream_journal_core::models::DreamDraft;

use crate::config::Config;
use crate::db;
use crate::list::print_record;

/// User input for one new dream. `None` keeps the draft's value.
#[derive(Debug, Default, Clone)]
pub struct DraftInput {
    pub from_json: Option<PathBuf>,
    pub text: Option<String>,
    pub lucid: bool,
    pub date: Option<String>,
    pub dream_type: Option<String>,
    pub before: Option<String>,
    pub after: Option<String>,
    pub characters: Vec<String>,
    pub location: Option<String>,
    pub intensity: Option<i64>,
    pub clarity: Option<String>,
    pub tags: Vec<String>,
    pub sleep: Option<String>,
    pub meaning: Option<String>,
    pub tone: Option<String>,
}

/// Build the draft: a JSON file (if given) or the form defaults, with
/// explicit flags layered on top.
pub fn build_draft(input: &DraftInput) -> Result<DreamDraft> {
    let mut draft = match &input.from_json {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read draft file: {}", path.display()))?;
            serde_json::from_str::<DreamDraft>(&content)
                .with_context(|| format!("Failed to parse draft file: {}", path.display()))?
        }
        None => DreamDraft::default(),
    };

    if let Some(text) = &input.text {
        draft.dream_text = text.clone();
    }
    if input.lucid {
        draft.is_lucid_dream = true;
    }
    if let Some(date) = &input.date {
        draft.dream_date = Some(date_arg_to_timestamp(date));
    }
    if let Some(v) = &input.dream_type {
        draft.dream_type = v.clone();
    }
    if let Some(v) = &input.before {
        draft.emotional_state_before = v.clone();
    }
    if let Some(v) = &input.after {
        draft.emotional_state_after = v.clone();
    }
    for character in &input.characters {
        draft.add_character(character);
    }
    if let Some(v) = &input.location {
        draft.location = v.clone();
    }
    if let Some(v) = input.intensity {
        draft.emotional_intensity = serde_json::Value::from(v);
    }
    if let Some(v) = &input.clarity {
        draft.clarity = v.clone();
    }
    for tag in &input.tags {
        draft.add_tag(tag);
    }
    if let Some(v) = &input.sleep {
        draft.sleep_quality = v.clone();
    }
    if let Some(v) = &input.meaning {
        draft.personal_meaning = v.clone();
    }
    if let Some(v) = &input.tone {
        draft.dream_tone = v.clone();
    }

    Ok(draft)
}

/// Expand a bare `YYYY-MM-DD` to midnight UTC. Anything else is passed
/// through for validation to judge.
fn date_arg_to_timestamp(date: &str) -> String {
    match chrono::NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") {
        Ok(d) => format!("{}T00:00:00.000Z", d.format("%Y-%m-%d")),
        Err(_) => date.to_string(),
    }
}

/// CLI entry point: append the dream and print the committed record.
pub async fn run_add(config: &Config, input: &DraftInput) -> Result<()> {
    let draft = build_draft(input)?;
    let (journal, pool) = db::open_journal(config).await?;

    let outcome = journal.append(&draft).await;
    pool.close().await;

    match outcome {
        Ok(record) => {
            println!("Dream recorded.");
            println!();
            print_record(&record);
            Ok(())
        }
        Err(JournalError::Validation(v)) => {
            eprintln!("Error: dream not saved, some fields are invalid:");
            for field in &v.fields {
                eprintln!("  - {}", field);
            }
            std::process::exit(1);
        }
        Err(e @ JournalError::StoreWrite { .. }) => {
            eprintln!("Error: {}", e);
            eprintln!("The dream may not have been saved. Check `dreams list` before retrying.");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Nothing was saved.");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_without_input() {
        let draft = build_draft(&DraftInput::default()).unwrap();
        assert_eq!(draft, DreamDraft::default());
    }

    #[test]
    fn test_flags_override_defaults() {
        let input = DraftInput {
            text: Some("flying".to_string()),
            lucid: true,
            dream_type: Some("lucid".to_string()),
            intensity: Some(7),
            tags: vec!["sky".into(), "wind".into(), " sky ".into()],
            characters: vec!["".into(), "owl".into()],
            ..DraftInput::default()
        };
        let draft = build_draft(&input).unwrap();
        assert_eq!(draft.dream_text, "flying");
        assert!(draft.is_lucid_dream);
        assert_eq!(draft.dream_type, "lucid");
        assert_eq!(draft.emotional_intensity, json!(7));
        assert_eq!(draft.tags, vec!["sky", "wind"]);
        assert_eq!(draft.characters, vec!["owl"]);
        assert_eq!(draft.sleep_quality, "good");
    }

    #[test]
    fn test_json_file_then_flags() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("draft.json");
        std::fs::write(
            &path,
            r#"{"dreamText":"a maze","clarity":"fuzzy","tags":["maze"]}"#,
        )
        .unwrap();

        let input = DraftInput {
            from_json: Some(path),
            tags: vec!["stairs".into()],
            clarity: Some("clear".into()),
            ..DraftInput::default()
        };
        let draft = build_draft(&input).unwrap();
        assert_eq!(draft.dream_text, "a maze");
        assert_eq!(draft.clarity, "clear");
        assert_eq!(draft.tags, vec!["maze", "stairs"]);
    }

    #[test]
    fn test_date_arg_expansion() {
        assert_eq!(date_arg_to_timestamp("2024-05-01"), "2024-05-01T00:00:00.000Z");
        assert_eq!(
            date_arg_to_timestamp("2024-05-01T03:00:00+02:00"),
            "2024-05-01T03:00:00+02:00"
        );
        assert_eq!(date_arg_to_timestamp("yesterday"), "yesterday");
    }
}
