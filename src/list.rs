//! The `dreams list` command.

use anyhow::Result;

use dream_journal_core::models::DreamRecord;

use crate::config::Config;
use crate::db;

/// CLI entry point: print the whole collection in stored order.
pub async fn run_list(config: &Config, json: bool) -> Result<()> {
    let (journal, pool) = db::open_journal(config).await?;
    let loaded = journal.load_all().await;
    pool.close().await;
    let dreams = loaded?;

    if json {
        println!("{}", serde_json::to_string_pretty(&dreams)?);
        return Ok(());
    }

    if dreams.is_empty() {
        println!("No dreams recorded yet.");
        return Ok(());
    }

    for (i, record) in dreams.iter().enumerate() {
        println!("--- Dream #{} ---", i + 1);
        print_record(record);
        println!();
    }
    println!("{} dream(s) in '{}'.", dreams.len(), journal.key());

    Ok(())
}

pub fn print_record(record: &DreamRecord) {
    println!("created_at:   {}", record.created_at);
    println!("dream_date:   {}", record.dream_date);
    println!(
        "type:         {}{}",
        record.dream_type,
        if record.is_lucid_dream { " (lucid)" } else { "" }
    );
    println!(
        "emotions:     {} -> {}",
        record.emotional_state_before, record.emotional_state_after
    );
    println!("intensity:    {}/10", record.emotional_intensity.get());
    println!("clarity:      {}", record.clarity);
    println!("sleep:        {}", record.sleep_quality);
    println!("tone:         {}", record.dream_tone);
    if !record.location.is_empty() {
        println!("location:     {}", record.location);
    }
    if !record.characters.is_empty() {
        println!("characters:   {}", record.characters.join(", "));
    }
    if !record.tags.is_empty() {
        println!("tags:         {}", record.tags.join(", "));
    }
    if !record.dream_text.is_empty() {
        println!("text:         {}", record.dream_text);
    }
    if !record.personal_meaning.is_empty() {
        println!("meaning:      {}", record.personal_meaning);
    }
}
