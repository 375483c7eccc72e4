//! Normalization and validation of candidate dream records.
//!
//! Both functions are pure. [`normalize`] takes the current time as an
//! argument instead of reading a clock, which keeps it deterministic and
//! idempotent for a fixed `now`.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::error::{FieldError, ValidationError};
use crate::models::{
    DreamClarity, DreamDraft, DreamRecord, DreamTone, DreamType, EmotionalIntensity,
    EmotionalState, SleepQuality,
};

/// Format a timestamp the way records are stamped: UTC, millisecond
/// precision, `Z` suffix (e.g. `2024-05-01T06:30:00.000Z`).
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Clean up a candidate without judging it.
///
/// - `characters` and `tags` are trimmed; empty entries and repeats are
///   dropped, keeping first-seen order.
/// - A numeric `emotionalIntensity` (or numeric string) is rounded and
///   clamped to `[1, 10]`. Anything else is left for [`validate`] to reject.
/// - A missing or blank `dreamDate` defaults to `now`.
/// - `createdAt` is stamped with `now`.
pub fn normalize(candidate: &DreamDraft, now: DateTime<Utc>) -> DreamDraft {
    let stamp = format_timestamp(now);

    let dream_date = match candidate.dream_date.as_deref().map(str::trim) {
        Some(date) if !date.is_empty() => date.to_string(),
        _ => stamp.clone(),
    };

    DreamDraft {
        characters: dedup_trimmed(&candidate.characters),
        tags: dedup_trimmed(&candidate.tags),
        emotional_intensity: normalize_intensity(&candidate.emotional_intensity),
        dream_date: Some(dream_date),
        created_at: Some(stamp),
        ..candidate.clone()
    }
}

fn dedup_trimmed(entries: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(entries.len());
    for entry in entries {
        let trimmed = entry.trim();
        if !trimmed.is_empty() && !out.iter().any(|e| e == trimmed) {
            out.push(trimmed.to_string());
        }
    }
    out
}

fn normalize_intensity(value: &Value) -> Value {
    let numeric = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match numeric {
        Some(f) if f.is_finite() => {
            Value::from(EmotionalIntensity::clamped(f.round() as i64).get())
        }
        _ => value.clone(),
    }
}

/// Check a candidate and, if every field is legal, produce the typed record.
///
/// All offending fields are reported together. Unknown enum values are
/// never coerced.
pub fn validate(candidate: &DreamDraft) -> Result<DreamRecord, ValidationError> {
    let mut errors = Vec::new();

    let dream_date = check_timestamp("dreamDate", candidate.dream_date.as_deref(), &mut errors);
    let dream_type = check_enum::<DreamType>(
        "dreamType",
        &candidate.dream_type,
        DreamType::ALL,
        &mut errors,
    );
    let before = check_enum::<EmotionalState>(
        "emotionalStateBefore",
        &candidate.emotional_state_before,
        EmotionalState::ALL,
        &mut errors,
    );
    let after = check_enum::<EmotionalState>(
        "emotionalStateAfter",
        &candidate.emotional_state_after,
        EmotionalState::ALL,
        &mut errors,
    );
    check_entries("characters", &candidate.characters, &mut errors);
    let intensity = check_intensity(&candidate.emotional_intensity, &mut errors);
    let clarity = check_enum::<DreamClarity>(
        "clarity",
        &candidate.clarity,
        DreamClarity::ALL,
        &mut errors,
    );
    check_entries("tags", &candidate.tags, &mut errors);
    let sleep_quality = check_enum::<SleepQuality>(
        "sleepQuality",
        &candidate.sleep_quality,
        SleepQuality::ALL,
        &mut errors,
    );
    let dream_tone = check_enum::<DreamTone>(
        "dreamTone",
        &candidate.dream_tone,
        DreamTone::ALL,
        &mut errors,
    );
    let created_at = check_timestamp("createdAt", candidate.created_at.as_deref(), &mut errors);

    if is_degenerate(candidate) {
        errors.push(FieldError {
            field: "dreamText",
            reason: "record is empty: describe the dream or add a location, meaning, character, or tag"
                .to_string(),
        });
    }

    let (
        Some(dream_date),
        Some(dream_type),
        Some(before),
        Some(after),
        Some(intensity),
        Some(clarity),
        Some(sleep_quality),
        Some(dream_tone),
        Some(created_at),
    ) = (
        dream_date,
        dream_type,
        before,
        after,
        intensity,
        clarity,
        sleep_quality,
        dream_tone,
        created_at,
    )
    else {
        return Err(ValidationError { fields: errors });
    };
    if !errors.is_empty() {
        return Err(ValidationError { fields: errors });
    }

    Ok(DreamRecord {
        dream_text: candidate.dream_text.clone(),
        is_lucid_dream: candidate.is_lucid_dream,
        dream_date,
        dream_type,
        emotional_state_before: before,
        emotional_state_after: after,
        characters: candidate.characters.clone(),
        location: candidate.location.clone(),
        emotional_intensity: intensity,
        clarity,
        tags: candidate.tags.clone(),
        sleep_quality,
        personal_meaning: candidate.personal_meaning.clone(),
        dream_tone,
        created_at,
    })
}

fn check_enum<T>(
    field: &'static str,
    value: &str,
    allowed: &[T],
    errors: &mut Vec<FieldError>,
) -> Option<T>
where
    T: FromStr + Display,
{
    match value.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            let allowed = allowed
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            errors.push(FieldError {
                field,
                reason: format!("'{}' is not one of: {}", value, allowed),
            });
            None
        }
    }
}

fn check_timestamp(
    field: &'static str,
    value: Option<&str>,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match value {
        None => {
            errors.push(FieldError {
                field,
                reason: "missing timestamp".to_string(),
            });
            None
        }
        Some(ts) => match DateTime::parse_from_rfc3339(ts) {
            Ok(_) => Some(ts.to_string()),
            Err(e) => {
                errors.push(FieldError {
                    field,
                    reason: format!("'{}' is not an RFC 3339 timestamp ({})", ts, e),
                });
                None
            }
        },
    }
}

fn check_intensity(value: &Value, errors: &mut Vec<FieldError>) -> Option<EmotionalIntensity> {
    // Numeric strings are accepted here as well as in `normalize`.
    let numeric = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    };
    let reason = match numeric {
        Some(f) if f.fract() == 0.0 => {
            let i = f as i64;
            if (EmotionalIntensity::MIN as i64..=EmotionalIntensity::MAX as i64).contains(&i) {
                return Some(EmotionalIntensity::clamped(i));
            }
            format!(
                "{} is outside [{}, {}]",
                i,
                EmotionalIntensity::MIN,
                EmotionalIntensity::MAX
            )
        }
        Some(_) => format!("{} is not an integer", value),
        None => format!("expected a number, got {}", value),
    };
    errors.push(FieldError {
        field: "emotionalIntensity",
        reason,
    });
    None
}

fn check_entries(field: &'static str, entries: &[String], errors: &mut Vec<FieldError>) {
    if entries.iter().any(|e| e.trim().is_empty()) {
        errors.push(FieldError {
            field,
            reason: "contains an empty entry".to_string(),
        });
    }
    for (i, entry) in entries.iter().enumerate() {
        if entries[..i].contains(entry) {
            errors.push(FieldError {
                field,
                reason: format!("contains duplicate '{}'", entry),
            });
            break;
        }
    }
}

fn is_degenerate(candidate: &DreamDraft) -> bool {
    candidate.dream_text.trim().is_empty()
        && candidate.location.trim().is_empty()
        && candidate.personal_meaning.trim().is_empty()
        && candidate.characters.is_empty()
        && candidate.tags.is_empty()
}
