//! Core data models for the dream journal.
//!
//! [`DreamRecord`] is the validated, persisted shape. [`DreamDraft`] is the
//! caller's working state: loosely typed so that bad input reaches
//! [`validate`](crate::schema::validate) instead of being coerced on the way
//! in.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A string that does not name any variant of an enumerated field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a closed set of wire strings as a Rust enum with `as_str`,
/// `Display`, `FromStr`, and serde support.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

string_enum! {
    /// What kind of dream this was.
    DreamType, "dream type" {
        Ordinary => "ordinary",
        Lucid => "lucid",
        Nightmare => "nightmare",
        Daydream => "daydream",
    }
}

string_enum! {
    /// Emotional state on a five-point scale, recorded before and after the dream.
    EmotionalState, "emotional state" {
        VeryNegative => "very_negative",
        Negative => "negative",
        Neutral => "neutral",
        Positive => "positive",
        VeryPositive => "very_positive",
    }
}

string_enum! {
    /// How clearly the dream is remembered.
    DreamClarity, "clarity" {
        VeryClear => "very_clear",
        Clear => "clear",
        Moderate => "moderate",
        Fuzzy => "fuzzy",
        VeryFuzzy => "very_fuzzy",
    }
}

string_enum! {
    SleepQuality, "sleep quality" {
        Excellent => "excellent",
        Good => "good",
        Fair => "fair",
        Poor => "poor",
        VeryPoor => "very_poor",
    }
}

string_enum! {
    /// Overall tone of the dream.
    DreamTone, "dream tone" {
        Positive => "positive",
        Negative => "negative",
        Neutral => "neutral",
    }
}

/// Emotional intensity, always within `[MIN, MAX]`.
///
/// Stored values outside the range, or with a fractional part, are rounded
/// and clamped on read. Older journals hold such values and still load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "f64", into = "u8")]
pub struct EmotionalIntensity(u8);

impl EmotionalIntensity {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    /// Clamp any integer into range.
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(Self::MIN as i64, Self::MAX as i64) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl From<f64> for EmotionalIntensity {
    fn from(value: f64) -> Self {
        Self::clamped(value.round() as i64)
    }
}

impl From<EmotionalIntensity> for u8 {
    fn from(value: EmotionalIntensity) -> Self {
        value.0
    }
}

/// One journaled dream, as stored in the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DreamRecord {
    pub dream_text: String,
    pub is_lucid_dream: bool,
    /// RFC 3339 timestamp of when the dream occurred.
    pub dream_date: String,
    pub dream_type: DreamType,
    pub emotional_state_before: EmotionalState,
    pub emotional_state_after: EmotionalState,
    pub characters: Vec<String>,
    pub location: String,
    pub emotional_intensity: EmotionalIntensity,
    pub clarity: DreamClarity,
    pub tags: Vec<String>,
    pub sleep_quality: SleepQuality,
    pub personal_meaning: String,
    pub dream_tone: DreamTone,
    /// RFC 3339 timestamp stamped when the record entered the collection.
    pub created_at: String,
}

/// Working state of the dream form before it is submitted.
///
/// Every field is optional on the wire; missing fields take the same
/// defaults a freshly opened form shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DreamDraft {
    pub dream_text: String,
    pub is_lucid_dream: bool,
    pub dream_date: Option<String>,
    pub dream_type: String,
    pub emotional_state_before: String,
    pub emotional_state_after: String,
    pub characters: Vec<String>,
    pub location: String,
    /// Raw input; anything other than a number (or numeric string) fails validation.
    pub emotional_intensity: serde_json::Value,
    pub clarity: String,
    pub tags: Vec<String>,
    pub sleep_quality: String,
    pub personal_meaning: String,
    pub dream_tone: String,
    pub created_at: Option<String>,
}

impl Default for DreamDraft {
    fn default() -> Self {
        Self {
            dream_text: String::new(),
            is_lucid_dream: false,
            dream_date: None,
            dream_type: DreamType::Ordinary.to_string(),
            emotional_state_before: EmotionalState::Neutral.to_string(),
            emotional_state_after: EmotionalState::Neutral.to_string(),
            characters: Vec::new(),
            location: String::new(),
            emotional_intensity: serde_json::Value::from(5),
            clarity: DreamClarity::Moderate.to_string(),
            tags: Vec::new(),
            sleep_quality: SleepQuality::Good.to_string(),
            personal_meaning: String::new(),
            dream_tone: DreamTone::Neutral.to_string(),
            created_at: None,
        }
    }
}

impl DreamDraft {
    /// Add a tag from free-text input. Returns `false` if the trimmed input
    /// is empty or already present.
    pub fn add_tag(&mut self, input: &str) -> bool {
        push_unique(&mut self.tags, input)
    }

    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|t| t != tag);
    }

    /// Add a character from free-text input. Same rules as [`add_tag`](Self::add_tag).
    pub fn add_character(&mut self, input: &str) -> bool {
        push_unique(&mut self.characters, input)
    }

    pub fn remove_character(&mut self, character: &str) {
        self.characters.retain(|c| c != character);
    }

    /// Restore the form defaults. Only call this after a committed append;
    /// on any error the user's input must survive.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn push_unique(list: &mut Vec<String>, input: &str) -> bool {
    let trimmed = input.trim();
    if trimmed.is_empty() || list.iter().any(|existing| existing == trimmed) {
        return false;
    }
    list.push(trimmed.to_string());
    true
}
