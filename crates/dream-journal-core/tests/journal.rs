//! Behavior tests for the append cycle against a fault-injecting backend.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};

use dream_journal_core::backend::memory::InMemoryBackend;
use dream_journal_core::backend::KvBackend;
use dream_journal_core::error::{BackendError, JournalError};
use dream_journal_core::journal::{Clock, DreamJournal, DEFAULT_COLLECTION_KEY};
use dream_journal_core::models::{DreamDraft, DreamType};

// ─── Test doubles ───────────────────────────────────────────────────

/// Wraps an in-memory backend and fails reads or writes on demand.
#[derive(Default)]
struct FlakyBackend {
    inner: InMemoryBackend,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl FlakyBackend {
    fn seeded(value: Value) -> Self {
        Self {
            inner: InMemoryBackend::with_value(DEFAULT_COLLECTION_KEY, value),
            ..Self::default()
        }
    }

    async fn raw(&self) -> Option<Value> {
        self.inner.get(DEFAULT_COLLECTION_KEY).await.unwrap()
    }
}

#[async_trait]
impl KvBackend for FlakyBackend {
    async fn get(&self, key: &str) -> Result<Option<Value>, BackendError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(BackendError::io("storage unavailable"));
        }
        // Widen the race window between concurrent read-modify-write cycles.
        tokio::task::yield_now().await;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &Value) -> Result<(), BackendError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(BackendError::io("disk full"));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value).await
    }
}

/// Clock that advances one second per reading.
struct StepClock {
    next: Mutex<DateTime<Utc>>,
}

impl StepClock {
    fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            next: Mutex::new(start),
        }
    }
}

impl Clock for StepClock {
    fn now(&self) -> DateTime<Utc> {
        let mut next = self.next.lock().unwrap();
        let now = *next;
        *next = now + Duration::seconds(1);
        now
    }
}

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 6, 30, 0).unwrap()
}

fn journal_over(backend: Arc<FlakyBackend>) -> DreamJournal {
    DreamJournal::new(backend, DEFAULT_COLLECTION_KEY)
        .with_clock(Arc::new(StepClock::starting_at(start())))
}

fn flying() -> DreamDraft {
    DreamDraft {
        dream_text: "flying".to_string(),
        dream_type: "lucid".to_string(),
        emotional_intensity: json!(7),
        tags: vec!["sky".into(), "wind".into(), "sky".into()],
        characters: vec![],
        ..DreamDraft::default()
    }
}

fn stored_record() -> Value {
    json!({
        "dreamText": "old dream",
        "isLucidDream": false,
        "dreamDate": "2023-01-01T00:00:00.000Z",
        "dreamType": "ordinary",
        "emotionalStateBefore": "neutral",
        "emotionalStateAfter": "neutral",
        "characters": [],
        "location": "",
        "emotionalIntensity": 5,
        "clarity": "moderate",
        "tags": [],
        "sleepQuality": "good",
        "personalMeaning": "",
        "dreamTone": "neutral",
        "createdAt": "2023-01-01T00:00:00.000Z"
    })
}

// ─── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_first_append_on_empty_store() {
    let backend = Arc::new(FlakyBackend::default());
    let journal = journal_over(backend.clone());

    let committed = journal.append(&flying()).await.unwrap();
    assert_eq!(committed.tags, vec!["sky", "wind"]);
    assert_eq!(committed.emotional_intensity.get(), 7);
    assert_eq!(committed.dream_type, DreamType::Lucid);
    assert_eq!(committed.created_at, "2024-05-01T06:30:00.000Z");

    let all = journal.load_all().await.unwrap();
    assert_eq!(all, vec![committed]);
}

#[tokio::test]
async fn test_append_grows_collection_by_one() {
    let backend = Arc::new(FlakyBackend::default());
    let journal = journal_over(backend.clone());

    journal.append(&flying()).await.unwrap();
    let before = journal.load_all().await.unwrap();

    let mut draft = flying();
    draft.dream_text = "teeth falling out".to_string();
    draft.dream_type = "nightmare".to_string();
    let committed = journal.append(&draft).await.unwrap();

    let after = journal.load_all().await.unwrap();
    assert_eq!(after.len(), before.len() + 1);
    assert_eq!(&after[..before.len()], &before[..]);
    assert_eq!(after.last(), Some(&committed));
    assert!(after[0].created_at <= after[1].created_at);
}

#[tokio::test]
async fn test_invalid_enum_leaves_store_untouched() {
    let seeded = json!([stored_record()]);
    let backend = Arc::new(FlakyBackend::seeded(seeded.clone()));
    let journal = journal_over(backend.clone());

    let mut draft = flying();
    draft.dream_type = "imaginary".to_string();
    let err = journal.append(&draft).await.unwrap_err();

    match err {
        JournalError::Validation(v) => assert_eq!(v.field_names(), vec!["dreamType"]),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(backend.writes.load(Ordering::SeqCst), 0);
    assert_eq!(
        serde_json::to_string(&backend.raw().await.unwrap()).unwrap(),
        serde_json::to_string(&seeded).unwrap()
    );
}

#[tokio::test]
async fn test_write_failure_is_all_or_nothing() {
    let backend = Arc::new(FlakyBackend::default());
    let journal = journal_over(backend.clone());
    journal.append(&flying()).await.unwrap();
    let before = journal.load_all().await.unwrap();

    backend.fail_writes.store(true, Ordering::SeqCst);
    let err = journal.append(&flying()).await.unwrap_err();
    assert!(matches!(err, JournalError::StoreWrite { .. }));
    assert!(err.is_retryable());

    assert_eq!(journal.load_all().await.unwrap(), before);

    backend.fail_writes.store(false, Ordering::SeqCst);
    journal.append(&flying()).await.unwrap();
    assert_eq!(journal.load_all().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_read_failure_skips_write() {
    let backend = Arc::new(FlakyBackend::default());
    let journal = journal_over(backend.clone());

    backend.fail_reads.store(true, Ordering::SeqCst);
    let err = journal.append(&flying()).await.unwrap_err();
    assert!(matches!(err, JournalError::StoreRead { .. }));
    assert_eq!(backend.writes.load(Ordering::SeqCst), 0);

    let err = journal.load_all().await.unwrap_err();
    assert!(matches!(err, JournalError::StoreRead { .. }));
}

#[tokio::test]
async fn test_corrupt_collection_is_not_overwritten() {
    let corrupt = json!([{"dreamText": "half a record"}]);
    let backend = Arc::new(FlakyBackend::seeded(corrupt.clone()));
    let journal = journal_over(backend.clone());

    let err = journal.load_all().await.unwrap_err();
    assert!(matches!(err, JournalError::CorruptStore { .. }));

    let err = journal.append(&flying()).await.unwrap_err();
    assert!(matches!(err, JournalError::CorruptStore { .. }));
    assert_eq!(backend.writes.load(Ordering::SeqCst), 0);
    assert_eq!(backend.raw().await, Some(corrupt));
}

#[tokio::test]
async fn test_append_preserves_existing_entries_verbatim() {
    let mut existing = stored_record();
    existing["id"] = json!("abc-123");
    let backend = Arc::new(FlakyBackend::seeded(json!([existing.clone()])));
    let journal = journal_over(backend.clone());

    journal.append(&flying()).await.unwrap();

    let raw = backend.raw().await.unwrap();
    let raw = raw.as_array().unwrap();
    assert_eq!(raw.len(), 2);
    assert_eq!(raw[0], existing);
    assert_eq!(raw[1]["dreamText"], "flying");
    assert!(raw[1].get("id").is_none());
}

#[tokio::test]
async fn test_legacy_intensity_in_store_is_clamped_and_kept() {
    let mut high = stored_record();
    high["emotionalIntensity"] = json!(15);
    let mut fractional = stored_record();
    fractional["emotionalIntensity"] = json!(5.5);
    let backend = Arc::new(FlakyBackend::seeded(json!([high.clone(), fractional.clone()])));
    let journal = journal_over(backend.clone());

    let dreams = journal.load_all().await.unwrap();
    assert_eq!(dreams[0].emotional_intensity.get(), 10);
    assert_eq!(dreams[1].emotional_intensity.get(), 6);

    journal.append(&flying()).await.unwrap();

    let raw = backend.raw().await.unwrap();
    assert_eq!(raw.as_array().unwrap().len(), 3);
    assert_eq!(raw[0]["emotionalIntensity"], json!(15));
    assert_eq!(raw[1]["emotionalIntensity"], json!(5.5));
}

#[tokio::test]
async fn test_concurrent_appends_do_not_lose_updates() {
    let backend = Arc::new(FlakyBackend::default());
    let journal = Arc::new(journal_over(backend.clone()));

    let mut handles = Vec::new();
    for i in 0..8 {
        let journal = journal.clone();
        handles.push(tokio::spawn(async move {
            let mut draft = flying();
            draft.dream_text = format!("dream {i}");
            journal.append(&draft).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let all = journal.load_all().await.unwrap();
    assert_eq!(all.len(), 8);
    for pair in all.windows(2) {
        assert!(pair[0].created_at <= pair[1].created_at);
    }
}

#[tokio::test]
async fn test_retry_after_failure_keeps_draft_usable() {
    let backend = Arc::new(FlakyBackend::default());
    let journal = journal_over(backend.clone());
    let draft = flying();

    backend.fail_writes.store(true, Ordering::SeqCst);
    assert!(journal.append(&draft).await.is_err());
    assert_eq!(draft, flying());

    backend.fail_writes.store(false, Ordering::SeqCst);
    let committed = journal.append(&draft).await.unwrap();
    assert_eq!(committed.dream_text, "flying");
}
