//! Persistence gateway.
//!
//! The engines never touch the filesystem directly: they go through a
//! [`KeyValueStore`] injected into [`Persistence`]. Loads never fail, since missing
//! or malformed records fall back to defaults, while saves report a typed
//! [`StoreError`] the caller may log and ignore.

use crate::error::StoreError;
use crate::growth::GrowthLog;
use crate::models::{ExamAttempt, Question, QuestionSet};
use crate::profiles::{Profile, default_profiles, normalize_profiles};
use crate::question_bank::QuestionBank;
use crate::settings::Settings;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const QUESTION_BANK_KEY: &str = "skillnotes.question-bank.v1";
pub const EXAM_ATTEMPTS_KEY: &str = "skillnotes.exam-attempts.v1";
pub const PROFILES_KEY: &str = "skillnotes.profiles.v1";
pub const ACTIVE_PROFILE_KEY: &str = "skillnotes.active-profile-id.v1";
pub const SETTINGS_KEY: &str = "skillnotes.app-settings.v1";
pub const GROWTH_EVENTS_KEY: &str = "skillnotes.growth-events.v1";

/// Raw string storage addressed by fixed keys
pub trait KeyValueStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

/// In-process store, used when no data directory is usable and in tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).write(key, value)
    }
}

/// Typed load/save of every persisted record kind
#[derive(Debug)]
pub struct Persistence<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Parsed JSON under `key`, or `None` when absent, unreadable or corrupt
    fn read_json(&self, key: &str) -> Option<Value> {
        let raw = match self.store.read(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "failed to read stored record, using defaults");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "stored record is not valid JSON, using defaults");
                None
            }
        }
    }

    fn write_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        let content = serde_json::to_string(value)?;
        self.store.write(key, &content)?;
        debug!(key, bytes = content.len(), "record saved");
        Ok(())
    }

    pub fn load_question_bank(&self) -> QuestionBank {
        let Some(stored) = self.read_json(QUESTION_BANK_KEY) else {
            return QuestionBank::default();
        };
        question_bank_from_value(&stored).unwrap_or_else(|| {
            warn!(key = QUESTION_BANK_KEY, "stored question bank is malformed, using defaults");
            QuestionBank::default()
        })
    }

    pub fn save_question_bank(&mut self, bank: &QuestionBank) -> Result<(), StoreError> {
        self.write_json(QUESTION_BANK_KEY, bank)
    }

    pub fn load_exam_attempts(&self) -> Vec<ExamAttempt> {
        self.read_json(EXAM_ATTEMPTS_KEY)
            .and_then(|stored| attempts_from_value(&stored))
            .unwrap_or_default()
    }

    pub fn save_exam_attempts(&mut self, attempts: &[ExamAttempt]) -> Result<(), StoreError> {
        self.write_json(EXAM_ATTEMPTS_KEY, attempts)
    }

    pub fn load_profiles(&self) -> Vec<Profile> {
        self.read_json(PROFILES_KEY)
            .and_then(|stored| normalize_profiles(&stored))
            .unwrap_or_else(default_profiles)
    }

    pub fn save_profiles(&mut self, profiles: &[Profile]) -> Result<(), StoreError> {
        self.write_json(PROFILES_KEY, profiles)
    }

    /// Accepts a JSON string or bare text
    pub fn load_active_profile_id(&self) -> Option<String> {
        let raw = self.store.read(ACTIVE_PROFILE_KEY).ok().flatten()?;
        let id = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::String(id)) => id,
            _ => raw,
        };
        let id = id.trim();
        (!id.is_empty()).then(|| id.to_string())
    }

    pub fn save_active_profile_id(&mut self, profile_id: &str) -> Result<(), StoreError> {
        self.write_json(ACTIVE_PROFILE_KEY, profile_id)
    }

    pub fn load_settings(&self) -> Settings {
        self.read_json(SETTINGS_KEY)
            .map(|stored| Settings::from_value(&stored))
            .unwrap_or_default()
    }

    pub fn save_settings(&mut self, settings: &Settings) -> Result<(), StoreError> {
        self.write_json(SETTINGS_KEY, settings)
    }

    pub fn load_growth_log(&self) -> GrowthLog {
        self.read_json(GROWTH_EVENTS_KEY)
            .map(|stored| GrowthLog::from_value(&stored))
            .unwrap_or_default()
    }

    pub fn save_growth_log(&mut self, log: &GrowthLog) -> Result<(), StoreError> {
        self.write_json(GROWTH_EVENTS_KEY, log)
    }
}

/// Question bank from loosely-typed JSON.
///
/// Needs array `sets` (non-empty) and array `questions`; entries that do not parse
/// are dropped.
pub fn question_bank_from_value(value: &Value) -> Option<QuestionBank> {
    let sets: Vec<QuestionSet> = parse_entries(value.get("sets")?)?;
    let questions: Vec<Question> = parse_entries(value.get("questions")?)?;
    if sets.is_empty() {
        return None;
    }
    Some(QuestionBank::new(sets, questions))
}

/// Attempt history from loosely-typed JSON; `None` unless `value` is an array.
///
/// Attempts scoring above 100 or with more correct answers than questions are dropped.
pub fn attempts_from_value(value: &Value) -> Option<Vec<ExamAttempt>> {
    let parsed: Vec<ExamAttempt> = parse_entries(value)?;
    let total = parsed.len();
    let attempts: Vec<ExamAttempt> = parsed
        .into_iter()
        .filter(|a| a.score <= 100 && a.correct_count <= a.total_questions)
        .collect();
    if attempts.len() < total {
        warn!(dropped = total - attempts.len(), "skipped out-of-range exam attempts");
    }
    Some(attempts)
}

fn parse_entries<T: serde::de::DeserializeOwned>(value: &Value) -> Option<Vec<T>> {
    let entries = value.as_array()?;
    let parsed: Vec<T> = entries
        .iter()
        .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
        .collect();
    if parsed.len() < entries.len() {
        warn!(
            dropped = entries.len() - parsed.len(),
            "skipped malformed stored entries"
        );
    }
    Some(parsed)
}
