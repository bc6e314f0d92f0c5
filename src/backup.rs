//! Backup export/import.
//!
//! Import validates each top-level section on its own so that a file with, say,
//! a damaged question bank still restores its profiles.

use crate::error::ImportError;
use crate::models::ExamAttempt;
use crate::profiles::{Profile, normalize_profiles};
use crate::question_bank::QuestionBank;
use crate::settings::Settings;
use crate::storage::{attempts_from_value, question_bank_from_value};
use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;

pub const BACKUP_VERSION: u32 = 1;

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument<'a> {
    pub version: u32,
    pub exported_at: DateTime<Local>,
    pub profiles: &'a [Profile],
    pub active_profile_id: &'a str,
    pub question_bank: &'a QuestionBank,
    pub exam_attempts: &'a [ExamAttempt],
    pub settings: &'a Settings,
}

/// The well-formed sections of an imported backup
#[derive(Debug, Default)]
pub struct BackupSections {
    pub profiles: Option<(Vec<Profile>, Option<String>)>,
    pub question_bank: Option<QuestionBank>,
    pub exam_attempts: Option<Vec<ExamAttempt>>,
    /// Raw settings object, merged field by field into the current settings
    pub settings: Option<Value>,
}

impl BackupSections {
    pub fn is_empty(&self) -> bool {
        self.profiles.is_none()
            && self.question_bank.is_none()
            && self.exam_attempts.is_none()
            && self.settings.is_none()
    }
}

/// What an import actually changed
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub profiles: Option<usize>,
    pub question_sets: Option<usize>,
    pub exam_attempts: Option<usize>,
    pub settings: bool,
}

impl ImportReport {
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(count) = self.profiles {
            parts.push(format!("{} profiles", count));
        }
        if let Some(count) = self.question_sets {
            parts.push(format!("{} question sets", count));
        }
        if let Some(count) = self.exam_attempts {
            parts.push(format!("{} exam attempts", count));
        }
        if self.settings {
            parts.push("settings".to_string());
        }
        if parts.is_empty() {
            "nothing".to_string()
        } else {
            parts.join(", ")
        }
    }
}

pub fn export_json(document: &BackupDocument<'_>) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(document)
}

/// Parse a backup file and keep only the sections that validate.
pub fn parse_backup(raw: &str) -> Result<BackupSections, ImportError> {
    let parsed: Value = serde_json::from_str(raw)?;
    let fields = parsed.as_object().ok_or(ImportError::NotAnObject)?;

    let profiles = fields.get("profiles").and_then(normalize_profiles).map(|profiles| {
        let active = fields
            .get("activeProfileId")
            .and_then(Value::as_str)
            .map(str::to_string);
        (profiles, active)
    });

    let sections = BackupSections {
        profiles,
        question_bank: fields.get("questionBank").and_then(question_bank_from_value),
        exam_attempts: fields.get("examAttempts").and_then(attempts_from_value),
        settings: fields.get("settings").filter(|v| v.is_object()).cloned(),
    };

    if sections.is_empty() {
        return Err(ImportError::NothingToImport);
    }
    Ok(sections)
}
