use crate::progress::{BadgeProgress, compute_progress, sanitize_xp};
use chrono::{DateTime, Local};
use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use uuid::Uuid;

/// Generate a unique record id such as `ach-3f2a...`
pub fn create_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    fn from_loose(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "medium" => Difficulty::Medium,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Easy,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSet {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: u64,
    pub set_id: u64,
    pub prompt: String,
    #[serde(rename = "answer", alias = "expectedAnswer")]
    pub expected_answer: String,
    #[serde(default, deserialize_with = "lenient_difficulty")]
    pub difficulty: Difficulty,
}

/// Immutable record of one finished exam
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExamAttempt {
    pub id: String,
    pub set_id: u64,
    pub set_name: String,
    pub score: u8,
    pub correct_count: usize,
    pub total_questions: usize,
    pub completed_at: DateTime<Local>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "Local::now")]
    pub earned_at: DateTime<Local>,
}

/// A gamified badge. Only `xp` is stored; level and unlock state are derived.
#[derive(Clone, Debug, PartialEq)]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub description: String,
    xp: u64,
}

impl Badge {
    pub fn new(id: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_xp(id, name, description, 0)
    }

    pub fn with_xp(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        xp: u64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            xp,
        }
    }

    pub fn xp(&self) -> u64 {
        self.xp
    }

    pub fn progress(&self) -> BadgeProgress {
        compute_progress(self.xp)
    }

    pub fn level(&self) -> usize {
        self.progress().level
    }

    pub fn unlocked(&self) -> bool {
        self.progress().unlocked
    }

    /// Add XP to the badge. Non-positive amounts leave it untouched.
    pub fn grant_xp(&mut self, amount: i64) -> bool {
        if amount <= 0 {
            return false;
        }
        self.xp = self.xp.saturating_add(amount as u64);
        true
    }

    /// Get the icon for this badge
    pub fn get_icon(&self) -> &str {
        if self.unlocked() { "★" } else { "☆" }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BadgeRecord<'a> {
    id: &'a str,
    name: &'a str,
    description: &'a str,
    xp: u64,
    level: usize,
    unlocked: bool,
}

// level/unlocked are written for readers of older exports, never read back
impl Serialize for Badge {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let progress = self.progress();
        BadgeRecord {
            id: &self.id,
            name: &self.name,
            description: &self.description,
            xp: self.xp,
            level: progress.level,
            unlocked: progress.unlocked,
        }
        .serialize(serializer)
    }
}

/// XP from a loosely-typed stored value: numbers and numeric strings are
/// sanitised, anything else counts as 0
pub(crate) fn lenient_xp(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().map(sanitize_xp).unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<f64>().map(sanitize_xp).unwrap_or(0),
        _ => 0,
    }
}

fn lenient_difficulty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Difficulty, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().map(Difficulty::from_loose).unwrap_or_default())
}

/// Keep a string field only when it has content after trimming
pub(crate) fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_grant_xp_rejects_non_positive() {
        let mut badge = Badge::new("focus", "Focus", "Complete uninterrupted study sessions.");
        assert!(!badge.grant_xp(0));
        assert!(!badge.grant_xp(-40));
        assert_eq!(badge.xp(), 0);
        assert!(!badge.unlocked());
    }

    #[test]
    fn test_grant_xp_is_monotonic() {
        let mut badge = Badge::with_xp("accuracy", "Accuracy", "", 100);
        for amount in [-10_i64, 0, 20, 50, 7] {
            let before = badge.xp();
            badge.grant_xp(amount);
            assert_eq!(badge.xp(), before + amount.max(0) as u64);
        }
        assert_eq!(badge.xp(), 177);
        assert_eq!(badge.level(), 1);
        assert!(badge.unlocked());
    }

    #[test]
    fn test_badge_serializes_derived_fields() {
        let badge = Badge::with_xp("consistency", "Consistency", "Study often.", 320);
        let value = serde_json::to_value(&badge).unwrap();
        assert_eq!(value["xp"], json!(320));
        assert_eq!(value["level"], json!(2));
        assert_eq!(value["unlocked"], json!(true));
    }

    #[test]
    fn test_lenient_xp_cleans_stored_values() {
        assert_eq!(lenient_xp(Some(&json!(-30))), 0);
        assert_eq!(lenient_xp(Some(&json!("250.7"))), 250);
        assert_eq!(lenient_xp(Some(&json!(420))), 420);
        assert_eq!(lenient_xp(Some(&json!(null))), 0);
        assert_eq!(lenient_xp(Some(&json!({ "xp": 5 }))), 0);
        assert_eq!(lenient_xp(None), 0);
    }

    #[test]
    fn test_question_uses_answer_field_and_loose_difficulty() {
        let question: Question = serde_json::from_value(json!({
            "id": 3,
            "setId": 1,
            "prompt": "What is JSX?",
            "answer": "A syntax extension for JavaScript",
            "difficulty": "expert"
        }))
        .unwrap();
        assert_eq!(question.expected_answer, "A syntax extension for JavaScript");
        assert_eq!(question.difficulty, Difficulty::Easy);

        let value = serde_json::to_value(&question).unwrap();
        assert!(value.get("answer").is_some());
        assert_eq!(value["setId"], json!(1));

        let aliased: Question = serde_json::from_value(json!({
            "id": 4,
            "setId": 1,
            "prompt": "p",
            "expectedAnswer": "e",
            "difficulty": "Hard"
        }))
        .unwrap();
        assert_eq!(aliased.expected_answer, "e");
        assert_eq!(aliased.difficulty, Difficulty::Hard);
    }

    #[test]
    fn test_create_id_is_prefixed_and_unique() {
        let a = create_id("ach");
        let b = create_id("ach");
        assert!(a.starts_with("ach-"));
        assert_ne!(a, b);
    }
}
