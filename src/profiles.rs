use crate::models::{Achievement, Badge, create_id, lenient_xp, non_blank};
use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

/// Profile that `logout` falls back to
pub const DEFAULT_ACTIVE_PROFILE_ID: &str = "p1";

const DEFAULT_PLAN: &str = "Learner";
const DEFAULT_ACCENT: &str = "#6366f1";
const DEFAULT_BADGE_DESCRIPTION: &str = "Custom badge";

const BADGE_TEMPLATES: [(&str, &str, &str); 3] = [
    ("consistency", "Consistency", "Study on a regular schedule."),
    ("accuracy", "Accuracy", "Keep your answers correct and precise."),
    ("focus", "Focus", "Complete uninterrupted study sessions."),
];

const DEFAULT_PROFILES: [(&str, &str, &str, &str); 4] = [
    ("p1", "Alex", "Pro Plan", "#ef4444"),
    ("p2", "Jamie", "Student Plus", "#3b82f6"),
    ("p3", "Taylor", "Focus Mode", "#22c55e"),
    ("p4", "Casey", "Exam Sprint", "#f59e0b"),
];

pub fn default_badges() -> Vec<Badge> {
    BADGE_TEMPLATES
        .iter()
        .map(|(id, name, description)| Badge::new(*id, *name, *description))
        .collect()
}

pub fn default_profiles() -> Vec<Profile> {
    DEFAULT_PROFILES
        .iter()
        .map(|(id, name, plan, accent)| Profile {
            id: id.to_string(),
            name: name.to_string(),
            plan: plan.to_string(),
            accent: accent.to_string(),
            achievements: Vec::new(),
            badges: default_badges(),
        })
        .collect()
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub plan: String,
    pub accent: String,
    pub achievements: Vec<Achievement>,
    pub badges: Vec<Badge>,
}

impl Profile {
    pub fn badge(&self, badge_id: &str) -> Option<&Badge> {
        self.badges.iter().find(|b| b.id == badge_id)
    }

    pub fn unlocked_badges(&self) -> usize {
        self.badges.iter().filter(|b| b.unlocked()).count()
    }
}

/// Partial edit of a profile; blank fields are ignored
#[derive(Clone, Debug, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub plan: Option<String>,
    pub accent: Option<String>,
}

/// Non-blank string field of a stored record
fn text_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).and_then(non_blank)
}

fn normalize_badge(value: &Value, index: usize) -> Badge {
    Badge::with_xp(
        text_field(value, "id").unwrap_or_else(|| format!("badge-{}", index + 1)),
        text_field(value, "name").unwrap_or_else(|| format!("Badge {}", index + 1)),
        text_field(value, "description").unwrap_or_else(|| DEFAULT_BADGE_DESCRIPTION.to_string()),
        lenient_xp(value.get("xp")),
    )
}

/// Only non-object entries are dropped; a missing id or timestamp is filled in
fn normalize_achievement(value: &Value, index: usize) -> Option<Achievement> {
    if !value.is_object() {
        return None;
    }
    let earned_at = value
        .get("earnedAt")
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
        .map(|at| at.with_timezone(&Local))
        .unwrap_or_else(Local::now);

    Some(Achievement {
        id: text_field(value, "id").unwrap_or_else(|| create_id("ach")),
        title: text_field(value, "title").unwrap_or_else(|| format!("Achievement {}", index + 1)),
        description: text_field(value, "description").unwrap_or_default(),
        earned_at,
    })
}

fn normalize_profile(value: &Value, index: usize) -> Profile {
    let achievements = value
        .get("achievements")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .enumerate()
                .filter_map(|(i, v)| normalize_achievement(v, i))
                .collect()
        })
        .unwrap_or_default();

    let badges = match value.get("badges").and_then(Value::as_array) {
        Some(badges) if !badges.is_empty() => badges
            .iter()
            .enumerate()
            .map(|(i, v)| normalize_badge(v, i))
            .collect(),
        _ => default_badges(),
    };

    Profile {
        id: text_field(value, "id").unwrap_or_else(|| format!("p-{}", index + 1)),
        name: text_field(value, "name").unwrap_or_else(|| format!("Profile {}", index + 1)),
        plan: text_field(value, "plan").unwrap_or_else(|| DEFAULT_PLAN.to_string()),
        accent: text_field(value, "accent").unwrap_or_else(|| DEFAULT_ACCENT.to_string()),
        achievements,
        badges,
    }
}

/// Rebuild profiles from loosely-typed JSON.
///
/// Returns `None` unless `value` is a non-empty array. Each entry is repaired on
/// its own, and badge level/unlock state is always recomputed from XP.
pub fn normalize_profiles(value: &Value) -> Option<Vec<Profile>> {
    let entries = value.as_array().filter(|entries| !entries.is_empty())?;
    Some(
        entries
            .iter()
            .enumerate()
            .map(|(i, v)| normalize_profile(v, i))
            .collect(),
    )
}

/// All profiles plus which one is active
#[derive(Clone, Debug, PartialEq)]
pub struct ProfileBook {
    profiles: Vec<Profile>,
    active_profile_id: String,
}

impl Default for ProfileBook {
    fn default() -> Self {
        Self::new(default_profiles(), None)
    }
}

impl ProfileBook {
    /// Build a book, falling back to the defaults for an empty list and to the
    /// first profile for an unknown active id.
    pub fn new(profiles: Vec<Profile>, active_profile_id: Option<&str>) -> Self {
        let profiles = if profiles.is_empty() {
            default_profiles()
        } else {
            profiles
        };
        let mut book = Self {
            active_profile_id: String::new(),
            profiles,
        };
        book.active_profile_id = book.resolve_active_id(active_profile_id);
        book
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn profile(&self, profile_id: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id == profile_id)
    }

    pub fn active_profile_id(&self) -> &str {
        &self.active_profile_id
    }

    pub fn active(&self) -> &Profile {
        // `new` never leaves the list empty
        self.profile(&self.active_profile_id)
            .unwrap_or(&self.profiles[0])
    }

    pub fn switch_profile(&mut self, profile_id: &str) -> bool {
        if self.profile(profile_id).is_none() {
            debug!(profile_id, "switch ignored: unknown profile");
            return false;
        }
        self.active_profile_id = profile_id.to_string();
        info!(profile_id, "active profile switched");
        true
    }

    pub fn update_profile(&mut self, profile_id: &str, update: ProfileUpdate) -> bool {
        let Some(profile) = self.profile_mut(profile_id) else {
            return false;
        };
        if let Some(name) = update.name.as_deref().and_then(non_blank) {
            profile.name = name;
        }
        if let Some(plan) = update.plan.as_deref().and_then(non_blank) {
            profile.plan = plan;
        }
        if let Some(accent) = update.accent.as_deref().and_then(non_blank) {
            profile.accent = accent;
        }
        true
    }

    pub fn add_achievement(&mut self, profile_id: &str, title: &str, description: &str) -> bool {
        let Some(title) = non_blank(title) else {
            return false;
        };
        let Some(profile) = self.profile_mut(profile_id) else {
            return false;
        };
        profile.achievements.insert(
            0,
            Achievement {
                id: create_id("ach"),
                title,
                description: description.trim().to_string(),
                earned_at: Local::now(),
            },
        );
        true
    }

    /// Append a new 0 XP badge and return its id
    pub fn add_badge(&mut self, profile_id: &str, name: &str, description: &str) -> Option<String> {
        let name = non_blank(name)?;
        let description =
            non_blank(description).unwrap_or_else(|| DEFAULT_BADGE_DESCRIPTION.to_string());
        let profile = self.profile_mut(profile_id)?;
        let badge = Badge::new(create_id("badge"), name, description);
        let badge_id = badge.id.clone();
        profile.badges.push(badge);
        Some(badge_id)
    }

    /// Grant XP to one badge of one profile. Unknown ids and non-positive amounts are no-ops.
    pub fn grant_xp(&mut self, profile_id: &str, badge_id: &str, amount: i64) -> bool {
        let Some(badge) = self
            .profile_mut(profile_id)
            .and_then(|p| p.badges.iter_mut().find(|b| b.id == badge_id))
        else {
            return false;
        };

        let level_before = badge.level();
        if !badge.grant_xp(amount) {
            return false;
        }
        if badge.level() > level_before {
            info!(profile_id, badge_id, level = badge.level(), "badge levelled up");
        }
        true
    }

    /// Replace every profile, e.g. from a backup. An empty list changes nothing.
    pub fn replace_profiles(&mut self, profiles: Vec<Profile>, active_profile_id: Option<&str>) -> bool {
        if profiles.is_empty() {
            return false;
        }
        self.profiles = profiles;
        self.active_profile_id = self.resolve_active_id(active_profile_id);
        true
    }

    pub fn logout(&mut self) {
        self.active_profile_id = self.resolve_active_id(Some(DEFAULT_ACTIVE_PROFILE_ID));
    }

    fn profile_mut(&mut self, profile_id: &str) -> Option<&mut Profile> {
        self.profiles.iter_mut().find(|p| p.id == profile_id)
    }

    fn resolve_active_id(&self, requested: Option<&str>) -> String {
        requested
            .filter(|id| self.profile(id).is_some())
            .map(str::to_string)
            .or_else(|| self.profiles.first().map(|p| p.id.clone()))
            .unwrap_or_else(|| DEFAULT_ACTIVE_PROFILE_ID.to_string())
    }
}
