use crate::models::create_id;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::info;

/// Events kept in the log, newest first
pub const MAX_EVENT_LOG_ITEMS: usize = 100;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GrowthEvent {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub payload: Value,
    pub created_at: DateTime<Local>,
}

/// Local usage-event log with per-name counters
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct GrowthLog {
    #[serde(default)]
    pub counters: BTreeMap<String, u64>,
    #[serde(default)]
    pub events: Vec<GrowthEvent>,
}

impl GrowthLog {
    /// Rebuild a log from loosely-typed JSON, dropping anything malformed
    pub fn from_value(value: &Value) -> Self {
        let Some(fields) = value.as_object() else {
            return Self::default();
        };

        let counters = fields
            .get("counters")
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .filter_map(|(name, count)| count.as_u64().map(|c| (name.clone(), c)))
                    .collect()
            })
            .unwrap_or_default();

        let events = fields
            .get("events")
            .and_then(Value::as_array)
            .map(|events| {
                events
                    .iter()
                    .filter_map(|e| serde_json::from_value::<GrowthEvent>(e.clone()).ok())
                    .take(MAX_EVENT_LOG_ITEMS)
                    .collect()
            })
            .unwrap_or_default();

        Self { counters, events }
    }

    /// Record an event. Empty names are ignored.
    pub fn track(&mut self, name: &str, payload: Value) -> bool {
        if name.is_empty() {
            return false;
        }

        info!(event = name, %payload, "growth event");
        *self.counters.entry(name.to_string()).or_insert(0) += 1;
        self.events.insert(
            0,
            GrowthEvent {
                id: create_id(name),
                name: name.to_string(),
                payload,
                created_at: Local::now(),
            },
        );
        self.events.truncate(MAX_EVENT_LOG_ITEMS);
        true
    }

    pub fn count(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_track_counts_and_prepends() {
        let mut log = GrowthLog::default();
        assert!(log.track("exam_started", json!({ "setId": 1 })));
        assert!(log.track("exam_completed", json!({ "score": 80 })));
        assert!(log.track("exam_started", Value::Null));
        assert!(!log.track("", Value::Null));

        assert_eq!(log.count("exam_started"), 2);
        assert_eq!(log.count("exam_completed"), 1);
        assert_eq!(log.count("unknown"), 0);
        assert_eq!(log.events.len(), 3);
        assert_eq!(log.events[0].name, "exam_started");
        assert_eq!(log.events[1].payload, json!({ "score": 80 }));
    }

    #[test]
    fn test_log_is_bounded() {
        let mut log = GrowthLog::default();
        for _ in 0..(MAX_EVENT_LOG_ITEMS + 25) {
            log.track("badge_xp_earned", Value::Null);
        }
        assert_eq!(log.events.len(), MAX_EVENT_LOG_ITEMS);
        assert_eq!(log.count("badge_xp_earned"), (MAX_EVENT_LOG_ITEMS + 25) as u64);
    }

    #[test]
    fn test_from_value_tolerates_garbage() {
        assert_eq!(GrowthLog::from_value(&json!(null)), GrowthLog::default());

        let log = GrowthLog::from_value(&json!({
            "counters": { "exam_started": 4, "bad": "x" },
            "events": [
                { "id": "e1", "name": "exam_started", "createdAt": "2026-03-01T08:00:00Z" },
                { "name": "missing fields" }
            ]
        }));
        assert_eq!(log.count("exam_started"), 4);
        assert_eq!(log.count("bad"), 0);
        assert_eq!(log.events.len(), 1);
        assert_eq!(log.events[0].payload, Value::Null);
    }
}
