use crate::models::ExamAttempt;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;

/// Minimum score for an attempt to count as passed
pub const PASS_THRESHOLD: u8 = 70;

/// Aggregate view over the attempt history, recomputed on demand
#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExamStats {
    pub tests_taken: usize,
    pub passed: usize,
    pub failed: usize,
    pub average_score: u8,
}

impl ExamStats {
    pub fn from_attempts(attempts: &[ExamAttempt]) -> Self {
        let tests_taken = attempts.len();
        if tests_taken == 0 {
            return Self::default();
        }

        let passed = attempts.iter().filter(|a| is_passing(a.score)).count();
        let total: u64 = attempts.iter().map(|a| u64::from(a.score)).sum();
        let average_score = (total as f64 / tests_taken as f64).round() as u8;

        Self {
            tests_taken,
            passed,
            failed: tests_taken - passed,
            average_score,
        }
    }
}

pub fn is_passing(score: u8) -> bool {
    score >= PASS_THRESHOLD
}

#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct DailyActivity {
    pub passed: usize,
    pub failed: usize,
}

impl DailyActivity {
    pub fn total(&self) -> usize {
        self.passed + self.failed
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeeklyActivity {
    pub week_number: usize,
    pub passed: usize,
    pub failed: usize,
}

/// Passed/failed exam counts per local day for the last `days` days
pub fn daily_activity(attempts: &[ExamAttempt], days: usize) -> HashMap<NaiveDate, DailyActivity> {
    let mut daily_map: HashMap<NaiveDate, DailyActivity> = HashMap::new();
    let today = Local::now().date_naive();

    for i in 0..days {
        let date = today - chrono::Duration::days(i as i64);
        daily_map.insert(date, DailyActivity::default());
    }

    for attempt in attempts {
        let date = attempt.completed_at.date_naive();
        if let Some(activity) = daily_map.get_mut(&date) {
            if is_passing(attempt.score) {
                activity.passed += 1;
            } else {
                activity.failed += 1;
            }
        }
    }

    daily_map
}

/// Rolling seven-day buckets, oldest first, the last one ending now
pub fn weekly_activity(attempts: &[ExamAttempt], weeks: usize) -> Vec<WeeklyActivity> {
    let now = Local::now();

    (0..weeks)
        .map(|week| {
            let week_end = now - chrono::Duration::weeks((weeks - week - 1) as i64);
            let week_start = week_end - chrono::Duration::weeks(1);

            let (passed, failed) = attempts
                .iter()
                .filter(|a| a.completed_at > week_start && a.completed_at <= week_end)
                .fold((0, 0), |(passed, failed), a| {
                    if is_passing(a.score) {
                        (passed + 1, failed)
                    } else {
                        (passed, failed + 1)
                    }
                });

            WeeklyActivity {
                week_number: week + 1,
                passed,
                failed,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn attempt(score: u8, days_ago: i64) -> ExamAttempt {
        ExamAttempt {
            id: format!("exam-{}-{}", score, days_ago),
            set_id: 1,
            set_name: "Set".to_string(),
            score,
            correct_count: 0,
            total_questions: 0,
            completed_at: Local::now() - Duration::days(days_ago),
        }
    }

    #[test]
    fn test_stats_for_empty_history() {
        assert_eq!(ExamStats::from_attempts(&[]), ExamStats::default());
    }

    #[test]
    fn test_stats_pass_fail_and_average() {
        let attempts = vec![attempt(100, 0), attempt(70, 0), attempt(69, 1), attempt(0, 2)];
        let stats = ExamStats::from_attempts(&attempts);
        assert_eq!(stats.tests_taken, 4);
        assert_eq!(stats.passed, 2);
        assert_eq!(stats.failed, 2);
        // (100 + 70 + 69 + 0) / 4 = 59.75
        assert_eq!(stats.average_score, 60);
    }

    #[test]
    fn test_daily_activity_buckets() {
        let attempts = vec![attempt(90, 0), attempt(40, 0), attempt(80, 3), attempt(80, 45)];
        let daily = daily_activity(&attempts, 30);
        assert_eq!(daily.len(), 30);

        let today = Local::now().date_naive();
        assert_eq!(daily[&today], DailyActivity { passed: 1, failed: 1 });
        assert_eq!(daily[&(today - Duration::days(3))].total(), 1);
        assert_eq!(daily.values().map(DailyActivity::total).sum::<usize>(), 3);
    }

    #[test]
    fn test_weekly_activity_buckets() {
        let attempts = vec![attempt(90, 1), attempt(10, 9), attempt(75, 60)];
        let weekly = weekly_activity(&attempts, 4);
        assert_eq!(weekly.len(), 4);
        assert_eq!(weekly[3], WeeklyActivity { week_number: 4, passed: 1, failed: 0 });
        assert_eq!(weekly[2], WeeklyActivity { week_number: 3, passed: 0, failed: 1 });
        assert_eq!(weekly.iter().map(|w| w.passed + w.failed).sum::<usize>(), 2);
    }
}
