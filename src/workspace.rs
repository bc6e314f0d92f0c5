use crate::backup::{BACKUP_VERSION, BackupDocument, ImportReport, export_json, parse_backup};
use crate::error::{ImportError, StoreError};
use crate::exam::{Advance, ExamEngine};
use crate::growth::GrowthLog;
use crate::profiles::{ProfileBook, ProfileUpdate};
use crate::question_bank::{NewQuestion, QuestionBank};
use crate::settings::{Settings, ThemeMode};
use crate::storage::{KeyValueStore, Persistence};
use chrono::Local;
use serde_json::json;
use tracing::{info, warn};

/// Every study record held in memory, wired to its persistence.
///
/// Mutations go through here so that each change is written back. A failed write
/// is logged and the workspace keeps running on its in-memory state.
pub struct Workspace<S: KeyValueStore> {
    persistence: Persistence<S>,
    pub profiles: ProfileBook,
    pub bank: QuestionBank,
    pub exams: ExamEngine,
    pub settings: Settings,
    pub growth: GrowthLog,
}

impl<S: KeyValueStore> Workspace<S> {
    pub fn open(store: S) -> Self {
        let persistence = Persistence::new(store);
        let profiles = ProfileBook::new(
            persistence.load_profiles(),
            persistence.load_active_profile_id().as_deref(),
        );
        let bank = persistence.load_question_bank();
        let exams = ExamEngine::new(persistence.load_exam_attempts());
        let settings = persistence.load_settings();
        let growth = persistence.load_growth_log();

        info!(
            profiles = profiles.profiles().len(),
            sets = bank.sets.len(),
            attempts = exams.attempts().len(),
            "workspace loaded"
        );

        Self {
            persistence,
            profiles,
            bank,
            exams,
            settings,
            growth,
        }
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    pub fn start_exam(&mut self, set_id: u64) -> bool {
        if !self.exams.start_exam(&self.bank, set_id) {
            return false;
        }
        self.growth.track("exam_started", json!({ "setId": set_id }));
        self.save_growth();
        true
    }

    /// Move forward in the running exam, recording the attempt when it finishes
    pub fn advance_exam(&mut self) -> Option<Advance> {
        let step = self.exams.advance()?;
        if let Advance::Finished(attempt) = &step {
            self.growth.track(
                "exam_completed",
                json!({ "setId": attempt.set_id, "score": attempt.score }),
            );
            self.save_attempts();
            self.save_growth();
        }
        Some(step)
    }

    pub fn finish_exam(&mut self) -> bool {
        match self.exams.finalize() {
            Some(attempt) => {
                self.growth.track(
                    "exam_completed",
                    json!({ "setId": attempt.set_id, "score": attempt.score }),
                );
                self.save_attempts();
                self.save_growth();
                true
            }
            None => false,
        }
    }

    pub fn switch_profile(&mut self, profile_id: &str) -> bool {
        if !self.profiles.switch_profile(profile_id) {
            return false;
        }
        self.save_active_profile();
        true
    }

    pub fn logout(&mut self) {
        self.profiles.logout();
        self.save_active_profile();
    }

    /// Grant XP to a badge of the active profile
    pub fn grant_active_xp(&mut self, badge_id: &str, amount: i64) -> bool {
        let profile_id = self.profiles.active_profile_id().to_string();
        if !self.profiles.grant_xp(&profile_id, badge_id, amount) {
            return false;
        }
        self.growth.track(
            "badge_xp_earned",
            json!({ "profileId": profile_id, "badgeId": badge_id, "amount": amount }),
        );
        self.save_profiles();
        self.save_growth();
        true
    }

    pub fn update_profile(&mut self, profile_id: &str, update: ProfileUpdate) -> bool {
        let updated = self.profiles.update_profile(profile_id, update);
        if updated {
            self.save_profiles();
        }
        updated
    }

    pub fn add_achievement(&mut self, title: &str, description: &str) -> bool {
        let profile_id = self.profiles.active_profile_id().to_string();
        let added = self.profiles.add_achievement(&profile_id, title, description);
        if added {
            self.save_profiles();
        }
        added
    }

    pub fn add_badge(&mut self, name: &str, description: &str) -> Option<String> {
        let profile_id = self.profiles.active_profile_id().to_string();
        let badge_id = self.profiles.add_badge(&profile_id, name, description)?;
        self.save_profiles();
        Some(badge_id)
    }

    pub fn create_set(&mut self, name: &str, description: &str) -> Option<u64> {
        let set_id = self.bank.create_set(name, description)?;
        self.save_question_bank();
        Some(set_id)
    }

    pub fn add_question(&mut self, draft: NewQuestion) -> Option<u64> {
        let question_id = self.bank.add_question(draft)?;
        self.save_question_bank();
        Some(question_id)
    }

    pub fn update_question(&mut self, question_id: u64, draft: NewQuestion) -> bool {
        let updated = self.bank.update_question(question_id, draft);
        if updated {
            self.save_question_bank();
        }
        updated
    }

    pub fn delete_question(&mut self, question_id: u64) -> bool {
        let deleted = self.bank.delete_question(question_id);
        if deleted {
            self.save_question_bank();
        }
        deleted
    }

    pub fn set_theme_mode(&mut self, mode: ThemeMode) {
        let mut settings = self.settings;
        settings.set_theme_mode(mode);
        self.set_settings(settings);
    }

    pub fn set_notifications_enabled(&mut self, enabled: bool) {
        let mut settings = self.settings;
        settings.set_notifications_enabled(enabled);
        self.set_settings(settings);
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
        if let Err(e) = self.persistence.save_settings(&self.settings) {
            warn_write_failure("settings", &e);
        }
    }

    pub fn save_question_bank(&mut self) {
        if let Err(e) = self.persistence.save_question_bank(&self.bank) {
            warn_write_failure("question bank", &e);
        }
    }

    pub fn export_backup(&self) -> Result<String, serde_json::Error> {
        let document = BackupDocument {
            version: BACKUP_VERSION,
            exported_at: Local::now(),
            profiles: self.profiles.profiles(),
            active_profile_id: self.profiles.active_profile_id(),
            question_bank: &self.bank,
            exam_attempts: self.exams.attempts(),
            settings: &self.settings,
        };
        export_json(&document)
    }

    /// Apply the valid sections of a backup. On error nothing changes.
    pub fn import_backup(&mut self, raw: &str) -> Result<ImportReport, ImportError> {
        let sections = parse_backup(raw)?;
        let mut report = ImportReport::default();

        if let Some((profiles, active_id)) = sections.profiles {
            let count = profiles.len();
            if self.profiles.replace_profiles(profiles, active_id.as_deref()) {
                report.profiles = Some(count);
                self.save_profiles();
                self.save_active_profile();
            }
        }

        if let Some(bank) = sections.question_bank {
            report.question_sets = Some(bank.sets.len());
            self.bank = bank;
            self.save_question_bank();
        }

        if let Some(attempts) = sections.exam_attempts {
            report.exam_attempts = Some(attempts.len());
            self.exams.replace_attempts(attempts);
            self.save_attempts();
        }

        if let Some(incoming) = sections.settings {
            let mut settings = self.settings;
            settings.merge_from(&incoming);
            self.set_settings(settings);
            report.settings = true;
        }

        info!(applied = %report.summary(), "backup imported");
        self.growth.track("backup_imported", json!({ "applied": report.summary() }));
        self.save_growth();
        Ok(report)
    }

    fn save_profiles(&mut self) {
        if let Err(e) = self.persistence.save_profiles(self.profiles.profiles()) {
            warn_write_failure("profiles", &e);
        }
    }

    fn save_active_profile(&mut self) {
        let active_id = self.profiles.active_profile_id().to_string();
        if let Err(e) = self.persistence.save_active_profile_id(&active_id) {
            warn_write_failure("active profile", &e);
        }
    }

    fn save_attempts(&mut self) {
        if let Err(e) = self.persistence.save_exam_attempts(self.exams.attempts()) {
            warn_write_failure("exam attempts", &e);
        }
    }

    fn save_growth(&mut self) {
        if let Err(e) = self.persistence.save_growth_log(&self.growth) {
            warn_write_failure("growth log", &e);
        }
    }
}

fn warn_write_failure(record: &str, error: &StoreError) {
    warn!(record, error = %error, "failed to save, continuing in memory");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{EXAM_ATTEMPTS_KEY, MemoryStore, PROFILES_KEY};
    use serde_json::Value;

    fn workspace() -> Workspace<MemoryStore> {
        Workspace::open(MemoryStore::new())
    }

    fn finish_default_exam(ws: &mut Workspace<MemoryStore>, answer: &str) {
        assert!(ws.start_exam(1));
        ws.exams.set_draft(answer);
        assert!(matches!(ws.advance_exam(), Some(Advance::Finished(_))));
    }

    #[test]
    fn test_finished_exam_is_persisted() {
        let mut ws = workspace();
        finish_default_exam(
            &mut ws,
            "It handles side effects after render like fetches",
        );

        let attempt = &ws.exams.attempts()[0];
        assert_eq!(attempt.score, 100);
        assert_eq!(ws.growth.count("exam_started"), 1);
        assert_eq!(ws.growth.count("exam_completed"), 1);

        let stored = ws.persistence().store().get(EXAM_ATTEMPTS_KEY).unwrap();
        let value: Value = serde_json::from_str(stored).unwrap();
        assert_eq!(value[0]["score"], 100);
        assert!(value[0].get("details").is_none());
    }

    #[test]
    fn test_reopen_restores_state() {
        let mut ws = workspace();
        finish_default_exam(&mut ws, "wrong");
        assert!(ws.switch_profile("p2"));
        assert!(ws.grant_active_xp("focus", 130));

        let reopened = Workspace::open(ws.persistence().store().clone());
        assert_eq!(reopened.exams.attempts().len(), 1);
        assert_eq!(reopened.exams.attempts()[0].score, 0);
        assert_eq!(reopened.profiles.active().name, "Jamie");
        let focus = reopened.profiles.active().badge("focus").unwrap();
        assert_eq!(focus.xp(), 130);
        assert_eq!(focus.level(), 1);
    }

    #[test]
    fn test_invalid_grants_are_ignored() {
        let mut ws = workspace();
        assert!(!ws.grant_active_xp("focus", 0));
        assert!(!ws.grant_active_xp("nope", 10));
        assert!(ws.persistence().store().get(PROFILES_KEY).is_none());
        assert_eq!(ws.growth.count("badge_xp_earned"), 0);
    }

    #[test]
    fn test_import_with_bad_bank_updates_profiles_only() {
        let mut ws = workspace();
        ws.bank.create_set("Keep me", "");
        let bank_before = ws.bank.clone();

        let raw = serde_json::json!({
            "profiles": [{ "id": "n1", "name": "Nova" }],
            "activeProfileId": "n1",
            "questionBank": { "sets": null }
        })
        .to_string();

        let report = ws.import_backup(&raw).unwrap();
        assert_eq!(report.profiles, Some(1));
        assert_eq!(report.question_sets, None);
        assert_eq!(ws.profiles.active().name, "Nova");
        assert_eq!(ws.bank, bank_before);
    }

    #[test]
    fn test_failed_import_changes_nothing() {
        let mut ws = workspace();
        finish_default_exam(&mut ws, "x");
        let profiles_before = ws.profiles.clone();

        assert!(ws.import_backup("not json at all").is_err());
        assert!(ws.import_backup(r#"["profiles"]"#).is_err());
        assert_eq!(ws.profiles, profiles_before);
        assert_eq!(ws.exams.attempts().len(), 1);
        assert_eq!(ws.growth.count("backup_imported"), 0);
    }

    #[test]
    fn test_export_then_import_round_trip() {
        let mut source = workspace();
        finish_default_exam(&mut source, "no idea");
        source.switch_profile("p4");
        source.grant_active_xp("accuracy", 700);
        source.set_settings(Settings {
            theme_mode: ThemeMode::Dark,
            notifications_enabled: false,
        });
        let exported = source.export_backup().unwrap();

        let mut target = workspace();
        let report = target.import_backup(&exported).unwrap();
        assert_eq!(report.profiles, Some(4));
        assert_eq!(report.question_sets, Some(2));
        assert_eq!(report.exam_attempts, Some(1));
        assert!(report.settings);

        assert_eq!(target.profiles.active_profile_id(), "p4");
        assert_eq!(target.profiles.active().badge("accuracy").unwrap().level(), 3);
        assert_eq!(target.exams.attempts(), source.exams.attempts());
        assert_eq!(target.settings.theme_mode, ThemeMode::Dark);
        assert!(!target.settings.notifications_enabled);
    }

    #[test]
    fn test_bank_and_profile_edits_are_saved() {
        use crate::models::Difficulty;
        use crate::storage::QUESTION_BANK_KEY;

        let mut ws = workspace();
        let set_id = ws.create_set("Rust", "Ownership").unwrap();
        let question_id = ws
            .add_question(NewQuestion {
                set_id,
                prompt: "Who frees a Box?".to_string(),
                answer: "Its owner when it goes out of scope".to_string(),
                difficulty: Difficulty::Hard,
            })
            .unwrap();
        assert!(ws.persistence().store().get(QUESTION_BANK_KEY).is_some());
        assert!(ws.add_badge("Rustacean", "").is_some());
        assert!(ws.add_achievement("First set", "Created a question set"));
        assert!(ws.update_profile(
            "p1",
            ProfileUpdate {
                plan: Some("Team Plan".to_string()),
                ..ProfileUpdate::default()
            }
        ));
        ws.set_notifications_enabled(false);

        let mut reopened = Workspace::open(ws.persistence().store().clone());
        assert_eq!(reopened.bank.set_name(set_id), "Rust");
        assert_eq!(reopened.profiles.active().plan, "Team Plan");
        assert_eq!(reopened.profiles.active().badges.len(), 4);
        assert_eq!(reopened.profiles.active().achievements[0].title, "First set");
        assert!(!reopened.settings.notifications_enabled);

        assert!(reopened.delete_question(question_id));
        assert!(!reopened.delete_question(question_id));
        assert!(!reopened.start_exam(set_id));
    }

    #[test]
    fn test_logout_persists_default_profile() {
        let mut ws = workspace();
        ws.switch_profile("p3");
        ws.logout();
        let reopened = Workspace::open(ws.persistence().store().clone());
        assert_eq!(reopened.profiles.active_profile_id(), "p1");
    }
}
