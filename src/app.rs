use crate::config::DEFAULT_XP_GRANT;
use crate::exam::{Advance, ExamPhase};
use crate::storage::KeyValueStore;
use crate::workspace::Workspace;
use rat_text::text_area::{TextAreaState, TextWrap};

/// Store type the interactive app runs on, chosen at startup
pub type AppStore = Box<dyn KeyValueStore>;

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum ViewMode {
    Menu,
    Exam,
    Result,
    Report,
    Profiles,
    Help,
}

const MENU_STATUS: &str = "Select a question set and press Enter to start";
const EXAM_STATUS: &str = "Press 'i' to answer, Ctrl+S to save and continue";

/// Application state
pub struct App {
    pub workspace: Workspace<AppStore>,
    pub view_mode: ViewMode,
    pub status_message: String,
    pub should_quit: bool,
    pub is_editing: bool,
    pub text_area_state: TextAreaState,
    pub selected_set: usize,
    pub selected_profile: usize,
    pub selected_badge: usize,
    pub xp_grant: i64,
    pub review_scroll: u16,
    pub help_scroll: u16,
    pub terminal_width: u16,
    pub terminal_height: u16,
}

impl App {
    pub fn new(workspace: Workspace<AppStore>) -> Self {
        let selected_profile = workspace
            .profiles
            .profiles()
            .iter()
            .position(|p| p.id == workspace.profiles.active_profile_id())
            .unwrap_or(0);

        Self {
            workspace,
            view_mode: ViewMode::Menu,
            status_message: MENU_STATUS.to_string(),
            should_quit: false,
            is_editing: false,
            text_area_state: Self::new_text_area_state(),
            selected_set: 0,
            selected_profile,
            selected_badge: 0,
            xp_grant: DEFAULT_XP_GRANT,
            review_scroll: 0,
            help_scroll: 0,
            terminal_width: 100, // Default, will be updated on first render
            terminal_height: 30, // Default, will be updated on first render
        }
    }

    pub fn with_xp_grant(mut self, xp_grant: i64) -> Self {
        self.xp_grant = xp_grant;
        self
    }

    pub fn new_text_area_state() -> TextAreaState {
        let mut state = TextAreaState::default();
        state.set_text_wrap(TextWrap::Word(2));
        state
    }

    pub fn selected_set_id(&self) -> Option<u64> {
        self.workspace.bank.sets.get(self.selected_set).map(|s| s.id)
    }

    pub fn select_next_set(&mut self) {
        if self.selected_set + 1 < self.workspace.bank.sets.len() {
            self.selected_set += 1;
        }
    }

    pub fn select_previous_set(&mut self) {
        self.selected_set = self.selected_set.saturating_sub(1);
    }

    pub fn start_selected_exam(&mut self) -> bool {
        let Some(set_id) = self.selected_set_id() else {
            return false;
        };
        if !self.workspace.start_exam(set_id) {
            self.status_message = "This set has no questions yet.".to_string();
            return false;
        }
        self.view_mode = ViewMode::Exam;
        self.load_draft_into_editor();
        self.status_message = EXAM_STATUS.to_string();
        true
    }

    /// Copy the editor contents into the running session
    pub fn sync_draft(&mut self) {
        let text = self.text_area_state.value().to_string();
        self.workspace.exams.set_draft(&text);
    }

    pub fn next_question(&mut self) {
        self.sync_draft();
        match self.workspace.advance_exam() {
            Some(Advance::Moved(_)) => self.load_draft_into_editor(),
            Some(Advance::Finished(attempt)) => {
                self.show_result(attempt.score, attempt.correct_count, attempt.total_questions)
            }
            None => {}
        }
    }

    pub fn previous_question(&mut self) {
        self.sync_draft();
        if self.workspace.exams.retreat() {
            self.load_draft_into_editor();
        }
    }

    pub fn finish_exam(&mut self) {
        self.sync_draft();
        if self.workspace.finish_exam()
            && let Some(review) = self.workspace.exams.latest_review()
        {
            let attempt = &review.attempt;
            let (score, correct, total) =
                (attempt.score, attempt.correct_count, attempt.total_questions);
            self.show_result(score, correct, total);
        }
    }

    pub fn abandon_exam(&mut self) {
        self.workspace.exams.abandon();
        self.stop_editing();
        self.text_area_state = Self::new_text_area_state();
        self.view_mode = ViewMode::Menu;
        self.status_message = "Exam abandoned.".to_string();
    }

    pub fn start_editing(&mut self) {
        self.is_editing = true;
        self.text_area_state.focus.set(true);
        self.text_area_state.scroll_cursor_to_visible();
        self.status_message = "Editing. Esc: stop editing, Ctrl+S: save and continue".to_string();
    }

    pub fn stop_editing(&mut self) {
        self.is_editing = false;
        self.text_area_state.focus.set(false);
        self.sync_draft();
    }

    fn load_draft_into_editor(&mut self) {
        let draft = self.workspace.exams.draft().unwrap_or_default().to_string();
        self.text_area_state = Self::new_text_area_state();
        self.text_area_state.set_text(draft.as_str());
        if self.is_editing {
            self.text_area_state.focus.set(true);
        }
    }

    fn show_result(&mut self, score: u8, correct: usize, total: usize) {
        self.is_editing = false;
        self.text_area_state = Self::new_text_area_state();
        self.review_scroll = 0;
        self.view_mode = ViewMode::Result;
        self.status_message = format!("Score {}% ({} of {} correct)", score, correct, total);
    }

    pub fn back_to_menu(&mut self) {
        self.view_mode = ViewMode::Menu;
        self.status_message = MENU_STATUS.to_string();
    }

    pub fn open_profiles(&mut self) {
        self.view_mode = ViewMode::Profiles;
        self.selected_badge = 0;
        self.status_message = "Enter: switch profile, x: grant XP, l: log out".to_string();
    }

    pub fn select_next_profile(&mut self) {
        if self.selected_profile + 1 < self.workspace.profiles.profiles().len() {
            self.selected_profile += 1;
        }
    }

    pub fn select_previous_profile(&mut self) {
        self.selected_profile = self.selected_profile.saturating_sub(1);
    }

    pub fn cycle_badge(&mut self) {
        let count = self.workspace.profiles.active().badges.len();
        if count > 0 {
            self.selected_badge = (self.selected_badge + 1) % count;
        }
    }

    pub fn switch_to_selected_profile(&mut self) {
        let Some(profile_id) = self
            .workspace
            .profiles
            .profiles()
            .get(self.selected_profile)
            .map(|p| p.id.clone())
        else {
            return;
        };
        if self.workspace.switch_profile(&profile_id) {
            self.selected_badge = 0;
            self.status_message = format!("Active profile: {}", self.workspace.profiles.active().name);
        }
    }

    pub fn grant_xp_to_selected_badge(&mut self) {
        let Some(badge_id) = self
            .workspace
            .profiles
            .active()
            .badges
            .get(self.selected_badge)
            .map(|b| b.id.clone())
        else {
            return;
        };

        if self.workspace.grant_active_xp(&badge_id, self.xp_grant) {
            if let Some(badge) = self.workspace.profiles.active().badge(&badge_id) {
                self.status_message = format!(
                    "+{} XP to {} (level {}, {} XP)",
                    self.xp_grant,
                    badge.name,
                    badge.level(),
                    badge.xp()
                );
            }
        } else {
            self.status_message = "XP grant ignored.".to_string();
        }
    }

    pub fn logout(&mut self) {
        self.workspace.logout();
        let active_id = self.workspace.profiles.active_profile_id().to_string();
        self.selected_profile = self
            .workspace
            .profiles
            .profiles()
            .iter()
            .position(|p| p.id == active_id)
            .unwrap_or(0);
        self.selected_badge = 0;
        self.status_message = format!("Logged out. Active profile: {}", self.workspace.profiles.active().name);
    }

    pub fn cycle_theme(&mut self) {
        let mode = self.workspace.settings.theme_mode.next();
        self.workspace.set_theme_mode(mode);
        self.status_message = format!("Theme: {}", mode.as_str());
    }

    pub fn open_report(&mut self) {
        self.view_mode = ViewMode::Report;
        self.status_message = "Report. Press 'r' to close.".to_string();
    }

    pub fn open_help(&mut self) {
        self.view_mode = ViewMode::Help;
        self.help_scroll = 0;
        self.status_message = "Help. Press 'h' to close.".to_string();
    }

    /// Return to the exam when one is running, otherwise to the set menu
    pub fn return_from_aux_view(&mut self) {
        if matches!(self.workspace.exams.phase(), ExamPhase::InProgress { .. }) {
            self.view_mode = ViewMode::Exam;
            self.status_message = EXAM_STATUS.to_string();
        } else {
            self.back_to_menu();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn app() -> App {
        let store: AppStore = Box::new(MemoryStore::new());
        App::new(Workspace::open(store))
    }

    fn type_answer(app: &mut App, text: &str) {
        app.text_area_state.set_text(text);
    }

    #[test]
    fn test_exam_flow_reaches_result() {
        let mut app = app();
        assert!(app.start_selected_exam());
        assert_eq!(app.view_mode, ViewMode::Exam);

        type_answer(&mut app, "It handles side effects after render");
        app.next_question();

        assert_eq!(app.view_mode, ViewMode::Result);
        assert_eq!(app.workspace.exams.attempts().len(), 1);
        assert_eq!(app.workspace.exams.attempts()[0].score, 100);
        assert!(app.status_message.contains("100%"));
    }

    #[test]
    fn test_finish_early_grades_unanswered() {
        let mut app = app();
        app.select_next_set();
        assert!(app.start_selected_exam());
        app.finish_exam();

        assert_eq!(app.view_mode, ViewMode::Result);
        let review = app.workspace.exams.latest_review().unwrap();
        assert_eq!(review.attempt.set_name, "JavaScript Logic");
        assert_eq!(review.attempt.score, 0);
        assert!(!review.answers[0].correct);
    }

    #[test]
    fn test_abandon_records_nothing() {
        let mut app = app();
        app.start_selected_exam();
        type_answer(&mut app, "half an answer");
        app.abandon_exam();
        assert_eq!(app.view_mode, ViewMode::Menu);
        assert!(app.workspace.exams.attempts().is_empty());
    }

    #[test]
    fn test_aux_view_returns_to_running_exam() {
        let mut app = app();
        app.open_help();
        app.return_from_aux_view();
        assert_eq!(app.view_mode, ViewMode::Menu);

        app.start_selected_exam();
        app.open_report();
        app.return_from_aux_view();
        assert_eq!(app.view_mode, ViewMode::Exam);
    }

    #[test]
    fn test_set_selection_is_bounded() {
        let mut app = app();
        app.select_previous_set();
        assert_eq!(app.selected_set_id(), Some(1));
        for _ in 0..5 {
            app.select_next_set();
        }
        assert_eq!(app.selected_set_id(), Some(2));
    }

    #[test]
    fn test_profile_switch_and_xp_grant() {
        let mut app = app().with_xp_grant(130);
        app.open_profiles();
        app.select_next_profile();
        app.switch_to_selected_profile();
        assert_eq!(app.workspace.profiles.active().name, "Jamie");

        app.cycle_badge();
        app.grant_xp_to_selected_badge();
        let accuracy = app.workspace.profiles.active().badge("accuracy").unwrap();
        assert_eq!(accuracy.level(), 1);
        assert!(app.status_message.contains("level 1"));

        // Other profiles untouched
        let alex = app.workspace.profiles.profile("p1").unwrap();
        assert!(alex.badges.iter().all(|b| b.xp() == 0));

        app.logout();
        assert_eq!(app.workspace.profiles.active_profile_id(), "p1");
        assert_eq!(app.selected_profile, 0);
    }

    #[test]
    fn test_cycle_theme_persists() {
        let mut app = app();
        app.cycle_theme();
        assert_eq!(app.status_message, "Theme: light");
        app.cycle_theme();
        assert_eq!(app.workspace.settings.theme_mode.as_str(), "dark");
    }
}
