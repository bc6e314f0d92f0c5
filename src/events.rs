use crate::app::{App, ViewMode};
use crate::error::AppError;
use rat_text::event::HandleEvent;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

/// Event polling interval in milliseconds
const EVENT_POLL_INTERVAL_MS: u64 = 100;

pub fn handle_events(app: &mut App) -> Result<(), AppError> {
    if event::poll(Duration::from_millis(EVENT_POLL_INTERVAL_MS))? {
        let ev = event::read()?;
        if let Event::Key(key) = ev {
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }
            dispatch(app, &ev, key);
        }
    }
    Ok(())
}

fn dispatch(app: &mut App, ev: &Event, key: KeyEvent) {
    match app.view_mode {
        ViewMode::Menu => handle_menu_events(app, key),
        ViewMode::Exam if app.is_editing => handle_editing_events(app, ev, key),
        ViewMode::Exam => handle_exam_events(app, key),
        ViewMode::Result => handle_result_events(app, key),
        ViewMode::Report => handle_report_events(app, key),
        ViewMode::Profiles => handle_profile_events(app, key),
        ViewMode::Help => handle_help_events(app, key),
    }
}

fn handle_menu_events(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.select_previous_set(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next_set(),
        KeyCode::Enter => {
            app.start_selected_exam();
        }
        KeyCode::Char('r') => app.open_report(),
        KeyCode::Char('p') => app.open_profiles(),
        KeyCode::Char('t') => app.cycle_theme(),
        KeyCode::Char('h') => app.open_help(),
        KeyCode::Char('q') => app.should_quit = true,
        _ => {}
    }
}

fn handle_editing_events(app: &mut App, ev: &Event, key: KeyEvent) {
    // Ctrl+S rather than Shift+Enter, which most terminals do not report
    if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.next_question();
    } else if key.code == KeyCode::Esc {
        app.stop_editing();
        app.status_message = "Press 'i' to keep editing, 'n' for the next question.".to_string();
    } else {
        let _ = app.text_area_state.handle(ev, rat_text::event::Regular);
        app.sync_draft();
    }
}

fn handle_exam_events(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('i') | KeyCode::Enter => app.start_editing(),
        KeyCode::Char('n') | KeyCode::Right => app.next_question(),
        KeyCode::Char('b') | KeyCode::Left => app.previous_question(),
        KeyCode::Char('f') => app.finish_exam(),
        KeyCode::Char('x') => app.abandon_exam(),
        KeyCode::Char('r') => app.open_report(),
        KeyCode::Char('h') => app.open_help(),
        KeyCode::Char('q') => app.should_quit = true,
        _ => {}
    }
}

fn handle_result_events(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => {
            app.review_scroll = app.review_scroll.saturating_add(1);
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.review_scroll = app.review_scroll.saturating_sub(1);
        }
        KeyCode::Enter | KeyCode::Char('m') | KeyCode::Esc => app.back_to_menu(),
        KeyCode::Char('r') => app.open_report(),
        KeyCode::Char('q') => app.should_quit = true,
        _ => {}
    }
}

fn handle_report_events(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') | KeyCode::Esc => app.return_from_aux_view(),
        KeyCode::Char('q') => app.should_quit = true,
        _ => {}
    }
}

fn handle_profile_events(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.select_previous_profile(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next_profile(),
        KeyCode::Tab => app.cycle_badge(),
        KeyCode::Enter => app.switch_to_selected_profile(),
        KeyCode::Char('x') => app.grant_xp_to_selected_badge(),
        KeyCode::Char('l') => app.logout(),
        KeyCode::Char('p') | KeyCode::Esc => app.back_to_menu(),
        KeyCode::Char('q') => app.should_quit = true,
        _ => {}
    }
}

fn handle_help_events(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('h') | KeyCode::Esc => {
            app.return_from_aux_view();
            app.help_scroll = 0;
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.help_scroll = app.help_scroll.saturating_add(1);
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.help_scroll = app.help_scroll.saturating_sub(1);
        }
        KeyCode::Char('q') => app.should_quit = true,
        _ => {}
    }
}
