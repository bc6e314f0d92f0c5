use crate::app::{App, ViewMode};
use crate::exam::ExamPhase;
use crate::help;
use crate::reports;
use crate::settings::ThemeMode;
use rat_text::{HasScreenCursor, text_area::TextAreaState};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap},
};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Overlay size as percentage of screen
const OVERLAY_SIZE_PERCENT: u16 = 75;
const OVERLAY_MARGIN: u16 = 2;
/// Minimum overlay dimensions
const MIN_OVERLAY_WIDTH: u16 = 40;
const MIN_OVERLAY_HEIGHT: u16 = 10;

/// Renders the user interface widgets.
pub fn render(app: &mut App, frame: &mut Frame) {
    app.terminal_width = frame.area().width;
    app.terminal_height = frame.area().height;

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Status
        ])
        .split(frame.area());

    render_header(app, frame, main_layout[0]);

    match app.view_mode {
        ViewMode::Menu => render_menu_view(app, frame, main_layout[1]),
        ViewMode::Exam => render_exam_view(app, frame, main_layout[1]),
        ViewMode::Result => {
            render_menu_view(app, frame, main_layout[1]);
            render_result_overlay(app, frame);
        }
        ViewMode::Report => {
            reports::render_unified_report(frame, main_layout[1], app.workspace.exams.attempts())
        }
        ViewMode::Profiles => render_profiles_view(app, frame, main_layout[1]),
        ViewMode::Help => render_help_view(app, frame, main_layout[1]),
    }

    render_status_bar(app, frame, main_layout[2]);

    if app.view_mode == ViewMode::Exam
        && app.is_editing
        && let Some((cx, cy)) = app.text_area_state.screen_cursor()
    {
        frame.set_cursor_position((cx, cy));
    }
}

fn accent_colour(app: &App) -> Color {
    // The terminal gives no portable way to ask for its background, so system means dark
    match app.workspace.settings.resolved_theme(true) {
        ThemeMode::Light => Color::Blue,
        _ => Color::Cyan,
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let profile = app.workspace.profiles.active();
    let title = format!(
        " SkillNotes | {} ({}) | {} badges unlocked ",
        profile.name,
        profile.plan,
        profile.unlocked_badges()
    );
    let header = Paragraph::new(title)
        .style(Style::new().bold().fg(accent_colour(app)))
        .alignment(Alignment::Center);
    frame.render_widget(header, area);
}

fn render_menu_view(app: &App, frame: &mut Frame, area: Rect) {
    let bank = &app.workspace.bank;
    let block = Block::default()
        .title("Question sets (Enter: start exam)")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent_colour(app)));

    let inner_width = block.inner(area).width as usize;
    let mut lines = vec![Line::from("")];

    if bank.sets.is_empty() {
        lines.push(Line::from("  No question sets."));
    }
    for (i, set) in bank.sets.iter().enumerate() {
        let count = bank.questions_in_set(set.id).len();
        let marker = if i == app.selected_set { " > " } else { "   " };
        let style = if i == app.selected_set {
            Style::default().bold().fg(accent_colour(app))
        } else {
            Style::default()
        };
        let title = format!("{}{} ({} questions)", marker, set.name, count);
        lines.push(Line::from(Span::styled(truncate_to_width(&title, inner_width), style)));
        let description = format!("     {}", set.description);
        lines.push(Line::from(Span::styled(
            truncate_to_width(&description, inner_width),
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(""));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_exam_view(app: &mut App, frame: &mut Frame, area: Rect) {
    let content_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_question(app, frame, content_layout[0]);
    render_answer_input(app, frame, content_layout[1]);
}

fn render_question(app: &App, frame: &mut Frame, area: Rect) {
    let exams = &app.workspace.exams;
    let (index, total) = match exams.phase() {
        ExamPhase::InProgress { index, total } => (index, total),
        ExamPhase::NotStarted => (0, 0),
    };

    let block = Block::default()
        .title(format!(
            "{} | Question {} of {}",
            exams.current_set_name().unwrap_or_default(),
            index + 1,
            total
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner);

    let mut lines = Vec::new();
    if let Some(question) = exams.current_question() {
        lines.push(Line::from(Span::styled(
            format!("Difficulty: {}", question.difficulty.as_str()),
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(question.prompt.clone()));
    }
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), rows[0]);

    let answered = exams.answered_count();
    let ratio = if total == 0 { 0.0 } else { answered as f64 / total as f64 };
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Green))
        .label(format!("{}/{} answered", answered, total))
        .ratio(ratio.clamp(0.0, 1.0));
    frame.render_widget(gauge, rows[1]);
}

fn render_answer_input(app: &mut App, frame: &mut Frame, area: Rect) {
    clamp_textarea_scroll(&mut app.text_area_state);

    let border_style = if app.is_editing {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::Blue)
    };

    let block = Block::default()
        .title("Your answer (i: edit, Esc: stop, Ctrl+S: next)")
        .borders(Borders::ALL)
        .border_style(border_style);

    use rat_text::text_area::{TextArea, TextWrap};

    let textarea = TextArea::new()
        .block(block)
        .text_wrap(TextWrap::Word(2))
        .style(Style::default());

    frame.render_stateful_widget(textarea, area, &mut app.text_area_state);
}

/// rat-text skips drawing entirely when the offset is past the last line
fn clamp_textarea_scroll(state: &mut TextAreaState) {
    let max_v = state.len_lines().saturating_sub(1) as usize;
    if state.vscroll.offset > max_v {
        state.vscroll.offset = max_v;
    }
    state.hscroll.offset = state.hscroll.limited_offset(state.hscroll.offset);
}

fn render_result_overlay(app: &App, frame: &mut Frame) {
    let Some(review) = app.workspace.exams.latest_review() else {
        return;
    };
    let overlay_area = calculate_overlay_area(frame.area());
    frame.render_widget(Clear, overlay_area);

    let attempt = &review.attempt;
    let passed = crate::stats::is_passing(attempt.score);
    let border_color = if passed { Color::Green } else { Color::Red };

    let block = Block::default()
        .title(format!(
            " {}: {}% ({}/{}) | j/k: scroll, Enter: menu ",
            attempt.set_name, attempt.score, attempt.correct_count, attempt.total_questions
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(Color::Black));

    let mut lines = Vec::new();
    for (i, answer) in review.answers.iter().enumerate() {
        let (mark, colour) = if answer.correct {
            ("✓", Color::Green)
        } else {
            ("✗", Color::Red)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{} ", mark), Style::default().fg(colour).bold()),
            Span::styled(format!("{}. {}", i + 1, answer.prompt), Style::default().bold()),
        ]));
        let received = if answer.received.is_empty() {
            "(no answer)"
        } else {
            answer.received.as_str()
        };
        lines.push(Line::from(format!("   Your answer: {}", received)));
        lines.push(Line::from(Span::styled(
            format!("   Expected:    {}", answer.expected),
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(""));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.review_scroll, 0))
        .style(Style::default().bg(Color::Black).fg(Color::White));
    frame.render_widget(paragraph, overlay_area);
}

fn render_profiles_view(app: &App, frame: &mut Frame, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    let book = &app.workspace.profiles;
    let list_block = Block::default()
        .title("Profiles (Enter: switch)")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent_colour(app)));
    let list_width = list_block.inner(columns[0]).width as usize;

    let mut lines = Vec::new();
    for (i, profile) in book.profiles().iter().enumerate() {
        let active = if profile.id == book.active_profile_id() { "*" } else { " " };
        let marker = if i == app.selected_profile { ">" } else { " " };
        let text = format!("{}{} {} · {}", marker, active, profile.name, profile.plan);
        let style = if i == app.selected_profile {
            Style::default().bold()
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(truncate_to_width(&text, list_width), style)));
    }
    frame.render_widget(Paragraph::new(lines).block(list_block), columns[0]);

    let profile = book.active();
    let badge_block = Block::default()
        .title(format!("{}'s badges (Tab: select, x: +{} XP)", profile.name, app.xp_grant))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));
    let inner = badge_block.inner(columns[1]);
    frame.render_widget(badge_block, columns[1]);

    let mut constraints: Vec<Constraint> = profile.badges.iter().map(|_| Constraint::Length(3)).collect();
    constraints.push(Constraint::Min(0));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (i, badge) in profile.badges.iter().enumerate() {
        let progress = badge.progress();
        let selected = i == app.selected_badge;
        let title = format!(
            "{}{} {} | level {}/{} | {} XP",
            if selected { "> " } else { "" },
            badge.get_icon(),
            badge.name,
            progress.level,
            progress.max_level,
            progress.xp
        );
        let label = match progress.next_milestone {
            Some(next) => format!("{:.0}% to {} XP", progress.progress_percent, next),
            None => "max level".to_string(),
        };
        let colour = if badge.unlocked() { Color::Yellow } else { Color::DarkGray };
        let gauge = Gauge::default()
            .block(Block::default().title(title).borders(Borders::NONE))
            .gauge_style(Style::default().fg(colour))
            .label(label)
            .ratio((progress.progress_percent / 100.0).clamp(0.0, 1.0));
        frame.render_widget(gauge, rows[i]);
    }
}

fn render_help_view(app: &App, frame: &mut Frame, area: Rect) {
    let help_content = help::get_help_content();
    let help_text = if help_content.is_empty() {
        "Help file not found.\n\nCreate docs/HELP.md and rebuild.".to_string()
    } else {
        help_content.to_string()
    };

    let block = Block::default()
        .title("Help (↑/↓ or j/k: scroll, h: close)")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.help_scroll, 0));

    frame.render_widget(paragraph, area);
}

fn render_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default().borders(Borders::TOP);
    let status_text = format!(" {} | r: report | h: help | q: quit ", app.status_message);
    let paragraph = Paragraph::new(status_text)
        .alignment(Alignment::Right)
        .block(block);
    frame.render_widget(paragraph, area);
}

/// Cut `text` to at most `max_width` terminal columns, ending in `…` when shortened
fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for grapheme in text.graphemes(true) {
        let width = grapheme.width();
        if used + width + 1 > max_width {
            break;
        }
        out.push_str(grapheme);
        used += width;
    }
    out.push('…');
    out
}

fn calculate_overlay_area(full_area: Rect) -> Rect {
    let margin = OVERLAY_MARGIN;

    let max_overlay_width = full_area.width.saturating_sub(margin.saturating_mul(2));
    let max_overlay_height = full_area.height.saturating_sub(margin.saturating_mul(2));

    let overlay_width = full_area
        .width
        .saturating_mul(OVERLAY_SIZE_PERCENT)
        .saturating_div(100)
        .max(MIN_OVERLAY_WIDTH)
        .min(max_overlay_width);
    let overlay_height = full_area
        .height
        .saturating_mul(OVERLAY_SIZE_PERCENT)
        .saturating_div(100)
        .max(MIN_OVERLAY_HEIGHT)
        .min(max_overlay_height);
    let x = full_area.x + full_area.width.saturating_sub(overlay_width) / 2;
    let y = full_area.y + full_area.height.saturating_sub(overlay_height) / 2;

    Rect {
        x,
        y,
        width: overlay_width,
        height: overlay_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppStore;
    use crate::storage::MemoryStore;
    use crate::workspace::Workspace;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_calculate_overlay_area_standard() {
        let overlay = calculate_overlay_area(Rect::new(0, 0, 100, 40));
        assert_eq!(overlay.width, 75);
        assert_eq!(overlay.height, 30);
        assert_eq!(overlay.x, 12); // (100 - 75) / 2 = 12.5 -> 12
        assert_eq!(overlay.y, 5);
    }

    #[test]
    fn test_calculate_overlay_area_min_size_constraint() {
        // Minimums lose to the margin ring on a tiny screen
        let overlay = calculate_overlay_area(Rect::new(0, 0, 40, 10));
        assert_eq!(overlay.width, 36);
        assert_eq!(overlay.height, 6);
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("React Basics", 20), "React Basics");
        assert_eq!(truncate_to_width("React Basics", 6), "React…");
        assert_eq!(truncate_to_width("日本語テキスト", 7), "日本語…");
        assert_eq!(truncate_to_width("anything", 0), "");
    }

    #[test]
    fn test_render_every_view() {
        let store: AppStore = Box::new(MemoryStore::new());
        let mut app = App::new(Workspace::open(store));
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();

        for mode in [
            ViewMode::Menu,
            ViewMode::Report,
            ViewMode::Profiles,
            ViewMode::Help,
        ] {
            app.view_mode = mode;
            terminal.draw(|frame| render(&mut app, frame)).unwrap();
        }

        app.view_mode = ViewMode::Menu;
        assert!(app.start_selected_exam());
        terminal.draw(|frame| render(&mut app, frame)).unwrap();
        app.finish_exam();
        assert_eq!(app.view_mode, ViewMode::Result);
        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        let buffer = terminal.backend().buffer().clone();
        let text: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(text.contains("React Basics"));
    }
}
