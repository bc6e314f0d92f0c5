use crate::models::ExamAttempt;
use crate::stats::{DailyActivity, ExamStats, PASS_THRESHOLD, WeeklyActivity, daily_activity, weekly_activity};
use chrono::{Datelike, Local, NaiveDate};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};
use std::collections::HashMap;

const DAYS_IN_MONTH: usize = 30;
const WEEKS_TO_SHOW: usize = 4;
const RECENT_ATTEMPTS: usize = 5;

/// Summary, 30-day heatmap and 4-week bars in one view
pub fn render_unified_report(frame: &mut Frame, area: Rect, attempts: &[ExamAttempt]) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(RECENT_ATTEMPTS as u16 + 6), Constraint::Min(0)])
        .split(area);

    render_summary(frame, rows[0], attempts);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    render_monthly_report(frame, columns[0], attempts);
    render_weekly_report(frame, columns[1], attempts);
}

fn render_summary(frame: &mut Frame, area: Rect, attempts: &[ExamAttempt]) {
    let stats = ExamStats::from_attempts(attempts);

    let block = Block::default()
        .title("Performance summary (r: close)")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Tests taken: ", Style::default().bold()),
            Span::raw(stats.tests_taken.to_string()),
            Span::raw("   "),
            Span::styled("Passed: ", Style::default().bold()),
            Span::styled(stats.passed.to_string(), Style::default().fg(Color::Green)),
            Span::raw("   "),
            Span::styled("Failed: ", Style::default().bold()),
            Span::styled(stats.failed.to_string(), Style::default().fg(Color::Red)),
            Span::raw("   "),
            Span::styled("Average: ", Style::default().bold()),
            Span::raw(format!("{}%", stats.average_score)),
        ]),
        Line::from(""),
    ];

    if attempts.is_empty() {
        lines.push(Line::from("No exams yet. Pick a set from the menu to take one."));
    }
    for attempt in attempts.iter().take(RECENT_ATTEMPTS) {
        let colour = score_colour(attempt.score);
        lines.push(Line::from(vec![
            Span::raw(format!("{}  ", attempt.completed_at.format("%Y-%m-%d %H:%M"))),
            Span::styled(format!("{:>3}%", attempt.score), Style::default().fg(colour)),
            Span::raw(format!(
                "  {}/{}  {}",
                attempt.correct_count, attempt.total_questions, attempt.set_name
            )),
        ]));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

pub fn render_monthly_report(frame: &mut Frame, area: Rect, attempts: &[ExamAttempt]) {
    let daily = daily_activity(attempts, DAYS_IN_MONTH);

    let block = Block::default()
        .title("Last 30 days")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Paragraph::new(create_heatmap(&daily, Local::now().date_naive())), inner);
}

pub fn render_weekly_report(frame: &mut Frame, area: Rect, attempts: &[ExamAttempt]) {
    let weekly = weekly_activity(attempts, WEEKS_TO_SHOW);

    let block = Block::default()
        .title("Last 4 weeks")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));

    let inner = block.inner(area);
    frame.render_widget(block, area);
    let chart = create_bar_chart(&weekly, inner.width as usize);
    frame.render_widget(Paragraph::new(chart), inner);
}

fn score_colour(score: u8) -> Color {
    if score >= PASS_THRESHOLD {
        Color::Green
    } else if score >= PASS_THRESHOLD / 2 {
        Color::Yellow
    } else {
        Color::Red
    }
}

/// Heatmap cell for one day: empty, all failed, mixed, or all passed by volume
fn activity_cell(activity: Option<&DailyActivity>) -> (&'static str, Style) {
    let Some(activity) = activity else {
        return ("□", Style::default().fg(Color::DarkGray));
    };
    match (activity.total(), activity.passed) {
        (0, _) => ("□", Style::default().fg(Color::DarkGray)),
        (_, 0) => ("■", Style::default().fg(Color::Red)),
        (t, p) if p == t => {
            if t >= 5 {
                ("■", Style::default().fg(Color::Green).bold())
            } else if t >= 3 {
                ("■", Style::default().fg(Color::Green))
            } else {
                ("■", Style::default().fg(Color::LightGreen))
            }
        }
        (t, p) => {
            let ratio = p as f64 / t as f64;
            if ratio >= 0.7 {
                ("■", Style::default().fg(Color::LightGreen))
            } else {
                ("■", Style::default().fg(Color::Yellow))
            }
        }
    }
}

fn create_heatmap(daily: &HashMap<NaiveDate, DailyActivity>, today: NaiveDate) -> Text<'static> {
    let mut lines = Vec::new();
    let rows = DAYS_IN_MONTH.div_ceil(7);

    // Columns count back from today, newest on the left of each row
    let mut header = vec![Span::raw("    ")];
    for offset in 0..7 {
        header.push(Span::raw(format!(" {} ", offset)));
    }
    lines.push(Line::from(header));

    for row in 0..rows {
        let week_offset = rows - row - 1;
        let week_date = today - chrono::Duration::days((week_offset * 7) as i64);
        let mut spans = vec![Span::raw(format!("W{:02} ", week_date.iso_week().week()))];

        for col in 0..7 {
            let days_ago = week_offset * 7 + col;
            if days_ago >= DAYS_IN_MONTH {
                spans.push(Span::raw("   "));
                continue;
            }
            let date = today - chrono::Duration::days(days_ago as i64);
            let (symbol, style) = activity_cell(daily.get(&date));
            spans.push(Span::styled(format!(" {} ", symbol), style));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("□", Style::default().fg(Color::DarkGray)),
        Span::raw(" none  "),
        Span::styled("■", Style::default().fg(Color::Red)),
        Span::raw(" failed  "),
        Span::styled("■", Style::default().fg(Color::Yellow)),
        Span::raw(" mixed  "),
        Span::styled("■", Style::default().fg(Color::Green)),
        Span::raw(" passed"),
    ]));

    Text::from(lines)
}

/// Length of a bar for `value` scaled so that `max_value` fills `width`
fn bar_length(value: usize, max_value: usize, width: usize) -> usize {
    if max_value == 0 {
        return 0;
    }
    (value as f64 / max_value as f64 * width as f64) as usize
}

fn create_bar_chart(weekly: &[WeeklyActivity], width: usize) -> Text<'static> {
    let mut lines = Vec::new();

    let max_value = weekly
        .iter()
        .map(|w| w.passed.max(w.failed))
        .max()
        .unwrap_or(0);
    // Room for the label and the count
    let bar_width = width.saturating_sub(16).max(4);

    for week in weekly {
        lines.push(Line::from(vec![
            Span::raw(format!("Week {}: ", week.week_number)),
            Span::styled(
                "█".repeat(bar_length(week.passed, max_value, bar_width)),
                Style::default().fg(Color::Green),
            ),
            Span::raw(format!(" {}", week.passed)),
        ]));
        lines.push(Line::from(vec![
            Span::raw("        "),
            Span::styled(
                "█".repeat(bar_length(week.failed, max_value, bar_width)),
                Style::default().fg(Color::Red),
            ),
            Span::raw(format!(" {}", week.failed)),
        ]));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(vec![
        Span::styled("█", Style::default().fg(Color::Green)),
        Span::raw(" passed  "),
        Span::styled("█", Style::default().fg(Color::Red)),
        Span::raw(" failed"),
    ]));

    Text::from(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_cell_colours() {
        assert_eq!(activity_cell(None).0, "□");
        let empty = DailyActivity::default();
        assert_eq!(activity_cell(Some(&empty)).0, "□");

        let failed = DailyActivity { passed: 0, failed: 2 };
        assert_eq!(activity_cell(Some(&failed)).1.fg, Some(Color::Red));

        let mixed = DailyActivity { passed: 1, failed: 2 };
        assert_eq!(activity_cell(Some(&mixed)).1.fg, Some(Color::Yellow));

        let perfect = DailyActivity { passed: 3, failed: 0 };
        assert_eq!(activity_cell(Some(&perfect)).1.fg, Some(Color::Green));
    }

    #[test]
    fn test_bar_length_scales() {
        assert_eq!(bar_length(0, 0, 20), 0);
        assert_eq!(bar_length(5, 10, 20), 10);
        assert_eq!(bar_length(10, 10, 20), 20);
    }

    #[test]
    fn test_heatmap_has_row_per_week() {
        let today = NaiveDate::from_ymd_opt(2026, 5, 20).unwrap();
        let heatmap = create_heatmap(&HashMap::new(), today);
        // header + 5 week rows + blank + legend
        assert_eq!(heatmap.lines.len(), 8);
    }

    #[test]
    fn test_score_colour() {
        assert_eq!(score_colour(100), Color::Green);
        assert_eq!(score_colour(70), Color::Green);
        assert_eq!(score_colour(40), Color::Yellow);
        assert_eq!(score_colour(0), Color::Red);
    }
}
