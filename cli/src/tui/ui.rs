use chrono::Datelike;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Row, Table, Wrap},
    Frame,
};
use sleeplog_core::usecase::report::entry_sleep;
use sleeplog_core::{format_duration, KeyValueStore, LogEntry, Medication, Tier};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::tui::app::{App, InputMode};

pub fn tier_color(tier: Tier) -> Color {
    match tier {
        Tier::Red => Color::Red,
        Tier::Orange => Color::Indexed(208),
        Tier::Yellow => Color::Yellow,
        Tier::Green => Color::Green,
        Tier::None => Color::Reset,
    }
}

/// Cuts `text` to at most `width` terminal columns, marking the cut with `…`.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

pub fn draw<S: KeyValueStore>(f: &mut Frame, app: &App<S>) {
    let size = f.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // Content
            Constraint::Length(3), // Input
            Constraint::Length(1), // Footer/Help
        ])
        .split(size);

    let title = app
        .selected
        .with_day(1)
        .map(|d| d.format("SLEEPLOG  %B %Y").to_string())
        .unwrap_or_else(|| "SLEEPLOG".to_string());
    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded));
    f.render_widget(header, main_chunks[0]);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(38), Constraint::Min(20)])
        .split(main_chunks[1]);

    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Min(1)])
        .split(content_chunks[0]);

    draw_calendar(f, app, left_chunks[0]);
    draw_month_summary(f, app, left_chunks[1]);
    draw_detail_view(f, app, content_chunks[1]);
    draw_input(f, app, main_chunks[2]);

    let help = match app.status.as_deref() {
        Some(status) => status.to_string(),
        None => "h/l: Day | j/k: Week | n/p: Month | t: Today | e: Edit | d: Delete | q: Quit".to_string(),
    };
    let footer = Paragraph::new(truncate_to_width(&help, size.width as usize))
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(footer, main_chunks[3]);
}

fn draw_calendar<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let rows: Vec<Row> = app
        .grid()
        .iter()
        .map(|week| {
            let cells: Vec<Span> = week
                .iter()
                .map(|cell| {
                    let mut style = if cell.in_month {
                        Style::default().fg(tier_color(cell.tier))
                    } else {
                        Style::default().fg(Color::DarkGray)
                    };
                    if cell.is_today {
                        style = style.add_modifier(Modifier::UNDERLINED | Modifier::BOLD);
                    }
                    if cell.date == app.selected {
                        style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
                    }
                    Span::styled(format!("{:>3}", cell.date.day()), style)
                })
                .collect();
            Row::new(cells)
        })
        .collect();

    let table = Table::new(rows, [Constraint::Length(4); 7])
        .header(
            Row::new(vec![" Mo", " Tu", " We", " Th", " Fr", " Sa", " Su"])
                .style(Style::default().fg(Color::Yellow)),
        )
        .block(Block::default().title(" Calendar ").borders(Borders::ALL).border_type(BorderType::Rounded));

    f.render_widget(table, area);
}

fn draw_month_summary<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let summary = app.month_summary();
    let line = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{:<15}", label), Style::default().fg(Color::DarkGray)),
            Span::raw(value),
        ])
    };
    let text = vec![
        line("Days logged", summary.days.to_string()),
        line("Avg sleep", summary.average_sleep_label()),
        line("Seizures", summary.total_seizures.to_string()),
        line("Night wakings", summary.total_night_wakings.to_string()),
        line("Early wake-ups", summary.early_wakeups.to_string()),
        line("Top trigger", summary.trigger_label().to_string()),
    ];
    let block = Paragraph::new(text)
        .block(Block::default().title(" Month ").borders(Borders::ALL).border_type(BorderType::Rounded));
    f.render_widget(block, area);
}

fn meds_text(meds: &Medication) -> String {
    if meds.is_empty() {
        "-".to_string()
    } else {
        format!("{} {}", meds.name, meds.dosage).trim().to_string()
    }
}

fn entry_lines(entry: &LogEntry, tier: Tier, width: usize) -> Vec<Line<'static>> {
    let label = |s: &str| Span::styled(format!("{:<10}", s), Style::default().fg(Color::Blue));
    let mut lines = vec![
        Line::from(vec![
            label("Tier"),
            Span::styled(tier.to_string(), Style::default().fg(tier_color(tier)).add_modifier(Modifier::BOLD)),
        ]),
        Line::from(vec![
            label("Sleep"),
            Span::raw(format!(
                "{} - {}  ({}){}",
                entry.bedtime,
                entry.wakeup_time,
                format_duration(entry_sleep(entry)),
                if entry.is_early_wakeup { "  early" } else { "" }
            )),
        ]),
        Line::from(vec![label("Morning"), Span::raw(truncate_to_width(&meds_text(&entry.morning_meds), width))]),
        Line::from(vec![label("Evening"), Span::raw(truncate_to_width(&meds_text(&entry.evening_meds), width))]),
        Line::from(""),
    ];

    lines.push(Line::from(vec![label("Wakings"), Span::raw(entry.night_waking_count().to_string())]));
    for waking in &entry.night_wakings {
        lines.push(Line::from(format!("          {} - {}", waking.wake_time, waking.back_to_sleep_time)));
    }
    lines.push(Line::from(vec![label("Seizures"), Span::raw(entry.seizure_count().to_string())]));
    for seizure in &entry.seizures {
        lines.push(Line::from(format!("          {} - {}", seizure.start_time, seizure.end_time)));
    }

    if let Some(trigger) = entry.trigger.as_deref().filter(|t| !t.is_empty()) {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![label("Trigger"), Span::raw(trigger.to_string())]));
    }
    if let Some(notes) = entry.notes.as_deref().filter(|n| !n.is_empty()) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Notes:", Style::default().fg(Color::Blue))));
        lines.push(Line::from(notes.to_string()));
    }
    lines
}

fn draw_detail_view<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let title = format!(" {} ", app.selected.format("%A %Y-%m-%d"));
    let block = Block::default().title(title).borders(Borders::ALL).border_type(BorderType::Rounded);

    let text = match app.selected_entry() {
        Some(entry) => {
            let width = area.width.saturating_sub(14) as usize;
            entry_lines(entry, entry.tier(&app.diary.factors()), width)
        }
        None => vec![Line::from(Span::styled(
            "No entry. Press e to log this day.",
            Style::default().fg(Color::DarkGray),
        ))],
    };

    let detail = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    f.render_widget(detail, area);
}

fn draw_input<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let (text, style) = match app.input_mode {
        InputMode::Editing => (app.input.as_str(), Style::default().fg(Color::Yellow)),
        InputMode::Normal => ("", Style::default()),
    };
    let input = Paragraph::new(text)
        .style(style)
        .block(Block::default().title(" Edit (key:value) ").borders(Borders::ALL).border_type(BorderType::Rounded));
    f.render_widget(input, area);

    if let InputMode::Editing = app.input_mode {
        let offset: usize = app.input.chars().take(app.cursor_position).map(|c| c.width().unwrap_or(0)).sum();
        f.set_cursor_position((area.x + 1 + offset as u16, area.y + 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("Depakine 300mg", 20), "Depakine 300mg");
        assert_eq!(truncate_to_width("Depakine 300mg", 6), "Depak…");
        // Wide characters take two columns each.
        assert_eq!(truncate_to_width("日本語テキスト", 5), "日本…");
    }
}
