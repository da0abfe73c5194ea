use std::{io, time::Duration};

use anyhow::Result;
use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Bar, BarChart, BarGroup, Block, BorderType, Borders, Padding, Paragraph},
};
use sleeplog_core::service::dto::{ChartSeries, ReportSummary};
use sleeplog_core::{LogEntry, Report};

// --- THEME ---
struct Theme {
    primary: Color,
    muted: Color,
    text: Color,
    sleep: Color,
    seizure: Color,
    waking: Color,
}

const THEME: Theme = Theme {
    primary: Color::Cyan,
    muted: Color::DarkGray,
    text: Color::White,
    sleep: Color::Blue,
    seizure: Color::Red,
    waking: Color::Indexed(208),
};

/// Days shown at once; the rest is reached by scrolling.
const WINDOW: usize = 14;

pub struct StatsApp {
    pub chart: ChartSeries,
    pub summary: ReportSummary,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub offset: usize,
}

impl StatsApp {
    pub fn new(report: Report, start: NaiveDate, end: NaiveDate) -> Self {
        let offset = report.chart.labels.len().saturating_sub(WINDOW);
        Self {
            chart: report.chart,
            summary: report.summary,
            start,
            end,
            offset,
        }
    }

    fn max_offset(&self) -> usize {
        self.chart.labels.len().saturating_sub(WINDOW)
    }

    pub fn scroll_right(&mut self) {
        if self.offset < self.max_offset() {
            self.offset += 1;
        }
    }

    pub fn scroll_left(&mut self) {
        if self.offset > 0 {
            self.offset -= 1;
        }
    }

    pub fn visible(&self) -> std::ops::Range<usize> {
        self.offset..(self.offset + WINDOW).min(self.chart.labels.len())
    }
}

pub fn run(logs: &[LogEntry], start: NaiveDate, end: NaiveDate) -> Result<()> {
    if logs.is_empty() {
        println!("No entries between {} and {}.", start, end);
        return Ok(());
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = StatsApp::new(Report::build(logs), start, end);

    loop {
        terminal.draw(|f| ui(f, &app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => break,
                        KeyCode::Left | KeyCode::Char('h') => app.scroll_left(),
                        KeyCode::Right | KeyCode::Char('l') => app.scroll_right(),
                        _ => {}
                    }
                }
            }
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}

fn ui(frame: &mut Frame, app: &StatsApp) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Charts + sidebar
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

    let header_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(20), Constraint::Min(1), Constraint::Length(30)])
        .split(main_layout[0]);

    let app_title = Paragraph::new(Span::styled(
        "SLEEPLOG REPORT",
        Style::default().fg(THEME.primary).add_modifier(Modifier::BOLD),
    ))
    .block(Block::default().padding(Padding::new(0, 0, 1, 0)));
    frame.render_widget(app_title, header_layout[0]);

    let range = Paragraph::new(Line::from(vec![
        Span::styled(
            if app.offset > 0 { " < " } else { "   " },
            Style::default().fg(THEME.text),
        ),
        Span::styled(
            format!("{} .. {}", app.start, app.end),
            Style::default().fg(THEME.text).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            if app.offset < app.max_offset() { " > " } else { "   " },
            Style::default().fg(THEME.text),
        ),
    ]))
    .alignment(Alignment::Right)
    .block(Block::default().padding(Padding::new(0, 0, 1, 0)));
    frame.render_widget(range, header_layout[2]);
    frame.render_widget(
        Block::default().borders(Borders::BOTTOM).border_style(Style::default().fg(THEME.muted)),
        main_layout[0],
    );

    let content = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(75),
            Constraint::Length(1),
            Constraint::Percentage(25),
        ])
        .split(main_layout[1]);

    let charts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(content[0]);

    draw_sleep_chart(frame, app, charts[0]);
    draw_event_chart(frame, app, charts[1]);
    draw_info_panel(frame, &app.summary, content[2]);

    let help = Line::from(vec![
        Span::styled("SCROLL: ", Style::default().fg(THEME.muted)),
        Span::styled("←/→ ", Style::default().fg(THEME.text)),
        Span::raw("  "),
        Span::styled("QUIT: ", Style::default().fg(THEME.muted)),
        Span::styled("q", Style::default().fg(THEME.text)),
    ]);
    frame.render_widget(Paragraph::new(help).alignment(Alignment::Center), main_layout[2]);
}

fn chart_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(THEME.muted))
        .title(title)
}

fn draw_sleep_chart(frame: &mut Frame, app: &StatsApp, area: Rect) {
    // Tenths of an hour so the bars keep one decimal.
    let bars: Vec<Bar> = app
        .visible()
        .map(|i| {
            let value = (app.chart.sleep_hours[i] * 10.0).round() as u64;
            Bar::default()
                .label(app.chart.labels[i].as_str())
                .value(value)
                .style(Style::default().fg(THEME.sleep))
                .text_value(format!("{:.1}", value as f64 / 10.0))
        })
        .collect();

    let chart = BarChart::default()
        .block(chart_block(" Sleep (hours) "))
        .bar_width(5)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars))
        .max(140);
    frame.render_widget(chart, area);
}

fn draw_event_chart(frame: &mut Frame, app: &StatsApp, area: Rect) {
    let mut bar_data = Vec::new();
    for i in app.visible() {
        bar_data.push((app.chart.labels[i].clone(), app.chart.seizure_counts[i], THEME.seizure));
        bar_data.push((String::new(), app.chart.waking_counts[i], THEME.waking));
        // Spacer
        bar_data.push((String::new(), 0, Color::Reset));
    }

    let bars: Vec<Bar> = bar_data
        .iter()
        .map(|(label, value, color)| {
            Bar::default()
                .label(label.as_str())
                .value(*value)
                .style(Style::default().fg(*color))
                .text_value(if *value > 0 { value.to_string() } else { String::new() })
        })
        .collect();

    let chart = BarChart::default()
        .block(chart_block(" Seizures / night wakings "))
        .bar_width(2)
        .bar_gap(0)
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, area);
}

fn draw_info_panel(frame: &mut Frame, summary: &ReportSummary, area: Rect) {
    let row = |label: &str, value: String, color: Color| {
        Line::from(vec![
            Span::styled(format!("{:<10}", label), Style::default().fg(THEME.muted)),
            Span::styled(value, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        ])
    };

    let info_text = vec![
        Line::from(Span::styled("Overview", Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
        row("Days", summary.days.to_string(), THEME.text),
        row("Avg sleep", summary.average_sleep_label(), THEME.sleep),
        row("Seizures", summary.total_seizures.to_string(), THEME.seizure),
        row("Wakings", summary.total_night_wakings.to_string(), THEME.waking),
        row("Early", summary.early_wakeups.to_string(), THEME.text),
        Line::from(""),
        row("Trigger", summary.trigger_label().to_string(), THEME.text),
        row("Weekday", summary.weekday_label(), THEME.text),
    ];

    let info = Paragraph::new(info_text).block(chart_block(" Summary "));
    frame.render_widget(info, area);
}
