use anyhow::bail;
use chrono::{Datelike, Duration, NaiveDate};
use log::warn;
use sleeplog_core::input::ENTRY_KEYS;
use sleeplog_core::service::dto::{CalendarCell, ReportSummary};
use sleeplog_core::usecase::calendar::{first_of_month, month_grid, shift_month};
use sleeplog_core::{apply_fields, normalize_fields, parse_args, Diary, KeyValueStore, LogEntry, Report};

pub enum InputMode {
    Normal,
    Editing,
}

pub struct App<S: KeyValueStore> {
    pub diary: Diary<S>,
    pub today: NaiveDate,
    pub selected: NaiveDate,
    pub input: String,
    pub input_mode: InputMode,
    pub cursor_position: usize,
    /// Feedback from the last edit, shown in the footer.
    pub status: Option<String>,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(diary: Diary<S>, today: NaiveDate) -> Self {
        Self {
            diary,
            today,
            selected: today,
            input: String::new(),
            input_mode: InputMode::Normal,
            cursor_position: 0,
            status: None,
        }
    }

    pub fn month(&self) -> (i32, u32) {
        (self.selected.year(), self.selected.month())
    }

    pub fn grid(&self) -> Vec<Vec<CalendarCell>> {
        let (year, month) = self.month();
        month_grid(year, month, self.today, self.diary.logs(), &self.diary.factors())
    }

    pub fn selected_entry(&self) -> Option<&LogEntry> {
        self.diary.entry(self.selected)
    }

    /// Summary over the visible month.
    pub fn month_summary(&self) -> ReportSummary {
        let (year, month) = self.month();
        let (next_year, next_month) = shift_month(year, month, 1);
        let (Some(start), Some(next)) = (first_of_month(year, month), first_of_month(next_year, next_month))
        else {
            return Report::build(&[]).summary;
        };
        Report::build(&self.diary.logs_in_range(start, next - Duration::days(1))).summary
    }

    pub fn move_days(&mut self, days: i64) {
        if let Some(date) = self.selected.checked_add_signed(Duration::days(days)) {
            self.selected = date;
        }
    }

    /// Keeps the day of month, clamped to the target month's length.
    pub fn move_months(&mut self, delta: i32) {
        let (year, month) = shift_month(self.selected.year(), self.selected.month(), delta);
        let mut day = self.selected.day();
        while day > 28 && NaiveDate::from_ymd_opt(year, month, day).is_none() {
            day -= 1;
        }
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            self.selected = date;
        }
    }

    pub fn go_today(&mut self) {
        self.selected = self.today;
    }

    pub fn delete_selected(&mut self) {
        if self.diary.delete_log(self.selected) {
            self.status = Some(format!("Deleted {}", self.selected));
        }
    }

    pub fn enter_edit_mode(&mut self) {
        self.input_mode = InputMode::Editing;
        self.input.clear();
        self.cursor_position = 0;
        self.status = None;
    }

    pub fn exit_input_mode(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn input_char(&mut self, c: char) {
        let byte_index = self.input.chars().take(self.cursor_position).map(|c| c.len_utf8()).sum();
        self.input.insert(byte_index, c);
        self.cursor_position += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            let byte_index: usize = self.input.chars().take(self.cursor_position - 1).map(|c| c.len_utf8()).sum();
            self.input.remove(byte_index);
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.input.chars().count() {
            self.cursor_position += 1;
        }
    }

    /// Applies `key:value` fields to the selected day and saves it.
    pub fn submit_command(&mut self) {
        if !self.input.trim().is_empty() {
            self.status = Some(match self.apply_input() {
                Ok(()) => format!("Saved {}", self.selected),
                Err(e) => {
                    warn!("Edit of {} rejected: {}", self.selected, e);
                    format!("{} (keys: {})", e, ENTRY_KEYS.join(", "))
                }
            });
        }
        self.input.clear();
        self.cursor_position = 0;
        self.exit_input_mode();
    }

    fn apply_input(&mut self) -> anyhow::Result<()> {
        let args: Vec<String> = self.input.split_whitespace().map(|s| s.to_string()).collect();
        let parsed = parse_args(&args);
        if !parsed.name.is_empty() {
            bail!("Unexpected text '{}' before the first key:value", parsed.name);
        }
        let fields = normalize_fields(parsed.metadata)?;

        let mut entry = self.diary.entry_or_new(self.selected);
        apply_fields(&mut entry, &fields, self.diary.settings())?;
        self.diary.save_entry(entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sleeplog_core::{MemoryStore, Store, Tier};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn app(today: &str) -> App<MemoryStore> {
        App::new(Diary::open(Store::new(MemoryStore::new())), date(today))
    }

    #[test]
    fn test_navigation() {
        let mut app = app("2025-01-31");
        app.move_months(1);
        assert_eq!(app.selected, date("2025-02-28"));
        app.move_days(1);
        assert_eq!(app.month(), (2025, 3));
        app.move_days(-7);
        assert_eq!(app.selected, date("2025-02-22"));
        app.go_today();
        assert_eq!(app.selected, date("2025-01-31"));
    }

    #[test]
    fn test_edit_saves_selected_day() {
        let mut app = app("2025-03-10");
        app.enter_edit_mode();
        for c in "seizures:1 wake:05:30".chars() {
            app.input_char(c);
        }
        app.submit_command();

        assert_eq!(app.status.as_deref(), Some("Saved 2025-03-10"));
        let entry = app.selected_entry().unwrap();
        assert_eq!(entry.seizure_count(), 1);
        assert!(entry.is_early_wakeup);
        assert_eq!(app.diary.tier_for(app.selected), Tier::Red);
        assert_eq!(app.month_summary().total_seizures, 1);

        app.delete_selected();
        assert!(app.selected_entry().is_none());
    }

    #[test]
    fn test_edit_keeps_notes_with_spaces() {
        let mut app = app("2025-03-10");
        app.enter_edit_mode();
        for c in "notes:bad night after fever trigger:#fever".chars() {
            app.input_char(c);
        }
        app.submit_command();

        assert_eq!(app.status.as_deref(), Some("Saved 2025-03-10"));
        let entry = app.selected_entry().unwrap();
        assert_eq!(entry.notes.as_deref(), Some("bad night after fever"));
        assert_eq!(entry.trigger.as_deref(), Some("#fever"));
    }

    #[test]
    fn test_edit_with_leading_free_text_is_rejected() {
        let mut app = app("2025-03-10");
        app.enter_edit_mode();
        for c in "slept badly bed:22:00".chars() {
            app.input_char(c);
        }
        app.submit_command();

        assert!(app.selected_entry().is_none());
        assert!(app.status.as_deref().unwrap().starts_with("Unexpected text 'slept badly'"));
    }

    #[test]
    fn test_bad_edit_changes_nothing() {
        let mut app = app("2025-03-10");
        app.enter_edit_mode();
        for c in "bed:25:99".chars() {
            app.input_char(c);
        }
        app.submit_command();
        assert!(app.selected_entry().is_none());
        assert!(app.status.is_some());
    }
}
