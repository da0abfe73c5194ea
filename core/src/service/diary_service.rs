use chrono::NaiveDate;
use log::{info, warn};

use crate::model::backup::Backup;
use crate::model::log_entry::LogEntry;
use crate::model::settings::AppSettings;
use crate::model::severity::{classify, SeverityFactors, Tier};
use crate::repository::{KeyValueStore, Store, LOGS_KEY, SETTINGS_KEY};

/// Replaces the entry with the same date, or inserts and re-sorts the
/// collection newest first. Never produces two entries for one date.
pub fn upsert_log(logs: &mut Vec<LogEntry>, entry: LogEntry) {
    if let Some(pos) = logs.iter().position(|l| l.date == entry.date) {
        logs[pos] = entry;
    } else {
        logs.push(entry);
        logs.sort_by(|a, b| b.date.cmp(&a.date));
    }
}

/// The session context: both root records, loaded once and written back on
/// every mutation. In-memory state stays authoritative if a write fails.
pub struct Diary<S: KeyValueStore> {
    store: Store<S>,
    logs: Vec<LogEntry>,
    settings: AppSettings,
}

impl<S: KeyValueStore> Diary<S> {
    pub fn open(store: Store<S>) -> Self {
        let mut logs = store.load_list(LOGS_KEY, LogEntry::from_stored);
        let settings = store.load(SETTINGS_KEY, AppSettings::default());

        // Older files may hold duplicates or be unsorted; keep the last one per date.
        let loaded = logs.len();
        let mut normalized = Vec::with_capacity(loaded);
        for entry in logs.drain(..) {
            upsert_log(&mut normalized, entry);
        }
        if normalized.len() != loaded {
            warn!("Dropped {} duplicate log entries on load", loaded - normalized.len());
        }

        Self {
            store,
            logs: normalized,
            settings,
        }
    }

    pub fn store(&self) -> &Store<S> {
        &self.store
    }

    /// Newest first.
    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn factors(&self) -> SeverityFactors {
        self.settings.severity_factors()
    }

    pub fn entry(&self, date: NaiveDate) -> Option<&LogEntry> {
        self.logs.iter().find(|l| l.date == date)
    }

    /// The stored entry for `date`, or a fresh one with form defaults.
    pub fn entry_or_new(&self, date: NaiveDate) -> LogEntry {
        self.entry(date).cloned().unwrap_or_else(|| LogEntry::new(date))
    }

    pub fn tier_for(&self, date: NaiveDate) -> Tier {
        classify(self.entry(date), &self.factors())
    }

    /// Finalizes `entry` against the current wake-up target and stores it.
    pub fn save_entry(&mut self, mut entry: LogEntry) -> &LogEntry {
        entry.finalize(&self.settings.target_wakeup_time);
        let date = entry.date;
        self.add_or_update_log(entry);
        self.entry(date).unwrap_or(&self.logs[0])
    }

    pub fn add_or_update_log(&mut self, entry: LogEntry) {
        upsert_log(&mut self.logs, entry);
        self.persist_logs();
    }

    pub fn delete_log(&mut self, date: NaiveDate) -> bool {
        let before = self.logs.len();
        self.logs.retain(|l| l.date != date);
        let removed = self.logs.len() != before;
        if removed {
            self.persist_logs();
        }
        removed
    }

    pub fn update_settings(&mut self, settings: AppSettings) {
        self.settings = settings;
        self.persist_settings();
    }

    /// Entries with `start <= date <= end`, oldest first.
    pub fn logs_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<LogEntry> {
        let mut slice: Vec<LogEntry> = self
            .logs
            .iter()
            .filter(|l| l.date >= start && l.date <= end)
            .cloned()
            .collect();
        slice.sort_by(|a, b| a.date.cmp(&b.date));
        slice
    }

    pub fn export_backup(&self) -> Backup {
        Backup::new(self.logs.clone(), self.settings.clone())
    }

    /// Replaces both records. The backup is already validated by
    /// [`Backup::parse`], so nothing here can leave a half-imported state.
    pub fn import_backup(&mut self, backup: Backup) {
        let mut logs = Vec::with_capacity(backup.sleep_logs.len());
        for entry in backup.sleep_logs {
            upsert_log(&mut logs, entry);
        }
        info!("Importing backup with {} entries", logs.len());
        self.logs = logs;
        self.settings = backup.app_settings;
        self.persist_logs();
        self.persist_settings();
    }

    fn persist_logs(&self) {
        self.store.save(LOGS_KEY, &self.logs);
    }

    fn persist_settings(&self) {
        self.store.save(SETTINGS_KEY, &self.settings);
    }
}
