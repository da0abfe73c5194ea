use serde::{Deserialize, Serialize};
use serde_json::Value;
use chrono::NaiveDate;

use crate::repository::merge_valid_fields;
use crate::time::parse_clock;

pub const DEFAULT_BEDTIME: &str = "21:00";
pub const DEFAULT_WAKEUP_TIME: &str = "07:00";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Medication {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub dosage: String,
}

impl Medication {
    pub fn new(name: impl Into<String>, dosage: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dosage: dosage.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty() && self.dosage.trim().is_empty()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NightWaking {
    #[serde(default)]
    pub wake_time: String,
    #[serde(default)]
    pub back_to_sleep_time: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Seizure {
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
}

/// One diary page. The date is both identity and lookup key.
///
/// Every field except `date` tolerates being absent in stored data so that
/// entries written by older versions still load.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub date: NaiveDate,
    #[serde(default)]
    pub bedtime: String,
    #[serde(default)]
    pub wakeup_time: String,
    #[serde(default)]
    pub morning_meds: Medication,
    #[serde(default)]
    pub evening_meds: Medication,
    #[serde(default)]
    pub woke_up_at_night: bool,
    #[serde(default)]
    pub night_wakings: Vec<NightWaking>,
    #[serde(default)]
    pub had_seizure: bool,
    #[serde(default)]
    pub seizures: Vec<Seizure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
    // Entries saved before the rename carry `isRedDay` with the same meaning.
    #[serde(default, alias = "isRedDay")]
    pub is_early_wakeup: bool,
}

impl LogEntry {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            bedtime: DEFAULT_BEDTIME.to_string(),
            wakeup_time: DEFAULT_WAKEUP_TIME.to_string(),
            morning_meds: Medication::default(),
            evening_meds: Medication::default(),
            woke_up_at_night: false,
            night_wakings: Vec::new(),
            had_seizure: false,
            seizures: Vec::new(),
            notes: None,
            trigger: None,
            is_early_wakeup: false,
        }
    }

    pub fn set_woke_up_at_night(&mut self, woke: bool) {
        self.woke_up_at_night = woke;
        if !woke {
            self.night_wakings.clear();
        } else if self.night_wakings.is_empty() {
            self.night_wakings.push(NightWaking::default());
        }
    }

    pub fn resize_night_wakings(&mut self, count: usize) {
        self.night_wakings.resize(count, NightWaking::default());
        if count > 0 {
            self.woke_up_at_night = true;
        }
    }

    pub fn set_had_seizure(&mut self, had: bool) {
        self.had_seizure = had;
        if !had {
            self.seizures.clear();
        } else if self.seizures.is_empty() {
            self.seizures.push(Seizure::default());
        }
    }

    pub fn resize_seizures(&mut self, count: usize) {
        self.seizures.resize(count, Seizure::default());
        if count > 0 {
            self.had_seizure = true;
        }
    }

    /// Prepares the entry for saving: applies both gates and takes the
    /// early-wakeup snapshot against `target_wakeup_time`.
    ///
    /// The snapshot is never refreshed afterwards, even if the target changes.
    pub fn finalize(&mut self, target_wakeup_time: &str) {
        if !self.woke_up_at_night {
            self.night_wakings.clear();
        }
        if !self.had_seizure {
            self.seizures.clear();
        }
        self.is_early_wakeup = is_early_wakeup(&self.wakeup_time, target_wakeup_time);
    }

    /// Decodes one stored record. A record with a readable `date` but some
    /// invalid fields keeps its valid fields and gets empty values for the
    /// rest; without a usable `date` it is `None`.
    pub fn from_stored(value: Value) -> Option<Self> {
        if let Ok(entry) = serde_json::from_value::<LogEntry>(value.clone()) {
            return Some(entry);
        }
        let Value::Object(mut fields) = value else {
            return None;
        };
        let date: NaiveDate = serde_json::from_value(fields.get("date")?.clone()).ok()?;

        if let Some(legacy) = fields.remove("isRedDay") {
            fields.entry("isEarlyWakeup").or_insert(legacy);
        }
        let blank = serde_json::to_value(Self::blank(date)).ok()?;
        merge_valid_fields(blank, Value::Object(fields), "sleepLogs")
    }

    fn blank(date: NaiveDate) -> Self {
        Self {
            date,
            bedtime: String::new(),
            wakeup_time: String::new(),
            ..Self::new(date)
        }
    }

    pub fn night_waking_count(&self) -> usize {
        if self.woke_up_at_night { self.night_wakings.len() } else { 0 }
    }

    pub fn seizure_count(&self) -> usize {
        if self.had_seizure { self.seizures.len() } else { 0 }
    }
}

/// `wakeup < target` on zero-padded `HH:mm` values. Unparseable input on
/// either side is never early.
pub fn is_early_wakeup(wakeup_time: &str, target_wakeup_time: &str) -> bool {
    match (parse_clock(wakeup_time), parse_clock(target_wakeup_time)) {
        (Some(wake), Some(target)) => wake < target,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_new_uses_form_defaults() {
        let entry = LogEntry::new(date("2025-03-01"));
        assert_eq!(entry.bedtime, "21:00");
        assert_eq!(entry.wakeup_time, "07:00");
        assert!(!entry.woke_up_at_night);
        assert!(entry.night_wakings.is_empty());
    }

    #[test]
    fn test_woke_up_toggle_adds_and_clears_wakings() {
        let mut entry = LogEntry::new(date("2025-03-01"));
        entry.set_woke_up_at_night(true);
        assert_eq!(entry.night_wakings.len(), 1);

        entry.resize_night_wakings(3);
        assert_eq!(entry.night_wakings.len(), 3);
        entry.resize_night_wakings(2);
        assert_eq!(entry.night_wakings.len(), 2);

        entry.set_woke_up_at_night(false);
        assert!(entry.night_wakings.is_empty());
    }

    #[test]
    fn test_finalize_enforces_gates_and_snapshots_early_wakeup() {
        let mut entry = LogEntry::new(date("2025-03-01"));
        entry.night_wakings.push(NightWaking::default());
        entry.seizures.push(Seizure::default());
        entry.wakeup_time = "05:45".to_string();

        entry.finalize("07:00");

        assert!(entry.night_wakings.is_empty());
        assert!(entry.seizures.is_empty());
        assert!(entry.is_early_wakeup);

        entry.wakeup_time = "07:00".to_string();
        entry.finalize("07:00");
        assert!(!entry.is_early_wakeup);
    }

    #[test]
    fn test_early_wakeup_with_malformed_times() {
        assert!(!is_early_wakeup("", "07:00"));
        assert!(!is_early_wakeup("06:00", "soon"));
    }

    #[test]
    fn test_legacy_entry_deserializes() {
        let json = r#"{
            "id": "2024-11-02",
            "date": "2024-11-02",
            "bedtime": "21:10",
            "wakeupTime": "05:30",
            "morningMeds": {"name": "Depakine", "dosage": "300mg"},
            "eveningMeds": {"name": "", "dosage": ""},
            "wokeUpAtNight": false,
            "nightWakings": [],
            "isRedDay": true
        }"#;
        let entry: LogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.date, date("2024-11-02"));
        assert!(entry.is_early_wakeup);
        assert!(!entry.had_seizure);
        assert!(entry.seizures.is_empty());
        assert_eq!(entry.trigger, None);
    }

    #[test]
    fn test_from_stored_repairs_bad_fields() {
        let value = serde_json::json!({
            "date": "2024-11-03",
            "bedtime": null,
            "wakeupTime": "06:20",
            "hadSeizure": "maybe",
            "notes": "restless",
            "isRedDay": true
        });
        let entry = LogEntry::from_stored(value).unwrap();
        assert_eq!(entry.date, date("2024-11-03"));
        assert_eq!(entry.bedtime, "");
        assert_eq!(entry.wakeup_time, "06:20");
        assert!(!entry.had_seizure);
        assert_eq!(entry.notes.as_deref(), Some("restless"));
        assert!(entry.is_early_wakeup);
    }

    #[test]
    fn test_from_stored_without_date_is_dropped() {
        assert_eq!(LogEntry::from_stored(serde_json::json!({"bedtime": "21:00"})), None);
        assert_eq!(LogEntry::from_stored(serde_json::json!({"date": "yesterday"})), None);
        assert_eq!(LogEntry::from_stored(serde_json::json!("2024-11-03")), None);
    }
}
