use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::model::severity::Tier;
use crate::time::format_duration;

pub const NO_DATA: &str = "no data";
pub const NONE_LABEL: &str = "none";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReportSummary {
    pub days: usize,
    /// `None` when the range holds no entries.
    pub average_sleep_minutes: Option<i64>,
    pub total_seizures: usize,
    pub total_night_wakings: usize,
    pub early_wakeups: usize,
    pub most_frequent_trigger: Option<String>,
    pub seizure_weekday: Option<Weekday>,
}

impl ReportSummary {
    pub fn average_sleep_label(&self) -> String {
        match self.average_sleep_minutes {
            Some(minutes) => format_duration(chrono::Duration::minutes(minutes)),
            None => NO_DATA.to_string(),
        }
    }

    pub fn trigger_label(&self) -> &str {
        self.most_frequent_trigger.as_deref().unwrap_or(NONE_LABEL)
    }

    pub fn weekday_label(&self) -> String {
        self.seizure_weekday
            .map(|d| d.to_string())
            .unwrap_or_else(|| NONE_LABEL.to_string())
    }
}

/// Parallel arrays for the chart widget, one position per entry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ChartSeries {
    pub labels: Vec<String>, // dd.mm
    pub sleep_hours: Vec<f64>,
    pub seizure_counts: Vec<u64>,
    pub waking_counts: Vec<u64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ExportRow {
    pub date: String, // YYYY-MM-DD
    pub sleep_duration: String,
    pub night_wakings: usize,
    pub total_dosage: String,
    pub seizure: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub in_month: bool,
    pub is_today: bool,
    pub tier: Tier,
}
