use std::sync::OnceLock;

use regex::Regex;

use crate::model::log_entry::LogEntry;
use crate::service::dto::ExportRow;
use crate::time::format_duration;
use crate::usecase::report::entry_sleep;

pub const CSV_HEADER: [&str; 5] = ["date", "sleep_duration", "night_wakings", "total_dosage", "seizure"];

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+(\.\d+)?").expect("number pattern is valid"))
}

fn unit_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^\W\d_]+").expect("unit pattern is valid"))
}

/// Sums every number found in the morning and evening dosage strings and
/// appends the distinct unit words: `300mg` and `200 mg` give `500 mg`.
pub fn total_dosage(entry: &LogEntry) -> String {
    let mut total = 0.0;
    let mut units: Vec<&str> = Vec::new();

    for dosage in [&entry.morning_meds.dosage, &entry.evening_meds.dosage] {
        total += number_pattern()
            .find_iter(dosage)
            .filter_map(|m| m.as_str().parse::<f64>().ok())
            .sum::<f64>();
        for unit in unit_pattern().find_iter(dosage) {
            if !units.contains(&unit.as_str()) {
                units.push(unit.as_str());
            }
        }
    }

    let amount = if total.fract() == 0.0 {
        format!("{}", total as i64)
    } else {
        format!("{}", total)
    };
    format!("{} {}", amount, units.join(" ")).trim().to_string()
}

/// One flattened row per entry, in the order given.
pub fn export_rows(logs: &[LogEntry]) -> Vec<ExportRow> {
    logs.iter()
        .map(|log| ExportRow {
            date: log.date.to_string(),
            sleep_duration: format_duration(entry_sleep(log)),
            night_wakings: log.night_waking_count(),
            total_dosage: total_dosage(log),
            seizure: log.had_seizure,
        })
        .collect()
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn to_csv(rows: &[ExportRow]) -> String {
    let mut out = CSV_HEADER.join(",");
    out.push('\n');
    for row in rows {
        let fields = [
            row.date.clone(),
            row.sleep_duration.clone(),
            row.night_wakings.to_string(),
            row.total_dosage.clone(),
            if row.seizure { "yes" } else { "no" }.to_string(),
        ];
        let line: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}
