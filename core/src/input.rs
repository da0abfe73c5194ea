use std::collections::HashMap;
use anyhow::{anyhow, Result};

use crate::model::log_entry::{LogEntry, Medication, NightWaking, Seizure};
use crate::model::settings::AppSettings;
use crate::time::normalize_clock;

pub const ENTRY_KEYS: &[&str] = &[
    "bedtime", "wakeup", "morning", "evening", "wakings", "seizures", "notes", "trigger",
];

const CLEAR_WORDS: &[&str] = &["-", "none", "no"];

#[derive(Debug, PartialEq)]
pub struct ParsedInput {
    pub name: String,
    pub metadata: HashMap<String, String>,
}

/// Splits `name words key:value more words`. Words after a `key:value`
/// continue that value, so free text may contain spaces; only words before
/// the first key form the name.
pub fn parse_args(args: &[String]) -> ParsedInput {
    let mut name_parts = Vec::new();
    let mut metadata: HashMap<String, String> = HashMap::new();
    let mut current: Option<String> = None;

    for arg in args {
        if let Some((key, value)) = arg.split_once(':') {
            if !key.is_empty() && key.chars().all(|c| c.is_ascii_alphabetic()) {
                metadata.insert(key.to_string(), value.to_string());
                current = Some(key.to_string());
                continue;
            }
        }
        match current.as_ref().and_then(|key| metadata.get_mut(key)) {
            Some(value) => {
                if !value.is_empty() {
                    value.push(' ');
                }
                value.push_str(arg);
            }
            None => name_parts.push(arg.as_str()),
        }
    }

    ParsedInput {
        name: name_parts.join(" "),
        metadata,
    }
}

pub fn expand_key(key: &str, candidates: &[&str]) -> Result<String> {
    // 1. Exact match
    if candidates.contains(&key) {
        return Ok(key.to_string());
    }

    // 2. Prefix match
    let matches: Vec<&str> = candidates
        .iter()
        .filter(|&&c| c.starts_with(key))
        .cloned()
        .collect();

    match matches.len() {
        1 => Ok(matches[0].to_string()),
        0 => Err(anyhow!("Unknown key: '{}'", key)),
        _ => Err(anyhow!("Ambiguous key: '{}' matches {:?}", key, matches)),
    }
}

/// Expands abbreviated keys against [`ENTRY_KEYS`].
pub fn normalize_fields(metadata: HashMap<String, String>) -> Result<HashMap<String, String>> {
    let mut fields = HashMap::new();
    for (key, value) in metadata {
        let full_key = expand_key(&key.to_lowercase(), ENTRY_KEYS)?;
        fields.insert(full_key, value);
    }
    Ok(fields)
}

/// Applies `key:value` edits to an entry. Keys must already be expanded.
pub fn apply_fields(
    entry: &mut LogEntry,
    fields: &HashMap<String, String>,
    settings: &AppSettings,
) -> Result<()> {
    // Fixed order so errors are reported deterministically.
    for key in ENTRY_KEYS {
        let Some(value) = fields.get(*key) else {
            continue;
        };
        let value = value.trim();
        match *key {
            "bedtime" => entry.bedtime = normalize_clock(value)?,
            "wakeup" => entry.wakeup_time = normalize_clock(value)?,
            "morning" => entry.morning_meds = parse_medication(value, settings),
            "evening" => entry.evening_meds = parse_medication(value, settings),
            "wakings" => apply_wakings(entry, value)?,
            "seizures" => apply_seizures(entry, value)?,
            "notes" => entry.notes = optional_text(value),
            "trigger" => entry.trigger = optional_text(value),
            _ => {}
        }
    }
    Ok(())
}

fn is_clear_word(value: &str) -> bool {
    value.is_empty() || CLEAR_WORDS.contains(&value.to_lowercase().as_str())
}

fn optional_text(value: &str) -> Option<String> {
    if is_clear_word(value) {
        None
    } else {
        Some(value.to_string())
    }
}

/// A template name from settings, or `name/dosage`, or a clear word.
fn parse_medication(value: &str, settings: &AppSettings) -> Medication {
    if is_clear_word(value) {
        return Medication::default();
    }
    if let Some(template) = settings.medication(value) {
        return Medication::new(template.name.clone(), template.dosage.clone());
    }
    match value.split_once('/') {
        Some((name, dosage)) => Medication::new(name.trim(), dosage.trim()),
        None => Medication::new(value, ""),
    }
}

/// `HH:mm-HH:mm` pairs separated by commas. A bare number only sets the count.
pub fn parse_spans(value: &str) -> Result<Vec<(String, String)>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (start, end) = part
                .split_once('-')
                .ok_or_else(|| anyhow!("Expected HH:mm-HH:mm, got '{}'", part))?;
            Ok((normalize_clock(start)?, normalize_clock(end)?))
        })
        .collect()
}

fn apply_wakings(entry: &mut LogEntry, value: &str) -> Result<()> {
    if is_clear_word(value) || value == "0" {
        entry.set_woke_up_at_night(false);
        return Ok(());
    }
    if let Ok(count) = value.parse::<usize>() {
        entry.resize_night_wakings(count);
        return Ok(());
    }
    let spans = parse_spans(value)?;
    entry.night_wakings = spans
        .into_iter()
        .map(|(wake_time, back_to_sleep_time)| NightWaking { wake_time, back_to_sleep_time })
        .collect();
    entry.woke_up_at_night = !entry.night_wakings.is_empty();
    Ok(())
}

fn apply_seizures(entry: &mut LogEntry, value: &str) -> Result<()> {
    if is_clear_word(value) || value == "0" {
        entry.set_had_seizure(false);
        return Ok(());
    }
    if let Ok(count) = value.parse::<usize>() {
        entry.resize_seizures(count);
        return Ok(());
    }
    let spans = parse_spans(value)?;
    entry.seizures = spans
        .into_iter()
        .map(|(start_time, end_time)| Seizure { start_time, end_time })
        .collect();
    entry.had_seizure = !entry.seizures.is_empty();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_simple() {
        let parsed = parse_args(&strings(&["2025-01-03", "bed:21:30", "wake:06:40", "notes:bad night"]));
        assert_eq!(parsed.name, "2025-01-03");
        assert_eq!(parsed.metadata.get("bed"), Some(&"21:30".to_string()));
        assert_eq!(parsed.metadata.get("wake"), Some(&"06:40".to_string()));
        assert_eq!(parsed.metadata.get("notes"), Some(&"bad night".to_string()));
    }

    #[test]
    fn test_parse_words_continue_the_previous_value() {
        let words: Vec<String> = "yesterday notes:bad night after fever wake:06:10 trigger:#fever again"
            .split_whitespace()
            .map(String::from)
            .collect();
        let parsed = parse_args(&words);
        assert_eq!(parsed.name, "yesterday");
        assert_eq!(parsed.metadata.get("notes"), Some(&"bad night after fever".to_string()));
        assert_eq!(parsed.metadata.get("wake"), Some(&"06:10".to_string()));
        assert_eq!(parsed.metadata.get("trigger"), Some(&"#fever again".to_string()));

        let parsed = parse_args(&strings(&["notes:", "slept", "well"]));
        assert_eq!(parsed.metadata.get("notes"), Some(&"slept well".to_string()));
        assert_eq!(parsed.name, "");
    }

    #[test]
    fn test_expand_key() {
        assert_eq!(expand_key("b", ENTRY_KEYS).unwrap(), "bedtime");
        assert_eq!(expand_key("wak", ENTRY_KEYS).unwrap_err().to_string(),
            "Ambiguous key: 'wak' matches [\"wakeup\", \"wakings\"]");
        assert_eq!(expand_key("wakeu", ENTRY_KEYS).unwrap(), "wakeup");
        assert_eq!(expand_key("s", ENTRY_KEYS).unwrap(), "seizures");
        assert_eq!(expand_key("t", ENTRY_KEYS).unwrap(), "trigger");

        // Unknown
        assert!(expand_key("x", ENTRY_KEYS).is_err());
    }

    #[test]
    fn test_apply_fields() {
        let mut settings = AppSettings::default();
        settings.add_medication("Depakine", "300 mg");

        let mut entry = LogEntry::new(NaiveDate::from_ymd_opt(2025, 1, 3).unwrap());
        let parsed = parse_args(&strings(&[
            "bed:2130",
            "wakeu:6:40",
            "m:depakine",
            "e:Keppra / 250mg",
            "wakings:02:10-02:40, 04:00-04:15",
            "s:1",
            "tr:#fever after #vaccine",
        ]));
        let fields = normalize_fields(parsed.metadata).unwrap();
        apply_fields(&mut entry, &fields, &settings).unwrap();

        assert_eq!(entry.bedtime, "21:30");
        assert_eq!(entry.wakeup_time, "06:40");
        assert_eq!(entry.morning_meds, Medication::new("Depakine", "300 mg"));
        assert_eq!(entry.evening_meds, Medication::new("Keppra", "250mg"));
        assert!(entry.woke_up_at_night);
        assert_eq!(entry.night_wakings.len(), 2);
        assert_eq!(entry.night_wakings[1].back_to_sleep_time, "04:15");
        assert!(entry.had_seizure);
        assert_eq!(entry.seizures.len(), 1);
        assert_eq!(entry.trigger.as_deref(), Some("#fever after #vaccine"));
    }

    #[test]
    fn test_apply_fields_clears() {
        let settings = AppSettings::default();
        let mut entry = LogEntry::new(NaiveDate::from_ymd_opt(2025, 1, 3).unwrap());
        entry.resize_night_wakings(2);
        entry.notes = Some("old".to_string());

        let mut fields = HashMap::new();
        fields.insert("wakings".to_string(), "none".to_string());
        fields.insert("notes".to_string(), "-".to_string());
        apply_fields(&mut entry, &fields, &settings).unwrap();

        assert!(!entry.woke_up_at_night);
        assert!(entry.night_wakings.is_empty());
        assert_eq!(entry.notes, None);
    }

    #[test]
    fn test_bad_time_is_an_error() {
        let settings = AppSettings::default();
        let mut entry = LogEntry::new(NaiveDate::from_ymd_opt(2025, 1, 3).unwrap());
        let mut fields = HashMap::new();
        fields.insert("wakeup".to_string(), "late".to_string());
        assert!(apply_fields(&mut entry, &fields, &settings).is_err());
    }
}
