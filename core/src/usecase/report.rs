use std::sync::OnceLock;

use chrono::{Datelike, Duration, Weekday};
use regex::Regex;

use crate::model::log_entry::LogEntry;
use crate::service::dto::{ChartSeries, ReportSummary};
use crate::time::parse_clock;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"#\w+").expect("tag pattern is valid"))
}

/// Time asleep between `bedtime` and `wakeup_time`, rolling over midnight
/// when waking is earlier than going to bed. Equal or unparseable times give
/// zero.
pub fn sleep_duration(bedtime: &str, wakeup_time: &str) -> Duration {
    let (Some(bed), Some(wake)) = (parse_clock(bedtime), parse_clock(wakeup_time)) else {
        return Duration::zero();
    };
    let diff = wake - bed;
    if diff < Duration::zero() {
        diff + Duration::days(1)
    } else {
        diff
    }
}

pub fn entry_sleep(entry: &LogEntry) -> Duration {
    sleep_duration(&entry.bedtime, &entry.wakeup_time)
}

/// Mean sleep over `logs`, rounded to the minute. `None` for an empty slice.
pub fn average_sleep(logs: &[LogEntry]) -> Option<Duration> {
    if logs.is_empty() {
        return None;
    }
    let total: i64 = logs.iter().map(|l| entry_sleep(l).num_minutes()).sum();
    let mean = (total as f64 / logs.len() as f64).round() as i64;
    Some(Duration::minutes(mean))
}

/// `#word` tokens in order of appearance.
pub fn extract_tags(text: &str) -> Vec<String> {
    tag_pattern()
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Trigger tags with their counts, in order of first appearance.
pub fn trigger_tag_counts(logs: &[LogEntry]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for tag in logs
        .iter()
        .filter_map(|l| l.trigger.as_deref())
        .flat_map(extract_tags)
    {
        match counts.iter_mut().find(|(t, _)| *t == tag) {
            Some((_, n)) => *n += 1,
            None => counts.push((tag, 1)),
        }
    }
    counts
}

/// The most frequent trigger tag; ties go to the tag seen first.
pub fn most_frequent_trigger(logs: &[LogEntry]) -> Option<String> {
    let mut best: Option<(String, usize)> = None;
    for (tag, count) in trigger_tag_counts(logs) {
        if best.as_ref().map_or(true, |(_, n)| count > *n) {
            best = Some((tag, count));
        }
    }
    best.map(|(tag, _)| tag)
}

/// Seizure counts per weekday, Monday first.
pub fn seizures_by_weekday(logs: &[LogEntry]) -> [usize; 7] {
    let mut buckets = [0usize; 7];
    for log in logs {
        buckets[log.date.weekday().num_days_from_monday() as usize] += log.seizure_count();
    }
    buckets
}

/// The weekday with the most seizures, earliest in the week on ties.
/// `None` when there were no seizures at all.
pub fn seizure_weekday(logs: &[LogEntry]) -> Option<Weekday> {
    let buckets = seizures_by_weekday(logs);
    let mut best: Option<(Weekday, usize)> = None;
    for (day, count) in WEEKDAYS.into_iter().zip(buckets) {
        if count > 0 && best.map_or(true, |(_, n)| count > n) {
            best = Some((day, count));
        }
    }
    best.map(|(day, _)| day)
}

/// Summary and chart data for an ascending, range-filtered slice.
pub struct Report {
    pub summary: ReportSummary,
    pub chart: ChartSeries,
}

impl Report {
    pub fn build(logs: &[LogEntry]) -> Self {
        let summary = ReportSummary {
            days: logs.len(),
            average_sleep_minutes: average_sleep(logs).map(|d| d.num_minutes()),
            total_seizures: logs.iter().map(LogEntry::seizure_count).sum(),
            total_night_wakings: logs.iter().map(LogEntry::night_waking_count).sum(),
            early_wakeups: logs.iter().filter(|l| l.is_early_wakeup).count(),
            most_frequent_trigger: most_frequent_trigger(logs),
            seizure_weekday: seizure_weekday(logs),
        };

        let chart = ChartSeries {
            labels: logs.iter().map(|l| l.date.format("%d.%m").to_string()).collect(),
            sleep_hours: logs
                .iter()
                .map(|l| entry_sleep(l).num_minutes() as f64 / 60.0)
                .collect(),
            seizure_counts: logs.iter().map(|l| l.seizure_count() as u64).collect(),
            waking_counts: logs.iter().map(|l| l.night_waking_count() as u64).collect(),
        };

        Self { summary, chart }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::format_duration;
    use chrono::NaiveDate;

    fn entry(date: &str, bed: &str, wake: &str) -> LogEntry {
        let mut e = LogEntry::new(NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap());
        e.bedtime = bed.to_string();
        e.wakeup_time = wake.to_string();
        e
    }

    #[test]
    fn test_sleep_duration_examples() {
        assert_eq!(format_duration(sleep_duration("21:00", "07:00")), "10h0m");
        assert_eq!(format_duration(sleep_duration("23:30", "00:15")), "0h45m");
        assert_eq!(format_duration(sleep_duration("08:00", "08:00")), "0h0m");
    }

    #[test]
    fn test_sleep_duration_degrades_to_zero() {
        assert_eq!(sleep_duration("", "07:00"), Duration::zero());
        assert_eq!(sleep_duration("21:00", "later"), Duration::zero());
    }

    #[test]
    fn test_average_sleep() {
        assert_eq!(average_sleep(&[]), None);
        let logs = vec![
            entry("2025-01-01", "21:00", "07:00"),
            entry("2025-01-02", "22:00", "07:00"),
        ];
        assert_eq!(average_sleep(&logs), Some(Duration::minutes(570)));
    }

    #[test]
    fn test_most_frequent_trigger_first_maximum_wins() {
        let mut a = entry("2025-01-01", "21:00", "07:00");
        a.trigger = Some("#fever and #stress".to_string());
        let mut b = entry("2025-01-02", "21:00", "07:00");
        b.trigger = Some("#stress #fever".to_string());
        let mut c = entry("2025-01-03", "21:00", "07:00");
        c.trigger = Some("no tags here".to_string());

        assert_eq!(
            trigger_tag_counts(&[a.clone(), b.clone(), c]),
            vec![("#fever".to_string(), 2), ("#stress".to_string(), 2)]
        );
        assert_eq!(most_frequent_trigger(&[a.clone(), b]), Some("#fever".to_string()));

        let mut d = entry("2025-01-04", "21:00", "07:00");
        d.trigger = Some("#stress".to_string());
        let e = entry("2025-01-05", "21:00", "07:00");
        assert_eq!(most_frequent_trigger(&[a, d, e]), Some("#stress".to_string()));
        assert_eq!(most_frequent_trigger(&[]), None);
    }

    #[test]
    fn test_seizure_weekday() {
        // 2025-03-10 is a Monday, 2025-03-12 a Wednesday
        let mut mon = entry("2025-03-10", "21:00", "07:00");
        mon.resize_seizures(1);
        let mut wed = entry("2025-03-12", "21:00", "07:00");
        wed.resize_seizures(2);
        let quiet = entry("2025-03-13", "21:00", "07:00");

        assert_eq!(seizures_by_weekday(&[mon.clone(), wed.clone()]), [1, 0, 2, 0, 0, 0, 0]);
        assert_eq!(seizure_weekday(&[mon, wed]), Some(Weekday::Wed));
        assert_eq!(seizure_weekday(&[quiet]), None);
    }

    #[test]
    fn test_report_build() {
        let mut a = entry("2025-03-10", "21:00", "07:00");
        a.resize_night_wakings(2);
        a.is_early_wakeup = true;
        let mut b = entry("2025-03-11", "23:30", "06:30");
        b.resize_seizures(1);
        b.trigger = Some("#fever".to_string());

        let report = Report::build(&[a, b]);
        assert_eq!(report.summary.days, 2);
        assert_eq!(report.summary.average_sleep_label(), "8h30m");
        assert_eq!(report.summary.total_seizures, 1);
        assert_eq!(report.summary.total_night_wakings, 2);
        assert_eq!(report.summary.early_wakeups, 1);
        assert_eq!(report.summary.trigger_label(), "#fever");
        assert_eq!(report.summary.weekday_label(), "Tue");
        assert_eq!(report.chart.labels, vec!["10.03", "11.03"]);
        assert_eq!(report.chart.sleep_hours, vec![10.0, 7.0]);
        assert_eq!(report.chart.waking_counts, vec![2, 0]);
    }

    #[test]
    fn test_empty_report_has_defined_values() {
        let report = Report::build(&[]);
        assert_eq!(report.summary.average_sleep_label(), "no data");
        assert_eq!(report.summary.trigger_label(), "none");
        assert_eq!(report.summary.weekday_label(), "none");
        assert!(report.chart.labels.is_empty());
    }
}
