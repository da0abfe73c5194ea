use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate};

use crate::model::log_entry::LogEntry;
use crate::model::severity::{classify, SeverityFactors};
use crate::service::dto::CalendarCell;

/// Moves `(year, month)` by `delta` months.
pub fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let index = year * 12 + month as i32 - 1 + delta;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

pub fn first_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Monday-first weeks covering the whole month, padded with days of the
/// neighbouring months. Each cell carries the day's tier under `factors`.
pub fn month_grid(
    year: i32,
    month: u32,
    today: NaiveDate,
    logs: &[LogEntry],
    factors: &SeverityFactors,
) -> Vec<Vec<CalendarCell>> {
    let Some(month_start) = first_of_month(year, month) else {
        return Vec::new();
    };
    let (next_year, next_month) = shift_month(year, month, 1);
    let month_end = first_of_month(next_year, next_month)
        .map(|d| d - Duration::days(1))
        .unwrap_or(month_start);

    let by_date: HashMap<NaiveDate, &LogEntry> = logs.iter().map(|l| (l.date, l)).collect();

    let offset = month_start.weekday().num_days_from_monday() as i64;
    let mut day = month_start - Duration::days(offset);
    let mut weeks = Vec::new();

    while day <= month_end {
        let mut week = Vec::with_capacity(7);
        for _ in 0..7 {
            week.push(CalendarCell {
                date: day,
                in_month: day.month() == month && day.year() == year,
                is_today: day == today,
                tier: classify(by_date.get(&day).copied(), factors),
            });
            day += Duration::days(1);
        }
        weeks.push(week);
    }
    weeks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::settings::AppSettings;
    use crate::model::severity::Tier;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_shift_month() {
        assert_eq!(shift_month(2025, 1, -1), (2024, 12));
        assert_eq!(shift_month(2025, 12, 1), (2026, 1));
        assert_eq!(shift_month(2025, 5, 0), (2025, 5));
        assert_eq!(shift_month(2025, 3, -15), (2023, 12));
    }

    #[test]
    fn test_month_grid_shape() {
        let factors = AppSettings::default().severity_factors();
        // March 2025 starts on a Saturday and ends on a Monday.
        let grid = month_grid(2025, 3, date("2025-03-15"), &[], &factors);
        assert_eq!(grid.len(), 6);
        assert!(grid.iter().all(|w| w.len() == 7));
        assert_eq!(grid[0][0].date, date("2025-02-24"));
        assert!(!grid[0][0].in_month);
        assert_eq!(grid[0][5].date, date("2025-03-01"));
        assert_eq!(grid[5][0].date, date("2025-03-31"));
        assert_eq!(grid[5][6].date, date("2025-04-06"));

        let in_month = grid.iter().flatten().filter(|c| c.in_month).count();
        assert_eq!(in_month, 31);
        let today: Vec<_> = grid.iter().flatten().filter(|c| c.is_today).collect();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].date, date("2025-03-15"));
    }

    #[test]
    fn test_month_grid_tiers() {
        let settings = AppSettings::default();
        let mut seizure_day = LogEntry::new(date("2025-03-04"));
        seizure_day.set_had_seizure(true);
        let calm_day = LogEntry::new(date("2025-03-05"));

        let grid = month_grid(2025, 3, date("2025-03-15"), &[seizure_day, calm_day], &settings.severity_factors());
        let tier_of = |d: &str| {
            grid.iter().flatten().find(|c| c.date == date(d)).map(|c| c.tier)
        };
        assert_eq!(tier_of("2025-03-04"), Some(Tier::Red));
        assert_eq!(tier_of("2025-03-05"), Some(Tier::Green));
        assert_eq!(tier_of("2025-03-06"), Some(Tier::None));
    }
}
