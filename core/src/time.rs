use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use anyhow::{anyhow, Result};

pub const CLOCK_FORMAT: &str = "%H:%M";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a 24h `HH:mm` time of day. Anything else is `None`.
pub fn parse_clock(input: &str) -> Option<NaiveTime> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    NaiveTime::parse_from_str(input, CLOCK_FORMAT).ok()
}

/// Accepts `7:05`, `07:05` or `0705` and returns the zero-padded `HH:mm` form
/// that stored entries compare lexicographically.
pub fn normalize_clock(input: &str) -> Result<String> {
    let input = input.trim();
    let candidate = if input.len() == 4 && input.chars().all(|c| c.is_ascii_digit()) {
        format!("{}:{}", &input[..2], &input[2..])
    } else {
        input.to_string()
    };
    parse_clock(&candidate)
        .map(|t| t.format(CLOCK_FORMAT).to_string())
        .ok_or_else(|| anyhow!("Invalid time of day: '{}' (expected HH:mm)", input))
}

/// Resolves a day relative to `today`.
///
/// Accepts `today`, `yesterday`, `-Nd` / `-Nw`, a weekday name (the most
/// recent such day, today included) or `YYYY-MM-DD`.
pub fn parse_day(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let input = input.trim();

    // 1. Reserved keywords
    match input.to_lowercase().as_str() {
        "today" | "tod" => return Ok(today),
        "yesterday" | "yest" => return Ok(today - Duration::days(1)),
        _ => {}
    }

    // 2. Relative format (-Nd, -Nw)
    if let Some(rest) = input.strip_prefix('-') {
        if rest.len() >= 2 {
            let (num_str, unit) = rest.split_at(rest.len() - 1);
            let count: i64 = num_str.parse().map_err(|_| anyhow!("Invalid relative format: {}", input))?;
            let offset = match unit {
                "d" => Duration::try_days(count),
                "w" => Duration::try_weeks(count),
                _ => return Err(anyhow!("Unknown unit in relative date: {}", unit)),
            };
            return offset
                .and_then(|offset| today.checked_sub_signed(offset))
                .ok_or_else(|| anyhow!("Relative date out of range: {}", input));
        }
    }

    // 3. Weekday, looking backwards
    if let Ok(target) = parse_weekday_str(input) {
        let back = (today.weekday().num_days_from_monday() + 7 - target.num_days_from_monday()) % 7;
        return Ok(today - Duration::days(back as i64));
    }

    // 4. Canonical date
    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .map_err(|_| anyhow!("Could not parse date: {}", input))
}

/// Parses `YYYY-MM` into `(year, month)`.
pub fn parse_month(input: &str) -> Result<(i32, u32)> {
    let date = NaiveDate::parse_from_str(&format!("{}-01", input.trim()), DATE_FORMAT)
        .map_err(|_| anyhow!("Could not parse month: {} (expected YYYY-MM)", input))?;
    Ok((date.year(), date.month()))
}

/// `10h0m` style, never negative.
pub fn format_duration(duration: Duration) -> String {
    let minutes = duration.num_minutes().max(0);
    format!("{}h{}m", minutes / 60, minutes % 60)
}

pub fn parse_weekday_str(s: &str) -> Result<Weekday> {
    match s.to_lowercase().as_str() {
        "mon" | "monday" => Ok(Weekday::Mon),
        "tue" | "tuesday" => Ok(Weekday::Tue),
        "wed" | "wednesday" => Ok(Weekday::Wed),
        "thu" | "thursday" => Ok(Weekday::Thu),
        "fri" | "friday" => Ok(Weekday::Fri),
        "sat" | "saturday" => Ok(Weekday::Sat),
        "sun" | "sunday" => Ok(Weekday::Sun),
        _ => Err(anyhow!("Invalid weekday")),
    }
}
