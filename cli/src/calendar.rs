use chrono::{Datelike, NaiveDate};
use crossterm::style::{Color, Stylize};
use sleeplog_core::service::dto::CalendarCell;
use sleeplog_core::Tier;

const WEEKDAY_HEADER: &str = " Mo  Tu  We  Th  Fr  Sa  Su";

pub fn tier_color(tier: Tier) -> Option<Color> {
    match tier {
        Tier::Red => Some(Color::Red),
        Tier::Orange => Some(Color::AnsiValue(208)),
        Tier::Yellow => Some(Color::Yellow),
        Tier::Green => Some(Color::Green),
        Tier::None => None,
    }
}

pub fn print_month(year: i32, month: u32, grid: &[Vec<CalendarCell>]) {
    let title = NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%B %Y").to_string())
        .unwrap_or_default();
    println!("{}", format!("{:^27}", title).bold());
    println!("{}", WEEKDAY_HEADER.dark_grey());

    for week in grid {
        let mut line = String::new();
        for cell in week {
            let text = format!("{:>3} ", cell.date.day());
            let styled = if !cell.in_month {
                text.dark_grey()
            } else {
                match tier_color(cell.tier) {
                    Some(color) => text.with(color),
                    None => text.stylize(),
                }
            };
            let styled = if cell.is_today { styled.underlined().bold() } else { styled };
            line.push_str(&styled.to_string());
        }
        println!("{}", line);
    }

    println!();
    println!(
        "{}  {}  {}  {}",
        "■ red".with(Color::Red),
        "■ orange".with(Color::AnsiValue(208)),
        "■ yellow".with(Color::Yellow),
        "■ green".with(Color::Green)
    );
}
