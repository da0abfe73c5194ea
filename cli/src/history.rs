use chrono::NaiveDate;
use sleeplog_core::service::dto::{ExportRow, ReportSummary};
use sleeplog_core::usecase::report::entry_sleep;
use sleeplog_core::{format_duration, AppSettings, FactorSet, LogEntry, Medication, SeverityFactors, Tier};
use tabled::settings::object::Rows;
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Tier")]
    tier: String,
    #[tabled(rename = "Sleep")]
    sleep: String,
    #[tabled(rename = "Bed/Wake")]
    times: String,
    #[tabled(rename = "Wakings")]
    wakings: usize,
    #[tabled(rename = "Seizures")]
    seizures: usize,
    #[tabled(rename = "Meds")]
    meds: String,
}

#[derive(Tabled)]
struct ExportTableRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Sleep")]
    sleep: String,
    #[tabled(rename = "Wakings")]
    wakings: usize,
    #[tabled(rename = "Dosage")]
    dosage: String,
    #[tabled(rename = "Seizure")]
    seizure: String,
}

pub fn tier_ansi(tier: Tier) -> &'static str {
    match tier {
        Tier::Red => "\x1b[1;31m",
        Tier::Orange => "\x1b[38;5;208m",
        Tier::Yellow => "\x1b[33m",
        Tier::Green => "\x1b[32m",
        Tier::None => "\x1b[2m",
    }
}

fn meds_label(meds: &[&Medication]) -> String {
    let parts: Vec<String> = meds
        .iter()
        .filter(|m| !m.is_empty())
        .map(|m| format!("{} {}", m.name, m.dosage).trim().to_string())
        .collect();
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(" / ")
    }
}

/// Newest first, as stored.
pub fn show_history(logs: &[LogEntry], factors: &SeverityFactors) {
    if logs.is_empty() {
        println!("No entries yet. Start with: sleeplog log today bed:21:30 wake:06:45");
        return;
    }

    let rows: Vec<HistoryRow> = logs
        .iter()
        .map(|log| HistoryRow {
            date: format!("{} ({})", log.date, log.date.format("%a")),
            tier: log.tier(factors).to_string(),
            sleep: format_duration(entry_sleep(log)),
            times: format!("{}-{}", log.bedtime, log.wakeup_time),
            wakings: log.night_waking_count(),
            seizures: log.seizure_count(),
            meds: meds_label(&[&log.morning_meds, &log.evening_meds]),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
    println!("{}", table);
}

pub fn show_export_table(rows: &[ExportRow]) {
    if rows.is_empty() {
        return;
    }
    let rows: Vec<ExportTableRow> = rows
        .iter()
        .map(|row| ExportTableRow {
            date: row.date.clone(),
            sleep: row.sleep_duration.clone(),
            wakings: row.night_wakings,
            dosage: row.total_dosage.clone(),
            seizure: if row.seizure { "yes" } else { "no" }.to_string(),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
    println!("{}", table);
}

pub fn print_entry(entry: &LogEntry, factors: &SeverityFactors) {
    let tier = entry.tier(factors);
    println!(
        "\n\x1b[1;36m{} ({})\x1b[0m  {}{}\x1b[0m",
        entry.date,
        entry.date.format("%A"),
        tier_ansi(tier),
        tier
    );
    println!(
        "  Sleep     {} - {}  ({}){}",
        entry.bedtime,
        entry.wakeup_time,
        format_duration(entry_sleep(entry)),
        if entry.is_early_wakeup { "  early" } else { "" }
    );
    println!("  Morning   {}", meds_label(&[&entry.morning_meds]));
    println!("  Evening   {}", meds_label(&[&entry.evening_meds]));

    if entry.woke_up_at_night {
        println!("  Wakings   {}", entry.night_waking_count());
        for waking in &entry.night_wakings {
            println!("            {} - {}", waking.wake_time, waking.back_to_sleep_time);
        }
    }
    if entry.had_seizure {
        println!("  Seizures  {}", entry.seizure_count());
        for seizure in &entry.seizures {
            println!("            {} - {}", seizure.start_time, seizure.end_time);
        }
    }
    if let Some(trigger) = entry.trigger.as_deref().filter(|t| !t.is_empty()) {
        println!("  Trigger   {}", trigger);
    }
    if let Some(notes) = entry.notes.as_deref().filter(|n| !n.is_empty()) {
        println!("  Notes     {}", notes);
    }
}

pub fn print_summary(summary: &ReportSummary, start: NaiveDate, end: NaiveDate) {
    println!("\n\x1b[1;36mReport {} .. {}\x1b[0m ({} days logged)", start, end, summary.days);
    println!("  Average sleep        {}", summary.average_sleep_label());
    println!("  Seizures             {}", summary.total_seizures);
    println!("  Night wakings        {}", summary.total_night_wakings);
    println!("  Early wake-ups       {}", summary.early_wakeups);
    println!("  Most frequent trigger {}", summary.trigger_label());
    println!("  Seizure weekday      {}", summary.weekday_label());
}

fn factor_label(set: &FactorSet) -> String {
    let mut names = Vec::new();
    if set.seizure {
        names.push("seizure");
    }
    if set.night_wakings {
        names.push("wakings");
    }
    if set.early_wakeup {
        names.push("early");
    }
    if names.is_empty() {
        "-".to_string()
    } else {
        names.join(", ")
    }
}

pub fn print_settings(settings: &AppSettings) {
    println!("\x1b[1;36mSettings\x1b[0m");
    println!("  Target wake-up   {}", settings.target_wakeup_time);
    println!("  Morning reminder {}", settings.morning_reminder);
    println!("  Evening reminder {}", settings.evening_reminder);
    println!(
        "  Notifications    {}",
        if settings.notifications_enabled { "on" } else { "off" }
    );
    println!("  {}Red\x1b[0m     {}", tier_ansi(Tier::Red), factor_label(&settings.red_day_factors));
    println!("  {}Orange\x1b[0m  {}", tier_ansi(Tier::Orange), factor_label(&settings.orange_day_factors));
    println!("  {}Yellow\x1b[0m  {}", tier_ansi(Tier::Yellow), factor_label(&settings.yellow_day_factors));

    if !settings.medications.is_empty() {
        println!("  Medications");
        for med in &settings.medications {
            println!("    {} {}  ({})", med.name, med.dosage, med.id);
        }
    }
    if !settings.note_tags.is_empty() {
        println!("  Note tags        {}", settings.note_tags.join(" "));
    }
    if !settings.trigger_tags.is_empty() {
        println!("  Trigger tags     {}", settings.trigger_tags.join(" "));
    }
}
