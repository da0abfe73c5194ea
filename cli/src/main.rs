mod analysis;
mod calendar;
mod history;
mod remind;
mod stats;
mod tui;

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use chrono::{Duration, Local, NaiveDate};
use clap::Parser;
use sleeplog_core::input::ENTRY_KEYS;
use sleeplog_core::repository::FileStore;
use sleeplog_core::service::export::{export_rows, to_csv};
use sleeplog_core::time::{normalize_clock, parse_month};
use sleeplog_core::usecase::calendar::month_grid;
use sleeplog_core::{
    apply_fields, expand_key, normalize_fields, parse_args, parse_day, request_analysis, AppSettings,
    Backup, Config, Diary, FactorSet, ReminderScheduler, Report,
};

use crate::analysis::GeminiAnalyst;

#[derive(Parser)]
#[command(name = "sleeplog")]
#[command(about = "A sleep, medication and seizure diary", long_about = None)]
struct Cli {
    /// Data directory (default: $SLEEPLOG_HOME or ~/.sleeplog)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Add or update a day (usage: log yesterday bed:21:30 wake:06:40 wakings:02:10-02:40 m:Depakine)
    Log {
        /// Day (today, yesterday, -2d, mon, 2025-01-31) followed by key:value fields
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Show one day in full
    Show { date: String },
    /// List recent entries
    List {
        #[arg(long, default_value_t = 14)]
        limit: usize,
    },
    /// Delete the entry for a day
    Delete { date: String },
    /// Print a month with each day's tier (YYYY-MM, default: current month)
    Calendar { month: Option<String> },
    /// Summary statistics for a period (default: 7 days ago through today, 8 days inclusive)
    Report {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        /// Print one row per day
        #[arg(long)]
        table: bool,
        /// Write one row per day as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Open the sleep chart
        #[arg(long)]
        chart: bool,
    },
    /// Ask the AI service for a written analysis of a period
    Analyze {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
    /// View or change settings
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },
    /// Export or import a full backup
    Backup {
        #[command(subcommand)]
        action: BackupAction,
    },
    /// Run the medication reminder loop
    Remind,
    /// Open the calendar browser
    Tui,
}

#[derive(clap::Subcommand)]
enum SettingsAction {
    Show,
    /// Keys: target, morning, evening, notifications
    Set { key: String, value: String },
    /// Toggle a factor (seizure, wakings, early) for a tier (red, orange, yellow)
    Factor { tier: String, factor: String, state: String },
    /// Medication templates for quick-fill
    Med {
        #[command(subcommand)]
        action: MedAction,
    },
    /// Add a suggested tag
    Tag { kind: TagKind, tag: String },
}

#[derive(clap::Subcommand)]
enum MedAction {
    Add { name: String, dosage: String },
    /// Remove by id or name
    Remove { key: String },
}

#[derive(clap::ValueEnum, Clone, Copy)]
enum TagKind {
    Note,
    Trigger,
}

#[derive(clap::Subcommand)]
enum BackupAction {
    Export { file: PathBuf },
    /// Replace all entries and settings with the file's content
    Import {
        file: PathBuf,
        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,
    },
}

/// The default report runs from this many days ago through today.
const DEFAULT_REPORT_DAYS: i64 = 7;

const SETTING_KEYS: &[&str] = &["target", "morning", "evening", "notifications"];
const TIER_KEYS: &[&str] = &["red", "orange", "yellow"];
const FACTOR_KEYS: &[&str] = &["seizure", "wakings", "early"];

fn parse_switch(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "on" | "yes" | "true" | "1" => Ok(true),
        "off" | "no" | "false" | "0" => Ok(false),
        _ => Err(anyhow!("Expected on/off, got '{}'", value)),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn resolve_range(from: Option<&str>, to: Option<&str>) -> Result<(NaiveDate, NaiveDate)> {
    let today = today();
    let end = match to {
        Some(d) => parse_day(d, today)?,
        None => today,
    };
    let start = match from {
        Some(d) => parse_day(d, today)?,
        None => end
            .checked_sub_signed(Duration::days(DEFAULT_REPORT_DAYS))
            .ok_or_else(|| anyhow!("No default period before {}", end))?,
    };
    if start > end {
        bail!("Start date {} is after end date {}", start, end);
    }
    Ok((start, end))
}

fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = Config::resolve(cli.data_dir)?;
    let mut diary = Diary::open(config.open_store()?);

    match cli.command {
        Some(Commands::Log { args }) => {
            let parsed = parse_args(&args);
            let date = if parsed.name.is_empty() {
                today()
            } else {
                parse_day(&parsed.name, today())?
            };

            let fields = normalize_fields(parsed.metadata)
                .map_err(|e| anyhow!("{} (known keys: {})", e, ENTRY_KEYS.join(", ")))?;
            let mut entry = diary.entry_or_new(date);
            let existed = diary.entry(date).is_some();
            apply_fields(&mut entry, &fields, diary.settings())?;

            let factors = diary.factors();
            let saved = diary.save_entry(entry);
            println!(
                "{} {} ({})",
                if existed { "Updated" } else { "Logged" },
                saved.date,
                saved.tier(&factors)
            );
            history::print_entry(saved, &factors);
        }
        Some(Commands::Show { date }) => {
            let date = parse_day(&date, today())?;
            match diary.entry(date) {
                Some(entry) => history::print_entry(entry, &diary.factors()),
                None => println!("No entry for {}.", date),
            }
        }
        Some(Commands::List { limit }) => {
            let logs: Vec<_> = diary.logs().iter().take(limit).cloned().collect();
            history::show_history(&logs, &diary.factors());
        }
        Some(Commands::Delete { date }) => {
            let date = parse_day(&date, today())?;
            if diary.delete_log(date) {
                println!("Deleted {}.", date);
            } else {
                println!("No entry for {}.", date);
            }
        }
        Some(Commands::Calendar { month }) => {
            let today = today();
            let (year, month) = match month {
                Some(m) => parse_month(&m)?,
                None => (chrono::Datelike::year(&today), chrono::Datelike::month(&today)),
            };
            let grid = month_grid(year, month, today, diary.logs(), &diary.factors());
            calendar::print_month(year, month, &grid);
        }
        Some(Commands::Report { from, to, table, csv, chart }) => {
            let (start, end) = resolve_range(from.as_deref(), to.as_deref())?;
            let logs = diary.logs_in_range(start, end);

            if chart {
                return stats::run(&logs, start, end);
            }

            let report = Report::build(&logs);
            history::print_summary(&report.summary, start, end);
            if table {
                history::show_export_table(&export_rows(&logs));
            }
            if let Some(path) = csv {
                if logs.is_empty() {
                    println!("Nothing to export for this period.");
                } else {
                    fs::write(&path, to_csv(&export_rows(&logs)))?;
                    println!("Wrote {} rows to {}", logs.len(), path.display());
                }
            }
        }
        Some(Commands::Analyze { from, to }) => {
            let (start, end) = resolve_range(from.as_deref(), to.as_deref())?;
            let logs = diary.logs_in_range(start, end);
            let analyst = GeminiAnalyst::from_env();
            match analyst.and_then(|a| request_analysis(&a, &logs)) {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    eprintln!("Nothing was changed; you can run the analysis again.");
                }
            }
        }
        Some(Commands::Settings { action }) => {
            run_settings(&mut diary, action.unwrap_or(SettingsAction::Show))?;
        }
        Some(Commands::Backup { action }) => match action {
            BackupAction::Export { file } => {
                let backup = diary.export_backup();
                fs::write(&file, backup.to_json()?)?;
                println!("Exported {} entries to {}", backup.sleep_logs.len(), file.display());
            }
            BackupAction::Import { file, yes } => {
                let text = fs::read_to_string(&file)?;
                let backup = match Backup::parse(&text) {
                    Ok(b) => b,
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        eprintln!("Nothing was imported.");
                        return Ok(());
                    }
                };
                let question = format!(
                    "Replace {} entries and all settings with {} entries from {}?",
                    diary.logs().len(),
                    backup.sleep_logs.len(),
                    file.display()
                );
                if !yes && !confirm(&question)? {
                    println!("Import cancelled.");
                    return Ok(());
                }
                diary.import_backup(backup);
                println!("Imported {} entries.", diary.logs().len());
            }
        },
        Some(Commands::Remind) => {
            let mut scheduler = ReminderScheduler::new(config.open_store()?);
            remind::run(&diary, &mut scheduler, &remind::TerminalNotifier)?;
        }
        Some(Commands::Tui) | None => {
            tui::run(diary)?;
        }
    }
    Ok(())
}

fn run_settings(diary: &mut Diary<FileStore>, action: SettingsAction) -> Result<()> {
    let mut settings: AppSettings = diary.settings().clone();

    match action {
        SettingsAction::Show => {
            history::print_settings(&settings);
            return Ok(());
        }
        SettingsAction::Set { key, value } => match expand_key(&key, SETTING_KEYS)?.as_str() {
            "target" => settings.target_wakeup_time = normalize_clock(&value)?,
            "morning" => settings.morning_reminder = normalize_clock(&value)?,
            "evening" => settings.evening_reminder = normalize_clock(&value)?,
            "notifications" => settings.notifications_enabled = parse_switch(&value)?,
            _ => {}
        },
        SettingsAction::Factor { tier, factor, state } => {
            let enabled = parse_switch(&state)?;
            let set: &mut FactorSet = match expand_key(&tier, TIER_KEYS)?.as_str() {
                "red" => &mut settings.red_day_factors,
                "orange" => &mut settings.orange_day_factors,
                _ => &mut settings.yellow_day_factors,
            };
            match expand_key(&factor, FACTOR_KEYS)?.as_str() {
                "seizure" => set.seizure = enabled,
                "wakings" => set.night_wakings = enabled,
                _ => set.early_wakeup = enabled,
            }
        }
        SettingsAction::Med { action } => match action {
            MedAction::Add { name, dosage } => {
                let template = settings.add_medication(&name, &dosage);
                println!("Added {} {} ({})", template.name, template.dosage, template.id);
            }
            MedAction::Remove { key } => {
                if settings.remove_medication(&key) == 0 {
                    println!("No medication template matches '{}'.", key);
                    return Ok(());
                }
            }
        },
        SettingsAction::Tag { kind, tag } => {
            let added = match kind {
                TagKind::Note => settings.add_note_tag(&tag),
                TagKind::Trigger => settings.add_trigger_tag(&tag),
            };
            if !added {
                println!("Tag '{}' is empty or already present.", tag);
                return Ok(());
            }
        }
    }

    diary.update_settings(settings);
    history::print_settings(diary.settings());
    Ok(())
}
