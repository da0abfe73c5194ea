use std::io::{self, BufRead, IsTerminal, Write};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use log::info;
use sleeplog_core::service::reminder_service::{POLL_INTERVAL_SECS, REMINDER_TITLE, SNOOZE_MINUTES};
use sleeplog_core::{Diary, KeyValueStore, Notifier, Permission, ReminderScheduler};

/// Rings the terminal bell. Only granted when someone can answer on stdin.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn permission(&self) -> Permission {
        if io::stdin().is_terminal() {
            Permission::Granted
        } else {
            Permission::Denied
        }
    }

    fn notify(&self, title: &str, body: &str) {
        println!("\x07\n\x1b[1;33m{}\x1b[0m  {}", title, body);
    }
}

fn ask(question: &str) -> Result<String> {
    print!("{} ", question);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim().to_lowercase())
}

/// Polls until interrupted. Settings are those loaded at startup.
pub fn run<D, R, N>(diary: &Diary<D>, scheduler: &mut ReminderScheduler<R>, notifier: &N) -> Result<()>
where
    D: KeyValueStore,
    R: KeyValueStore,
    N: Notifier,
{
    let settings = diary.settings();
    if !settings.notifications_enabled {
        println!("Reminders are off. Enable them with: sleeplog settings set notifications on");
        return Ok(());
    }
    if notifier.permission() != Permission::Granted {
        println!("Reminders need an interactive terminal.");
        return Ok(());
    }

    println!(
        "Waiting for {} and {} (Ctrl-C to stop)",
        settings.morning_reminder, settings.evening_reminder
    );

    loop {
        let now = Local::now().naive_local();
        if let Some(reminder) = scheduler.tick(now, settings, notifier.permission()) {
            notifier.notify(REMINDER_TITLE, &reminder.message);
            let prompt = format!("[s]nooze {} min / [d]ismiss:", SNOOZE_MINUTES);
            if ask(&prompt)?.starts_with('s') {
                let now = Local::now().naive_local();
                scheduler.snooze(now);
                info!("Reminder {} snoozed", reminder.time);
            } else {
                scheduler.dismiss(Local::now().date_naive());
                info!("Reminder {} dismissed for today", reminder.time);
            }
        }
        thread::sleep(Duration::from_secs(POLL_INTERVAL_SECS));
    }
}
