use std::collections::HashMap;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::model::settings::AppSettings;
use crate::repository::{KeyValueStore, Store, DISMISSED_REMINDERS_KEY};
use crate::time::CLOCK_FORMAT;

pub const SNOOZE_MINUTES: i64 = 5;
pub const POLL_INTERVAL_SECS: u64 = 30;

/// Platform notification permission.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Granted,
    Denied,
    Default,
}

pub trait Notifier {
    fn permission(&self) -> Permission;
    fn notify(&self, title: &str, body: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderSlot {
    Morning,
    Evening,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub slot: ReminderSlot,
    /// The configured `HH:mm`; also the dismissal key.
    pub time: String,
    pub message: String,
}

pub const REMINDER_TITLE: &str = "Medication reminder";

impl ReminderSlot {
    pub fn message(&self) -> &'static str {
        match self {
            ReminderSlot::Morning => "Time for the morning medication!",
            ReminderSlot::Evening => "Time for the evening medication!",
        }
    }
}

/// Decides on every tick whether a reminder is due. Each call re-evaluates
/// from scratch, so ticks may be repeated or skipped safely.
///
/// A configured time fires at most once per day: after it is dismissed for
/// the day, or while an alarm is showing, or while snoozed, it stays quiet.
pub struct ReminderScheduler<S: KeyValueStore> {
    store: Store<S>,
    /// Reminder time (`HH:mm`) -> day it was dismissed (`YYYY-MM-DD`).
    dismissed: HashMap<String, String>,
    snooze_until: Option<NaiveDateTime>,
    snoozed: Option<Reminder>,
    active: Option<Reminder>,
}

impl<S: KeyValueStore> ReminderScheduler<S> {
    pub fn new(store: Store<S>) -> Self {
        let dismissed = store.load(DISMISSED_REMINDERS_KEY, HashMap::new());
        Self {
            store,
            dismissed,
            snooze_until: None,
            snoozed: None,
            active: None,
        }
    }

    pub fn active(&self) -> Option<&Reminder> {
        self.active.as_ref()
    }

    pub fn snooze_until(&self) -> Option<NaiveDateTime> {
        self.snooze_until
    }

    pub fn tick(
        &mut self,
        now: NaiveDateTime,
        settings: &AppSettings,
        permission: Permission,
    ) -> Option<Reminder> {
        if !settings.notifications_enabled || permission != Permission::Granted {
            return None;
        }
        if let Some(until) = self.snooze_until {
            if now < until {
                debug!("Reminders snoozed until {}", until);
                return None;
            }
        }
        if self.active.is_some() {
            return None;
        }

        let today = now.date().to_string();
        if let Some(reminder) = self.snoozed.take() {
            if self.dismissed.get(&reminder.time) != Some(&today) {
                return Some(self.raise(reminder));
            }
        }

        let current = now.format(CLOCK_FORMAT).to_string();
        let slots = [
            (ReminderSlot::Morning, &settings.morning_reminder),
            (ReminderSlot::Evening, &settings.evening_reminder),
        ];

        let (slot, time) = slots.into_iter().find(|(_, time)| {
            **time == current && self.dismissed.get(*time) != Some(&today)
        })?;

        let reminder = Reminder {
            slot,
            time: time.clone(),
            message: slot.message().to_string(),
        };
        Some(self.raise(reminder))
    }

    fn raise(&mut self, reminder: Reminder) -> Reminder {
        self.snooze_until = None;
        self.active = Some(reminder.clone());
        reminder
    }

    /// Hides the active alarm and raises it again after [`SNOOZE_MINUTES`].
    pub fn snooze(&mut self, now: NaiveDateTime) {
        self.snoozed = self.active.take();
        self.snooze_until = Some(now + Duration::minutes(SNOOZE_MINUTES));
    }

    /// Hides the active alarm and silences its time for the rest of `today`.
    pub fn dismiss(&mut self, today: NaiveDate) {
        self.snooze_until = None;
        self.snoozed = None;
        if let Some(reminder) = self.active.take() {
            self.dismissed.insert(reminder.time, today.to_string());
            self.store.save(DISMISSED_REMINDERS_KEY, &self.dismissed);
        }
    }
}
