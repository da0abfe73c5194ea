use std::fs;

use chrono::NaiveDate;
use sleeplog_core::repository::{LOGS_KEY, SETTINGS_KEY};
use sleeplog_core::{AppSettings, Backup, Config, Diary, LogEntry, Tier};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn test_diary_survives_restart_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::resolve(Some(dir.path().to_path_buf())).unwrap();

    let mut diary = Diary::open(config.open_store().unwrap());
    let mut entry = LogEntry::new(date("2025-02-14"));
    entry.wakeup_time = "05:50".to_string();
    entry.set_had_seizure(true);
    diary.save_entry(entry);
    diary.save_entry(LogEntry::new(date("2025-02-15")));

    let reopened = Diary::open(config.open_store().unwrap());
    assert_eq!(reopened.logs().len(), 2);
    assert_eq!(reopened.logs()[0].date, date("2025-02-15"));
    assert!(reopened.logs()[1].is_early_wakeup);
    assert_eq!(reopened.tier_for(date("2025-02-14")), Tier::Red);
    assert_eq!(reopened.tier_for(date("2025-02-15")), Tier::Green);
}

#[test]
fn test_files_from_an_older_version_load() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(format!("{}.json", SETTINGS_KEY)),
        r#"{"targetWakeupTime": "06:30", "morningReminder": "08:15", "eveningReminder": "20:00", "notificationsEnabled": false}"#,
    )
    .unwrap();
    fs::write(
        dir.path().join(format!("{}.json", LOGS_KEY)),
        r#"[{"id": "2024-10-01", "date": "2024-10-01", "bedtime": "21:00", "wakeupTime": "06:00",
             "morningMeds": {"name": "", "dosage": ""}, "eveningMeds": {"name": "", "dosage": ""},
             "wokeUpAtNight": true, "nightWakings": [{"wakeTime": "03:00", "backToSleepTime": "03:20"}],
             "notes": "", "isRedDay": true}]"#,
    )
    .unwrap();

    let config = Config::resolve(Some(dir.path().to_path_buf())).unwrap();
    let diary = Diary::open(config.open_store().unwrap());

    assert_eq!(diary.settings().target_wakeup_time, "06:30");
    assert_eq!(diary.settings().morning_reminder, "08:15");
    assert_eq!(diary.settings().red_day_factors, AppSettings::default().red_day_factors);
    assert_eq!(diary.logs().len(), 1);
    assert!(diary.logs()[0].is_early_wakeup);
    // Default factors: night wakings are orange.
    assert_eq!(diary.tier_for(date("2024-10-01")), Tier::Orange);
}

#[test]
fn test_corrupt_files_fall_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(format!("{}.json", SETTINGS_KEY)), "{{{").unwrap();
    fs::write(dir.path().join(format!("{}.json", LOGS_KEY)), "").unwrap();

    let config = Config::resolve(Some(dir.path().to_path_buf())).unwrap();
    let diary = Diary::open(config.open_store().unwrap());
    assert!(diary.logs().is_empty());
    assert_eq!(diary.settings(), &AppSettings::default());
}

#[test]
fn test_backup_export_import_between_directories() {
    let source_dir = tempfile::tempdir().unwrap();
    let target_dir = tempfile::tempdir().unwrap();

    let source = Config::resolve(Some(source_dir.path().to_path_buf())).unwrap();
    let mut diary = Diary::open(source.open_store().unwrap());
    diary.save_entry(LogEntry::new(date("2025-01-10")));
    let text = diary.export_backup().to_json().unwrap();

    let target = Config::resolve(Some(target_dir.path().to_path_buf())).unwrap();
    let mut other = Diary::open(target.open_store().unwrap());
    other.save_entry(LogEntry::new(date("2023-05-05")));
    other.import_backup(Backup::parse(&text).unwrap());

    let reopened = Diary::open(target.open_store().unwrap());
    assert_eq!(reopened.logs().len(), 1);
    assert_eq!(reopened.logs()[0].date, date("2025-01-10"));
}

#[test]
fn test_one_bad_record_does_not_wipe_the_history() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(format!("{}.json", LOGS_KEY)),
        r#"[{"date": "2025-04-03", "bedtime": "21:00", "wakeupTime": "07:00"},
            {"date": "2025-04-02", "bedtime": "22:00", "wakeupTime": "06:00", "hadSeizure": true,
             "seizures": [{"startTime": "03:00", "endTime": "03:02"}]},
            {"date": "2025-04-01", "bedtime": null, "wakeupTime": "06:30"},
            {"bedtime": "21:00"}]"#,
    )
    .unwrap();
    fs::write(
        dir.path().join(format!("{}.json", SETTINGS_KEY)),
        r#"{"targetWakeupTime": "06:45", "notificationsEnabled": 1}"#,
    )
    .unwrap();

    let config = Config::resolve(Some(dir.path().to_path_buf())).unwrap();
    let mut diary = Diary::open(config.open_store().unwrap());
    assert_eq!(diary.logs().len(), 3);
    assert_eq!(diary.entry(date("2025-04-01")).unwrap().wakeup_time, "06:30");
    assert_eq!(diary.settings().target_wakeup_time, "06:45");
    assert!(!diary.settings().notifications_enabled);

    diary.save_entry(LogEntry::new(date("2025-04-04")));

    let reopened = Diary::open(config.open_store().unwrap());
    assert_eq!(reopened.logs().len(), 4);
    assert_eq!(reopened.tier_for(date("2025-04-02")), Tier::Red);
    assert_eq!(reopened.settings().target_wakeup_time, "06:45");
}
