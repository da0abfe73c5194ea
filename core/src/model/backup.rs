use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BackupError;
use crate::model::log_entry::LogEntry;
use crate::model::settings::AppSettings;
use crate::repository::merge_with_defaults;

pub const BACKUP_VERSION: u32 = 1;
pub const LOGS_SECTION: &str = "sleepLogs";
pub const SETTINGS_SECTION: &str = "appSettings";

/// Both root records in one file. Importing replaces both wholesale.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub sleep_logs: Vec<LogEntry>,
    pub app_settings: AppSettings,
}

impl Backup {
    pub fn new(sleep_logs: Vec<LogEntry>, app_settings: AppSettings) -> Self {
        Self {
            version: BACKUP_VERSION,
            exported_at: Utc::now(),
            sleep_logs,
            app_settings,
        }
    }

    /// Validates that both sections exist before decoding either of them.
    /// Settings from older backups are completed from the current defaults.
    pub fn parse(text: &str) -> Result<Self, BackupError> {
        let root: Value = serde_json::from_str(text).map_err(BackupError::Malformed)?;
        let Value::Object(mut root) = root else {
            return Err(BackupError::MissingKey(LOGS_SECTION));
        };

        let logs = root
            .remove(LOGS_SECTION)
            .filter(|v| !v.is_null())
            .ok_or(BackupError::MissingKey(LOGS_SECTION))?;
        let settings = root
            .remove(SETTINGS_SECTION)
            .filter(|v| !v.is_null())
            .ok_or(BackupError::MissingKey(SETTINGS_SECTION))?;

        let sleep_logs: Vec<LogEntry> = serde_json::from_value(logs)
            .map_err(|source| BackupError::InvalidRecord { key: LOGS_SECTION, source })?;

        let defaults = serde_json::to_value(AppSettings::default())
            .map_err(|source| BackupError::InvalidRecord { key: SETTINGS_SECTION, source })?;
        let app_settings: AppSettings = serde_json::from_value(merge_with_defaults(defaults, settings))
            .map_err(|source| BackupError::InvalidRecord { key: SETTINGS_SECTION, source })?;

        let version = root
            .get("version")
            .and_then(Value::as_u64)
            .map(|v| v as u32)
            .unwrap_or(BACKUP_VERSION);
        let exported_at = root
            .get("exportedAt")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_else(Utc::now);

        Ok(Self {
            version,
            exported_at,
            sleep_logs,
            app_settings,
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_backup_roundtrip_keeps_both_sections() {
        let entry = LogEntry::new(NaiveDate::from_ymd_opt(2025, 1, 5).unwrap());
        let mut settings = AppSettings::default();
        settings.target_wakeup_time = "06:30".to_string();

        let text = Backup::new(vec![entry.clone()], settings.clone()).to_json().unwrap();
        assert!(text.contains("\"sleepLogs\""));
        assert!(text.contains("\"appSettings\""));

        let parsed = Backup::parse(&text).unwrap();
        assert_eq!(parsed.sleep_logs, vec![entry]);
        assert_eq!(parsed.app_settings, settings);
    }

    #[test]
    fn test_missing_section_is_rejected() {
        let err = Backup::parse(r#"{"sleepLogs": []}"#).unwrap_err();
        assert!(matches!(err, BackupError::MissingKey("appSettings")));

        let err = Backup::parse(r#"{"appSettings": {}}"#).unwrap_err();
        assert!(matches!(err, BackupError::MissingKey("sleepLogs")));

        let err = Backup::parse("[1, 2]").unwrap_err();
        assert!(matches!(err, BackupError::MissingKey(_)));

        assert!(matches!(Backup::parse("not json"), Err(BackupError::Malformed(_))));
    }

    #[test]
    fn test_old_settings_section_is_completed() {
        let text = r#"{
            "sleepLogs": [],
            "appSettings": {"targetWakeupTime": "06:00", "notificationsEnabled": true}
        }"#;
        let parsed = Backup::parse(text).unwrap();
        assert_eq!(parsed.app_settings.target_wakeup_time, "06:00");
        assert!(parsed.app_settings.notifications_enabled);
        assert_eq!(parsed.app_settings.evening_reminder, "20:00");
    }
}
