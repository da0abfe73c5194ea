pub mod config;
pub mod error;
pub mod input;
pub mod model;
pub mod repository;
pub mod service;
pub mod time;
pub mod usecase;

pub use config::Config;
pub use error::{AnalysisError, BackupError};
pub use input::{apply_fields, expand_key, normalize_fields, parse_args, ParsedInput};
pub use model::backup::Backup;
pub use model::log_entry::{LogEntry, Medication, NightWaking, Seizure};
pub use model::settings::{AppSettings, MedicationTemplate};
pub use model::severity::{classify, FactorSet, SeverityFactors, Tier};
pub use repository::{FileStore, KeyValueStore, MemoryStore, Store};
pub use service::analysis::{request_analysis, Analyst};
pub use service::diary_service::{upsert_log, Diary};
pub use service::reminder_service::{Notifier, Permission, Reminder, ReminderScheduler};
pub use time::{format_duration, parse_clock, parse_day};
pub use usecase::report::Report;
