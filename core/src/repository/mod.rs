pub mod file;
pub mod memory;
pub mod store;
pub mod traits;

// Re-export
pub use file::FileStore;
pub use memory::MemoryStore;
pub use store::{merge_valid_fields, merge_with_defaults, Store, DISMISSED_REMINDERS_KEY, LOGS_KEY, SETTINGS_KEY};
pub use traits::KeyValueStore;
