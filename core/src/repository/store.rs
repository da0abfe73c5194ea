use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::repository::traits::KeyValueStore;

pub const LOGS_KEY: &str = "sleepLogs";
pub const SETTINGS_KEY: &str = "appSettings";
pub const DISMISSED_REMINDERS_KEY: &str = "dismissedReminders";

/// Fills a stored record up to the current schema.
///
/// When both sides are objects the result holds every key of `defaults`,
/// overridden by every key of `stored` (one level deep). Any other shape
/// returns `stored` unchanged.
pub fn merge_with_defaults(defaults: Value, stored: Value) -> Value {
    match (defaults, stored) {
        (Value::Object(mut merged), Value::Object(stored)) => {
            for (key, value) in stored {
                merged.insert(key, value);
            }
            Value::Object(merged)
        }
        (_, stored) => stored,
    }
}

/// Field-by-field fallback for a record that failed to decode as a whole.
///
/// Starts from `defaults` and takes each stored field only if the record
/// still decodes with that field alone overriding the defaults. Rejected
/// fields keep their default and are logged. `None` when either side is not
/// an object or the defaults themselves do not decode.
pub fn merge_valid_fields<T: DeserializeOwned>(defaults: Value, stored: Value, key: &str) -> Option<T> {
    let (Value::Object(defaults), Value::Object(stored)) = (defaults, stored) else {
        return None;
    };

    let mut merged = defaults.clone();
    for (field, value) in stored {
        let mut candidate = defaults.clone();
        candidate.insert(field.clone(), value.clone());
        if serde_json::from_value::<T>(Value::Object(candidate)).is_ok() {
            merged.insert(field, value);
        } else {
            warn!("Ignoring invalid field '{}' in '{}'", field, key);
        }
    }
    serde_json::from_value(Value::Object(merged)).ok()
}

/// Typed records on top of a [`KeyValueStore`], with merge-on-read.
///
/// Neither `load` nor `save` fails: a missing or unreadable record loads as
/// the default and a failed write is only logged.
pub struct Store<S: KeyValueStore> {
    backend: S,
}

impl<S: KeyValueStore> Store<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Reads and parses the raw record. `None` when absent, unreadable,
    /// not JSON, or `null`.
    fn read_value(&self, key: &str) -> Option<Value> {
        let raw = match self.backend.read(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No stored value for '{}', using default", key);
                return None;
            }
            Err(e) => {
                warn!("Could not read '{}': {:#}", key, e);
                return None;
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Null) => None,
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Stored value for '{}' is not valid JSON, using default: {}", key, e);
                None
            }
        }
    }

    pub fn load<T>(&self, key: &str, default: T) -> T
    where
        T: Serialize + DeserializeOwned,
    {
        let Some(stored) = self.read_value(key) else {
            return default;
        };

        let defaults = match serde_json::to_value(&default) {
            Ok(value) => value,
            Err(e) => {
                warn!("Could not serialize default for '{}': {}", key, e);
                return default;
            }
        };

        match serde_json::from_value(merge_with_defaults(defaults.clone(), stored.clone())) {
            Ok(value) => value,
            Err(e) => {
                warn!("Stored value for '{}' does not match the schema: {}", key, e);
                merge_valid_fields(defaults, stored, key).unwrap_or(default)
            }
        }
    }

    /// Loads a stored array element by element. Elements that `decode`
    /// rejects are dropped with a warning; the rest survive.
    pub fn load_list<T, F>(&self, key: &str, decode: F) -> Vec<T>
    where
        F: Fn(Value) -> Option<T>,
    {
        let items = match self.read_value(key) {
            Some(Value::Array(items)) => items,
            Some(_) => {
                warn!("Stored value for '{}' is not a list, using default", key);
                return Vec::new();
            }
            None => return Vec::new(),
        };

        let mut loaded = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            match decode(item) {
                Some(value) => loaded.push(value),
                None => warn!("Discarding unreadable record #{} of '{}'", index, key),
            }
        }
        loaded
    }

    /// Returns whether the value reached the backend. Callers keep their
    /// in-memory copy either way.
    pub fn save<T>(&self, key: &str, value: &T) -> bool
    where
        T: Serialize + ?Sized,
    {
        let text = match serde_json::to_string_pretty(value) {
            Ok(text) => text,
            Err(e) => {
                warn!("Could not serialize '{}': {}", key, e);
                return false;
            }
        };
        match self.backend.write(key, &text) {
            Ok(()) => true,
            Err(e) => {
                warn!("Could not persist '{}': {:#}", key, e);
                false
            }
        }
    }
}
