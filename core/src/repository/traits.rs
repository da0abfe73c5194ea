use anyhow::Result;

/// Raw key-value persistence. Values are serialized text; `read` returns
/// `None` when nothing was ever stored under `key`.
pub trait KeyValueStore {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> Result<()>;
}
