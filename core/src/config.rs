use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};

use crate::repository::{FileStore, Store};

pub const HOME_ENV: &str = "SLEEPLOG_HOME";
const DEFAULT_DIR_NAME: &str = ".sleeplog";

/// Where the diary lives on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
}

impl Config {
    /// `explicit` wins, then `$SLEEPLOG_HOME`, then `~/.sleeplog`.
    pub fn resolve(explicit: Option<PathBuf>) -> Result<Self> {
        let data_dir = match explicit {
            Some(dir) => dir,
            None => match env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
                Some(dir) => PathBuf::from(dir),
                None => {
                    let home_dir = dirs::home_dir()
                        .ok_or_else(|| anyhow!("Could not determine home directory"))?;
                    home_dir.join(DEFAULT_DIR_NAME)
                }
            },
        };
        Ok(Config { data_dir })
    }

    pub fn open_store(&self) -> Result<Store<FileStore>> {
        Ok(Store::new(FileStore::new(&self.data_dir)?))
    }
}
