use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// Player preferences that survive restarts
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    /// Any miss restarts the whole run
    #[serde(rename = "autoRestart", default)]
    pub auto_restart: bool,
}

pub trait SettingsStore {
    fn try_load(&self) -> Result<Settings, StoreError>;
    fn save(&self, settings: &Settings) -> Result<(), StoreError>;

    /// Loads the settings, falling back to defaults when the file is missing
    /// or unreadable.
    fn load(&self) -> Settings {
        match self.try_load() {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Discarding unreadable settings: {e}");
                Settings::default()
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl SettingsStore for FileSettingsStore {
    fn try_load(&self) -> Result<Settings, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice::<Settings>(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Settings::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, settings: &Settings) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(settings)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
