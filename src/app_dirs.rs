use directories::ProjectDirs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "migration-mind";

/// Centralized application directory resolution
#[derive(Debug, Clone, PartialEq)]
pub struct AppDirs {
    config_dir: PathBuf,
    state_dir: PathBuf,
}

impl AppDirs {
    /// Resolves the platform directories, or puts everything under `root`
    /// when one is given.
    pub fn resolve(root: Option<&Path>) -> Self {
        if let Some(root) = root {
            return Self::rooted(root);
        }

        let project = ProjectDirs::from("", "", APP_NAME);
        let config_dir = project
            .as_ref()
            .map(|pd| pd.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let state_dir = if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home).join(".local").join("state").join(APP_NAME)
        } else {
            project
                .map(|pd| pd.data_local_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."))
        };

        Self {
            config_dir,
            state_dir,
        }
    }

    pub fn rooted<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref();
        Self {
            config_dir: root.to_path_buf(),
            state_dir: root.to_path_buf(),
        }
    }

    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    pub fn leaderboard_path(&self) -> PathBuf {
        self.state_dir.join("leaderboard.json")
    }

    pub fn history_path(&self) -> PathBuf {
        self.state_dir.join("history.db")
    }

    pub fn log_path(&self) -> PathBuf {
        self.state_dir.join(format!("{APP_NAME}.log"))
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }
}
