use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Default configuration
pub const DEFAULT_INITIAL_LIST_SIZE: usize = 20;
pub const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no configuration directory available on this platform")]
    NoConfigDir,
    #[error("failed to access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Tunables for the message list. Everything has a sensible default so a
/// partial settings file is fine.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ListSettings {
    /// Rows drawn on first show, counted from the newest message.
    pub initial_list_size: usize,
    /// Rows added each time the user scrolls near the oldest drawn row.
    pub page_size: usize,
    /// Distance in points from the far end that counts as "end reached".
    pub end_reached_threshold: f32,
    pub fade_duration_ms: u64,
    pub fade_distance: f32,
    pub theme: String,
}

impl Default for ListSettings {
    fn default() -> Self {
        Self {
            initial_list_size: DEFAULT_INITIAL_LIST_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
            end_reached_threshold: 200.0,
            fade_duration_ms: 250,
            fade_distance: 16.0,
            theme: "dark".to_string(),
        }
    }
}

pub fn settings_path() -> Option<PathBuf> {
    if let Some(proj) = ProjectDirs::from("com", "chat-list", "chat-list") {
        let dir = proj.config_dir();
        if let Err(e) = fs::create_dir_all(dir) {
            tracing::warn!(error = %e, "failed to create config dir");
            return None;
        }
        return Some(dir.join("settings.json"));
    }
    None
}

/// Load settings from the platform config dir, falling back to defaults.
pub fn load_settings() -> ListSettings {
    let Some(path) = settings_path() else {
        return ListSettings::default();
    };
    match load_settings_from(&path) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(error = %e, "using default list settings");
            ListSettings::default()
        }
    }
}

/// Load settings from a specific file. A missing file yields the defaults.
pub fn load_settings_from(path: &Path) -> Result<ListSettings, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ListSettings::default()),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn save_settings(settings: &ListSettings) -> Result<(), ConfigError> {
    let path = settings_path().ok_or(ConfigError::NoConfigDir)?;
    save_settings_to(settings, &path)
}

pub fn save_settings_to(settings: &ListSettings, path: &Path) -> Result<(), ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    let data = serde_json::to_string_pretty(settings).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let mut file = fs::File::create(path).map_err(io_err)?;
    file.write_all(data.as_bytes()).map_err(io_err)?;
    Ok(())
}
