use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::credentials::CredentialStore;
use crate::diary::EditorSettings;

/// Longest autosave period accepted from the config file: one day.
const MAX_AUTOSAVE_INTERVAL_SECONDS: u64 = 24 * 60 * 60;

/// Longest clock refresh period accepted from the config file: one minute.
const MAX_CLOCK_INTERVAL_MS: u64 = 60 * 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_password_file")]
    pub password_file: String,

    #[serde(default = "default_diary_file")]
    pub diary_file: String,

    #[serde(default = "default_password")]
    pub default_password: String,

    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,

    #[serde(default = "default_autosave_interval_seconds")]
    pub autosave_interval_seconds: u64,

    #[serde(default = "default_clock_interval_ms")]
    pub clock_interval_ms: u64,

    #[serde(default = "default_log_file")]
    pub log_file: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_data_dir() -> String {
    ".".to_string()
}

fn default_password_file() -> String {
    "password.txt".to_string()
}

fn default_diary_file() -> String {
    "diary.txt".to_string()
}

fn default_password() -> String {
    "admin123".to_string()
}

fn default_min_password_length() -> usize {
    4
}

fn default_autosave_interval_seconds() -> u64 {
    60
}

fn default_clock_interval_ms() -> u64 {
    1000
}

fn default_log_file() -> String {
    "diary.log".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: default_data_dir(),
            password_file: default_password_file(),
            diary_file: default_diary_file(),
            default_password: default_password(),
            min_password_length: default_min_password_length(),
            autosave_interval_seconds: default_autosave_interval_seconds(),
            clock_interval_ms: default_clock_interval_ms(),
            log_file: default_log_file(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let config_path = Self::config_path();

        if let Ok(contents) = fs::read_to_string(&config_path) {
            Self::parse(&contents).unwrap_or_else(|e| {
                eprintln!("Error parsing config file: {}", e);
                Self::default()
            })
        } else {
            // Create default config file if it doesn't exist
            let default_config = Self::default();
            if let Err(e) = default_config.save() {
                eprintln!("Error creating default config file: {}", e);
            }
            default_config
        }
    }

    /// Parse a config file body; missing keys take their defaults.
    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        let mut config: Config = toml::from_str(contents)?;
        config.data_dir = expand_home(&config.data_dir, dirs::home_dir().as_deref());
        Ok(config)
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(self)?;
        fs::write(&config_path, toml_string)?;

        Ok(())
    }

    pub fn password_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join(&self.password_file)
    }

    pub fn diary_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join(&self.diary_file)
    }

    pub fn log_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join(&self.log_file)
    }

    pub fn credential_store(&self) -> CredentialStore {
        CredentialStore::new(self.password_path(), self.default_password.clone())
    }

    pub fn editor_settings(&self) -> EditorSettings {
        EditorSettings {
            diary_path: self.diary_path(),
            autosave_interval: Duration::from_secs(
                self.autosave_interval_seconds.clamp(1, MAX_AUTOSAVE_INTERVAL_SECONDS),
            ),
            clock_interval: Duration::from_millis(
                self.clock_interval_ms.clamp(100, MAX_CLOCK_INTERVAL_MS),
            ),
        }
    }

    fn config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("diary");
        path.push("config.toml");
        path
    }
}

/// Replace a leading `~` with the home directory, when one is known.
fn expand_home(path: &str, home: Option<&Path>) -> String {
    match home {
        Some(home) if path.starts_with('~') => path.replacen('~', &home.to_string_lossy(), 1),
        _ => path.to_string(),
    }
}
