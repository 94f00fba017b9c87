use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, time::Duration};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";
const DEFAULT_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Clone)]
pub struct DirectionsConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl DirectionsConfig {
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("GOOGLE_MAPS_API_KEY").context(
            "API key not found. Set GOOGLE_MAPS_API_KEY in the environment or a .env file.",
        )?;
        let timeout_secs = match env::var("DIRECTIONS_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse()
                .context("Failed to parse DIRECTIONS_TIMEOUT_SECS")?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };
        Ok(Self {
            api_key,
            base_url: env::var("DIRECTIONS_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

pub const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
const DEFAULT_LOG_LEVEL: &str = "info";

/// Persisted user settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Settings {
    pub fn is_valid(&self) -> bool {
        LOG_LEVELS.contains(&self.log_level.as_str())
    }

    /// Reads the settings file. A missing, unreadable or invalid file is
    /// replaced with defaults and written back.
    pub fn load_or_repair<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let stored = fs::read_to_string(path)
            .ok()
            .and_then(|data| serde_json::from_str::<Settings>(&data).ok());
        match stored {
            Some(mut settings) => {
                settings.log_level = settings.log_level.trim().to_ascii_lowercase();
                if settings.is_valid() {
                    return Ok(settings);
                }
                eprintln!(
                    "Invalid log level {:?} in {}, resetting to {}",
                    settings.log_level,
                    path.display(),
                    DEFAULT_LOG_LEVEL
                );
            }
            None if path.exists() => {
                eprintln!("Unreadable settings in {}, resetting", path.display());
            }
            None => {}
        }
        let settings = Settings::default();
        settings.save_to_file(path)?;
        Ok(settings)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data).with_context(|| format!("Failed to write {}", path.display()))
    }
}
