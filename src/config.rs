//! Configuration management for the crawler.
//!
//! Settings come from an optional TOML file and are then overridden by
//! environment variables, which is how the job is normally driven when it
//! runs resident in a container.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application name used for the config directory.
const APP_NAME: &str = "novel-crawler";

/// Default config filename.
const CONFIG_FILENAME: &str = "config.toml";

/// Config file looked up in the working directory.
const LOCAL_CONFIG_FILENAME: &str = "crawler.toml";

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "CRAWLER_CONFIG";

/// Longest accepted politeness or retry delay, in seconds.
const MAX_DELAY_SEC: f64 = 3600.0;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the novel URLs come from.
    pub input: InputConfig,

    /// Output and cache directories.
    pub paths: PathsConfig,

    /// Web scraping settings.
    pub scraping: ScrapingConfig,

    /// Pass scheduling.
    pub schedule: ScheduleConfig,
}

/// Sources of requested novel URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Comma-separated inline list of novel URLs.
    pub novels: Option<String>,

    /// File with one novel URL per line.
    pub novels_file: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            novels: None,
            novels_file: PathBuf::from("novels.txt"),
        }
    }
}

/// File path configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root directory for per-series EPUB folders.
    pub output_directory: PathBuf,

    /// Directory for cached cover images.
    pub assets_directory: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::from("books"),
            assets_directory: PathBuf::from("assets"),
        }
    }
}

/// Web scraping configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    /// User agent sent with every request.
    pub user_agent: String,

    /// Per-request timeout in seconds.
    pub timeout_sec: u64,

    /// Delay between web requests in seconds.
    pub delay_between_requests_sec: f64,

    /// Attempts per request, including the first.
    pub retries: u32,

    /// Delay before the first retry; doubles on every further attempt.
    pub retry_base_delay_sec: f64,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (compatible; NovelEPUB/1.0)".to_string(),
            timeout_sec: 30,
            delay_between_requests_sec: 1.0,
            retries: 3,
            retry_base_delay_sec: 2.0,
        }
    }
}

impl ScrapingConfig {
    /// Returns the per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_sec)
    }
}

/// Pass scheduling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Passes start at minute 0 of every local hour divisible by this
    /// (1 to 24).
    pub interval_hours: u32,

    /// Run a pass immediately at startup.
    pub run_on_start: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_hours: 6,
            run_on_start: true,
        }
    }
}

impl Config {
    /// Returns the platform-specific config file path, if a config dir exists.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_NAME).join(CONFIG_FILENAME))
    }

    /// Loads configuration from the first file found, then applies the
    /// process environment on top.
    ///
    /// Lookup order: `$CRAWLER_CONFIG`, `./crawler.toml`, the user config dir.
    /// No file at all is fine; defaults are used.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let mut config = match explicit {
            Some(path) => Self::load_from(&path)?,
            None => {
                let mut candidates = std::iter::once(PathBuf::from(LOCAL_CONFIG_FILENAME))
                    .chain(Self::user_config_path());
                match candidates.find(|p| p.exists()) {
                    Some(path) => Self::load_from(&path)?,
                    None => Config::default(),
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Overrides settings from environment variables.
    ///
    /// Recognised: `NOVELS`, `NOVELS_FILE`, `OUTPUT_DIR`, `ASSETS_DIR`,
    /// `CRAWL_INTERVAL_HOURS`. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(novels) = get("NOVELS") {
            self.input.novels = Some(novels);
        }
        if let Some(file) = get("NOVELS_FILE") {
            self.input.novels_file = PathBuf::from(file);
        }
        if let Some(dir) = get("OUTPUT_DIR") {
            self.paths.output_directory = PathBuf::from(dir);
        }
        if let Some(dir) = get("ASSETS_DIR") {
            self.paths.assets_directory = PathBuf::from(dir);
        }
        if let Some(hours) = get("CRAWL_INTERVAL_HOURS") {
            self.schedule.interval_hours =
                hours
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: "CRAWL_INTERVAL_HOURS".to_string(),
                        message: format!("not a whole number of hours: {}", hours),
                    })?;
        }

        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=24).contains(&self.schedule.interval_hours) {
            return Err(ConfigError::InvalidValue {
                key: "schedule.interval_hours".to_string(),
                message: "must be between 1 and 24".to_string(),
            });
        }

        if self.scraping.retries == 0 {
            return Err(ConfigError::InvalidValue {
                key: "scraping.retries".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        for (key, value) in [
            (
                "scraping.delay_between_requests_sec",
                self.scraping.delay_between_requests_sec,
            ),
            ("scraping.retry_base_delay_sec", self.scraping.retry_base_delay_sec),
        ] {
            // Also rejects NaN, which fails every comparison.
            if !(0.0..=MAX_DELAY_SEC).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("must be between 0 and {} seconds", MAX_DELAY_SEC),
                });
            }
        }

        Ok(())
    }
}
