// Runtime configuration: defaults, then `config.toml` in the user's config
// directory, then environment variables. CLI flags are applied last by
// `main` through the `with_*` setters.

use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8090/api/v1";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const MAX_POLL_INTERVAL_SECS: u64 = 24 * 60 * 60;
pub const APP_DIR: &str = "ytrss";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub poll_interval: Duration,
    pub downloads_dir: PathBuf,
    pub log_level: String,
}

/// Shape of `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub api_url: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub downloads_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            downloads_dir: PathBuf::from("downloads"),
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load from the user config file (if any) and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let file = match config_file_path() {
            Some(path) if path.exists() => Some(FileConfig::read(&path)?),
            _ => None,
        };
        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    pub fn from_sources(
        file: Option<FileConfig>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(file) = file {
            if let Some(url) = file.api_url {
                config.api_url = url;
            }
            if let Some(secs) = file.poll_interval_secs {
                config.poll_interval = interval_from_secs(secs)?;
            }
            if let Some(dir) = file.downloads_dir {
                config.downloads_dir = dir;
            }
            if let Some(level) = file.log_level {
                config.log_level = level;
            }
        }

        if let Some(url) = env("YTRSS_API_URL") {
            config.api_url = url;
        }
        if let Some(raw) = env("YTRSS_POLL_INTERVAL_SECS") {
            let secs = raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                key: "YTRSS_POLL_INTERVAL_SECS",
                value: raw.clone(),
            })?;
            config.poll_interval = interval_from_secs(secs)?;
        }
        if let Some(dir) = env("YTRSS_DOWNLOADS_DIR") {
            config.downloads_dir = PathBuf::from(dir);
        }
        if let Some(level) = env("YTRSS_LOG") {
            config.log_level = level;
        }

        config.api_url = config.api_url.trim_end_matches('/').to_string();
        Ok(config)
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_poll_interval_secs(mut self, secs: u64) -> Result<Self, ConfigError> {
        self.poll_interval = interval_from_secs(secs)?;
        Ok(self)
    }
}

impl FileConfig {
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// `<config dir>/ytrss`, e.g. `~/.config/ytrss` on Linux.
pub fn app_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR))
}

pub fn config_file_path() -> Option<PathBuf> {
    app_config_dir().map(|dir| dir.join("config.toml"))
}

fn interval_from_secs(secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 || secs > MAX_POLL_INTERVAL_SECS {
        return Err(ConfigError::InvalidValue {
            key: "poll_interval_secs",
            value: secs.to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}
