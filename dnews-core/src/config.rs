use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ConfigError;

pub const API_KEY_ENV: &str = "NEWSAPI_KEY";
pub const CONFIG_PATH_ENV: &str = "DNEWS_CONFIG";
pub const BIND_ADDR_ENV: &str = "DNEWS_BIND";

/// Upper bound the upstream search endpoint accepts for `pageSize`.
pub const MAX_PAGE_SIZE: u32 = 100;

pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

/// One week.
pub const MAX_REFRESH_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    /// Read from the environment only, never from or into the config file.
    #[serde(skip)]
    pub api_key: String,
    pub endpoint: String,
    /// Fetch order per topic; the first language is the primary one for dedup.
    pub languages: Vec<String>,
    pub page_size: u32,
    pub request_timeout_secs: u64,
    pub refresh_interval_minutes: u64,
    pub bind_addr: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: "https://newsapi.org/v2/everything".to_owned(),
            languages: vec!["en".to_owned(), "vi".to_owned()],
            page_size: 30,
            request_timeout_secs: 15,
            refresh_interval_minutes: 30,
            bind_addr: "0.0.0.0:8000".to_owned(),
        }
    }
}

impl ServiceConfig {
    /// Loads the config file (if any) and applies environment overrides.
    ///
    /// A broken config file is reported and replaced by defaults; it never
    /// stops the service from starting.
    pub fn load() -> Self {
        Self::load_with(|key| std::env::var(key).ok())
    }

    pub fn load_with(env: impl Fn(&str) -> Option<String>) -> Self {
        let path = env(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .or_else(default_config_path);

        let mut config = match path {
            Some(path) if path.exists() => match Self::from_file(&path) {
                Ok(config) => config,
                Err(err) => {
                    warn!(
                        error = %err,
                        path = %path.display(),
                        "failed to load config, using defaults"
                    );
                    Self::default()
                }
            },
            Some(path) => {
                debug!(path = %path.display(), "no config file, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env(env);
        config
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: ServiceConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(key) = env(API_KEY_ENV) {
            self.api_key = key.trim().to_owned();
        }
        if let Some(addr) = env(BIND_ADDR_ENV).filter(|addr| !addr.trim().is_empty()) {
            self.bind_addr = addr.trim().to_owned();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("endpoint must not be empty".into()));
        }
        if self.languages.is_empty() || self.languages.iter().any(|l| l.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "languages must list at least one non-empty language code".into(),
            ));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::Invalid(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
            return Err(ConfigError::Invalid(format!(
                "request_timeout_secs must be between 1 and {MAX_REQUEST_TIMEOUT_SECS}"
            )));
        }
        if self.refresh_interval_minutes == 0
            || self.refresh_interval_minutes > MAX_REFRESH_INTERVAL_MINUTES
        {
            return Err(ConfigError::Invalid(format!(
                "refresh_interval_minutes must be between 1 and {MAX_REFRESH_INTERVAL_MINUTES}"
            )));
        }
        Ok(())
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_minutes.saturating_mul(60))
    }
}

/// `<config dir>/dnews/config.json`, e.g. `~/.config/dnews/config.json` on Linux.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("dnews").join("config.json"))
}
