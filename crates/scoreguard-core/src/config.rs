//! Client configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{Result, ScoreguardError};

/// Default scoring service base URL
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000/api";

/// Main client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Scoring service settings
    pub api: ApiSettings,

    /// Session persistence settings
    pub session: SessionSettings,

    /// Gauge animation timings
    pub animation: AnimationSettings,

    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            session: SessionSettings::default(),
            animation: AnimationSettings::default(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scoring service base URL
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api.base_url = url.into();
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.api.timeout_secs = secs;
        self
    }

    /// Set the session file location
    pub fn with_session_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.session.path = path.into();
        self
    }

    /// Set the log level or filter directive
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Load from a `.json` or `.toml` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&content)?,
            Some("json") | None => serde_json::from_str(&content)?,
            Some(other) => {
                return Err(ScoreguardError::InvalidConfig(format!(
                    "unsupported config format: .{}",
                    other
                )))
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Save as pretty JSON
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Defaults overridden by the environment (and `.env`)
    pub fn from_env() -> Result<Self> {
        Self::default().merge_env()
    }

    /// Apply `SCOREGUARD_*` variables on top of this configuration
    pub fn merge_env(mut self) -> Result<Self> {
        dotenvy::dotenv().ok();

        if let Ok(url) = std::env::var("SCOREGUARD_API_URL") {
            self.api.base_url = url;
        }
        if let Ok(secs) = std::env::var("SCOREGUARD_TIMEOUT_SECS") {
            self.api.timeout_secs = secs.trim().parse().map_err(|_| {
                ScoreguardError::InvalidConfig(
                    "SCOREGUARD_TIMEOUT_SECS must be a whole number of seconds".to_string(),
                )
            })?;
        }
        if let Ok(path) = std::env::var("SCOREGUARD_SESSION_PATH") {
            self.session.path = PathBuf::from(path);
        }
        if let Ok(level) = std::env::var("SCOREGUARD_LOG_LEVEL") {
            self.log_level = level;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.api.base_url).map_err(|e| {
            ScoreguardError::InvalidConfig(format!(
                "invalid API URL {:?}: {}",
                self.api.base_url, e
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ScoreguardError::InvalidConfig(format!(
                "API URL must be http or https, got {}",
                url.scheme()
            )));
        }
        if self.animation.frame_interval_ms == 0 {
            return Err(ScoreguardError::InvalidConfig(
                "animation.frame_interval_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Scoring service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL every endpoint path is appended to
    pub base_url: String,

    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Session persistence settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// File holding the persisted token and user record
    pub path: PathBuf,
}

impl Default for SessionSettings {
    fn default() -> Self {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        Self {
            path: PathBuf::from(home).join(".scoreguard").join("session.json"),
        }
    }
}

/// Gauge animation timings, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    /// Counter ease-out duration
    pub count_up_ms: u64,

    /// Lead time before the arc starts filling
    pub arc_delay_ms: u64,

    /// Arc ease-out duration
    pub arc_fill_ms: u64,

    /// Frame period used by drivers without a display refresh signal
    pub frame_interval_ms: u64,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            count_up_ms: 2000,
            arc_delay_ms: 500,
            arc_fill_ms: 1500,
            frame_interval_ms: 16,
        }
    }
}

impl AnimationSettings {
    pub fn count_up(&self) -> Duration {
        Duration::from_millis(self.count_up_ms)
    }

    pub fn arc_delay(&self) -> Duration {
        Duration::from_millis(self.arc_delay_ms)
    }

    pub fn arc_fill(&self) -> Duration {
        Duration::from_millis(self.arc_fill_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}
