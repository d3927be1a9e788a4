use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(30);
pub const DEFAULT_JITTER: Duration = Duration::from_millis(500);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },
    #[error("{field} must be a finite, non-negative number of seconds, got {value}")]
    InvalidSeconds { field: &'static str, value: f64 },
    #[error("at least one readiness probe is required")]
    NoProbes,
}

/// Settings for a single wait. Every knob the poller uses lives here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WaitConfig {
    pub timeout: Duration,
    pub initial_interval: Duration,
    pub max_backoff: Duration,
    pub jitter: Duration,
    pub request_timeout: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            initial_interval: DEFAULT_CHECK_INTERVAL,
            max_backoff: DEFAULT_MAX_BACKOFF,
            jitter: DEFAULT_JITTER,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl WaitConfig {
    /// Defaults overlaid with the settings found in a JSON file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = Self::default();
        ConfigFile::load(path)?.apply(&mut config)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("initial_interval", self.initial_interval)?;
        ensure_positive("max_backoff", self.max_backoff)?;
        ensure_positive("request_timeout", self.request_timeout)?;
        Ok(())
    }
}

/// On-disk form of [`WaitConfig`]; durations are float seconds.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub timeout_secs: Option<f64>,
    pub check_interval_secs: Option<f64>,
    pub max_backoff_secs: Option<f64>,
    pub jitter_secs: Option<f64>,
    pub request_timeout_secs: Option<f64>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let file = serde_json::from_str(&data).context("parse config")?;
        Ok(file)
    }

    pub fn apply(&self, config: &mut WaitConfig) -> Result<(), ConfigError> {
        if let Some(value) = self.timeout_secs {
            config.timeout = seconds("timeout", value)?;
        }
        if let Some(value) = self.check_interval_secs {
            config.initial_interval = seconds("check_interval", value)?;
        }
        if let Some(value) = self.max_backoff_secs {
            config.max_backoff = seconds("max_backoff", value)?;
        }
        if let Some(value) = self.jitter_secs {
            config.jitter = seconds("jitter", value)?;
        }
        if let Some(value) = self.request_timeout_secs {
            config.request_timeout = seconds("request_timeout", value)?;
        }
        Ok(())
    }
}

pub fn seconds(field: &'static str, value: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value).map_err(|_| ConfigError::InvalidSeconds { field, value })
}

fn ensure_positive(field: &'static str, value: Duration) -> Result<(), ConfigError> {
    if value.is_zero() {
        return Err(ConfigError::NotPositive { field });
    }
    Ok(())
}
