//! Configuration for the DR suite driver
//!
//! Loaded from a YAML file, with environment overrides for the polling knobs
//! so CI can tune aggressiveness without editing the file. Validation happens
//! once at startup; an invalid timeout or interval is never discovered
//! mid-poll.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable overriding `timeout` (seconds).
pub const ENV_TIMEOUT: &str = "DROVER_TIMEOUT";

/// Environment variable overriding `interval` (seconds).
pub const ENV_INTERVAL: &str = "DROVER_INTERVAL";

#[derive(Debug)]
pub enum ConfigError {
    Read { path: String, reason: String },
    Parse { reason: String },
    Invalid { reason: String },
    BadOverride { var: String, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, reason } => {
                write!(f, "failed to read configuration file '{}': {}", path, reason)
            }
            ConfigError::Parse { reason } => {
                write!(f, "failed to parse configuration: {}", reason)
            }
            ConfigError::Invalid { reason } => {
                write!(f, "invalid configuration: {}", reason)
            }
            ConfigError::BadOverride { var, value } => {
                write!(f, "invalid override {}='{}': expected integer seconds", var, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Hub endpoint settings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Base URL of the hub API endpoint.
    pub url: String,

    /// Optional bearer token for the hub API.
    pub token: Option<String>,

    /// Kubeconfig path handed to the deployment tool.
    pub kubeconfig: String,
}

/// Where workload kustomize bundles come from.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub repo: String,
    pub branch: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub hub: HubConfig,

    /// Names of the two managed clusters.
    pub clusters: Vec<String>,

    /// Name of the default DRPolicy referenced by every created DRPC.
    pub dr_policy: String,

    pub channel: ChannelConfig,

    /// Poll deadline in seconds. Must be >= 0.
    pub timeout: i64,

    /// Poll interval in seconds. Must be >= 0.
    pub interval: i64,

    /// When true, the best-effort phase pre-checks before Failover/Relocate
    /// become fatal instead of logged-and-swallowed.
    pub strict_phase_checks: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hub: HubConfig::default(),
            clusters: Vec::new(),
            dr_policy: String::new(),
            channel: ChannelConfig::default(),
            timeout: 600,
            interval: 30,
            strict_phase_checks: false,
        }
    }
}

impl Config {
    /// Read, override and validate in one step.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })
    }

    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env_seconds(ENV_TIMEOUT)? {
            self.timeout = value;
        }
        if let Some(value) = read_env_seconds(ENV_INTERVAL)? {
            self.interval = value;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.clusters.len() != 2 {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "expected exactly 2 managed clusters, got {}",
                    self.clusters.len()
                ),
            });
        }
        if self.clusters.iter().any(|c| c.is_empty()) {
            return Err(ConfigError::Invalid {
                reason: "managed cluster name is empty".to_string(),
            });
        }
        if self.dr_policy.is_empty() {
            return Err(ConfigError::Invalid {
                reason: "dr_policy is not set".to_string(),
            });
        }
        if self.channel.repo.is_empty() {
            return Err(ConfigError::Invalid {
                reason: "channel.repo is not set".to_string(),
            });
        }
        if self.channel.branch.is_empty() {
            return Err(ConfigError::Invalid {
                reason: "channel.branch is not set".to_string(),
            });
        }
        if self.timeout < 0 {
            return Err(ConfigError::Invalid {
                reason: format!("timeout is negative: {}", self.timeout),
            });
        }
        if self.interval < 0 {
            return Err(ConfigError::Invalid {
                reason: format!("interval is negative: {}", self.interval),
            });
        }
        Ok(())
    }

    /// Poll deadline as a duration. Valid only after `validate`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.max(0) as u64)
    }

    /// Poll interval as a duration. Valid only after `validate`.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval.max(0) as u64)
    }
}

fn read_env_seconds(var: &str) -> Result<Option<i64>, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ConfigError::BadOverride {
                var: var.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}
