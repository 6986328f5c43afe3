//! Configuration types for the SSID logger

use std::path::Path;
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub endpoint_url: Option<String>,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub observer: ObserverConfig,
    #[serde(default)]
    pub ssid: SsidConfig,
}

impl Config {
    /// The monitoring session configuration, if an endpoint has been set
    pub fn monitor_config(&self) -> Option<MonitorConfig> {
        self.endpoint_url
            .as_ref()
            .map(|url| MonitorConfig::new(url.clone()))
    }

    /// Reject timeouts and intervals of zero
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let delivery = &self.delivery;
        if delivery.connect_timeout_seconds == 0 {
            return Err(ConfigError::ZeroDuration("connect_timeout_seconds"));
        }
        if delivery.read_timeout_seconds == 0 {
            return Err(ConfigError::ZeroDuration("read_timeout_seconds"));
        }

        match self.observer {
            ObserverConfig::Interval { interval_seconds } if interval_seconds == 0 => {
                Err(ConfigError::ZeroDuration("interval_seconds"))
            }
            _ => Ok(()),
        }
    }
}

/// Timeouts for a single delivery attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    #[serde(default = "default_timeout_seconds")]
    pub connect_timeout_seconds: u64,
    #[serde(default = "default_timeout_seconds")]
    pub read_timeout_seconds: u64,
}

impl DeliveryConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_seconds)
    }

    /// Longest a single delivery attempt can take
    pub fn attempt_timeout(&self) -> Duration {
        self.connect_timeout() + self.read_timeout()
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            connect_timeout_seconds: default_timeout_seconds(),
            read_timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Network observer configuration with tagged enum for extensibility
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ObserverConfig {
    /// Follow NetworkManager's `nmcli monitor` output
    #[serde(rename = "nmcli")]
    #[default]
    Nmcli,
    /// Recheck on a fixed interval
    #[serde(rename = "interval")]
    Interval {
        #[serde(default = "default_interval_seconds")]
        interval_seconds: u64,
    },
}

/// Where the current SSID is read from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SsidConfig {
    /// Restrict SSID lookup to this wireless interface
    #[serde(default)]
    pub interface: Option<String>,
}

/// Configuration of a single monitoring session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    pub endpoint_url: String,
}

impl MonitorConfig {
    pub fn new(endpoint_url: impl Into<String>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
        }
    }

    /// Check that the endpoint is a non-empty, absolute HTTP(S) URL
    pub fn validate(&self) -> std::result::Result<Url, ConfigError> {
        let raw = self.endpoint_url.trim();
        if raw.is_empty() {
            return Err(ConfigError::EmptyEndpoint);
        }

        let url = Url::parse(raw).map_err(|e| ConfigError::InvalidEndpoint {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => {}
            other => return Err(ConfigError::UnsupportedScheme(other.to_string())),
        }

        if url.host_str().is_none() {
            return Err(ConfigError::InvalidEndpoint {
                url: raw.to_string(),
                reason: "missing host".to_string(),
            });
        }

        Ok(url)
    }
}

fn default_timeout_seconds() -> u64 {
    5
}

fn default_interval_seconds() -> u64 {
    10
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            let reason = format!("Failed to read config file {:?}: {}", path, e);
            return Err(ConfigError::Read(reason).into());
        }
    };
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}
