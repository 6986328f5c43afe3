//! SSID events and their wire payloads

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder sent on the wire when no SSID is known
pub const NO_SSID: &str = "none";

const STARTED_MESSAGE: &str = "SSID monitoring service started";
const STOPPED_MESSAGE: &str = "SSID monitoring service stopped";

/// Something worth telling the endpoint about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SsidEvent {
    Startup {
        timestamp: DateTime<Utc>,
        current_ssid: Option<String>,
    },
    Change {
        timestamp: DateTime<Utc>,
        previous_ssid: Option<String>,
        new_ssid: String,
    },
    Shutdown {
        timestamp: DateTime<Utc>,
        current_ssid: Option<String>,
    },
}

/// Discriminant of an [`SsidEvent`], used in logs and delivery reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Startup,
    Change,
    Shutdown,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Startup => write!(f, "startup"),
            EventKind::Change => write!(f, "SSID change"),
            EventKind::Shutdown => write!(f, "shutdown"),
        }
    }
}

/// JSON body of a monitoring lifecycle event
#[derive(Debug, Serialize)]
struct LifecyclePayload<'a> {
    timestamp: String,
    event: &'a str,
    #[serde(rename = "currentSSID")]
    current_ssid: &'a str,
    message: &'a str,
}

/// JSON body of an SSID change
#[derive(Debug, Serialize)]
struct ChangePayload<'a> {
    timestamp: String,
    #[serde(rename = "previousSSID")]
    previous_ssid: &'a str,
    #[serde(rename = "newSSID")]
    new_ssid: &'a str,
}

impl SsidEvent {
    pub fn startup(current_ssid: Option<String>) -> Self {
        SsidEvent::Startup {
            timestamp: Utc::now(),
            current_ssid,
        }
    }

    pub fn change(previous_ssid: Option<String>, new_ssid: String) -> Self {
        SsidEvent::Change {
            timestamp: Utc::now(),
            previous_ssid,
            new_ssid,
        }
    }

    pub fn shutdown(current_ssid: Option<String>) -> Self {
        SsidEvent::Shutdown {
            timestamp: Utc::now(),
            current_ssid,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            SsidEvent::Startup { .. } => EventKind::Startup,
            SsidEvent::Change { .. } => EventKind::Change,
            SsidEvent::Shutdown { .. } => EventKind::Shutdown,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            SsidEvent::Startup { timestamp, .. }
            | SsidEvent::Change { timestamp, .. }
            | SsidEvent::Shutdown { timestamp, .. } => *timestamp,
        }
    }

    /// Serialize to the JSON body POSTed to the endpoint
    pub fn to_json(&self) -> crate::Result<String> {
        let timestamp = format_timestamp(self.timestamp());
        let body = match self {
            SsidEvent::Startup { current_ssid, .. } => serde_json::to_string(&LifecyclePayload {
                timestamp,
                event: "monitoring_started",
                current_ssid: current_ssid.as_deref().unwrap_or(NO_SSID),
                message: STARTED_MESSAGE,
            })?,
            SsidEvent::Change {
                previous_ssid,
                new_ssid,
                ..
            } => serde_json::to_string(&ChangePayload {
                timestamp,
                previous_ssid: previous_ssid.as_deref().unwrap_or(NO_SSID),
                new_ssid,
            })?,
            SsidEvent::Shutdown { current_ssid, .. } => serde_json::to_string(&LifecyclePayload {
                timestamp,
                event: "monitoring_stopped",
                current_ssid: current_ssid.as_deref().unwrap_or(NO_SSID),
                message: STOPPED_MESSAGE,
            })?,
        };
        Ok(body)
    }
}

impl fmt::Display for SsidEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SsidEvent::Startup { current_ssid, .. } => write!(
                f,
                "monitoring started on {}",
                current_ssid.as_deref().unwrap_or(NO_SSID)
            ),
            SsidEvent::Change {
                previous_ssid,
                new_ssid,
                ..
            } => write!(
                f,
                "SSID changed from {} to {}",
                previous_ssid.as_deref().unwrap_or(NO_SSID),
                new_ssid
            ),
            SsidEvent::Shutdown { current_ssid, .. } => write!(
                f,
                "monitoring stopped on {}",
                current_ssid.as_deref().unwrap_or(NO_SSID)
            ),
        }
    }
}

/// UTC, second precision, e.g. `2024-05-01T09:30:00Z`
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
