//! SSID change detection

use std::sync::Arc;

use crate::event::SsidEvent;
use crate::ssid::SsidSource;

/// Tracks the last accepted SSID and decides when a change is reportable.
///
/// Owned by a single session worker; `check_for_change` takes `&mut self`, so
/// concurrent checks cannot happen.
#[derive(Debug)]
pub struct SsidTracker {
    source: Arc<dyn SsidSource>,
    previous_ssid: Option<String>,
}

impl SsidTracker {
    pub fn new(source: Arc<dyn SsidSource>) -> Self {
        Self {
            source,
            previous_ssid: None,
        }
    }

    /// Read the SSID the device is associated with right now
    pub async fn current_ssid(&self) -> Option<String> {
        self.source.current_ssid().await
    }

    /// Last accepted SSID. Never cleared by a drop in connectivity.
    pub fn previous_ssid(&self) -> Option<&str> {
        self.previous_ssid.as_deref()
    }

    /// Forget the last accepted SSID and start from `initial`
    pub fn reset(&mut self, initial: Option<String>) {
        self.previous_ssid = initial;
    }

    /// Re-read the SSID and return a change event if it differs from the last
    /// accepted one. Losing the SSID is not a change.
    pub async fn check_for_change(&mut self) -> Option<SsidEvent> {
        let current = self.current_ssid().await?;
        if self.previous_ssid.as_deref() == Some(current.as_str()) {
            tracing::debug!("SSID unchanged: {}", current);
            return None;
        }

        let event = SsidEvent::change(self.previous_ssid.clone(), current.clone());
        self.previous_ssid = Some(current);
        Some(event)
    }
}
