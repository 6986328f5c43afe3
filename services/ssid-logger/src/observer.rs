//! Network observer trait and the interval-based observer

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Why a recheck of the SSID was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverSignal {
    /// The platform reported a wireless availability or capability change
    NetworkChanged,
    /// The host asked for a recheck
    Recheck,
}

/// Sending half of a session's signal queue
pub type SignalSender = mpsc::UnboundedSender<ObserverSignal>;

/// Watches wireless connectivity and pushes a signal whenever something about
/// the wifi network may have changed.
///
/// Signals may repeat for one logical change; consumers deduplicate.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait NetworkObserver: Send + Sync + std::fmt::Debug {
    /// Register for notifications. Failing here leaves the session running
    /// without automatic change detection.
    async fn start(&self, signals: SignalSender) -> crate::Result<()>;

    /// Deregister. Safe to call when not started.
    async fn stop(&self);
}

/// Signals on a fixed interval, for platforms without a push source
#[derive(Debug)]
pub struct IntervalObserver {
    interval: Duration,
    running: Mutex<Option<CancellationToken>>,
}

impl IntervalObserver {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            running: Mutex::new(None),
        }
    }
}

#[async_trait]
impl NetworkObserver for IntervalObserver {
    async fn start(&self, signals: SignalSender) -> crate::Result<()> {
        let cancel = CancellationToken::new();
        if let Ok(mut running) = self.running.lock() {
            if let Some(previous) = running.replace(cancel.clone()) {
                previous.cancel();
            }
        }

        let interval = self.interval;
        tracing::debug!("Starting interval observer every {:?}", interval);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {
                        if signals.send(ObserverSignal::NetworkChanged).is_err() {
                            break;
                        }
                    }
                    _ = cancel.cancelled() => break,
                }
            }
            tracing::debug!("Interval observer stopped");
        });
        Ok(())
    }

    async fn stop(&self) {
        let token = self
            .running
            .lock()
            .ok()
            .and_then(|mut running| running.take());
        if let Some(token) = token {
            token.cancel();
        }
    }
}
