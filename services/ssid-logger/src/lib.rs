//! SSID Logger - wireless network change monitor
//!
//! Watches the SSID of the connected wireless network and POSTs a JSON event to
//! a configured endpoint when monitoring starts, when the SSID changes, and
//! when monitoring stops.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod io;
pub mod lifecycle;
pub mod nmcli;
pub mod observer;
pub mod receiver;
pub mod ssid;
pub mod tracker;

pub use config::{load_config, Config, MonitorConfig};
pub use error::{ConfigError, DeliveryError, Result, SsidLoggerError};

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::ObserverConfig;
use crate::dispatcher::EventDispatcher;
use crate::io::{HttpClient, ReqwestHttpClient};
use crate::lifecycle::MonitorLifecycle;
use crate::nmcli::NmcliObserver;
use crate::observer::{IntervalObserver, NetworkObserver};
use crate::ssid::{SsidSource, SystemSsidSource};

/// Assembles an [`SsidLogger`] from configuration, with optional overrides
/// for each collaborator
pub struct SsidLoggerBuilder {
    config: Config,
    http: Option<Arc<dyn HttpClient>>,
    ssid_source: Option<Arc<dyn SsidSource>>,
    observer: Option<Arc<dyn NetworkObserver>>,
    cancel: Option<CancellationToken>,
}

impl SsidLoggerBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            http: None,
            ssid_source: None,
            observer: None,
            cancel: None,
        }
    }

    pub fn with_http_client(mut self, http: Arc<dyn HttpClient>) -> Self {
        self.http = Some(http);
        self
    }

    pub fn with_ssid_source(mut self, ssid_source: Arc<dyn SsidSource>) -> Self {
        self.ssid_source = Some(ssid_source);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn NetworkObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn with_cancellation_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn build(self) -> Result<SsidLogger> {
        let monitor_config = self
            .config
            .monitor_config()
            .ok_or(ConfigError::EmptyEndpoint)?;
        monitor_config.validate()?;
        self.config.validate()?;

        let http = match self.http {
            Some(http) => http,
            None => Arc::new(ReqwestHttpClient::from_config(&self.config.delivery)?),
        };

        let ssid_source: Arc<dyn SsidSource> = match self.ssid_source {
            Some(ssid_source) => ssid_source,
            None => Arc::new(SystemSsidSource::new(self.config.ssid.interface.clone())),
        };

        let observer = match self.observer {
            Some(observer) => observer,
            None => default_observer(&self.config),
        };

        tracing::debug!(
            "Built SSID logger for {} with {:?}",
            monitor_config.endpoint_url,
            observer
        );

        // Covers change deliveries still in flight when monitoring stops
        let dispatcher = EventDispatcher::new(http)
            .with_drain_timeout(self.config.delivery.attempt_timeout());
        let lifecycle = MonitorLifecycle::new(ssid_source, observer, dispatcher);

        Ok(SsidLogger {
            monitor_config,
            lifecycle: Arc::new(lifecycle),
            cancel: self.cancel.unwrap_or_default(),
        })
    }
}

fn default_observer(config: &Config) -> Arc<dyn NetworkObserver> {
    match &config.observer {
        ObserverConfig::Nmcli => {
            let interface = config.ssid.interface.clone();
            Arc::new(NmcliObserver::new().with_interface(interface))
        }
        ObserverConfig::Interval { interval_seconds } => {
            let interval = Duration::from_secs(*interval_seconds);
            Arc::new(IntervalObserver::new(interval))
        }
    }
}

/// A configured SSID logger, ready to run until cancelled
#[derive(Debug)]
pub struct SsidLogger {
    monitor_config: MonitorConfig,
    lifecycle: Arc<MonitorLifecycle>,
    cancel: CancellationToken,
}

impl SsidLogger {
    pub fn lifecycle(&self) -> Arc<MonitorLifecycle> {
        Arc::clone(&self.lifecycle)
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Monitor until Ctrl-C or cancellation, then stop. Returns once the
    /// shutdown event and any change deliveries still in flight are done.
    pub async fn start(self) -> Result<()> {
        let mut reports = self.lifecycle.subscribe();
        self.lifecycle.start(self.monitor_config.clone()).await?;

        let cancel_for_signal = self.cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    if let Err(e) = result {
                        tracing::error!("Failed to listen for ctrl-c: {}", e);
                        return;
                    }
                    tracing::info!("Shutdown signal received");
                    cancel_for_signal.cancel();
                }
                _ = cancel_for_signal.cancelled() => {}
            }
        });

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                report = reports.recv() => match report {
                    Ok(report) => {
                        if let Some(message) = report.message() {
                            tracing::info!("{}", message);
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!("Skipped {} delivery reports", skipped);
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                },
            }
        }

        self.lifecycle.stop().await;
        Ok(())
    }
}
