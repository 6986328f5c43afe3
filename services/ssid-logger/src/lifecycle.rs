//! Monitoring session lifecycle: start, steady state, stop

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::MonitorConfig;
use crate::dispatcher::{DeliveryReport, DeliveryResult, EventDispatcher};
use crate::event::{SsidEvent, NO_SSID};
use crate::observer::{NetworkObserver, ObserverSignal, SignalSender};
use crate::ssid::SsidSource;
use crate::tracker::SsidTracker;

/// Where the lifecycle state machine currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Idle,
    Starting,
    Running,
    Stopping,
}

/// Snapshot returned by [`MonitorLifecycle::status`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorStatus {
    pub state: LifecycleState,
    pub running: bool,
    pub endpoint_url: Option<String>,
    /// The observer failed to register; only manual rechecks detect changes
    pub observer_degraded: bool,
}

struct Session {
    endpoint_url: String,
    signals: SignalSender,
    cancel: CancellationToken,
    worker: JoinHandle<SsidTracker>,
}

struct Inner {
    state: LifecycleState,
    config: Option<MonitorConfig>,
    observer_degraded: bool,
    session: Option<Session>,
}

/// Drives one monitoring session at a time.
///
/// A start request while a session is starting, running, or stopping is
/// rejected with [`SsidLoggerError::AlreadyRunning`](crate::SsidLoggerError::AlreadyRunning).
pub struct MonitorLifecycle {
    ssid_source: Arc<dyn SsidSource>,
    observer: Arc<dyn NetworkObserver>,
    dispatcher: EventDispatcher,
    // Serializes start/stop; never taken by status or recheck
    transition: Mutex<()>,
    inner: Mutex<Inner>,
}

impl std::fmt::Debug for MonitorLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorLifecycle")
            .field("ssid_source", &self.ssid_source)
            .field("observer", &self.observer)
            .finish()
    }
}

impl MonitorLifecycle {
    pub fn new(
        ssid_source: Arc<dyn SsidSource>,
        observer: Arc<dyn NetworkObserver>,
        dispatcher: EventDispatcher,
    ) -> Self {
        Self {
            ssid_source,
            observer,
            dispatcher,
            transition: Mutex::new(()),
            inner: Mutex::new(Inner {
                state: LifecycleState::Idle,
                config: None,
                observer_degraded: false,
                session: None,
            }),
        }
    }

    /// Start a monitoring session reporting to `config.endpoint_url`
    pub async fn start(&self, config: MonitorConfig) -> crate::Result<()> {
        let Ok(_transition) = self.transition.try_lock() else {
            return Err(self.already_running().await);
        };

        {
            let mut inner = self.inner.lock().await;
            if inner.state != LifecycleState::Idle {
                let active = inner
                    .config
                    .as_ref()
                    .map(|c| c.endpoint_url.clone())
                    .unwrap_or_default();
                return Err(crate::SsidLoggerError::AlreadyRunning(active));
            }
            inner.state = LifecycleState::Starting;
        }

        let endpoint_url = match config.validate() {
            Ok(url) => url.to_string(),
            Err(e) => {
                tracing::error!("Not starting SSID monitoring: {}", e);
                self.inner.lock().await.state = LifecycleState::Idle;
                return Err(e.into());
            }
        };

        tracing::info!("Starting SSID monitoring with endpoint: {}", endpoint_url);

        let mut tracker = SsidTracker::new(Arc::clone(&self.ssid_source));
        let initial = tracker.current_ssid().await;
        tracker.reset(initial.clone());
        tracing::info!("Initial SSID: {}", initial.as_deref().unwrap_or(NO_SSID));

        let (signals, receiver) = mpsc::unbounded_channel();
        let observer_degraded = match self.observer.start(signals.clone()).await {
            Ok(()) => false,
            Err(e) => {
                tracing::warn!("{}. Continuing without automatic wifi change detection", e);
                true
            }
        };

        self.dispatcher
            .dispatch_async(SsidEvent::startup(initial), endpoint_url.clone());

        let cancel = CancellationToken::new();
        let worker = tokio::spawn(run_session(
            tracker,
            receiver,
            self.dispatcher.clone(),
            endpoint_url.clone(),
            cancel.clone(),
        ));

        let mut inner = self.inner.lock().await;
        inner.state = LifecycleState::Running;
        inner.config = Some(MonitorConfig::new(endpoint_url.clone()));
        inner.observer_degraded = observer_degraded;
        inner.session = Some(Session {
            endpoint_url,
            signals,
            cancel,
            worker,
        });
        Ok(())
    }

    /// Stop the running session, waiting for the shutdown event delivery and
    /// for change deliveries that are still in flight.
    ///
    /// Returns the shutdown delivery result, or `None` if nothing was running.
    pub async fn stop(&self) -> Option<DeliveryResult> {
        let _transition = self.transition.lock().await;

        let session = {
            let mut inner = self.inner.lock().await;
            let session = inner.session.take()?;
            inner.state = LifecycleState::Stopping;
            session
        };

        tracing::info!("Stopping SSID monitoring");
        self.observer.stop().await;
        session.cancel.cancel();

        let last_known = match session.worker.await {
            Ok(tracker) => tracker.previous_ssid().map(str::to_string),
            Err(e) => {
                tracing::warn!("SSID monitoring worker ended abnormally: {}", e);
                None
            }
        };

        let result = self
            .dispatcher
            .dispatch_await(SsidEvent::shutdown(last_known), &session.endpoint_url)
            .await;

        // Change deliveries started before the shutdown may still be running
        self.dispatcher.wait_for_in_flight().await;

        let mut inner = self.inner.lock().await;
        inner.state = LifecycleState::Idle;
        inner.config = None;
        inner.observer_degraded = false;
        tracing::info!("SSID monitoring stopped");
        Some(result)
    }

    /// Ask the running session to re-read the SSID now.
    ///
    /// Returns false when no session is running.
    pub async fn recheck(&self) -> bool {
        let inner = self.inner.lock().await;
        match &inner.session {
            Some(session) => session.signals.send(ObserverSignal::Recheck).is_ok(),
            None => false,
        }
    }

    pub async fn status(&self) -> MonitorStatus {
        let inner = self.inner.lock().await;
        MonitorStatus {
            state: inner.state,
            running: inner.state == LifecycleState::Running,
            endpoint_url: inner.config.as_ref().map(|c| c.endpoint_url.clone()),
            observer_degraded: inner.observer_degraded,
        }
    }

    /// Receive a report for every delivery attempted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<DeliveryReport> {
        self.dispatcher.subscribe()
    }

    async fn already_running(&self) -> crate::SsidLoggerError {
        let inner = self.inner.lock().await;
        crate::SsidLoggerError::AlreadyRunning(
            inner
                .config
                .as_ref()
                .map(|c| c.endpoint_url.clone())
                .unwrap_or_default(),
        )
    }
}

/// Session worker: the only place the tracker is checked or mutated.
///
/// Signals already queued are handled before cancellation is honoured.
async fn run_session(
    mut tracker: SsidTracker,
    mut signals: mpsc::UnboundedReceiver<ObserverSignal>,
    dispatcher: EventDispatcher,
    endpoint_url: String,
    cancel: CancellationToken,
) -> SsidTracker {
    loop {
        tokio::select! {
            biased;
            signal = signals.recv() => match signal {
                Some(signal) => {
                    tracing::debug!("Checking SSID after {:?}", signal);
                    if let Some(event) = tracker.check_for_change().await {
                        tracing::info!("{}", event);
                        dispatcher.dispatch_async(event, endpoint_url.clone());
                    }
                }
                None => break,
            },
            _ = cancel.cancelled() => break,
        }
    }
    tracing::debug!("SSID monitoring worker finished");
    tracker
}
