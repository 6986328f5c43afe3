//! Delivery of SSID events to the configured endpoint

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;

use crate::error::DeliveryError;
use crate::event::{EventKind, SsidEvent};
use crate::io::HttpClient;

const REPORT_CHANNEL_CAPACITY: usize = 64;

/// Connect plus read timeout of the default delivery configuration
const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of a single delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryResult {
    Delivered { status: u16 },
    Failed(DeliveryError),
}

impl DeliveryResult {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryResult::Delivered { .. })
    }
}

impl fmt::Display for DeliveryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryResult::Delivered { status } => write!(f, "delivered ({})", status),
            DeliveryResult::Failed(e) => write!(f, "failed: {}", e),
        }
    }
}

/// A delivery outcome as reported to the host application
#[derive(Debug, Clone)]
pub struct DeliveryReport {
    pub kind: EventKind,
    pub endpoint_url: String,
    pub result: DeliveryResult,
    pub timestamp: DateTime<Utc>,
}

impl DeliveryReport {
    /// Short text suitable for a toast or notification, if the outcome
    /// warrants one
    pub fn message(&self) -> Option<String> {
        match (self.kind, &self.result) {
            (EventKind::Startup, DeliveryResult::Delivered { .. }) => {
                Some("Connected to logging server".to_string())
            }
            (EventKind::Startup, DeliveryResult::Failed(DeliveryError::NonSuccessStatus(code))) => {
                Some(format!("Server responded with error: {}", code))
            }
            (EventKind::Startup, DeliveryResult::Failed(_)) => {
                Some("Cannot connect to server: Check URL and network".to_string())
            }
            (EventKind::Change, DeliveryResult::Failed(DeliveryError::NonSuccessStatus(_))) => {
                Some("Failed to send log to server".to_string())
            }
            (EventKind::Change, DeliveryResult::Failed(_)) => {
                Some(format!("Cannot reach endpoint: {}", self.endpoint_url))
            }
            _ => None,
        }
    }
}

/// Serializes events and POSTs them, one attempt each.
///
/// Clones share the same HTTP client, report channel and set of in-flight
/// deliveries.
#[derive(Clone)]
pub struct EventDispatcher {
    http: Arc<dyn HttpClient>,
    reports: broadcast::Sender<DeliveryReport>,
    in_flight: TaskTracker,
    drain_timeout: Duration,
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("subscribers", &self.reports.receiver_count())
            .field("in_flight", &self.in_flight.len())
            .field("drain_timeout", &self.drain_timeout)
            .finish()
    }
}

impl EventDispatcher {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        let (reports, _) = broadcast::channel(REPORT_CHANNEL_CAPACITY);
        Self {
            http,
            reports,
            in_flight: TaskTracker::new(),
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }

    /// Upper bound on how long [`wait_for_in_flight`](Self::wait_for_in_flight)
    /// waits. Should cover one full delivery attempt.
    pub fn with_drain_timeout(mut self, drain_timeout: Duration) -> Self {
        self.drain_timeout = drain_timeout;
        self
    }

    /// Receive a report for every delivery attempted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<DeliveryReport> {
        self.reports.subscribe()
    }

    /// Make a single delivery attempt. Only HTTP 200 counts as delivered.
    pub async fn deliver(&self, event: &SsidEvent, endpoint_url: &str) -> DeliveryResult {
        let body = match event.to_json() {
            Ok(body) => body,
            Err(e) => return DeliveryResult::Failed(DeliveryError::Encoding(e.to_string())),
        };

        tracing::debug!(
            "Sending {} event to {}: {}",
            event.kind(),
            endpoint_url,
            body
        );

        match self.http.post_json(endpoint_url, &body).await {
            Ok(response) if response.status == 200 => DeliveryResult::Delivered {
                status: response.status,
            },
            Ok(response) => {
                tracing::debug!(
                    "Endpoint {} replied {}: {}",
                    endpoint_url,
                    response.status,
                    response.body
                );
                DeliveryResult::Failed(DeliveryError::NonSuccessStatus(response.status))
            }
            Err(e) => DeliveryResult::Failed(DeliveryError::Transport(e.to_string())),
        }
    }

    /// Deliver on a separate task; the outcome is logged and broadcast.
    ///
    /// The task is tracked until it finishes, see
    /// [`wait_for_in_flight`](Self::wait_for_in_flight).
    pub fn dispatch_async(
        &self,
        event: SsidEvent,
        endpoint_url: String,
    ) -> JoinHandle<DeliveryResult> {
        let dispatcher = self.clone();
        self.in_flight.spawn(async move {
            dispatcher.dispatch_await(event, &endpoint_url).await
        })
    }

    /// Number of `dispatch_async` deliveries that have not finished yet
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Wait for every `dispatch_async` delivery to complete or fail, for at
    /// most the drain timeout. Returns false if some were still running.
    pub async fn wait_for_in_flight(&self) -> bool {
        self.in_flight.close();
        let pending = self.in_flight.wait();
        let waited = tokio::time::timeout(self.drain_timeout, pending).await;
        self.in_flight.reopen();

        if waited.is_err() {
            tracing::warn!(
                "Gave up on {} deliveries still in flight after {:?}",
                self.in_flight.len(),
                self.drain_timeout
            );
        }
        waited.is_ok()
    }

    /// Deliver inline, then log and broadcast the outcome
    pub async fn dispatch_await(&self, event: SsidEvent, endpoint_url: &str) -> DeliveryResult {
        let result = self.deliver(&event, endpoint_url).await;
        self.report(&event, endpoint_url, &result);
        result
    }

    fn report(&self, event: &SsidEvent, endpoint_url: &str, result: &DeliveryResult) {
        let kind = event.kind();
        match result {
            DeliveryResult::Delivered { status } => {
                tracing::info!(
                    "Sent {} log ({}) to {} [{}]",
                    kind,
                    event,
                    endpoint_url,
                    status
                );
            }
            DeliveryResult::Failed(DeliveryError::NonSuccessStatus(status)) => {
                tracing::warn!(
                    "Failed to send {} log to {}: non-2xx response {}",
                    kind,
                    endpoint_url,
                    status
                );
            }
            DeliveryResult::Failed(e) => {
                tracing::warn!("Failed to send {} log to {}: {}", kind, endpoint_url, e);
            }
        }

        // No subscribers is fine; the log line above is the record
        let _ = self.reports.send(DeliveryReport {
            kind,
            endpoint_url: endpoint_url.to_string(),
            result: result.clone(),
            timestamp: event.timestamp(),
        });
    }
}
