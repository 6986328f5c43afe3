//! BDD step definitions for the monitoring lifecycle

use std::sync::Arc;
use std::time::Duration;

use cucumber::{given, then, when};
use ssid_logger::dispatcher::EventDispatcher;
use ssid_logger::lifecycle::{LifecycleState, MonitorLifecycle};
use ssid_logger::{MonitorConfig, SsidLoggerError};

use crate::world::{QuietObserver, SsidLoggerWorld};

#[given("a monitor lifecycle")]
fn monitor_lifecycle(world: &mut SsidLoggerWorld) {
    let source = world.source();
    let dispatcher = EventDispatcher::new(world.http());
    let lifecycle = MonitorLifecycle::new(source, Arc::new(QuietObserver), dispatcher);
    world.lifecycle = Some(Arc::new(lifecycle));
}

#[given(expr = "monitoring is running with endpoint {string}")]
async fn monitoring_running(world: &mut SsidLoggerWorld, endpoint_url: String) {
    world
        .lifecycle()
        .start(MonitorConfig::new(endpoint_url))
        .await
        .expect("monitoring did not start");
}

#[when(expr = "monitoring starts with endpoint {string}")]
async fn monitoring_starts(world: &mut SsidLoggerWorld, endpoint_url: String) {
    let result = world
        .lifecycle()
        .start(MonitorConfig::new(endpoint_url))
        .await;
    world.start_result = Some(result);
}

#[when("monitoring stops")]
async fn monitoring_stops(world: &mut SsidLoggerWorld) {
    world.stop_result = Some(world.lifecycle().stop().await);
}

#[when("a recheck is requested")]
async fn recheck_requested(world: &mut SsidLoggerWorld) {
    assert!(world.lifecycle().recheck().await, "recheck not accepted");
}

#[then("the start succeeds")]
fn start_succeeds(world: &mut SsidLoggerWorld) {
    let result = world.start_result.as_ref().expect("start not attempted");
    assert!(result.is_ok(), "start failed: {:?}", result);
}

#[then("the start is rejected as a configuration error")]
fn start_rejected_config(world: &mut SsidLoggerWorld) {
    let result = world.start_result.as_ref().expect("start not attempted");
    assert!(
        matches!(result, Err(SsidLoggerError::Config(_))),
        "unexpected result {:?}",
        result
    );
}

#[then(expr = "the start is rejected because monitoring already reports to {string}")]
fn start_rejected_running(world: &mut SsidLoggerWorld, endpoint_url: String) {
    match world.start_result.as_ref().expect("start not attempted") {
        Err(SsidLoggerError::AlreadyRunning(active)) => assert_eq!(active, &endpoint_url),
        other => panic!("expected AlreadyRunning, got {:?}", other),
    }
}

#[then(expr = "the monitor is running with endpoint {string}")]
async fn monitor_running(world: &mut SsidLoggerWorld, endpoint_url: String) {
    let status = world.lifecycle().status().await;
    assert_eq!(status.state, LifecycleState::Running);
    let expected = Some(endpoint_url.as_str());
    assert_eq!(status.endpoint_url.as_deref(), expected);
}

#[then("the monitor is idle")]
async fn monitor_idle(world: &mut SsidLoggerWorld) {
    let status = world.lifecycle().status().await;
    assert_eq!(status.state, LifecycleState::Idle);
    assert!(!status.running);
    assert_eq!(status.endpoint_url, None);
}

#[then("stopping did nothing")]
fn stop_was_noop(world: &mut SsidLoggerWorld) {
    assert_eq!(world.stop_result, Some(None));
}

#[then(expr = "the endpoint eventually receives {int} request(s)")]
async fn endpoint_receives(world: &mut SsidLoggerWorld, count: usize) {
    let http = world.http();
    for _ in 0..200 {
        if http.requests().len() >= count {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    // Give stray deliveries a moment to show up
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(http.requests().len(), count, "{:?}", http.requests());
}

#[then(expr = "request {int} is a {string} event for {string}")]
fn request_is_lifecycle_event(
    world: &mut SsidLoggerWorld,
    index: usize,
    event: String,
    ssid: String,
) {
    let requests = world.http().requests();
    let (_, body) = &requests[index - 1];
    assert_eq!(body["event"], event.as_str(), "body was {}", body);
    assert_eq!(body["currentSSID"], ssid.as_str(), "body was {}", body);
}

#[then(expr = "request {int} is a change from {string} to {string}")]
fn request_is_change(
    world: &mut SsidLoggerWorld,
    index: usize,
    previous: String,
    new: String,
) {
    let requests = world.http().requests();
    let (_, body) = &requests[index - 1];
    assert_eq!(body["previousSSID"], previous.as_str(), "{}", body);
    assert_eq!(body["newSSID"], new.as_str(), "body was {}", body);
}
