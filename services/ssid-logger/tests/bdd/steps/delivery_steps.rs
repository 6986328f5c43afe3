//! BDD step definitions for event delivery

use std::sync::Arc;

use cucumber::{given, then, when};
use ssid_logger::dispatcher::{DeliveryResult, EventDispatcher};
use ssid_logger::event::SsidEvent;
use ssid_logger::DeliveryError;

use crate::world::{RecordingHttpClient, SsidLoggerWorld};

const ENDPOINT_URL: &str = "http://logger.test/log";

#[given(expr = "an endpoint that answers with status {int}")]
fn endpoint_answering(world: &mut SsidLoggerWorld, status: u16) {
    world.http = Some(Arc::new(RecordingHttpClient::answering(status)));
}

#[given("an endpoint that cannot be reached")]
fn endpoint_unreachable(world: &mut SsidLoggerWorld) {
    world.http = Some(Arc::new(RecordingHttpClient::unreachable()));
}

async fn deliver(world: &mut SsidLoggerWorld, event: SsidEvent) {
    let dispatcher = EventDispatcher::new(world.http());
    let mut reports = dispatcher.subscribe();

    world.delivery_result = Some(dispatcher.dispatch_await(event, ENDPOINT_URL).await);
    world.delivery_report = reports.try_recv().ok();
}

#[when(expr = "a change from {string} to {string} is delivered")]
async fn change_delivered(world: &mut SsidLoggerWorld, previous: String, new: String) {
    deliver(world, SsidEvent::change(Some(previous), new)).await;
}

#[when(expr = "monitoring startup on {string} is delivered")]
async fn startup_delivered(world: &mut SsidLoggerWorld, ssid: String) {
    deliver(world, SsidEvent::startup(Some(ssid))).await;
}

#[when("monitoring shutdown without a known network is delivered")]
async fn shutdown_delivered(world: &mut SsidLoggerWorld) {
    deliver(world, SsidEvent::shutdown(None)).await;
}

#[then("the delivery succeeds")]
fn delivery_succeeds(world: &mut SsidLoggerWorld) {
    let result = world.delivery_result.as_ref().expect("nothing delivered");
    assert!(result.is_delivered(), "delivery failed: {}", result);
}

#[then(expr = "the delivery fails with status {int}")]
fn delivery_fails_with_status(world: &mut SsidLoggerWorld, status: u16) {
    let expected = DeliveryResult::Failed(DeliveryError::NonSuccessStatus(status));
    assert_eq!(world.delivery_result, Some(expected));
}

#[then("the delivery fails at the transport level")]
fn delivery_fails_transport(world: &mut SsidLoggerWorld) {
    let result = world.delivery_result.as_ref().expect("nothing delivered");
    assert!(
        matches!(result, DeliveryResult::Failed(DeliveryError::Transport(_))),
        "unexpected result {:?}",
        result
    );
}

#[then(expr = "the endpoint received a body with {string} set to {string}")]
fn endpoint_received_field(world: &mut SsidLoggerWorld, field: String, value: String) {
    let requests = world.http().requests();
    let (url, body) = requests.last().expect("no request received");
    assert_eq!(url, ENDPOINT_URL);
    assert_eq!(body[field.as_str()], value.as_str(), "body was {}", body);
}

#[then(expr = "the report message is {string}")]
fn report_message(world: &mut SsidLoggerWorld, message: String) {
    let report = world.delivery_report.as_ref().expect("no report broadcast");
    assert_eq!(report.message().as_deref(), Some(message.as_str()));
}

#[then("no report message is shown")]
fn no_report_message(world: &mut SsidLoggerWorld) {
    let report = world.delivery_report.as_ref().expect("no report broadcast");
    assert_eq!(report.message(), None);
}
