//! BDD step definitions for SSID change detection

use cucumber::{given, then, when};
use ssid_logger::event::SsidEvent;
use ssid_logger::tracker::SsidTracker;

use crate::world::SsidLoggerWorld;

#[given(expr = "a wireless source reporting {string}")]
fn source_reporting(world: &mut SsidLoggerWorld, ssid: String) {
    world.source().set(Some(ssid));
}

#[given("a wireless source reporting no network")]
fn source_reporting_nothing(world: &mut SsidLoggerWorld) {
    world.source().set(None);
}

#[when(expr = "the wireless source switches to {string}")]
fn source_switches(world: &mut SsidLoggerWorld, ssid: String) {
    world.source().set(Some(ssid));
}

#[when("the wireless network is lost")]
fn source_lost(world: &mut SsidLoggerWorld) {
    world.source().set(None);
}

#[given("a fresh SSID tracker")]
fn fresh_tracker(world: &mut SsidLoggerWorld) {
    let source = world.source();
    world.tracker = Some(SsidTracker::new(source));
}

#[given(expr = "an SSID tracker that last saw {string}")]
fn tracker_that_saw(world: &mut SsidLoggerWorld, ssid: String) {
    let mut tracker = SsidTracker::new(world.source());
    tracker.reset(Some(ssid));
    world.tracker = Some(tracker);
}

#[when("the tracker checks for a change")]
async fn tracker_checks(world: &mut SsidLoggerWorld) {
    let tracker = world.tracker.as_mut().expect("tracker not set up");
    world.last_check = Some(tracker.check_for_change().await);
}

#[then(expr = "a change from {string} to {string} is reported")]
fn change_reported(world: &mut SsidLoggerWorld, previous: String, new: String) {
    match world.last_check.as_ref().expect("no check performed") {
        Some(SsidEvent::Change {
            previous_ssid,
            new_ssid,
            ..
        }) => {
            assert_eq!(previous_ssid.as_deref().unwrap_or("none"), previous);
            assert_eq!(new_ssid, &new);
        }
        other => panic!("expected a change, got {:?}", other),
    }
}

#[then("no change is reported")]
fn no_change_reported(world: &mut SsidLoggerWorld) {
    let outcome = world.last_check.as_ref().expect("no check performed");
    assert!(outcome.is_none(), "unexpected event {:?}", outcome);
}

#[then(expr = "the tracker still remembers {string}")]
fn tracker_remembers(world: &mut SsidLoggerWorld, ssid: String) {
    let tracker = world.tracker.as_ref().expect("tracker not set up");
    assert_eq!(tracker.previous_ssid(), Some(ssid.as_str()));
}
