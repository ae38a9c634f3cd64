//! Behaviour tests for the bridge session lifecycle.

use courier_bridge::test_support::{ManualClock, RecordingSurface};
use courier_bridge::{BridgeConfig, BridgeNotice, BridgeSession, Command};
use courier_core::Coordinate;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

const PRIMARY: &str = "https://primary.example.com/sdk.js";
const BACKUP: &str = "https://backup.example.com/sdk.js";

struct Harness {
    clock: Rc<ManualClock>,
    session: Option<BridgeSession<RecordingSurface, Rc<ManualClock>>>,
    notices: Vec<BridgeNotice>,
}

impl Harness {
    fn session(&mut self) -> &mut BridgeSession<RecordingSurface, Rc<ManualClock>> {
        self.session.as_mut().expect("session configured by a given step")
    }

    fn record(&mut self, notice: Option<BridgeNotice>) {
        self.notices.extend(notice);
    }

    fn failures(&self) -> Vec<String> {
        self.notices
            .iter()
            .filter_map(|notice| match notice {
                BridgeNotice::Failed(failure) => Some(failure.to_string()),
                _ => None,
            })
            .collect()
    }
}

#[fixture]
fn harness() -> RefCell<Harness> {
    RefCell::new(Harness {
        clock: Rc::new(ManualClock::new()),
        session: None,
        notices: Vec::new(),
    })
}

#[given("a session with two candidate map sources")]
fn two_sources(#[from(harness)] harness: &RefCell<Harness>) {
    let mut harness = harness.borrow_mut();
    let clock = Rc::clone(&harness.clock);
    harness.session = Some(BridgeSession::with_clock(
        BridgeConfig::new([PRIMARY, BACKUP]),
        RecordingSurface::default(),
        clock,
    ));
}

#[given("the session has started")]
fn started(#[from(harness)] harness: &RefCell<Harness>) {
    let mut harness = harness.borrow_mut();
    let notice = harness.session().start();
    harness.record(notice);
}

#[when("the host sends a move, a marker and a clear before the map is ready")]
fn send_commands(#[from(harness)] harness: &RefCell<Harness>) {
    let at = Coordinate::new(37.5, 127.0).expect("valid coordinate");
    let mut harness = harness.borrow_mut();
    let session = harness.session();
    session.dispatch(Command::MoveTo { at });
    session.dispatch(Command::AddMarker {
        at,
        label: String::from("1"),
    });
    session.dispatch(Command::ClearMarkers);
    assert!(session.surface().scripts().is_empty());
}

fn feed(harness: &RefCell<Harness>, raw: &str) {
    let mut harness = harness.borrow_mut();
    let notice = harness.session().receive(raw);
    harness.record(notice);
}

fn fail_source(harness: &RefCell<Harness>) {
    let mut harness = harness.borrow_mut();
    harness.clock.advance(Duration::from_secs(2));
    let notice = harness.session().resource_failed("net::ERR_NAME_NOT_RESOLVED");
    harness.record(notice);
}

#[when("the surface reports ready")]
fn ready(#[from(harness)] harness: &RefCell<Harness>) {
    feed(harness, r#"{"type":"mapReady"}"#);
}

#[when("the surface reports ready again")]
fn ready_again(#[from(harness)] harness: &RefCell<Harness>) {
    feed(harness, r#"{"type":"mapReady"}"#);
}

#[when("the surface reports a map error")]
fn map_error(#[from(harness)] harness: &RefCell<Harness>) {
    feed(harness, r#"{"type":"mapError","message":"script error"}"#);
}

#[when("the surface reports another map error")]
fn another_map_error(#[from(harness)] harness: &RefCell<Harness>) {
    feed(harness, r#"{"type":"mapError","message":"still broken"}"#);
}

#[when("the first source fails to load")]
fn first_source_fails(#[from(harness)] harness: &RefCell<Harness>) {
    fail_source(harness);
}

#[when("the second source fails to load")]
fn second_source_fails(#[from(harness)] harness: &RefCell<Harness>) {
    fail_source(harness);
}

#[when("the readiness deadline passes")]
fn deadline_passes(#[from(harness)] harness: &RefCell<Harness>) {
    let mut harness = harness.borrow_mut();
    harness.clock.advance(Duration::from_secs(8));
    let notice = harness.session().poll_timeout();
    harness.record(notice);
}

#[when("the deadline elapses before the host polls")]
fn deadline_elapses_unpolled(#[from(harness)] harness: &RefCell<Harness>) {
    harness.borrow().clock.advance(Duration::from_secs(8));
}

#[then("the surface ran move, marker and clear exactly once in that order")]
fn ran_in_order(#[from(harness)] harness: &RefCell<Harness>) {
    let mut harness = harness.borrow_mut();
    let calls = harness.session().surface().calls();
    assert_eq!(calls, vec!["moveTo", "addNumberedMarker", "clearAllMarkers"]);
}

#[then("the surface ran no commands")]
fn ran_nothing(#[from(harness)] harness: &RefCell<Harness>) {
    let mut harness = harness.borrow_mut();
    let session = harness.session();
    assert!(session.surface().calls().is_empty());
    assert_eq!(session.pending_len(), 0);
    assert!(!session.is_ready());
}

#[then("exactly one failure was reported")]
fn one_failure(#[from(harness)] harness: &RefCell<Harness>) {
    assert_eq!(harness.borrow().failures().len(), 1);
}

#[then("the failure lists both source URLs")]
fn lists_urls(#[from(harness)] harness: &RefCell<Harness>) {
    let failures = harness.borrow().failures();
    let message = failures.first().expect("one failure");
    assert!(message.contains(PRIMARY), "{message}");
    assert!(message.contains(BACKUP), "{message}");
}

#[then("the failure mentions the SDK key registration")]
fn mentions_key(#[from(harness)] harness: &RefCell<Harness>) {
    let failures = harness.borrow().failures();
    let message = failures.first().expect("one failure");
    assert!(message.contains("did not become ready within 8s"), "{message}");
    assert!(message.contains("SDK key"), "{message}");
}

#[scenario(path = "tests/features/session.feature", index = 0)]
fn queued_commands_flush_once(harness: RefCell<Harness>) {
    let _ = harness;
}

#[scenario(path = "tests/features/session.feature", index = 1)]
fn failure_alerts_once(harness: RefCell<Harness>) {
    let _ = harness;
}

#[scenario(path = "tests/features/session.feature", index = 2)]
fn exhausted_sources(harness: RefCell<Harness>) {
    let _ = harness;
}

#[scenario(path = "tests/features/session.feature", index = 3)]
fn silent_surface_times_out(harness: RefCell<Harness>) {
    let _ = harness;
}

#[scenario(path = "tests/features/session.feature", index = 4)]
fn late_ready_times_out(harness: RefCell<Harness>) {
    let _ = harness;
}

#[scenario(path = "tests/features/session.feature", index = 5)]
fn late_source_failure_times_out(harness: RefCell<Harness>) {
    let _ = harness;
}
