//! Integration tests for the BinControlLoop → lid / fill / telemetry
//! pipeline, driven through port-level mocks.

use crate::mock_hw::{MockBin, MockLink, RecordingSink};

use smartbin::app::commands::{CommandInbox, RemoteCommand};
use smartbin::app::events::AppEvent;
use smartbin::app::service::{BinControlLoop, CycleOutcome, CycleReport};
use smartbin::app::telemetry::MessageKind;
use smartbin::config::BinConfig;
use smartbin::control::fill::{FillLevel, RangeSample};
use smartbin::error::{CommsError, Error};
use smartbin::fsm::{LidState, TransitionCause};

const TELEMETRY: &str = "smartbin/bin-001/telemetry";
const EVENT: &str = "smartbin/bin-001/event";

fn make_loop() -> BinControlLoop {
    BinControlLoop::new(&BinConfig::default()).unwrap()
}

fn completed(outcome: CycleOutcome) -> CycleReport {
    match outcome {
        CycleOutcome::Completed(report) => report,
        CycleOutcome::Skipped(e) => panic!("cycle skipped: {e}"),
    }
}

// ── Fill and emptied detection ────────────────────────────────

#[test]
fn emptying_raises_one_event_then_status() {
    let mut ctl = make_loop();
    let mut hw = MockBin::with_ranges(&[120, 365]);
    let mut link = MockLink::up();
    let inbox = CommandInbox::new();
    let mut sink = RecordingSink::new();

    let first = completed(ctl.run_cycle(&mut hw, &mut link, &inbox, &mut sink));
    assert_eq!(first.fill, FillLevel::clamped(80));
    assert!(!first.emptied);

    let second = completed(ctl.run_cycle(&mut hw, &mut link, &inbox, &mut sink));
    assert_eq!(second.fill, FillLevel::clamped(10));
    assert!(second.emptied);
    assert!(second.emptied_published);

    assert_eq!(link.on(EVENT), vec![r#"{"event":"emptied"}"#]);
    assert_eq!(
        link.on(TELEMETRY),
        vec![r#"{"fill":80,"lid":false}"#, r#"{"fill":10,"lid":false}"#]
    );
    // Status is the last outbound message of the emptying cycle.
    assert_eq!(link.topics(), vec![TELEMETRY, EVENT, TELEMETRY]);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::Emptied { .. })),
        1,
        "exactly one emptied event"
    );
    assert_eq!(ctl.state().previous_fill(), Some(FillLevel::clamped(10)));
}

#[test]
fn drop_at_threshold_is_not_emptied() {
    // 80 % at 120 mm, 50 % at 225 mm: a drop of exactly 30 points.
    let mut ctl = make_loop();
    let mut hw = MockBin::with_ranges(&[120, 225]);
    let mut link = MockLink::up();
    let inbox = CommandInbox::new();
    let mut sink = RecordingSink::new();

    ctl.run_cycle(&mut hw, &mut link, &inbox, &mut sink);
    let report = completed(ctl.run_cycle(&mut hw, &mut link, &inbox, &mut sink));
    assert_eq!(report.fill, FillLevel::clamped(50));
    assert!(!report.emptied);
    assert!(link.on(EVENT).is_empty());
}

#[test]
fn first_cycle_cannot_fire_emptied() {
    let mut ctl = make_loop();
    let mut hw = MockBin::with_ranges(&[400]);
    let mut link = MockLink::up();
    let inbox = CommandInbox::new();
    let mut sink = RecordingSink::new();

    let report = completed(ctl.run_cycle(&mut hw, &mut link, &inbox, &mut sink));
    assert_eq!(report.fill, FillLevel::EMPTY);
    assert!(!report.emptied);
}

#[test]
fn timeout_before_any_reading_reports_zero_and_stays_unseeded() {
    let mut ctl = make_loop();
    let mut hw = MockBin::new();
    hw.push_range(RangeSample::NoEcho);
    hw.push_range(RangeSample::Distance { mm: 120 });
    let mut link = MockLink::up();
    let inbox = CommandInbox::new();
    let mut sink = RecordingSink::new();

    let first = completed(ctl.run_cycle(&mut hw, &mut link, &inbox, &mut sink));
    assert_eq!(first.fill, FillLevel::EMPTY);
    assert_eq!(ctl.state().previous_fill(), None);

    let second = completed(ctl.run_cycle(&mut hw, &mut link, &inbox, &mut sink));
    assert_eq!(second.fill, FillLevel::clamped(80));
    assert!(!second.emptied);
}

#[test]
fn timeout_repeats_previous_fill() {
    let mut ctl = make_loop();
    let mut hw = MockBin::with_ranges(&[120]);
    hw.push_range(RangeSample::NoEcho);
    let mut link = MockLink::up();
    let inbox = CommandInbox::new();
    let mut sink = RecordingSink::new();

    ctl.run_cycle(&mut hw, &mut link, &inbox, &mut sink);
    let report = completed(ctl.run_cycle(&mut hw, &mut link, &inbox, &mut sink));
    assert_eq!(report.range, RangeSample::NoEcho);
    assert_eq!(report.fill, FillLevel::clamped(80));
    assert!(!report.emptied);
    assert_eq!(
        link.on(TELEMETRY),
        vec![r#"{"fill":80,"lid":false}"#, r#"{"fill":80,"lid":false}"#]
    );
}

// ── Lid rules ─────────────────────────────────────────────────

#[test]
fn unknown_command_without_presence_leaves_lid_alone() {
    let mut ctl = make_loop();
    let mut hw = MockBin::with_ranges(&[200]);
    let mut link = MockLink::up();
    let inbox = CommandInbox::new();
    let mut sink = RecordingSink::new();

    inbox.post(b"open");
    let report = completed(ctl.run_cycle(&mut hw, &mut link, &inbox, &mut sink));
    assert_eq!(report.command, Some(RemoteCommand::Unknown));
    assert_eq!(report.lid_transition, None);
    assert!(hw.lid_writes.is_empty(), "no actuator write expected");
    assert_eq!(ctl.state().lid(), LidState::Closed);
}

#[test]
fn unknown_command_falls_through_to_presence() {
    let mut ctl = make_loop();
    let mut hw = MockBin::new();
    hw.presence = true;
    let mut link = MockLink::up();
    let inbox = CommandInbox::new();
    let mut sink = RecordingSink::new();

    inbox.post(b"GARBAGE");
    let report = completed(ctl.run_cycle(&mut hw, &mut link, &inbox, &mut sink));
    assert_eq!(report.lid_transition.map(|t| t.cause), Some(TransitionCause::Presence));
    assert_eq!(hw.lid_writes, vec![90]);
}

#[test]
fn presence_opens_then_absence_closes() {
    let mut ctl = make_loop();
    let mut hw = MockBin::new();
    let mut link = MockLink::up();
    let inbox = CommandInbox::new();
    let mut sink = RecordingSink::new();

    hw.presence = true;
    ctl.run_cycle(&mut hw, &mut link, &inbox, &mut sink);
    ctl.run_cycle(&mut hw, &mut link, &inbox, &mut sink);
    hw.presence = false;
    ctl.run_cycle(&mut hw, &mut link, &inbox, &mut sink);
    ctl.run_cycle(&mut hw, &mut link, &inbox, &mut sink);

    // One write per transition, none while steady.
    assert_eq!(hw.lid_writes, vec![90, 0]);
    assert_eq!(ctl.state().lid(), LidState::Closed);
}

#[test]
fn remote_open_overrides_absence_for_one_cycle() {
    let mut ctl = make_loop();
    let mut hw = MockBin::new();
    let mut link = MockLink::up();
    let inbox = CommandInbox::new();
    let mut sink = RecordingSink::new();

    inbox.post(b"OPEN");
    let report = completed(ctl.run_cycle(&mut hw, &mut link, &inbox, &mut sink));
    assert_eq!(ctl.state().lid(), LidState::Open);
    assert_eq!(link.on(TELEMETRY), vec![r#"{"fill":0,"lid":true}"#]);
    assert_eq!(report.lid_transition.map(|t| t.cause), Some(TransitionCause::Remote));

    // Nobody there and no command: the presence rule closes it again.
    ctl.run_cycle(&mut hw, &mut link, &inbox, &mut sink);
    assert_eq!(hw.lid_writes, vec![90, 0]);
    assert_eq!(ctl.state().lid(), LidState::Closed);
}

#[test]
fn remote_close_overrides_presence() {
    let mut ctl = make_loop();
    let mut hw = MockBin::new();
    hw.presence = true;
    let mut link = MockLink::up();
    let inbox = CommandInbox::new();
    let mut sink = RecordingSink::new();

    ctl.run_cycle(&mut hw, &mut link, &inbox, &mut sink);
    assert_eq!(ctl.state().lid(), LidState::Open);

    inbox.post(b"CLOSE");
    ctl.run_cycle(&mut hw, &mut link, &inbox, &mut sink);
    assert_eq!(ctl.state().lid(), LidState::Closed);
    assert_eq!(hw.lid_writes, vec![90, 0]);
}

#[test]
fn repeated_remote_open_writes_each_time() {
    let mut ctl = make_loop();
    let mut hw = MockBin::new();
    hw.presence = true;
    let mut link = MockLink::up();
    let inbox = CommandInbox::new();
    let mut sink = RecordingSink::new();

    inbox.post(b"OPEN");
    ctl.run_cycle(&mut hw, &mut link, &inbox, &mut sink);
    inbox.post(b"OPEN");
    ctl.run_cycle(&mut hw, &mut link, &inbox, &mut sink);

    assert_eq!(hw.lid_writes, vec![90, 90]);
    assert_eq!(ctl.state().lid(), LidState::Open);
}

#[test]
fn latest_command_wins_within_a_cycle() {
    let mut ctl = make_loop();
    let mut hw = MockBin::new();
    hw.presence = true;
    let mut link = MockLink::up();
    let inbox = CommandInbox::new();
    let mut sink = RecordingSink::new();

    inbox.post(b"OPEN");
    inbox.post(b"CLOSE");
    let report = completed(ctl.run_cycle(&mut hw, &mut link, &inbox, &mut sink));
    assert_eq!(report.command, Some(RemoteCommand::Close));
    assert_eq!(hw.lid_writes, vec![0]);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::CommandReceived(_))),
        1,
        "only one command consumed"
    );
    assert!(!inbox.is_pending());
}

#[test]
fn start_parks_lid_closed() {
    let mut ctl = make_loop();
    let mut hw = MockBin::new();
    let mut sink = RecordingSink::new();

    ctl.start(&mut hw, &mut sink);
    assert_eq!(hw.lid_writes, vec![0]);
    assert_eq!(sink.events, vec![AppEvent::Started { period_ms: 300 }]);
    assert_eq!(ctl.state().lid(), LidState::Closed);
}

// ── Link failures ─────────────────────────────────────────────

#[test]
fn failed_reconnect_skips_whole_cycle() {
    let mut ctl = make_loop();
    let mut hw = MockBin::with_ranges(&[120]);
    hw.presence = true;
    let mut link = MockLink::down(false);
    let inbox = CommandInbox::new();
    let mut sink = RecordingSink::new();

    inbox.post(b"OPEN");
    let outcome = ctl.run_cycle(&mut hw, &mut link, &inbox, &mut sink);
    assert_eq!(outcome, CycleOutcome::Skipped(CommsError::BrokerUnreachable));
    assert_eq!(hw.presence_reads, 0);
    assert_eq!(hw.range_reads, 0);
    assert!(hw.lid_writes.is_empty());
    assert!(link.published.is_empty());
    assert!(inbox.is_pending(), "command stays queued for the next cycle");
    assert_eq!(
        sink.events,
        vec![AppEvent::CycleSkipped(Error::Comms(CommsError::BrokerUnreachable))]
    );
    assert_eq!(ctl.cycle_count(), 1);

    // Broker comes back: the queued command is applied.
    link.reconnect_ok = true;
    let report = completed(ctl.run_cycle(&mut hw, &mut link, &inbox, &mut sink));
    assert_eq!(report.command, Some(RemoteCommand::Open));
    assert_eq!(link.reconnects, 2);
    assert_eq!(ctl.cycle_count(), 2);
}

#[test]
fn successful_reconnect_runs_cycle() {
    let mut ctl = make_loop();
    let mut hw = MockBin::with_ranges(&[120]);
    let mut link = MockLink::down(true);
    let inbox = CommandInbox::new();
    let mut sink = RecordingSink::new();

    let report = completed(ctl.run_cycle(&mut hw, &mut link, &inbox, &mut sink));
    assert!(report.status_published);
    assert_eq!(link.reconnects, 1);
}

#[test]
fn publish_failure_does_not_abort_cycle() {
    let mut ctl = make_loop();
    let mut hw = MockBin::with_ranges(&[120, 365]);
    hw.presence = true;
    let mut link = MockLink::up();
    link.reject_publish = true;
    let inbox = CommandInbox::new();
    let mut sink = RecordingSink::new();

    ctl.run_cycle(&mut hw, &mut link, &inbox, &mut sink);
    let report = completed(ctl.run_cycle(&mut hw, &mut link, &inbox, &mut sink));

    assert!(report.emptied);
    assert!(!report.emptied_published);
    assert!(!report.status_published);
    assert_eq!(ctl.state().lid(), LidState::Open);
    assert_eq!(ctl.state().previous_fill(), Some(FillLevel::clamped(10)));
    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::PublishFailed {
                kind: MessageKind::Emptied,
                ..
            }
        )),
        1
    );
    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::PublishFailed {
                kind: MessageKind::Status,
                ..
            }
        )),
        2
    );
}

// ── Configuration ─────────────────────────────────────────────

#[test]
fn custom_device_id_changes_topics() {
    let mut config = BinConfig::default();
    config.device_id = "dock-7".try_into().unwrap();
    let mut ctl = BinControlLoop::new(&config).unwrap();
    let mut hw = MockBin::with_ranges(&[50]);
    let mut link = MockLink::up();
    let inbox = CommandInbox::new();
    let mut sink = RecordingSink::new();

    ctl.run_cycle(&mut hw, &mut link, &inbox, &mut sink);
    assert_eq!(
        link.on("smartbin/dock-7/telemetry"),
        vec![r#"{"fill":100,"lid":false}"#]
    );
}
