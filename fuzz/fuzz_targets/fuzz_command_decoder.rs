//! Fuzz target: control-topic payload path
//!
//! Feeds arbitrary bytes through `route_inbound` → `CommandInbox` →
//! `decode` and checks that only the two exact tokens ever actuate.
//!
//! cargo fuzz run fuzz_command_decoder

#![no_main]

use critical_section as _;
use libfuzzer_sys::fuzz_target;
use smartbin::adapters::mqtt::route_inbound;
use smartbin::app::commands::{decode, CommandInbox, RemoteCommand};

const CONTROL: &str = "smartbin/bin-001/control";

fuzz_target!(|data: &[u8]| {
    let direct = decode(data);
    match direct {
        RemoteCommand::Open => assert_eq!(data, b"OPEN"),
        RemoteCommand::Close => assert_eq!(data, b"CLOSE"),
        RemoteCommand::Unknown => assert!(data != b"OPEN" && data != b"CLOSE"),
    }

    let inbox = CommandInbox::new();
    assert!(route_inbound(CONTROL, Some(CONTROL), data, &inbox));
    let queued = inbox.take().expect("routed payload must be queued");
    assert_eq!(queued.decode(), direct);
    assert!(inbox.take().is_none());
});
