//! Mock adapters for integration tests.
//!
//! Two layers of doubles:
//!
//! - port-level mocks ([`MockBin`], [`MockLink`], [`RecordingSink`]) that
//!   script inputs and record every call, for driving `BinControlLoop`
//!   directly;
//! - embedded-hal level doubles ([`PirLevel`], [`ScriptedRanger`],
//!   [`PwmProbe`]) for running the real `HardwareAdapter` and drivers.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use smartbin::app::events::AppEvent;
use smartbin::app::ports::{EventSink, LidActuatorPort, LinkPort, SensorPort};
use smartbin::control::fill::RangeSample;
use smartbin::error::CommsError;
use smartbin::sensors::RangeFinder;

// ── MockBin: SensorPort + LidActuatorPort ─────────────────────

/// Scripted sensors and a recording lid actuator.
///
/// `ranges` is consumed one per read; once empty, reads return `NoEcho`.
#[derive(Debug, Default)]
pub struct MockBin {
    pub presence: bool,
    pub ranges: VecDeque<RangeSample>,
    pub lid_writes: Vec<u8>,
    pub presence_reads: u32,
    pub range_reads: u32,
}

#[allow(dead_code)]
impl MockBin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ranges(mm: &[u16]) -> Self {
        Self {
            ranges: mm.iter().map(|&mm| RangeSample::Distance { mm }).collect(),
            ..Self::default()
        }
    }

    pub fn push_range(&mut self, sample: RangeSample) {
        self.ranges.push_back(sample);
    }
}

impl SensorPort for MockBin {
    fn read_presence(&mut self) -> bool {
        self.presence_reads += 1;
        self.presence
    }

    fn read_range(&mut self) -> RangeSample {
        self.range_reads += 1;
        self.ranges.pop_front().unwrap_or(RangeSample::NoEcho)
    }
}

impl LidActuatorPort for MockBin {
    fn set_lid_angle(&mut self, angle_deg: u8) {
        self.lid_writes.push(angle_deg);
    }
}

// ── MockLink: LinkPort ────────────────────────────────────────

#[derive(Debug)]
pub struct MockLink {
    pub connected: bool,
    pub reconnect_ok: bool,
    pub reject_publish: bool,
    pub reconnects: u32,
    pub published: Vec<(String, String)>,
}

#[allow(dead_code)]
impl MockLink {
    pub fn up() -> Self {
        Self {
            connected: true,
            reconnect_ok: true,
            reject_publish: false,
            reconnects: 0,
            published: Vec::new(),
        }
    }

    pub fn down(reconnect_ok: bool) -> Self {
        Self {
            connected: false,
            reconnect_ok,
            ..Self::up()
        }
    }

    pub fn on(&self, topic: &str) -> Vec<&str> {
        self.published
            .iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, p)| p.as_str())
            .collect()
    }

    pub fn topics(&self) -> Vec<&str> {
        self.published.iter().map(|(t, _)| t.as_str()).collect()
    }
}

impl LinkPort for MockLink {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn reconnect(&mut self) -> Result<(), CommsError> {
        self.reconnects += 1;
        if self.reconnect_ok {
            self.connected = true;
            Ok(())
        } else {
            Err(CommsError::BrokerUnreachable)
        }
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError> {
        if self.reject_publish {
            return Err(CommsError::PublishFailed);
        }
        self.published
            .push((topic.to_owned(), String::from_utf8_lossy(payload).into_owned()));
        Ok(())
    }
}

// ── RecordingSink: EventSink ──────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}

// ── embedded-hal doubles ──────────────────────────────────────

/// PIR output level, shared with the test body.
#[derive(Clone, Default)]
pub struct PirLevel(pub Rc<Cell<bool>>);

impl embedded_hal::digital::ErrorType for PirLevel {
    type Error = Infallible;
}

impl embedded_hal::digital::InputPin for PirLevel {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.get())
    }
    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.0.get())
    }
}

/// Range finder fed from a shared queue. Empty queue reads as `NoEcho`.
#[derive(Clone, Default)]
pub struct ScriptedRanger(pub Rc<RefCell<VecDeque<RangeSample>>>);

#[allow(dead_code)]
impl ScriptedRanger {
    pub fn push_mm(&self, mm: u16) {
        self.0.borrow_mut().push_back(RangeSample::Distance { mm });
    }
}

impl RangeFinder for ScriptedRanger {
    fn measure(&mut self) -> RangeSample {
        self.0.borrow_mut().pop_front().unwrap_or(RangeSample::NoEcho)
    }
}

/// PWM channel whose duty resolution is 1 µs over the 20 ms servo frame,
/// so each recorded duty is the pulse width.
#[derive(Clone, Default)]
pub struct PwmProbe(pub Rc<RefCell<Vec<u16>>>);

#[allow(dead_code)]
impl PwmProbe {
    pub fn duties(&self) -> Vec<u16> {
        self.0.borrow().clone()
    }
}

impl embedded_hal::pwm::ErrorType for PwmProbe {
    type Error = Infallible;
}

impl embedded_hal::pwm::SetDutyCycle for PwmProbe {
    fn max_duty_cycle(&self) -> u16 {
        20_000
    }
    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Infallible> {
        self.0.borrow_mut().push(duty);
        Ok(())
    }
}
