//! SmartBin Firmware: Main Entry Point
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  HardwareAdapter        MqttAdapter<WifiAdapter>   LogSink   │
//! │  (Sensor + LidActuator) (LinkPort)                 (Events)  │
//! │                                                              │
//! │  ─────────────── Port Trait Boundary ──────────────────      │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │            BinControlLoop (pure logic)                 │  │
//! │  │  Lid FSM · Fill · Emptied · Telemetry                  │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! │                                                              │
//! │  CommandInbox ◀── MQTT task         Watchdog · fixed period  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![deny(unused_must_use)]

use anyhow::{Context, Result};
use log::{debug, error, info};

use esp_idf_hal::delay::Ets;
use esp_idf_hal::gpio::{AnyInputPin, AnyOutputPin, PinDriver};
use esp_idf_hal::ledc::config::TimerConfig;
use esp_idf_hal::ledc::{LedcDriver, LedcTimerDriver, Resolution};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::FromValueType;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

use smartbin::adapters::device_id;
use smartbin::adapters::hardware::HardwareAdapter;
use smartbin::adapters::log_sink::LogEventSink;
use smartbin::adapters::mqtt::{BrokerSettings, MqttAdapter};
use smartbin::adapters::time::Esp32TimeAdapter;
use smartbin::adapters::wifi::{ConnectivityPort, WifiAdapter};
use smartbin::app::commands::CommandInbox;
use smartbin::app::ports::TimePort;
use smartbin::app::service::{remaining_budget, BinControlLoop, CycleOutcome};
use smartbin::config::{BinConfig, Overrides};
use smartbin::drivers::servo::ServoDriver;
use smartbin::drivers::watchdog::Watchdog;
use smartbin::error::Error;
use smartbin::pins;
use smartbin::sensors::presence::PirSensor;
use smartbin::sensors::ultrasonic::Hcsr04;
use smartbin::sensors::SensorHub;

/// Longer than the worst blocking reconnect (WiFi association plus the
/// broker connect timeout).
const WATCHDOG_TIMEOUT_MS: u32 = 30_000;

static INBOX: CommandInbox = CommandInbox::new();

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  SmartBin v{}                     ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let overrides = Overrides::from_build_env();
    let mut config = BinConfig::default().with_overrides(&overrides)?;
    if overrides.device_id.is_none() {
        config.device_id = device_id::device_id(&device_id::read_mac());
    }
    if let Err(e) = config.validate().map_err(Error::from) {
        error!("Invalid configuration: {}", e);
        return Err(e.into());
    }
    info!(
        "Node '{}', broker {}:{}, period {} ms",
        config.device_id, config.broker_host, config.broker_port, config.cycle_period_ms
    );

    let mut control = BinControlLoop::new(&config)?;

    // ── 3. Peripherals ────────────────────────────────────────
    let peripherals = Peripherals::take().context("peripherals already taken")?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // SAFETY: each GPIO number in `pins` is claimed exactly once, here, and
    // none of them is used by another driver.
    let (trig, echo, pir, servo_pin) = unsafe {
        (
            AnyOutputPin::new(pins::ULTRASONIC_TRIG_GPIO),
            AnyInputPin::new(pins::ULTRASONIC_ECHO_GPIO),
            AnyInputPin::new(pins::PIR_GPIO),
            AnyOutputPin::new(pins::SERVO_PWM_GPIO),
        )
    };

    let clock = Esp32TimeAdapter::new();
    let ranger = Hcsr04::new(
        PinDriver::output(trig)?,
        PinDriver::input(echo)?,
        Ets,
        clock,
        config.echo_timeout_us,
    );
    info!("HC-SR04: echo timeout {} us", ranger.timeout_us());
    let presence = PirSensor::new(PinDriver::input(pir)?);

    let servo_timer = LedcTimerDriver::new(
        peripherals.ledc.timer0,
        &TimerConfig::new()
            .frequency(pins::SERVO_PWM_FREQ_HZ.Hz().into())
            .resolution(Resolution::Bits14),
    )?;
    let servo = ServoDriver::new(LedcDriver::new(
        peripherals.ledc.channel0,
        servo_timer,
        servo_pin,
    )?);

    let mut hw = HardwareAdapter::new(SensorHub::new(presence, ranger), servo);

    // ── 4. Connectivity ───────────────────────────────────────
    let mut wifi = WifiAdapter::new(BlockingWifi::wrap(
        EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs))?,
        sysloop,
    )?);
    wifi.set_credentials(config.wifi_ssid.as_str(), config.wifi_password.as_str())?;

    let settings = BrokerSettings {
        host: config.broker_host.clone(),
        port: config.broker_port,
        client_id: config.device_id.clone(),
        connect_timeout_ms: config.broker_connect_timeout_ms,
    };
    let mut link = MqttAdapter::new(wifi, settings, control.topics().clone(), &INBOX);

    // ── 5. Run ────────────────────────────────────────────────
    let mut sink = LogEventSink::new();
    let watchdog = Watchdog::arm(WATCHDOG_TIMEOUT_MS);
    control.start(&mut hw, &mut sink);

    loop {
        let started = clock.uptime_us();
        match control.run_cycle(&mut hw, &mut link, &INBOX, &mut sink) {
            CycleOutcome::Completed(report) => debug!("Cycle {}: {:?}", control.cycle_count(), report),
            CycleOutcome::Skipped(_) => {}
        }
        watchdog.feed();
        std::thread::sleep(remaining_budget(control.period(), clock.elapsed_since(started)));
    }
}
