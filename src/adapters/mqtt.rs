//! MQTT broker link.
//!
//! Implements [`LinkPort`] on top of a [`ConnectivityPort`]. Inbound
//! messages on the control topic are posted into the [`CommandInbox`] the
//! adapter was built with; everything else is ignored.
//!
//! ```text
//!  broker ──▶ MQTT task callback ──route_inbound()──▶ CommandInbox
//!  control loop ──publish()──▶ EspMqttClient ──▶ broker
//! ```
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `EspMqttClient` with an event callback.
//!   Session flags are atomics shared with the callback, which runs on the
//!   client's own task.
//! - **all other targets**: an in-memory broker that records publishes and
//!   lets tests inject inbound messages or take the broker away.
//!
//! Publishing is QoS 0, no retain. The control topic is (re)subscribed after
//! every new session.

use log::{debug, info, warn};

use crate::app::commands::CommandInbox;
use crate::app::ports::LinkPort;
use crate::app::telemetry::Topics;
#[cfg(not(target_os = "espidf"))]
use crate::app::telemetry::Topic;
use crate::error::CommsError;

use super::wifi::ConnectivityPort;

#[cfg(target_os = "espidf")]
use std::sync::Arc;
#[cfg(target_os = "espidf")]
use core::sync::atomic::{AtomicBool, Ordering};

#[cfg(target_os = "espidf")]
use esp_idf_svc::mqtt::client::{
    Details, EspMqttClient, EventPayload, MqttClientConfiguration, QoS,
};

/// Broker endpoint and session parameters.
#[derive(Debug, Clone)]
pub struct BrokerSettings {
    pub host: heapless::String<64>,
    pub port: u16,
    pub client_id: heapless::String<32>,
    pub connect_timeout_ms: u32,
}

/// Post `payload` into `inbox` if it arrived on the control topic.
/// Returns whether it was accepted.
pub fn route_inbound(
    control_topic: &str,
    topic: Option<&str>,
    payload: &[u8],
    inbox: &CommandInbox,
) -> bool {
    match topic {
        Some(t) if t == control_topic => {
            debug!("MQTT: control message, {} bytes", payload.len());
            inbox.post(payload);
            true
        }
        other => {
            debug!("MQTT: ignoring message on {:?}", other);
            false
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Session state
// ───────────────────────────────────────────────────────────────

/// Flags written by the client callback and read by the control loop.
#[cfg(target_os = "espidf")]
#[derive(Debug, Default)]
struct SessionFlags {
    connected: AtomicBool,
    subscribed: AtomicBool,
}

/// In-memory broker for host runs.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug)]
pub struct SimBroker {
    reachable: bool,
    session_up: bool,
    reject_publish: bool,
    sessions: u32,
    subscriptions: Vec<Topic>,
    published: Vec<(Topic, Vec<u8>)>,
}

// ───────────────────────────────────────────────────────────────
// MQTT adapter
// ───────────────────────────────────────────────────────────────

pub struct MqttAdapter<W> {
    net: W,
    settings: BrokerSettings,
    topics: Topics,
    inbox: &'static CommandInbox,
    #[cfg(target_os = "espidf")]
    client: Option<EspMqttClient<'static>>,
    #[cfg(target_os = "espidf")]
    flags: Arc<SessionFlags>,
    #[cfg(not(target_os = "espidf"))]
    sim: SimBroker,
}

impl<W: ConnectivityPort> MqttAdapter<W> {
    pub fn new(
        net: W,
        settings: BrokerSettings,
        topics: Topics,
        inbox: &'static CommandInbox,
    ) -> Self {
        Self {
            net,
            settings,
            topics,
            inbox,
            #[cfg(target_os = "espidf")]
            client: None,
            #[cfg(target_os = "espidf")]
            flags: Arc::new(SessionFlags::default()),
            #[cfg(not(target_os = "espidf"))]
            sim: SimBroker {
                reachable: true,
                session_up: false,
                reject_publish: false,
                sessions: 0,
                subscriptions: Vec::new(),
                published: Vec::new(),
            },
        }
    }

    pub fn network(&self) -> &W {
        &self.net
    }

    pub fn network_mut(&mut self) -> &mut W {
        &mut self.net
    }

    fn ensure_network(&mut self) -> Result<(), CommsError> {
        self.net.connect().map_err(|e| {
            warn!("MQTT: network unavailable: {}", e);
            CommsError::WifiConnectFailed
        })
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_session_up(&self) -> bool {
        self.flags.connected.load(Ordering::Acquire) && self.flags.subscribed.load(Ordering::Acquire)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_session_up(&self) -> bool {
        self.sim.session_up
    }

    /// The network went away under the session. The ESP-IDF client
    /// notices on its own and reports `Disconnected`.
    #[cfg(target_os = "espidf")]
    fn platform_session_lost(&mut self) {}

    #[cfg(not(target_os = "espidf"))]
    fn platform_session_lost(&mut self) {
        self.sim.session_up = false;
    }

    #[cfg(target_os = "espidf")]
    fn platform_open_session(&mut self) -> Result<(), CommsError> {
        use core::fmt::Write;

        if self.client.is_none() {
            let mut url = heapless::String::<96>::new();
            write!(url, "mqtt://{}:{}", self.settings.host, self.settings.port)
                .map_err(|_| CommsError::BrokerUnreachable)?;
            let conf = MqttClientConfiguration {
                client_id: Some(self.settings.client_id.as_str()),
                ..Default::default()
            };

            let flags = Arc::clone(&self.flags);
            let control = self.topics.control.clone();
            let inbox = self.inbox;
            let client = EspMqttClient::new_cb(url.as_str(), &conf, move |event| {
                match event.payload() {
                    EventPayload::Connected(_) => {
                        flags.subscribed.store(false, Ordering::Release);
                        flags.connected.store(true, Ordering::Release);
                    }
                    EventPayload::Disconnected => {
                        flags.connected.store(false, Ordering::Release);
                        flags.subscribed.store(false, Ordering::Release);
                    }
                    EventPayload::Received {
                        topic,
                        data,
                        details,
                        ..
                    } => {
                        if matches!(details, Details::Complete) {
                            route_inbound(control.as_str(), topic, data, inbox);
                        } else {
                            debug!("MQTT: dropping fragmented message");
                        }
                    }
                    _ => {}
                }
            })
            .map_err(|e| {
                warn!("MQTT: client init failed: {}", e);
                CommsError::BrokerUnreachable
            })?;
            self.client = Some(client);
            info!("MQTT: client started for {}", url);
        }

        let deadline = std::time::Instant::now()
            + std::time::Duration::from_millis(u64::from(self.settings.connect_timeout_ms));
        while !self.flags.connected.load(Ordering::Acquire) {
            if std::time::Instant::now() >= deadline {
                return Err(CommsError::BrokerUnreachable);
            }
            std::thread::sleep(std::time::Duration::from_millis(50));
        }

        if !self.flags.subscribed.load(Ordering::Acquire) {
            let client = self.client.as_mut().ok_or(CommsError::BrokerUnreachable)?;
            client
                .subscribe(self.topics.control.as_str(), QoS::AtMostOnce)
                .map_err(|e| {
                    warn!("MQTT: subscribe failed: {}", e);
                    CommsError::SubscribeFailed
                })?;
            self.flags.subscribed.store(true, Ordering::Release);
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_open_session(&mut self) -> Result<(), CommsError> {
        if !self.sim.reachable {
            return Err(CommsError::BrokerUnreachable);
        }
        if !self.sim.session_up {
            self.sim.sessions += 1;
            self.sim.subscriptions.push(self.topics.control.clone());
            self.sim.session_up = true;
        }
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError> {
        let client = self.client.as_mut().ok_or(CommsError::PublishFailed)?;
        client
            .publish(topic, QoS::AtMostOnce, false, payload)
            .map(|_| ())
            .map_err(|e| {
                debug!("MQTT: publish error: {}", e);
                CommsError::PublishFailed
            })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError> {
        if !self.sim.session_up || self.sim.reject_publish {
            return Err(CommsError::PublishFailed);
        }
        let topic = heapless::String::try_from(topic).map_err(|_| CommsError::PublishFailed)?;
        self.sim.published.push((topic, payload.to_vec()));
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Simulation controls
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
impl<W: ConnectivityPort> MqttAdapter<W> {
    /// Deliver a message as the broker would.
    pub fn sim_inbound(&self, topic: &str, payload: &[u8]) -> bool {
        route_inbound(self.topics.control.as_str(), Some(topic), payload, self.inbox)
    }

    /// Make the broker refuse (`false`) or accept new sessions. Refusing
    /// also ends the current session.
    pub fn sim_set_reachable(&mut self, reachable: bool) {
        self.sim.reachable = reachable;
        if !reachable {
            self.sim.session_up = false;
        }
    }

    /// Make the client reject publishes while keeping the session.
    pub fn sim_reject_publish(&mut self, reject: bool) {
        self.sim.reject_publish = reject;
    }

    pub fn sim_published(&self) -> &[(Topic, Vec<u8>)] {
        &self.sim.published
    }

    pub fn sim_subscriptions(&self) -> &[Topic] {
        &self.sim.subscriptions
    }

    /// Sessions opened so far.
    pub fn sim_sessions(&self) -> u32 {
        self.sim.sessions
    }
}

// ───────────────────────────────────────────────────────────────
// LinkPort
// ───────────────────────────────────────────────────────────────

impl<W: ConnectivityPort> LinkPort for MqttAdapter<W> {
    fn is_connected(&self) -> bool {
        self.net.is_connected() && self.platform_session_up()
    }

    fn reconnect(&mut self) -> Result<(), CommsError> {
        if !self.net.is_connected() {
            self.platform_session_lost();
        }
        self.ensure_network()?;
        self.platform_open_session()?;
        info!(
            "MQTT: session up on {}:{}, subscribed to {}",
            self.settings.host, self.settings.port, self.topics.control
        );
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError> {
        self.platform_publish(topic, payload)
    }
}
