//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements        | Connects to                 |
//! |-------------|-------------------|-----------------------------|
//! | `hardware`  | SensorPort        | PIR + HC-SR04 GPIO          |
//! |             | LidActuatorPort   | Servo on LEDC PWM           |
//! | `log_sink`  | EventSink         | Serial log output           |
//! | `mqtt`      | LinkPort          | ESP-IDF MQTT client         |
//! | `time`      | TimePort          | ESP32 high-resolution timer |
//! | `wifi`      | ConnectivityPort  | ESP-IDF WiFi STA            |
//!
//! `device_id` derives the fallback node identity from the factory MAC.

pub mod device_id;
pub mod hardware;
pub mod log_sink;
pub mod mqtt;
pub mod time;
pub mod wifi;
