//! deskctl MQTT - Control and status channel transport.
//!
//! This crate owns the broker connection: it subscribes to the control
//! topic on every (re)connect, forwards incoming payloads to the agent and
//! publishes rendered status reports on the status topic.

pub mod error;
pub mod events;
pub mod settings;
pub mod transport;

pub use error::{MqttError, MqttResult};
pub use events::{TransportEvent, classify, is_control_topic};
pub use settings::{DEFAULT_KEEP_ALIVE, MqttSettings};
pub use transport::{MqttTransport, RECONNECT_DELAY};
