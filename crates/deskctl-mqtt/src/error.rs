//! MQTT transport error types.

use thiserror::Error;

/// MQTT transport error type.
#[derive(Debug, Error)]
pub enum MqttError {
    #[error("Client error: {0}")]
    Client(#[from] rumqttc::ClientError),

    #[error("Connection error: {0}")]
    Connection(#[from] rumqttc::ConnectionError),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

/// Result type for MQTT transport operations.
pub type MqttResult<T> = Result<T, MqttError>;
