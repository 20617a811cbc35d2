//! Error types for deskctl core.

use thiserror::Error;

/// Failure to decode a control-channel payload into a [`Command`](crate::Command).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The payload is not a JSON document, or it carries more than one command.
    #[error("Malformed payload: {0}")]
    Malformed(String),

    /// The payload is JSON but does not describe a supported command.
    #[error("Unrecognized command: {0}")]
    Unrecognized(String),
}

/// Failure reported by an audio or input driver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    #[error("Device unavailable: {0}")]
    Unavailable(String),
}

/// Failure to apply a command to the host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),
}

impl From<DeviceError> for DispatchError {
    fn from(err: DeviceError) -> Self {
        match err {
            DeviceError::Unavailable(reason) => Self::DeviceUnavailable(reason),
        }
    }
}

/// Result type for driver calls.
pub type DeviceResult<T> = std::result::Result<T, DeviceError>;

/// Result type for dispatcher operations.
pub type DispatchResult<T> = std::result::Result<T, DispatchError>;
