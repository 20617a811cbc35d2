//! Broker connection settings.

use std::time::Duration;

use rumqttc::{MqttOptions, matches, valid_filter, valid_topic};

use crate::error::{MqttError, MqttResult};

/// Default keep-alive interval.
pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(60);

/// Smallest keep-alive interval rumqttc accepts.
pub const MIN_KEEP_ALIVE: Duration = Duration::from_secs(5);

/// Everything needed to reach the broker and the two topics.
#[derive(Debug, Clone)]
pub struct MqttSettings {
    /// Broker host name or address
    pub host: String,
    /// Broker port
    pub port: u16,
    /// MQTT client identifier
    pub client_id: String,
    /// User and password, if the broker requires authentication
    pub credentials: Option<(String, String)>,
    /// Topic commands arrive on
    pub control_topic: String,
    /// Topic status reports are published on
    pub status_topic: String,
    /// Keep-alive interval
    pub keep_alive: Duration,
}

impl MqttSettings {
    /// Check the fields a connection cannot work without.
    ///
    /// # Errors
    /// Returns [`MqttError::InvalidSettings`] if the host, the client id or
    /// one of the topics is empty, if a topic is malformed, or if the
    /// control filter would also match the status topic.
    pub fn validate(&self) -> MqttResult<()> {
        for (name, value) in [
            ("host", &self.host),
            ("client_id", &self.client_id),
            ("control_topic", &self.control_topic),
            ("status_topic", &self.status_topic),
        ] {
            if value.trim().is_empty() {
                return Err(MqttError::InvalidSettings(format!("{name} must not be empty")));
            }
        }
        if !valid_filter(&self.control_topic) {
            return Err(MqttError::InvalidSettings(format!(
                "control_topic is not a valid topic filter: {:?}",
                self.control_topic
            )));
        }
        if !valid_topic(&self.status_topic) {
            return Err(MqttError::InvalidSettings(format!(
                "status_topic must be a plain topic without wildcards: {:?}",
                self.status_topic
            )));
        }
        // Status documents carry a `volume` key and would parse as commands.
        if matches(&self.status_topic, &self.control_topic) {
            return Err(MqttError::InvalidSettings(format!(
                "status_topic {:?} is covered by control_topic {:?}",
                self.status_topic, self.control_topic
            )));
        }
        if self.keep_alive < MIN_KEEP_ALIVE {
            return Err(MqttError::InvalidSettings(format!(
                "keep_alive must be at least {} seconds",
                MIN_KEEP_ALIVE.as_secs()
            )));
        }
        Ok(())
    }

    /// Build the rumqttc options for these settings.
    #[must_use]
    pub fn options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(&self.client_id, &self.host, self.port);
        options.set_keep_alive(self.keep_alive);
        if let Some((user, password)) = &self.credentials {
            options.set_credentials(user, password);
        }
        options
    }
}
