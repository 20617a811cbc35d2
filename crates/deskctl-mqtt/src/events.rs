//! Events delivered from the transport to the agent.

use bytes::Bytes;
use rumqttc::{ConnectReturnCode, Event, Packet, matches};

/// Something the agent needs to know about the broker connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Connected and subscribed to the control topic
    Connected,
    /// Connection lost; the transport keeps trying to reconnect
    Disconnected(String),
    /// A payload arrived on the control topic
    Message { topic: String, payload: Bytes },
}

/// Map a raw rumqttc event to what the agent cares about.
///
/// Acknowledgements, pings and outgoing packets map to `None`.
#[must_use]
pub fn classify(event: &Event) -> Option<TransportEvent> {
    match event {
        Event::Incoming(Packet::ConnAck(ack)) if ack.code == ConnectReturnCode::Success => {
            Some(TransportEvent::Connected)
        }
        Event::Incoming(Packet::Publish(publish)) => Some(TransportEvent::Message {
            topic: publish.topic.clone(),
            payload: publish.payload.clone(),
        }),
        Event::Incoming(Packet::Disconnect) => {
            Some(TransportEvent::Disconnected("broker sent DISCONNECT".to_string()))
        }
        _ => None,
    }
}

/// Whether a message on `topic` should reach the agent as a command.
///
/// Only topics under the control filter qualify, and never the status topic
/// itself, since status documents would parse as volume commands.
#[must_use]
pub fn is_control_topic(topic: &str, control_filter: &str, status_topic: &str) -> bool {
    topic != status_topic && matches(topic, control_filter)
}
