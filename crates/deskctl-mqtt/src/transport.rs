//! MQTT transport implementation.

use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, Outgoing, QoS};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use crate::error::{MqttError, MqttResult};
use crate::events::{TransportEvent, classify, is_control_topic};
use crate::settings::MqttSettings;

/// Pause between reconnection attempts.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// How long shutdown waits for the DISCONNECT packet to go out.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Connection to the broker.
///
/// Owns two tasks: the rumqttc event loop, which forwards control-channel
/// traffic as [`TransportEvent`]s, and a publisher that drains status
/// payloads onto the status topic.
pub struct MqttTransport {
    client: AsyncClient,
    status_tx: mpsc::Sender<Vec<u8>>,
    event_task: JoinHandle<()>,
    publish_task: JoinHandle<()>,
}

impl MqttTransport {
    /// Start connecting to the broker.
    ///
    /// Returns the transport handle and the receiver for connection and
    /// message events. Connection failures are retried every
    /// [`RECONNECT_DELAY`] for as long as the receiver is alive.
    ///
    /// # Errors
    /// Returns an error if the settings are invalid.
    pub fn spawn(settings: &MqttSettings) -> MqttResult<(Self, mpsc::Receiver<TransportEvent>)> {
        settings.validate()?;

        let (client, event_loop) = AsyncClient::new(settings.options(), 16);
        let (event_tx, event_rx) = mpsc::channel(64);
        let (status_tx, status_rx) = mpsc::channel(16);

        info!(host = %settings.host, port = settings.port, "Connecting to MQTT broker");

        let event_task = tokio::spawn(run_event_loop(
            event_loop,
            client.clone(),
            settings.control_topic.clone(),
            settings.status_topic.clone(),
            event_tx,
        ));
        let publish_task =
            tokio::spawn(run_publisher(client.clone(), settings.status_topic.clone(), status_rx));

        Ok((Self { client, status_tx, event_task, publish_task }, event_rx))
    }

    /// Sender for rendered status payloads.
    #[must_use]
    pub fn status_sender(&self) -> mpsc::Sender<Vec<u8>> {
        self.status_tx.clone()
    }

    /// Disconnect from the broker and stop both tasks.
    pub async fn shutdown(mut self) {
        if let Err(e) = self.client.disconnect().await {
            warn!(error = %MqttError::from(e), "Failed to request disconnect");
        }

        if timeout(SHUTDOWN_GRACE, &mut self.event_task).await.is_err() {
            debug!("Event loop did not stop in time, aborting");
            self.event_task.abort();
        }
        self.publish_task.abort();
        info!("MQTT transport stopped");
    }
}

async fn run_event_loop(
    mut event_loop: EventLoop,
    client: AsyncClient,
    control_topic: String,
    status_topic: String,
    event_tx: mpsc::Sender<TransportEvent>,
) {
    let mut connected = false;

    loop {
        let event = match event_loop.poll().await {
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                info!("Disconnected from broker");
                break;
            }
            Ok(event) => classify(&event),
            Err(e) => {
                let e = MqttError::from(e);
                warn!(error = %e, "Broker connection failed");

                let lost = connected.then(|| TransportEvent::Disconnected(e.to_string()));
                connected = false;
                if let Some(lost) = lost
                    && event_tx.send(lost).await.is_err()
                {
                    break;
                }

                sleep(RECONNECT_DELAY).await;
                continue;
            }
        };

        let Some(event) = event else {
            continue;
        };

        match &event {
            TransportEvent::Connected => {
                if let Err(e) = client.try_subscribe(control_topic.as_str(), QoS::AtMostOnce) {
                    error!(error = %MqttError::from(e), topic = %control_topic, "Subscribe failed");
                    continue;
                }
                info!(topic = %control_topic, "Connected, subscribed to control topic");
                connected = true;
            }
            TransportEvent::Disconnected(reason) => {
                warn!(reason = %reason, "Broker closed the connection");
                if !connected {
                    continue;
                }
                connected = false;
            }
            TransportEvent::Message { topic, payload } => {
                if !is_control_topic(topic, &control_topic, &status_topic) {
                    debug!(topic = %topic, "Ignoring message outside the control topic");
                    continue;
                }
                debug!(topic = %topic, bytes = payload.len(), "Received message");
            }
        }

        if event_tx.send(event).await.is_err() {
            debug!("Event receiver dropped, stopping event loop");
            break;
        }
    }
}

async fn run_publisher(
    client: AsyncClient,
    status_topic: String,
    mut status_rx: mpsc::Receiver<Vec<u8>>,
) {
    while let Some(payload) = status_rx.recv().await {
        match client.publish(status_topic.as_str(), QoS::AtMostOnce, false, payload).await {
            Ok(()) => debug!(topic = %status_topic, "Status update queued"),
            Err(e) => warn!(error = %MqttError::from(e), "Status update rejected"),
        }
    }
}
