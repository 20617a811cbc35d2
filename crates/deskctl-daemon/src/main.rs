//! deskctl Daemon - MQTT media control agent.
//!
//! Listens for JSON commands on the control topic, applies them to the ALSA
//! mixer or the X keyboard and publishes the resulting mixer state on the
//! status topic.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod agent;
mod config;
mod signals;

use agent::Agent;
use config::{Config, LogFormat};
use deskctl_core::Dispatcher;
use deskctl_devices::{AlsaMixer, XdoKeyboard};
use deskctl_mqtt::MqttTransport;

/// Crates whose log level follows the configuration.
const LOG_TARGETS: &[&str] = &["deskctl_daemon", "deskctl_core", "deskctl_devices", "deskctl_mqtt"];

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let (config, config_path) = config::load_config()?;

    init_logging(&config)?;
    info!(version = env!("CARGO_PKG_VERSION"), "Starting deskctl daemon");
    info!(path = ?config_path, "Configuration loaded");

    // Probe devices
    let mixer = AlsaMixer::new(config.audio.card.clone(), config.audio.control.clone());
    mixer.probe().context("Mixer is not usable")?;
    let keyboard = XdoKeyboard::new(config.input.clone());
    keyboard.probe().context("Keyboard injection is not usable")?;
    info!(control = %config.audio.control, "Devices ready");

    let dispatcher =
        Arc::new(Dispatcher::new(Box::new(mixer), Box::new(keyboard), config.control.volume_step));

    // Connect to the broker
    let settings = config.mqtt_settings();
    let (transport, events) =
        MqttTransport::spawn(&settings).context("Failed to start MQTT transport")?;

    let shutdown_rx = signals::setup_signal_handlers()?;

    info!(
        control_topic = %settings.control_topic,
        status_topic = %settings.status_topic,
        volume_step = dispatcher.volume_step(),
        status_interval = ?config.status_update_delay(),
        "Daemon running. Press Ctrl+C to exit."
    );

    Agent::new(dispatcher, transport.status_sender(), config.status_update_delay())
        .run(events, shutdown_rx)
        .await;

    // Cleanup
    info!("Shutting down...");
    transport.shutdown().await;

    info!("deskctl daemon stopped");
    Ok(())
}

/// `RUST_LOG` wins; otherwise the configured level applies to the deskctl crates.
fn init_logging(config: &Config) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let level = config.daemon.effective_log_level();
            let mut filter = EnvFilter::new("warn");
            for target in LOG_TARGETS {
                filter = filter.add_directive(
                    format!("{target}={level}")
                        .parse()
                        .with_context(|| format!("Invalid log level: {level:?}"))?,
                );
            }
            filter
        }
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match config.daemon.log_format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
    Ok(())
}
