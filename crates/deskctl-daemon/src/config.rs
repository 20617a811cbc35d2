//! Daemon configuration.
//!
//! Settings come from `config.toml` in the user config directory (or the
//! file named by `DESKCTL_CONFIG`), then the `MQTT_*`, `VOLUME_STEP`,
//! `STATUS_UPDATE_DELAY` and `DEBUG` environment variables override them.
//! Variables missing from the process environment are also looked up in a
//! `.env` file next to `config.toml`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use deskctl_core::{DEFAULT_VOLUME_STEP, MAX_VOLUME};
use deskctl_devices::{DEFAULT_CONTROL, KeyBindings};
use deskctl_mqtt::{DEFAULT_KEEP_ALIVE, MqttSettings};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_VAR: &str = "DESKCTL_CONFIG";

/// Daemon configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Daemon settings
    #[serde(default)]
    pub daemon: DaemonConfig,
    /// Broker settings
    #[serde(default)]
    pub mqtt: MqttConfig,
    /// Command handling settings
    #[serde(default)]
    pub control: ControlConfig,
    /// Mixer settings
    #[serde(default)]
    pub audio: AudioConfig,
    /// Keys sent for play/pause and skip
    #[serde(default)]
    pub input: KeyBindings,
}

/// Daemon-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Force debug logging
    #[serde(default)]
    pub debug: bool,
    /// Log output format
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self { log_level: default_log_level(), debug: false, log_format: LogFormat::default() }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

impl DaemonConfig {
    /// Level applied to the deskctl crates when `RUST_LOG` is unset.
    #[must_use]
    pub fn effective_log_level(&self) -> &str {
        if self.debug { "debug" } else { &self.log_level }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Broker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MqttConfig {
    /// Broker address
    #[serde(default)]
    pub broker: String,
    /// Broker port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Broker user
    pub user: Option<String>,
    /// Broker password
    pub password: Option<String>,
    /// MQTT client identifier
    #[serde(default = "default_client_id")]
    pub client_id: String,
    /// Topic commands arrive on
    #[serde(default)]
    pub control_topic: String,
    /// Topic status reports are published on
    #[serde(default)]
    pub status_topic: String,
    /// Keep-alive interval in seconds
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker: String::new(),
            port: default_port(),
            user: None,
            password: None,
            client_id: default_client_id(),
            control_topic: String::new(),
            status_topic: String::new(),
            keep_alive_secs: default_keep_alive_secs(),
        }
    }
}

fn default_port() -> u16 {
    1883
}

fn default_client_id() -> String {
    "deskctl".to_string()
}

fn default_keep_alive_secs() -> u64 {
    DEFAULT_KEEP_ALIVE.as_secs()
}

/// Command handling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Percentage points moved by `volumeCtrl` commands
    #[serde(default = "default_volume_step")]
    pub volume_step: u8,
    /// Seconds between unsolicited status reports; unset or 0 disables them
    pub status_update_delay_secs: Option<u64>,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self { volume_step: default_volume_step(), status_update_delay_secs: None }
    }
}

fn default_volume_step() -> u8 {
    DEFAULT_VOLUME_STEP
}

/// Mixer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// ALSA card (default card if unset)
    pub card: Option<String>,
    /// Simple mixer control
    #[serde(default = "default_mixer_control")]
    pub control: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self { card: None, control: default_mixer_control() }
    }
}

fn default_mixer_control() -> String {
    DEFAULT_CONTROL.to_string()
}

impl Config {
    /// Read a config file, falling back to defaults if it does not exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path:?}"))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {path:?}"))
    }

    /// Override settings from environment variables looked up with `lookup`.
    ///
    /// # Errors
    /// Returns an error if a numeric or boolean variable cannot be parsed.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(broker) = lookup("MQTT_BROKER_ADDR") {
            self.mqtt.broker = broker;
        }
        if let Some(port) = lookup("MQTT_BROKER_PORT") {
            self.mqtt.port = port
                .trim()
                .parse()
                .with_context(|| format!("MQTT_BROKER_PORT is not a valid port: {port:?}"))?;
        }
        if let Some(user) = lookup("MQTT_BROKER_USER") {
            self.mqtt.user = Some(user);
        }
        if let Some(password) = lookup("MQTT_BROKER_PWD") {
            self.mqtt.password = Some(password);
        }
        if let Some(topic) = lookup("MQTT_CONTROL_TOPIC") {
            self.mqtt.control_topic = topic;
        }
        if let Some(topic) = lookup("MQTT_STATUS_TOPIC") {
            self.mqtt.status_topic = topic;
        }
        if let Some(step) = lookup("VOLUME_STEP") {
            self.control.volume_step = step.trim().parse().with_context(|| {
                format!("VOLUME_STEP must be an integer between 1 and 100: {step:?}")
            })?;
        }
        if let Some(delay) = lookup("STATUS_UPDATE_DELAY") {
            let secs = delay.trim().parse().with_context(|| {
                format!("STATUS_UPDATE_DELAY must be a non-negative integer: {delay:?}")
            })?;
            self.control.status_update_delay_secs = Some(secs);
        }
        if let Some(debug) = lookup("DEBUG") {
            self.daemon.debug = parse_flag(&debug)
                .with_context(|| format!("DEBUG must be a boolean: {debug:?}"))?;
        }
        Ok(())
    }

    /// Check the settings the daemon cannot start without.
    ///
    /// # Errors
    /// Returns an error describing the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        if self.mqtt.broker.trim().is_empty() {
            bail!("MQTT broker address must be set (mqtt.broker or MQTT_BROKER_ADDR)");
        }
        if self.mqtt.control_topic.trim().is_empty() {
            bail!("Control topic must be set (mqtt.control_topic or MQTT_CONTROL_TOPIC)");
        }
        if self.mqtt.status_topic.trim().is_empty() {
            bail!("Status topic must be set (mqtt.status_topic or MQTT_STATUS_TOPIC)");
        }
        if !(1..=MAX_VOLUME).contains(&self.control.volume_step) {
            bail!(
                "Volume step must be between 1 and 100, extremes included (got {})",
                self.control.volume_step
            );
        }
        self.mqtt_settings().validate().context("Invalid MQTT settings")?;
        Ok(())
    }

    /// Interval of unsolicited status reports, `None` when disabled.
    #[must_use]
    pub fn status_update_delay(&self) -> Option<Duration> {
        self.control.status_update_delay_secs.filter(|secs| *secs > 0).map(Duration::from_secs)
    }

    /// Transport settings. Credentials are used only when both user and
    /// password are set.
    #[must_use]
    pub fn mqtt_settings(&self) -> MqttSettings {
        let credentials = match (&self.mqtt.user, &self.mqtt.password) {
            (Some(user), Some(password)) if !user.is_empty() && !password.is_empty() => {
                Some((user.clone(), password.clone()))
            }
            _ => None,
        };
        MqttSettings {
            host: self.mqtt.broker.clone(),
            port: self.mqtt.port,
            client_id: self.mqtt.client_id.clone(),
            credentials,
            control_topic: self.mqtt.control_topic.clone(),
            status_topic: self.mqtt.status_topic.clone(),
            keep_alive: Duration::from_secs(self.mqtt.keep_alive_secs),
        }
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("unrecognized flag value {other:?}"),
    }
}

/// Load configuration from file, environment and defaults, then validate it.
///
/// Returns the configuration and the file path that was consulted.
pub fn load_config() -> Result<(Config, PathBuf)> {
    let path = config_path()?;
    let mut config = Config::load_from(&path)?;
    let dotenv = read_dotenv(&path.with_file_name(".env"))?;
    config.apply_env(|key| std::env::var(key).ok().or_else(|| dotenv.get(key).cloned()))?;
    config.validate()?;
    Ok((config, path))
}

/// Read `KEY=value` pairs from a dotenv file. A missing file yields none.
fn read_dotenv(path: &Path) -> Result<HashMap<String, String>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    dotenvy::from_path_iter(path)
        .with_context(|| format!("Failed to read env file: {path:?}"))?
        .map(|item| item.with_context(|| format!("Failed to parse env file: {path:?}")))
        .collect()
}

/// Get the configuration file path.
fn config_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_VAR) {
        return Ok(PathBuf::from(path));
    }
    let dirs = ProjectDirs::from("com", "deskctl", "deskctl")
        .context("Could not determine config directory")?;
    Ok(dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    fn minimal() -> Config {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                ("MQTT_BROKER_ADDR", "broker.local"),
                ("MQTT_BROKER_PORT", "1883"),
                ("MQTT_CONTROL_TOPIC", "desk/control"),
                ("MQTT_STATUS_TOPIC", "desk/status"),
            ]))
            .unwrap();
        config
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.control.volume_step, 10);
        assert_eq!(config.status_update_delay(), None);
        assert_eq!(config.mqtt.port, 1883);
        assert_eq!(config.audio.control, "Master");
        assert_eq!(config.daemon.effective_log_level(), "info");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert!(config.mqtt.broker.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[daemon]
log_level = "warn"

[mqtt]
broker = "10.0.0.2"
port = 8883
user = "desk"
password = "secret"
control_topic = "living/desk/control"
status_topic = "living/desk/status"

[control]
volume_step = 5
status_update_delay_secs = 30

[input]
play_pause = "XF86AudioPlay"
"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        config.validate().unwrap();

        assert_eq!(config.daemon.effective_log_level(), "warn");
        assert_eq!(config.control.volume_step, 5);
        assert_eq!(config.status_update_delay(), Some(Duration::from_secs(30)));
        assert_eq!(config.input.play_pause, "XF86AudioPlay");
        assert_eq!(config.input.skip_forward, "Right");

        let settings = config.mqtt_settings();
        assert_eq!(settings.host, "10.0.0.2");
        assert_eq!(settings.port, 8883);
        assert_eq!(settings.credentials, Some(("desk".to_string(), "secret".to_string())));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[control]\nvolume_step = \"loud\"\n").unwrap();
        assert!(Config::load_from(file.path()).is_err());
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = minimal();
        config
            .apply_env(env(&[
                ("VOLUME_STEP", "25"),
                ("STATUS_UPDATE_DELAY", "15"),
                ("DEBUG", "true"),
            ]))
            .unwrap();

        config.validate().unwrap();
        assert_eq!(config.control.volume_step, 25);
        assert_eq!(config.status_update_delay(), Some(Duration::from_secs(15)));
        assert_eq!(config.daemon.effective_log_level(), "debug");
    }

    #[test]
    fn test_zero_delay_disables_periodic_reports() {
        let mut config = minimal();
        config.apply_env(env(&[("STATUS_UPDATE_DELAY", "0")])).unwrap();
        assert_eq!(config.status_update_delay(), None);
    }

    #[test]
    fn test_negative_delay_is_rejected() {
        let mut config = minimal();
        assert!(config.apply_env(env(&[("STATUS_UPDATE_DELAY", "-5")])).is_err());
    }

    #[test]
    fn test_bad_port_is_rejected() {
        let mut config = Config::default();
        assert!(config.apply_env(env(&[("MQTT_BROKER_PORT", "mqtt")])).is_err());
        assert!(config.apply_env(env(&[("MQTT_BROKER_PORT", "70000")])).is_err());
    }

    #[test]
    fn test_volume_step_range() {
        for step in ["0", "101"] {
            let mut config = minimal();
            config.apply_env(env(&[("VOLUME_STEP", step)])).unwrap();
            assert!(config.validate().is_err(), "step {step} should be rejected");
        }
        for step in ["1", "100"] {
            let mut config = minimal();
            config.apply_env(env(&[("VOLUME_STEP", step)])).unwrap();
            assert!(config.validate().is_ok(), "step {step} should be accepted");
        }
    }

    #[test]
    fn test_required_settings() {
        assert!(Config::default().validate().is_err());
        assert!(minimal().validate().is_ok());

        let mut config = minimal();
        config.mqtt.status_topic = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_credentials_need_user_and_password() {
        let mut config = minimal();
        config.apply_env(env(&[("MQTT_BROKER_USER", "desk")])).unwrap();
        assert_eq!(config.mqtt_settings().credentials, None);

        config.apply_env(env(&[("MQTT_BROKER_PWD", "secret")])).unwrap();
        assert_eq!(
            config.mqtt_settings().credentials,
            Some(("desk".to_string(), "secret".to_string()))
        );
    }

    #[test]
    fn test_status_topic_under_control_filter_is_rejected() {
        let mut config = minimal();
        config.apply_env(env(&[("MQTT_CONTROL_TOPIC", "desk/#")])).unwrap();
        assert!(config.validate().is_err());

        let mut config = minimal();
        config.apply_env(env(&[("MQTT_CONTROL_TOPIC", "desk/status")])).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dotenv_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(
            &path,
            "# broker\nMQTT_BROKER_ADDR=10.0.0.9\nMQTT_CONTROL_TOPIC=\"desk/control\"\n",
        )
        .unwrap();

        let values = read_dotenv(&path).unwrap();
        assert_eq!(values.get("MQTT_BROKER_ADDR").map(String::as_str), Some("10.0.0.9"));
        assert_eq!(values.get("MQTT_CONTROL_TOPIC").map(String::as_str), Some("desk/control"));
        assert!(read_dotenv(&dir.path().join("missing.env")).unwrap().is_empty());
    }

    #[test]
    fn test_json_log_format() {
        let config: Config = toml::from_str("[daemon]\nlog_format = \"json\"\n").unwrap();
        assert_eq!(config.daemon.log_format, LogFormat::Json);
        assert_eq!(Config::default().daemon.log_format, LogFormat::Text);
    }

    #[test]
    fn test_debug_flag_parsing() {
        assert!(parse_flag("1").unwrap());
        assert!(parse_flag("True").unwrap());
        assert!(!parse_flag("off").unwrap());
        assert!(!parse_flag("").unwrap());
        assert!(parse_flag("maybe").is_err());
    }
}
