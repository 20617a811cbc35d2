//! Mixer snapshots, status reports and the agent connection state.

use std::fmt;
use std::time::SystemTime;

use serde::Serialize;

/// Upper bound of the volume percentage.
pub const MAX_VOLUME: u8 = 100;

/// Connection state of the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgentState {
    /// Not attached to the broker, commands are not processed
    #[default]
    Disconnected,
    /// Subscribed to the control channel
    Connected,
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connected => write!(f, "Connected"),
        }
    }
}

/// Volume and mute as read from the mixer at one point in time.
///
/// Only built through [`StateSnapshot::new`] or the dispatcher, so the volume
/// is always within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StateSnapshot {
    /// Volume percentage (0 - 100)
    pub volume: u8,
    /// Mute flag, independent of `volume`
    pub muted: bool,
}

impl StateSnapshot {
    /// Build a snapshot, clamping the volume into `0..=100`.
    #[must_use]
    pub fn new(volume: u8, muted: bool) -> Self {
        Self { volume: volume.min(MAX_VOLUME), muted }
    }

    /// Volume after moving by `delta` percentage points, saturating at both ends.
    #[must_use]
    pub fn stepped_volume(&self, delta: i16) -> u8 {
        let stepped = (i16::from(self.volume) + delta).clamp(0, i16::from(MAX_VOLUME));
        // Within 0..=100 after the clamp
        u8::try_from(stepped).unwrap_or(MAX_VOLUME)
    }
}

/// Status published on the status channel.
///
/// Only `volume` and `muted` are part of the wire document.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatusReport {
    pub volume: u8,
    pub muted: bool,
    #[serde(skip)]
    pub taken_at: SystemTime,
}

impl StatusReport {
    /// Stamp a snapshot with the current time.
    #[must_use]
    pub fn from_snapshot(snapshot: StateSnapshot) -> Self {
        Self { volume: snapshot.volume, muted: snapshot.muted, taken_at: SystemTime::now() }
    }

    /// The mixer state this report describes.
    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot { volume: self.volume, muted: self.muted }
    }
}

impl PartialEq for StatusReport {
    fn eq(&self, other: &Self) -> bool {
        self.snapshot() == other.snapshot()
    }
}

impl Eq for StatusReport {}
