//! Command dispatch against the host mixer and keyboard.
//!
//! The dispatcher owns both capability handles behind one lock. Every call
//! holds the lock for the whole read, mutate and read-back sequence, so a
//! periodic snapshot can never observe a half-applied command.

use parking_lot::Mutex;
use tracing::debug;

use crate::command::{Command, SkipDirection, ToggleTarget, VolumeDirection};
use crate::control::{AudioControl, InputControl};
use crate::error::{DeviceResult, DispatchResult};
use crate::state::{MAX_VOLUME, StateSnapshot, StatusReport};

/// Default amount, in percentage points, for relative volume commands.
pub const DEFAULT_VOLUME_STEP: u8 = 10;

struct Devices {
    audio: Box<dyn AudioControl>,
    input: Box<dyn InputControl>,
}

/// Applies commands and produces status reports.
pub struct Dispatcher {
    devices: Mutex<Devices>,
    volume_step: u8,
}

impl Dispatcher {
    /// Create a dispatcher over the given drivers.
    ///
    /// `volume_step` is clamped into `1..=100`.
    #[must_use]
    pub fn new(
        audio: Box<dyn AudioControl>,
        input: Box<dyn InputControl>,
        volume_step: u8,
    ) -> Self {
        Self {
            devices: Mutex::new(Devices { audio, input }),
            volume_step: volume_step.clamp(1, MAX_VOLUME),
        }
    }

    /// Step used by relative volume commands.
    #[must_use]
    pub fn volume_step(&self) -> u8 {
        self.volume_step
    }

    /// Apply a command and report the resulting mixer state.
    ///
    /// # Errors
    /// Returns [`DispatchError::DeviceUnavailable`](crate::DispatchError) if
    /// the mixer or the keyboard cannot be reached. No report is produced in
    /// that case.
    pub fn dispatch(&self, command: Command) -> DispatchResult<StatusReport> {
        let mut devices = self.devices.lock();
        let Devices { audio, input } = &mut *devices;

        match command {
            Command::SetVolume(level) => audio.set_volume(level.min(MAX_VOLUME))?,
            Command::StepVolume(direction) => {
                let current = read_snapshot(audio.as_mut())?;
                let step = i16::from(self.volume_step);
                let delta = match direction {
                    VolumeDirection::Increase => step,
                    VolumeDirection::Decrease => -step,
                };
                audio.set_volume(current.stepped_volume(delta))?;
            }
            Command::SetMute(muted) => audio.set_muted(muted)?,
            Command::Toggle(ToggleTarget::Mute) => {
                let muted = audio.muted()?;
                audio.set_muted(!muted)?;
            }
            Command::Toggle(ToggleTarget::Pause) => input.play_pause()?,
            Command::Skip(SkipDirection::Forward) => input.skip_forward()?,
            Command::Skip(SkipDirection::Backward) => input.skip_backward()?,
        }

        let snapshot = read_snapshot(audio.as_mut())?;
        debug!(%command, volume = snapshot.volume, muted = snapshot.muted, "Command applied");
        Ok(StatusReport::from_snapshot(snapshot))
    }

    /// Read the current mixer state without changing it.
    ///
    /// # Errors
    /// Returns [`DispatchError::DeviceUnavailable`](crate::DispatchError) if
    /// the mixer cannot be reached.
    pub fn snapshot(&self) -> DispatchResult<StatusReport> {
        let mut devices = self.devices.lock();
        let snapshot = read_snapshot(devices.audio.as_mut())?;
        Ok(StatusReport::from_snapshot(snapshot))
    }
}

fn read_snapshot(audio: &mut dyn AudioControl) -> DeviceResult<StateSnapshot> {
    Ok(StateSnapshot::new(audio.volume()?, audio.muted()?))
}
