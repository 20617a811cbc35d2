//! Keyboard event synthesis via `xdotool`.
//!
//! Key presses go to whichever window has focus. The defaults target
//! streaming players in a browser: space toggles playback, the arrow keys
//! seek.

use deskctl_core::{DeviceResult, InputControl};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::process::run;

/// X keysyms sent for each media action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    /// Key for play/pause
    #[serde(default = "default_play_pause")]
    pub play_pause: String,
    /// Key for skip forward
    #[serde(default = "default_skip_forward")]
    pub skip_forward: String,
    /// Key for skip backward
    #[serde(default = "default_skip_backward")]
    pub skip_backward: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            play_pause: default_play_pause(),
            skip_forward: default_skip_forward(),
            skip_backward: default_skip_backward(),
        }
    }
}

fn default_play_pause() -> String {
    "space".to_string()
}

fn default_skip_forward() -> String {
    "Right".to_string()
}

fn default_skip_backward() -> String {
    "Left".to_string()
}

/// `xdotool`-backed [`InputControl`].
#[derive(Debug, Clone)]
pub struct XdoKeyboard {
    keys: KeyBindings,
}

impl XdoKeyboard {
    /// Create a keyboard that sends the given keysyms.
    #[must_use]
    pub fn new(keys: KeyBindings) -> Self {
        Self { keys }
    }

    /// Check that `xdotool` is installed and runnable.
    ///
    /// # Errors
    /// Returns an error if `xdotool` cannot be executed.
    pub fn probe(&self) -> DeviceResult<()> {
        let version = run("xdotool", &["version"])?;
        debug!(version = %version.trim(), "xdotool found");
        Ok(())
    }

    fn press(key: &str) -> DeviceResult<()> {
        run("xdotool", &["key", "--clearmodifiers", key])?;
        debug!(key, "Key sent");
        Ok(())
    }
}

impl InputControl for XdoKeyboard {
    fn play_pause(&mut self) -> DeviceResult<()> {
        Self::press(&self.keys.play_pause)
    }

    fn skip_forward(&mut self) -> DeviceResult<()> {
        Self::press(&self.keys.skip_forward)
    }

    fn skip_backward(&mut self) -> DeviceResult<()> {
        Self::press(&self.keys.skip_backward)
    }
}
