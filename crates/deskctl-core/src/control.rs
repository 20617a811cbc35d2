//! Capability traits over the host's audio mixer and keyboard.
//!
//! The core never talks to a driver directly; the daemon hands boxed
//! implementations of these traits to the [`Dispatcher`](crate::Dispatcher),
//! which keeps them behind a single lock.

use crate::error::DeviceResult;

/// Volume and mute state of the host's audio mixer.
#[cfg_attr(test, mockall::automock)]
pub trait AudioControl: Send {
    /// Current volume as an integer percentage.
    ///
    /// # Errors
    /// Returns an error if the mixer cannot be reached.
    fn volume(&mut self) -> DeviceResult<u8>;

    /// Set the volume to an integer percentage in `0..=100`.
    ///
    /// # Errors
    /// Returns an error if the mixer cannot be reached.
    fn set_volume(&mut self, volume: u8) -> DeviceResult<()>;

    /// Whether the mixer is currently muted.
    ///
    /// # Errors
    /// Returns an error if the mixer cannot be reached.
    fn muted(&mut self) -> DeviceResult<bool>;

    /// Mute or unmute the mixer without touching the volume.
    ///
    /// # Errors
    /// Returns an error if the mixer cannot be reached.
    fn set_muted(&mut self, muted: bool) -> DeviceResult<()>;
}

/// Synthesized media key presses.
///
/// Whether a key press has any effect depends on which window has focus;
/// implementations only report whether the event could be sent.
#[cfg_attr(test, mockall::automock)]
pub trait InputControl: Send {
    /// Send the play/pause key.
    ///
    /// # Errors
    /// Returns an error if the event cannot be synthesized.
    fn play_pause(&mut self) -> DeviceResult<()>;

    /// Send the skip-forward key.
    ///
    /// # Errors
    /// Returns an error if the event cannot be synthesized.
    fn skip_forward(&mut self) -> DeviceResult<()>;

    /// Send the skip-backward key.
    ///
    /// # Errors
    /// Returns an error if the event cannot be synthesized.
    fn skip_backward(&mut self) -> DeviceResult<()>;
}
