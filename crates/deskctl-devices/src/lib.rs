//! deskctl Devices - Host audio and keyboard drivers.
//!
//! Implementations of the core capability traits for a Linux desktop:
//! - [`AlsaMixer`] drives the ALSA mixer through `amixer`
//! - [`XdoKeyboard`] synthesizes key presses through `xdotool`

pub mod alsa;
pub mod keyboard;
mod process;

pub use alsa::{AlsaMixer, DEFAULT_CONTROL};
pub use keyboard::{KeyBindings, XdoKeyboard};
