//! ALSA mixer control.
//!
//! Volume and mute are read and written through `amixer`, one call per
//! operation. Only the first channel reported by `sget` is considered.

use deskctl_core::{AudioControl, DeviceError, DeviceResult, MAX_VOLUME};
use tracing::debug;

use crate::process::run;

/// Default simple mixer control.
pub const DEFAULT_CONTROL: &str = "Master";

/// `amixer`-backed [`AudioControl`].
#[derive(Debug, Clone)]
pub struct AlsaMixer {
    card: Option<String>,
    control: String,
}

impl AlsaMixer {
    /// Create a mixer for `control` on `card` (the default card if `None`).
    #[must_use]
    pub fn new(card: Option<String>, control: String) -> Self {
        Self { card, control }
    }

    /// Check that the mixer control reports both a volume and a playback switch.
    ///
    /// # Errors
    /// Returns an error if `amixer` is missing, the control does not exist or
    /// it lacks a volume or a mute switch.
    pub fn probe(&self) -> DeviceResult<()> {
        check_control(&self.state()?)?;
        debug!(card = ?self.card, control = %self.control, "ALSA mixer control found");
        Ok(())
    }

    fn amixer(&self, args: &[&str]) -> DeviceResult<String> {
        let mut full_args = Vec::with_capacity(args.len() + 2);
        if let Some(card) = &self.card {
            full_args.extend(["-c", card.as_str()]);
        }
        full_args.extend_from_slice(args);
        run("amixer", &full_args)
    }

    fn state(&self) -> DeviceResult<String> {
        self.amixer(&["sget", self.control.as_str()])
    }
}

impl AudioControl for AlsaMixer {
    fn volume(&mut self) -> DeviceResult<u8> {
        parse_volume(&self.state()?)
    }

    fn set_volume(&mut self, volume: u8) -> DeviceResult<()> {
        let volume = volume.min(MAX_VOLUME);
        self.amixer(&["sset", self.control.as_str(), format!("{volume}%").as_str()])?;
        debug!(volume, "Volume set via ALSA");
        Ok(())
    }

    fn muted(&mut self) -> DeviceResult<bool> {
        parse_muted(&self.state()?)
    }

    fn set_muted(&mut self, muted: bool) -> DeviceResult<()> {
        let state = if muted { "mute" } else { "unmute" };
        self.amixer(&["sset", self.control.as_str(), state])?;
        debug!(muted, "Mute set via ALSA");
        Ok(())
    }
}

/// Both values every snapshot needs must be present.
fn check_control(stdout: &str) -> DeviceResult<()> {
    parse_volume(stdout)?;
    parse_muted(stdout)?;
    Ok(())
}

/// Extract the first `[NN%]` token from `amixer sget` output.
fn parse_volume(stdout: &str) -> DeviceResult<u8> {
    stdout
        .split_whitespace()
        .filter(|part| part.starts_with('[') && part.ends_with("%]"))
        .find_map(|part| part.trim_start_matches('[').trim_end_matches("%]").parse::<u8>().ok())
        .map(|percent| percent.min(MAX_VOLUME))
        .ok_or_else(|| DeviceError::Unavailable("no volume in amixer output".into()))
}

/// Extract the first `[on]`/`[off]` switch from `amixer sget` output.
fn parse_muted(stdout: &str) -> DeviceResult<bool> {
    stdout
        .split_whitespace()
        .find_map(|part| match part {
            "[off]" => Some(true),
            "[on]" => Some(false),
            _ => None,
        })
        .ok_or_else(|| DeviceError::Unavailable("no playback switch in amixer output".into()))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const STEREO: &str = "Simple mixer control 'Master',0
  Capabilities: pvolume pswitch pswitch-joined
  Playback channels: Front Left - Front Right
  Limits: Playback 0 - 65536
  Mono:
  Front Left: Playback 45875 [70%] [on]
  Front Right: Playback 39321 [60%] [off]
";

    const MONO_MUTED: &str = "Simple mixer control 'Master',0
  Capabilities: pvolume pvolume-joined pswitch pswitch-joined
  Playback channels: Mono
  Limits: Playback 0 - 87
  Mono: Playback 0 [0%] [-65.25dB] [off]
";

    #[test]
    fn test_parse_volume_uses_first_channel() {
        assert_eq!(parse_volume(STEREO), Ok(70));
        assert_eq!(parse_volume(MONO_MUTED), Ok(0));
    }

    #[test]
    fn test_parse_muted_uses_first_switch() {
        assert_eq!(parse_muted(STEREO), Ok(false));
        assert_eq!(parse_muted(MONO_MUTED), Ok(true));
    }

    #[test]
    fn test_parse_rejects_output_without_values() {
        let capture_only = "Simple mixer control 'Capture',0\n  Capabilities: cvolume\n";
        assert_matches!(parse_volume(capture_only), Err(DeviceError::Unavailable(_)));
        assert_matches!(parse_muted(capture_only), Err(DeviceError::Unavailable(_)));
    }

    #[test]
    fn test_control_without_switch_fails_check() {
        let pcm = "Simple mixer control 'PCM',0
  Capabilities: pvolume
  Playback channels: Front Left - Front Right
  Limits: Playback 0 - 255
  Mono:
  Front Left: Playback 199 [78%] [-5.00dB]
  Front Right: Playback 199 [78%] [-5.00dB]
";
        assert_eq!(parse_volume(pcm), Ok(78));
        assert_matches!(
            check_control(pcm),
            Err(DeviceError::Unavailable(reason)) if reason.contains("playback switch")
        );
        assert_eq!(check_control(STEREO), Ok(()));
        assert_eq!(check_control(MONO_MUTED), Ok(()));
    }

    #[test]
    fn test_parse_volume_ignores_db_tokens() {
        let output = "  Mono: Playback 40 [-12.00dB] [46%] [on]";
        assert_eq!(parse_volume(output), Ok(46));
    }
}
