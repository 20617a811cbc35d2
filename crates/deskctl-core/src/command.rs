//! Control-channel commands and their JSON decoding.
//!
//! Every inbound message is a JSON object carrying exactly one of the keys
//! below. Keys are checked in this order; unknown keys are ignored.
//!
//! | key          | value                  | command        |
//! |--------------|------------------------|----------------|
//! | `volume`     | integer `0..=100`      | `SetVolume`    |
//! | `volumeCtrl` | `"+"` or `"-"`         | `StepVolume`   |
//! | `mute`       | boolean                | `SetMute`      |
//! | `toggle`     | `"mute"` or `"pause"`  | `Toggle`       |
//! | `ctrl`       | `">>"` or `"<<"`       | `Skip`         |

use std::fmt;

use serde_json::Value;

use crate::error::ParseError;
use crate::state::MAX_VOLUME;

/// Recognized command keys, in matching order.
pub const COMMAND_KEYS: [&str; 5] = ["volume", "volumeCtrl", "mute", "toggle", "ctrl"];

/// Direction of a relative volume change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolumeDirection {
    Increase,
    Decrease,
}

/// What a `toggle` command flips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToggleTarget {
    Mute,
    Pause,
}

/// Direction of a skip command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipDirection {
    Forward,
    Backward,
}

/// A decoded control command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Set the volume to an absolute percentage
    SetVolume(u8),
    /// Move the volume by the configured step
    StepVolume(VolumeDirection),
    /// Mute or unmute
    SetMute(bool),
    /// Flip mute, or press play/pause
    Toggle(ToggleTarget),
    /// Press skip forward/backward
    Skip(SkipDirection),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetVolume(level) => write!(f, "set volume {level}"),
            Self::StepVolume(VolumeDirection::Increase) => write!(f, "volume up"),
            Self::StepVolume(VolumeDirection::Decrease) => write!(f, "volume down"),
            Self::SetMute(true) => write!(f, "mute"),
            Self::SetMute(false) => write!(f, "unmute"),
            Self::Toggle(ToggleTarget::Mute) => write!(f, "toggle mute"),
            Self::Toggle(ToggleTarget::Pause) => write!(f, "toggle pause"),
            Self::Skip(SkipDirection::Forward) => write!(f, "skip forward"),
            Self::Skip(SkipDirection::Backward) => write!(f, "skip backward"),
        }
    }
}

/// Decode a raw control-channel payload.
///
/// # Errors
/// Returns [`ParseError::Malformed`] if the payload is not JSON or carries
/// more than one command key, and [`ParseError::Unrecognized`] if no command
/// key is present or its value is out of range.
pub fn parse(payload: &[u8]) -> Result<Command, ParseError> {
    let document: Value =
        serde_json::from_slice(payload).map_err(|e| ParseError::Malformed(e.to_string()))?;

    let Some(fields) = document.as_object() else {
        return Err(ParseError::Unrecognized(format!("expected a JSON object, got {document}")));
    };

    let mut present = COMMAND_KEYS.into_iter().filter(|key| fields.contains_key(*key));
    let Some(key) = present.next() else {
        return Err(ParseError::Unrecognized(format!("no command key in {document}")));
    };
    if let Some(other) = present.next() {
        return Err(ParseError::Malformed(format!(
            "ambiguous payload, both `{key}` and `{other}` are present"
        )));
    }

    let value = &fields[key];
    decode(key, value)
        .ok_or_else(|| ParseError::Unrecognized(format!("invalid value for `{key}`: {value}")))
}

fn decode(key: &str, value: &Value) -> Option<Command> {
    match key {
        "volume" => value
            .as_u64()
            .and_then(|level| u8::try_from(level).ok())
            .filter(|level| *level <= MAX_VOLUME)
            .map(Command::SetVolume),
        "volumeCtrl" => match value.as_str()? {
            "+" => Some(Command::StepVolume(VolumeDirection::Increase)),
            "-" => Some(Command::StepVolume(VolumeDirection::Decrease)),
            _ => None,
        },
        "mute" => value.as_bool().map(Command::SetMute),
        "toggle" => match value.as_str()? {
            "mute" => Some(Command::Toggle(ToggleTarget::Mute)),
            "pause" => Some(Command::Toggle(ToggleTarget::Pause)),
            _ => None,
        },
        "ctrl" => match value.as_str()? {
            ">>" => Some(Command::Skip(SkipDirection::Forward)),
            "<<" => Some(Command::Skip(SkipDirection::Backward)),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn parse_json(value: &Value) -> Result<Command, ParseError> {
        parse(value.to_string().as_bytes())
    }

    #[test]
    fn test_volume_accepts_full_range() {
        for level in 0..=100u8 {
            assert_eq!(parse_json(&json!({ "volume": level })), Ok(Command::SetVolume(level)));
        }
    }

    #[test]
    fn test_volume_rejects_out_of_domain_values() {
        for value in [json!(-1), json!(101), json!(150), json!("10"), json!(50.5), json!(null)] {
            assert_matches!(
                parse_json(&json!({ "volume": value })),
                Err(ParseError::Unrecognized(_)),
                "volume = {value}"
            );
        }
    }

    #[test]
    fn test_volume_ctrl_commands() {
        assert_eq!(
            parse_json(&json!({"volumeCtrl": "+"})),
            Ok(Command::StepVolume(VolumeDirection::Increase))
        );
        assert_eq!(
            parse_json(&json!({"volumeCtrl": "-"})),
            Ok(Command::StepVolume(VolumeDirection::Decrease))
        );

        for value in ["++", "--", "+-", "-+", ""] {
            assert_matches!(
                parse_json(&json!({ "volumeCtrl": value })),
                Err(ParseError::Unrecognized(_))
            );
        }
    }

    #[test]
    fn test_mute_requires_boolean() {
        assert_eq!(parse_json(&json!({"mute": true})), Ok(Command::SetMute(true)));
        assert_eq!(parse_json(&json!({"mute": false})), Ok(Command::SetMute(false)));

        for value in [json!(1), json!(0), json!("true"), json!("False")] {
            assert_matches!(
                parse_json(&json!({ "mute": value })),
                Err(ParseError::Unrecognized(_))
            );
        }
    }

    #[test]
    fn test_toggle_commands() {
        assert_eq!(
            parse_json(&json!({"toggle": "mute"})),
            Ok(Command::Toggle(ToggleTarget::Mute))
        );
        assert_eq!(
            parse_json(&json!({"toggle": "pause"})),
            Ok(Command::Toggle(ToggleTarget::Pause))
        );

        // Case sensitive
        for value in [json!("Mute"), json!("Pause"), json!("play"), json!("foo"), json!(1)] {
            assert_matches!(
                parse_json(&json!({ "toggle": value })),
                Err(ParseError::Unrecognized(_))
            );
        }
    }

    #[test]
    fn test_skip_commands() {
        assert_eq!(
            parse_json(&json!({"ctrl": ">>"})),
            Ok(Command::Skip(SkipDirection::Forward))
        );
        assert_eq!(
            parse_json(&json!({"ctrl": "<<"})),
            Ok(Command::Skip(SkipDirection::Backward))
        );
        assert_matches!(parse_json(&json!({"ctrl": ">"})), Err(ParseError::Unrecognized(_)));
    }

    #[test]
    fn test_unknown_key_is_unrecognized() {
        assert_matches!(parse_json(&json!({"foo": 1})), Err(ParseError::Unrecognized(_)));
        assert_matches!(
            parse_json(&json!({"msg": "This is an invalid command"})),
            Err(ParseError::Unrecognized(_))
        );
        assert_matches!(parse_json(&json!({})), Err(ParseError::Unrecognized(_)));
    }

    #[test]
    fn test_non_object_document_is_unrecognized() {
        assert_matches!(parse(b"[1, 2, 3]"), Err(ParseError::Unrecognized(_)));
        assert_matches!(parse(b"42"), Err(ParseError::Unrecognized(_)));
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        assert_matches!(parse(b"not json"), Err(ParseError::Malformed(_)));
        assert_matches!(parse(b"{\"volume\": "), Err(ParseError::Malformed(_)));
        assert_matches!(parse(&[0xff, 0xfe, 0x00]), Err(ParseError::Malformed(_)));
        assert_matches!(parse(b""), Err(ParseError::Malformed(_)));
    }

    #[test]
    fn test_multiple_command_keys_are_rejected() {
        assert_matches!(
            parse_json(&json!({"volume": 10, "mute": true})),
            Err(ParseError::Malformed(msg)) if msg.contains("volume") && msg.contains("mute")
        );
        assert_matches!(
            parse_json(&json!({"toggle": "pause", "ctrl": ">>"})),
            Err(ParseError::Malformed(_))
        );
    }

    #[test]
    fn test_extra_unknown_keys_are_ignored() {
        assert_eq!(
            parse_json(&json!({"volume": 30, "source": "kitchen"})),
            Ok(Command::SetVolume(30))
        );
    }

    #[test]
    fn test_command_display() {
        assert_eq!(Command::SetVolume(40).to_string(), "set volume 40");
        assert_eq!(Command::Skip(SkipDirection::Backward).to_string(), "skip backward");
    }
}
