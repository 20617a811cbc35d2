//! deskctl Core - Command parsing, dispatch and status reporting.
//!
//! This crate turns control-channel payloads into mixer and keyboard actions
//! and renders the resulting state for the status channel. Drivers and the
//! transport live in other crates and are reached only through the traits in
//! [`control`].

pub mod command;
pub mod control;
pub mod dispatch;
pub mod error;
pub mod report;
pub mod state;

pub use command::{Command, SkipDirection, ToggleTarget, VolumeDirection, parse};
pub use control::{AudioControl, InputControl};
pub use dispatch::{DEFAULT_VOLUME_STEP, Dispatcher};
pub use error::{DeviceError, DeviceResult, DispatchError, DispatchResult, ParseError};
pub use report::{ReportTrigger, StatusReporter};
pub use state::{AgentState, MAX_VOLUME, StateSnapshot, StatusReport};
