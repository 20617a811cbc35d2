//! Status report serialization.

use std::fmt;

use crate::state::StatusReport;

/// What caused a status report to be emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportTrigger {
    /// A command was applied
    Dispatch,
    /// The periodic status timer fired
    Periodic,
}

impl fmt::Display for ReportTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dispatch => write!(f, "dispatch"),
            Self::Periodic => write!(f, "periodic"),
        }
    }
}

/// Formats status reports for the status channel.
///
/// The wire document is `{"volume": <0-100>, "muted": <bool>}`. Identical
/// mixer state always renders to identical bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusReporter;

impl StatusReporter {
    /// Render a report as a JSON document.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn render(report: &StatusReport) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(report)
    }
}
