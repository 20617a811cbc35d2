//! Helper for running the command-line tools the drivers wrap.

use std::process::Command;

use deskctl_core::{DeviceError, DeviceResult};

/// Run `program` with `args` and return its stdout.
///
/// A missing binary, a non-zero exit status or non-UTF-8 output all map to
/// [`DeviceError::Unavailable`].
pub(crate) fn run(program: &str, args: &[&str]) -> DeviceResult<String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| DeviceError::Unavailable(format!("cannot run {program}: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(DeviceError::Unavailable(format!(
            "{program} failed ({}): {}",
            output.status,
            stderr.trim()
        )));
    }

    String::from_utf8(output.stdout)
        .map_err(|_| DeviceError::Unavailable(format!("{program} produced non-UTF-8 output")))
}
