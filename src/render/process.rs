//! Shared subprocess plumbing for the external-tool backends.

use std::{
    io::Read as _,
    path::PathBuf,
    process::{Command, Stdio},
    time::{Duration, Instant},
};

use crate::error::BackendError;

/// Kill deadline for every external rendering tool.
pub(crate) const SUBPROCESS_TIMEOUT: Duration = Duration::from_secs(30);

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// True when `binary` can be executed from PATH (or is an existing absolute
/// path, e.g. a macOS app-bundle executable).
pub(crate) fn binary_available(binary: &str) -> bool {
    if binary.contains('/') {
        return std::path::Path::new(binary).exists();
    }
    Command::new(binary)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Run a prepared command to completion, killing it at the deadline.
///
/// Returns `Ok(())` only on a zero exit; a non-zero exit carries trimmed
/// stderr for the warning log. stdout is discarded, stderr is bounded by the
/// pipe and read only after exit (these tools emit at most a few lines).
pub(crate) fn run_with_timeout(
    cmd: &mut Command,
    binary: &str,
    timeout: Duration,
) -> Result<(), BackendError> {
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| BackendError::Spawn {
            binary: binary.to_string(),
            message: e.to_string(),
        })?;

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait()? {
            Some(status) => break status,
            None => {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(BackendError::Timeout(binary.to_string(), timeout));
                }
                std::thread::sleep(POLL_INTERVAL);
            }
        }
    };

    if status.success() {
        return Ok(());
    }

    let mut stderr = String::new();
    if let Some(mut pipe) = child.stderr.take() {
        let _ = pipe.read_to_string(&mut stderr);
    }
    Err(BackendError::Subprocess {
        binary: binary.to_string(),
        status: status.to_string(),
        stderr: stderr.trim().to_string(),
    })
}

/// Removes a temporary file when the backend attempt ends, pass or fail.
pub(crate) struct TempFileGuard(pub(crate) PathBuf);

impl TempFileGuard {
    /// A unique temp path with the given suffix.
    pub(crate) fn unique(prefix: &str, suffix: &str) -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        Self(std::env::temp_dir().join(format!(
            "emojiday_{prefix}_{}_{nanos}{suffix}",
            std::process::id()
        )))
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}
