//! AppleScript execution through `osascript`.

use std::path::PathBuf;
use std::process::Output;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, trace, warn};

use crate::error::{BackendError, Result};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Runs AppleScript snippets with a timeout and bounded retries.
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    osascript: PathBuf,
    timeout: Duration,
    max_attempts: u32,
    retry_delay: Duration,
}

impl ScriptRunner {
    /// Create a runner using the `osascript` found in PATH.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::OsascriptNotFound` off macOS.
    pub fn new() -> Result<Self> {
        let osascript = which::which("osascript").map_err(|_| BackendError::OsascriptNotFound)?;
        debug!(path = %osascript.display(), "osascript found");
        Ok(Self::with_binary(osascript))
    }

    /// Create a runner for a specific interpreter binary.
    pub fn with_binary(osascript: impl Into<PathBuf>) -> Self {
        Self {
            osascript: osascript.into(),
            timeout: DEFAULT_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Check if osascript is available in PATH.
    pub fn is_available() -> bool {
        which::which("osascript").is_ok()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the retry policy. `max_attempts` is clamped to at least one.
    pub fn with_retries(mut self, max_attempts: u32, retry_delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_delay = retry_delay;
        self
    }

    /// Runs a script and returns its trimmed stdout.
    ///
    /// Transient failures are retried with linear backoff; anything else
    /// returns immediately.
    pub async fn run(&self, script: &str) -> Result<String> {
        let mut attempt = 1;
        loop {
            match self.run_once(script).await {
                Ok(stdout) => return Ok(stdout),
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    warn!(attempt, error = %e, "osascript failed, retrying");
                    tokio::time::sleep(self.retry_delay * attempt).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Runs a script whose output is `true`/`false`.
    pub async fn run_bool(&self, script: &str) -> Result<bool> {
        let out = self.run(script).await?;
        match out.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(BackendError::Parse(format!("expected boolean, got '{}'", other))),
        }
    }

    async fn run_once(&self, script: &str) -> Result<String> {
        trace!(script = %script, "running osascript");
        let child = Command::new(&self.osascript)
            .arg("-e")
            .arg(script)
            .kill_on_drop(true)
            .output();

        let output: Output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| BackendError::Timeout(self.timeout))??;

        trace!(
            status = %output.status,
            stdout_len = output.stdout.len(),
            stderr_len = output.stderr.len(),
            "osascript completed"
        );

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(BackendError::from_script_stderr(&stderr))
        }
    }
}
