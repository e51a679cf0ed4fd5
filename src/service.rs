//! OS service control through the managed binary.
//!
//! Telegraf registers and controls its own Windows service via
//! `telegraf --service <action>`. Stopping and removing the service, and later
//! reinstalling and starting it, are each two separate invocations: neither
//! pair is atomic. A stop that succeeds followed by a failed uninstall leaves
//! the service stopped but registered.

use crate::error::{Result, UpdaterError};
use crate::shell::{execute, CommandOptions};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// A service lifecycle action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAction {
    Stop,
    Uninstall,
    Install,
    Start,
}

impl ServiceAction {
    /// Argument passed after `--service`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceAction::Stop => "stop",
            ServiceAction::Uninstall => "uninstall",
            ServiceAction::Install => "install",
            ServiceAction::Start => "start",
        }
    }
}

impl fmt::Display for ServiceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Controls the OS service wrapping the managed binary.
///
/// Each call returns the captured output on success and
/// [`UpdaterError::ServiceControl`] on failure.
pub trait ServiceController {
    /// Stop the running service.
    fn stop(&self) -> Result<String>;

    /// Remove the service registration.
    fn uninstall(&self) -> Result<String>;

    /// Register the service.
    fn install(&self) -> Result<String>;

    /// Start the registered service.
    fn start(&self) -> Result<String>;
}

/// Runs `<binary> --service <action>`.
pub struct BinaryServiceController {
    binary: PathBuf,
    timeout: Duration,
}

impl BinaryServiceController {
    /// Create a controller driving `binary`.
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    fn invoke(&self, action: ServiceAction) -> Result<String> {
        let failure = |code: Option<i32>, output: String| UpdaterError::ServiceControl {
            action: action.to_string(),
            code,
            output,
        };

        let result = execute(
            &self.binary,
            &["--service", action.as_str()],
            &CommandOptions::with_timeout(self.timeout),
        )
        .map_err(|e| failure(None, format!("failed to run {}: {e}", self.binary.display())))?;

        if result.timed_out {
            return Err(failure(
                None,
                format!("timed out after {:?}: {}", self.timeout, result.combined_output()),
            ));
        }
        if !result.success {
            return Err(failure(result.exit_code, result.combined_output()));
        }

        tracing::info!("Service {} succeeded", action);
        Ok(result.combined_output())
    }
}

impl ServiceController for BinaryServiceController {
    fn stop(&self) -> Result<String> {
        self.invoke(ServiceAction::Stop)
    }

    fn uninstall(&self) -> Result<String> {
        self.invoke(ServiceAction::Uninstall)
    }

    fn install(&self) -> Result<String> {
        self.invoke(ServiceAction::Install)
    }

    fn start(&self) -> Result<String> {
        self.invoke(ServiceAction::Start)
    }
}
