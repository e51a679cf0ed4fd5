//! Installed version probe.
//!
//! Asks the live binary for its version by running `<binary> --version` and
//! reading the token after the product label, e.g. `1.28.0` from
//! `Telegraf 1.28.0 (git: HEAD@2a4d6c8e)`.

use crate::error::{Result, UpdaterError};
use crate::shell::{execute, CommandOptions};
use crate::version::Version;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Source of the currently installed version.
pub trait InstalledVersionProbe {
    /// Report the installed version.
    ///
    /// Fails with [`UpdaterError::NotInstalled`] when there is no binary, so
    /// callers can tell a first install from a broken one.
    fn probe(&self) -> Result<Version>;
}

/// Extract the version token following `label` in `output`.
///
/// The label is matched case-insensitively and may be absent, in which case
/// the first token of the output is used.
///
/// ```
/// use telegraf_updater::probe::parse_version_output;
///
/// let v = parse_version_output("Telegraf 1.28.0 (git: HEAD@2a4d6c8e)\n", "Telegraf").unwrap();
/// assert_eq!(v, "1.28.0");
/// ```
pub fn parse_version_output(output: &str, label: &str) -> Result<String> {
    let pattern = format!(r"(?i)^\s*(?:{}\s+)?(\S+)", regex::escape(label.trim()));
    let re = Regex::new(&pattern).map_err(|e| UpdaterError::Parse {
        what: "version label".to_string(),
        message: e.to_string(),
    })?;

    re.captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|token| !token.eq_ignore_ascii_case(label.trim()))
        .map(str::to_string)
        .ok_or_else(|| UpdaterError::Parse {
            what: "version output".to_string(),
            message: format!("no version token in {:?}", output.trim()),
        })
}

/// Probes the installed binary by executing it.
pub struct BinaryVersionProbe {
    binary: PathBuf,
    label: String,
    timeout: Duration,
}

impl BinaryVersionProbe {
    /// Create a probe for `binary` whose version line starts with `label`.
    pub fn new(binary: impl Into<PathBuf>, label: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            label: label.into(),
            timeout,
        }
    }

    /// Path of the probed binary.
    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl InstalledVersionProbe for BinaryVersionProbe {
    fn probe(&self) -> Result<Version> {
        if !self.binary.is_file() {
            return Err(UpdaterError::NotInstalled {
                path: self.binary.clone(),
            });
        }

        let probe_error = |message: String| UpdaterError::Probe {
            path: self.binary.clone(),
            message,
        };

        let result = execute(
            &self.binary,
            &["--version"],
            &CommandOptions::with_timeout(self.timeout),
        )
        .map_err(|e| probe_error(e.to_string()))?;

        if result.timed_out {
            return Err(probe_error(format!("timed out after {:?}", self.timeout)));
        }
        if !result.success {
            return Err(probe_error(format!(
                "exited with code {:?}: {}",
                result.exit_code,
                result.combined_output()
            )));
        }

        let token = parse_version_output(&result.stdout, &self.label)?;
        tracing::debug!("Installed version reported as {}", token);
        Ok(Version::new(token))
    }
}
