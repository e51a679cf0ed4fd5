//! Error types for updater operations.
//!
//! This module defines [`UpdaterError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Each component fails with its own variant so callers can tell a broken
//!   manifest from a locked binary without string matching
//! - The orchestrator wraps component errors in [`UpdaterError::UpdateAborted`]
//!   to record which stage failed and whether the service was left down
//! - Use `anyhow::Error` (via `UpdaterError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

use crate::orchestrator::UpdateStage;

/// Core error type for updater operations.
#[derive(Debug, Error)]
pub enum UpdaterError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// A request could not be completed at the transport level.
    #[error("Network error requesting {url}: {message}")]
    Network { url: String, message: String },

    /// A manifest document or probe output could not be understood.
    #[error("Failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    /// The installed binary could not be executed or reported an error.
    #[error("Failed to probe installed version at {path}: {message}")]
    Probe { path: PathBuf, message: String },

    /// No binary exists at the install location.
    #[error("No installed binary found at {path}")]
    NotInstalled { path: PathBuf },

    /// A `--service` subcommand exited unsuccessfully.
    #[error("Service {action} failed with exit code {code:?}: {output}")]
    ServiceControl {
        action: String,
        code: Option<i32>,
        output: String,
    },

    /// The release archive could not be downloaded or written.
    #[error("Download of {url} failed: {message}")]
    Download { url: String, message: String },

    /// The downloaded archive did not match the manifest checksum.
    #[error("Checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// The release archive could not be unpacked.
    #[error("Failed to extract {archive}: {message}")]
    Extraction { archive: PathBuf, message: String },

    /// The new binary could not be moved into place.
    #[error("Failed to move {from} to {to}: {message}")]
    Relocation {
        from: PathBuf,
        to: PathBuf,
        message: String,
    },

    /// An update stage failed after the update sequence started.
    #[error("{}", aborted_message(.stage, .service_stopped, .source))]
    UpdateAborted {
        stage: UpdateStage,
        service_stopped: bool,
        #[source]
        source: Box<UpdaterError>,
    },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn aborted_message(stage: &UpdateStage, service_stopped: &bool, source: &UpdaterError) -> String {
    if *service_stopped {
        format!(
            "Update aborted while {stage}: {source}. The service is no longer \
             running; manual intervention is required"
        )
    } else {
        format!("Update aborted while {stage}: {source}")
    }
}

impl UpdaterError {
    /// The innermost error, unwrapping any [`UpdaterError::UpdateAborted`] layer.
    pub fn root(&self) -> &UpdaterError {
        match self {
            UpdaterError::UpdateAborted { source, .. } => source.root(),
            other => other,
        }
    }

    /// Stage the update failed in, if this error came from the update sequence.
    pub fn stage(&self) -> Option<UpdateStage> {
        match self {
            UpdaterError::UpdateAborted { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Whether this error left the managed service stopped.
    pub fn requires_manual_intervention(&self) -> bool {
        matches!(
            self,
            UpdaterError::UpdateAborted {
                service_stopped: true,
                ..
            }
        )
    }

    /// Whether this is a configuration problem rather than a runtime failure.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            UpdaterError::ConfigNotFound { .. }
                | UpdaterError::ConfigParseError { .. }
                | UpdaterError::ConfigValidationError { .. }
        )
    }
}

/// Result type alias for updater operations.
pub type Result<T> = std::result::Result<T, UpdaterError>;
