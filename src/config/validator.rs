//! Configuration validation rules.
//!
//! This module validates configuration for correctness:
//! - Names and URLs must not be empty
//! - URLs must use http or https
//! - Timeouts must be positive
//! - The binary name must be a bare file name

use crate::config::schema::UpdaterConfig;
use crate::error::{Result, UpdaterError};
use std::path::Path;

/// Validation error with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    fn new(rule: &str, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            message: message.into(),
        }
    }
}

/// Validate a configuration and return all errors.
///
/// This function collects all validation errors rather than stopping
/// at the first one, allowing users to fix multiple issues at once.
pub fn validate_config(config: &UpdaterConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let required = [
        ("binary_name", config.binary_name.as_str()),
        ("product", config.product.as_str()),
        ("version_label", config.version_label.as_str()),
        ("platform", config.platform.as_str()),
        ("arch", config.arch.as_str()),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            errors.push(ValidationError::new(
                "empty-field",
                format!("'{}' must not be empty", field),
            ));
        }
    }

    if config.install_base_path.as_os_str().is_empty() {
        errors.push(ValidationError::new(
            "empty-field",
            "'install_base_path' must not be empty",
        ));
    }

    if Path::new(&config.binary_name).components().count() > 1 {
        errors.push(ValidationError::new(
            "binary-name-path",
            format!(
                "'binary_name' must be a file name, not a path: {}",
                config.binary_name
            ),
        ));
    }

    for (field, url) in [
        ("manifest_url", config.manifest_url.as_str()),
        ("releases_base_url", config.releases_base_url.as_str()),
    ] {
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            errors.push(ValidationError::new(
                "invalid-url",
                format!("'{}' must be an http(s) URL, got '{}'", field, url),
            ));
        }
    }

    if config.http_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "zero-timeout",
            "'http_timeout_secs' must be greater than zero",
        ));
    }
    if config.command_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "zero-timeout",
            "'command_timeout_secs' must be greater than zero",
        ));
    }

    errors
}

/// Validate and return the first error as an UpdaterError.
pub fn validate(config: &UpdaterConfig) -> Result<()> {
    let errors = validate_config(config);
    if errors.is_empty() {
        return Ok(());
    }

    let message = errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ");
    Err(UpdaterError::ConfigValidationError { message })
}
