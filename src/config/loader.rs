//! Configuration file discovery and loading.
//!
//! Values are resolved in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Config file (`--config`, or `<user config dir>/telegraf-updater/config.yml`)
//! 3. `TELEGRAF_UPDATER_*` environment variables
//! 4. Command-line overrides

use crate::config::schema::UpdaterConfig;
use crate::config::validator::validate;
use crate::error::{Result, UpdaterError};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding `install_base_path`.
pub const ENV_INSTALL_BASE_PATH: &str = "TELEGRAF_UPDATER_INSTALL_BASE_PATH";
/// Environment variable overriding `manifest_url`.
pub const ENV_MANIFEST_URL: &str = "TELEGRAF_UPDATER_MANIFEST_URL";
/// Environment variable overriding `archive_dir`.
pub const ENV_ARCHIVE_DIR: &str = "TELEGRAF_UPDATER_ARCHIVE_DIR";

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Explicit config file; must exist when given.
    pub config_path: Option<PathBuf>,
    /// Replaces `install_base_path`.
    pub install_base_path: Option<PathBuf>,
}

/// Default config file location, if the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("telegraf-updater").join("config.yml"))
}

/// Load a single config file and parse it into UpdaterConfig.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<UpdaterConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            UpdaterError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            UpdaterError::Io(e)
        }
    })?;

    parse_config(&content, path)
}

/// Parse YAML content into UpdaterConfig.
///
/// An empty document yields the defaults.
pub fn parse_config(content: &str, source_path: &Path) -> Result<UpdaterConfig> {
    if content.trim().is_empty() {
        return Ok(UpdaterConfig::default());
    }

    serde_yaml::from_str(content).map_err(|e| UpdaterError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Apply `TELEGRAF_UPDATER_*` overrides from `vars`.
pub fn apply_env_overrides(config: &mut UpdaterConfig, vars: &HashMap<String, String>) {
    if let Some(path) = vars.get(ENV_INSTALL_BASE_PATH) {
        tracing::debug!("install_base_path overridden by {}", ENV_INSTALL_BASE_PATH);
        config.install_base_path = PathBuf::from(path);
    }
    if let Some(url) = vars.get(ENV_MANIFEST_URL) {
        tracing::debug!("manifest_url overridden by {}", ENV_MANIFEST_URL);
        config.manifest_url = url.clone();
    }
    if let Some(dir) = vars.get(ENV_ARCHIVE_DIR) {
        tracing::debug!("archive_dir overridden by {}", ENV_ARCHIVE_DIR);
        config.archive_dir = Some(PathBuf::from(dir));
    }
}

/// Resolve the effective configuration from an explicit variable map.
///
/// `default_path` is consulted only when no `--config` was given, and is
/// skipped silently if the file does not exist.
pub fn resolve_config(
    overrides: &ConfigOverrides,
    default_path: Option<&Path>,
    vars: &HashMap<String, String>,
) -> Result<UpdaterConfig> {
    let mut config = match (&overrides.config_path, default_path) {
        (Some(path), _) => {
            tracing::debug!("Loading config from {}", path.display());
            load_config_file(path)?
        }
        (None, Some(path)) if path.is_file() => {
            tracing::debug!("Loading config from {}", path.display());
            load_config_file(path)?
        }
        _ => {
            tracing::debug!("No config file found, using defaults");
            UpdaterConfig::default()
        }
    };

    apply_env_overrides(&mut config, vars);

    if let Some(base) = &overrides.install_base_path {
        config.install_base_path = base.clone();
    }

    validate(&config)?;
    Ok(config)
}

/// Load the effective configuration from the process environment.
pub fn load_config(overrides: &ConfigOverrides) -> Result<UpdaterConfig> {
    let vars: HashMap<String, String> = std::env::vars()
        .filter(|(k, _)| k.starts_with("TELEGRAF_UPDATER_"))
        .collect();
    resolve_config(overrides, default_config_path().as_deref(), &vars)
}
