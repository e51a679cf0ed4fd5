//! Configuration schema.
//!
//! Every field has a default matching a stock Windows installation of
//! Telegraf, so an empty (or absent) config file is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration for the updater.
///
/// # Example
///
/// ```
/// use telegraf_updater::config::UpdaterConfig;
///
/// let config: UpdaterConfig = serde_yaml::from_str("install_base_path: /opt/telegraf").unwrap();
/// assert_eq!(config.install_base_path.to_str(), Some("/opt/telegraf"));
/// assert_eq!(config.product, "telegraf");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdaterConfig {
    /// Directory holding the live binary.
    #[serde(alias = "installBasePath")]
    pub install_base_path: PathBuf,

    /// File name of the managed binary inside `install_base_path`.
    pub binary_name: String,

    /// Product name used in artifact file names and extraction directories.
    pub product: String,

    /// Label printed by `<binary> --version` before the version token.
    pub version_label: String,

    /// Remote version manifest.
    pub manifest_url: String,

    /// Base URL release archives are published under.
    pub releases_base_url: String,

    /// Platform component of the artifact file name.
    pub platform: String,

    /// Architecture component of the artifact file name.
    pub arch: String,

    /// Where the downloaded archive is kept (default: working directory).
    pub archive_dir: Option<PathBuf>,

    /// Timeout for each HTTP request, in seconds.
    pub http_timeout_secs: u64,

    /// Timeout for each invocation of the managed binary, in seconds.
    pub command_timeout_secs: u64,

    /// Verify the archive against the manifest's SHA-256 before extracting.
    pub verify_checksum: bool,

    /// Archive extraction backend.
    pub extractor: ExtractorKind,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            install_base_path: PathBuf::from(r"C:\Program Files\Telegraf\"),
            binary_name: "telegraf.exe".to_string(),
            product: "telegraf".to_string(),
            version_label: "Telegraf".to_string(),
            manifest_url: "https://www.influxdata.com/versions.json".to_string(),
            releases_base_url: "https://dl.influxdata.com/telegraf/releases".to_string(),
            platform: "windows".to_string(),
            arch: "amd64".to_string(),
            archive_dir: None,
            http_timeout_secs: 300,
            command_timeout_secs: 120,
            verify_checksum: false,
            extractor: ExtractorKind::Zip,
        }
    }
}

impl UpdaterConfig {
    /// Path of the live binary.
    pub fn binary_path(&self) -> PathBuf {
        self.install_base_path.join(&self.binary_name)
    }

    /// Directory the archive is downloaded into.
    pub fn archive_dir(&self) -> &Path {
        self.archive_dir.as_deref().unwrap_or_else(|| Path::new("."))
    }

    /// HTTP timeout as a [`Duration`].
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Subprocess timeout as a [`Duration`].
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

/// Which extraction backend unpacks the release archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorKind {
    /// In-process extraction with the `zip` crate.
    #[default]
    Zip,
    /// PowerShell `Expand-Archive`.
    PowerShell,
}
