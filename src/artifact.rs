//! Release archive download.

use crate::config::UpdaterConfig;
use crate::error::{Result, UpdaterError};
use crate::http::build_client;
use crate::ui::set_download_length;
use crate::version::Version;
use indicatif::ProgressBar;
use reqwest::blocking::Client;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where release archives are published and how they are named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLocator {
    /// Base URL, without trailing slash.
    pub releases_base_url: String,
    /// Product name, e.g. `telegraf`.
    pub product: String,
    /// Platform, e.g. `windows`.
    pub platform: String,
    /// Architecture, e.g. `amd64`.
    pub arch: String,
}

impl ArtifactLocator {
    /// Locator for the release configured in `config`.
    pub fn from_config(config: &UpdaterConfig) -> Self {
        Self {
            releases_base_url: config.releases_base_url.clone(),
            product: config.product.clone(),
            platform: config.platform.clone(),
            arch: config.arch.clone(),
        }
    }

    /// File name of the archive for `version`.
    ///
    /// ```
    /// use telegraf_updater::artifact::ArtifactLocator;
    /// use telegraf_updater::version::Version;
    ///
    /// let locator = ArtifactLocator {
    ///     releases_base_url: "https://dl.influxdata.com/telegraf/releases".into(),
    ///     product: "telegraf".into(),
    ///     platform: "windows".into(),
    ///     arch: "amd64".into(),
    /// };
    /// assert_eq!(
    ///     locator.file_name(&Version::new("v1.30.0")),
    ///     "telegraf-1.30.0_windows_amd64.zip"
    /// );
    /// ```
    pub fn file_name(&self, version: &Version) -> String {
        format!(
            "{}-{}_{}_{}.zip",
            self.product,
            version.normalized(),
            self.platform,
            self.arch
        )
    }

    /// Full download URL of the archive for `version`.
    pub fn url(&self, version: &Version) -> String {
        format!(
            "{}/{}",
            self.releases_base_url.trim_end_matches('/'),
            self.file_name(version)
        )
    }
}

/// Downloads release archives.
pub trait ArtifactFetcher {
    /// Download the archive for `version` to `dest`, returning `dest`.
    ///
    /// `progress` is advanced by the number of bytes written.
    fn download(&self, version: &Version, dest: &Path, progress: &ProgressBar) -> Result<PathBuf>;

    /// URL `download` would fetch for `version`.
    fn url_for(&self, version: &Version) -> String;
}

/// Downloads archives over HTTPS.
pub struct HttpArtifactFetcher {
    client: Client,
    locator: ArtifactLocator,
}

impl HttpArtifactFetcher {
    /// Create a fetcher with the given per-request timeout.
    pub fn new(locator: ArtifactLocator, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            locator,
        })
    }
}

impl ArtifactFetcher for HttpArtifactFetcher {
    fn download(&self, version: &Version, dest: &Path, progress: &ProgressBar) -> Result<PathBuf> {
        let url = self.locator.url(version);
        tracing::info!("Downloading {} to {}", url, dest.display());

        let mut response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| UpdaterError::Network {
                url: url.clone(),
                message: e.to_string(),
            })?;

        // Nothing touches the disk until the server confirms the artifact exists.
        let status = response.status();
        if !status.is_success() {
            return Err(UpdaterError::Download {
                url,
                message: format!("HTTP {}", status),
            });
        }

        if let Some(len) = response.content_length() {
            set_download_length(progress, len);
        }

        let download_error = |message: String| UpdaterError::Download {
            url: url.clone(),
            message,
        };

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                download_error(format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        let file = File::create(dest)
            .map_err(|e| download_error(format!("failed to create {}: {e}", dest.display())))?;
        let mut writer = BufWriter::new(file);

        let written = io::copy(&mut progress.wrap_read(&mut response), &mut writer)
            .map_err(|e| download_error(format!("failed to write {}: {e}", dest.display())))?;
        writer
            .flush()
            .map_err(|e| download_error(format!("failed to flush {}: {e}", dest.display())))?;

        progress.finish_and_clear();
        tracing::debug!("Wrote {} bytes to {}", written, dest.display());
        Ok(dest.to_path_buf())
    }

    fn url_for(&self, version: &Version) -> String {
        self.locator.url(version)
    }
}

/// Hex-encoded SHA-256 of the file at `path`.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let read = file.read(&mut buf)?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Check the file at `path` against an expected hex SHA-256.
pub fn verify_checksum(path: &Path, expected: &str) -> Result<()> {
    let actual = sha256_file(path)?;
    if !actual.eq_ignore_ascii_case(expected.trim()) {
        return Err(UpdaterError::ChecksumMismatch {
            path: path.to_path_buf(),
            expected: expected.trim().to_lowercase(),
            actual,
        });
    }
    Ok(())
}
