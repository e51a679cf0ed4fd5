//! Release installation: unpack, move the binary into place, clean up.
//!
//! Archives unpack into a versioned directory under the install base, e.g.
//! `C:\Program Files\Telegraf\telegraf-1.30.0\telegraf.exe`. The binary is
//! then moved up one level over the live one, and the archive and versioned
//! directory are removed.

pub mod extract;

pub use extract::{Extractor, PowerShellExtractor, ZipExtractor};

use crate::config::{ExtractorKind, UpdaterConfig};
use crate::error::{Result, UpdaterError};
use crate::version::Version;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name of the downloaded archive inside the archive directory.
pub const ARCHIVE_FILE_NAME: &str = "telegraf.zip";

/// Filesystem locations touched by an update. Computed, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPaths {
    /// Base installation directory.
    pub base_dir: PathBuf,
    /// Live binary inside `base_dir`.
    pub binary_path: PathBuf,
    /// Temporary archive location.
    pub archive_path: PathBuf,
    /// Product name, prefix of the versioned extraction directory.
    pub product: String,
    /// Binary file name inside the versioned extraction directory.
    pub binary_name: String,
}

impl InstallPaths {
    /// Derive paths from configuration.
    pub fn from_config(config: &UpdaterConfig) -> Self {
        Self {
            base_dir: config.install_base_path.clone(),
            binary_path: config.binary_path(),
            archive_path: config.archive_dir().join(ARCHIVE_FILE_NAME),
            product: config.product.clone(),
            binary_name: config.binary_name.clone(),
        }
    }

    /// Versioned directory the archive unpacks into, `<base>/<product>-<version>`.
    ///
    /// ```
    /// use telegraf_updater::config::UpdaterConfig;
    /// use telegraf_updater::installer::InstallPaths;
    /// use telegraf_updater::version::Version;
    ///
    /// let mut config = UpdaterConfig::default();
    /// config.install_base_path = "/opt/telegraf".into();
    /// let paths = InstallPaths::from_config(&config);
    /// assert!(paths
    ///     .extracted_dir(&Version::new("v1.30.0"))
    ///     .ends_with("telegraf-1.30.0"));
    /// ```
    pub fn extracted_dir(&self, version: &Version) -> PathBuf {
        self.base_dir
            .join(format!("{}-{}", self.product, version.normalized()))
    }

    /// New binary inside the versioned directory.
    pub fn extracted_binary(&self, version: &Version) -> PathBuf {
        self.extracted_dir(version).join(&self.binary_name)
    }
}

/// Move the freshly unpacked binary over the live one.
///
/// Falls back to copy-and-remove when a plain rename is not possible, e.g.
/// across volumes. Fails with [`UpdaterError::Relocation`] if the source is
/// absent or the destination cannot be written (typically because the old
/// binary is still running).
pub fn relocate_binary(paths: &InstallPaths, version: &Version) -> Result<PathBuf> {
    let from = paths.extracted_binary(version);
    let to = paths.binary_path.clone();

    let fail = |message: String| UpdaterError::Relocation {
        from: from.clone(),
        to: to.clone(),
        message,
    };

    if !from.is_file() {
        return Err(fail("source binary not found in extracted archive".to_string()));
    }

    tracing::info!("Moving {} to {}", from.display(), to.display());

    if let Err(rename_err) = fs::rename(&from, &to) {
        tracing::debug!("Rename failed ({}), falling back to copy", rename_err);
        fs::copy(&from, &to).map_err(|e| fail(e.to_string()))?;
        fs::remove_file(&from).map_err(|e| fail(format!("copied but could not remove source: {e}")))?;
    }

    Ok(to)
}

/// A cleanup step that failed without affecting the installed binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupWarning {
    /// Path that could not be removed.
    pub path: PathBuf,
    /// Underlying error text.
    pub message: String,
}

impl fmt::Display for CleanupWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Could not remove {}: {}", self.path.display(), self.message)
    }
}

/// Remove the archive and the versioned extraction directory.
///
/// Paths that are already gone are skipped. Anything else is returned as a
/// warning rather than an error.
pub fn cleanup_artifacts(archive: &Path, extracted_dir: &Path) -> Vec<CleanupWarning> {
    let mut warnings = Vec::new();

    let mut record = |path: &Path, result: io::Result<()>| match result {
        Ok(()) => tracing::debug!("Removed {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("{} already gone", path.display())
        }
        Err(e) => {
            tracing::warn!("Could not remove {}: {}", path.display(), e);
            warnings.push(CleanupWarning {
                path: path.to_path_buf(),
                message: e.to_string(),
            });
        }
    };

    record(archive, fs::remove_file(archive));
    record(extracted_dir, fs::remove_dir_all(extracted_dir));

    warnings
}

/// Build the extraction backend selected in configuration.
pub fn extractor_for(kind: ExtractorKind, timeout: Duration) -> Box<dyn Extractor> {
    match kind {
        ExtractorKind::Zip => Box::new(ZipExtractor::new()),
        ExtractorKind::PowerShell => Box::new(PowerShellExtractor::new(timeout)),
    }
}
