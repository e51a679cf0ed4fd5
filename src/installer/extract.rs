//! Archive extraction backends.

use crate::error::{Result, UpdaterError};
use crate::shell::{execute, CommandOptions};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use zip::ZipArchive;

/// Unpacks a release archive.
pub trait Extractor {
    /// Unpack `archive` into `dest_dir`, creating it if needed.
    fn unpack(&self, archive: &Path, dest_dir: &Path) -> Result<()>;
}

/// Extracts zip archives in-process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipExtractor;

impl ZipExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for ZipExtractor {
    fn unpack(&self, archive: &Path, dest_dir: &Path) -> Result<()> {
        tracing::info!("Extracting {} into {}", archive.display(), dest_dir.display());

        let fail = |message: String| UpdaterError::Extraction {
            archive: archive.to_path_buf(),
            message,
        };

        let file = File::open(archive).map_err(|e| fail(format!("open error: {e}")))?;
        let mut zip = ZipArchive::new(file).map_err(|e| fail(format!("parse error: {e}")))?;

        for i in 0..zip.len() {
            let mut entry = zip
                .by_index(i)
                .map_err(|e| fail(format!("entry error: {e}")))?;

            let relative: PathBuf = entry
                .enclosed_name()
                .ok_or_else(|| fail(format!("unsafe entry path: {}", entry.name())))?;
            let out_path = dest_dir.join(relative);

            if entry.is_dir() {
                fs::create_dir_all(&out_path)
                    .map_err(|e| fail(format!("dir create error: {e}")))?;
                continue;
            }
            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent).map_err(|e| fail(format!("parent dir error: {e}")))?;
            }

            let mut out_file =
                File::create(&out_path).map_err(|e| fail(format!("create file error: {e}")))?;
            io::copy(&mut entry, &mut out_file).map_err(|e| fail(format!("write error: {e}")))?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = entry.unix_mode() {
                    fs::set_permissions(&out_path, fs::Permissions::from_mode(mode & 0o7777))
                        .map_err(|e| fail(format!("permission error: {e}")))?;
                }
            }
        }

        Ok(())
    }
}

/// Extracts with PowerShell's `Expand-Archive`.
#[derive(Debug, Clone)]
pub struct PowerShellExtractor {
    timeout: Duration,
}

impl PowerShellExtractor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// The `-Command` script for unpacking `archive` into `dest_dir`.
    pub fn script(archive: &Path, dest_dir: &Path) -> String {
        format!(
            "Expand-Archive -LiteralPath {} -DestinationPath {} -Force",
            ps_quote(archive),
            ps_quote(dest_dir)
        )
    }
}

/// Single-quote a path for PowerShell, doubling embedded quotes.
fn ps_quote(path: &Path) -> String {
    format!("'{}'", path.display().to_string().replace('\'', "''"))
}

impl Extractor for PowerShellExtractor {
    fn unpack(&self, archive: &Path, dest_dir: &Path) -> Result<()> {
        tracing::info!(
            "Extracting {} into {} with Expand-Archive",
            archive.display(),
            dest_dir.display()
        );

        let script = Self::script(archive, dest_dir);
        let result = execute(
            Path::new("powershell"),
            &["-NoProfile", "-NonInteractive", "-Command", &script],
            &CommandOptions::with_timeout(self.timeout),
        )
        .map_err(|e| UpdaterError::Extraction {
            archive: archive.to_path_buf(),
            message: format!("failed to run powershell: {e}"),
        })?;

        if !result.success {
            return Err(UpdaterError::Extraction {
                archive: archive.to_path_buf(),
                message: if result.timed_out {
                    format!("Expand-Archive timed out after {:?}", self.timeout)
                } else {
                    result.combined_output()
                },
            });
        }

        Ok(())
    }
}
