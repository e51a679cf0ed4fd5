//! Update orchestration.
//!
//! An update run moves through a fixed sequence of stages:
//!
//! ```text
//! Checking ─┬─> (up to date) ──────────────────────────────────────────> Done
//!           └─> StoppingService -> Downloading -> Extracting -> Relocating
//!                 -> CleaningUp -> RestartingService -> Done
//! ```
//!
//! Every stage except cleanup is fatal on failure. Nothing is rolled back:
//! once the service has been stopped, a later failure leaves it down and the
//! returned [`UpdaterError::UpdateAborted`] says so.

use crate::artifact::{verify_checksum, ArtifactFetcher, ArtifactLocator, HttpArtifactFetcher};
use crate::config::UpdaterConfig;
use crate::error::{Result, UpdaterError};
use crate::installer::{
    cleanup_artifacts, extractor_for, relocate_binary, CleanupWarning, Extractor, InstallPaths,
};
use crate::manifest::{HttpManifestClient, Manifest, ManifestSource};
use crate::probe::{BinaryVersionProbe, InstalledVersionProbe};
use crate::service::{BinaryServiceController, ServiceController};
use crate::ui::UserInterface;
use crate::version::{decide_update, UpdateDecision, Version};
use std::fmt;
use std::fs;

/// A point in the update sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStage {
    Checking,
    StoppingService,
    Downloading,
    Extracting,
    Relocating,
    CleaningUp,
    RestartingService,
    Done,
}

impl fmt::Display for UpdateStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phrase = match self {
            UpdateStage::Checking => "checking versions",
            UpdateStage::StoppingService => "stopping the service",
            UpdateStage::Downloading => "downloading the release",
            UpdateStage::Extracting => "extracting the archive",
            UpdateStage::Relocating => "replacing the binary",
            UpdateStage::CleaningUp => "cleaning up",
            UpdateStage::RestartingService => "restarting the service",
            UpdateStage::Done => "finishing",
        };
        f.write_str(phrase)
    }
}

/// Result of comparing the installed version with the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCheck {
    /// Installed version, `None` when no binary is present.
    pub installed: Option<Version>,
    /// Latest version, as published.
    pub latest: Version,
    /// What a run would do.
    pub decision: UpdateDecision,
    /// The fetched manifest.
    pub manifest: Manifest,
}

/// What a completed run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Nothing to do.
    UpToDate { version: Version },
    /// An existing installation was replaced.
    Updated { from: Version, to: Version },
    /// Nothing was installed; the release was installed fresh.
    Installed { to: Version },
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    pub outcome: UpdateOutcome,
    /// Non-fatal cleanup failures.
    pub warnings: Vec<CleanupWarning>,
}

/// Tracks the current stage and whether the service has gone down.
struct Transaction {
    stage: UpdateStage,
    service_stopped: bool,
}

impl Transaction {
    fn new() -> Self {
        Self {
            stage: UpdateStage::Checking,
            service_stopped: false,
        }
    }

    fn enter(&mut self, stage: UpdateStage) {
        tracing::debug!("Entering stage: {}", stage);
        self.stage = stage;
    }

    fn abort(&self, source: UpdaterError) -> UpdaterError {
        tracing::error!("Update failed while {}: {}", self.stage, source);
        UpdaterError::UpdateAborted {
            stage: self.stage,
            service_stopped: self.service_stopped,
            source: Box::new(source),
        }
    }
}

/// Sequences the update components.
///
/// All collaborators are injected so the full sequence can run against fakes.
pub struct Orchestrator {
    paths: InstallPaths,
    manifest: Box<dyn ManifestSource>,
    probe: Box<dyn InstalledVersionProbe>,
    service: Box<dyn ServiceController>,
    fetcher: Box<dyn ArtifactFetcher>,
    extractor: Box<dyn Extractor>,
    verify_checksum: bool,
}

impl Orchestrator {
    /// Create an orchestrator from explicit components.
    pub fn new(
        paths: InstallPaths,
        manifest: Box<dyn ManifestSource>,
        probe: Box<dyn InstalledVersionProbe>,
        service: Box<dyn ServiceController>,
        fetcher: Box<dyn ArtifactFetcher>,
        extractor: Box<dyn Extractor>,
    ) -> Self {
        Self {
            paths,
            manifest,
            probe,
            service,
            fetcher,
            extractor,
            verify_checksum: false,
        }
    }

    /// Create an orchestrator wired to the real network, binary and filesystem.
    pub fn from_config(config: &UpdaterConfig) -> Result<Self> {
        let binary = config.binary_path();
        let orchestrator = Self::new(
            InstallPaths::from_config(config),
            Box::new(HttpManifestClient::new(
                config.manifest_url.clone(),
                config.http_timeout(),
            )?),
            Box::new(BinaryVersionProbe::new(
                binary.clone(),
                config.version_label.clone(),
                config.command_timeout(),
            )),
            Box::new(BinaryServiceController::new(
                binary,
                config.command_timeout(),
            )),
            Box::new(HttpArtifactFetcher::new(
                ArtifactLocator::from_config(config),
                config.http_timeout(),
            )?),
            extractor_for(config.extractor, config.command_timeout()),
        );
        Ok(orchestrator.with_checksum_verification(config.verify_checksum))
    }

    /// Verify the archive against the manifest checksum before extracting.
    pub fn with_checksum_verification(mut self, enabled: bool) -> Self {
        self.verify_checksum = enabled;
        self
    }

    /// Paths this orchestrator operates on.
    pub fn paths(&self) -> &InstallPaths {
        &self.paths
    }

    /// Probe the installed version, fetch the manifest and decide.
    ///
    /// A missing binary is reported as `installed: None`, not an error.
    pub fn check(&self) -> Result<UpdateCheck> {
        let installed = match self.probe.probe() {
            Ok(version) => Some(version),
            Err(UpdaterError::NotInstalled { path }) => {
                tracing::info!("No binary at {}, treating as fresh install", path.display());
                None
            }
            Err(e) => return Err(e),
        };

        let manifest = self.manifest.fetch_manifest()?;
        let latest = manifest.latest_version();
        let decision = decide_update(installed.as_ref(), &latest);
        tracing::debug!("Update decision: {:?}", decision);

        Ok(UpdateCheck {
            installed,
            latest,
            decision,
            manifest,
        })
    }

    /// Run the full update sequence if the versions differ.
    pub fn run(&self, ui: &mut dyn UserInterface) -> Result<UpdateReport> {
        let mut tx = Transaction::new();
        let check = self.check().map_err(|e| tx.abort(e))?;

        match &check.installed {
            Some(installed) => ui.message(&format!("Current Version: {}", installed.display())),
            None => ui.message("Current Version: not installed"),
        }
        ui.message(&format!("Latest Version: {}", check.latest.display()));

        let installed = match &check.decision {
            UpdateDecision::UpToDate { version } => {
                ui.success("You are up to date!");
                return Ok(UpdateReport {
                    outcome: UpdateOutcome::UpToDate {
                        version: version.clone(),
                    },
                    warnings: Vec::new(),
                });
            }
            UpdateDecision::UpdateRequired { installed, latest } => {
                if check.decision.is_downgrade() {
                    ui.warning(&format!(
                        "Installed {} is newer than published {}; it will be replaced",
                        installed.display(),
                        latest.display()
                    ));
                }
                Some(installed.clone())
            }
            UpdateDecision::FreshInstall { .. } => None,
        };

        let latest = &check.latest;

        if installed.is_some() {
            tx.enter(UpdateStage::StoppingService);
            ui.message("Stopping & uninstalling service...");
            let output = self.service.stop().map_err(|e| tx.abort(e))?;
            tx.service_stopped = true;
            show_output(ui, &output);
            let output = self.service.uninstall().map_err(|e| tx.abort(e))?;
            show_output(ui, &output);
        }

        tx.enter(UpdateStage::Downloading);
        ui.message("Downloading latest version...");
        fs::create_dir_all(&self.paths.base_dir).map_err(|e| tx.abort(e.into()))?;
        let bar = ui.start_progress();
        let downloaded = self.fetcher.download(latest, &self.paths.archive_path, &bar);
        bar.finish_and_clear();
        let archive = downloaded.map_err(|e| tx.abort(e))?;

        if self.verify_checksum {
            self.check_archive(ui, &check.manifest, latest, &archive)
                .map_err(|e| tx.abort(e))?;
        }

        tx.enter(UpdateStage::Extracting);
        ui.message("Extracting zip...");
        self.extractor
            .unpack(&archive, &self.paths.base_dir)
            .map_err(|e| tx.abort(e))?;

        tx.enter(UpdateStage::Relocating);
        ui.message("Copying files...");
        relocate_binary(&self.paths, latest).map_err(|e| tx.abort(e))?;

        tx.enter(UpdateStage::CleaningUp);
        ui.message("Cleaning up...");
        let warnings = cleanup_artifacts(&archive, &self.paths.extracted_dir(latest));
        for warning in &warnings {
            ui.warning(&warning.to_string());
        }

        tx.enter(UpdateStage::RestartingService);
        ui.message("Restarting service...");
        let output = self.service.install().map_err(|e| tx.abort(e))?;
        show_output(ui, &output);
        let output = self.service.start().map_err(|e| tx.abort(e))?;
        show_output(ui, &output);

        tx.enter(UpdateStage::Done);
        let outcome = match installed {
            Some(from) => {
                ui.success(&format!("Updated {} to {}", from.display(), latest.display()));
                UpdateOutcome::Updated {
                    from,
                    to: latest.clone(),
                }
            }
            None => {
                ui.success(&format!("Installed {}", latest.display()));
                UpdateOutcome::Installed { to: latest.clone() }
            }
        };

        Ok(UpdateReport { outcome, warnings })
    }

    fn check_archive(
        &self,
        ui: &mut dyn UserInterface,
        manifest: &Manifest,
        latest: &Version,
        archive: &std::path::Path,
    ) -> Result<()> {
        let url = self.fetcher.url_for(latest);
        let file_name = url.rsplit('/').next().unwrap_or(url.as_str());

        match manifest.checksum_for(file_name) {
            Some(expected) => {
                verify_checksum(archive, expected)?;
                tracing::info!("Checksum verified for {}", file_name);
            }
            None => ui.warning(&format!(
                "No checksum published for {file_name}; skipping verification"
            )),
        }
        Ok(())
    }
}

/// Echo captured service output in verbose mode.
fn show_output(ui: &mut dyn UserInterface, output: &str) {
    if !ui.output_mode().shows_command_output() {
        return;
    }
    for line in output.lines().filter(|l| !l.trim().is_empty()) {
        ui.message(&format!("  {line}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::{MockUI, OutputMode};

    #[test]
    fn stage_phrases_are_lowercase() {
        for stage in [
            UpdateStage::Checking,
            UpdateStage::StoppingService,
            UpdateStage::Downloading,
            UpdateStage::Extracting,
            UpdateStage::Relocating,
            UpdateStage::CleaningUp,
            UpdateStage::RestartingService,
            UpdateStage::Done,
        ] {
            let phrase = stage.to_string();
            assert_eq!(phrase, phrase.to_lowercase());
        }
        assert!(UpdateStage::Extracting.to_string().contains("extracting"));
    }

    #[test]
    fn service_output_only_in_verbose_mode() {
        let mut quiet = MockUI::new();
        show_output(&mut quiet, "The service was stopped.");
        assert!(quiet.messages().is_empty());

        let mut verbose = MockUI::with_mode(OutputMode::Verbose);
        show_output(&mut verbose, "The service was stopped.\n\n");
        assert_eq!(verbose.messages(), ["  The service was stopped."]);
    }

    #[test]
    fn transaction_records_stage_and_stop_state() {
        let mut tx = Transaction::new();
        tx.enter(UpdateStage::Downloading);
        tx.service_stopped = true;

        let err = tx.abort(UpdaterError::Download {
            url: "https://example.com/a.zip".into(),
            message: "HTTP 404 Not Found".into(),
        });

        assert_eq!(err.stage(), Some(UpdateStage::Downloading));
        assert!(err.requires_manual_intervention());
    }
}
