//! Update sequence tests against fake components.
//!
//! Service, manifest, probe, fetch and extract are faked and record into a
//! shared log. Relocation and cleanup run for real inside a temp directory.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use indicatif::ProgressBar;
use tempfile::TempDir;

use telegraf_updater::artifact::{sha256_file, ArtifactFetcher};
use telegraf_updater::config::UpdaterConfig;
use telegraf_updater::installer::{Extractor, InstallPaths};
use telegraf_updater::manifest::{parse_manifest, Manifest, ManifestSource};
use telegraf_updater::orchestrator::{Orchestrator, UpdateOutcome, UpdateStage};
use telegraf_updater::probe::InstalledVersionProbe;
use telegraf_updater::service::ServiceController;
use telegraf_updater::ui::MockUI;
use telegraf_updater::version::Version;
use telegraf_updater::{Result, UpdaterError};

type Log = Rc<RefCell<Vec<String>>>;

const NEW_BINARY: &[u8] = b"telegraf 1.30.0";
const OLD_BINARY: &[u8] = b"telegraf 1.28.0";
const ARCHIVE_BODY: &[u8] = b"PK fake archive";

fn artifact_url(version: &Version) -> String {
    format!(
        "https://dl.example.com/telegraf/releases/telegraf-{}_windows_amd64.zip",
        version.normalized()
    )
}

struct FakeManifest {
    log: Log,
    version: String,
    sha256: Option<String>,
    fail: bool,
}

impl ManifestSource for FakeManifest {
    fn fetch_manifest(&self) -> Result<Manifest> {
        self.log.borrow_mut().push("fetch_manifest".into());
        if self.fail {
            return Err(UpdaterError::Network {
                url: "https://www.influxdata.com/versions.json".into(),
                message: "connection refused".into(),
            });
        }
        let link = artifact_url(&Version::new(self.version.clone()));
        let sha = self
            .sha256
            .as_ref()
            .map(|s| format!(r#", "sha256": "{s}""#))
            .unwrap_or_default();
        parse_manifest(&format!(
            r#"{{"telegraf_stable": {{"version": "{}", "downloads": [
                {{"platform": "Windows", "ref": "amd64", "link": "{}"{}}}
            ]}}}}"#,
            self.version, link, sha
        ))
    }
}

enum ProbeResult {
    Installed(&'static str),
    Missing,
    Broken,
}

struct FakeProbe {
    log: Log,
    result: ProbeResult,
    binary: PathBuf,
}

impl InstalledVersionProbe for FakeProbe {
    fn probe(&self) -> Result<Version> {
        self.log.borrow_mut().push("probe".into());
        match self.result {
            ProbeResult::Installed(v) => Ok(Version::new(v)),
            ProbeResult::Missing => Err(UpdaterError::NotInstalled {
                path: self.binary.clone(),
            }),
            ProbeResult::Broken => Err(UpdaterError::Probe {
                path: self.binary.clone(),
                message: "exited with code Some(1)".into(),
            }),
        }
    }
}

struct FakeService {
    log: Log,
    binary: PathBuf,
    fail_on: Option<&'static str>,
}

impl FakeService {
    fn record(&self, action: &'static str) -> Result<String> {
        let entry = if action == "install" {
            // Capture which binary the service gets registered with.
            let content = fs::read(&self.binary).unwrap_or_default();
            format!("install({})", String::from_utf8_lossy(&content))
        } else {
            action.to_string()
        };
        self.log.borrow_mut().push(entry);
        if self.fail_on == Some(action) {
            return Err(UpdaterError::ServiceControl {
                action: action.into(),
                code: Some(1),
                output: format!("{action}: Access is denied."),
            });
        }
        Ok(String::new())
    }
}

impl ServiceController for FakeService {
    fn stop(&self) -> Result<String> {
        self.record("stop")
    }
    fn uninstall(&self) -> Result<String> {
        self.record("uninstall")
    }
    fn install(&self) -> Result<String> {
        self.record("install")
    }
    fn start(&self) -> Result<String> {
        self.record("start")
    }
}

#[derive(Clone, Copy, PartialEq)]
enum FetchMode {
    Ok,
    NotFound,
    /// Leave a directory at the archive path so removing it fails.
    Undeletable,
}

struct FakeFetcher {
    log: Log,
    mode: FetchMode,
}

impl ArtifactFetcher for FakeFetcher {
    fn download(&self, version: &Version, dest: &Path, _progress: &ProgressBar) -> Result<PathBuf> {
        let url = self.url_for(version);
        self.log.borrow_mut().push(format!("download {url}"));
        match self.mode {
            FetchMode::Ok => fs::write(dest, ARCHIVE_BODY)?,
            FetchMode::NotFound => {
                return Err(UpdaterError::Download {
                    url,
                    message: "HTTP 404 Not Found".into(),
                })
            }
            FetchMode::Undeletable => {
                fs::create_dir_all(dest)?;
                fs::write(dest.join("keep"), b"x")?;
            }
        }
        Ok(dest.to_path_buf())
    }

    fn url_for(&self, version: &Version) -> String {
        artifact_url(version)
    }
}

struct FakeExtractor {
    log: Log,
    /// Relative path of the binary inside the archive; `None` fails extraction.
    entry: Option<&'static str>,
}

impl Extractor for FakeExtractor {
    fn unpack(&self, archive: &Path, dest_dir: &Path) -> Result<()> {
        self.log.borrow_mut().push("extract".into());
        let Some(entry) = self.entry else {
            return Err(UpdaterError::Extraction {
                archive: archive.to_path_buf(),
                message: "invalid Zip archive: Could not find EOCD".into(),
            });
        };
        let path = dest_dir.join(entry);
        fs::create_dir_all(path.parent().unwrap())?;
        fs::write(path, NEW_BINARY)?;
        Ok(())
    }
}

struct Harness {
    _temp: TempDir,
    log: Log,
    paths: InstallPaths,
    installed: ProbeResult,
    latest: String,
    sha256: Option<String>,
    manifest_fails: bool,
    service_fail_on: Option<&'static str>,
    fetch: FetchMode,
    extract_entry: Option<&'static str>,
    verify_checksum: bool,
}

impl Harness {
    fn new(installed: &'static str, latest: &str) -> Self {
        let temp = TempDir::new().unwrap();
        let mut config = UpdaterConfig::default();
        config.install_base_path = temp.path().join("Telegraf");
        config.archive_dir = Some(temp.path().to_path_buf());
        let paths = InstallPaths::from_config(&config);

        fs::create_dir_all(&paths.base_dir).unwrap();
        fs::write(&paths.binary_path, OLD_BINARY).unwrap();

        Self {
            _temp: temp,
            log: Rc::new(RefCell::new(Vec::new())),
            paths,
            installed: ProbeResult::Installed(installed),
            latest: latest.to_string(),
            sha256: None,
            manifest_fails: false,
            service_fail_on: None,
            fetch: FetchMode::Ok,
            extract_entry: Some("telegraf-1.30.0/telegraf.exe"),
            verify_checksum: false,
        }
    }

    fn fresh(latest: &str) -> Self {
        let mut harness = Self::new("unused", latest);
        fs::remove_file(&harness.paths.binary_path).unwrap();
        harness.installed = ProbeResult::Missing;
        harness
    }

    fn orchestrator(&mut self) -> Orchestrator {
        let result = std::mem::replace(&mut self.installed, ProbeResult::Missing);
        Orchestrator::new(
            self.paths.clone(),
            Box::new(FakeManifest {
                log: self.log.clone(),
                version: self.latest.clone(),
                sha256: self.sha256.clone(),
                fail: self.manifest_fails,
            }),
            Box::new(FakeProbe {
                log: self.log.clone(),
                result,
                binary: self.paths.binary_path.clone(),
            }),
            Box::new(FakeService {
                log: self.log.clone(),
                binary: self.paths.binary_path.clone(),
                fail_on: self.service_fail_on,
            }),
            Box::new(FakeFetcher {
                log: self.log.clone(),
                mode: self.fetch,
            }),
            Box::new(FakeExtractor {
                log: self.log.clone(),
                entry: self.extract_entry,
            }),
        )
        .with_checksum_verification(self.verify_checksum)
    }

    fn calls(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    fn live_binary(&self) -> Vec<u8> {
        fs::read(&self.paths.binary_path).unwrap()
    }

    fn extracted_dir(&self) -> PathBuf {
        self.paths.extracted_dir(&Version::new(self.latest.clone()))
    }
}

const DOWNLOAD_1_30: &str =
    "download https://dl.example.com/telegraf/releases/telegraf-1.30.0_windows_amd64.zip";

#[test]
fn update_runs_every_step_in_order() {
    let mut h = Harness::new("v1.28.0", "v1.30.0");
    let mut ui = MockUI::new();

    let report = h.orchestrator().run(&mut ui).unwrap();

    assert_eq!(
        h.calls(),
        [
            "probe",
            "fetch_manifest",
            "stop",
            "uninstall",
            DOWNLOAD_1_30,
            "extract",
            "install(telegraf 1.30.0)",
            "start",
        ]
    );
    assert_eq!(
        report.outcome,
        UpdateOutcome::Updated {
            from: Version::new("1.28.0"),
            to: Version::new("1.30.0"),
        }
    );
    assert!(report.warnings.is_empty());
    assert_eq!(h.live_binary(), NEW_BINARY);
    assert!(!h.paths.archive_path.exists());
    assert!(!h.extracted_dir().exists());
}

#[test]
fn update_prints_progress_before_each_step() {
    let mut h = Harness::new("1.28.0", "v1.30.0");
    let mut ui = MockUI::new();

    h.orchestrator().run(&mut ui).unwrap();

    assert_eq!(
        ui.messages(),
        [
            "Current Version: v1.28.0",
            "Latest Version: v1.30.0",
            "Stopping & uninstalling service...",
            "Downloading latest version...",
            "Extracting zip...",
            "Copying files...",
            "Cleaning up...",
            "Restarting service...",
        ]
    );
    assert_eq!(ui.successes(), ["Updated v1.28.0 to v1.30.0"]);
    assert_eq!(ui.progress_bars(), 1);
}

#[test]
fn equal_versions_touch_nothing() {
    let mut h = Harness::new("v1.30.0", "v1.30.0");
    let mut ui = MockUI::new();

    let report = h.orchestrator().run(&mut ui).unwrap();

    assert_eq!(h.calls(), ["probe", "fetch_manifest"]);
    assert_eq!(
        report.outcome,
        UpdateOutcome::UpToDate {
            version: Version::new("v1.30.0")
        }
    );
    assert_eq!(ui.successes(), ["You are up to date!"]);
    assert_eq!(h.live_binary(), OLD_BINARY);
    assert!(!h.paths.archive_path.exists());
    assert_eq!(ui.progress_bars(), 0);
}

#[test]
fn prefix_style_does_not_trigger_update() {
    let mut h = Harness::new("1.30.0", "v1.30.0");
    let mut ui = MockUI::new();

    h.orchestrator().run(&mut ui).unwrap();

    assert_eq!(h.calls(), ["probe", "fetch_manifest"]);
}

#[test]
fn failed_uninstall_aborts_before_download() {
    let mut h = Harness::new("v1.28.0", "v1.30.0");
    h.service_fail_on = Some("uninstall");
    let mut ui = MockUI::new();

    let err = h.orchestrator().run(&mut ui).unwrap_err();

    assert_eq!(h.calls(), ["probe", "fetch_manifest", "stop", "uninstall"]);
    assert_eq!(err.stage(), Some(UpdateStage::StoppingService));
    assert!(err.requires_manual_intervention());
    assert!(matches!(err.root(), UpdaterError::ServiceControl { .. }));
    assert!(err.to_string().contains("Access is denied"));
    assert!(!h.paths.archive_path.exists());
    assert_eq!(h.live_binary(), OLD_BINARY);
}

#[test]
fn failed_stop_leaves_service_running() {
    let mut h = Harness::new("v1.28.0", "v1.30.0");
    h.service_fail_on = Some("stop");
    let mut ui = MockUI::new();

    let err = h.orchestrator().run(&mut ui).unwrap_err();

    assert_eq!(h.calls(), ["probe", "fetch_manifest", "stop"]);
    assert!(!err.requires_manual_intervention());
}

#[test]
fn failed_download_skips_extraction() {
    let mut h = Harness::new("v1.28.0", "v1.30.0");
    h.fetch = FetchMode::NotFound;
    let mut ui = MockUI::new();

    let err = h.orchestrator().run(&mut ui).unwrap_err();

    assert_eq!(
        h.calls(),
        ["probe", "fetch_manifest", "stop", "uninstall", DOWNLOAD_1_30]
    );
    assert_eq!(err.stage(), Some(UpdateStage::Downloading));
    assert!(err.requires_manual_intervention());
    assert!(err.to_string().contains("404"));
}

#[test]
fn failed_extraction_keeps_archive_and_skips_the_rest() {
    let mut h = Harness::new("v1.28.0", "v1.30.0");
    h.extract_entry = None;
    let mut ui = MockUI::new();

    let err = h.orchestrator().run(&mut ui).unwrap_err();

    assert_eq!(
        h.calls(),
        [
            "probe",
            "fetch_manifest",
            "stop",
            "uninstall",
            DOWNLOAD_1_30,
            "extract"
        ]
    );
    assert_eq!(err.stage(), Some(UpdateStage::Extracting));
    assert!(matches!(err.root(), UpdaterError::Extraction { .. }));
    assert!(h.paths.archive_path.exists());
    assert_eq!(h.live_binary(), OLD_BINARY);
    assert!(!ui.saw("Copying files..."));
    assert!(!ui.saw("Cleaning up..."));
}

#[test]
fn missing_binary_in_archive_is_a_relocation_error() {
    let mut h = Harness::new("v1.28.0", "v1.30.0");
    h.extract_entry = Some("telegraf/telegraf.exe");
    let mut ui = MockUI::new();

    let err = h.orchestrator().run(&mut ui).unwrap_err();

    assert_eq!(err.stage(), Some(UpdateStage::Relocating));
    assert!(matches!(err.root(), UpdaterError::Relocation { .. }));
    assert!(err.to_string().contains("manual intervention"));
    assert!(!h.calls().iter().any(|c| c.starts_with("install")));
}

#[test]
fn cleanup_failure_is_reported_but_not_fatal() {
    let mut h = Harness::new("v1.28.0", "v1.30.0");
    h.fetch = FetchMode::Undeletable;
    let mut ui = MockUI::new();

    let report = h.orchestrator().run(&mut ui).unwrap();

    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].path, h.paths.archive_path);
    assert!(ui.warnings().iter().any(|w| w.contains("telegraf.zip")));
    assert_eq!(h.calls().last().map(String::as_str), Some("start"));
    assert_eq!(h.live_binary(), NEW_BINARY);
}

#[test]
fn failed_restart_demands_manual_intervention() {
    let mut h = Harness::new("v1.28.0", "v1.30.0");
    h.service_fail_on = Some("start");
    let mut ui = MockUI::new();

    let err = h.orchestrator().run(&mut ui).unwrap_err();

    assert_eq!(err.stage(), Some(UpdateStage::RestartingService));
    assert!(err.requires_manual_intervention());
    assert_eq!(h.live_binary(), NEW_BINARY);
}

#[test]
fn missing_binary_installs_fresh() {
    let mut h = Harness::fresh("v1.30.0");
    let mut ui = MockUI::new();

    let report = h.orchestrator().run(&mut ui).unwrap();

    assert_eq!(
        h.calls(),
        [
            "probe",
            "fetch_manifest",
            DOWNLOAD_1_30,
            "extract",
            "install(telegraf 1.30.0)",
            "start",
        ]
    );
    assert_eq!(
        report.outcome,
        UpdateOutcome::Installed {
            to: Version::new("v1.30.0")
        }
    );
    assert!(ui.saw("Current Version: not installed"));
    assert!(!ui.saw("Stopping & uninstalling service..."));
}

#[test]
fn broken_binary_aborts_during_check() {
    let mut h = Harness::new("unused", "v1.30.0");
    h.installed = ProbeResult::Broken;
    let mut ui = MockUI::new();

    let err = h.orchestrator().run(&mut ui).unwrap_err();

    assert_eq!(h.calls(), ["probe"]);
    assert_eq!(err.stage(), Some(UpdateStage::Checking));
    assert!(matches!(err.root(), UpdaterError::Probe { .. }));
    assert!(!err.requires_manual_intervention());
}

#[test]
fn manifest_failure_aborts_during_check() {
    let mut h = Harness::new("v1.28.0", "v1.30.0");
    h.manifest_fails = true;
    let mut ui = MockUI::new();

    let err = h.orchestrator().run(&mut ui).unwrap_err();

    assert_eq!(h.calls(), ["probe", "fetch_manifest"]);
    assert!(matches!(err.root(), UpdaterError::Network { .. }));
    assert!(!err.requires_manual_intervention());
}

#[test]
fn newer_local_build_is_replaced_with_warning() {
    let mut h = Harness::new("v1.31.0", "v1.30.0");
    let mut ui = MockUI::new();

    let report = h.orchestrator().run(&mut ui).unwrap();

    assert!(matches!(report.outcome, UpdateOutcome::Updated { .. }));
    assert!(ui.warnings().iter().any(|w| w.contains("newer than published")));
}

#[test]
fn check_reports_without_side_effects() {
    let mut h = Harness::new("v1.28.0", "v1.30.0");

    let check = h.orchestrator().check().unwrap();

    assert_eq!(check.installed, Some(Version::new("1.28.0")));
    assert_eq!(check.latest.raw(), "v1.30.0");
    assert!(check.decision.needs_update());
    assert_eq!(h.calls(), ["probe", "fetch_manifest"]);
}

#[test]
fn matching_checksum_passes() {
    let mut h = Harness::new("v1.28.0", "v1.30.0");
    let scratch = h.paths.base_dir.join("scratch");
    fs::write(&scratch, ARCHIVE_BODY).unwrap();
    h.sha256 = Some(sha256_file(&scratch).unwrap());
    fs::remove_file(&scratch).unwrap();
    h.verify_checksum = true;
    let mut ui = MockUI::new();

    h.orchestrator().run(&mut ui).unwrap();

    assert!(ui.warnings().is_empty());
    assert_eq!(h.live_binary(), NEW_BINARY);
}

#[test]
fn checksum_mismatch_aborts_and_keeps_archive() {
    let mut h = Harness::new("v1.28.0", "v1.30.0");
    h.sha256 = Some("00".repeat(32));
    h.verify_checksum = true;
    let mut ui = MockUI::new();

    let err = h.orchestrator().run(&mut ui).unwrap_err();

    assert!(matches!(err.root(), UpdaterError::ChecksumMismatch { .. }));
    assert_eq!(err.stage(), Some(UpdateStage::Downloading));
    assert!(!h.calls().contains(&"extract".to_string()));
    assert!(h.paths.archive_path.exists());
}

#[test]
fn missing_checksum_is_a_warning() {
    let mut h = Harness::new("v1.28.0", "v1.30.0");
    h.verify_checksum = true;
    let mut ui = MockUI::new();

    h.orchestrator().run(&mut ui).unwrap();

    assert!(ui.warnings().iter().any(|w| w.contains("No checksum")));
    assert_eq!(h.live_binary(), NEW_BINARY);
}

#[test]
fn checksum_ignored_when_disabled() {
    let mut h = Harness::new("v1.28.0", "v1.30.0");
    h.sha256 = Some("00".repeat(32));
    let mut ui = MockUI::new();

    h.orchestrator().run(&mut ui).unwrap();

    assert_eq!(h.live_binary(), NEW_BINARY);
}
