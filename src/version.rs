//! Version strings and the update decision.
//!
//! Release versions arrive in two conventions: the manifest reports `v1.30.0`
//! while `telegraf --version` prints `1.30.0`. [`Version`] keeps the raw text
//! it was created from but only ever compares the normalized form, so the two
//! conventions cannot be compared against each other by accident.

use std::cmp::Ordering;
use std::fmt;

/// Current version of the updater itself.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Canonicalize a version string: surrounding whitespace and any leading
/// `v`/`V` prefix are removed.
///
/// Idempotent: `normalize(&normalize(v)) == normalize(v)`.
///
/// ```
/// use telegraf_updater::version::normalize;
///
/// assert_eq!(normalize("v1.30.0"), "1.30.0");
/// assert_eq!(normalize("1.30.0"), "1.30.0");
/// ```
pub fn normalize(version: &str) -> String {
    version
        .trim_start_matches(|c: char| c == 'v' || c == 'V' || c.is_whitespace())
        .trim_end()
        .to_string()
}

/// A release version as reported by some source.
#[derive(Debug, Clone, Eq)]
pub struct Version {
    raw: String,
    normalized: String,
}

impl Version {
    /// Wrap a version string exactly as it was received.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let normalized = normalize(&raw);
        Self { raw, normalized }
    }

    /// The text as received, untouched.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Canonical form without prefix, used for paths and URLs.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Display form with a `v` prefix.
    pub fn display(&self) -> String {
        format!("v{}", self.normalized)
    }

    /// Whether normalization left nothing behind.
    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    /// Numeric comparison of dotted components.
    ///
    /// Non-numeric components (including pre-release suffixes) are ignored, so
    /// this is only used for reporting, never to gate an update.
    pub fn compare_numeric(&self, other: &Version) -> Ordering {
        let parts = |v: &str| -> Vec<u64> {
            v.split(['.', '-', '+'])
                .take(3)
                .filter_map(|s| s.parse().ok())
                .collect()
        };

        let ours = parts(&self.normalized);
        let theirs = parts(&other.normalized);
        let len = ours.len().max(theirs.len());

        for i in 0..len {
            let a = ours.get(i).copied().unwrap_or(0);
            let b = theirs.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                other => return other,
            }
        }

        Ordering::Equal
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.normalized == other.normalized
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<&str> for Version {
    fn from(raw: &str) -> Self {
        Version::new(raw)
    }
}

/// Outcome of comparing the installed version against the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateDecision {
    /// Installed and latest versions are equal.
    UpToDate { version: Version },
    /// Versions differ; the latest release replaces the installed one.
    UpdateRequired { installed: Version, latest: Version },
    /// Nothing is installed yet.
    FreshInstall { latest: Version },
}

impl UpdateDecision {
    /// Whether the update sequence has to run.
    pub fn needs_update(&self) -> bool {
        !matches!(self, UpdateDecision::UpToDate { .. })
    }

    /// Whether this update would replace a newer local build with an older release.
    pub fn is_downgrade(&self) -> bool {
        match self {
            UpdateDecision::UpdateRequired { installed, latest } => {
                installed.compare_numeric(latest) == Ordering::Greater
            }
            _ => false,
        }
    }
}

/// Decide whether an update is needed.
///
/// Only equality of the normalized forms is checked: any difference, in either
/// direction, requires an update. `None` for `installed` means no binary is
/// present.
pub fn decide_update(installed: Option<&Version>, latest: &Version) -> UpdateDecision {
    match installed {
        None => UpdateDecision::FreshInstall {
            latest: latest.clone(),
        },
        Some(installed) if installed == latest => UpdateDecision::UpToDate {
            version: latest.clone(),
        },
        Some(installed) => UpdateDecision::UpdateRequired {
            installed: installed.clone(),
            latest: latest.clone(),
        },
    }
}
