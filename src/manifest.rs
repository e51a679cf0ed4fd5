//! Remote version manifest.
//!
//! The manifest is a JSON document published by InfluxData describing the
//! latest stable release of each product. Only the Telegraf entry matters
//! here:
//!
//! ```json
//! {
//!   "telegraf_stable": {
//!     "name": "Telegraf",
//!     "version": "v1.30.0",
//!     "downloads": [
//!       { "platform": "Windows", "ref": "amd64", "code": ["wget ..."],
//!         "link": "https://dl.influxdata.com/...zip", "sha256": "..." }
//!     ]
//!   }
//! }
//! ```
//!
//! The version string is kept exactly as published; normalization happens
//! only when comparing or building URLs.

use crate::error::{Result, UpdaterError};
use crate::http::build_client;
use crate::version::Version;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The parts of the version manifest this crate reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Latest stable Telegraf release.
    pub telegraf_stable: ReleaseChannel,
}

/// One product's release entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseChannel {
    /// Product name.
    #[serde(default)]
    pub name: String,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Latest version, e.g. `v1.30.0`.
    pub version: String,
    /// Per-platform download descriptors.
    #[serde(default)]
    pub downloads: Vec<DownloadDescriptor>,
}

/// A per-platform download entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadDescriptor {
    /// Platform id, e.g. `Windows`.
    #[serde(default)]
    pub platform: String,
    /// Reference label, e.g. `amd64`.
    #[serde(rename = "ref", default)]
    pub reference: String,
    /// Install snippets.
    #[serde(default)]
    pub code: Vec<String>,
    /// Direct link to the artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// SHA-256 of the artifact, hex encoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl Manifest {
    /// Latest stable version, untransformed.
    pub fn latest_version(&self) -> Version {
        Version::new(self.telegraf_stable.version.clone())
    }

    /// Checksum of the download whose link ends with `file_name`.
    pub fn checksum_for(&self, file_name: &str) -> Option<&str> {
        self.telegraf_stable
            .downloads
            .iter()
            .find(|d| {
                d.link
                    .as_deref()
                    .is_some_and(|link| link.rsplit('/').next() == Some(file_name))
            })
            .and_then(|d| d.sha256.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

/// Parse a manifest body.
///
/// # Errors
///
/// Returns `Parse` if the body is not JSON, lacks the Telegraf entry, or
/// carries an empty version.
pub fn parse_manifest(body: &str) -> Result<Manifest> {
    let manifest: Manifest = serde_json::from_str(body).map_err(|e| UpdaterError::Parse {
        what: "version manifest".to_string(),
        message: e.to_string(),
    })?;

    if manifest.latest_version().is_empty() {
        return Err(UpdaterError::Parse {
            what: "version manifest".to_string(),
            message: "telegraf_stable.version is empty".to_string(),
        });
    }

    Ok(manifest)
}

/// Source of the remote manifest.
pub trait ManifestSource {
    /// Fetch and parse the manifest. Never cached.
    fn fetch_manifest(&self) -> Result<Manifest>;

    /// Fetch the latest stable version.
    fn fetch_latest_version(&self) -> Result<Version> {
        Ok(self.fetch_manifest()?.latest_version())
    }
}

/// Fetches the manifest over HTTPS.
pub struct HttpManifestClient {
    client: Client,
    url: String,
}

impl HttpManifestClient {
    /// Create a client for `url` with the given request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            url: url.into(),
        })
    }

    /// The manifest URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ManifestSource for HttpManifestClient {
    fn fetch_manifest(&self) -> Result<Manifest> {
        tracing::debug!("Fetching manifest from {}", self.url);

        let network = |message: String| UpdaterError::Network {
            url: self.url.clone(),
            message,
        };

        let response = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(network(format!("HTTP {}", status)));
        }

        let body = response
            .text()
            .map_err(|e| network(format!("failed to read body: {e}")))?;

        parse_manifest(&body)
    }
}
