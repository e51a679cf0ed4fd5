//! telegraf-updater - Unattended updates for the Telegraf agent service.
//!
//! Compares the installed Telegraf binary against the latest stable release
//! published in InfluxData's version manifest and, when they differ, stops
//! the service, downloads and unpacks the release, swaps the binary and
//! restarts the service.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, parsing, and validation
//! - [`error`] - Error types and result aliases
//! - [`version`] - Version normalization and the update decision
//! - [`manifest`] - Remote version manifest client
//! - [`probe`] - Installed version probe
//! - [`artifact`] - Release archive download and checksum verification
//! - [`service`] - OS service control through the managed binary
//! - [`installer`] - Extraction, binary relocation, and cleanup
//! - [`orchestrator`] - The update sequence
//! - [`http`] - Shared HTTP client setup
//! - [`shell`] - Subprocess execution with timeouts
//! - [`ui`] - Terminal output and progress bars
//!
//! # Example
//!
//! ```
//! use telegraf_updater::version::{decide_update, Version};
//!
//! let installed = Version::new("1.30.0");
//! let latest = Version::new("v1.30.0");
//! assert!(!decide_update(Some(&installed), &latest).needs_update());
//! ```
//!
//! For the full update sequence against fakes, see the integration tests.

pub mod artifact;
pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod installer;
pub mod manifest;
pub mod orchestrator;
pub mod probe;
pub mod service;
pub mod shell;
pub mod ui;
pub mod version;

pub use error::{Result, UpdaterError};
