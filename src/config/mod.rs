//! Configuration loading, parsing, and validation.
//!
//! - Schema definitions in [`schema`]
//! - File discovery, environment and CLI overrides in [`loader`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use telegraf_updater::config::{resolve_config, ConfigOverrides};
//! use tempfile::TempDir;
//!
//! let temp = TempDir::new().unwrap();
//! let path = temp.path().join("config.yml");
//! std::fs::write(&path, "install_base_path: /opt/telegraf\nbinary_name: telegraf").unwrap();
//!
//! let overrides = ConfigOverrides { config_path: Some(path), ..Default::default() };
//! let config = resolve_config(&overrides, None, &HashMap::new()).unwrap();
//! assert_eq!(config.binary_name, "telegraf");
//! ```

pub mod loader;
pub mod schema;
pub mod validator;

pub use loader::{
    apply_env_overrides, default_config_path, load_config, load_config_file, parse_config,
    resolve_config, ConfigOverrides, ENV_ARCHIVE_DIR, ENV_INSTALL_BASE_PATH, ENV_MANIFEST_URL,
};
pub use schema::{ExtractorKind, UpdaterConfig};
pub use validator::{validate, validate_config, ValidationError};
