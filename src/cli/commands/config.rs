//! Config command implementation.
//!
//! The `telegraf-updater config` command shows resolved configuration.

use crate::cli::args::ConfigArgs;
use crate::config::{default_config_path, load_config, ConfigOverrides};
use crate::error::{Result, UpdaterError};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The config command implementation.
pub struct ConfigCommand {
    overrides: ConfigOverrides,
    args: ConfigArgs,
}

impl ConfigCommand {
    /// Create a new config command.
    pub fn new(overrides: ConfigOverrides, args: ConfigArgs) -> Self {
        Self { overrides, args }
    }
}

impl Command for ConfigCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = load_config(&self.overrides)?;

        // Show which file was read, if any
        let source = self
            .overrides
            .config_path
            .clone()
            .or_else(|| default_config_path().filter(|p| p.is_file()));
        if let Some(path) = source {
            ui.message(&format!("# {}", path.display()));
        }

        if self.args.json {
            let json =
                serde_json::to_string_pretty(&config).map_err(|e| UpdaterError::Other(e.into()))?;
            ui.message(&json);
        } else {
            let yaml = serde_yaml::to_string(&config).map_err(|e| UpdaterError::Other(e.into()))?;
            ui.message(&yaml);
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn overrides_for(temp: &TempDir, content: &str) -> ConfigOverrides {
        let path = temp.path().join("config.yml");
        fs::write(&path, content).unwrap();
        ConfigOverrides {
            config_path: Some(path),
            ..Default::default()
        }
    }

    #[test]
    fn shows_config_path_and_yaml() {
        let temp = TempDir::new().unwrap();
        let cmd = ConfigCommand::new(
            overrides_for(&temp, "install_base_path: /opt/telegraf\n"),
            ConfigArgs::default(),
        );
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert_eq!(result.exit_code, 0);
        assert!(ui.messages()[0].contains("config.yml"));
        assert!(ui.saw("install_base_path: /opt/telegraf"));
        assert!(ui.saw("binary_name: telegraf.exe"));
    }

    #[test]
    fn json_output() {
        let temp = TempDir::new().unwrap();
        let cmd = ConfigCommand::new(
            overrides_for(&temp, "verify_checksum: true\n"),
            ConfigArgs { json: true },
        );
        let mut ui = MockUI::new();

        cmd.execute(&mut ui).unwrap();

        let json = ui.messages().last().unwrap();
        let value: serde_json::Value = serde_json::from_str(json).unwrap();
        assert_eq!(value["verify_checksum"], serde_json::Value::Bool(true));
    }

    #[test]
    fn cli_base_path_wins() {
        let temp = TempDir::new().unwrap();
        let mut overrides = overrides_for(&temp, "install_base_path: /opt/telegraf\n");
        overrides.install_base_path = Some(PathBuf::from("/srv/telegraf"));
        let cmd = ConfigCommand::new(overrides, ConfigArgs::default());
        let mut ui = MockUI::new();

        cmd.execute(&mut ui).unwrap();

        assert!(ui.saw("install_base_path: /srv/telegraf"));
    }

    #[test]
    fn invalid_config_is_an_error() {
        let temp = TempDir::new().unwrap();
        let cmd = ConfigCommand::new(
            overrides_for(&temp, "http_timeout_secs: 0\n"),
            ConfigArgs::default(),
        );
        let mut ui = MockUI::new();

        let err = cmd.execute(&mut ui).unwrap_err();
        assert!(err.is_config_error());
    }
}
