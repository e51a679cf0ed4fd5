//! Check command implementation.
//!
//! The `telegraf-updater check` command compares versions without touching
//! the service or the filesystem.

use crate::config::{load_config, ConfigOverrides};
use crate::error::Result;
use crate::orchestrator::{Orchestrator, UpdateCheck};
use crate::ui::UserInterface;
use crate::version::UpdateDecision;

use super::dispatcher::{Command, CommandResult};

/// The check command implementation.
pub struct CheckCommand {
    overrides: ConfigOverrides,
}

impl CheckCommand {
    /// Create a new check command.
    pub fn new(overrides: ConfigOverrides) -> Self {
        Self { overrides }
    }
}

/// Print the outcome of a version check.
pub fn report_check(check: &UpdateCheck, ui: &mut dyn UserInterface) {
    match &check.installed {
        Some(installed) => ui.message(&format!("Current Version: {}", installed.display())),
        None => ui.message("Current Version: not installed"),
    }
    ui.message(&format!("Latest Version: {}", check.latest.display()));

    match &check.decision {
        UpdateDecision::UpToDate { .. } => ui.success("You are up to date!"),
        UpdateDecision::UpdateRequired { installed, latest } => {
            if check.decision.is_downgrade() {
                ui.warning(&format!(
                    "Installed {} is newer than published {}; updating would downgrade",
                    installed.display(),
                    latest.display()
                ));
            } else {
                ui.message(&format!(
                    "Update available: {} -> {}",
                    installed.display(),
                    latest.display()
                ));
            }
        }
        UpdateDecision::FreshInstall { latest } => {
            ui.message(&format!(
                "Telegraf is not installed; updating would install {}",
                latest.display()
            ));
        }
    }
}

impl Command for CheckCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = load_config(&self.overrides)?;
        let orchestrator = Orchestrator::from_config(&config)?;
        let check = orchestrator.check()?;
        report_check(&check, ui);
        Ok(CommandResult::success())
    }
}
