//! Update command implementation.
//!
//! The `telegraf-updater update` command (also the default) runs the full
//! stop, download, replace and restart cycle when a newer release exists.

use crate::config::{load_config, ConfigOverrides, UpdaterConfig};
use crate::error::{Result, UpdaterError};
use crate::orchestrator::Orchestrator;
use crate::service::ServiceAction;
use crate::shell::is_elevated;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The update command implementation.
pub struct UpdateCommand {
    overrides: ConfigOverrides,
}

impl UpdateCommand {
    /// Create a new update command.
    pub fn new(overrides: ConfigOverrides) -> Self {
        Self { overrides }
    }
}

/// Tell the operator how to bring the service back after a failed update.
///
/// The advice depends on whether the service registration survived: a failed
/// `uninstall` or `start` leaves it in place, anything else leaves it removed.
pub fn report_manual_intervention(
    err: &UpdaterError,
    config: &UpdaterConfig,
    ui: &mut dyn UserInterface,
) {
    if !err.requires_manual_intervention() {
        return;
    }
    let binary = config.binary_path();
    let still_registered = matches!(
        err.root(),
        UpdaterError::ServiceControl { action, .. }
            if action == ServiceAction::Uninstall.as_str() || action == ServiceAction::Start.as_str()
    );
    if still_registered {
        ui.warning(&format!(
            "The Telegraf service is stopped but still registered. Run `\"{0}\" --service start` \
             to bring it back, or `\"{0}\" --service uninstall` before retrying the update",
            binary.display()
        ));
    } else {
        ui.warning(&format!(
            "The Telegraf service is stopped. Restore {0} if needed, then run \
             `\"{0}\" --service install` and `\"{0}\" --service start`",
            binary.display()
        ));
    }
}

impl Command for UpdateCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = load_config(&self.overrides)?;

        if !is_elevated() {
            tracing::warn!("Running without administrator rights");
            ui.warning("Not running as administrator; service control will likely fail");
        }

        let orchestrator = Orchestrator::from_config(&config)?;
        match orchestrator.run(ui) {
            Ok(report) => {
                tracing::info!("Update run finished: {:?}", report.outcome);
                Ok(CommandResult::success())
            }
            Err(e) => {
                report_manual_intervention(&e, &config, ui);
                Err(e)
            }
        }
    }
}
