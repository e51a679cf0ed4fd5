//! User-facing terminal output.
//!
//! This module provides:
//! - [`UserInterface`] trait for output abstraction
//! - [`TerminalUI`] for real terminals and redirected output
//! - [`MockUI`] for capturing output in tests
//! - A download progress bar built on `indicatif`
//!
//! Progress lines shown here are separate from `tracing` logs: they are the
//! human-readable account of what the updater is doing, printed before each
//! step runs.
//!
//! # Example
//!
//! ```
//! use telegraf_updater::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.message("Downloading latest version...");
//! ui.success("Telegraf updated to v1.30.0");
//! assert_eq!(ui.messages(), ["Downloading latest version..."]);
//! ```

pub mod mock;
pub mod output;
pub mod progress;
pub mod terminal;
pub mod theme;

pub use mock::MockUI;
pub use output::OutputMode;
pub use progress::{download_bar, set_download_length};
pub use terminal::TerminalUI;
pub use theme::{should_use_colors, UpdaterTheme};

use indicatif::ProgressBar;

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Display a message to the user.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message.
    fn error(&mut self, msg: &str);

    /// Create a progress indicator for a download.
    ///
    /// The fetcher sizes it once the response length is known. Implementations
    /// that cannot draw return [`ProgressBar::hidden`].
    fn start_progress(&mut self) -> ProgressBar;

    /// Check if running in interactive mode.
    fn is_interactive(&self) -> bool;
}
