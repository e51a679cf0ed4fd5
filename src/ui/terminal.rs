//! Terminal UI.

use console::Term;
use indicatif::ProgressBar;
use std::io::Write;

use super::{download_bar, should_use_colors, OutputMode, UpdaterTheme, UserInterface};

/// Terminal UI implementation.
///
/// Progress goes to stdout; warnings and errors go to stderr so a redirected
/// log of a scheduled run still shows failures.
pub struct TerminalUI {
    out: Term,
    err: Term,
    theme: UpdaterTheme,
    mode: OutputMode,
}

impl TerminalUI {
    /// Create a new terminal UI.
    pub fn new(mode: OutputMode) -> Self {
        let theme = if should_use_colors() {
            UpdaterTheme::new()
        } else {
            UpdaterTheme::plain()
        };

        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            theme,
            mode,
        }
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_progress() {
            writeln!(self.out, "{}", msg).ok();
        }
    }

    fn success(&mut self, msg: &str) {
        writeln!(self.out, "{}", self.theme.format_success(msg)).ok();
    }

    fn warning(&mut self, msg: &str) {
        writeln!(self.err, "{}", self.theme.format_warning(msg)).ok();
    }

    fn error(&mut self, msg: &str) {
        writeln!(self.err, "{}", self.theme.format_error(msg)).ok();
    }

    fn start_progress(&mut self) -> ProgressBar {
        if self.mode.shows_progress() && self.is_interactive() {
            download_bar()
        } else {
            ProgressBar::hidden()
        }
    }

    fn is_interactive(&self) -> bool {
        self.out.is_term() && !crate::shell::is_ci()
    }
}
