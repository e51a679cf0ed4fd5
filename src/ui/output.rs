//! Output verbosity.

/// Output verbosity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Show all output including captured service output.
    Verbose,
    /// Show progress and status only.
    #[default]
    Normal,
    /// Show only the final status line and errors.
    Quiet,
}

impl OutputMode {
    /// Check if this mode shows captured subprocess output.
    pub fn shows_command_output(&self) -> bool {
        matches!(self, Self::Verbose)
    }

    /// Check if this mode shows step-by-step progress lines.
    pub fn shows_progress(&self) -> bool {
        matches!(self, Self::Verbose | Self::Normal)
    }
}
