//! Subprocess execution and host environment checks.

pub mod command;
pub mod platform;

pub use command::{execute, CommandOptions, CommandResult};
pub use platform::{is_ci, is_elevated};
