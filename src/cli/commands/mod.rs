//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. Running with no subcommand is the
//! same as `telegraf-updater update`, so a scheduled task only needs the
//! binary path.

pub mod check;
pub mod completions;
pub mod config;
pub mod dispatcher;
pub mod update;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
