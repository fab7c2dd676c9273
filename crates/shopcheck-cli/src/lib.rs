//! shopcheck CLI library
//!
//! Argument definitions, command handlers and console output for the
//! `shopcheck` binary.

mod commands;
mod error;
pub mod handlers;
mod output;

pub use commands::{
    BackendArg, Cli, ColorArg, Commands, ConfigArgs, ListArgs, ReportArg, RunArgs, SuiteArg,
};
pub use error::{CliError, CliResult};
pub use output::ProgressReporter;
