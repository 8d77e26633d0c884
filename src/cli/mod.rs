//! CLI module for tinyenv
//!
//! Handles command-line argument parsing and command dispatch.

use std::process::ExitCode;

mod args;
pub mod commands;
pub mod latest;
pub mod plugin;
pub mod style;
pub mod tables;

pub use args::{Cli, Commands, LanguageCli, LanguageCommand};

/// Print a clap error or help text and pick the exit code.
///
/// `--help` and `--version` exit 0; every usage error exits 1.
pub fn clap_exit(err: &clap::Error) -> ExitCode {
    let _ = err.print();
    if err.use_stderr() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
