//! Core library entry for the `shell-harness` CLI.
//!
//! The heart of the crate is [`adapters::live::LiveCommandRunner`]: it feeds
//! a list of command lines to one shell process, mirrors the shell's output
//! live, and resolves to the captured stdout or a structured
//! [`error::ExecutionError`]. Suites of such sessions are described in YAML
//! and run by [`suite::Suite`].

pub mod adapters;
pub mod capture;
pub mod cli;
pub mod commands;
pub mod deadline;
pub mod env;
pub mod error;
pub mod logging;
pub mod ports;
pub mod suite;

use clap::Parser;

pub use adapters::live::{LiveCommandRunner, ShellConfig};
pub use error::ExecutionError;
pub use ports::shell::{CommandRunner, ExecutionOutcome, ExecutionRequest};

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            // --help and --version
            return err.print().map_err(|e| e.to_string());
        }
        Err(err) => return Err(err.to_string()),
    };
    commands::dispatch(&cli.command)
}
