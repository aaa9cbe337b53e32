//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::adapters::live::ShellConfig;
use crate::env::{parse_assignment, EnvError, EnvOptions};

/// Top-level CLI parser for `shell-harness`.
#[derive(Debug, Parser)]
#[command(
    name = "shell-harness",
    version,
    about = "Run shell command sequences and check they succeed"
)]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run commands in one shell session.
    Run(RunArgs),
    /// Run every scenario of a suite file.
    Suite(SuiteArgs),
}

/// Arguments of `shell-harness run`.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Working directory of the shell.
    #[arg(long, short = 'C', value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,
    /// Kill the shell and fail after this many seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
    /// Shell and environment options.
    #[command(flatten)]
    pub shell: ShellArgs,
    /// Command lines, fed to the shell in order.
    #[arg(value_name = "COMMAND", trailing_var_arg = true)]
    pub commands: Vec<String>,
}

/// Arguments of `shell-harness suite`.
#[derive(Debug, Args)]
pub struct SuiteArgs {
    /// Suite file (YAML).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
    /// Print the report as JSON; mirrored output goes to stderr.
    #[arg(long)]
    pub json: bool,
    /// Shell and environment options.
    #[command(flatten)]
    pub shell: ShellArgs,
}

/// Options shared by every subcommand that launches a shell.
#[derive(Debug, Args)]
pub struct ShellArgs {
    /// Shell program; it is started with `-s` and reads commands from stdin.
    #[arg(long = "shell", env = "SHELL_HARNESS_SHELL", default_value = "bash")]
    pub program: String,
    /// Set a variable in the shell environment.
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_env)]
    pub env: Vec<(String, String)>,
    /// Load variables from a dotenv file (repeatable, applied in order).
    #[arg(long = "env-file", value_name = "FILE")]
    pub env_files: Vec<PathBuf>,
    /// Do not inherit the harness's own environment.
    #[arg(long)]
    pub clean_env: bool,
}

impl ShellArgs {
    /// Shell configuration selected on the command line.
    #[must_use]
    pub fn shell_config(&self) -> ShellConfig {
        ShellConfig::stdin_script(self.program.clone())
    }

    /// Environment sources selected on the command line.
    #[must_use]
    pub fn env_options(&self) -> EnvOptions {
        EnvOptions {
            clean: self.clean_env,
            env_files: self.env_files.clone(),
            overrides: self.env.clone(),
        }
    }
}

fn parse_env(raw: &str) -> Result<(String, String), EnvError> {
    parse_assignment(raw)
}
