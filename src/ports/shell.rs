//! Command runner port for executing shell command sequences.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

use crate::error::ExecutionError;

/// Outcome of one execution: the concatenated stdout on success.
pub type ExecutionOutcome = Result<String, ExecutionError>;

/// Boxed future type alias used by [`CommandRunner`] to keep the trait dyn-compatible.
pub type RunFuture<'a> = Pin<Box<dyn Future<Output = ExecutionOutcome> + Send + 'a>>;

/// A single shell session to execute.
///
/// The environment is the complete environment of the child process. Callers
/// resolve it up front (see [`crate::env::resolve`]); nothing is inherited
/// implicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    /// Directory the shell starts in.
    pub working_directory: PathBuf,
    /// Shell command lines, run in order.
    pub commands: Vec<String>,
    /// Full environment of the shell process.
    pub environment: BTreeMap<String, String>,
}

impl ExecutionRequest {
    /// Creates a request with an empty environment.
    pub fn new<I, S>(working_directory: impl Into<PathBuf>, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            working_directory: working_directory.into(),
            commands: commands.into_iter().map(Into::into).collect(),
            environment: BTreeMap::new(),
        }
    }

    /// Replaces the environment of the request.
    #[must_use]
    pub fn with_environment(mut self, environment: BTreeMap<String, String>) -> Self {
        self.environment = environment;
        self
    }

    /// The script written to the shell's standard input.
    #[must_use]
    pub fn script(&self) -> String {
        self.commands.join("\n")
    }
}

/// Runs command sequences in a fresh shell process.
///
/// Each call owns its process; implementations keep no state between calls.
pub trait CommandRunner: Send + Sync {
    /// Executes the request and resolves once the shell has terminated.
    ///
    /// When `cancel` fires the shell and everything it started are killed and
    /// the future resolves with [`ExecutionError::Cancelled`].
    ///
    /// # Errors
    ///
    /// Returns an error if the shell cannot be spawned, exits with a non-zero
    /// status, is cancelled, or its pipes fail.
    fn run<'a>(
        &'a self,
        request: &'a ExecutionRequest,
        cancel: &'a CancellationToken,
    ) -> RunFuture<'a>;
}
