//! Error type for shell executions.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why an execution did not produce a successful result.
///
/// Every variant that is raised after the shell started carries the raw
/// stdout/stderr chunks captured up to that point, in arrival order.
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// The shell process could not be created.
    #[error("Failed to spawn '{shell}' in {}: {source}", directory.display())]
    SpawnFailure {
        /// Shell program that was launched.
        shell: String,
        /// Requested working directory.
        directory: PathBuf,
        /// Error reported by the operating system.
        #[source]
        source: io::Error,
    },

    /// The shell terminated with a non-zero status.
    #[error("Commands exited with code: {code}")]
    NonZeroExit {
        /// Exit status, `128 + signal` when the shell was killed by a signal.
        code: i32,
        /// Captured stdout chunks.
        stdout_chunks: Vec<String>,
        /// Captured stderr chunks.
        stderr_chunks: Vec<String>,
    },

    /// The execution was cancelled and the shell's process group killed.
    #[error("Commands were cancelled before the shell exited")]
    Cancelled {
        /// Captured stdout chunks.
        stdout_chunks: Vec<String>,
        /// Captured stderr chunks.
        stderr_chunks: Vec<String>,
    },

    /// Reading from the shell's pipes or waiting on it failed.
    #[error("I/O error while running commands: {source}")]
    Io {
        /// Underlying error.
        #[source]
        source: io::Error,
        /// Captured stdout chunks.
        stdout_chunks: Vec<String>,
        /// Captured stderr chunks.
        stderr_chunks: Vec<String>,
    },
}

impl ExecutionError {
    /// Human-readable summary of the failure.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Exit status of the shell, if it exited on its own.
    #[must_use]
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::NonZeroExit { code, .. } => Some(*code),
            Self::SpawnFailure { .. } | Self::Cancelled { .. } | Self::Io { .. } => None,
        }
    }

    /// Stdout chunks captured before the failure.
    #[must_use]
    pub fn stdout_chunks(&self) -> &[String] {
        match self {
            Self::SpawnFailure { .. } => &[],
            Self::NonZeroExit { stdout_chunks, .. }
            | Self::Cancelled { stdout_chunks, .. }
            | Self::Io { stdout_chunks, .. } => stdout_chunks,
        }
    }

    /// Stderr chunks captured before the failure.
    #[must_use]
    pub fn stderr_chunks(&self) -> &[String] {
        match self {
            Self::SpawnFailure { .. } => &[],
            Self::NonZeroExit { stderr_chunks, .. }
            | Self::Cancelled { stderr_chunks, .. }
            | Self::Io { stderr_chunks, .. } => stderr_chunks,
        }
    }

    /// Concatenated stdout captured before the failure.
    #[must_use]
    pub fn stdout(&self) -> String {
        self.stdout_chunks().concat()
    }

    /// Concatenated stderr captured before the failure.
    #[must_use]
    pub fn stderr(&self) -> String {
        self.stderr_chunks().concat()
    }

    /// Returns `true` for spawn failures.
    #[must_use]
    pub fn is_spawn_failure(&self) -> bool {
        matches!(self, Self::SpawnFailure { .. })
    }

    /// Returns `true` when the execution was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_zero_exit_reports_code_and_chunks() {
        let err = ExecutionError::NonZeroExit {
            code: 3,
            stdout_chunks: vec!["one\n".into(), "two\n".into()],
            stderr_chunks: vec!["oops\n".into()],
        };
        assert_eq!(err.message(), "Commands exited with code: 3");
        assert_eq!(err.exit_code(), Some(3));
        assert_eq!(err.stdout(), "one\ntwo\n");
        assert_eq!(err.stderr_chunks(), ["oops\n"]);
        assert!(!err.is_spawn_failure());
    }

    #[test]
    fn spawn_failure_has_no_code_or_chunks() {
        let err = ExecutionError::SpawnFailure {
            shell: "bash".into(),
            directory: PathBuf::from("/does/not/exist"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(err.is_spawn_failure());
        assert_eq!(err.exit_code(), None);
        assert!(err.stdout_chunks().is_empty());
        assert!(err.stderr_chunks().is_empty());
        assert!(err.message().contains("/does/not/exist"));
        assert!(err.message().contains("bash"));
    }
}
