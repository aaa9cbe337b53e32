//! Resolution of the environment handed to the shell.
//!
//! The runner never inherits anything implicitly, so callers build the full
//! environment here: the current process environment, then `.env` files,
//! then explicit `KEY=VALUE` overrides. Later sources win.

use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised while resolving the environment.
#[derive(Error, Debug)]
pub enum EnvError {
    /// An override was not of the form `KEY=VALUE`.
    #[error("Invalid environment assignment '{0}', expected KEY=VALUE")]
    InvalidAssignment(String),

    /// A `.env` file could not be read or parsed.
    #[error("Failed to load env file {}: {source}", path.display())]
    EnvFile {
        /// File that failed.
        path: PathBuf,
        /// Parser or I/O error.
        #[source]
        source: dotenvy::Error,
    },
}

/// Sources merged into the resolved environment.
#[derive(Debug, Clone, Default)]
pub struct EnvOptions {
    /// Start from an empty environment instead of the current one.
    pub clean: bool,
    /// `.env`-style files, applied in order.
    pub env_files: Vec<PathBuf>,
    /// Explicit assignments, applied last.
    pub overrides: Vec<(String, String)>,
}

/// Snapshot of the current process environment.
///
/// Variables whose name or value is not valid UTF-8 cannot be represented and
/// are skipped with a warning.
#[must_use]
pub fn current() -> BTreeMap<String, String> {
    std::env::vars_os()
        .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => Some((key, value)),
            (key, _) => {
                warn!(key = ?key, "skipping non UTF-8 environment variable");
                None
            }
        })
        .collect()
}

/// Builds the complete environment described by `options`.
///
/// # Errors
///
/// Returns an error if an env file cannot be loaded.
pub fn resolve(options: &EnvOptions) -> Result<BTreeMap<String, String>, EnvError> {
    let mut env = if options.clean { BTreeMap::new() } else { current() };

    for path in &options.env_files {
        let entries = dotenvy::from_path_iter(path)
            .map_err(|source| EnvError::EnvFile { path: path.clone(), source })?;
        for entry in entries {
            let (key, value) =
                entry.map_err(|source| EnvError::EnvFile { path: path.clone(), source })?;
            env.insert(key, value);
        }
        debug!(path = %path.display(), "loaded env file");
    }

    for (key, value) in &options.overrides {
        env.insert(key.clone(), value.clone());
    }
    Ok(env)
}

/// Parses a `KEY=VALUE` assignment. The value may be empty or contain `=`.
///
/// # Errors
///
/// Returns an error if there is no `=` or the key is empty.
pub fn parse_assignment(raw: &str) -> Result<(String, String), EnvError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(EnvError::InvalidAssignment(raw.to_string())),
    }
}
