//! Command dispatch and handlers.

pub mod run;
pub mod suite;

use crate::cli::Command;

/// Dispatch a parsed command to its handler.
///
/// Handlers are async; they run on a current-thread runtime built here, which
/// is all a single shell session needs.
///
/// # Errors
///
/// Returns an error string if the runtime cannot start or the selected
/// command handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start async runtime: {e}"))?;
    runtime.block_on(dispatch_async(command))
}

async fn dispatch_async(command: &Command) -> Result<(), String> {
    match command {
        Command::Run(args) => run::run(args).await,
        Command::Suite(args) => suite::run(args).await,
    }
}
