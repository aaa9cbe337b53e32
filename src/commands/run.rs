//! `shell-harness run` command.

use std::time::Duration;

use tracing::info;

use crate::adapters::live::LiveCommandRunner;
use crate::cli::RunArgs;
use crate::deadline::run_bounded;
use crate::env;
use crate::error::ExecutionError;
use crate::ports::shell::ExecutionRequest;

/// Execute the `run` command.
///
/// The shell's output is mirrored live; nothing else is printed on success.
///
/// # Errors
///
/// Returns an error string if the environment cannot be resolved or the
/// commands fail, time out, or cannot be started.
pub async fn run(args: &RunArgs) -> Result<(), String> {
    let environment = env::resolve(&args.shell.env_options()).map_err(|e| e.to_string())?;
    let runner = LiveCommandRunner::new(args.shell.shell_config());
    let request = ExecutionRequest::new(&args.dir, args.commands.iter().cloned())
        .with_environment(environment);

    info!(commands = ?request.commands, cwd = %request.working_directory.display(), "run commands");
    let limit = args.timeout.map(Duration::from_secs);
    let bounded = run_bounded(&runner, &request, limit).await;

    match bounded.outcome {
        Ok(_) => Ok(()),
        Err(err) if bounded.timed_out => {
            Err(format!("Timed out after {}s: {err}", args.timeout.unwrap_or_default()))
        }
        Err(err) => Err(describe(&err)),
    }
}

/// Summary printed for a failed execution. The captured output itself has
/// already been mirrored, and a non-zero exit already names its code.
fn describe(err: &ExecutionError) -> String {
    err.message()
}
