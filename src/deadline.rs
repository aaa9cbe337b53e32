//! Time-bounded executions.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::ports::shell::{CommandRunner, ExecutionOutcome, ExecutionRequest};

/// Result of an execution that may have been cut short.
#[derive(Debug)]
pub struct BoundedRun {
    /// What the runner resolved with. A timed-out run resolves as cancelled.
    pub outcome: ExecutionOutcome,
    /// Whether the limit elapsed before the shell exited.
    pub timed_out: bool,
    /// Wall-clock time until the runner resolved.
    pub elapsed: Duration,
}

/// Runs `request`, cancelling it once `limit` elapses.
///
/// Cancellation kills the shell's process group, so a timed-out scenario
/// leaves nothing running. The runner is still awaited to completion so the
/// outcome always reflects a terminated process.
pub async fn run_bounded(
    runner: &dyn CommandRunner,
    request: &ExecutionRequest,
    limit: Option<Duration>,
) -> BoundedRun {
    let cancel = CancellationToken::new();
    let started = Instant::now();
    let mut run = runner.run(request, &cancel);

    let (outcome, timed_out) = match limit {
        None => (run.await, false),
        Some(limit) => match tokio::time::timeout(limit, &mut run).await {
            Ok(outcome) => (outcome, false),
            Err(_) => {
                warn!(?limit, "time limit elapsed, cancelling");
                cancel.cancel();
                let outcome = run.await;
                // The shell may have exited on its own while the kill was on its way.
                let killed = matches!(&outcome, Err(err) if err.is_cancelled());
                (outcome, killed)
            }
        },
    };

    BoundedRun { outcome, timed_out, elapsed: started.elapsed() }
}
