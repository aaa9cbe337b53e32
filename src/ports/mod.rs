//! Port traits defining external boundaries.
//!
//! The only boundary the harness crosses is the shell process. The trait
//! lives here; the real implementation lives in `src/adapters/`.

pub mod shell;

pub use shell::{CommandRunner, ExecutionOutcome, ExecutionRequest, RunFuture};
