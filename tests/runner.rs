//! End-to-end properties of the live command runner.
//!
//! Each test spawns a real `bash -s` session with the current process
//! environment and checks what the runner resolves with against what it
//! mirrored.

use std::path::PathBuf;

use tokio_util::sync::CancellationToken;

use shell_harness::capture::{MemoryMirror, MirrorTarget};
use shell_harness::{env, CommandRunner, ExecutionOutcome, ExecutionRequest, LiveCommandRunner};

async fn execute(dir: impl Into<PathBuf>, commands: &[&str]) -> (ExecutionOutcome, MemoryMirror) {
    let memory = MemoryMirror::new();
    let runner = LiveCommandRunner::default().with_mirror(MirrorTarget::Memory(memory.clone()));
    let request =
        ExecutionRequest::new(dir, commands.iter().copied()).with_environment(env::current());
    let outcome = runner.run(&request, &CancellationToken::new()).await;
    (outcome, memory)
}

#[tokio::test]
async fn echo_hello() {
    let (outcome, memory) = execute(std::env::temp_dir(), &["echo hello"]).await;
    assert_eq!(outcome.unwrap(), "hello\n");
    assert_eq!(memory.stdout(), b"hello\n");
}

#[tokio::test]
async fn empty_sequence_succeeds_with_no_output() {
    let (outcome, memory) = execute(std::env::temp_dir(), &[]).await;
    assert_eq!(outcome.unwrap(), "");
    assert!(memory.stdout().is_empty());
    assert!(memory.stderr().is_empty());
}

#[tokio::test]
async fn failing_sequence_keeps_earlier_chunks() {
    let (outcome, memory) = execute(std::env::temp_dir(), &["echo one", "exit 3"]).await;
    let err = outcome.unwrap_err();
    assert_eq!(err.exit_code(), Some(3));
    assert!(err.stdout_chunks().iter().any(|chunk| chunk == "one\n"));
    assert_eq!(memory.stdout(), err.stdout().into_bytes());
}

#[tokio::test]
async fn last_status_decides_the_outcome() {
    let (outcome, _) = execute(std::env::temp_dir(), &["false", "echo recovered"]).await;
    assert_eq!(outcome.unwrap(), "recovered\n");
}

#[tokio::test]
async fn shell_operators_inside_commands_are_honoured() {
    let (outcome, _) =
        execute(std::env::temp_dir(), &["false || echo fallback", "true && echo chained"]).await;
    assert_eq!(outcome.unwrap(), "fallback\nchained\n");
}

#[tokio::test]
async fn stderr_chunks_are_captured_on_failure() {
    let (outcome, memory) =
        execute(std::env::temp_dir(), &["echo problem >&2", "exit 2"]).await;
    let err = outcome.unwrap_err();
    assert_eq!(err.exit_code(), Some(2));
    assert_eq!(err.stderr(), "problem\n");
    assert_eq!(memory.stderr(), b"problem\n");
}

#[tokio::test]
async fn nonexistent_directory_is_a_spawn_failure() {
    let (outcome, memory) = execute("/does/not/exist", &["echo never"]).await;
    let err = outcome.unwrap_err();
    assert!(err.is_spawn_failure());
    assert_eq!(err.exit_code(), None);
    assert!(memory.stdout().is_empty());
}

#[tokio::test]
async fn commands_see_the_working_directory() {
    let dir = std::env::temp_dir().join("shell_harness_runner_cwd");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("marker.txt"), "present").unwrap();

    let (outcome, _) = execute(&dir, &["cat marker.txt"]).await;
    assert_eq!(outcome.unwrap(), "present");

    let _ = std::fs::remove_dir_all(&dir);
}
