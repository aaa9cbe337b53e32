//! Live command runner using `tokio::process`.

use std::io;
use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{ChildStdin, Command};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::capture::{MirrorSink, MirrorTarget, StreamCapture};
use crate::error::ExecutionError;
use crate::ports::shell::{CommandRunner, ExecutionOutcome, ExecutionRequest, RunFuture};

const READ_CHUNK: usize = 8 * 1024;

/// Shell program and the arguments that make it read a script from stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    /// Program to launch, looked up through the request's `PATH`.
    pub program: String,
    /// Arguments passed before the script is fed through stdin.
    pub args: Vec<String>,
}

impl ShellConfig {
    /// Uses `program` with `-s`, which POSIX shells understand as "read
    /// commands from stdin".
    #[must_use]
    pub fn stdin_script(program: impl Into<String>) -> Self {
        Self { program: program.into(), args: vec!["-s".to_string()] }
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self::stdin_script("bash")
    }
}

/// Live runner that spawns one shell process per request.
#[derive(Debug, Clone, Default)]
pub struct LiveCommandRunner {
    shell: ShellConfig,
    mirror: MirrorTarget,
}

impl LiveCommandRunner {
    /// Creates a runner that mirrors output to the harness's stdout/stderr.
    #[must_use]
    pub fn new(shell: ShellConfig) -> Self {
        Self { shell, mirror: MirrorTarget::Stdio }
    }

    /// Sends mirrored output somewhere else.
    #[must_use]
    pub fn with_mirror(mut self, mirror: MirrorTarget) -> Self {
        self.mirror = mirror;
        self
    }

    /// The shell this runner launches.
    #[must_use]
    pub fn shell(&self) -> &ShellConfig {
        &self.shell
    }

    async fn execute(
        &self,
        request: &ExecutionRequest,
        cancel: &CancellationToken,
    ) -> ExecutionOutcome {
        let mut command = Command::new(&self.shell.program);
        command
            .args(&self.shell.args)
            .current_dir(&request.working_directory)
            .env_clear()
            .envs(&request.environment)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        info!(
            shell = %self.shell.program,
            dir = %request.working_directory.display(),
            commands = request.commands.len(),
            "running commands"
        );

        let mut child = command.spawn().map_err(|source| {
            warn!(shell = %self.shell.program, error = %source, "failed to spawn shell");
            ExecutionError::SpawnFailure {
                shell: self.shell.program.clone(),
                directory: request.working_directory.clone(),
                source,
            }
        })?;
        let pid = child.id();
        debug!(?pid, "shell spawned");

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let (mut stdout_mirror, mut stderr_mirror) = self.mirror.open();
        let mut stdout_capture = StreamCapture::new();
        let mut stderr_capture = StreamCapture::new();

        let finished = {
            let io = async {
                let (fed, out, err, status) = tokio::join!(
                    feed(stdin, request.script()),
                    drain(stdout, &mut stdout_capture, &mut stdout_mirror),
                    drain(stderr, &mut stderr_capture, &mut stderr_mirror),
                    child.wait(),
                );
                fed.and(out).and(err).and(status)
            };
            tokio::select! {
                biased;
                status = io => Some(status),
                () = cancel.cancelled() => None,
            }
        };

        let Some(status) = finished else {
            warn!(?pid, "cancelled, killing shell process group");
            kill_process_group(pid);
            if let Err(err) = child.kill().await {
                debug!(error = %err, "shell already gone");
            }
            return Err(ExecutionError::Cancelled {
                stdout_chunks: stdout_capture.finish(),
                stderr_chunks: stderr_capture.finish(),
            });
        };

        let stdout_chunks = stdout_capture.finish();
        let stderr_chunks = stderr_capture.finish();
        match status {
            Ok(status) if status.success() => {
                info!("commands succeeded");
                Ok(stdout_chunks.concat())
            }
            Ok(status) => {
                let code = exit_code(status);
                warn!(code, "commands failed");
                Err(ExecutionError::NonZeroExit { code, stdout_chunks, stderr_chunks })
            }
            Err(source) => Err(ExecutionError::Io { source, stdout_chunks, stderr_chunks }),
        }
    }
}

impl CommandRunner for LiveCommandRunner {
    fn run<'a>(
        &'a self,
        request: &'a ExecutionRequest,
        cancel: &'a CancellationToken,
    ) -> RunFuture<'a> {
        Box::pin(self.execute(request, cancel))
    }
}

/// Writes the script and closes stdin. A shell that exits before reading
/// everything closes the pipe; that is not an error.
async fn feed(stdin: Option<ChildStdin>, script: String) -> io::Result<()> {
    let Some(mut stdin) = stdin else {
        return Ok(());
    };
    match stdin.write_all(script.as_bytes()).await {
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {
            debug!("shell closed stdin before reading the whole script");
            Ok(())
        }
        result => result,
    }
}

async fn drain<R>(
    reader: Option<R>,
    capture: &mut StreamCapture,
    mirror: &mut MirrorSink,
) -> io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let Some(mut reader) = reader else {
        return Ok(());
    };
    let mut buf = vec![0u8; READ_CHUNK];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        capture.push(&buf[..n]);
        mirror.forward(&buf[..n]).await;
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    status.code().or_else(|| signal_code(status)).unwrap_or(1)
}

#[cfg(unix)]
fn signal_code(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal().map(|signal| 128 + signal)
}

#[cfg(not(unix))]
fn signal_code(_status: ExitStatus) -> Option<i32> {
    None
}

#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Some(pid) = pid.and_then(|pid| i32::try_from(pid).ok()) else {
        return;
    };
    if let Err(err) = killpg(Pid::from_raw(pid), Signal::SIGKILL) {
        debug!(pid, error = %err, "killpg failed");
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}
