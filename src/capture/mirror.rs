//! Live forwarding of shell output to the harness's own streams.

use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::warn;

/// Writer a mirrored stream is forwarded to.
pub type MirrorWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Where mirrored shell output goes.
#[derive(Debug, Clone, Default)]
pub enum MirrorTarget {
    /// The harness's own stdout and stderr.
    #[default]
    Stdio,
    /// Both streams to the harness's stderr, keeping its stdout free for
    /// machine-readable output.
    Stderr,
    /// Nowhere; output is only captured.
    Discard,
    /// In-memory buffers, for inspecting what would have been shown.
    Memory(MemoryMirror),
}

impl MirrorTarget {
    /// Opens fresh stdout/stderr sinks for one execution.
    #[must_use]
    pub fn open(&self) -> (MirrorSink, MirrorSink) {
        let (stdout, stderr): (MirrorWriter, MirrorWriter) = match self {
            Self::Stdio => (Box::new(tokio::io::stdout()), Box::new(tokio::io::stderr())),
            Self::Stderr => (Box::new(tokio::io::stderr()), Box::new(tokio::io::stderr())),
            Self::Discard => (Box::new(tokio::io::sink()), Box::new(tokio::io::sink())),
            Self::Memory(memory) => {
                (Box::new(memory.stdout.clone()), Box::new(memory.stderr.clone()))
            }
        };
        (MirrorSink::new("stdout", stdout), MirrorSink::new("stderr", stderr))
    }
}

/// Forwards chunks of one stream to a writer.
///
/// A failing writer stops mirroring for the rest of the execution; it never
/// affects capture.
pub struct MirrorSink {
    stream: &'static str,
    writer: MirrorWriter,
    broken: bool,
}

impl MirrorSink {
    /// Wraps a writer for the named stream.
    #[must_use]
    pub fn new(stream: &'static str, writer: MirrorWriter) -> Self {
        Self { stream, writer, broken: false }
    }

    /// Writes and flushes `bytes` so they are visible immediately.
    pub async fn forward(&mut self, bytes: &[u8]) {
        if self.broken {
            return;
        }
        let writer = &mut self.writer;
        let result = async {
            writer.write_all(bytes).await?;
            writer.flush().await
        }
        .await;
        if let Err(err) = result {
            warn!(stream = self.stream, error = %err, "mirroring disabled after write failure");
            self.broken = true;
        }
    }
}

/// Pair of in-memory buffers receiving mirrored output.
#[derive(Debug, Clone, Default)]
pub struct MemoryMirror {
    stdout: SharedBuffer,
    stderr: SharedBuffer,
}

impl MemoryMirror {
    /// Creates empty buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything mirrored to stdout so far.
    #[must_use]
    pub fn stdout(&self) -> Vec<u8> {
        self.stdout.contents()
    }

    /// Everything mirrored to stderr so far.
    #[must_use]
    pub fn stderr(&self) -> Vec<u8> {
        self.stderr.contents()
    }
}

#[derive(Debug, Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> Vec<u8> {
        self.0.lock().map(|buf| buf.clone()).unwrap_or_default()
    }
}

impl AsyncWrite for SharedBuffer {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.0.lock() {
            Ok(mut inner) => {
                inner.extend_from_slice(buf);
                Poll::Ready(Ok(buf.len()))
            }
            Err(_) => Poll::Ready(Err(io::Error::other("mirror buffer lock poisoned"))),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
