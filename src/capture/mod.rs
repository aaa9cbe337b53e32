//! Capture and live mirroring of shell output streams.
//!
//! Each stream read by the runner feeds two independent sinks: a
//! [`StreamCapture`] that keeps the ordered chunks, and a [`MirrorSink`]
//! that forwards the raw bytes to the harness's own output.

pub mod mirror;
pub mod stream;

pub use mirror::{MemoryMirror, MirrorSink, MirrorTarget, MirrorWriter};
pub use stream::StreamCapture;
