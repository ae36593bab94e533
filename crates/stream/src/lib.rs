//! Streaming: per-camera scheduler threads, frame sinks, timing stats.
//!
//! Each streaming camera gets its own worker thread that snapshots the world
//! under the lock, renders outside it, and publishes the frame to a sink.
//!
//! # Invariants
//! - A camera that leaves the world stops streaming on its next cycle.
//! - Frames published for one camera are monotonically ordered by counter.
//! - Render failures are absorbed; a worker never dies mid-stream.

mod scheduler;
mod sink;
mod timing;

pub use scheduler::{StreamConfig, StreamError, StreamScheduler, StreamStats};
pub use sink::{CameraFrame, CollectingSink, FrameSink};
pub use timing::FrameTimer;
