use std::time::Duration;

use crate::models::error::FrameError;
use crate::models::frame::FrameMetadata;

/// Interface for producers of metadata frames.
///
/// Implemented by:
/// - `QueueFrameSource` (in-memory, fed by `push`)
/// - `ReplayFrameSource` (frames recorded as JSON lines)
pub trait FrameSource: Send + Sync {
    /// Block until at least one frame is available or `timeout` elapses.
    ///
    /// Returns `Err(FrameError::TimedOut)` when nothing arrived in time.
    /// Any other error is treated as transient by the dispatch loop.
    fn wait_for_next_frame(&self, timeout: Duration) -> Result<(), FrameError>;

    /// Take the next buffered frame.
    ///
    /// `Ok(None)` means no more frames are buffered right now; the dispatch
    /// loop ends its drain pass there and goes back to waiting.
    fn next_frame(&self) -> Result<Option<FrameMetadata>, FrameError>;
}
