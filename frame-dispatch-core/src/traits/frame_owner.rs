use std::sync::Arc;

use super::frame_source::FrameSource;

/// The client or device context a frame processor works for.
///
/// The processor only holds a `Weak` reference to its owner. Dropping the
/// last strong reference is how the dispatch loop is shut down.
pub trait FrameOwner: Send + Sync {
    /// Identifier used in log messages.
    fn owner_id(&self) -> i32;

    /// The source to pull frames from, or `None` once the device is gone.
    fn frame_source(&self) -> Option<Arc<dyn FrameSource>>;
}
