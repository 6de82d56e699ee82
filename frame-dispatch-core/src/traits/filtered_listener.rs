use crate::models::frame::{FrameId, FrameMetadata};

/// Subscriber for frames whose id falls in a registered range.
///
/// Called from the dispatch thread with no processor lock held, so an
/// implementation may register or remove listeners from inside the callback.
/// A callback that blocks stalls delivery for every other listener.
pub trait FilteredListener: Send + Sync {
    fn on_frame_available(&self, frame_id: FrameId, frame: &FrameMetadata);
}
