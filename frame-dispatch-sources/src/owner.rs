use std::sync::Arc;

use parking_lot::Mutex;

use frame_dispatch_core::traits::frame_owner::FrameOwner;
use frame_dispatch_core::traits::frame_source::FrameSource;

/// Owner context holding a single frame source.
///
/// Dropping the owner, or detaching its source, stops any processor
/// started against it.
pub struct SourceOwner {
    id: i32,
    source: Mutex<Option<Arc<dyn FrameSource>>>,
}

impl SourceOwner {
    pub fn new(id: i32, source: Arc<dyn FrameSource>) -> Self {
        Self {
            id,
            source: Mutex::new(Some(source)),
        }
    }

    /// Release the source, as if the device went away.
    pub fn detach_source(&self) -> Option<Arc<dyn FrameSource>> {
        let source = self.source.lock().take();
        if source.is_some() {
            log::debug!("Owner {}: frame source detached", self.id);
        }
        source
    }
}

impl FrameOwner for SourceOwner {
    fn owner_id(&self) -> i32 {
        self.id
    }

    fn frame_source(&self) -> Option<Arc<dyn FrameSource>> {
        self.source.lock().clone()
    }
}
