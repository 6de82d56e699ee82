use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::models::error::FrameError;
use crate::models::frame::FrameId;
use crate::traits::filtered_listener::FilteredListener;

/// A listener interested in frames with `min_id <= id < max_id`.
///
/// The upper bound is exclusive even though callers usually describe the
/// range as "min to max". `min_id <= max_id` is not checked; an inverted
/// range never matches anything.
#[derive(Clone)]
pub struct RangeListener {
    pub min_id: FrameId,
    pub max_id: FrameId,
    pub listener: Weak<dyn FilteredListener>,
}

impl RangeListener {
    pub fn contains(&self, frame_id: FrameId) -> bool {
        frame_id >= self.min_id && frame_id < self.max_id
    }

    /// Same bounds and same listener allocation.
    fn is(&self, min_id: FrameId, max_id: FrameId, listener: &Weak<dyn FilteredListener>) -> bool {
        self.min_id == min_id && self.max_id == max_id && Weak::ptr_eq(&self.listener, listener)
    }
}

impl fmt::Debug for RangeListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RangeListener")
            .field("min_id", &self.min_id)
            .field("max_id", &self.max_id)
            .field("alive", &(self.listener.strong_count() > 0))
            .finish()
    }
}

/// Insertion-ordered set of range listeners shared between callers and the
/// dispatch thread.
///
/// The lock is only held while the vector is touched. Listeners are never
/// invoked from here; `collect_matching` hands out strong references so the
/// caller can invoke them after the lock is released.
#[derive(Default)]
pub struct ListenerRegistry {
    entries: Mutex<Vec<RangeListener>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener for `[min_id, max_id)`. Duplicates are kept.
    pub fn register(
        &self,
        min_id: FrameId,
        max_id: FrameId,
        listener: Weak<dyn FilteredListener>,
    ) -> Result<(), FrameError> {
        log::debug!("Registering listener for frame id range {} - {}", min_id, max_id);
        self.entries.lock().push(RangeListener {
            min_id,
            max_id,
            listener,
        });
        Ok(())
    }

    /// Remove every entry with exactly these bounds and this listener.
    ///
    /// Succeeds even when nothing matched.
    pub fn remove(
        &self,
        min_id: FrameId,
        max_id: FrameId,
        listener: &Weak<dyn FilteredListener>,
    ) -> Result<(), FrameError> {
        self.entries
            .lock()
            .retain(|entry| !entry.is(min_id, max_id, listener));
        Ok(())
    }

    /// Strong references to every live listener whose range contains
    /// `frame_id`, in registration order.
    ///
    /// Matching entries whose listener has been dropped are erased on the
    /// way. Returns the snapshot and the number of entries erased.
    pub fn collect_matching(&self, frame_id: FrameId) -> (Vec<Arc<dyn FilteredListener>>, usize) {
        let mut listeners = Vec::new();
        let mut reaped = 0;

        let mut entries = self.entries.lock();
        entries.retain(|entry| {
            if !entry.contains(frame_id) {
                return true;
            }
            match entry.listener.upgrade() {
                Some(listener) => {
                    listeners.push(listener);
                    true
                }
                None => {
                    reaped += 1;
                    false
                }
            }
        });
        log::trace!(
            "Got {} range listeners out of {} for frame {}",
            listeners.len(),
            entries.len(),
            frame_id
        );

        (listeners, reaped)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Copy of the current entries, dead ones included.
    pub fn entries(&self) -> Vec<RangeListener> {
        self.entries.lock().clone()
    }
}
