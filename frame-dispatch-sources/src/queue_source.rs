//! In-memory frame source.
//!
//! Frames pushed from any thread are buffered until the dispatch thread
//! drains them. Waiting blocks on a condvar instead of polling.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use frame_dispatch_core::models::error::FrameError;
use frame_dispatch_core::models::frame::FrameMetadata;
use frame_dispatch_core::traits::frame_source::FrameSource;

#[derive(Default)]
struct QueueState {
    frames: VecDeque<FrameMetadata>,
    wait_error: Option<FrameError>,
    fetch_error: Option<FrameError>,
}

/// Buffered producer fed by `push`.
#[derive(Default)]
pub struct QueueFrameSource {
    state: Mutex<QueueState>,
    ready: Condvar,
}

impl QueueFrameSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer one frame and wake the waiting dispatch thread.
    pub fn push(&self, frame: FrameMetadata) {
        self.state.lock().frames.push_back(frame);
        self.ready.notify_all();
    }

    /// Buffer several frames at once so they are drained in one pass.
    pub fn push_all<I: IntoIterator<Item = FrameMetadata>>(&self, frames: I) {
        self.state.lock().frames.extend(frames);
        self.ready.notify_all();
    }

    /// Make the next `wait_for_next_frame` call fail with `error`.
    pub fn fail_next_wait(&self, error: FrameError) {
        self.state.lock().wait_error = Some(error);
        self.ready.notify_all();
    }

    /// Make the next `next_frame` call fail with `error`.
    pub fn fail_next_fetch(&self, error: FrameError) {
        self.state.lock().fetch_error = Some(error);
    }

    /// Number of frames buffered and not yet fetched.
    pub fn pending(&self) -> usize {
        self.state.lock().frames.len()
    }
}

impl FrameSource for QueueFrameSource {
    fn wait_for_next_frame(&self, timeout: Duration) -> Result<(), FrameError> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        loop {
            if let Some(error) = state.wait_error.take() {
                return Err(error);
            }
            if !state.frames.is_empty() {
                return Ok(());
            }
            if self.ready.wait_until(&mut state, deadline).timed_out() {
                return if state.frames.is_empty() {
                    Err(FrameError::TimedOut)
                } else {
                    Ok(())
                };
            }
        }
    }

    fn next_frame(&self) -> Result<Option<FrameMetadata>, FrameError> {
        let mut state = self.state.lock();
        if let Some(error) = state.fetch_error.take() {
            return Err(error);
        }
        Ok(state.frames.pop_front())
    }
}
