//! Frame source replaying a JSON-lines recording.
//!
//! Each non-blank line holds one serialized `FrameMetadata`. Frames are
//! released in batches: every successful wait makes up to `batch_size`
//! frames available to the next drain pass.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use frame_dispatch_core::models::error::FrameError;
use frame_dispatch_core::models::frame::FrameMetadata;
use frame_dispatch_core::traits::frame_source::FrameSource;

struct ReplayState {
    queued: VecDeque<FrameMetadata>,
    released: usize,
}

pub struct ReplayFrameSource {
    state: Mutex<ReplayState>,
    batch_size: usize,
}

impl ReplayFrameSource {
    /// Replay frames already in memory, releasing all of them on the first wait.
    pub fn new(frames: Vec<FrameMetadata>) -> Self {
        Self {
            state: Mutex::new(ReplayState {
                queued: frames.into(),
                released: 0,
            }),
            batch_size: usize::MAX,
        }
    }

    /// Parse one frame per non-blank line.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, FrameError> {
        let mut frames = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line
                .map_err(|e| FrameError::Storage(format!("failed to read recording: {}", e)))?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let frame: FrameMetadata = serde_json::from_str(line)
                .map_err(|e| {
                    FrameError::Storage(format!("line {}: failed to parse frame: {}", index + 1, e))
                })?;
            frames.push(frame);
        }
        log::debug!("Loaded {} frames for replay", frames.len());
        Ok(Self::new(frames))
    }

    pub fn open(path: &Path) -> Result<Self, FrameError> {
        let file = File::open(path).map_err(|e| {
            FrameError::Storage(format!("failed to open recording {}: {}", path.display(), e))
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Release at most `batch_size` frames per wait (minimum 1).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Frames not yet fetched, released or not.
    pub fn remaining(&self) -> usize {
        self.state.lock().queued.len()
    }
}

impl FrameSource for ReplayFrameSource {
    fn wait_for_next_frame(&self, timeout: Duration) -> Result<(), FrameError> {
        {
            let mut state = self.state.lock();
            if state.released > 0 {
                return Ok(());
            }
            if !state.queued.is_empty() {
                state.released = self.batch_size.min(state.queued.len());
                return Ok(());
            }
        }
        thread::sleep(timeout);
        Err(FrameError::TimedOut)
    }

    fn next_frame(&self) -> Result<Option<FrameMetadata>, FrameError> {
        let mut state = self.state.lock();
        if state.released == 0 {
            return Ok(None);
        }
        state.released -= 1;
        Ok(state.queued.pop_front())
    }
}
