use std::io;
use std::sync::{Arc, Weak};
use std::thread;

use parking_lot::Mutex;

use crate::models::config::ProcessorConfig;
use crate::models::diagnostics::ProcessorDiagnostics;
use crate::models::error::FrameError;
use crate::models::frame::{FrameId, FrameMetadata, LastFrame, MetadataTag};
use crate::models::state::ProcessorState;
use crate::registry::range_registry::ListenerRegistry;
use crate::traits::filtered_listener::FilteredListener;
use crate::traits::frame_owner::FrameOwner;
use crate::traits::frame_source::FrameSource;

/// State shared between the processor handle and its dispatch thread.
struct ProcessorShared {
    config: ProcessorConfig,
    registry: ListenerRegistry,
    last_frame: Mutex<Option<LastFrame>>,
    state: Mutex<ProcessorState>,
    diagnostics: Mutex<ProcessorDiagnostics>,
}

/// Marks the processor terminated when the dispatch thread exits, including
/// when a listener panic unwinds it.
struct TerminateOnExit(Arc<ProcessorShared>);

impl Drop for TerminateOnExit {
    fn drop(&mut self) {
        *self.0.state.lock() = ProcessorState::Terminated;
        if thread::panicking() {
            log::error!("{}: dispatch thread panicked", self.0.config.thread_name);
        } else {
            log::debug!("{}: Exit", self.0.config.thread_name);
        }
    }
}

/// Background frame dispatcher.
///
/// Pulls frames from the owner's `FrameSource` on a dedicated thread and
/// hands each one to the listeners whose id range contains it:
/// ```text
/// [FrameSource] → wait → drain ─→ [ListenerRegistry snapshot] → on_frame_available
///                           └──→ [last-frame cache] → dump
/// ```
///
/// There is no stop call. The thread holds only a `Weak` to the owner and
/// exits on the first iteration after the owner (or its source) is gone.
pub struct FrameProcessor {
    shared: Arc<ProcessorShared>,
    worker_handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl FrameProcessor {
    pub fn new(config: ProcessorConfig) -> Result<Self, FrameError> {
        config.validate().map_err(FrameError::InvalidConfiguration)?;

        Ok(Self {
            shared: Arc::new(ProcessorShared {
                config,
                registry: ListenerRegistry::new(),
                last_frame: Mutex::new(None),
                state: Mutex::new(ProcessorState::Idle),
                diagnostics: Mutex::new(ProcessorDiagnostics::default()),
            }),
            worker_handle: Mutex::new(None),
        })
    }

    /// Spawn the dispatch thread. Transitions: idle → running.
    pub fn start(&self, owner: Weak<dyn FrameOwner>) -> Result<(), FrameError> {
        {
            let mut state = self.shared.state.lock();
            if !state.is_idle() {
                return Err(FrameError::InvalidState(format!(
                    "can only start from idle state, processor is {}",
                    state
                )));
            }
            *state = ProcessorState::Running;
        }

        let exit_guard = TerminateOnExit(Arc::clone(&self.shared));
        let spawned = thread::Builder::new()
            .name(self.shared.config.thread_name.clone())
            .spawn(move || {
                let shared = &exit_guard.0;
                while shared.thread_loop(&owner) {}
            });

        match spawned {
            Ok(handle) => {
                *self.worker_handle.lock() = Some(handle);
                Ok(())
            }
            Err(e) => {
                *self.shared.state.lock() = ProcessorState::Idle;
                Err(FrameError::Spawn(e.to_string()))
            }
        }
    }

    /// Block until the dispatch thread has exited.
    ///
    /// Returns immediately if the processor was never started.
    pub fn join(&self) {
        let handle = self.worker_handle.lock().take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }

    /// Deliver frames with `min_id <= id < max_id` to `listener`.
    ///
    /// The listener is held weakly; dropping it is enough to stop delivery.
    pub fn register_listener(
        &self,
        min_id: FrameId,
        max_id: FrameId,
        listener: Weak<dyn FilteredListener>,
    ) -> Result<(), FrameError> {
        self.shared.registry.register(min_id, max_id, listener)
    }

    pub fn remove_listener(
        &self,
        min_id: FrameId,
        max_id: FrameId,
        listener: &Weak<dyn FilteredListener>,
    ) -> Result<(), FrameError> {
        self.shared.registry.remove(min_id, max_id, listener)
    }

    pub fn state(&self) -> ProcessorState {
        *self.shared.state.lock()
    }

    pub fn diagnostics(&self) -> ProcessorDiagnostics {
        self.shared.diagnostics.lock().clone()
    }

    /// Number of registry entries, including dead ones not yet reaped.
    pub fn listener_count(&self) -> usize {
        self.shared.registry.len()
    }

    pub fn last_frame(&self) -> Option<LastFrame> {
        self.shared.last_frame.lock().clone()
    }

    /// Write a human-readable report of the latest frame and loop counters.
    pub fn dump(&self, out: &mut dyn io::Write) -> io::Result<()> {
        let indent = self.shared.config.dump_indent;

        writeln!(out, "    Latest received frame:")?;
        match self.last_frame() {
            Some(last) => {
                writeln!(
                    out,
                    "{:indent$}Received at {}",
                    "",
                    last.received_at.to_rfc3339(),
                    indent = indent
                )?;
                last.frame.dump(out, indent)?;
            }
            None => writeln!(out, "{:indent$}(none)", "", indent = indent)?,
        }

        writeln!(out, "    State: {}", self.state())?;
        writeln!(out, "    Registered listeners: {}", self.listener_count())?;
        self.diagnostics().dump(out, 4)
    }
}

impl ProcessorShared {
    /// One iteration of the dispatch loop. Returns `false` once the owner
    /// or its frame source is gone.
    fn thread_loop(&self, owner: &Weak<dyn FrameOwner>) -> bool {
        let source = {
            let Some(owner) = owner.upgrade() else {
                return false;
            };
            let Some(source) = owner.frame_source() else {
                return false;
            };
            source
        };

        match source.wait_for_next_frame(self.config.wait_timeout) {
            Ok(()) => {
                let Some(owner) = owner.upgrade() else {
                    return false;
                };
                self.process_new_frames(owner.as_ref(), source.as_ref());
            }
            Err(FrameError::TimedOut) => {
                self.diagnostics.lock().wait_timeouts += 1;
            }
            Err(e) => {
                log::error!("Error waiting for new frames: {}", e);
                self.diagnostics.lock().source_errors += 1;
            }
        }

        true
    }

    /// Drain every buffered frame from `source`.
    fn process_new_frames(&self, owner: &dyn FrameOwner, source: &dyn FrameSource) {
        self.diagnostics.lock().drain_passes += 1;

        loop {
            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => return,
                Err(e) => {
                    log::error!("Owner {}: Error getting next frame: {}", owner.owner_id(), e);
                    self.diagnostics.lock().source_errors += 1;
                    return;
                }
            };

            let Some(frame_count) = frame.frame_count() else {
                log::error!(
                    "Owner {}: Error reading frame number: {}",
                    owner.owner_id(),
                    FrameError::MissingEntry(MetadataTag::REQUEST_FRAME_COUNT)
                );
                self.diagnostics.lock().malformed_frames += 1;
                return;
            };
            log::trace!("Owner {}: frame count {}", owner.owner_id(), frame_count);

            if self.process_listeners(&frame, owner).is_err() {
                return;
            }

            if !frame.is_empty() {
                *self.last_frame.lock() = Some(LastFrame::new(frame));
            }
        }
    }

    /// Deliver one frame to every matching listener, outside the registry lock.
    fn process_listeners(
        &self,
        frame: &FrameMetadata,
        owner: &dyn FrameOwner,
    ) -> Result<(), FrameError> {
        let Some(frame_id) = frame.frame_id() else {
            let err = FrameError::MissingEntry(MetadataTag::REQUEST_ID);
            log::error!("Owner {}: Error reading frame id: {}", owner.owner_id(), err);
            self.diagnostics.lock().malformed_frames += 1;
            return Err(err);
        };

        let (listeners, reaped) = self.registry.collect_matching(frame_id);
        {
            let mut d = self.diagnostics.lock();
            d.frames_processed += 1;
            d.listeners_reaped += reaped as u64;
            d.listener_invocations += listeners.len() as u64;
        }

        for listener in &listeners {
            listener.on_frame_available(frame_id, frame);
        }
        Ok(())
    }
}
