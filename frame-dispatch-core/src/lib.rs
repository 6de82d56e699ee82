//! # frame-dispatch-core
//!
//! Platform-agnostic frame dispatch core library.
//!
//! A single background worker pulls metadata frames from a `FrameSource` and
//! fans them out to listeners registered for a half-open range of frame ids.
//! Concrete producers implement the `FrameSource` trait and are handed to the
//! `FrameProcessor` through a weakly-held `FrameOwner`.
//!
//! ## Architecture
//!
//! ```text
//! frame-dispatch-core (this crate)
//! ├── traits/       ← FrameSource, FilteredListener, FrameOwner
//! ├── models/       ← FrameError, FrameMetadata, ProcessorConfig, ProcessorState, etc.
//! ├── registry/     ← ListenerRegistry, RangeListener
//! ├── processor/    ← FrameProcessor (dispatch loop + last-frame cache)
//! └── storage/      ← last-frame JSON snapshots
//! ```

pub mod models;
pub mod processor;
pub mod registry;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::config::ProcessorConfig;
pub use models::diagnostics::ProcessorDiagnostics;
pub use models::error::FrameError;
pub use models::frame::{FrameId, FrameMetadata, LastFrame, MetadataTag, MetadataValue};
pub use models::state::ProcessorState;
pub use processor::frame_processor::FrameProcessor;
pub use registry::range_registry::{ListenerRegistry, RangeListener};
pub use traits::filtered_listener::FilteredListener;
pub use traits::frame_owner::FrameOwner;
pub use traits::frame_source::FrameSource;
