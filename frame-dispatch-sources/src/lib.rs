//! # frame-dispatch-sources
//!
//! Frame source backends for frame-dispatch.
//!
//! Provides:
//! - `QueueFrameSource`: In-memory producer fed by `push`, waits on a condvar
//! - `ReplayFrameSource`: Replays frames recorded as JSON lines
//! - `SourceOwner`: Minimal `FrameOwner` handing out a single source
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use frame_dispatch_core::{FrameProcessor, FrameOwner, ProcessorConfig};
//! use frame_dispatch_sources::{QueueFrameSource, SourceOwner};
//!
//! let source = Arc::new(QueueFrameSource::new());
//! let owner: Arc<dyn FrameOwner> = Arc::new(SourceOwner::new(0, source.clone()));
//! let processor = FrameProcessor::new(ProcessorConfig::default()).unwrap();
//! processor.start(Arc::downgrade(&owner)).unwrap();
//! ```

pub mod owner;
pub mod queue_source;
pub mod replay_source;

pub use owner::SourceOwner;
pub use queue_source::QueueFrameSource;
pub use replay_source::ReplayFrameSource;
