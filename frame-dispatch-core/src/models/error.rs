use thiserror::Error;

use super::frame::MetadataTag;

/// Errors that can occur while producing or dispatching frames.
///
/// `TimedOut` is an expected outcome of waiting on a `FrameSource` and is
/// never logged. Everything else surfaces through `log::error!` in the
/// dispatch loop, which keeps running.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("timed out waiting for a frame")]
    TimedOut,

    #[error("frame source error: {0}")]
    Source(String),

    #[error("frame is missing entry {0}")]
    MissingEntry(MetadataTag),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("failed to spawn worker: {0}")]
    Spawn(String),

    #[error("storage error: {0}")]
    Storage(String),
}
