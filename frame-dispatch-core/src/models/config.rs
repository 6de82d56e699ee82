use std::time::Duration;

/// Configuration for a frame processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorConfig {
    /// How long one wait on the frame source may block (default: 100ms).
    pub wait_timeout: Duration,

    /// Name given to the dispatch worker thread (default: "frame-processor").
    pub thread_name: String,

    /// Indentation of frame entries in the diagnostic dump (default: 6).
    pub dump_indent: usize,
}

impl ProcessorConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.wait_timeout.is_zero() {
            return Err("wait timeout must be non-zero".into());
        }
        if self.thread_name.trim().is_empty() {
            return Err("thread name must not be empty".into());
        }
        if self.thread_name.contains('\0') {
            return Err("thread name must not contain NUL bytes".into());
        }
        Ok(())
    }
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            wait_timeout: Duration::from_millis(100),
            thread_name: "frame-processor".into(),
            dump_indent: 6,
        }
    }
}
