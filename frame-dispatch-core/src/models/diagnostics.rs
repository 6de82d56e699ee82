use std::io;

/// Counters kept by the dispatch loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessorDiagnostics {
    pub wait_timeouts: u64,
    pub source_errors: u64,
    pub drain_passes: u64,
    pub frames_processed: u64,
    pub malformed_frames: u64,
    pub listener_invocations: u64,
    pub listeners_reaped: u64,
}

impl ProcessorDiagnostics {
    pub fn dump(&self, out: &mut dyn io::Write, indent: usize) -> io::Result<()> {
        let rows = [
            ("Wait timeouts", self.wait_timeouts),
            ("Source errors", self.source_errors),
            ("Drain passes", self.drain_passes),
            ("Frames processed", self.frames_processed),
            ("Malformed frames", self.malformed_frames),
            ("Listener invocations", self.listener_invocations),
            ("Listeners reaped", self.listeners_reaped),
        ];
        for (label, value) in rows {
            writeln!(out, "{:indent$}{}: {}", "", label, value, indent = indent)?;
        }
        Ok(())
    }
}
