use std::fs;
use std::path::Path;

use crate::models::error::FrameError;
use crate::models::frame::LastFrame;

/// Write a cached frame as pretty-printed JSON for offline inspection.
pub fn write_snapshot(last: &LastFrame, path: &Path) -> Result<(), FrameError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| FrameError::Storage(format!("failed to create directory: {}", e)))?;
    }
    let json = serde_json::to_string_pretty(last)
        .map_err(|e| FrameError::Storage(format!("failed to serialize snapshot: {}", e)))?;
    fs::write(path, json)
        .map_err(|e| FrameError::Storage(format!("failed to write snapshot: {}", e)))?;
    Ok(())
}

/// Read a snapshot written by `write_snapshot`.
pub fn read_snapshot(path: &Path) -> Result<LastFrame, FrameError> {
    let json = fs::read_to_string(path)
        .map_err(|e| FrameError::Storage(format!("failed to read snapshot: {}", e)))?;
    let last: LastFrame = serde_json::from_str(&json)
        .map_err(|e| FrameError::Storage(format!("failed to parse snapshot: {}", e)))?;
    Ok(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::frame::{FrameMetadata, MetadataTag, MetadataValue};
    use std::path::PathBuf;

    fn temp_file_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("frame_dispatch_test_{}", name))
    }

    #[test]
    fn snapshot_keeps_entries_and_timestamp() {
        let path = temp_file_path("snapshot.json");
        let frame = FrameMetadata::with_request(21, 4)
            .with(MetadataTag(0x0001_0003), MetadataValue::Double(vec![0.25, 1.5]));
        let last = LastFrame::new(frame);

        write_snapshot(&last, &path).unwrap();
        let read = read_snapshot(&path).unwrap();

        assert_eq!(read, last);
        assert_eq!(read.frame.frame_id(), Some(21));

        fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_snapshot_is_storage_error() {
        let path = temp_file_path("does_not_exist.json");
        fs::remove_file(&path).ok();

        assert!(matches!(read_snapshot(&path), Err(FrameError::Storage(_))));
    }
}
