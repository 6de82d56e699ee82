use std::collections::BTreeMap;
use std::fmt;
use std::io;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of one produced frame, in the producer's request numbering.
pub type FrameId = i32;

/// Key of a metadata entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataTag(pub u32);

impl MetadataTag {
    /// Running frame counter maintained by the producer.
    pub const REQUEST_FRAME_COUNT: MetadataTag = MetadataTag(0x000C_0000);

    /// Request id of the frame. This is the `FrameId` used for dispatch.
    pub const REQUEST_ID: MetadataTag = MetadataTag(0x000C_0001);

    /// Human-readable name for well-known tags.
    pub fn name(&self) -> Option<&'static str> {
        match *self {
            Self::REQUEST_FRAME_COUNT => Some("request.frameCount"),
            Self::REQUEST_ID => Some("request.id"),
            _ => None,
        }
    }
}

impl fmt::Display for MetadataTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} (0x{:08x})", name, self.0),
            None => write!(f, "0x{:08x}", self.0),
        }
    }
}

/// Typed values of a single metadata entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataValue {
    Byte(Vec<u8>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    Text(String),
}

impl MetadataValue {
    /// First element of an `Int32` entry.
    pub fn first_i32(&self) -> Option<i32> {
        match self {
            Self::Int32(v) => v.first().copied(),
            _ => None,
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join<T: fmt::Display>(
            f: &mut fmt::Formatter<'_>,
            kind: &str,
            values: &[T],
        ) -> fmt::Result {
            write!(f, "{}[{}]", kind, values.len())?;
            for v in values {
                write!(f, " {}", v)?;
            }
            Ok(())
        }

        match self {
            Self::Byte(v) => join(f, "byte", v),
            Self::Int32(v) => join(f, "int32", v),
            Self::Int64(v) => join(f, "int64", v),
            Self::Float(v) => join(f, "float", v),
            Self::Double(v) => join(f, "double", v),
            Self::Text(s) => write!(f, "text {:?}", s),
        }
    }
}

/// Key-value metadata bundle produced once per frame.
///
/// Entries are kept ordered by tag so dumps and serialized snapshots are
/// stable. A frame may be empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameMetadata {
    entries: BTreeMap<MetadataTag, MetadataValue>,
}

impl FrameMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame carrying the two entries the dispatch loop requires.
    pub fn with_request(frame_id: FrameId, frame_count: i32) -> Self {
        Self::new()
            .with(MetadataTag::REQUEST_ID, MetadataValue::Int32(vec![frame_id]))
            .with(MetadataTag::REQUEST_FRAME_COUNT, MetadataValue::Int32(vec![frame_count]))
    }

    /// Builder-style insert.
    pub fn with(mut self, tag: MetadataTag, value: MetadataValue) -> Self {
        self.entries.insert(tag, value);
        self
    }

    /// Insert or replace an entry, returning the previous value.
    pub fn insert(&mut self, tag: MetadataTag, value: MetadataValue) -> Option<MetadataValue> {
        self.entries.insert(tag, value)
    }

    pub fn remove(&mut self, tag: MetadataTag) -> Option<MetadataValue> {
        self.entries.remove(&tag)
    }

    pub fn find(&self, tag: MetadataTag) -> Option<&MetadataValue> {
        self.entries.get(&tag)
    }

    /// First `Int32` element of an entry. `None` if the entry is absent,
    /// empty, or of another type.
    pub fn find_i32(&self, tag: MetadataTag) -> Option<i32> {
        self.find(tag).and_then(MetadataValue::first_i32)
    }

    pub fn frame_id(&self) -> Option<FrameId> {
        self.find_i32(MetadataTag::REQUEST_ID)
    }

    pub fn frame_count(&self) -> Option<i32> {
        self.find_i32(MetadataTag::REQUEST_FRAME_COUNT)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MetadataTag, &MetadataValue)> {
        self.entries.iter()
    }

    /// Write one line per entry, each prefixed by `indent` spaces.
    pub fn dump(&self, out: &mut dyn io::Write, indent: usize) -> io::Result<()> {
        writeln!(out, "{:indent$}{} entries", "", self.entries.len(), indent = indent)?;
        for (tag, value) in self.iter() {
            writeln!(out, "{:indent$}{}: {}", "", tag, value, indent = indent)?;
        }
        Ok(())
    }
}

/// The most recently cached frame, stamped with the time it was cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastFrame {
    pub frame: FrameMetadata,
    pub received_at: DateTime<Utc>,
}

impl LastFrame {
    pub fn new(frame: FrameMetadata) -> Self {
        Self {
            frame,
            received_at: Utc::now(),
        }
    }
}
