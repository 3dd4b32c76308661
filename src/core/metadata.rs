//! Metadata for transfer files.
//!
//! Metadata is an ordered map of string keys to arbitrary JSON values. A few
//! keys have fixed meaning (kind, captured range, description...); anything
//! else a caller stores is carried through save/load untouched.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::time_range::FrameRange;

/// Ordered key/value metadata.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetaData {
    entries: IndexMap<String, Value>,
}

impl MetaData {
    /// Create empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, keeping the key's original position if it already exists.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Get a string value.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    /// Get a numeric value.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.entries.get(key).and_then(Value::as_f64)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove a key and return its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    // === Common metadata keys ===

    /// Transfer kind key ("pose", "animation", "selectionSet").
    pub const KIND_KEY: &'static str = "kind";

    /// Free-form description key.
    pub const DESCRIPTION_KEY: &'static str = "description";

    /// Captured range start (animation).
    pub const START_FRAME_KEY: &'static str = "startFrame";

    /// Captured range end (animation).
    pub const END_FRAME_KEY: &'static str = "endFrame";

    /// Capturing user.
    pub const USER_KEY: &'static str = "user";

    /// Creation time, unix seconds.
    pub const CTIME_KEY: &'static str = "ctime";

    /// Library name and build that wrote the file.
    pub const WRITER_KEY: &'static str = "writer";

    pub fn description(&self) -> Option<&str> {
        self.get_str(Self::DESCRIPTION_KEY)
    }

    pub fn set_description(&mut self, description: &str) {
        self.set(Self::DESCRIPTION_KEY, description);
    }

    /// Captured frame range, if both ends are present and ordered.
    pub fn captured_range(&self) -> Option<FrameRange> {
        let start = self.get_f64(Self::START_FRAME_KEY)?;
        let end = self.get_f64(Self::END_FRAME_KEY)?;
        FrameRange::new(start, end).ok()
    }

    pub fn set_captured_range(&mut self, range: FrameRange) {
        self.set(Self::START_FRAME_KEY, range.start());
        self.set(Self::END_FRAME_KEY, range.end());
    }
}

impl fmt::Debug for MetaData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl FromIterator<(String, Value)> for MetaData {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
