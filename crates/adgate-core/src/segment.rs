//! # Segment Taxonomy
//!
//! Ads are classified into segments of the form `parent-child`
//! (e.g. `technology & computing-software`). The parent category is the
//! coarse classification used for aggregate measurement.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Separator between a segment's parent and child categories.
pub const SEGMENT_SEPARATOR: char = '-';

/// A non-empty ad classification segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Segment(String);

impl Segment {
    /// Create a segment, rejecting empty or whitespace-only input.
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ValidationError::EmptySegment);
        }
        Ok(Self(raw))
    }

    /// The full segment string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The parent category: everything before the first separator.
    pub fn parent(&self) -> &str {
        match self.0.split_once(SEGMENT_SEPARATOR) {
            Some((parent, _)) => parent,
            None => &self.0,
        }
    }

    /// Whether the segment names a child category.
    pub fn has_child(&self) -> bool {
        self.0.contains(SEGMENT_SEPARATOR)
    }
}

impl<'de> Deserialize<'de> for Segment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
