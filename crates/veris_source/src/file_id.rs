//! Opaque identifier for source files known to a compilation session.

use serde::{Deserialize, Serialize};

/// Opaque identifier for a source file registered in the
/// [`SourceDb`](crate::SourceDb).
///
/// Every syntax tree handed to the elaboration engine refers to exactly
/// one file; the `FileId` inside each [`Span`](crate::Span) ties semantic
/// model nodes back to it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(u32);

impl FileId {
    /// A dummy file ID for synthetic spans (built-in symbols, tests).
    pub const DUMMY: FileId = FileId(u32::MAX);

    /// Creates a `FileId` from a raw `u32` value.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw `u32` value of this `FileId`.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let id = FileId::from_raw(3);
        assert_eq!(id.as_raw(), 3);
    }

    #[test]
    fn dummy_is_distinct() {
        assert_ne!(FileId::DUMMY, FileId::from_raw(0));
    }

    #[test]
    fn ordering_follows_raw_value() {
        assert!(FileId::from_raw(1) < FileId::from_raw(2));
    }

    #[test]
    fn serde_roundtrip() {
        let id = FileId::from_raw(9);
        let json = serde_json::to_string(&id).unwrap();
        let back: FileId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
