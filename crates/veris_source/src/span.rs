//! Byte-offset ranges within source files.

use crate::file_id::FileId;
use serde::{Deserialize, Serialize};

/// A byte offset range within a source file.
///
/// Spans identify where every syntax node, symbol, and diagnostic came
/// from. `start` is inclusive, `end` exclusive. The derived `Ord` sorts by
/// file, then start offset, then end offset — the order the diagnostic
/// store uses for its location sort.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    /// The source file this span belongs to.
    pub file: FileId,
    /// Byte offset of the start of the span (inclusive).
    pub start: u32,
    /// Byte offset of the end of the span (exclusive).
    pub end: u32,
}

impl Span {
    /// A dummy span for entities without a source location (built-in
    /// types, the design root, test fixtures).
    pub const DUMMY: Span = Span {
        file: FileId::DUMMY,
        start: 0,
        end: 0,
    };

    /// Creates a new span in the given file covering the given byte range.
    pub fn new(file: FileId, start: u32, end: u32) -> Self {
        Self { file, start, end }
    }

    /// Merges two spans in the same file into one covering both.
    ///
    /// # Panics
    ///
    /// Panics if the spans come from different files.
    pub fn merge(self, other: Span) -> Span {
        assert_eq!(
            self.file, other.file,
            "cannot merge spans from different files"
        );
        Span {
            file: self.file,
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Returns the length of this span in bytes.
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Returns `true` if this span covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` if this is the dummy span.
    pub fn is_dummy(&self) -> bool {
        self.file == FileId::DUMMY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construct() {
        let s = Span::new(FileId::from_raw(0), 10, 20);
        assert_eq!(s.len(), 10);
        assert!(!s.is_empty());
        assert!(!s.is_dummy());
    }

    #[test]
    fn merge_is_order_independent() {
        let f = FileId::from_raw(0);
        let a = Span::new(f, 5, 15);
        let b = Span::new(f, 10, 25);
        assert_eq!(a.merge(b), Span::new(f, 5, 25));
        assert_eq!(a.merge(b), b.merge(a));
    }

    #[test]
    #[should_panic(expected = "different files")]
    fn merge_across_files_panics() {
        let a = Span::new(FileId::from_raw(0), 0, 1);
        let b = Span::new(FileId::from_raw(1), 0, 1);
        let _ = a.merge(b);
    }

    #[test]
    fn ordering_is_file_then_offset() {
        let f0 = FileId::from_raw(0);
        let f1 = FileId::from_raw(1);
        assert!(Span::new(f0, 50, 60) < Span::new(f1, 0, 1));
        assert!(Span::new(f0, 10, 20) < Span::new(f0, 15, 16));
    }

    #[test]
    fn dummy_span() {
        assert!(Span::DUMMY.is_dummy());
        assert!(Span::DUMMY.is_empty());
    }

    #[test]
    fn serde_roundtrip() {
        let s = Span::new(FileId::from_raw(2), 3, 9);
        let json = serde_json::to_string(&s).unwrap();
        let back: Span = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
    }
}
