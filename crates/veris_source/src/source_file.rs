//! Source file representation with line-start indexing.

use crate::file_id::FileId;
use std::path::PathBuf;

/// A source file registered with the compilation session.
///
/// Stores the file text along with precomputed line-start offsets so that
/// span resolution is a binary search rather than a text scan.
pub struct SourceFile {
    /// The unique identifier of this file within the [`SourceDb`](crate::SourceDb).
    pub id: FileId,
    /// The filesystem path (or a synthetic name for in-memory sources).
    pub path: PathBuf,
    /// The full text content of the file.
    pub content: String,
    /// Byte offsets of each line start; the first entry is always 0.
    line_starts: Vec<u32>,
}

impl SourceFile {
    /// Creates a new `SourceFile`, precomputing its line starts.
    pub fn new(id: FileId, path: PathBuf, content: String) -> Self {
        let line_starts = compute_line_starts(&content);
        Self {
            id,
            path,
            content,
            line_starts,
        }
    }

    /// Converts a byte offset into 1-indexed (line, column) coordinates.
    pub fn line_col(&self, byte_offset: u32) -> (u32, u32) {
        let line_idx = match self.line_starts.binary_search(&byte_offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let line = (line_idx as u32) + 1;
        let col = byte_offset - self.line_starts[line_idx] + 1;
        (line, col)
    }

    /// Returns the text between two byte offsets.
    pub fn snippet(&self, start: u32, end: u32) -> &str {
        &self.content[start as usize..end as usize]
    }
}

/// Computes the byte offsets at which each line of `content` begins.
fn compute_line_starts(content: &str) -> Vec<u32> {
    let mut starts = vec![0u32];
    for (i, byte) in content.bytes().enumerate() {
        if byte == b'\n' {
            starts.push((i + 1) as u32);
        }
    }
    starts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_file(content: &str) -> SourceFile {
        SourceFile::new(
            FileId::from_raw(0),
            PathBuf::from("test.sv"),
            content.to_string(),
        )
    }

    #[test]
    fn line_col_resolution() {
        let f = make_file("abc\ndef\nghi");
        assert_eq!(f.line_col(0), (1, 1));
        assert_eq!(f.line_col(4), (2, 1));
        assert_eq!(f.line_col(5), (2, 2));
        assert_eq!(f.line_col(8), (3, 1));
    }

    #[test]
    fn snippet_extraction() {
        let f = make_file("module m; endmodule");
        assert_eq!(f.snippet(0, 6), "module");
        assert_eq!(f.snippet(7, 8), "m");
    }

    #[test]
    fn empty_file() {
        let f = make_file("");
        assert_eq!(f.line_col(0), (1, 1));
    }
}
