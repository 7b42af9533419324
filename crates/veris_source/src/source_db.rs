//! Central database of source files known to a compilation session.

use crate::file_id::FileId;
use crate::resolved_span::ResolvedSpan;
use crate::source_file::SourceFile;
use crate::span::Span;
use std::io;
use std::path::{Path, PathBuf};

/// The source database, owning all loaded source text and resolving
/// [`FileId`] + byte offsets to line/column coordinates.
///
/// The elaboration engine holds spans only; external renderers combine
/// them with a `SourceDb` to produce human-readable locations.
pub struct SourceDb {
    files: Vec<SourceFile>,
}

impl SourceDb {
    /// Creates an empty source database.
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Loads a source file from the filesystem and returns its [`FileId`].
    pub fn load_file(&mut self, path: &Path) -> Result<FileId, io::Error> {
        let content = std::fs::read_to_string(path)?;
        Ok(self.add_source(path.to_path_buf(), content))
    }

    /// Adds a source file from an in-memory string (useful for tests).
    ///
    /// The `name` is used as the file path in resolved spans.
    pub fn add_source(&mut self, name: impl Into<PathBuf>, content: String) -> FileId {
        let id = FileId::from_raw(self.files.len() as u32);
        self.files.push(SourceFile::new(id, name.into(), content));
        id
    }

    /// Returns the [`SourceFile`] for the given [`FileId`].
    ///
    /// # Panics
    ///
    /// Panics if the `FileId` is invalid.
    pub fn get_file(&self, id: FileId) -> &SourceFile {
        &self.files[id.as_raw() as usize]
    }

    /// Resolves a [`Span`] to 1-indexed line/column coordinates.
    pub fn resolve_span(&self, span: Span) -> ResolvedSpan {
        let file = self.get_file(span.file);
        let (start_line, start_col) = file.line_col(span.start);
        let (end_line, end_col) = file.line_col(span.end.saturating_sub(1).max(span.start));
        ResolvedSpan {
            file_path: file.path.clone(),
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Returns the source text covered by a [`Span`].
    pub fn snippet(&self, span: Span) -> &str {
        self.get_file(span.file).snippet(span.start, span.end)
    }
}

impl Default for SourceDb {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_get() {
        let mut db = SourceDb::new();
        let id = db.add_source("m.sv", "module m; endmodule".to_string());
        assert_eq!(db.get_file(id).content, "module m; endmodule");
    }

    #[test]
    fn resolve_span() {
        let mut db = SourceDb::new();
        let id = db.add_source("m.sv", "abc\ndef\nghi".to_string());
        let resolved = db.resolve_span(Span::new(id, 4, 7));
        assert_eq!(resolved.start_line, 2);
        assert_eq!(resolved.start_col, 1);
        assert_eq!(resolved.end_line, 2);
        assert_eq!(resolved.end_col, 3);
    }

    #[test]
    fn snippet() {
        let mut db = SourceDb::new();
        let id = db.add_source("m.sv", "wire w;".to_string());
        assert_eq!(db.snippet(Span::new(id, 0, 4)), "wire");
    }

    #[test]
    fn multiple_files_get_distinct_ids() {
        let mut db = SourceDb::new();
        let a = db.add_source("a.sv", String::new());
        let b = db.add_source("b.sv", String::new());
        assert_ne!(a, b);
    }
}
