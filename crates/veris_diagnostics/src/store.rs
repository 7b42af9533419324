//! Deduplicated, location-sorted accumulator for diagnostics.

use crate::code::DiagnosticCode;
use crate::diagnostic::Diagnostic;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use veris_source::{FileId, Span};

/// The key under which repeated emissions collapse: same code at the same
/// fully-expanded location.
type DedupKey = (DiagnosticCode, FileId, u32);

struct Entry {
    diag: Diagnostic,
    duplicates: u32,
}

#[derive(Default)]
struct Inner {
    semantic: Vec<Entry>,
    parse: Vec<Diagnostic>,
    index: HashMap<DedupKey, usize>,
}

/// Accumulator for diagnostics emitted during one elaboration.
///
/// Semantic diagnostics are deduplicated at emission: a second diagnostic
/// with the same code at the same location folds into the first as a
/// duplicate count. This keeps error volume independent of how many times
/// a module is instantiated. Parse diagnostics (forwarded from the
/// external parser) are kept in a separate partition and never
/// deduplicated here.
///
/// The error count tracks deduplicated error-severity semantic
/// diagnostics and is readable without locking.
pub struct DiagnosticStore {
    inner: Mutex<Inner>,
    error_count: AtomicUsize,
}

impl DiagnosticStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            error_count: AtomicUsize::new(0),
        }
    }

    /// Emits a semantic diagnostic.
    ///
    /// If a diagnostic with the same code and location was already
    /// emitted, the new one is dropped and the first one's duplicate
    /// count increments; its labels and notes are kept as emitted first.
    pub fn emit(&self, diag: Diagnostic) {
        let key = (diag.code, diag.primary_span.file, diag.primary_span.start);
        let mut inner = self.inner.lock().unwrap();
        if let Some(&idx) = inner.index.get(&key) {
            inner.semantic[idx].duplicates += 1;
            return;
        }
        if diag.severity().is_error() {
            self.error_count.fetch_add(1, Ordering::Relaxed);
        }
        let idx = inner.semantic.len();
        inner.semantic.push(Entry {
            diag,
            duplicates: 0,
        });
        inner.index.insert(key, idx);
    }

    /// Forwards a parse diagnostic produced by the external parser.
    pub fn forward_parse(&self, diag: Diagnostic) {
        self.inner.lock().unwrap().parse.push(diag);
    }

    /// Returns `true` if any error-severity semantic diagnostic has been
    /// emitted.
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Returns the number of distinct error-severity semantic diagnostics.
    pub fn error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Returns the semantic diagnostics, deduplicated and stably sorted
    /// by source location, then code.
    pub fn semantic(&self) -> Vec<Diagnostic> {
        let inner = self.inner.lock().unwrap();
        let mut out: Vec<Diagnostic> = inner.semantic.iter().map(|e| e.diag.clone()).collect();
        sort_diagnostics(&mut out);
        out
    }

    /// Returns the forwarded parse diagnostics, sorted the same way.
    pub fn parse(&self) -> Vec<Diagnostic> {
        let inner = self.inner.lock().unwrap();
        let mut out = inner.parse.clone();
        sort_diagnostics(&mut out);
        out
    }

    /// Returns parse and semantic diagnostics merged into one sorted list.
    pub fn all(&self) -> Vec<Diagnostic> {
        let inner = self.inner.lock().unwrap();
        let mut out: Vec<Diagnostic> = inner
            .parse
            .iter()
            .cloned()
            .chain(inner.semantic.iter().map(|e| e.diag.clone()))
            .collect();
        sort_diagnostics(&mut out);
        out
    }

    /// Returns how many additional emissions were folded into the stored
    /// diagnostic with this code and span, or `None` if none is stored.
    pub fn duplicates_of(&self, code: DiagnosticCode, span: Span) -> Option<u32> {
        let inner = self.inner.lock().unwrap();
        let key = (code, span.file, span.start);
        inner.index.get(&key).map(|&idx| inner.semantic[idx].duplicates)
    }
}

fn sort_diagnostics(diags: &mut [Diagnostic]) {
    diags.sort_by(|a, b| {
        (a.primary_span, a.code).cmp(&(b.primary_span, b.code))
    });
}

impl Default for DiagnosticStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::Category;

    const E1: DiagnosticCode = DiagnosticCode::new(Category::Error, 1);
    const E2: DiagnosticCode = DiagnosticCode::new(Category::Error, 2);
    const W1: DiagnosticCode = DiagnosticCode::new(Category::Warning, 1);

    fn span(file: u32, start: u32) -> Span {
        Span::new(FileId::from_raw(file), start, start + 1)
    }

    #[test]
    fn empty_store() {
        let store = DiagnosticStore::new();
        assert!(!store.has_errors());
        assert!(store.semantic().is_empty());
        assert!(store.all().is_empty());
    }

    #[test]
    fn emit_counts_errors_not_warnings() {
        let store = DiagnosticStore::new();
        store.emit(Diagnostic::new(E1, "a", span(0, 0)));
        store.emit(Diagnostic::new(W1, "b", span(0, 5)));
        assert_eq!(store.error_count(), 1);
        assert_eq!(store.semantic().len(), 2);
    }

    #[test]
    fn same_code_same_location_deduplicates() {
        let store = DiagnosticStore::new();
        for _ in 0..100 {
            store.emit(Diagnostic::new(E1, "type mismatch", span(0, 7)));
        }
        assert_eq!(store.semantic().len(), 1);
        assert_eq!(store.error_count(), 1);
        assert_eq!(store.duplicates_of(E1, span(0, 7)), Some(99));
    }

    #[test]
    fn same_code_different_location_kept() {
        let store = DiagnosticStore::new();
        store.emit(Diagnostic::new(E1, "a", span(0, 1)));
        store.emit(Diagnostic::new(E1, "a", span(0, 2)));
        assert_eq!(store.semantic().len(), 2);
    }

    #[test]
    fn different_code_same_location_kept() {
        let store = DiagnosticStore::new();
        store.emit(Diagnostic::new(E1, "a", span(0, 1)));
        store.emit(Diagnostic::new(E2, "b", span(0, 1)));
        assert_eq!(store.semantic().len(), 2);
    }

    #[test]
    fn first_emission_wins() {
        let store = DiagnosticStore::new();
        store.emit(Diagnostic::new(E1, "first", span(0, 3)).with_help("keep me"));
        store.emit(Diagnostic::new(E1, "second", span(0, 3)));
        let diags = store.semantic();
        assert_eq!(diags[0].message, "first");
        assert_eq!(diags[0].help, vec!["keep me".to_string()]);
    }

    #[test]
    fn sorted_by_location_then_code() {
        let store = DiagnosticStore::new();
        store.emit(Diagnostic::new(E2, "later file", span(1, 0)));
        store.emit(Diagnostic::new(E2, "same loc higher code", span(0, 4)));
        store.emit(Diagnostic::new(E1, "same loc lower code", span(0, 4)));
        store.emit(Diagnostic::new(E1, "first", span(0, 0)));
        let msgs: Vec<_> = store.semantic().into_iter().map(|d| d.message).collect();
        assert_eq!(
            msgs,
            vec![
                "first",
                "same loc lower code",
                "same loc higher code",
                "later file"
            ]
        );
    }

    #[test]
    fn parse_partition_is_separate() {
        let store = DiagnosticStore::new();
        store.forward_parse(Diagnostic::new(E1, "parse", span(0, 0)));
        store.emit(Diagnostic::new(E2, "semantic", span(0, 1)));
        assert_eq!(store.parse().len(), 1);
        assert_eq!(store.semantic().len(), 1);
        assert_eq!(store.all().len(), 2);
        // Forwarded parse errors do not count toward the semantic error count.
        assert_eq!(store.error_count(), 1);
    }

    #[test]
    fn parse_diagnostics_never_dedup() {
        let store = DiagnosticStore::new();
        store.forward_parse(Diagnostic::new(E1, "p", span(0, 0)));
        store.forward_parse(Diagnostic::new(E1, "p", span(0, 0)));
        assert_eq!(store.parse().len(), 2);
    }
}
