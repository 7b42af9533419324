//! Structured diagnostic messages.

use crate::code::DiagnosticCode;
use crate::label::Label;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use veris_source::Span;

/// A sub-diagnostic attached to a parent [`Diagnostic`].
///
/// Notes carry their own code and location — "declared here", "expanded
/// from here" — so renderers can point at a second place in the source.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Note {
    /// The code identifying the kind of note.
    pub code: DiagnosticCode,
    /// The note text.
    pub message: String,
    /// The location the note points at.
    pub span: Span,
}

/// A structured diagnostic message.
///
/// Each diagnostic has a code (from which its severity derives), a main
/// message and primary span, plus optional secondary labels, structured
/// notes, and free-form help strings. Construction is builder-style so
/// call sites can stream arguments onto a fresh diagnostic.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The code identifying the type of diagnostic.
    pub code: DiagnosticCode,
    /// The main diagnostic message.
    pub message: String,
    /// The primary source span where the issue was detected.
    pub primary_span: Span,
    /// Additional annotated source spans providing context.
    pub labels: Vec<Label>,
    /// Structured sub-diagnostics (e.g. "declared here").
    pub notes: Vec<Note>,
    /// Actionable free-form suggestions.
    pub help: Vec<String>,
}

impl Diagnostic {
    /// Creates a new diagnostic with the given code, message, and span.
    pub fn new(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            code,
            message: message.into(),
            primary_span: span,
            labels: Vec::new(),
            notes: Vec::new(),
            help: Vec::new(),
        }
    }

    /// The severity of this diagnostic, derived from its code.
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Adds a label to this diagnostic.
    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    /// Adds a structured note to this diagnostic.
    pub fn with_note(mut self, code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        self.notes.push(Note {
            code,
            message: message.into(),
            span,
        });
        self
    }

    /// Adds a help message to this diagnostic.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::Category;

    const CODE: DiagnosticCode = DiagnosticCode::new(Category::Error, 101);
    const NOTE: DiagnosticCode = DiagnosticCode::new(Category::Note, 1);

    #[test]
    fn severity_comes_from_code() {
        let d = Diagnostic::new(CODE, "undeclared identifier `foo`", Span::DUMMY);
        assert_eq!(d.severity(), Severity::Error);
    }

    #[test]
    fn builder_methods() {
        let d = Diagnostic::new(CODE, "cannot assign to `x`", Span::DUMMY)
            .with_label(Label::secondary(Span::DUMMY, "target is a net"))
            .with_note(NOTE, "declared here", Span::DUMMY)
            .with_help("use a continuous assignment instead");
        assert_eq!(d.labels.len(), 1);
        assert_eq!(d.notes.len(), 1);
        assert_eq!(d.notes[0].code, NOTE);
        assert_eq!(d.help.len(), 1);
    }

    #[test]
    fn serde_roundtrip() {
        let d = Diagnostic::new(CODE, "x", Span::DUMMY).with_note(NOTE, "y", Span::DUMMY);
        let json = serde_json::to_string(&d).unwrap();
        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(back.code, CODE);
        assert_eq!(back.notes.len(), 1);
    }
}
