//! Diagnostic codes with category prefixes.

use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The category of a diagnostic code, determining its prefix letter and
/// its severity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Error diagnostics, prefixed with `E`.
    Error,
    /// Warning diagnostics, prefixed with `W`.
    Warning,
    /// Note diagnostics (sub-diagnostics of other messages), prefixed with `N`.
    Note,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Error => 'E',
            Category::Warning => 'W',
            Category::Note => 'N',
        }
    }
}

/// A structured diagnostic code: a category prefix plus a numeric
/// identifier, displayed as e.g. `E214` or `W302`.
///
/// The derived `Ord` (category, then number) is the code tie-break used
/// when two diagnostics share a source location.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The category of this diagnostic.
    pub category: Category,
    /// The numeric identifier within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a new diagnostic code.
    pub const fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }

    /// The severity of every diagnostic carrying this code.
    ///
    /// Severity is a pure function of the code so that repeated emissions
    /// always agree and external tools can classify by code alone.
    pub fn severity(self) -> Severity {
        match self.category {
            Category::Error => Severity::Error,
            Category::Warning => Severity::Warning,
            Category::Note => Severity::Note,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_prefixes() {
        assert_eq!(Category::Error.prefix(), 'E');
        assert_eq!(Category::Warning.prefix(), 'W');
        assert_eq!(Category::Note.prefix(), 'N');
    }

    #[test]
    fn display_format() {
        assert_eq!(
            format!("{}", DiagnosticCode::new(Category::Error, 214)),
            "E214"
        );
        assert_eq!(
            format!("{}", DiagnosticCode::new(Category::Warning, 5)),
            "W005"
        );
    }

    #[test]
    fn severity_is_function_of_category() {
        assert_eq!(
            DiagnosticCode::new(Category::Error, 1).severity(),
            Severity::Error
        );
        assert_eq!(
            DiagnosticCode::new(Category::Warning, 1).severity(),
            Severity::Warning
        );
        assert_eq!(
            DiagnosticCode::new(Category::Note, 1).severity(),
            Severity::Note
        );
    }

    #[test]
    fn ordering() {
        let a = DiagnosticCode::new(Category::Error, 1);
        let b = DiagnosticCode::new(Category::Error, 2);
        let c = DiagnosticCode::new(Category::Warning, 1);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn serde_roundtrip() {
        let code = DiagnosticCode::new(Category::Error, 300);
        let json = serde_json::to_string(&code).unwrap();
        let back: DiagnosticCode = serde_json::from_str(&json).unwrap();
        assert_eq!(code, back);
    }
}
