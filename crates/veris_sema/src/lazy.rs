//! Cycle-detecting lazy cells.

use serde::{Deserialize, Serialize};

/// A lazily computed value with explicit cycle detection.
///
/// Declared types, parameter values, default arguments, and coverage-bin
/// bodies all start [`Unresolved`](Lazy::Unresolved). The first consumer
/// moves the cell to `Resolving` while it computes; observing `Resolving`
/// from inside that computation means the value depends on itself, which
/// callers report as a cycle diagnostic. Once `Resolved`, the value never
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Lazy<T> {
    /// Not yet computed.
    Unresolved,
    /// Computation in progress; a read in this state is a cycle.
    Resolving,
    /// The final value.
    Resolved(T),
}

impl<T> Lazy<T> {
    /// Returns the resolved value, if any.
    pub fn get(&self) -> Option<&T> {
        match self {
            Lazy::Resolved(v) => Some(v),
            _ => None,
        }
    }

    /// Returns `true` once the value has been resolved.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Lazy::Resolved(_))
    }

    /// Returns `true` while the value is being computed.
    pub fn is_resolving(&self) -> bool {
        matches!(self, Lazy::Resolving)
    }
}

impl<T> Default for Lazy<T> {
    fn default() -> Self {
        Lazy::Unresolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_transitions() {
        let mut cell: Lazy<u32> = Lazy::default();
        assert!(!cell.is_resolved());
        assert!(!cell.is_resolving());
        assert_eq!(cell.get(), None);

        cell = Lazy::Resolving;
        assert!(cell.is_resolving());

        cell = Lazy::Resolved(7);
        assert!(cell.is_resolved());
        assert_eq!(cell.get(), Some(&7));
    }
}
