//! Per-file syntax tree container and tree-level metadata.

use crate::ast::SourceUnit;
use serde::{Deserialize, Serialize};
use veris_diagnostics::Diagnostic;

/// The net type applied to implicitly declared nets in a tree, set by
/// `` `default_nettype `` before the tree was parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefaultNetType {
    /// `wire` (the language default).
    Wire,
    /// `tri`
    Tri,
    /// `uwire` — single-driver wire.
    Uwire,
    /// `wand`
    Wand,
    /// `wor`
    Wor,
    /// `` `default_nettype none `` — implicit nets are errors.
    None,
}

/// A time unit for `` `timescale `` metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimeUnit {
    /// Femtoseconds.
    Fs,
    /// Picoseconds.
    Ps,
    /// Nanoseconds.
    Ns,
    /// Microseconds.
    Us,
    /// Milliseconds.
    Ms,
    /// Seconds.
    S,
}

/// A `` `timescale `` value: unit and precision, each a magnitude of
/// 1, 10, or 100 in a [`TimeUnit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeScale {
    /// Magnitude of the time unit (1, 10, or 100).
    pub unit_magnitude: u16,
    /// The time unit.
    pub unit: TimeUnit,
    /// Magnitude of the precision (1, 10, or 100).
    pub precision_magnitude: u16,
    /// The precision unit.
    pub precision: TimeUnit,
}

/// The `` `unconnected_drive `` policy in effect for a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnconnectedDrive {
    /// No directive: unconnected inputs float.
    None,
    /// Unconnected input ports are pulled down.
    Pull0,
    /// Unconnected input ports are pulled up.
    Pull1,
}

/// A parsed source file, as handed to the elaboration engine.
///
/// Trees are immutable for the lifetime of any compilation that borrows
/// them. The metadata fields record the preprocessor directives that were
/// in effect; the parse diagnostics are forwarded verbatim into the
/// compilation's diagnostic store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntaxTree {
    /// The root of the parsed file.
    pub root: SourceUnit,
    /// Net type for implicit net declarations.
    pub default_net_type: DefaultNetType,
    /// Optional `` `timescale `` in effect.
    pub time_scale: Option<TimeScale>,
    /// Unconnected-drive policy in effect.
    pub unconnected_drive: UnconnectedDrive,
    /// Diagnostics the parser produced while building this tree.
    pub parse_diagnostics: Vec<Diagnostic>,
}

impl SyntaxTree {
    /// Creates a tree with default metadata around a parsed source unit.
    pub fn new(root: SourceUnit) -> Self {
        Self {
            root,
            default_net_type: DefaultNetType::Wire,
            time_scale: None,
            unconnected_drive: UnconnectedDrive::None,
            parse_diagnostics: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veris_source::Span;

    #[test]
    fn tree_defaults() {
        let tree = SyntaxTree::new(SourceUnit {
            items: Vec::new(),
            span: Span::DUMMY,
        });
        assert_eq!(tree.default_net_type, DefaultNetType::Wire);
        assert_eq!(tree.time_scale, None);
        assert_eq!(tree.unconnected_drive, UnconnectedDrive::None);
        assert!(tree.parse_diagnostics.is_empty());
    }

    #[test]
    fn time_units_ordered_by_magnitude() {
        assert!(TimeUnit::Fs < TimeUnit::Ps);
        assert!(TimeUnit::Ns < TimeUnit::S);
    }
}
