//! Parameter override trees: command-line overrides and collected
//! defparam values, mirrored over the instance hierarchy.

use crate::const_value::ConstantValue;
use std::collections::HashMap;
use veris_common::{Ident, Interner};

/// One node of the override tree. The root corresponds to the design
/// root; each child edge is an instance (or generate block) name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamOverrideNode {
    /// Parameter overrides applying at this level, by parameter name.
    pub overrides: HashMap<Ident, ConstantValue>,
    /// Child nodes by instance name.
    pub children: HashMap<Ident, ParamOverrideNode>,
}

impl ParamOverrideNode {
    /// Creates an empty node.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the child node for an instance name, if present.
    pub fn child(&self, name: Ident) -> Option<&ParamOverrideNode> {
        self.children.get(&name)
    }

    /// Returns the override value for a parameter at this level.
    pub fn value_for(&self, name: Ident) -> Option<&ConstantValue> {
        self.overrides.get(&name)
    }

    /// Inserts an override along a hierarchical path, creating
    /// intermediate nodes as needed. The last path segment is the
    /// parameter name.
    pub fn insert_path(&mut self, path: &[Ident], value: ConstantValue) {
        match path {
            [] => {}
            [param] => {
                self.overrides.insert(*param, value);
            }
            [step, rest @ ..] => {
                self.children
                    .entry(*step)
                    .or_default()
                    .insert_path(rest, value);
            }
        }
    }

    /// Returns `true` when the node holds no overrides anywhere.
    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty() && self.children.values().all(Self::is_empty)
    }
}

/// Parses one `name=value` command-line override.
///
/// Values may be decimal integers (optionally negative) or quoted
/// strings. Returns `None` for anything else; the caller diagnoses.
pub fn parse_override(text: &str, interner: &Interner) -> Option<(Ident, ConstantValue)> {
    let (name, value) = text.split_once('=')?;
    let name = name.trim();
    let value = value.trim();
    if name.is_empty() || value.is_empty() {
        return None;
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        || name.chars().next()?.is_ascii_digit()
    {
        return None;
    }
    let ident = interner.get_or_intern(name);
    if let Some(stripped) = value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        return Some((ident, ConstantValue::Str(stripped.to_string())));
    }
    let parsed: i64 = value.parse().ok()?;
    Some((ident, ConstantValue::int(parsed)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_lookup() {
        let interner = Interner::new();
        let top = interner.get_or_intern("top");
        let sub = interner.get_or_intern("sub");
        let p = interner.get_or_intern("P");
        let mut root = ParamOverrideNode::new();
        root.insert_path(&[top, sub, p], ConstantValue::int(7));

        let at_top = root.child(top).unwrap();
        let at_sub = at_top.child(sub).unwrap();
        assert_eq!(at_sub.value_for(p), Some(&ConstantValue::int(7)));
        assert_eq!(at_top.value_for(p), None);
    }

    #[test]
    fn direct_parameter_override() {
        let interner = Interner::new();
        let p = interner.get_or_intern("WIDTH");
        let mut root = ParamOverrideNode::new();
        root.insert_path(&[p], ConstantValue::int(16));
        assert_eq!(root.value_for(p), Some(&ConstantValue::int(16)));
    }

    #[test]
    fn empty_detection() {
        let interner = Interner::new();
        let mut root = ParamOverrideNode::new();
        assert!(root.is_empty());
        root.insert_path(
            &[interner.get_or_intern("a"), interner.get_or_intern("P")],
            ConstantValue::int(1),
        );
        assert!(!root.is_empty());
    }

    #[test]
    fn parse_integer_override() {
        let interner = Interner::new();
        let (name, value) = parse_override("WIDTH=8", &interner).unwrap();
        assert_eq!(interner.resolve(name), "WIDTH");
        assert_eq!(value, ConstantValue::int(8));
        let (_, neg) = parse_override("OFFSET=-3", &interner).unwrap();
        assert_eq!(neg, ConstantValue::int(-3));
    }

    #[test]
    fn parse_string_override() {
        let interner = Interner::new();
        let (_, value) = parse_override("MODE=\"fast\"", &interner).unwrap();
        assert_eq!(value, ConstantValue::Str("fast".to_string()));
    }

    #[test]
    fn parse_rejects_malformed() {
        let interner = Interner::new();
        assert!(parse_override("JUSTANAME", &interner).is_none());
        assert!(parse_override("=5", &interner).is_none());
        assert!(parse_override("P=", &interner).is_none());
        assert!(parse_override("1P=5", &interner).is_none());
        assert!(parse_override("P=notanumber", &interner).is_none());
    }
}
