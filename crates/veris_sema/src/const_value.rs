//! Compile-time constant values.

use serde::{Deserialize, Serialize};
use veris_common::{Logic, LogicVec};

/// A fully evaluated compile-time value.
///
/// Produced by the constant evaluator and stored for parameter values,
/// enum members, and elaboration-control expressions. Aggregates mirror
/// the unpacked type shapes; packed values are plain [`LogicVec`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstantValue {
    /// An arbitrary-width four-state integer.
    Int(LogicVec),
    /// A double-precision real.
    Real(f64),
    /// A single-precision shortreal.
    Shortreal(f32),
    /// A string.
    Str(String),
    /// Elements of a fixed-size array or queue, in index order.
    Elements(Vec<ConstantValue>),
    /// An associative array as key/value pairs, sorted by key where the
    /// key type has a natural order.
    Map(Vec<(ConstantValue, ConstantValue)>),
    /// An unpacked struct, one value per field in declaration order.
    Struct(Vec<ConstantValue>),
    /// An unpacked tagged union: the active member index and its value.
    Union {
        /// The declaration index of the active member.
        member: u32,
        /// The active member's value.
        value: Box<ConstantValue>,
    },
    /// The null class handle.
    NullClass,
    /// The unbounded marker (`$`).
    Unbounded,
    /// A placeholder for values that could not be computed.
    Null,
}

impl ConstantValue {
    /// Returns `true` if this is the [`Null`](ConstantValue::Null)
    /// placeholder.
    pub fn is_null(&self) -> bool {
        matches!(self, ConstantValue::Null)
    }

    /// Converts to an `i64` where a natural integer interpretation
    /// exists.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            ConstantValue::Int(v) => v.to_i64(),
            ConstantValue::Real(f) => Some(*f as i64),
            ConstantValue::Shortreal(f) => Some(*f as i64),
            _ => None,
        }
    }

    /// The truth value of this constant in a condition position.
    ///
    /// Integers follow four-state truthiness; reals compare against zero;
    /// strings are true when non-empty. Values without a truth
    /// interpretation are X.
    pub fn truthy(&self) -> Logic {
        match self {
            ConstantValue::Int(v) => v.truthy(),
            ConstantValue::Real(f) => {
                if *f != 0.0 {
                    Logic::One
                } else {
                    Logic::Zero
                }
            }
            ConstantValue::Shortreal(f) => {
                if *f != 0.0 {
                    Logic::One
                } else {
                    Logic::Zero
                }
            }
            ConstantValue::Str(s) => {
                if s.is_empty() {
                    Logic::Zero
                } else {
                    Logic::One
                }
            }
            _ => Logic::X,
        }
    }

    /// Convenience constructor for a 32-bit signed integer constant.
    pub fn int(value: i64) -> Self {
        ConstantValue::Int(LogicVec::from_i64(value, 32))
    }
}

impl std::fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstantValue::Int(v) => match v.to_i64() {
                Some(n) => write!(f, "{n}"),
                None => write!(f, "{v}"),
            },
            ConstantValue::Real(r) => write!(f, "{r}"),
            ConstantValue::Shortreal(r) => write!(f, "{r}"),
            ConstantValue::Str(s) => write!(f, "\"{s}\""),
            ConstantValue::Elements(elems) => {
                write!(f, "'{{")?;
                for (i, e) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{e}")?;
                }
                write!(f, "}}")
            }
            ConstantValue::Map(pairs) => {
                write!(f, "'{{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}:{v}")?;
                }
                write!(f, "}}")
            }
            ConstantValue::Struct(fields) => {
                write!(f, "'{{")?;
                for (i, v) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "}}")
            }
            ConstantValue::Union { member, value } => write!(f, "tagged #{member} {value}"),
            ConstantValue::NullClass => write!(f, "null"),
            ConstantValue::Unbounded => write!(f, "$"),
            ConstantValue::Null => write!(f, "<null>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_convenience() {
        let v = ConstantValue::int(42);
        assert_eq!(v.to_i64(), Some(42));
        assert_eq!(format!("{v}"), "42");
    }

    #[test]
    fn truthiness() {
        assert_eq!(ConstantValue::int(0).truthy(), Logic::Zero);
        assert_eq!(ConstantValue::int(-1).truthy(), Logic::One);
        assert_eq!(ConstantValue::Real(0.0).truthy(), Logic::Zero);
        assert_eq!(ConstantValue::Str("x".into()).truthy(), Logic::One);
        assert_eq!(ConstantValue::Unbounded.truthy(), Logic::X);
    }

    #[test]
    fn display_aggregates() {
        let v = ConstantValue::Elements(vec![ConstantValue::int(1), ConstantValue::int(2)]);
        assert_eq!(format!("{v}"), "'{1, 2}");
        let s = ConstantValue::Struct(vec![ConstantValue::int(3)]);
        assert_eq!(format!("{s}"), "'{3}");
    }

    #[test]
    fn null_placeholder() {
        assert!(ConstantValue::Null.is_null());
        assert!(!ConstantValue::int(0).is_null());
        assert_eq!(ConstantValue::Null.to_i64(), None);
    }

    #[test]
    fn unknown_int_displays_as_literal() {
        let v = ConstantValue::Int(LogicVec::filled(4, Logic::X));
        assert_eq!(format!("{v}"), "4'bxxxx");
    }
}
