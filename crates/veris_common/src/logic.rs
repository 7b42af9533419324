//! IEEE 1800 four-state logic values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};

/// A single four-state logic value as defined by IEEE 1800.
///
/// The four states represent:
/// - `Zero` — logic low (driven 0)
/// - `One` — logic high (driven 1)
/// - `X` — unknown or uninitialized value
/// - `Z` — high-impedance (not driven)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[repr(u8)]
pub enum Logic {
    /// Logic low (0).
    Zero = 0,
    /// Logic high (1).
    One = 1,
    /// Unknown or uninitialized.
    X = 2,
    /// High-impedance (not driven).
    Z = 3,
}

impl Logic {
    /// Converts a literal digit character to a [`Logic`] value.
    ///
    /// Accepts '0', '1', 'x'/'X', 'z'/'Z', and '?' (an alias for Z in
    /// based literals).
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Logic::Zero),
            '1' => Some(Logic::One),
            'x' | 'X' => Some(Logic::X),
            'z' | 'Z' | '?' => Some(Logic::Z),
            _ => None,
        }
    }

    /// Returns `true` for the `X` and `Z` states.
    pub fn is_unknown(self) -> bool {
        matches!(self, Logic::X | Logic::Z)
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Logic::Zero => write!(f, "0"),
            Logic::One => write!(f, "1"),
            Logic::X => write!(f, "x"),
            Logic::Z => write!(f, "z"),
        }
    }
}

/// Four-state AND: zero dominates, `1 & 1 = 1`, anything else is X.
impl BitAnd for Logic {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        use Logic::*;
        match (self, rhs) {
            (Zero, _) | (_, Zero) => Zero,
            (One, One) => One,
            _ => X,
        }
    }
}

/// Four-state OR: one dominates, `0 | 0 = 0`, anything else is X.
impl BitOr for Logic {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        use Logic::*;
        match (self, rhs) {
            (One, _) | (_, One) => One,
            (Zero, Zero) => Zero,
            _ => X,
        }
    }
}

/// Four-state XOR: known operands give the boolean result, otherwise X.
impl BitXor for Logic {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self {
        use Logic::*;
        match (self, rhs) {
            (Zero, Zero) | (One, One) => Zero,
            (Zero, One) | (One, Zero) => One,
            _ => X,
        }
    }
}

/// Four-state NOT: `!0 = 1`, `!1 = 0`, X and Z invert to X.
impl Not for Logic {
    type Output = Self;

    fn not(self) -> Self {
        use Logic::*;
        match self {
            Zero => One,
            One => Zero,
            X | Z => X,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Logic::{self, *};

    #[test]
    fn and_truth_table() {
        assert_eq!(Zero & One, Zero);
        assert_eq!(Zero & X, Zero);
        assert_eq!(X & Zero, Zero);
        assert_eq!(One & One, One);
        assert_eq!(One & X, X);
        assert_eq!(One & Z, X);
        assert_eq!(Z & Z, X);
    }

    #[test]
    fn or_truth_table() {
        assert_eq!(One | Zero, One);
        assert_eq!(One | X, One);
        assert_eq!(X | One, One);
        assert_eq!(Zero | Zero, Zero);
        assert_eq!(Zero | X, X);
        assert_eq!(Z | Z, X);
    }

    #[test]
    fn xor_truth_table() {
        assert_eq!(Zero ^ Zero, Zero);
        assert_eq!(Zero ^ One, One);
        assert_eq!(One ^ One, Zero);
        assert_eq!(One ^ X, X);
        assert_eq!(Z ^ Zero, X);
    }

    #[test]
    fn not_values() {
        assert_eq!(!Zero, One);
        assert_eq!(!One, Zero);
        assert_eq!(!X, X);
        assert_eq!(!Z, X);
    }

    #[test]
    fn from_char() {
        assert_eq!(Logic::from_char('0'), Some(Zero));
        assert_eq!(Logic::from_char('1'), Some(One));
        assert_eq!(Logic::from_char('X'), Some(X));
        assert_eq!(Logic::from_char('z'), Some(Z));
        assert_eq!(Logic::from_char('?'), Some(Z));
        assert_eq!(Logic::from_char('2'), None);
    }

    #[test]
    fn unknown_states() {
        assert!(!Zero.is_unknown());
        assert!(!One.is_unknown());
        assert!(X.is_unknown());
        assert!(Z.is_unknown());
    }

    #[test]
    fn display() {
        assert_eq!(format!("{Zero}{One}{X}{Z}"), "01xz");
    }
}
