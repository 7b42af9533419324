//! Arbitrary-width packed vectors of four-state logic values.
//!
//! [`LogicVec`] is the value representation for integral constants: a bit
//! width, a signedness flag, and two packed bit planes. The value plane
//! holds the 0/1 bit pattern; the unknown plane marks bits that are X or Z
//! (an unknown bit with value plane 0 is X, with value plane 1 is Z).
//! Splitting the planes keeps bitwise operators and unknown propagation
//! word-parallel.

use crate::logic::Logic;
use serde::{Deserialize, Serialize};
use std::fmt;

const BITS_PER_WORD: u32 = 64;

fn word_count(width: u32) -> usize {
    width.div_ceil(BITS_PER_WORD) as usize
}

/// A packed vector of four-state [`Logic`] values with a signedness flag.
///
/// Bit 0 is the least significant bit. All operations that produce a new
/// vector normalize unknown result bits to X (value plane 0) and clear any
/// storage bits beyond the declared width.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogicVec {
    width: u32,
    signed: bool,
    val: Vec<u64>,
    unk: Vec<u64>,
}

impl LogicVec {
    /// Creates an unsigned vector of the given width with all bits zero.
    pub fn zero(width: u32) -> Self {
        let words = word_count(width);
        Self {
            width,
            signed: false,
            val: vec![0; words],
            unk: vec![0; words],
        }
    }

    /// Creates a vector with every bit set to the given logic value.
    pub fn filled(width: u32, value: Logic) -> Self {
        let mut v = Self::zero(width);
        for i in 0..width {
            v.set(i, value);
        }
        v
    }

    /// Creates an unsigned vector from the low `width` bits of a `u64`.
    pub fn from_u64(value: u64, width: u32) -> Self {
        let mut v = Self::zero(width);
        if !v.val.is_empty() {
            v.val[0] = value;
        }
        v.mask_top();
        v
    }

    /// Creates a signed vector from an `i64`, sign-extended or truncated
    /// to the given width.
    pub fn from_i64(value: i64, width: u32) -> Self {
        let mut v = Self::zero(width);
        let fill = if value < 0 { u64::MAX } else { 0 };
        for w in v.val.iter_mut() {
            *w = fill;
        }
        if !v.val.is_empty() {
            v.val[0] = value as u64;
        }
        v.signed = true;
        v.mask_top();
        v
    }

    /// Creates a one-bit vector from a boolean.
    pub fn from_bool(value: bool) -> Self {
        Self::from_u64(value as u64, 1)
    }

    /// Returns the number of bits in this vector.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns `true` if this vector is interpreted as signed.
    pub fn is_signed(&self) -> bool {
        self.signed
    }

    /// Returns a copy of this vector with the signedness flag replaced.
    pub fn as_signed(mut self, signed: bool) -> Self {
        self.signed = signed;
        self
    }

    /// Returns `true` if any bit is X or Z.
    pub fn has_unknown(&self) -> bool {
        self.unk.iter().any(|&w| w != 0)
    }

    /// Gets the logic value of the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn get(&self, index: u32) -> Logic {
        assert!(
            index < self.width,
            "bit {index} out of range for width {}",
            self.width
        );
        let w = (index / BITS_PER_WORD) as usize;
        let b = index % BITS_PER_WORD;
        match ((self.unk[w] >> b) & 1, (self.val[w] >> b) & 1) {
            (0, 0) => Logic::Zero,
            (0, _) => Logic::One,
            (_, 0) => Logic::X,
            _ => Logic::Z,
        }
    }

    /// Sets the bit at `index` to the given logic value.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn set(&mut self, index: u32, value: Logic) {
        assert!(
            index < self.width,
            "bit {index} out of range for width {}",
            self.width
        );
        let w = (index / BITS_PER_WORD) as usize;
        let b = index % BITS_PER_WORD;
        let (u, v) = match value {
            Logic::Zero => (0, 0),
            Logic::One => (0, 1),
            Logic::X => (1, 0),
            Logic::Z => (1, 1),
        };
        self.unk[w] = (self.unk[w] & !(1 << b)) | (u << b);
        self.val[w] = (self.val[w] & !(1 << b)) | (v << b);
    }

    /// Converts to a `u64` if every bit is known and the value fits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.has_unknown() {
            return None;
        }
        for &w in self.val.iter().skip(1) {
            if w != 0 {
                return None;
            }
        }
        Some(self.val.first().copied().unwrap_or(0))
    }

    /// Converts to an `i64` if every bit is known and the value fits.
    ///
    /// Signed vectors are sign-extended from their top bit; unsigned
    /// vectors must fit in the non-negative range of `i64`.
    pub fn to_i64(&self) -> Option<i64> {
        if self.has_unknown() {
            return None;
        }
        if self.signed && self.width > 0 && self.get(self.width - 1) == Logic::One {
            // Negative value fits iff every bit from 63 up is sign fill.
            for i in 63..self.width {
                if self.get(i) != Logic::One {
                    return None;
                }
            }
            let mut raw = self.val.first().copied().unwrap_or(0);
            if self.width < 64 {
                raw |= u64::MAX << self.width;
            }
            Some(raw as i64)
        } else {
            let raw = self.to_u64()?;
            i64::try_from(raw).ok()
        }
    }

    /// Returns a copy resized to `new_width`.
    ///
    /// Widening fills with the sign bit for signed vectors (including X/Z
    /// sign bits) and zero otherwise; narrowing truncates high bits.
    pub fn resized(&self, new_width: u32) -> Self {
        let mut out = Self::zero(new_width);
        out.signed = self.signed;
        let fill = if self.signed && self.width > 0 {
            self.get(self.width - 1)
        } else {
            Logic::Zero
        };
        for i in 0..new_width {
            let bit = if i < self.width { self.get(i) } else { fill };
            out.set(i, bit);
        }
        out
    }

    /// Concatenates `other` below this vector (this vector becomes the
    /// most significant part). The result is unsigned, per IEEE 1800
    /// concatenation semantics.
    pub fn concat(&self, other: &LogicVec) -> Self {
        let mut out = Self::zero(self.width + other.width);
        for i in 0..other.width {
            out.set(i, other.get(i));
        }
        for i in 0..self.width {
            out.set(other.width + i, self.get(i));
        }
        out
    }

    /// Extracts bits `[hi:lo]` inclusive as a new unsigned vector.
    ///
    /// # Panics
    ///
    /// Panics if `hi < lo` or `hi >= self.width()`.
    pub fn slice(&self, hi: u32, lo: u32) -> Self {
        assert!(hi >= lo && hi < self.width, "invalid slice [{hi}:{lo}]");
        let mut out = Self::zero(hi - lo + 1);
        for i in lo..=hi {
            out.set(i - lo, self.get(i));
        }
        out
    }

    /// Clears storage bits above the declared width.
    fn mask_top(&mut self) {
        let rem = self.width % BITS_PER_WORD;
        if rem != 0 {
            if let Some(last) = self.val.last_mut() {
                *last &= (1u64 << rem) - 1;
            }
            if let Some(last) = self.unk.last_mut() {
                *last &= (1u64 << rem) - 1;
            }
        }
    }

    /// Normalizes every unknown bit to X (clears the value plane under the
    /// unknown plane), so Z never survives an operation.
    fn normalize_unknowns(&mut self) {
        for (v, &u) in self.val.iter_mut().zip(self.unk.iter()) {
            *v &= !u;
        }
    }

    /// Full-width addition with carry. Any unknown operand bit makes the
    /// whole result X.
    pub fn add(&self, rhs: &LogicVec) -> Self {
        let width = self.width.max(rhs.width);
        let signed = self.signed && rhs.signed;
        if self.has_unknown() || rhs.has_unknown() {
            return Self::filled(width, Logic::X).as_signed(signed);
        }
        let a = self.resized(width);
        let b = rhs.resized(width);
        let mut out = Self::zero(width);
        out.signed = signed;
        let mut carry = 0u64;
        for i in 0..out.val.len() {
            let (s1, c1) = a.val[i].overflowing_add(b.val[i]);
            let (s2, c2) = s1.overflowing_add(carry);
            out.val[i] = s2;
            carry = (c1 | c2) as u64;
        }
        out.mask_top();
        out
    }

    /// Full-width subtraction (`a + !b + 1`). Any unknown operand bit
    /// makes the result X.
    pub fn sub(&self, rhs: &LogicVec) -> Self {
        let width = self.width.max(rhs.width);
        let signed = self.signed && rhs.signed;
        if self.has_unknown() || rhs.has_unknown() {
            return Self::filled(width, Logic::X).as_signed(signed);
        }
        let a = self.resized(width);
        let b = rhs.resized(width);
        let mut out = Self::zero(width);
        out.signed = signed;
        let mut carry = 1u64;
        for i in 0..out.val.len() {
            let (s1, c1) = a.val[i].overflowing_add(!b.val[i]);
            let (s2, c2) = s1.overflowing_add(carry);
            out.val[i] = s2;
            carry = (c1 | c2) as u64;
        }
        out.mask_top();
        out
    }

    /// Multiplication. Unknown operands, or known operands wider than 64
    /// bits, produce an all-X result.
    pub fn mul(&self, rhs: &LogicVec) -> Self {
        self.arith_narrow(rhs, false, |a, b| Some(a.wrapping_mul(b)))
    }

    /// Division. Division by zero and unknown operands produce all-X.
    pub fn div(&self, rhs: &LogicVec) -> Self {
        self.arith_narrow(rhs, false, |a, b| if b == 0 { None } else { Some(a / b) })
    }

    /// Remainder; the result takes the dividend's sign. A zero divisor
    /// and unknown operands produce all-X.
    pub fn rem(&self, rhs: &LogicVec) -> Self {
        self.arith_narrow(rhs, true, |a, b| if b == 0 { None } else { Some(a % b) })
    }

    /// Exponentiation with IEEE 1800 integer semantics on the evaluable
    /// subset: negative exponents truncate to zero (unless the base is
    /// ±1), unknowns produce all-X.
    pub fn pow(&self, rhs: &LogicVec) -> Self {
        let width = self.width.max(rhs.width);
        let (Some(base), Some(exp)) = (self.to_i64(), rhs.to_i64()) else {
            return Self::filled(width, Logic::X).as_signed(self.signed);
        };
        let value = if exp >= 0 {
            base.wrapping_pow(exp.min(u32::MAX as i64) as u32)
        } else {
            match base {
                1 => 1,
                -1 => {
                    if exp % 2 == 0 {
                        1
                    } else {
                        -1
                    }
                }
                0 => return Self::filled(width, Logic::X).as_signed(self.signed),
                _ => 0,
            }
        };
        Self::from_i64(value, width).as_signed(self.signed && rhs.signed)
    }

    /// Arithmetic negation (two's complement).
    pub fn neg(&self) -> Self {
        Self::zero(self.width).as_signed(true).sub(self)
    }

    fn arith_narrow(
        &self,
        rhs: &LogicVec,
        sign_from_dividend: bool,
        op: impl Fn(u64, u64) -> Option<u64>,
    ) -> Self {
        let width = self.width.max(rhs.width);
        let signed = self.signed && rhs.signed;
        if signed {
            let (Some(a), Some(b)) = (self.to_i64(), rhs.to_i64()) else {
                return Self::filled(width, Logic::X).as_signed(true);
            };
            let neg = if sign_from_dividend {
                a < 0
            } else {
                (a < 0) != (b < 0) && b != 0
            };
            match op(a.unsigned_abs(), b.unsigned_abs()) {
                Some(m) => {
                    let v = if neg {
                        (m as i64).wrapping_neg()
                    } else {
                        m as i64
                    };
                    Self::from_i64(v, width)
                }
                None => Self::filled(width, Logic::X).as_signed(true),
            }
        } else {
            let (Some(a), Some(b)) = (self.to_u64(), rhs.to_u64()) else {
                return Self::filled(width, Logic::X);
            };
            match op(a, b) {
                Some(v) => Self::from_u64(v, width),
                None => Self::filled(width, Logic::X),
            }
        }
    }

    /// Bitwise AND with four-state semantics, word-parallel.
    pub fn and(&self, rhs: &LogicVec) -> Self {
        let width = self.width.max(rhs.width);
        let a = self.resized(width);
        let b = rhs.resized(width);
        let mut out = Self::zero(width);
        out.signed = self.signed && rhs.signed;
        for i in 0..out.val.len() {
            let a_k0 = !a.unk[i] & !a.val[i];
            let b_k0 = !b.unk[i] & !b.val[i];
            let a_k1 = !a.unk[i] & a.val[i];
            let b_k1 = !b.unk[i] & b.val[i];
            let ones = a_k1 & b_k1;
            let zeros = a_k0 | b_k0;
            out.val[i] = ones;
            out.unk[i] = !(ones | zeros);
        }
        out.mask_top();
        out
    }

    /// Bitwise OR with four-state semantics, word-parallel.
    pub fn or(&self, rhs: &LogicVec) -> Self {
        let width = self.width.max(rhs.width);
        let a = self.resized(width);
        let b = rhs.resized(width);
        let mut out = Self::zero(width);
        out.signed = self.signed && rhs.signed;
        for i in 0..out.val.len() {
            let a_k1 = !a.unk[i] & a.val[i];
            let b_k1 = !b.unk[i] & b.val[i];
            let a_k0 = !a.unk[i] & !a.val[i];
            let b_k0 = !b.unk[i] & !b.val[i];
            let ones = a_k1 | b_k1;
            let zeros = a_k0 & b_k0;
            out.val[i] = ones;
            out.unk[i] = !(ones | zeros);
        }
        out.mask_top();
        out
    }

    /// Bitwise XOR: unknown wherever either operand is unknown.
    pub fn xor(&self, rhs: &LogicVec) -> Self {
        let width = self.width.max(rhs.width);
        let a = self.resized(width);
        let b = rhs.resized(width);
        let mut out = Self::zero(width);
        out.signed = self.signed && rhs.signed;
        for i in 0..out.val.len() {
            out.unk[i] = a.unk[i] | b.unk[i];
            out.val[i] = (a.val[i] ^ b.val[i]) & !out.unk[i];
        }
        out.mask_top();
        out
    }

    /// Bitwise NOT: known bits invert, X and Z invert to X.
    pub fn not(&self) -> Self {
        let mut out = self.clone();
        for i in 0..out.val.len() {
            out.val[i] = !out.val[i] & !out.unk[i];
        }
        out.mask_top();
        out
    }

    /// Logical left shift by a known amount; shifting by an unknown
    /// amount produces all-X.
    pub fn shl(&self, amount: &LogicVec) -> Self {
        let Some(n) = amount.to_u64() else {
            return Self::filled(self.width, Logic::X).as_signed(self.signed);
        };
        let mut out = Self::zero(self.width);
        out.signed = self.signed;
        for i in 0..self.width {
            if (i as u64) >= n {
                out.set(i, self.get(i - n as u32));
            }
        }
        out
    }

    /// Right shift: arithmetic when signed, logical otherwise. Shifting by
    /// an unknown amount produces all-X.
    pub fn shr(&self, amount: &LogicVec) -> Self {
        let Some(n) = amount.to_u64() else {
            return Self::filled(self.width, Logic::X).as_signed(self.signed);
        };
        let fill = if self.signed && self.width > 0 {
            self.get(self.width - 1)
        } else {
            Logic::Zero
        };
        let mut out = Self::zero(self.width);
        out.signed = self.signed;
        for i in 0..self.width {
            let src = i as u64 + n;
            let bit = if src < self.width as u64 {
                self.get(src as u32)
            } else {
                fill
            };
            out.set(i, bit);
        }
        out
    }

    /// Logical (four-state) equality: X if either side has unknown bits.
    pub fn logic_eq(&self, rhs: &LogicVec) -> Logic {
        if self.has_unknown() || rhs.has_unknown() {
            return Logic::X;
        }
        let width = self.width.max(rhs.width);
        if self.resized(width).val == rhs.resized(width).val {
            Logic::One
        } else {
            Logic::Zero
        }
    }

    /// Case equality (`===`): exact four-state match, always known.
    pub fn case_eq(&self, rhs: &LogicVec) -> bool {
        let width = self.width.max(rhs.width);
        let a = self.resized(width);
        let b = rhs.resized(width);
        a.val == b.val && a.unk == b.unk
    }

    /// Relational comparison; returns X if either side has unknown bits.
    /// Signed comparison applies only when both operands are signed.
    pub fn compare(&self, rhs: &LogicVec) -> Option<std::cmp::Ordering> {
        if self.has_unknown() || rhs.has_unknown() {
            return None;
        }
        let signed = self.signed && rhs.signed;
        if signed {
            if let (Some(a), Some(b)) = (self.to_i64(), rhs.to_i64()) {
                return Some(a.cmp(&b));
            }
        }
        let width = self.width.max(rhs.width);
        let a = self.resized(width);
        let b = rhs.resized(width);
        for i in (0..a.val.len()).rev() {
            match a.val[i].cmp(&b.val[i]) {
                std::cmp::Ordering::Equal => continue,
                other => return Some(other),
            }
        }
        Some(std::cmp::Ordering::Equal)
    }

    /// Reduction AND over all bits.
    pub fn reduce_and(&self) -> Logic {
        let mut acc = Logic::One;
        for i in 0..self.width {
            acc = acc & self.get(i);
        }
        acc
    }

    /// Reduction OR over all bits.
    pub fn reduce_or(&self) -> Logic {
        let mut acc = Logic::Zero;
        for i in 0..self.width {
            acc = acc | self.get(i);
        }
        acc
    }

    /// Reduction XOR over all bits.
    pub fn reduce_xor(&self) -> Logic {
        let mut acc = Logic::Zero;
        for i in 0..self.width {
            acc = acc ^ self.get(i);
        }
        acc
    }

    /// The truth value used in conditions: One if any bit is 1, Zero if
    /// all bits are known zero, X otherwise.
    pub fn truthy(&self) -> Logic {
        let mut any_unknown = false;
        for i in 0..self.width {
            match self.get(i) {
                Logic::One => return Logic::One,
                Logic::X | Logic::Z => any_unknown = true,
                Logic::Zero => {}
            }
        }
        if any_unknown {
            Logic::X
        } else {
            Logic::Zero
        }
    }
}

impl fmt::Debug for LogicVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for LogicVec {
    /// Formats as a Verilog-style sized binary literal, e.g. `4'b10x1`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}'{}b", self.width, if self.signed { "s" } else { "" })?;
        for i in (0..self.width).rev() {
            write!(f, "{}", self.get(i))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_construction() {
        let v = LogicVec::zero(10);
        assert_eq!(v.width(), 10);
        assert!(!v.has_unknown());
        assert_eq!(v.to_u64(), Some(0));
    }

    #[test]
    fn from_u64_roundtrip() {
        let v = LogicVec::from_u64(0xAB, 8);
        assert_eq!(v.to_u64(), Some(0xAB));
        assert_eq!(v.get(0), Logic::One);
        assert_eq!(v.get(2), Logic::Zero);
    }

    #[test]
    fn from_i64_negative() {
        let v = LogicVec::from_i64(-5, 8);
        assert!(v.is_signed());
        assert_eq!(v.to_i64(), Some(-5));
        assert_eq!(v.to_u64(), Some(0xFB));
    }

    #[test]
    fn from_u64_masks_top() {
        let v = LogicVec::from_u64(0xFFFF, 8);
        assert_eq!(v.to_u64(), Some(0xFF));
    }

    #[test]
    fn set_get_unknown() {
        let mut v = LogicVec::zero(4);
        v.set(1, Logic::X);
        v.set(2, Logic::Z);
        assert_eq!(v.get(1), Logic::X);
        assert_eq!(v.get(2), Logic::Z);
        assert!(v.has_unknown());
        assert_eq!(v.to_u64(), None);
    }

    #[test]
    fn wide_vector_words() {
        let mut v = LogicVec::zero(100);
        v.set(99, Logic::One);
        assert_eq!(v.get(99), Logic::One);
        assert_eq!(v.get(63), Logic::Zero);
        assert_eq!(v.to_u64(), None); // does not fit
    }

    #[test]
    fn resize_zero_extends_unsigned() {
        let v = LogicVec::from_u64(0x80, 8);
        let w = v.resized(16);
        assert_eq!(w.to_u64(), Some(0x80));
    }

    #[test]
    fn resize_sign_extends_signed() {
        let v = LogicVec::from_i64(-1, 4);
        let w = v.resized(8);
        assert_eq!(w.to_i64(), Some(-1));
    }

    #[test]
    fn resize_truncates() {
        let v = LogicVec::from_u64(0x1FF, 12);
        let w = v.resized(8);
        assert_eq!(w.to_u64(), Some(0xFF));
    }

    #[test]
    fn add_basic() {
        let a = LogicVec::from_u64(200, 8);
        let b = LogicVec::from_u64(100, 8);
        assert_eq!(a.add(&b).to_u64(), Some(44)); // wraps at 8 bits
    }

    #[test]
    fn add_unknown_poisons() {
        let mut a = LogicVec::from_u64(1, 8);
        a.set(0, Logic::X);
        let b = LogicVec::from_u64(1, 8);
        let r = a.add(&b);
        assert!(r.has_unknown());
        assert_eq!(r.get(7), Logic::X);
    }

    #[test]
    fn add_wide_carry() {
        // 2^64 - 1 + 1 carries into the second word.
        let mut a = LogicVec::zero(65);
        for i in 0..64 {
            a.set(i, Logic::One);
        }
        let b = LogicVec::from_u64(1, 65);
        let r = a.add(&b);
        assert_eq!(r.get(64), Logic::One);
        for i in 0..64 {
            assert_eq!(r.get(i), Logic::Zero);
        }
    }

    #[test]
    fn sub_signed() {
        let a = LogicVec::from_i64(3, 32);
        let b = LogicVec::from_i64(5, 32);
        assert_eq!(a.sub(&b).to_i64(), Some(-2));
    }

    #[test]
    fn mul_div_rem() {
        let a = LogicVec::from_u64(20, 32);
        let b = LogicVec::from_u64(6, 32);
        assert_eq!(a.mul(&b).to_u64(), Some(120));
        assert_eq!(a.div(&b).to_u64(), Some(3));
        assert_eq!(a.rem(&b).to_u64(), Some(2));
    }

    #[test]
    fn div_by_zero_is_x() {
        let a = LogicVec::from_u64(20, 8);
        let b = LogicVec::from_u64(0, 8);
        assert!(a.div(&b).has_unknown());
        assert!(a.rem(&b).has_unknown());
    }

    #[test]
    fn signed_division_truncates_toward_zero() {
        let a = LogicVec::from_i64(-7, 32);
        let b = LogicVec::from_i64(2, 32);
        assert_eq!(a.div(&b).to_i64(), Some(-3));
        assert_eq!(a.rem(&b).to_i64(), Some(-1));
    }

    #[test]
    fn pow_cases() {
        let two = LogicVec::from_i64(2, 32);
        let ten = LogicVec::from_i64(10, 32);
        assert_eq!(two.pow(&ten).to_i64(), Some(1024));

        let neg = LogicVec::from_i64(-2, 32);
        assert_eq!(two.pow(&neg).to_i64(), Some(0));

        let one = LogicVec::from_i64(1, 32);
        assert_eq!(one.pow(&neg).to_i64(), Some(1));
    }

    #[test]
    fn neg_two_complement() {
        let v = LogicVec::from_i64(5, 8);
        assert_eq!(v.neg().to_i64(), Some(-5));
    }

    #[test]
    fn bitwise_and_four_state() {
        let mut a = LogicVec::from_u64(0b1100, 4);
        let mut b = LogicVec::from_u64(0b1010, 4);
        assert_eq!(a.and(&b).to_u64(), Some(0b1000));

        // Known zero dominates an X.
        a.set(3, Logic::X);
        b.set(3, Logic::Zero);
        assert_eq!(a.and(&b).get(3), Logic::Zero);

        // X & 1 is X.
        a.set(2, Logic::X);
        b.set(2, Logic::One);
        assert_eq!(a.and(&b).get(2), Logic::X);
    }

    #[test]
    fn bitwise_or_four_state() {
        let mut a = LogicVec::from_u64(0b0101, 4);
        let b = LogicVec::from_u64(0b0011, 4);
        assert_eq!(a.or(&b).to_u64(), Some(0b0111));

        a.set(3, Logic::Z);
        // Z | 0 is X after normalization.
        assert_eq!(a.or(&b).get(3), Logic::X);
    }

    #[test]
    fn bitwise_not() {
        let mut a = LogicVec::from_u64(0b01, 2);
        assert_eq!(a.not().to_u64(), Some(0b10));
        a.set(1, Logic::Z);
        assert_eq!(a.not().get(1), Logic::X);
    }

    #[test]
    fn shifts() {
        let v = LogicVec::from_u64(0b0110, 4);
        let one = LogicVec::from_u64(1, 4);
        assert_eq!(v.shl(&one).to_u64(), Some(0b1100));
        assert_eq!(v.shr(&one).to_u64(), Some(0b0011));

        let s = LogicVec::from_i64(-4, 4);
        assert_eq!(s.shr(&one).to_i64(), Some(-2)); // arithmetic shift
    }

    #[test]
    fn equality_and_case_equality() {
        let a = LogicVec::from_u64(5, 4);
        let b = LogicVec::from_u64(5, 4);
        assert_eq!(a.logic_eq(&b), Logic::One);

        let mut c = b.clone();
        c.set(0, Logic::X);
        assert_eq!(a.logic_eq(&c), Logic::X);
        assert!(!a.case_eq(&c));
        assert!(c.case_eq(&c.clone()));
    }

    #[test]
    fn compare_signed_and_unsigned() {
        let a = LogicVec::from_i64(-1, 8);
        let b = LogicVec::from_i64(1, 8);
        assert_eq!(a.compare(&b), Some(std::cmp::Ordering::Less));

        // Unsigned comparison treats the same bits as 255 > 1.
        let au = a.clone().as_signed(false);
        assert_eq!(au.compare(&b), Some(std::cmp::Ordering::Greater));
    }

    #[test]
    fn reductions() {
        let ones = LogicVec::filled(4, Logic::One);
        assert_eq!(ones.reduce_and(), Logic::One);
        assert_eq!(ones.reduce_xor(), Logic::Zero);

        let v = LogicVec::from_u64(0b0100, 4);
        assert_eq!(v.reduce_and(), Logic::Zero);
        assert_eq!(v.reduce_or(), Logic::One);
        assert_eq!(v.reduce_xor(), Logic::One);
    }

    #[test]
    fn truthiness() {
        assert_eq!(LogicVec::from_u64(0, 4).truthy(), Logic::Zero);
        assert_eq!(LogicVec::from_u64(2, 4).truthy(), Logic::One);
        let mut v = LogicVec::zero(4);
        v.set(2, Logic::X);
        assert_eq!(v.truthy(), Logic::X);
        // A known 1 wins over unknowns elsewhere.
        v.set(0, Logic::One);
        assert_eq!(v.truthy(), Logic::One);
    }

    #[test]
    fn concat_and_slice() {
        let hi = LogicVec::from_u64(0b10, 2);
        let lo = LogicVec::from_u64(0b01, 2);
        let c = hi.concat(&lo);
        assert_eq!(c.width(), 4);
        assert_eq!(c.to_u64(), Some(0b1001));
        assert_eq!(c.slice(3, 2).to_u64(), Some(0b10));
        assert_eq!(c.slice(1, 0).to_u64(), Some(0b01));
    }

    #[test]
    fn display_format() {
        let mut v = LogicVec::from_u64(0b1010, 4);
        assert_eq!(format!("{v}"), "4'b1010");
        v.set(1, Logic::X);
        assert_eq!(format!("{v}"), "4'b10x0");
        let s = LogicVec::from_i64(-1, 2);
        assert_eq!(format!("{s}"), "2'sb11");
    }

    #[test]
    fn serde_roundtrip() {
        let mut v = LogicVec::from_u64(0b1010, 4);
        v.set(0, Logic::Z);
        let json = serde_json::to_string(&v).unwrap();
        let back: LogicVec = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}
