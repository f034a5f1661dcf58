//! Fixed-width integer with checked-only arithmetic.
//!
//! SPIRAL `int` is a signed 64-bit integer. `ScalarInt` deliberately has no
//! `Add`/`Sub`/`Mul`/`Div`/`Rem`/`Neg` impls: every operation goes through a
//! checked method so overflow always surfaces as an error value.

use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct ScalarInt(i64);

impl ScalarInt {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(1);
    pub const MIN: Self = Self(i64::MIN);
    pub const MAX: Self = Self(i64::MAX);

    #[inline]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.0.checked_add(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_sub(self, rhs: Self) -> Option<Self> {
        match self.0.checked_sub(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_mul(self, rhs: Self) -> Option<Self> {
        match self.0.checked_mul(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Truncating division. `None` on zero divisor or `MIN / -1`.
    #[inline]
    pub const fn checked_div(self, rhs: Self) -> Option<Self> {
        match self.0.checked_div(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Remainder with the sign of the dividend. `None` on zero divisor or
    /// `MIN % -1`.
    #[inline]
    pub const fn checked_rem(self, rhs: Self) -> Option<Self> {
        match self.0.checked_rem(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// `None` for `MIN`.
    #[inline]
    pub const fn checked_neg(self) -> Option<Self> {
        match self.0.checked_neg() {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Interpret as a collection index. `None` when negative.
    #[inline]
    pub fn to_index(self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

impl From<i64> for ScalarInt {
    #[inline]
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<ScalarInt> for i64 {
    #[inline]
    fn from(value: ScalarInt) -> Self {
        value.0
    }
}

impl fmt::Debug for ScalarInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ScalarInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn checked_add_overflow() {
        assert_eq!(
            ScalarInt::new(2).checked_add(ScalarInt::new(40)),
            Some(ScalarInt::new(42))
        );
        assert_eq!(ScalarInt::MAX.checked_add(ScalarInt::ONE), None);
    }

    #[test]
    fn checked_sub_overflow() {
        assert_eq!(ScalarInt::MIN.checked_sub(ScalarInt::ONE), None);
    }

    #[test]
    fn checked_mul_overflow() {
        assert_eq!(ScalarInt::MAX.checked_mul(ScalarInt::new(2)), None);
    }

    #[test]
    fn checked_div_truncates() {
        assert_eq!(
            ScalarInt::new(-7).checked_div(ScalarInt::new(2)),
            Some(ScalarInt::new(-3))
        );
        assert_eq!(ScalarInt::new(10).checked_div(ScalarInt::ZERO), None);
        assert_eq!(ScalarInt::MIN.checked_div(ScalarInt::new(-1)), None);
    }

    #[test]
    fn checked_rem_sign_follows_dividend() {
        assert_eq!(
            ScalarInt::new(-7).checked_rem(ScalarInt::new(2)),
            Some(ScalarInt::new(-1))
        );
        assert_eq!(ScalarInt::new(7).checked_rem(ScalarInt::ZERO), None);
    }

    #[test]
    fn checked_neg_min() {
        assert_eq!(ScalarInt::MIN.checked_neg(), None);
        assert_eq!(ScalarInt::ONE.checked_neg(), Some(ScalarInt::new(-1)));
    }

    #[test]
    fn to_index_rejects_negative() {
        assert_eq!(ScalarInt::new(3).to_index(), Some(3));
        assert_eq!(ScalarInt::new(-1).to_index(), None);
    }

    proptest! {
        #[test]
        fn add_matches_host(a: i64, b: i64) {
            let expected = a.checked_add(b).map(ScalarInt::new);
            prop_assert_eq!(ScalarInt::new(a).checked_add(ScalarInt::new(b)), expected);
        }

        #[test]
        fn div_rem_recombine(a: i64, b in any::<i64>().prop_filter("nonzero", |b| *b != 0)) {
            let (sa, sb) = (ScalarInt::new(a), ScalarInt::new(b));
            if let (Some(q), Some(r)) = (sa.checked_div(sb), sa.checked_rem(sb)) {
                let back = q.checked_mul(sb).and_then(|p| p.checked_add(r));
                prop_assert_eq!(back, Some(sa));
            }
        }
    }
}
