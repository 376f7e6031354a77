// Copyright 2026 the Armature Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Signed nanosecond time.
//!
//! [`Nanoseconds`] is the single time unit of this crate: animation
//! timestamps, durations, and the monotonically advancing animator time are
//! all signed nanosecond counts. Keeping everything integral means
//! scheduling arithmetic is exact — the only place a float appears is the
//! final division that turns an elapsed/duration ratio into an animation
//! factor.
//!
//! Timestamps that may be unset (pause and stop points) are
//! `Option<Nanoseconds>` at the API level; there is no sentinel value.

use core::fmt;
use core::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// A signed time value or duration in nanoseconds.
///
/// Covers roughly ±292 years, comfortably more than any UI session.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Nanoseconds(pub i64);

impl Nanoseconds {
    /// The zero time.
    pub const ZERO: Self = Self(0);

    /// Returns the raw nanosecond count.
    #[inline]
    #[must_use]
    pub const fn nanos(self) -> i64 {
        self.0
    }

    /// Creates a value from whole seconds.
    #[inline]
    #[must_use]
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs * 1_000_000_000)
    }

    /// Creates a value from whole milliseconds.
    #[inline]
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis * 1_000_000)
    }

    /// Creates a value from whole microseconds.
    #[inline]
    #[must_use]
    pub const fn from_micros(micros: i64) -> Self {
        Self(micros * 1_000)
    }

    /// Checked addition.
    #[inline]
    #[must_use]
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.0.checked_add(rhs.0) {
            Some(t) => Some(Self(t)),
            None => None,
        }
    }

    /// Checked subtraction.
    #[inline]
    #[must_use]
    pub const fn checked_sub(self, rhs: Self) -> Option<Self> {
        match self.0.checked_sub(rhs.0) {
            Some(t) => Some(Self(t)),
            None => None,
        }
    }

    /// Multiplies by a plain count, saturating at the numeric bounds.
    ///
    /// Used for "duration times repeat count", where saturation keeps the
    /// comparison against elapsed time correct even for absurd inputs.
    #[inline]
    #[must_use]
    pub const fn saturating_mul(self, rhs: i64) -> Self {
        Self(self.0.saturating_mul(rhs))
    }
}

impl Add for Nanoseconds {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Nanoseconds {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Nanoseconds {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Nanoseconds {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Nanoseconds {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl fmt::Debug for Nanoseconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nanoseconds({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_scale() {
        assert_eq!(Nanoseconds::from_secs(2), Nanoseconds(2_000_000_000));
        assert_eq!(Nanoseconds::from_millis(3), Nanoseconds(3_000_000));
        assert_eq!(Nanoseconds::from_micros(4), Nanoseconds(4_000));
    }

    #[test]
    fn arithmetic() {
        let a = Nanoseconds(10);
        let b = Nanoseconds(3);
        assert_eq!(a + b, Nanoseconds(13));
        assert_eq!(a - b, Nanoseconds(7));
        assert_eq!(-a, Nanoseconds(-10));

        let mut c = a;
        c += b;
        assert_eq!(c, Nanoseconds(13));
        c -= a;
        assert_eq!(c, b);
    }

    #[test]
    fn checked_overflow_returns_none() {
        assert_eq!(Nanoseconds(i64::MAX).checked_add(Nanoseconds(1)), None);
        assert_eq!(Nanoseconds(i64::MIN).checked_sub(Nanoseconds(1)), None);
        assert_eq!(
            Nanoseconds(1).checked_add(Nanoseconds(2)),
            Some(Nanoseconds(3))
        );
    }

    #[test]
    fn saturating_mul_saturates() {
        assert_eq!(Nanoseconds(2).saturating_mul(3), Nanoseconds(6));
        assert_eq!(
            Nanoseconds(i64::MAX).saturating_mul(2),
            Nanoseconds(i64::MAX)
        );
    }

    #[test]
    fn ordering_is_numeric() {
        assert!(Nanoseconds(-5) < Nanoseconds::ZERO);
        assert!(Nanoseconds(5) > Nanoseconds(4));
    }

    #[test]
    fn debug_format() {
        use alloc::format;

        assert_eq!(format!("{:?}", Nanoseconds(123)), "Nanoseconds(123)");
    }
}
