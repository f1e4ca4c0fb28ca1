//! Fixed-point liquid volumes
//!
//! Volumes are stored as hundredths of a microlitre so that every
//! pipetting calculation is exact integer arithmetic.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Mul, Sub, SubAssign};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A liquid volume with 0.01 µL resolution
///
/// For example, 45.76 µL is stored as 4576.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct Volume(u32);

impl Volume {
    /// No liquid
    pub const ZERO: Self = Self(0);

    /// Create a volume from whole microlitres
    pub const fn from_ul(ul: u32) -> Self {
        Self(ul * 100)
    }

    /// Create a volume from hundredths of a microlitre
    pub const fn from_centi_ul(centi_ul: u32) -> Self {
        Self(centi_ul)
    }

    /// Get the raw value in hundredths of a microlitre
    pub const fn as_centi_ul(self) -> u32 {
        self.0
    }

    /// Check if this volume is zero
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Round to the nearest whole microlitre (halves round up)
    pub const fn round_ul(self) -> Self {
        Self((self.0 + 50) / 100 * 100)
    }

    /// Scale by a percentage, rounding to the nearest 0.01 µL
    ///
    /// `scale_percent(110)` adds a 10% overage.
    pub const fn scale_percent(self, percent: u32) -> Self {
        let scaled = (self.0 as u64 * percent as u64 + 50) / 100;
        Self(scaled as u32)
    }

    /// Divide into `parts` equal shares, rounding to the nearest 0.01 µL
    ///
    /// Returns zero when `parts` is zero.
    pub const fn share(self, parts: u32) -> Self {
        if parts == 0 {
            return Self::ZERO;
        }
        Self((self.0 + parts / 2) / parts)
    }

    /// Subtract, clamping at zero
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl Add for Volume {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Volume {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Volume {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Volume {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Mul<u32> for Volume {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self {
        Self(self.0 * rhs)
    }
}

impl Sum for Volume {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02} uL", self.0 / 100, self.0 % 100)
    }
}
