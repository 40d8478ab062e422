//! Fixed-point arithmetic and mathematical utilities.
//!
//! This module provides safe arithmetic operations with overflow protection
//! and fixed-point calculations for precise financial computations.

use crate::error::{Error, Result};
use crate::utils::constants::{BPS_DIVISOR, USSD_BASE_UNIT};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

// ═══════════════════════════════════════════════════════════════════════════════
// FIXED POINT TYPE
// ═══════════════════════════════════════════════════════════════════════════════

/// Fixed-point number with 18 decimal places precision
/// Used for precise calculations without floating-point errors
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct FixedPoint(u128);

impl FixedPoint {
    /// Scale factor: 10^18
    pub const SCALE: u128 = 1_000_000_000_000_000_000;

    /// Zero value
    pub const ZERO: Self = Self(0);

    /// One (1.0)
    pub const ONE: Self = Self(Self::SCALE);

    /// Create a new FixedPoint from raw value
    pub const fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    /// Create from an integer (scales up)
    pub fn from_integer(value: u64) -> Self {
        Self((value as u128) * Self::SCALE)
    }

    /// Create from basis points (100 bps = 1%)
    pub fn from_bps(bps: u64) -> Self {
        Self((bps as u128) * Self::SCALE / (BPS_DIVISOR as u128))
    }

    /// Create from a ratio of two integers, rounding down
    pub fn from_ratio(numerator: u128, denominator: u128) -> Result<Self> {
        mul_div(numerator, Self::SCALE, denominator).map(Self)
    }

    /// Get the raw underlying value
    pub fn raw(&self) -> u128 {
        self.0
    }

    /// Convert to u64, rounding down (truncating)
    pub fn to_u64_floor(&self) -> u64 {
        (self.0 / Self::SCALE) as u64
    }

    /// Convert the 18-decimal value to 6-decimal ledger units, rounding down
    pub fn to_ledger_units(&self) -> u64 {
        (self.0 / (Self::SCALE / USSD_BASE_UNIT as u128)) as u64
    }

    /// Check if value is zero
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Saturating subtraction
    pub fn saturating_sub(&self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Checked multiplication at scale
    pub fn checked_mul(&self, other: Self) -> Result<Self> {
        mul_div(self.0, other.0, Self::SCALE).map(Self)
    }

    /// Checked division at scale
    pub fn checked_div(&self, other: Self) -> Result<Self> {
        mul_div(self.0, Self::SCALE, other.0).map(Self)
    }

    /// Minimum of two values
    pub fn min(self, other: Self) -> Self {
        Self(self.0.min(other.0))
    }

    /// Maximum of two values
    pub fn max(self, other: Self) -> Self {
        Self(self.0.max(other.0))
    }
}

impl Add for FixedPoint {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for FixedPoint {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul for FixedPoint {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        // Multiply and divide by scale to maintain precision
        Self((self.0 * rhs.0) / Self::SCALE)
    }
}

impl Div for FixedPoint {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        // Multiply by scale first to maintain precision
        Self((self.0 * Self::SCALE) / rhs.0)
    }
}

impl std::fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let whole = self.0 / Self::SCALE;
        let frac = self.0 % Self::SCALE;
        write!(f, "{}.{:018}", whole, frac)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SAFE ARITHMETIC OPERATIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Safe addition with overflow check
pub fn safe_add(a: u64, b: u64) -> Result<u64> {
    a.checked_add(b).ok_or(Error::Overflow {
        operation: format!("{} + {}", a, b),
    })
}

/// Safe subtraction with underflow check
pub fn safe_sub(a: u64, b: u64) -> Result<u64> {
    a.checked_sub(b).ok_or(Error::Overflow {
        operation: format!("{} - {}", a, b),
    })
}

/// Safe multiplication then division on u128 operands
/// Computes (a * b) / c with overflow and zero-divisor checks
pub fn mul_div(a: u128, b: u128, c: u128) -> Result<u128> {
    if c == 0 {
        return Err(Error::Overflow {
            operation: format!("({} * {}) / 0", a, b),
        });
    }
    let product = a.checked_mul(b).ok_or(Error::Overflow {
        operation: format!("{} * {}", a, b),
    })?;
    Ok(product / c)
}

// ═══════════════════════════════════════════════════════════════════════════════
// VALUATION CALCULATIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// USD value of a native asset amount at the given 18-decimal price
///
/// # Arguments
/// * `amount` - Asset amount in native units
/// * `decimals` - The asset's decimal precision
/// * `price` - Oracle price in USD, 18-decimal fixed point
///
/// # Returns
/// USD value as an 18-decimal fixed point
pub fn usd_value(amount: u128, decimals: u8, price: FixedPoint) -> Result<FixedPoint> {
    let unit = 10u128.pow(decimals as u32);
    mul_div(amount, price.raw(), unit).map(FixedPoint::from_raw)
}

/// Scale a native asset amount by an 18-decimal factor, rounding down
pub fn scale_amount(amount: u128, factor: FixedPoint) -> Result<u128> {
    mul_div(amount, factor.raw(), FixedPoint::SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_point_basic() {
        let one = FixedPoint::ONE;
        let two = FixedPoint::from_integer(2);

        assert_eq!(one + one, two);
        assert_eq!(two - one, one);
        assert_eq!(one * two, two);
        assert_eq!(two / one, two);
    }

    #[test]
    fn test_fixed_point_from_bps() {
        let half = FixedPoint::from_bps(5000); // 50%
        let one = FixedPoint::ONE;

        assert_eq!(one * half, FixedPoint::from_raw(FixedPoint::SCALE / 2));
    }

    #[test]
    fn test_fixed_point_from_ratio() {
        // 6/7, floored at 18 decimals
        let fraction = FixedPoint::from_ratio(6, 7).unwrap();
        assert_eq!(fraction.raw(), 857_142_857_142_857_142);
    }

    #[test]
    fn test_to_ledger_units() {
        // 1.5 USD in 18-decimal fixed point -> 1_500_000 ledger units
        let value = FixedPoint::from_raw(3 * FixedPoint::SCALE / 2);
        assert_eq!(value.to_ledger_units(), 1_500_000);
    }

    #[test]
    fn test_safe_arithmetic() {
        assert!(safe_add(1, 2).is_ok());
        assert!(safe_add(u64::MAX, 1).is_err());

        assert!(safe_sub(5, 3).is_ok());
        assert!(safe_sub(3, 5).is_err());
    }

    #[test]
    fn test_mul_div() {
        assert_eq!(mul_div(6, 7, 2).unwrap(), 21);
        assert!(mul_div(1, 1, 0).is_err());
        assert!(mul_div(u128::MAX, 2, 1).is_err());
    }

    #[test]
    fn test_usd_value() {
        // 0.1 of an 18-decimal asset at $2,500
        let value = usd_value(
            100_000_000_000_000_000,
            18,
            FixedPoint::from_integer(2_500),
        )
        .unwrap();
        assert_eq!(value, FixedPoint::from_integer(250));

        // 100.0 of an 18-decimal asset at $1
        let value = usd_value(
            100_000_000_000_000_000_000,
            18,
            FixedPoint::ONE,
        )
        .unwrap();
        assert_eq!(value.to_ledger_units(), 100_000_000);
    }

    #[test]
    fn test_scale_amount() {
        let half = FixedPoint::from_bps(5000);
        assert_eq!(scale_amount(1_000_000, half).unwrap(), 500_000);
        // floors
        assert_eq!(scale_amount(3, half).unwrap(), 1);
    }
}
