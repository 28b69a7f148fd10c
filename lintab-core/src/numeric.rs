//! Numeric policy shared by every tableau operation.
//!
//! Pivoting, factorization and the reverse-pivot checks are written once
//! against [`Scalar`]. The two instantiations differ only in how they
//! compare against zero and how they choose a scaling factor:
//!
//! - `f64`: comparisons use [`FLOAT_TOLERANCE`], scaling is the identity.
//! - `BigRational`: comparisons are exact, scaling is the least common
//!   multiple of the denominators involved so scaled data is integral.

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Absolute tolerance used by the floating-point comparisons.
pub const FLOAT_TOLERANCE: f64 = 1e-9;

/// Arithmetic and comparison policy for tableau entries.
pub trait Scalar:
    Clone
    + fmt::Debug
    + fmt::Display
    + PartialEq
    + PartialOrd
    + Zero
    + One
    + Signed
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + 'static
{
    /// Zero test under this regime's comparison rule.
    fn eq_zero(&self) -> bool;

    /// Strictly positive under this regime's comparison rule.
    fn gt_zero(&self) -> bool;

    /// Strictly negative under this regime's comparison rule.
    fn lt_zero(&self) -> bool;

    /// Non-negative under this regime's comparison rule.
    fn ge_zero(&self) -> bool {
        !self.lt_zero()
    }

    /// Non-positive under this regime's comparison rule.
    fn le_zero(&self) -> bool {
        !self.gt_zero()
    }

    /// Convert a small integer into this type.
    fn from_i64(value: i64) -> Self;

    /// Lossy conversion used for reporting and cross-regime comparisons.
    fn to_f64(&self) -> f64;

    /// Smallest positive factor that makes every value integral.
    ///
    /// Always one for inexact types.
    fn common_scale<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a Self>;

    /// Whether comparisons are exact.
    fn is_exact() -> bool;
}

impl Scalar for f64 {
    fn eq_zero(&self) -> bool {
        self.abs() <= FLOAT_TOLERANCE
    }

    fn gt_zero(&self) -> bool {
        *self > FLOAT_TOLERANCE
    }

    fn lt_zero(&self) -> bool {
        *self < -FLOAT_TOLERANCE
    }

    fn from_i64(value: i64) -> Self {
        value as f64
    }

    fn to_f64(&self) -> f64 {
        *self
    }

    fn common_scale<'a, I>(_values: I) -> Self
    where
        I: IntoIterator<Item = &'a Self>,
    {
        1.0
    }

    fn is_exact() -> bool {
        false
    }
}

impl Scalar for BigRational {
    fn eq_zero(&self) -> bool {
        self.is_zero()
    }

    fn gt_zero(&self) -> bool {
        self.is_positive()
    }

    fn lt_zero(&self) -> bool {
        self.is_negative()
    }

    fn from_i64(value: i64) -> Self {
        BigRational::from_integer(BigInt::from(value))
    }

    fn to_f64(&self) -> f64 {
        ToPrimitive::to_f64(self).unwrap_or(f64::NAN)
    }

    fn common_scale<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a Self>,
    {
        let lcm = values
            .into_iter()
            .fold(BigInt::one(), |acc, value| acc.lcm(value.denom()));
        BigRational::from_integer(lcm)
    }

    fn is_exact() -> bool {
        true
    }
}

/// Build a rational from a numerator and denominator.
///
/// # Panics
///
/// Panics if `denom` is zero.
pub fn ratio(numer: i64, denom: i64) -> BigRational {
    BigRational::new(BigInt::from(numer), BigInt::from(denom))
}
