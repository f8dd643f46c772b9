use std::fmt;
use std::ops::Mul;

use serde::{Deserialize, Serialize};

/// Value substituted for a ratio whose denominator is zero or whose result
/// is not finite.
pub const GAIN_FALLBACK: f64 = 1.0;

/// A cumulative multiplicative advantage.
///
/// Each mutation multiplies the running product by `1 + gene_advantage`.
/// The product starts at 1.0 (neutral) and is never recomputed from
/// scratch once a genome exists.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Advantage(f64);

impl Advantage {
    pub const NEUTRAL: Self = Self(1.0);

    pub fn new(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }

    /// Fold one mutation's advantage into the product.
    #[inline]
    pub fn apply(self, gene_advantage: f64) -> Self {
        Self(self.0 * (1.0 + gene_advantage))
    }
}

impl Default for Advantage {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl Mul for Advantage {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self(self.0 * rhs.0)
    }
}

impl From<Advantage> for f64 {
    fn from(value: Advantage) -> Self {
        value.0
    }
}

impl fmt::Display for Advantage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `numerator / denominator`, or [`GAIN_FALLBACK`] when the denominator is
/// zero or the quotient is NaN/infinite.
#[inline]
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return GAIN_FALLBACK;
    }
    let ratio = numerator / denominator;
    if ratio.is_finite() {
        ratio
    } else {
        GAIN_FALLBACK
    }
}

/// `log10(drivers / passengers + 1)`, defined as 0 when either count is 0.
#[inline]
pub fn driver_passenger_ratio(drivers: u32, passengers: u32) -> f64 {
    if drivers == 0 || passengers == 0 {
        return 0.0;
    }
    (drivers as f64 / passengers as f64 + 1.0).log10()
}
