//! Integer money values for escrow accounting.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};

/// A currency amount in whole minor units.
///
/// All escrow arithmetic is integer-exact: taxes are computed in basis
/// points so no rounding surprises can leak into ledger balances.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Coins(i64);

impl Coins {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Wraps a raw amount.
    #[must_use]
    pub const fn new(amount: i64) -> Self {
        Self(amount)
    }

    /// Returns the raw amount.
    #[must_use]
    pub const fn amount(self) -> i64 {
        self.0
    }

    /// Computes the tax due on this amount at the given basis-point rate.
    ///
    /// 500 bps == 5%. Truncates toward zero.
    #[must_use]
    #[expect(
        clippy::integer_division,
        reason = "basis-point scaling truncates toward zero deliberately"
    )]
    pub const fn tax_at(self, rate_bps: u32) -> Self {
        Self(self.0.saturating_mul(rate_bps as i64) / 10_000)
    }

    /// Checked addition, `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(sum) => Some(Self(sum)),
            None => None,
        }
    }

    /// Returns `true` when the amount is strictly positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl Add for Coins {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Coins {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Coins {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
