use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Neg;

/// Number of minor units (cents) in one currency unit.
pub const MINOR_UNITS: i64 = 100;

/// Signed monetary amount in minor units.
///
/// Ledger arithmetic goes through the `checked_*` methods so that an overflow
/// surfaces as a computation error instead of wrapping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Amount(i64);

impl Amount {
    pub fn from_minor(value: i64) -> Self {
        Amount(value)
    }

    /// Whole currency units, e.g. `from_units(10_000)` is 10,000.00.
    pub fn from_units(value: i64) -> Self {
        Amount(value * MINOR_UNITS)
    }

    pub fn to_minor(&self) -> i64 {
        self.0
    }

    pub fn zero() -> Self {
        Amount(0)
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn abs(&self) -> Self {
        Amount(self.0.abs())
    }

    pub fn checked_add(self, other: Amount) -> Result<Amount> {
        self.0
            .checked_add(other.0)
            .map(Amount)
            .ok_or_else(|| overflow("amount addition"))
    }

    pub fn checked_sub(self, other: Amount) -> Result<Amount> {
        self.0
            .checked_sub(other.0)
            .map(Amount)
            .ok_or_else(|| overflow("amount subtraction"))
    }

    pub fn checked_abs(self) -> Result<Amount> {
        self.0
            .checked_abs()
            .map(Amount)
            .ok_or_else(|| overflow("amount absolute value"))
    }

    /// Sum a sequence of amounts, failing on the first overflow.
    pub fn checked_sum<I>(amounts: I) -> Result<Amount>
    where
        I: IntoIterator<Item = Amount>,
    {
        amounts
            .into_iter()
            .try_fold(Amount::zero(), |acc, amount| acc.checked_add(amount))
    }
}

fn overflow(operation: &str) -> Error {
    Error::Overflow {
        operation: operation.to_string(),
    }
}

impl Neg for Amount {
    type Output = Amount;
    fn neg(self) -> Amount {
        Amount(-self.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        let units = MINOR_UNITS as u64;
        write!(f, "{}{}.{:02}", sign, magnitude / units, magnitude % units)
    }
}
