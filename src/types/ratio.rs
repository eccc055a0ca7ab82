use crate::error::{Error, Result};
use crate::types::amount::Amount;
use serde::{Deserialize, Serialize};
use std::fmt;

const RATIO_MULTIPLIER: i64 = 100_000_000;  // 10^8

/// Fixed-point fraction used for staking and bank reserve percentages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Ratio {
    value: i64,  // Ratio * 10^8
}

impl Ratio {
    /// Create from a percentage given as floating point (configuration only).
    /// Rejects values outside 0..=100.
    pub fn from_percentage(percent: f64) -> Result<Self> {
        if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
            return Err(Error::InvalidRatio(format!(
                "percentage must be within 0..=100, got {}",
                percent
            )));
        }
        Ok(Ratio {
            value: (percent * (RATIO_MULTIPLIER / 100) as f64).round() as i64,
        })
    }

    /// Whole-number percentage, e.g. `percent(50)` is one half.
    pub fn percent(percent: u8) -> Self {
        Ratio {
            value: i64::from(percent.min(100)) * (RATIO_MULTIPLIER / 100),
        }
    }

    pub fn from_raw(value: i64) -> Self {
        Ratio { value }
    }

    pub fn raw_value(&self) -> i64 {
        self.value
    }

    /// Convert to f64 for display purposes only
    pub fn to_percentage(&self) -> f64 {
        self.value as f64 * 100.0 / RATIO_MULTIPLIER as f64
    }

    pub fn zero() -> Self {
        Ratio { value: 0 }
    }

    pub fn one() -> Self {
        Ratio { value: RATIO_MULTIPLIER }
    }

    /// Apply the ratio to an amount, truncating toward zero in minor units.
    pub fn apply(&self, amount: Amount) -> Result<Amount> {
        // i128 keeps the intermediate product from overflowing
        let scaled = amount.to_minor() as i128 * self.value as i128 / RATIO_MULTIPLIER as i128;
        i64::try_from(scaled)
            .map(Amount::from_minor)
            .map_err(|_| Error::Overflow {
                operation: "ratio application".to_string(),
            })
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.to_percentage())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_percentage_with_truncation() {
        let half = Ratio::percent(50);
        assert_eq!(half.apply(Amount::from_units(700)).unwrap(), Amount::from_units(350));
        assert_eq!(half.apply(Amount::from_minor(3)).unwrap(), Amount::from_minor(1));
        assert_eq!(half.apply(Amount::from_minor(-3)).unwrap(), Amount::from_minor(-1));
    }

    #[test]
    fn from_percentage_matches_whole_percent() {
        assert_eq!(Ratio::from_percentage(20.0).unwrap(), Ratio::percent(20));
        assert_eq!(Ratio::from_percentage(100.0).unwrap(), Ratio::one());
    }

    #[test]
    fn from_percentage_rejects_out_of_range() {
        assert!(matches!(Ratio::from_percentage(120.0), Err(Error::InvalidRatio(_))));
        assert!(Ratio::from_percentage(-1.0).is_err());
        assert!(Ratio::from_percentage(f64::NAN).is_err());
    }
}
