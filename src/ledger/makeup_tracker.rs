use crate::error::Result;
use crate::types::amount::Amount;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MakeupOutcome {
    pub makeup: Amount,
    pub profit: Amount,
    /// Part of the withdrawals that exceeded the outstanding makeup.
    pub overflow: Amount,
}

pub struct MakeupTracker;

impl MakeupTracker {
    /// Roll the makeup balance forward by one entry.
    ///
    /// Deposits add to makeup and withdrawals pay it down. Makeup never goes
    /// below zero: a withdrawal larger than the outstanding debt is realized
    /// as profit instead.
    pub fn compute(
        previous_makeup: Amount,
        current_deposits: Amount,
        current_withdrawals: Amount,
        previous_profit: Amount,
    ) -> Result<MakeupOutcome> {
        let potential = previous_makeup
            .checked_add(current_deposits)?
            .checked_sub(current_withdrawals)?;

        if potential.is_negative() {
            let overflow = potential.checked_abs()?;
            Ok(MakeupOutcome {
                makeup: Amount::zero(),
                profit: previous_profit.checked_add(overflow)?,
                overflow,
            })
        } else {
            Ok(MakeupOutcome {
                makeup: potential,
                profit: previous_profit,
                overflow: Amount::zero(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deposit_increases_makeup() {
        let outcome = MakeupTracker::compute(
            Amount::zero(),
            Amount::from_units(2_000),
            Amount::zero(),
            Amount::from_units(700),
        )
        .unwrap();
        assert_eq!(outcome.makeup, Amount::from_units(2_000));
        assert_eq!(outcome.profit, Amount::from_units(700));
        assert_eq!(outcome.overflow, Amount::zero());
    }

    #[test]
    fn withdrawal_beyond_debt_overflows_into_profit() {
        let outcome = MakeupTracker::compute(
            Amount::from_units(2_000),
            Amount::zero(),
            Amount::from_units(2_500),
            Amount::from_units(700),
        )
        .unwrap();
        assert_eq!(outcome.makeup, Amount::zero());
        assert_eq!(outcome.profit, Amount::from_units(1_200));
        assert_eq!(outcome.overflow, Amount::from_units(500));
    }

    #[test]
    fn withdrawal_exactly_clearing_debt_realizes_nothing() {
        let outcome = MakeupTracker::compute(
            Amount::from_units(2_000),
            Amount::zero(),
            Amount::from_units(2_000),
            Amount::from_units(300),
        )
        .unwrap();
        assert_eq!(outcome.makeup, Amount::zero());
        assert_eq!(outcome.profit, Amount::from_units(300));
    }

    #[test]
    fn partial_repayment_keeps_profit() {
        let outcome = MakeupTracker::compute(
            Amount::from_units(2_000),
            Amount::from_units(100),
            Amount::from_units(600),
            Amount::zero(),
        )
        .unwrap();
        assert_eq!(outcome.makeup, Amount::from_units(1_500));
        assert_eq!(outcome.profit, Amount::zero());
    }
}
