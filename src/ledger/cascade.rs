use crate::error::{Error, Result};
use crate::ledger::bankroll::Bankroll;
use crate::ledger::entry::{DerivedState, LedgerEntry};
use crate::ledger::makeup_tracker::MakeupTracker;
use crate::ledger::result_calculator::ResultCalculator;
use crate::types::amount::Amount;

/// Forward recomputation of derived entry state.
///
/// Each entry's result, makeup and realized profit depend only on its own
/// totals and the derived state of the entry dated immediately before it, so
/// any change at index `i` has to be pushed through every entry after `i`.
pub struct Cascade;

impl Cascade {
    /// Derive the state of `entry` given its date-ordered predecessor.
    pub fn derive(
        previous: Option<&LedgerEntry>,
        entry: &LedgerEntry,
        initial_amount: Amount,
    ) -> Result<DerivedState> {
        let result = ResultCalculator::compute(
            entry.total_balance,
            previous,
            entry.deposits,
            entry.withdrawals,
            initial_amount,
        )?;

        let (previous_makeup, previous_profit) = previous
            .map(|p| (p.makeup, p.realized_profit))
            .unwrap_or_default();

        let outcome = MakeupTracker::compute(
            previous_makeup,
            entry.deposits,
            entry.withdrawals,
            previous_profit,
        )?;

        Ok(DerivedState {
            result,
            makeup: outcome.makeup,
            realized_profit: outcome.profit,
        })
    }

    /// Recompute every entry from index `from` to the end, in date order.
    /// Entries must already be sorted. Returns the number of entries visited.
    ///
    /// Fails with `LockedSuccessor` if a locked entry would change; the
    /// caller works on a copy, so a failure leaves the stored ledger as is.
    pub fn run(bankroll: &mut Bankroll, from: usize) -> Result<usize> {
        let bankroll_id = bankroll.id;
        let initial_amount = bankroll.initial_amount;
        let len = bankroll.entries.len();

        for idx in from..len {
            let (before, rest) = bankroll.entries.split_at_mut(idx);
            let entry = &mut rest[0];
            let derived = Self::derive(before.last(), entry, initial_amount)?;

            if entry.locked && derived != entry.derived() {
                return Err(Error::LockedSuccessor {
                    bankroll_id,
                    date: entry.date,
                });
            }

            entry.apply_derived(derived);
        }

        Ok(len.saturating_sub(from))
    }

    pub fn recompute_all(bankroll: &mut Bankroll) -> Result<usize> {
        Self::run(bankroll, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::transaction::PlatformTransaction;
    use crate::types::ratio::Ratio;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn entry(d: u32, balance: i64, deposit: i64, withdrawal: i64) -> LedgerEntry {
        let mut txs = vec![PlatformTransaction::balance("Site", Amount::from_units(balance))];
        if deposit > 0 {
            txs.push(PlatformTransaction::deposit("Site", Amount::from_units(deposit)));
        }
        if withdrawal > 0 {
            txs.push(PlatformTransaction::withdrawal("Site", Amount::from_units(withdrawal)));
        }
        LedgerEntry::new(day(d), txs).unwrap()
    }

    fn scenario_ledger() -> Bankroll {
        let mut bankroll = Bankroll::new("Scenario", Amount::from_units(10_000), Ratio::percent(50), Ratio::zero());
        bankroll.entries = vec![
            entry(1, 10_500, 0, 0),
            entry(2, 11_200, 0, 0),
            entry(3, 13_200, 2_000, 0),
            entry(4, 10_700, 0, 2_500),
        ];
        bankroll
    }

    #[test]
    fn walks_the_documented_scenarios() {
        let mut bankroll = scenario_ledger();
        assert_eq!(Cascade::recompute_all(&mut bankroll).unwrap(), 4);

        let derived: Vec<_> = bankroll.entries.iter().map(|e| e.derived()).collect();
        assert_eq!(derived[0].result, Amount::from_units(500));
        assert_eq!(derived[0].makeup, Amount::zero());
        assert_eq!(derived[1].result, Amount::from_units(700));
        assert_eq!(derived[1].makeup, Amount::zero());
        assert_eq!(derived[2].result, Amount::zero());
        assert_eq!(derived[2].makeup, Amount::from_units(2_000));
        assert_eq!(derived[3].result, Amount::zero());
        assert_eq!(derived[3].makeup, Amount::zero());
        assert_eq!(derived[3].realized_profit, Amount::from_units(500));
    }

    #[test]
    fn rerunning_is_idempotent() {
        let mut bankroll = scenario_ledger();
        Cascade::recompute_all(&mut bankroll).unwrap();
        let first = bankroll.clone();
        Cascade::recompute_all(&mut bankroll).unwrap();
        assert_eq!(bankroll, first);
    }

    #[test]
    fn locked_entry_may_not_change() {
        let mut bankroll = scenario_ledger();
        Cascade::recompute_all(&mut bankroll).unwrap();
        bankroll.entries[2].locked = true;
        bankroll.entries[3].locked = true;

        // Unchanged input passes through the locked entry.
        assert!(Cascade::run(&mut bankroll, 1).is_ok());

        bankroll.entries[1] = entry(2, 11_000, 0, 0);
        assert!(matches!(
            Cascade::run(&mut bankroll, 1),
            Err(Error::LockedSuccessor { date, .. }) if date == day(3)
        ));
    }
}
