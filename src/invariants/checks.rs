use crate::error::{Error, InvariantViolation, Result};
use crate::ledger::aggregator::BankrollAggregator;
use crate::ledger::bankroll::Bankroll;
use crate::ledger::cascade::Cascade;
use crate::ledger::entry::LedgerEntry;
use crate::settlement::locks::LockIndex;
use crate::types::amount::Amount;

pub struct LedgerInvariantChecks;

impl LedgerInvariantChecks {
    /// Run every ledger check against one bankroll.
    pub fn check_all(bankroll: &Bankroll, locks: &LockIndex) -> Result<()> {
        Self::check_sorted_unique_dates(bankroll)?;
        Self::check_non_negative_makeup(bankroll)?;
        Self::check_total_profit(bankroll)?;
        Self::check_chain_consistency(bankroll)?;
        Self::check_lock_coverage(bankroll, locks)?;
        Ok(())
    }

    /// Entries strictly ascending by date
    pub fn check_sorted_unique_dates(bankroll: &Bankroll) -> Result<()> {
        for pair in bankroll.entries.windows(2) {
            if pair[0].date >= pair[1].date {
                return Err(violation(
                    "sorted_unique_dates",
                    format!(
                        "Bankroll {} has entry {} followed by {}",
                        bankroll.id, pair[0].date, pair[1].date
                    ),
                ));
            }
        }
        Ok(())
    }

    pub fn check_non_negative_makeup(bankroll: &Bankroll) -> Result<()> {
        if let Some(entry) = bankroll.entries.iter().find(|e| e.makeup.is_negative()) {
            return Err(violation(
                "non_negative_makeup",
                format!(
                    "Bankroll {} has negative makeup {} on {}",
                    bankroll.id, entry.makeup, entry.date
                ),
            ));
        }
        Ok(())
    }

    /// Reported total profit matches the figure implied by balances and cash
    /// movement: last balance - initial amount - later deposits + later
    /// withdrawals. Cash moved on the first entry is part of its measured
    /// result.
    pub fn check_total_profit(bankroll: &Bankroll) -> Result<()> {
        let summary = BankrollAggregator::summarize(bankroll)?;

        let mut ordered: Vec<&LedgerEntry> = bankroll.entries.iter().collect();
        ordered.sort_by_key(|e| e.date);

        let expected = match ordered.last() {
            None => Amount::zero(),
            Some(last) => {
                let later = &ordered[1..];
                last.total_balance
                    .checked_sub(bankroll.initial_amount)?
                    .checked_sub(Amount::checked_sum(later.iter().map(|e| e.deposits))?)?
                    .checked_add(Amount::checked_sum(later.iter().map(|e| e.withdrawals))?)?
            }
        };

        if summary.total_profit != expected {
            return Err(violation(
                "total_profit",
                format!(
                    "Bankroll {} reports total profit {}, balances imply {}",
                    bankroll.id, summary.total_profit, expected
                ),
            ));
        }
        Ok(())
    }

    /// Stored derived values match a fresh recomputation of the chain
    pub fn check_chain_consistency(bankroll: &Bankroll) -> Result<()> {
        let mut recomputed = bankroll.clone();
        recomputed.sort_entries();
        for entry in &mut recomputed.entries {
            entry.locked = false;
        }
        Cascade::recompute_all(&mut recomputed)?;

        for entry in &recomputed.entries {
            let stored = bankroll.entry(entry.date).map(|e| e.derived());
            if stored != Some(entry.derived()) {
                return Err(violation(
                    "chain_consistency",
                    format!(
                        "Bankroll {} entry {} stores {:?}, recomputation gives {:?}",
                        bankroll.id,
                        entry.date,
                        stored,
                        entry.derived()
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Cached lock flags agree with closed-period coverage
    pub fn check_lock_coverage(bankroll: &Bankroll, locks: &LockIndex) -> Result<()> {
        for entry in &bankroll.entries {
            let covered = locks.is_locked(entry.date);
            if entry.locked != covered {
                return Err(violation(
                    "lock_coverage",
                    format!(
                        "Bankroll {} entry {} has locked={}, coverage says {}",
                        bankroll.id, entry.date, entry.locked, covered
                    ),
                ));
            }
        }
        Ok(())
    }
}

fn violation(invariant: &'static str, details: String) -> Error {
    Error::InvariantViolation(InvariantViolation { invariant, details })
}
