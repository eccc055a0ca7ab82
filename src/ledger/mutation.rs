use crate::error::{Error, Result};
use crate::interfaces::repository::{BankrollRepository, SettlementRepository};
use crate::ledger::aggregator::{BankrollAggregator, BankrollSummary};
use crate::ledger::bankroll::Bankroll;
use crate::ledger::cascade::Cascade;
use crate::ledger::entry::LedgerEntry;
use crate::ledger::transaction::PlatformTransaction;
use crate::observability::tracing::trace_ledger_mutation;
use crate::settlement::locks::LockIndex;
use crate::types::ids::BankrollId;
use chrono::NaiveDate;
use std::sync::Arc;

/// Single entry point for changes to a bankroll's entries.
///
/// Every operation loads the bankroll, applies the change and the forward
/// cascade to that copy, summarizes it, and only then writes it back with one
/// repository call. Any error before that write leaves storage untouched.
///
/// Callers are responsible for serializing mutations of the same bankroll
/// (see `BankrollLocks`).
pub struct LedgerMutationService<R, S> {
    bankrolls: Arc<R>,
    settlements: Arc<S>,
}

impl<R, S> LedgerMutationService<R, S>
where
    R: BankrollRepository,
    S: SettlementRepository,
{
    pub fn new(bankrolls: Arc<R>, settlements: Arc<S>) -> Self {
        LedgerMutationService {
            bankrolls,
            settlements,
        }
    }

    /// Load a bankroll in date order with lock flags refreshed from coverage.
    pub fn load(&self, bankroll_id: BankrollId) -> Result<(Bankroll, LockIndex)> {
        let mut bankroll = self.bankrolls.get(bankroll_id)?;
        bankroll.sort_entries();

        let periods = self.settlements.periods_for_bankroll(bankroll_id)?;
        let locks = LockIndex::for_bankroll(bankroll_id, &periods);
        locks.apply(&mut bankroll);

        Ok((bankroll, locks))
    }

    pub fn insert(
        &self,
        bankroll_id: BankrollId,
        date: NaiveDate,
        platform_transactions: Vec<PlatformTransaction>,
    ) -> Result<BankrollSummary> {
        let _span = trace_ledger_mutation(&bankroll_id, date, "insert").entered();
        let (mut bankroll, locks) = self.load(bankroll_id)?;

        if bankroll.position(date).is_some() {
            return Err(Error::DuplicateEntryDate { bankroll_id, date });
        }
        if locks.is_locked(date) {
            return Err(Error::DateLocked { bankroll_id, date });
        }

        let entry = LedgerEntry::new(date, platform_transactions)?;
        let idx = bankroll.insertion_point(date);
        bankroll.entries.insert(idx, entry);

        let recomputed = Cascade::run(&mut bankroll, idx)?;
        tracing::debug!(recomputed, "Inserted ledger entry");

        self.commit(&bankroll)
    }

    pub fn edit(
        &self,
        bankroll_id: BankrollId,
        date: NaiveDate,
        platform_transactions: Vec<PlatformTransaction>,
    ) -> Result<BankrollSummary> {
        let _span = trace_ledger_mutation(&bankroll_id, date, "edit").entered();
        let (mut bankroll, _) = self.load(bankroll_id)?;

        let idx = bankroll
            .position(date)
            .ok_or(Error::EntryNotFound { bankroll_id, date })?;
        if bankroll.entries[idx].locked {
            return Err(Error::EntryLocked { bankroll_id, date });
        }

        bankroll.entries[idx].replace_transactions(platform_transactions)?;

        let recomputed = Cascade::run(&mut bankroll, idx)?;
        tracing::debug!(recomputed, "Edited ledger entry");

        self.commit(&bankroll)
    }

    pub fn delete(&self, bankroll_id: BankrollId, date: NaiveDate) -> Result<BankrollSummary> {
        let _span = trace_ledger_mutation(&bankroll_id, date, "delete").entered();
        let (mut bankroll, _) = self.load(bankroll_id)?;

        let idx = bankroll
            .position(date)
            .ok_or(Error::EntryNotFound { bankroll_id, date })?;
        if bankroll.entries[idx].locked {
            return Err(Error::EntryLocked { bankroll_id, date });
        }

        bankroll.entries.remove(idx);

        // The successor now sits at `idx` and chains off the entry before the
        // deleted one, or off the initial amount.
        let recomputed = Cascade::run(&mut bankroll, idx)?;
        tracing::debug!(recomputed, "Deleted ledger entry");

        self.commit(&bankroll)
    }

    fn commit(&self, bankroll: &Bankroll) -> Result<BankrollSummary> {
        let summary = BankrollAggregator::summarize(bankroll)?;
        self.bankrolls.update(bankroll)?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settlement::period::{SettlementPeriod, SettlementRecord};
    use crate::storage::memory::InMemoryRepository;
    use crate::types::amount::Amount;
    use crate::types::ids::OperatorId;
    use crate::types::ratio::Ratio;
    use chrono::Utc;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, d).unwrap()
    }

    fn balance(units: i64) -> Vec<PlatformTransaction> {
        vec![PlatformTransaction::balance("PokerStars", Amount::from_units(units))]
    }

    fn setup() -> (LedgerMutationService<InMemoryRepository, InMemoryRepository>, Arc<InMemoryRepository>, BankrollId) {
        let repo = Arc::new(InMemoryRepository::new());
        let bankroll = Bankroll::new("Carol", Amount::from_units(10_000), Ratio::percent(50), Ratio::zero());
        let id = bankroll.id;
        repo.insert(bankroll).unwrap();
        (LedgerMutationService::new(repo.clone(), repo.clone()), repo, id)
    }

    #[test]
    fn first_insert_measures_from_initial_amount() {
        let (service, _, id) = setup();
        let summary = service.insert(id, day(1), balance(10_500)).unwrap();
        assert_eq!(summary.total_profit, Amount::from_units(500));
        assert_eq!(summary.current_amount, Amount::from_units(10_500));
        assert_eq!(summary.current_makeup, Amount::zero());
    }

    #[test]
    fn duplicate_date_is_rejected() {
        let (service, repo, id) = setup();
        service.insert(id, day(1), balance(10_500)).unwrap();
        let before = repo.get(id).unwrap();

        let err = service.insert(id, day(1), balance(9_000)).unwrap_err();
        assert!(matches!(err, Error::DuplicateEntryDate { .. }));
        assert!(err.is_validation());
        assert_eq!(repo.get(id).unwrap(), before);
    }

    #[test]
    fn backdated_insert_uses_date_predecessor_and_cascades() {
        let (service, repo, id) = setup();
        service.insert(id, day(1), balance(10_500)).unwrap();
        service.insert(id, day(5), balance(11_000)).unwrap();

        // Inserted last, dated in the middle.
        service.insert(id, day(3), balance(10_800)).unwrap();

        let entries = repo.get(id).unwrap().entries;
        let dates: Vec<_> = entries.iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![day(1), day(3), day(5)]);
        assert_eq!(entries[1].result, Amount::from_units(300));
        assert_eq!(entries[2].result, Amount::from_units(200));
    }

    #[test]
    fn edit_cascades_to_later_entries() {
        let (service, repo, id) = setup();
        service.insert(id, day(1), balance(10_500)).unwrap();
        service.insert(id, day(2), balance(11_200)).unwrap();
        service.insert(id, day(3), balance(11_000)).unwrap();

        let summary = service.edit(id, day(2), balance(10_000)).unwrap();

        let entries = repo.get(id).unwrap().entries;
        assert_eq!(entries[1].result, Amount::from_units(-500));
        assert_eq!(entries[2].result, Amount::from_units(1_000));
        assert_eq!(summary.total_profit, Amount::from_units(1_000));
    }

    #[test]
    fn delete_recomputes_successor_against_new_predecessor() {
        let (service, repo, id) = setup();
        service.insert(id, day(1), balance(10_500)).unwrap();
        service.insert(id, day(2), balance(11_200)).unwrap();
        service.insert(id, day(3), balance(11_500)).unwrap();

        let summary = service.delete(id, day(2)).unwrap();

        let entries = repo.get(id).unwrap().entries;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].date, day(3));
        assert_eq!(entries[1].result, Amount::from_units(1_000));
        assert_eq!(summary.total_profit, Amount::from_units(1_500));
    }

    #[test]
    fn deleting_first_entry_rebases_on_initial_amount() {
        let (service, repo, id) = setup();
        service.insert(id, day(1), balance(10_500)).unwrap();
        service.insert(id, day(2), balance(11_200)).unwrap();

        service.delete(id, day(1)).unwrap();
        let entries = repo.get(id).unwrap().entries;
        assert_eq!(entries[0].result, Amount::from_units(1_200));
    }

    #[test]
    fn missing_entry_is_not_found() {
        let (service, _, id) = setup();
        assert!(matches!(service.edit(id, day(9), balance(1)), Err(Error::EntryNotFound { .. })));
        assert!(matches!(service.delete(id, day(9)), Err(Error::EntryNotFound { .. })));
    }

    #[test]
    fn computation_error_leaves_ledger_unchanged() {
        let (service, repo, id) = setup();
        service.insert(id, day(1), balance(10_500)).unwrap();
        let before = repo.get(id).unwrap();

        let bad = vec![PlatformTransaction::deposit("GGPoker", Amount::from_units(-5))];
        assert!(matches!(service.insert(id, day(2), bad.clone()), Err(Error::NegativeAmount { .. })));
        assert!(matches!(service.edit(id, day(1), bad), Err(Error::NegativeAmount { .. })));
        assert_eq!(repo.get(id).unwrap(), before);
    }

    #[test]
    fn closed_period_blocks_every_mutation() {
        let (service, repo, id) = setup();
        service.insert(id, day(1), balance(10_500)).unwrap();
        service.insert(id, day(2), balance(11_200)).unwrap();

        let record = SettlementRecord {
            bankroll_id: id,
            entry_dates: vec![day(1), day(2)],
            previous_makeup: Amount::zero(),
            current_makeup: Amount::zero(),
            deposits: Amount::zero(),
            withdrawals: Amount::zero(),
            profit_share: Amount::zero(),
            bank_reserve: Amount::zero(),
            period_profit: Amount::zero(),
            cumulative_profit: Amount::zero(),
        };
        let mut period = SettlementPeriod::new(day(1), day(7), vec![record], OperatorId::system()).unwrap();
        period.close(OperatorId::system(), Utc::now()).unwrap();
        repo.save_period(&period).unwrap();
        let before = repo.get(id).unwrap();

        assert!(matches!(service.insert(id, day(3), balance(1)), Err(Error::DateLocked { .. })));
        assert!(matches!(service.edit(id, day(2), balance(1)), Err(Error::EntryLocked { .. })));
        assert!(matches!(service.delete(id, day(1)), Err(Error::EntryLocked { .. })));
        assert_eq!(repo.get(id).unwrap(), before);

        // After the period, mutations go through.
        assert!(service.insert(id, day(8), balance(11_300)).is_ok());
    }
}
