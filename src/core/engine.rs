use crate::config::StakingConfig;
use crate::core::locks::BankrollLocks;
use crate::error::{Error, Result};
use crate::interfaces::repository::{BankrollRepository, SettlementRepository};
use crate::invariants::checks::LedgerInvariantChecks;
use crate::ledger::aggregator::{BankrollAggregator, BankrollSummary};
use crate::ledger::bankroll::Bankroll;
use crate::ledger::entry::LedgerEntry;
use crate::ledger::mutation::LedgerMutationService;
use crate::ledger::transaction::PlatformTransaction;
use crate::reporting::monthly::MonthlyReport;
use crate::settlement::engine::SettlementEngine;
use crate::settlement::locks::LockIndex;
use crate::settlement::period::SettlementPeriod;
use crate::storage::memory::InMemoryRepository;
use crate::types::amount::Amount;
use crate::types::ids::{BankrollId, OperatorId, PeriodId};
use crate::types::ratio::Ratio;
use chrono::NaiveDate;
use std::sync::Arc;

/// Library boundary over the ledger and settlement services.
///
/// Mutations of one bankroll run one at a time; settlement operations hold
/// the locks of every bankroll they read or write.
pub struct BankrollEngine<R, S> {
    bankrolls: Arc<R>,
    settlements: Arc<S>,
    ledger: LedgerMutationService<R, S>,
    settlement: SettlementEngine<R, S>,
    locks: BankrollLocks,
    staking: StakingConfig,
}

impl BankrollEngine<InMemoryRepository, InMemoryRepository> {
    pub fn in_memory(staking: StakingConfig) -> Self {
        Self::with_repository(Arc::new(InMemoryRepository::new()), staking)
    }

    /// Share one in-memory repository for bankrolls and periods.
    pub fn with_repository(repository: Arc<InMemoryRepository>, staking: StakingConfig) -> Self {
        Self::new(repository.clone(), repository, staking)
    }
}

impl<R, S> BankrollEngine<R, S>
where
    R: BankrollRepository,
    S: SettlementRepository,
{
    pub fn new(bankrolls: Arc<R>, settlements: Arc<S>, staking: StakingConfig) -> Self {
        BankrollEngine {
            ledger: LedgerMutationService::new(bankrolls.clone(), settlements.clone()),
            settlement: SettlementEngine::new(bankrolls.clone(), settlements.clone()),
            bankrolls,
            settlements,
            locks: BankrollLocks::new(),
            staking,
        }
    }

    /// Create a bankroll on the configured default deal terms.
    pub fn create_bankroll(&self, name: &str, initial_amount: Amount) -> Result<BankrollId> {
        let staking = self.staking.staking_ratio()?;
        let reserve = self.staking.bank_reserve_ratio()?;
        self.create_bankroll_with_terms(name, initial_amount, staking, reserve)
    }

    pub fn create_bankroll_with_terms(
        &self,
        name: &str,
        initial_amount: Amount,
        staking_percentage: Ratio,
        bank_reserve_percentage: Ratio,
    ) -> Result<BankrollId> {
        let bankroll = Bankroll::new(name, initial_amount, staking_percentage, bank_reserve_percentage);
        let id = bankroll.id;
        self.bankrolls.insert(bankroll)?;

        tracing::info!(bankroll_id = %id, name, initial_amount = %initial_amount, "Created bankroll");
        Ok(id)
    }

    /// Entries in date order, lock flags derived from period coverage.
    pub fn get_entries(&self, bankroll_id: BankrollId) -> Result<Vec<LedgerEntry>> {
        let (bankroll, _) = self.ledger.load(bankroll_id)?;
        Ok(bankroll.entries)
    }

    pub fn summary(&self, bankroll_id: BankrollId) -> Result<BankrollSummary> {
        let bankroll = self.bankrolls.get(bankroll_id)?;
        BankrollAggregator::summarize(&bankroll)
    }

    pub fn insert(
        &self,
        bankroll_id: BankrollId,
        date: NaiveDate,
        platform_transactions: Vec<PlatformTransaction>,
    ) -> Result<BankrollSummary> {
        self.ensure_exists(bankroll_id)?;
        self.locks
            .with_bankroll(bankroll_id, || self.ledger.insert(bankroll_id, date, platform_transactions))
    }

    pub fn edit(
        &self,
        bankroll_id: BankrollId,
        date: NaiveDate,
        platform_transactions: Vec<PlatformTransaction>,
    ) -> Result<BankrollSummary> {
        self.ensure_exists(bankroll_id)?;
        self.locks
            .with_bankroll(bankroll_id, || self.ledger.edit(bankroll_id, date, platform_transactions))
    }

    pub fn delete(&self, bankroll_id: BankrollId, date: NaiveDate) -> Result<BankrollSummary> {
        self.ensure_exists(bankroll_id)?;
        self.locks
            .with_bankroll(bankroll_id, || self.ledger.delete(bankroll_id, date))
    }

    pub fn is_date_locked(&self, bankroll_id: BankrollId, date: NaiveDate) -> Result<bool> {
        self.settlement.is_date_locked(bankroll_id, date)
    }

    pub fn create_settlement(
        &self,
        bankroll_ids: &[BankrollId],
        start_date: NaiveDate,
        end_date: NaiveDate,
        created_by: OperatorId,
    ) -> Result<SettlementPeriod> {
        for id in bankroll_ids {
            self.ensure_exists(*id)?;
        }
        self.locks.with_bankrolls(bankroll_ids, || {
            self.settlement.create(bankroll_ids, start_date, end_date, created_by)
        })
    }

    pub fn finalize_settlement(&self, period_id: PeriodId, closed_by: OperatorId) -> Result<SettlementPeriod> {
        let scope = self.settlements.get_period(period_id)?.bankroll_ids();
        self.locks
            .with_bankrolls(&scope, || self.settlement.finalize(period_id, closed_by))
    }

    pub fn unlock(
        &self,
        bankroll_id: BankrollId,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PeriodId>> {
        self.ensure_exists(bankroll_id)?;
        let scope = self.settlement.unlock_scope(bankroll_id, start_date, end_date)?;
        self.locks
            .with_bankrolls(&scope, || self.settlement.unlock(bankroll_id, start_date, end_date))
    }

    /// The status is re-read under the locks, so a concurrent finalize
    /// either completes first and blocks the discard or starts after it.
    pub fn discard_settlement(&self, period_id: PeriodId) -> Result<()> {
        let scope = self.settlements.get_period(period_id)?.bankroll_ids();
        self.locks
            .with_bankrolls(&scope, || self.settlement.discard(period_id))
    }

    pub fn settlement_periods(&self, bankroll_id: BankrollId) -> Result<Vec<SettlementPeriod>> {
        self.settlements.periods_for_bankroll(bankroll_id)
    }

    pub fn monthly_report(&self, bankroll_id: BankrollId, year: i32) -> Result<MonthlyReport> {
        let bankroll = self.bankrolls.get(bankroll_id)?;
        MonthlyReport::build(&bankroll, year)
    }

    /// Unknown ids are rejected before a lock is allocated for them.
    fn ensure_exists(&self, bankroll_id: BankrollId) -> Result<()> {
        if self.bankrolls.contains(bankroll_id)? {
            Ok(())
        } else {
            Err(Error::BankrollNotFound(bankroll_id))
        }
    }

    /// Run the ledger invariant checks against the stored bankroll.
    pub fn verify(&self, bankroll_id: BankrollId) -> Result<()> {
        self.ensure_exists(bankroll_id)?;
        self.locks.with_bankroll(bankroll_id, || {
            let mut bankroll = self.bankrolls.get(bankroll_id)?;
            bankroll.sort_entries();
            let periods = self.settlements.periods_for_bankroll(bankroll_id)?;
            let locks = LockIndex::for_bankroll(bankroll_id, &periods);
            LedgerInvariantChecks::check_all(&bankroll, &locks)
        })
    }
}
