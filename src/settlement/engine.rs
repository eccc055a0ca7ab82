use crate::error::{Error, Result};
use crate::interfaces::repository::{BankrollRepository, SettlementRepository};
use crate::ledger::bankroll::Bankroll;
use crate::ledger::entry::LedgerEntry;
use crate::observability::tracing::trace_settlement;
use crate::settlement::locks::LockIndex;
use crate::settlement::period::{PeriodStatus, SettlementPeriod, SettlementRecord};
use crate::types::amount::Amount;
use crate::types::ids::{BankrollId, OperatorId, PeriodId};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;

/// Groups unsettled entries into settlement periods and locks them.
///
/// The engine never touches result or makeup; it reads the ledger as the
/// mutation service left it. Locks follow the period state:
/// `Open -> Closed` on finalize, `Closed -> Open` on unlock.
pub struct SettlementEngine<R, S> {
    bankrolls: Arc<R>,
    settlements: Arc<S>,
}

impl<R, S> SettlementEngine<R, S>
where
    R: BankrollRepository,
    S: SettlementRepository,
{
    pub fn new(bankrolls: Arc<R>, settlements: Arc<S>) -> Self {
        SettlementEngine {
            bankrolls,
            settlements,
        }
    }

    pub fn create(
        &self,
        bankroll_ids: &[BankrollId],
        start_date: NaiveDate,
        end_date: NaiveDate,
        created_by: OperatorId,
    ) -> Result<SettlementPeriod> {
        if bankroll_ids.is_empty() {
            return Err(Error::NoBankrolls);
        }
        if start_date > end_date {
            return Err(Error::InvalidDateRange {
                start: start_date,
                end: end_date,
            });
        }

        let mut ids = bankroll_ids.to_vec();
        ids.sort();
        ids.dedup();

        let records = ids
            .iter()
            .map(|id| self.build_record(*id, start_date, end_date))
            .collect::<Result<Vec<_>>>()?;

        let period = SettlementPeriod::new(start_date, end_date, records, created_by)?;
        let _span = trace_settlement(&period.id, "create").entered();

        self.settlements.save_period(&period)?;

        tracing::info!(
            start = %start_date,
            end = %end_date,
            players = period.records.len(),
            entries = period.entry_count(),
            "Created settlement period"
        );
        Ok(period)
    }

    /// Close an open period and lock every entry it aggregates.
    ///
    /// Records are refreshed against the current ledger first, so edits made
    /// while the period was open are reflected in the closed figures.
    pub fn finalize(&self, period_id: PeriodId, closed_by: OperatorId) -> Result<SettlementPeriod> {
        let _span = trace_settlement(&period_id, "finalize").entered();
        let mut period = self.settlements.get_period(period_id)?;

        if period.is_closed() {
            return Err(Error::InvalidPeriodTransition {
                period_id,
                from: PeriodStatus::Closed,
                to: PeriodStatus::Closed,
            });
        }

        for record in &period.records {
            let periods = self.settlements.periods_for_bankroll(record.bankroll_id)?;
            let locks = LockIndex::for_bankroll(record.bankroll_id, &periods);

            for date in &record.entry_dates {
                if let Some(conflicting_period) = locks.covering_period(*date) {
                    return Err(Error::SettlementOverlap {
                        period_id,
                        conflicting_period,
                        bankroll_id: record.bankroll_id,
                        date: *date,
                    });
                }
            }
        }

        let stored = period.clone();
        let records = period
            .bankroll_ids()
            .into_iter()
            .map(|id| self.build_record(id, period.start_date, period.end_date))
            .collect::<Result<Vec<_>>>()?;
        period.set_records(records)?;

        if period.entry_count() == 0 {
            return Err(Error::EmptySettlement(period_id));
        }

        period.close(closed_by, Utc::now())?;
        self.commit_periods(&[stored], std::slice::from_ref(&period))?;

        tracing::info!(
            entries = period.entry_count(),
            total_profit = %period.total_profit,
            total_makeup = %period.total_makeup,
            "Finalized settlement period"
        );
        Ok(period)
    }

    /// Reopen every closed period of `bankroll_id` that intersects the range.
    ///
    /// Coverage is per period, so entries of other players in a reopened
    /// period are unlocked as well. Returns the reopened period ids.
    pub fn unlock(
        &self,
        bankroll_id: BankrollId,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PeriodId>> {
        let targets = self.closed_periods_in_range(bankroll_id, start_date, end_date)?;
        if targets.is_empty() {
            return Err(Error::NothingToUnlock {
                bankroll_id,
                start: start_date,
                end: end_date,
            });
        }

        let stored = targets.clone();
        let mut reopened = targets;
        for period in &mut reopened {
            period.reopen()?;
        }
        self.commit_periods(&stored, &reopened)?;

        for period in &reopened {
            let _span = trace_settlement(&period.id, "unlock").entered();
            tracing::info!("Unlocked settlement period");
        }
        Ok(reopened.into_iter().map(|p| p.id).collect())
    }

    /// Bankrolls whose locks an `unlock` over this range would touch.
    pub fn unlock_scope(
        &self,
        bankroll_id: BankrollId,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<BankrollId>> {
        let mut ids: Vec<BankrollId> = self
            .closed_periods_in_range(bankroll_id, start_date, end_date)?
            .iter()
            .flat_map(|p| p.bankroll_ids())
            .collect();
        ids.push(bankroll_id);
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    /// Remove a period that has never been closed.
    pub fn discard(&self, period_id: PeriodId) -> Result<()> {
        let period = self.settlements.get_period(period_id)?;
        if period.is_closed() || period.ever_closed {
            return Err(Error::PeriodClosed(period_id));
        }
        self.settlements.delete_period(period_id)
    }

    pub fn is_date_locked(&self, bankroll_id: BankrollId, date: NaiveDate) -> Result<bool> {
        if !self.bankrolls.contains(bankroll_id)? {
            return Err(Error::BankrollNotFound(bankroll_id));
        }
        let periods = self.settlements.periods_for_bankroll(bankroll_id)?;
        Ok(LockIndex::for_bankroll(bankroll_id, &periods).is_locked(date))
    }

    /// Save the changed periods, then refresh the cached lock flags of every
    /// bankroll they include. Coverage is written first; if any later write
    /// fails, the stored periods and the bankrolls already rewritten are put
    /// back so flags and coverage still agree.
    fn commit_periods(&self, stored: &[SettlementPeriod], changed: &[SettlementPeriod]) -> Result<()> {
        let mut saved = 0;
        let mut rewritten: Vec<Bankroll> = Vec::new();

        let outcome = (|| -> Result<()> {
            for period in changed {
                self.settlements.save_period(period)?;
                saved += 1;
            }

            let mut affected: Vec<BankrollId> = changed.iter().flat_map(|p| p.bankroll_ids()).collect();
            affected.sort();
            affected.dedup();

            for id in affected {
                let mut bankroll = self.bankrolls.get(id)?;
                let original = bankroll.clone();
                let periods = self.settlements.periods_for_bankroll(id)?;
                LockIndex::for_bankroll(id, &periods).apply(&mut bankroll);
                self.bankrolls.update(&bankroll)?;
                rewritten.push(original);
            }
            Ok(())
        })();

        if let Err(e) = outcome {
            for period in &stored[..saved] {
                if let Err(rollback) = self.settlements.save_period(period) {
                    tracing::error!(period_id = %period.id, error = %rollback, "Failed to restore settlement period");
                }
            }
            for bankroll in &rewritten {
                if let Err(rollback) = self.bankrolls.update(bankroll) {
                    tracing::error!(bankroll_id = %bankroll.id, error = %rollback, "Failed to restore lock flags");
                }
            }
            return Err(e);
        }
        Ok(())
    }

    fn closed_periods_in_range(
        &self,
        bankroll_id: BankrollId,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<SettlementPeriod>> {
        if start_date > end_date {
            return Err(Error::InvalidDateRange {
                start: start_date,
                end: end_date,
            });
        }

        Ok(self
            .settlements
            .periods_for_bankroll(bankroll_id)?
            .into_iter()
            .filter(|p| p.is_closed() && p.intersects(start_date, end_date))
            .collect())
    }

    fn build_record(
        &self,
        bankroll_id: BankrollId,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<SettlementRecord> {
        let mut bankroll = self.bankrolls.get(bankroll_id)?;
        bankroll.sort_entries();

        let periods = self.settlements.periods_for_bankroll(bankroll_id)?;
        let locks = LockIndex::for_bankroll(bankroll_id, &periods);

        Self::summarize_range(&bankroll, &locks, start_date, end_date)
    }

    /// Per-player figures for `[start_date, end_date]`, skipping entries
    /// already covered by a closed period. `bankroll.entries` must be sorted.
    pub fn summarize_range(
        bankroll: &Bankroll,
        locks: &LockIndex,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<SettlementRecord> {
        let contributing: Vec<&LedgerEntry> = bankroll
            .entries_between(start_date, end_date)
            .filter(|e| !locks.is_locked(e.date))
            .collect();

        let previous_makeup = bankroll
            .predecessor(start_date)
            .map(|e| e.makeup)
            .unwrap_or_default();
        let current_makeup = bankroll
            .latest_on_or_before(end_date)
            .map(|e| e.makeup)
            .unwrap_or(previous_makeup);

        let deposits = Amount::checked_sum(contributing.iter().map(|e| e.deposits))?;
        let withdrawals = Amount::checked_sum(contributing.iter().map(|e| e.withdrawals))?;
        let period_profit = Amount::checked_sum(contributing.iter().map(|e| e.result))?;
        let cumulative_profit = Amount::checked_sum(
            bankroll
                .entries
                .iter()
                .take_while(|e| e.date <= end_date)
                .map(|e| e.result),
        )?;

        Ok(SettlementRecord {
            bankroll_id: bankroll.id,
            entry_dates: contributing.iter().map(|e| e.date).collect(),
            previous_makeup,
            current_makeup,
            deposits,
            withdrawals,
            profit_share: bankroll.staking_percentage.apply(period_profit)?,
            bank_reserve: bankroll.bank_reserve_percentage.apply(withdrawals)?,
            period_profit,
            cumulative_profit,
        })
    }
}
