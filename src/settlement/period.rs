use crate::error::{Error, Result};
use crate::types::amount::Amount;
use crate::types::ids::{BankrollId, OperatorId, PeriodId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodStatus {
    Open,
    Closed,
}

impl fmt::Display for PeriodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodStatus::Open => f.write_str("open"),
            PeriodStatus::Closed => f.write_str("closed"),
        }
    }
}

/// One player's figures for a settlement period.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRecord {
    pub bankroll_id: BankrollId,
    /// Dates of the entries this record aggregates.
    pub entry_dates: Vec<NaiveDate>,
    pub previous_makeup: Amount,
    pub current_makeup: Amount,
    pub deposits: Amount,
    pub withdrawals: Amount,
    pub profit_share: Amount,
    pub bank_reserve: Amount,
    /// "Lucro Fechamento"
    pub period_profit: Amount,
    /// "Lucro Total"
    pub cumulative_profit: Amount,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementPeriod {
    pub id: PeriodId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: PeriodStatus,
    pub records: Vec<SettlementRecord>,
    pub total_profit: Amount,
    pub total_makeup: Amount,
    pub created_at: DateTime<Utc>,
    pub created_by: OperatorId,
    pub closed_at: Option<DateTime<Utc>>,
    pub closed_by: Option<OperatorId>,
    /// Set by the first close and never cleared. A period that was ever
    /// closed can be reopened but not discarded.
    pub ever_closed: bool,
}

impl SettlementPeriod {
    pub fn new(
        start_date: NaiveDate,
        end_date: NaiveDate,
        records: Vec<SettlementRecord>,
        created_by: OperatorId,
    ) -> Result<Self> {
        let mut period = SettlementPeriod {
            id: PeriodId::new(),
            start_date,
            end_date,
            status: PeriodStatus::Open,
            records: Vec::new(),
            total_profit: Amount::zero(),
            total_makeup: Amount::zero(),
            created_at: Utc::now(),
            created_by,
            closed_at: None,
            closed_by: None,
            ever_closed: false,
        };
        period.set_records(records)?;
        Ok(period)
    }

    /// Replace the per-player records and re-derive the period totals.
    pub fn set_records(&mut self, records: Vec<SettlementRecord>) -> Result<()> {
        self.total_profit = Amount::checked_sum(records.iter().map(|r| r.period_profit))?;
        self.total_makeup = Amount::checked_sum(records.iter().map(|r| r.current_makeup))?;
        self.records = records;
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.status == PeriodStatus::Closed
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    pub fn intersects(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && start <= self.end_date
    }

    pub fn includes_bankroll(&self, bankroll_id: BankrollId) -> bool {
        self.records.iter().any(|r| r.bankroll_id == bankroll_id)
    }

    pub fn record_for(&self, bankroll_id: BankrollId) -> Option<&SettlementRecord> {
        self.records.iter().find(|r| r.bankroll_id == bankroll_id)
    }

    pub fn bankroll_ids(&self) -> Vec<BankrollId> {
        self.records.iter().map(|r| r.bankroll_id).collect()
    }

    pub fn entry_count(&self) -> usize {
        self.records.iter().map(|r| r.entry_dates.len()).sum()
    }

    /// Open -> Closed
    pub fn close(&mut self, closed_by: OperatorId, closed_at: DateTime<Utc>) -> Result<()> {
        self.transition(PeriodStatus::Closed)?;
        self.closed_at = Some(closed_at);
        self.closed_by = Some(closed_by);
        self.ever_closed = true;
        Ok(())
    }

    /// Closed -> Open. The closing stamp is dropped; `ever_closed` stays set.
    pub fn reopen(&mut self) -> Result<()> {
        self.transition(PeriodStatus::Open)?;
        self.closed_at = None;
        self.closed_by = None;
        Ok(())
    }

    fn transition(&mut self, to: PeriodStatus) -> Result<()> {
        match (self.status, to) {
            (PeriodStatus::Open, PeriodStatus::Closed) | (PeriodStatus::Closed, PeriodStatus::Open) => {
                self.status = to;
                Ok(())
            }
            (from, to) => Err(Error::InvalidPeriodTransition {
                period_id: self.id,
                from,
                to,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, d).unwrap()
    }

    fn record(bankroll_id: BankrollId, profit: i64, makeup: i64) -> SettlementRecord {
        SettlementRecord {
            bankroll_id,
            entry_dates: vec![day(2)],
            previous_makeup: Amount::zero(),
            current_makeup: Amount::from_units(makeup),
            deposits: Amount::zero(),
            withdrawals: Amount::zero(),
            profit_share: Amount::zero(),
            bank_reserve: Amount::zero(),
            period_profit: Amount::from_units(profit),
            cumulative_profit: Amount::from_units(profit),
        }
    }

    #[test]
    fn totals_follow_records() {
        let records = vec![record(BankrollId::new(), 300, 0), record(BankrollId::new(), -100, 800)];
        let period = SettlementPeriod::new(day(1), day(7), records, OperatorId::system()).unwrap();
        assert_eq!(period.total_profit, Amount::from_units(200));
        assert_eq!(period.total_makeup, Amount::from_units(800));
        assert_eq!(period.entry_count(), 2);
    }

    #[test]
    fn state_machine_allows_only_open_closed_cycle() {
        let mut period = SettlementPeriod::new(day(1), day(7), Vec::new(), OperatorId::system()).unwrap();
        assert!(matches!(period.reopen(), Err(Error::InvalidPeriodTransition { .. })));

        let operator = OperatorId::new();
        assert!(!period.ever_closed);
        period.close(operator, Utc::now()).unwrap();
        assert!(period.is_closed());
        assert_eq!(period.closed_by, Some(operator));
        assert!(period.close(operator, Utc::now()).is_err());

        period.reopen().unwrap();
        assert_eq!(period.status, PeriodStatus::Open);
        assert!(period.closed_at.is_none());
        assert!(period.closed_by.is_none());
        assert!(period.ever_closed);
    }

    #[test]
    fn range_checks_are_inclusive() {
        let period = SettlementPeriod::new(day(8), day(14), Vec::new(), OperatorId::system()).unwrap();
        assert!(period.covers(day(8)));
        assert!(period.covers(day(14)));
        assert!(!period.covers(day(15)));
        assert!(period.intersects(day(14), day(20)));
        assert!(!period.intersects(day(1), day(7)));
    }
}
