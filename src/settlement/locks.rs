use crate::ledger::bankroll::Bankroll;
use crate::settlement::period::SettlementPeriod;
use crate::types::ids::{BankrollId, PeriodId};
use chrono::NaiveDate;

/// Closed-period coverage for one bankroll.
///
/// This is the source of truth for entry locks; `LedgerEntry::locked` is a
/// cached copy refreshed through `apply`.
#[derive(Clone, Debug, Default)]
pub struct LockIndex {
    ranges: Vec<(NaiveDate, NaiveDate, PeriodId)>,
}

impl LockIndex {
    pub fn for_bankroll(bankroll_id: BankrollId, periods: &[SettlementPeriod]) -> Self {
        let ranges = periods
            .iter()
            .filter(|p| p.is_closed() && p.includes_bankroll(bankroll_id))
            .map(|p| (p.start_date, p.end_date, p.id))
            .collect();

        LockIndex { ranges }
    }

    pub fn is_locked(&self, date: NaiveDate) -> bool {
        self.covering_period(date).is_some()
    }

    pub fn covering_period(&self, date: NaiveDate) -> Option<PeriodId> {
        self.ranges
            .iter()
            .find(|(start, end, _)| date >= *start && date <= *end)
            .map(|(_, _, id)| *id)
    }

    /// Refresh every entry's `locked` flag from coverage.
    pub fn apply(&self, bankroll: &mut Bankroll) {
        for entry in &mut bankroll.entries {
            entry.locked = self.is_locked(entry.date);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settlement::period::SettlementRecord;
    use crate::types::amount::Amount;
    use crate::types::ids::OperatorId;
    use chrono::Utc;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, d).unwrap()
    }

    fn period_for(bankroll_id: BankrollId, start: u32, end: u32, closed: bool) -> SettlementPeriod {
        let record = SettlementRecord {
            bankroll_id,
            entry_dates: vec![day(start)],
            previous_makeup: Amount::zero(),
            current_makeup: Amount::zero(),
            deposits: Amount::zero(),
            withdrawals: Amount::zero(),
            profit_share: Amount::zero(),
            bank_reserve: Amount::zero(),
            period_profit: Amount::zero(),
            cumulative_profit: Amount::zero(),
        };
        let mut period = SettlementPeriod::new(day(start), day(end), vec![record], OperatorId::system()).unwrap();
        if closed {
            period.close(OperatorId::system(), Utc::now()).unwrap();
        }
        period
    }

    #[test]
    fn only_closed_periods_of_the_bankroll_lock() {
        let mine = BankrollId::new();
        let other = BankrollId::new();
        let periods = vec![
            period_for(mine, 1, 7, true),
            period_for(mine, 8, 14, false),
            period_for(other, 15, 21, true),
        ];

        let index = LockIndex::for_bankroll(mine, &periods);
        assert!(index.is_locked(day(1)));
        assert!(index.is_locked(day(7)));
        assert!(!index.is_locked(day(8)));
        assert!(!index.is_locked(day(16)));
        assert_eq!(index.covering_period(day(3)), Some(periods[0].id));
    }
}
