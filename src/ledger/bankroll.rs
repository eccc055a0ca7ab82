use crate::ledger::entry::LedgerEntry;
use crate::types::amount::Amount;
use crate::types::ids::BankrollId;
use crate::types::ratio::Ratio;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A player's tracked pool of funds across platforms.
///
/// `entries` are kept sorted by date with at most one entry per day; summary
/// figures are never stored here, see `BankrollAggregator`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bankroll {
    pub id: BankrollId,
    pub name: String,
    pub initial_amount: Amount,
    /// Backer's share of period profit.
    pub staking_percentage: Ratio,
    /// Share of withdrawals withheld as a risk buffer.
    pub bank_reserve_percentage: Ratio,
    pub entries: Vec<LedgerEntry>,
    pub created_at: DateTime<Utc>,
}

impl Bankroll {
    pub fn new(
        name: impl Into<String>,
        initial_amount: Amount,
        staking_percentage: Ratio,
        bank_reserve_percentage: Ratio,
    ) -> Self {
        Bankroll {
            id: BankrollId::new(),
            name: name.into(),
            initial_amount,
            staking_percentage,
            bank_reserve_percentage,
            entries: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Restore date order after loading from storage.
    pub fn sort_entries(&mut self) {
        self.entries.sort_by_key(|e| e.date);
    }

    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        self.entries.binary_search_by_key(&date, |e| e.date).ok()
    }

    /// Index at which an entry for `date` would be inserted.
    pub fn insertion_point(&self, date: NaiveDate) -> usize {
        self.entries.partition_point(|e| e.date < date)
    }

    pub fn entry(&self, date: NaiveDate) -> Option<&LedgerEntry> {
        self.position(date).map(|idx| &self.entries[idx])
    }

    /// Latest entry dated strictly before `date`.
    pub fn predecessor(&self, date: NaiveDate) -> Option<&LedgerEntry> {
        let idx = self.insertion_point(date);
        idx.checked_sub(1).map(|prev| &self.entries[prev])
    }

    /// Latest entry dated on or before `date`.
    pub fn latest_on_or_before(&self, date: NaiveDate) -> Option<&LedgerEntry> {
        let idx = self.entries.partition_point(|e| e.date <= date);
        idx.checked_sub(1).map(|last| &self.entries[last])
    }

    pub fn entries_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Iterator<Item = &LedgerEntry> + '_ {
        self.entries
            .iter()
            .filter(move |e| e.date >= start && e.date <= end)
    }
}
