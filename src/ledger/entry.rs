use crate::error::Result;
use crate::ledger::transaction::{EntryTotals, PlatformTransaction};
use crate::types::amount::Amount;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Values the cascade derives for an entry from its totals and its predecessor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedState {
    pub result: Amount,
    pub makeup: Amount,
    pub realized_profit: Amount,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub date: NaiveDate,
    pub platform_transactions: Vec<PlatformTransaction>,
    pub total_balance: Amount,
    pub deposits: Amount,
    pub withdrawals: Amount,
    pub result: Amount,
    pub makeup: Amount,
    pub realized_profit: Amount,
    pub locked: bool,
}

impl LedgerEntry {
    /// Build an entry with its totals filled in. Derived fields stay zero
    /// until the cascade runs over it.
    pub fn new(date: NaiveDate, platform_transactions: Vec<PlatformTransaction>) -> Result<Self> {
        let totals = EntryTotals::from_transactions(&platform_transactions)?;

        Ok(LedgerEntry {
            date,
            platform_transactions,
            total_balance: totals.total_balance,
            deposits: totals.deposits,
            withdrawals: totals.withdrawals,
            result: Amount::zero(),
            makeup: Amount::zero(),
            realized_profit: Amount::zero(),
            locked: false,
        })
    }

    /// Replace the platform lines and recompute totals. Derived fields are
    /// left for the cascade.
    pub fn replace_transactions(&mut self, platform_transactions: Vec<PlatformTransaction>) -> Result<()> {
        let totals = EntryTotals::from_transactions(&platform_transactions)?;

        self.platform_transactions = platform_transactions;
        self.total_balance = totals.total_balance;
        self.deposits = totals.deposits;
        self.withdrawals = totals.withdrawals;
        Ok(())
    }

    pub fn totals(&self) -> EntryTotals {
        EntryTotals {
            total_balance: self.total_balance,
            deposits: self.deposits,
            withdrawals: self.withdrawals,
        }
    }

    pub fn derived(&self) -> DerivedState {
        DerivedState {
            result: self.result,
            makeup: self.makeup,
            realized_profit: self.realized_profit,
        }
    }

    pub fn apply_derived(&mut self, derived: DerivedState) {
        self.result = derived.result;
        self.makeup = derived.makeup;
        self.realized_profit = derived.realized_profit;
    }
}
