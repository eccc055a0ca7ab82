use crate::error::Result;
use crate::ledger::bankroll::Bankroll;
use crate::ledger::entry::LedgerEntry;
use crate::types::amount::Amount;
use crate::types::ids::BankrollId;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankrollSummary {
    pub bankroll_id: BankrollId,
    pub current_amount: Amount,
    pub total_profit: Amount,
    pub current_makeup: Amount,
    pub realized_profit: Amount,
    pub entry_count: usize,
}

pub struct BankrollAggregator;

impl BankrollAggregator {
    /// Read-side projection of a bankroll. Entries are ordered by date here
    /// rather than trusting the stored order.
    pub fn summarize(bankroll: &Bankroll) -> Result<BankrollSummary> {
        let mut ordered: Vec<&LedgerEntry> = bankroll.entries.iter().collect();
        ordered.sort_by_key(|e| e.date);

        let total_profit = Amount::checked_sum(ordered.iter().map(|e| e.result))?;

        let (current_amount, current_makeup, realized_profit) = match ordered.last() {
            Some(latest) => (latest.total_balance, latest.makeup, latest.realized_profit),
            None => (bankroll.initial_amount, Amount::zero(), Amount::zero()),
        };

        Ok(BankrollSummary {
            bankroll_id: bankroll.id,
            current_amount,
            total_profit,
            current_makeup,
            realized_profit,
            entry_count: ordered.len(),
        })
    }
}
