use crate::error::Result;
use crate::ledger::entry::LedgerEntry;
use crate::types::amount::Amount;

pub struct ResultCalculator;

impl ResultCalculator {
    /// Session result of an entry.
    ///
    /// First entry (`previous_entry` is `None`): balance - initial amount.
    /// Later entries: balance - previous balance - deposits + withdrawals, so
    /// cash moved in or out of the platforms is not counted as play.
    pub fn compute(
        current_total_balance: Amount,
        previous_entry: Option<&LedgerEntry>,
        current_deposits: Amount,
        current_withdrawals: Amount,
        initial_amount: Amount,
    ) -> Result<Amount> {
        match previous_entry {
            None => current_total_balance.checked_sub(initial_amount),
            Some(previous) => current_total_balance
                .checked_sub(previous.total_balance)?
                .checked_sub(current_deposits)?
                .checked_add(current_withdrawals),
        }
    }
}
