use crate::error::{Error, Result};
use crate::types::amount::Amount;
use crate::types::ids::TransactionId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Balance,
    Deposit,
    Withdrawal,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Balance => "balance",
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdrawal => "withdrawal",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "balance" => Ok(TransactionKind::Balance),
            "deposit" => Ok(TransactionKind::Deposit),
            "withdrawal" => Ok(TransactionKind::Withdrawal),
            other => Err(Error::UnknownTransactionKind(other.to_string())),
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One platform line of a daily entry. `amount` is unsigned in meaning;
/// its effect on the ledger comes from `kind`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformTransaction {
    pub id: TransactionId,
    pub platform_name: String,
    pub kind: TransactionKind,
    pub amount: Amount,
}

impl PlatformTransaction {
    pub fn new(platform_name: impl Into<String>, kind: TransactionKind, amount: Amount) -> Self {
        PlatformTransaction {
            id: TransactionId::new(),
            platform_name: platform_name.into(),
            kind,
            amount,
        }
    }

    pub fn balance(platform_name: impl Into<String>, amount: Amount) -> Self {
        Self::new(platform_name, TransactionKind::Balance, amount)
    }

    pub fn deposit(platform_name: impl Into<String>, amount: Amount) -> Self {
        Self::new(platform_name, TransactionKind::Deposit, amount)
    }

    pub fn withdrawal(platform_name: impl Into<String>, amount: Amount) -> Self {
        Self::new(platform_name, TransactionKind::Withdrawal, amount)
    }
}

/// Per-kind sums of an entry's platform transactions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryTotals {
    pub total_balance: Amount,
    pub deposits: Amount,
    pub withdrawals: Amount,
}

impl EntryTotals {
    pub fn from_transactions(transactions: &[PlatformTransaction]) -> Result<Self> {
        let mut totals = EntryTotals::default();

        for tx in transactions {
            if tx.amount.is_negative() {
                return Err(Error::NegativeAmount {
                    transaction_id: tx.id,
                    amount: tx.amount,
                });
            }

            match tx.kind {
                TransactionKind::Balance => {
                    totals.total_balance = totals.total_balance.checked_add(tx.amount)?;
                }
                TransactionKind::Deposit => {
                    totals.deposits = totals.deposits.checked_add(tx.amount)?;
                }
                TransactionKind::Withdrawal => {
                    totals.withdrawals = totals.withdrawals.checked_add(tx.amount)?;
                }
            }
        }

        Ok(totals)
    }
}
