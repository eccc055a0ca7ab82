use chrono::NaiveDate;
use thiserror::Error;
use crate::settlement::period::PeriodStatus;
use crate::types::amount::Amount;
use crate::types::ids::{BankrollId, PeriodId, TransactionId};

#[derive(Error, Debug)]
pub enum Error {
    // Ledger Validation Errors
    #[error("Entry already exists: bankroll={bankroll_id}, date={date}")]
    DuplicateEntryDate {
        bankroll_id: BankrollId,
        date: NaiveDate,
    },

    #[error("Entry is locked: bankroll={bankroll_id}, date={date}")]
    EntryLocked {
        bankroll_id: BankrollId,
        date: NaiveDate,
    },

    #[error("Date falls inside a closed settlement period: bankroll={bankroll_id}, date={date}")]
    DateLocked {
        bankroll_id: BankrollId,
        date: NaiveDate,
    },

    #[error("Recomputation would change locked entry: bankroll={bankroll_id}, date={date}")]
    LockedSuccessor {
        bankroll_id: BankrollId,
        date: NaiveDate,
    },

    #[error("Bankroll already exists: {0}")]
    BankrollAlreadyExists(BankrollId),

    // Settlement Validation Errors
    #[error("Settlement overlap: period={period_id} conflicts with {conflicting_period}, bankroll={bankroll_id}, date={date}")]
    SettlementOverlap {
        period_id: PeriodId,
        conflicting_period: PeriodId,
        bankroll_id: BankrollId,
        date: NaiveDate,
    },

    #[error("Settlement period has no entries: {0}")]
    EmptySettlement(PeriodId),

    #[error("Invalid period transition: period={period_id}, from={from}, to={to}")]
    InvalidPeriodTransition {
        period_id: PeriodId,
        from: PeriodStatus,
        to: PeriodStatus,
    },

    #[error("Invalid date range: start={start}, end={end}")]
    InvalidDateRange {
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("Settlement period is closed: {0}")]
    PeriodClosed(PeriodId),

    #[error("Settlement requires at least one bankroll")]
    NoBankrolls,

    #[error("No closed settlement period to unlock: bankroll={bankroll_id}, range={start}..={end}")]
    NothingToUnlock {
        bankroll_id: BankrollId,
        start: NaiveDate,
        end: NaiveDate,
    },

    // Computation Errors
    #[error("Negative transaction amount: transaction={transaction_id}, amount={amount}")]
    NegativeAmount {
        transaction_id: TransactionId,
        amount: Amount,
    },

    #[error("Unknown transaction kind: {0}")]
    UnknownTransactionKind(String),

    #[error("Overflow in {operation}")]
    Overflow { operation: String },

    #[error("Invalid ratio: {0}")]
    InvalidRatio(String),

    // Lookup Errors
    #[error("Bankroll not found: {0}")]
    BankrollNotFound(BankrollId),

    #[error("Entry not found: bankroll={bankroll_id}, date={date}")]
    EntryNotFound {
        bankroll_id: BankrollId,
        date: NaiveDate,
    },

    #[error("Settlement period not found: {0}")]
    PeriodNotFound(PeriodId),

    // Persistence Errors
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Deserialization failed: {0}")]
    DeserializationError(String),

    #[error("Invalid checksum")]
    InvalidChecksum,

    #[error("Unsupported snapshot version: {version}, max supported: {max_supported}")]
    UnsupportedSnapshotVersion {
        version: u32,
        max_supported: u32,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    // System Errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(InvariantViolation),
}

/// Coarse classification callers use to decide how to react to an error.
/// Only `Persistence` is worth retrying.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Computation,
    NotFound,
    Persistence,
    Config,
    Invariant,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::DuplicateEntryDate { .. }
            | Error::EntryLocked { .. }
            | Error::DateLocked { .. }
            | Error::LockedSuccessor { .. }
            | Error::BankrollAlreadyExists(_)
            | Error::SettlementOverlap { .. }
            | Error::EmptySettlement(_)
            | Error::InvalidPeriodTransition { .. }
            | Error::PeriodClosed(_)
            | Error::InvalidDateRange { .. }
            | Error::NoBankrolls
            | Error::NothingToUnlock { .. } => ErrorKind::Validation,

            Error::NegativeAmount { .. }
            | Error::UnknownTransactionKind(_)
            | Error::Overflow { .. }
            | Error::InvalidRatio(_) => ErrorKind::Computation,

            Error::BankrollNotFound(_)
            | Error::EntryNotFound { .. }
            | Error::PeriodNotFound(_) => ErrorKind::NotFound,

            Error::Persistence(_)
            | Error::SerializationError(_)
            | Error::DeserializationError(_)
            | Error::InvalidChecksum
            | Error::UnsupportedSnapshotVersion { .. }
            | Error::IoError(_) => ErrorKind::Persistence,

            Error::ConfigError(_) => ErrorKind::Config,

            Error::InvariantViolation(_) => ErrorKind::Invariant,
        }
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone)]
pub struct InvariantViolation {
    pub invariant: &'static str,
    pub details: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.invariant, self.details)
    }
}
