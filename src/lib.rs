//! Bankroll ledger and settlement engine for staked poker players.
//!
//! A bankroll is a date-ordered list of daily entries. Each entry's result,
//! makeup and realized profit are derived from its platform totals and the
//! entry before it; [`ledger::mutation::LedgerMutationService`] keeps that
//! chain consistent across inserts, edits and deletes, and
//! [`settlement::engine::SettlementEngine`] rolls ranges of entries into
//! settlement periods that lock them once closed.
//!
//! [`core::engine::BankrollEngine`] is the entry point for callers.

pub mod types;
pub mod ledger;
pub mod settlement;
pub mod reporting;
pub mod invariants;
pub mod interfaces;
pub mod storage;
pub mod core;
pub mod error;
pub mod config;
pub mod observability;

pub use crate::core::engine::BankrollEngine;
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::ledger::transaction::{PlatformTransaction, TransactionKind};
pub use crate::types::amount::Amount;
pub use crate::types::ratio::Ratio;

// Snapshot version
pub const SNAPSHOT_VERSION: u32 = 1;
