use crate::error::Result;
use crate::ledger::bankroll::Bankroll;
use crate::settlement::period::SettlementPeriod;
use crate::types::ids::{BankrollId, PeriodId};

/// Storage boundary for bankrolls. Implementations report missing records
/// as `Error::BankrollNotFound` and storage failures as `Error::Persistence`.
pub trait BankrollRepository: Send + Sync {
    fn get(&self, bankroll_id: BankrollId) -> Result<Bankroll>;
    fn contains(&self, bankroll_id: BankrollId) -> Result<bool>;
    fn insert(&self, bankroll: Bankroll) -> Result<()>;
    fn update(&self, bankroll: &Bankroll) -> Result<()>;
    fn delete(&self, bankroll_id: BankrollId) -> Result<()>;
    fn list(&self) -> Result<Vec<BankrollId>>;
}

pub trait SettlementRepository: Send + Sync {
    fn get_period(&self, period_id: PeriodId) -> Result<SettlementPeriod>;
    fn save_period(&self, period: &SettlementPeriod) -> Result<()>;
    fn delete_period(&self, period_id: PeriodId) -> Result<()>;
    /// Every period with a record for `bankroll_id`, ordered by start date.
    fn periods_for_bankroll(&self, bankroll_id: BankrollId) -> Result<Vec<SettlementPeriod>>;
}
