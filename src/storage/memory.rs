use crate::error::{Error, Result};
use crate::interfaces::repository::{BankrollRepository, SettlementRepository};
use crate::ledger::bankroll::Bankroll;
use crate::settlement::period::SettlementPeriod;
use crate::storage::snapshot::LedgerSnapshot;
use crate::types::ids::{BankrollId, PeriodId};
use dashmap::DashMap;

/// Repository backed by concurrent maps, used by tests and the CLI. State can
/// be moved in and out through `LedgerSnapshot`.
#[derive(Default)]
pub struct InMemoryRepository {
    bankrolls: DashMap<BankrollId, Bankroll>,
    periods: DashMap<PeriodId, SettlementPeriod>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        InMemoryRepository {
            bankrolls: DashMap::new(),
            periods: DashMap::new(),
        }
    }

    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Self {
        let repository = InMemoryRepository::new();
        for bankroll in snapshot.bankrolls {
            repository.bankrolls.insert(bankroll.id, bankroll);
        }
        for period in snapshot.periods {
            repository.periods.insert(period.id, period);
        }
        repository
    }

    pub fn snapshot(&self) -> Result<LedgerSnapshot> {
        let mut bankrolls: Vec<Bankroll> = self.bankrolls.iter().map(|b| b.value().clone()).collect();
        bankrolls.sort_by_key(|b| b.id);

        let mut periods: Vec<SettlementPeriod> = self.periods.iter().map(|p| p.value().clone()).collect();
        periods.sort_by_key(|p| (p.start_date, p.id));

        LedgerSnapshot::new(bankrolls, periods)
    }

    pub fn period_count(&self) -> usize {
        self.periods.len()
    }
}

impl BankrollRepository for InMemoryRepository {
    fn get(&self, bankroll_id: BankrollId) -> Result<Bankroll> {
        self.bankrolls
            .get(&bankroll_id)
            .map(|b| b.value().clone())
            .ok_or(Error::BankrollNotFound(bankroll_id))
    }

    fn contains(&self, bankroll_id: BankrollId) -> Result<bool> {
        Ok(self.bankrolls.contains_key(&bankroll_id))
    }

    fn insert(&self, bankroll: Bankroll) -> Result<()> {
        if self.bankrolls.contains_key(&bankroll.id) {
            return Err(Error::BankrollAlreadyExists(bankroll.id));
        }
        self.bankrolls.insert(bankroll.id, bankroll);
        Ok(())
    }

    fn update(&self, bankroll: &Bankroll) -> Result<()> {
        let mut stored = self
            .bankrolls
            .get_mut(&bankroll.id)
            .ok_or(Error::BankrollNotFound(bankroll.id))?;
        *stored = bankroll.clone();
        Ok(())
    }

    fn delete(&self, bankroll_id: BankrollId) -> Result<()> {
        self.bankrolls
            .remove(&bankroll_id)
            .map(|_| ())
            .ok_or(Error::BankrollNotFound(bankroll_id))
    }

    fn list(&self) -> Result<Vec<BankrollId>> {
        let mut ids: Vec<BankrollId> = self.bankrolls.iter().map(|b| *b.key()).collect();
        ids.sort();
        Ok(ids)
    }
}

impl SettlementRepository for InMemoryRepository {
    fn get_period(&self, period_id: PeriodId) -> Result<SettlementPeriod> {
        self.periods
            .get(&period_id)
            .map(|p| p.value().clone())
            .ok_or(Error::PeriodNotFound(period_id))
    }

    fn save_period(&self, period: &SettlementPeriod) -> Result<()> {
        self.periods.insert(period.id, period.clone());
        Ok(())
    }

    fn delete_period(&self, period_id: PeriodId) -> Result<()> {
        self.periods
            .remove(&period_id)
            .map(|_| ())
            .ok_or(Error::PeriodNotFound(period_id))
    }

    fn periods_for_bankroll(&self, bankroll_id: BankrollId) -> Result<Vec<SettlementPeriod>> {
        let mut periods: Vec<SettlementPeriod> = self
            .periods
            .iter()
            .filter(|p| p.includes_bankroll(bankroll_id))
            .map(|p| p.value().clone())
            .collect();
        periods.sort_by_key(|p| (p.start_date, p.id));
        Ok(periods)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::amount::Amount;
    use crate::types::ratio::Ratio;

    #[test]
    fn insert_get_update_delete() {
        let repo = InMemoryRepository::new();
        let mut bankroll = Bankroll::new("Alice", Amount::from_units(5_000), Ratio::percent(50), Ratio::percent(20));
        let id = bankroll.id;

        repo.insert(bankroll.clone()).unwrap();
        assert!(matches!(repo.insert(bankroll.clone()), Err(Error::BankrollAlreadyExists(_))));

        bankroll.name = "Alice (MTT)".to_string();
        repo.update(&bankroll).unwrap();
        assert_eq!(repo.get(id).unwrap().name, "Alice (MTT)");
        assert_eq!(repo.list().unwrap(), vec![id]);

        repo.delete(id).unwrap();
        assert!(matches!(repo.get(id), Err(Error::BankrollNotFound(_))));
        assert!(repo.update(&bankroll).is_err());
    }
}
