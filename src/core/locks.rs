use crate::types::ids::BankrollId;
use dashmap::DashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Per-bankroll mutual exclusion for ledger mutations.
///
/// Mutations of one bankroll read its whole entry list and rewrite it, so
/// two of them interleaving would lose an update. Different bankrolls never
/// share a lock.
#[derive(Default)]
pub struct BankrollLocks {
    locks: DashMap<BankrollId, Arc<Mutex<()>>>,
}

impl BankrollLocks {
    pub fn new() -> Self {
        BankrollLocks {
            locks: DashMap::new(),
        }
    }

    /// Number of bankrolls that have a lock allocated.
    pub fn tracked(&self) -> usize {
        self.locks.len()
    }

    fn handle(&self, bankroll_id: BankrollId) -> Arc<Mutex<()>> {
        self.locks
            .entry(bankroll_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone()
    }

    pub fn with_bankroll<T>(&self, bankroll_id: BankrollId, f: impl FnOnce() -> T) -> T {
        let handle = self.handle(bankroll_id);
        let _guard = handle.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    /// Hold the locks of several bankrolls at once. Locks are taken in id
    /// order so that overlapping callers cannot deadlock.
    pub fn with_bankrolls<T>(&self, bankroll_ids: &[BankrollId], f: impl FnOnce() -> T) -> T {
        let mut ids = bankroll_ids.to_vec();
        ids.sort();
        ids.dedup();

        let handles: Vec<Arc<Mutex<()>>> = ids.into_iter().map(|id| self.handle(id)).collect();
        let _guards: Vec<_> = handles
            .iter()
            .map(|h| h.lock().unwrap_or_else(PoisonError::into_inner))
            .collect();
        f()
    }
}
