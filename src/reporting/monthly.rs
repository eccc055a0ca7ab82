use crate::error::Result;
use crate::ledger::bankroll::Bankroll;
use crate::ledger::entry::LedgerEntry;
use crate::types::amount::Amount;
use crate::types::ids::BankrollId;
use chrono::{Datelike, Month};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthSummary {
    /// 1..=12
    pub month: u32,
    pub entry_count: usize,
    pub total_result: Amount,
    pub deposits: Amount,
    pub withdrawals: Amount,
    /// Makeup after the month's last entry.
    pub closing_makeup: Amount,
    /// Running result from January through this month.
    pub cumulative_result: Amount,
}

impl MonthSummary {
    pub fn month_name(&self) -> &'static str {
        u8::try_from(self.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map(|m| m.name())
            .unwrap_or("Unknown")
    }
}

/// Results of one calendar year grouped by month. Months without entries
/// are left out.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub bankroll_id: BankrollId,
    pub year: i32,
    pub months: Vec<MonthSummary>,
    pub year_total: Amount,
}

impl MonthlyReport {
    pub fn build(bankroll: &Bankroll, year: i32) -> Result<Self> {
        let mut ordered: Vec<&LedgerEntry> = bankroll
            .entries
            .iter()
            .filter(|e| e.date.year() == year)
            .collect();
        ordered.sort_by_key(|e| e.date);

        let mut by_month: BTreeMap<u32, MonthSummary> = BTreeMap::new();
        for entry in ordered {
            let month = entry.date.month();
            let summary = by_month.entry(month).or_insert_with(|| MonthSummary {
                month,
                entry_count: 0,
                total_result: Amount::zero(),
                deposits: Amount::zero(),
                withdrawals: Amount::zero(),
                closing_makeup: Amount::zero(),
                cumulative_result: Amount::zero(),
            });

            summary.entry_count += 1;
            summary.total_result = summary.total_result.checked_add(entry.result)?;
            summary.deposits = summary.deposits.checked_add(entry.deposits)?;
            summary.withdrawals = summary.withdrawals.checked_add(entry.withdrawals)?;
            summary.closing_makeup = entry.makeup;
        }

        let mut running = Amount::zero();
        let mut months = Vec::with_capacity(by_month.len());
        for (_, mut summary) in by_month {
            running = running.checked_add(summary.total_result)?;
            summary.cumulative_result = running;
            months.push(summary);
        }

        Ok(MonthlyReport {
            bankroll_id: bankroll.id,
            year,
            months,
            year_total: running,
        })
    }
}
