use crate::config::LoggingConfig;
use crate::error::{Error, Result};
use crate::types::ids::{BankrollId, PeriodId};
use chrono::NaiveDate;
use tracing::Span;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| Error::ConfigError(e.to_string()))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| Error::ConfigError(e.to_string()))
}

pub fn trace_ledger_mutation(bankroll_id: &BankrollId, date: NaiveDate, operation: &'static str) -> Span {
    tracing::info_span!(
        "ledger_mutation",
        bankroll_id = %bankroll_id,
        date = %date,
        operation,
    )
}

pub fn trace_settlement(period_id: &PeriodId, operation: &'static str) -> Span {
    tracing::info_span!(
        "settlement",
        period_id = %period_id,
        operation,
    )
}
