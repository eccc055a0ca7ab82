use anyhow::Context;
use bankroll_ledger::config::loader::AppConfig;
use bankroll_ledger::core::engine::BankrollEngine;
use bankroll_ledger::interfaces::repository::BankrollRepository;
use bankroll_ledger::observability::tracing::init_tracing;
use bankroll_ledger::storage::memory::InMemoryRepository;
use bankroll_ledger::storage::snapshot::LedgerSnapshot;
use std::sync::Arc;

/// Load a ledger snapshot, check every bankroll's invariants and print
/// its summary.
///
/// Usage: bankroll-ledger [--json] <snapshot.bin>
fn main() -> anyhow::Result<()> {
    let env = std::env::var("BANKROLL_ENV").unwrap_or_else(|_| "development".to_string());
    let config = AppConfig::load(&env).context("loading configuration")?;
    init_tracing(&config.logging).context("initializing tracing")?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let json = args.iter().any(|a| a == "--json");
    let path = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .cloned()
        .context("usage: bankroll-ledger [--json] <snapshot.bin>")?;

    let snapshot = LedgerSnapshot::load(&path)
        .with_context(|| format!("loading snapshot {}", path))?;
    let repository = Arc::new(InMemoryRepository::from_snapshot(snapshot));
    let engine = BankrollEngine::with_repository(repository.clone(), config.staking.clone());

    let mut failures = 0usize;
    for bankroll_id in repository.list()? {
        if let Err(e) = engine.verify(bankroll_id) {
            failures += 1;
            tracing::error!(bankroll_id = %bankroll_id, error = %e, "Ledger verification failed");
            continue;
        }

        let summary = engine.summary(bankroll_id)?;
        if json {
            println!("{}", serde_json::to_string(&summary)?);
            continue;
        }
        println!(
            "{}  entries={}  current={}  profit={}  makeup={}  realized={}",
            bankroll_id,
            summary.entry_count,
            summary.current_amount,
            summary.total_profit,
            summary.current_makeup,
            summary.realized_profit,
        );
    }

    tracing::info!(
        periods = repository.period_count(),
        failures,
        "Verification complete"
    );

    if failures > 0 {
        anyhow::bail!("{} bankroll(s) failed verification", failures);
    }
    Ok(())
}
