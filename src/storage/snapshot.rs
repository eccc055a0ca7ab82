use crate::error::{Error, Result};
use crate::ledger::bankroll::Bankroll;
use crate::settlement::period::SettlementPeriod;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Point-in-time copy of every bankroll and settlement period.
///
/// ## Format
/// - **Serialization**: `bincode`
/// - **Checksum**: SHA-256 over the encoded bankrolls and periods, hex encoded
/// - **Write**: temp file in the same directory, then rename
/// - **Read**: version and checksum are verified before anything is returned
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub bankrolls: Vec<Bankroll>,
    pub periods: Vec<SettlementPeriod>,
    pub checksum: String,
}

impl LedgerSnapshot {
    pub fn new(bankrolls: Vec<Bankroll>, periods: Vec<SettlementPeriod>) -> Result<Self> {
        let mut snapshot = LedgerSnapshot {
            version: crate::SNAPSHOT_VERSION,
            created_at: Utc::now(),
            bankrolls,
            periods,
            checksum: String::new(),
        };

        snapshot.checksum = snapshot.calculate_checksum()?;
        Ok(snapshot)
    }

    fn calculate_checksum(&self) -> Result<String> {
        let payload = bincode::serialize(&(&self.bankrolls, &self.periods))
            .map_err(|e| Error::SerializationError(e.to_string()))?;

        let mut hasher = Sha256::new();
        hasher.update(self.version.to_le_bytes());
        hasher.update(&payload);
        Ok(hex::encode(hasher.finalize()))
    }

    pub fn verify_checksum(&self) -> Result<bool> {
        Ok(self.calculate_checksum()? == self.checksum)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let data = bincode::serialize(self)
            .map_err(|e| Error::SerializationError(e.to_string()))?;

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, path)?;

        tracing::info!(
            path = ?path,
            bankrolls = self.bankrolls.len(),
            periods = self.periods.len(),
            "Saved ledger snapshot"
        );
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path)?;

        let snapshot: LedgerSnapshot = bincode::deserialize(&data)
            .map_err(|e| Error::DeserializationError(e.to_string()))?;

        if snapshot.version > crate::SNAPSHOT_VERSION {
            return Err(Error::UnsupportedSnapshotVersion {
                version: snapshot.version,
                max_supported: crate::SNAPSHOT_VERSION,
            });
        }

        if !snapshot.verify_checksum()? {
            return Err(Error::InvalidChecksum);
        }

        tracing::info!(path = ?path, "Loaded ledger snapshot");
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::amount::Amount;
    use crate::types::ratio::Ratio;

    fn sample() -> LedgerSnapshot {
        let bankroll = Bankroll::new("Bob", Amount::from_units(2_000), Ratio::percent(60), Ratio::percent(10));
        LedgerSnapshot::new(vec![bankroll], Vec::new()).unwrap()
    }

    #[test]
    fn save_then_load_preserves_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.bin");
        let snapshot = sample();

        snapshot.save(&path).unwrap();
        let loaded = LedgerSnapshot::load(&path).unwrap();
        assert_eq!(loaded.bankrolls, snapshot.bankrolls);
        assert_eq!(loaded.checksum, snapshot.checksum);
    }

    #[test]
    fn tampered_snapshot_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.bin");
        let mut snapshot = sample();
        snapshot.bankrolls[0].initial_amount = Amount::from_units(9_999);
        snapshot.save(&path).unwrap();

        assert!(matches!(LedgerSnapshot::load(&path), Err(Error::InvalidChecksum)));
    }
}
