use crate::error::Result;
use crate::types::ratio::Ratio;
use serde::{Deserialize, Serialize};

/// Deal terms applied to bankrolls created without explicit percentages.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct StakingConfig {
    pub default_staking_percentage: f64,
    pub default_bank_reserve_percentage: f64,
}

impl StakingConfig {
    pub fn staking_ratio(&self) -> Result<Ratio> {
        Ratio::from_percentage(self.default_staking_percentage)
    }

    pub fn bank_reserve_ratio(&self) -> Result<Ratio> {
        Ratio::from_percentage(self.default_bank_reserve_percentage)
    }
}

impl Default for StakingConfig {
    fn default() -> Self {
        StakingConfig {
            default_staking_percentage: 50.0,       // 50% to the backer
            default_bank_reserve_percentage: 20.0,  // 20% of withdrawals held back
        }
    }
}
