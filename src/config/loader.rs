use crate::config::{LoggingConfig, StakingConfig};
use crate::error::{Error, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub staking: StakingConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Layer `config/default`, then `config/{env}` if present, then
    /// `BANKROLL__SECTION__KEY` environment variables.
    pub fn load(env: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("BANKROLL").separator("__"))
            .build()
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        let app: AppConfig = config
            .try_deserialize()
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        app.validate()?;
        Ok(app)
    }

    pub fn validate(&self) -> Result<()> {
        self.staking.staking_ratio()?;
        self.staking.bank_reserve_ratio()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn out_of_range_percentage_fails_validation() {
        let mut config = AppConfig::default();
        config.staking.default_bank_reserve_percentage = 150.0;
        assert!(matches!(config.validate(), Err(Error::InvalidRatio(_))));
    }
}
