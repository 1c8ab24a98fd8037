use std::path::Path;

use serde::{Deserialize, Serialize};

use bounty_model::PaymentMethod;

/// The full marketplace configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Human-readable marketplace identifier.
    pub market_name: String,
    /// ISO currency code for display; amounts are minor units of this
    /// currency everywhere.
    pub currency: String,
    /// Payment method assigned to created payments.
    pub default_payment_method: PaymentMethod,
    /// Fairness score below which a distribution is flagged.
    pub fairness_threshold: f64,
    /// Directory for the store and event log snapshots.
    pub data_dir: String,
    /// JSON-RPC server port.
    pub rpc_port: u16,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            market_name: "bounty-market".to_string(),
            currency: "USD".to_string(),
            default_payment_method: PaymentMethod::Fiat,
            fairness_threshold: 0.70,
            data_dir: "/tmp/bounty-data".to_string(),
            rpc_port: 9815,
        }
    }
}

impl MarketConfig {
    /// Load a configuration from a JSON file and validate it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: MarketConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration as pretty JSON.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Validate all invariants of the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.market_name.is_empty() {
            return Err(ConfigError::EmptyMarketName);
        }
        if self.currency.is_empty() {
            return Err(ConfigError::EmptyCurrency);
        }
        if !(0.0..=1.0).contains(&self.fairness_threshold) {
            return Err(ConfigError::InvalidThreshold(self.fairness_threshold));
        }
        if self.data_dir.is_empty() {
            return Err(ConfigError::EmptyDataDir);
        }
        if self.rpc_port == 0 {
            return Err(ConfigError::ZeroRpcPort);
        }
        Ok(())
    }

    /// Path of the market store snapshot under `data_dir`.
    pub fn store_path(&self) -> std::path::PathBuf {
        Path::new(&self.data_dir).join("market.json")
    }

    /// Path of the event log snapshot under `data_dir`.
    pub fn events_path(&self) -> std::path::PathBuf {
        Path::new(&self.data_dir).join("events.json")
    }
}

/// Errors from loading or validating the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("market name must not be empty")]
    EmptyMarketName,

    #[error("currency must not be empty")]
    EmptyCurrency,

    #[error("fairness threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("data directory must not be empty")]
    EmptyDataDir,

    #[error("RPC port must not be zero")]
    ZeroRpcPort,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        MarketConfig::default().validate().expect("default config should validate");
    }

    #[test]
    fn file_roundtrip() {
        let config = MarketConfig::default();
        let tmp = std::env::temp_dir().join("bounty_config_roundtrip.json");

        config.to_file(&tmp).expect("config write should succeed");
        let loaded = MarketConfig::from_file(&tmp).expect("config read should succeed");
        let _ = std::fs::remove_file(&tmp);

        assert_eq!(loaded.market_name, config.market_name);
        assert_eq!(loaded.currency, config.currency);
        assert_eq!(loaded.rpc_port, config.rpc_port);
    }

    #[test]
    fn invalid_threshold_rejected() {
        let config = MarketConfig {
            fairness_threshold: 1.5,
            ..MarketConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidThreshold(_))
        ));
    }

    #[test]
    fn empty_fields_rejected() {
        let config = MarketConfig {
            market_name: String::new(),
            ..MarketConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyMarketName)));

        let config = MarketConfig {
            currency: String::new(),
            ..MarketConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyCurrency)));
    }

    #[test]
    fn snapshot_paths_under_data_dir() {
        let config = MarketConfig {
            data_dir: "/var/lib/bounty".to_string(),
            ..MarketConfig::default()
        };
        assert_eq!(
            config.store_path(),
            std::path::PathBuf::from("/var/lib/bounty/market.json")
        );
        assert_eq!(
            config.events_path(),
            std::path::PathBuf::from("/var/lib/bounty/events.json")
        );
    }
}
