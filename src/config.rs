//! Configuration with validation and defaults.

use serde::{Deserialize, Serialize};

/// Top-level configuration for a BichoRP instance.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct BichoConfig {
    pub storage: StorageConfig,
    pub seed: SeedConfig,
}

/// Where the persisted snapshot lives.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: "./bichorp_state.json".to_string(),
        }
    }
}

/// Values used when no snapshot exists and the ledger is seeded fresh.
///
/// The admin account (id "1") created from these values can never be
/// deleted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SeedConfig {
    pub admin_username: String,
    pub admin_password: String,
    pub admin_rp_name: String,
    pub admin_balance: i64,
    /// Default starting credits for newly authorized players.
    pub initial_credits: i64,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            admin_username: "admin".to_string(),
            admin_password: "admin".to_string(),
            admin_rp_name: "Diretor Geral".to_string(),
            admin_balance: 1_000_000,
            initial_credits: 5_000,
        }
    }
}

impl BichoConfig {
    /// Validate configuration for logical consistency.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.storage.data_file.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "storage.data_file must be set".to_string(),
            ));
        }
        if self.seed.admin_username.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "seed.admin_username must be set".to_string(),
            ));
        }
        if self.seed.admin_balance < 0 {
            return Err(ConfigValidationError::InvalidValue(
                "seed.admin_balance must be >= 0".to_string(),
            ));
        }
        if self.seed.initial_credits <= 0 {
            return Err(ConfigValidationError::InvalidValue(
                "seed.initial_credits must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
