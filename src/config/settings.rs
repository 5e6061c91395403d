use crate::core::monetary::{DEFAULT_BATCH_SIZE, MAX_NOTE_LENGTH, MAX_SUPPLY, MIN_TRANSACTION_FEE};
use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

const BATCH_SIZE_KEY: &str = "LEDGER_BATCH_SIZE";
const MIN_FEE_KEY: &str = "LEDGER_MIN_FEE";
const MAX_SUPPLY_KEY: &str = "LEDGER_MAX_SUPPLY";
const SEED_KEY: &str = "LEDGER_SEED";

/// Construction parameters for a [`Ledger`](crate::core::Ledger)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub name: String,
    pub description: String,
    /// Mixed into every block hash
    pub seed: String,
    /// Transactions per sealed block
    pub batch_size: usize,
    pub min_fee: u64,
    /// Held by the master account at genesis
    pub max_supply: u64,
    /// In characters
    pub max_note_length: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            name: String::new(),
            description: String::new(),
            seed: String::new(),
            batch_size: DEFAULT_BATCH_SIZE,
            min_fee: MIN_TRANSACTION_FEE,
            max_supply: MAX_SUPPLY,
            max_note_length: MAX_NOTE_LENGTH,
        }
    }
}

impl LedgerConfig {
    pub fn new(name: &str, description: &str, seed: &str) -> LedgerConfig {
        LedgerConfig {
            name: name.to_string(),
            description: description.to_string(),
            seed: seed.to_string(),
            ..Default::default()
        }
    }

    pub fn with_identity(mut self, name: &str, description: &str, seed: &str) -> LedgerConfig {
        self.name = name.to_string();
        self.description = description.to_string();
        self.seed = seed.to_string();
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> LedgerConfig {
        self.batch_size = batch_size;
        self
    }

    pub fn from_toml_str(text: &str) -> Result<LedgerConfig> {
        let config: LedgerConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<LedgerConfig> {
        let text = fs::read_to_string(path)
            .map_err(|e| LedgerError::Config(format!("Failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// Apply `LEDGER_*` environment variables on top of this config
    pub fn with_env_overrides(self) -> Result<LedgerConfig> {
        self.with_overrides_from(|key| env::var(key).ok())
    }

    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<LedgerConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(BATCH_SIZE_KEY) {
            self.batch_size = parse_setting(BATCH_SIZE_KEY, &value)?;
        }
        if let Some(value) = lookup(MIN_FEE_KEY) {
            self.min_fee = parse_setting(MIN_FEE_KEY, &value)?;
        }
        if let Some(value) = lookup(MAX_SUPPLY_KEY) {
            self.max_supply = parse_setting(MAX_SUPPLY_KEY, &value)?;
        }
        if let Some(seed) = lookup(SEED_KEY) {
            self.seed = seed;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(LedgerError::Config(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if self.max_supply == 0 {
            return Err(LedgerError::Config(
                "max_supply must be at least 1".to_string(),
            ));
        }
        if self.min_fee > self.max_supply {
            return Err(LedgerError::Config(format!(
                "min_fee {} exceeds max_supply {}",
                self.min_fee, self.max_supply
            )));
        }
        Ok(())
    }
}

fn parse_setting<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| LedgerError::Config(format!("{key} is not a valid number: {value}")))
}
