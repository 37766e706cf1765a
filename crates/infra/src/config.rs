//! Configuration loading and representation.
//!
//! Defaults match the historical deployment (start balance 0, KYC floor 100,
//! two organizations). A JSON file may replace any subset of fields and
//! environment variables override both.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use payledger_accounts::LedgerPolicy;
use payledger_auth::{CollectionConfig, Role};
use payledger_core::DomainError;

pub const ENV_DEFAULT_BALANCE: &str = "PAYLEDGER_DEFAULT_BALANCE";
pub const ENV_KYC_BALANCE: &str = "PAYLEDGER_KYC_BALANCE";
pub const ENV_ADMIN_ROLE: &str = "PAYLEDGER_ADMIN_ROLE";
pub const ENV_COLLECTIONS: &str = "PAYLEDGER_COLLECTIONS";
pub const ENV_FALLBACK_COLLECTION: &str = "PAYLEDGER_FALLBACK_COLLECTION";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {message}")]
    InvalidVar { var: &'static str, message: String },

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid policy: {0}")]
    Policy(#[from] DomainError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LedgerConfig {
    pub policy: LedgerPolicy,
    /// Role required to close accounts.
    pub admin_role: Role,
    pub collections: CollectionConfig,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            policy: LedgerPolicy::default(),
            admin_role: Role::ADMIN,
            collections: CollectionConfig::default(),
        }
    }
}

impl LedgerConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|var| std::env::var(var).ok())
    }

    /// Apply `PAYLEDGER_*` overrides read through `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_DEFAULT_BALANCE) {
            self.policy.default_balance = parse_i64(ENV_DEFAULT_BALANCE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_KYC_BALANCE) {
            self.policy.kyc_balance = parse_i64(ENV_KYC_BALANCE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_ADMIN_ROLE) {
            let role = raw.trim();
            if role.is_empty() {
                return Err(ConfigError::InvalidVar {
                    var: ENV_ADMIN_ROLE,
                    message: "must be non-empty".to_string(),
                });
            }
            self.admin_role = Role::new(role.to_string());
        }
        if let Some(raw) = lookup(ENV_COLLECTIONS) {
            self.collections.organizations = parse_collections(&raw)?;
        }
        if let Some(raw) = lookup(ENV_FALLBACK_COLLECTION) {
            let fallback = raw.trim();
            self.collections.fallback = (!fallback.is_empty()).then(|| fallback.to_string());
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.policy.validate()?;
        Ok(())
    }
}

fn parse_i64(var: &'static str, raw: &str) -> Result<i64, ConfigError> {
    raw.trim().parse::<i64>().map_err(|e| ConfigError::InvalidVar {
        var,
        message: e.to_string(),
    })
}

/// Parse `Org1MSP=DreamLandUserCollection,Org2MSP=ToyLandUserCollection`.
fn parse_collections(raw: &str) -> Result<BTreeMap<String, String>, ConfigError> {
    let mut mapping = BTreeMap::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (org, collection) = entry
            .split_once('=')
            .map(|(o, c)| (o.trim(), c.trim()))
            .filter(|(o, c)| !o.is_empty() && !c.is_empty())
            .ok_or_else(|| ConfigError::InvalidVar {
                var: ENV_COLLECTIONS,
                message: format!("expected ORG=COLLECTION, got '{entry}'"),
            })?;
        mapping.insert(org.to_string(), collection.to_string());
    }
    Ok(mapping)
}
