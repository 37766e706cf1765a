//! Strongly-typed identifiers used across the domain.
//!
//! Account and transaction identifiers are opaque strings: accounts are keyed by
//! a derived `name@bank` pairing, transactions by a store-assigned unique ID.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

const ACCOUNT_SEPARATOR: char = '@';

/// Identifier of an account (also the key of its private user record).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

/// Identifier of an immutable transaction document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

macro_rules! impl_string_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Wrap an identifier, rejecting empty or whitespace-only values.
            pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(DomainError::invalid_id(concat!($name, ": must be non-empty")));
                }
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

impl_string_newtype!(AccountId, "AccountId");
impl_string_newtype!(TransactionId, "TransactionId");

impl AccountId {
    /// Derive the account key for a holder registered at a bank (`name@bank`).
    ///
    /// Neither part may contain the separator, so every key splits back into
    /// exactly one (name, bank) pair.
    pub fn derive(name: &str, bank: &str) -> Result<Self, DomainError> {
        if name.trim().is_empty() || bank.trim().is_empty() {
            return Err(DomainError::invalid_id(
                "AccountId: name and bank must be non-empty",
            ));
        }
        if name.contains(ACCOUNT_SEPARATOR) || bank.contains(ACCOUNT_SEPARATOR) {
            return Err(DomainError::invalid_id(format!(
                "AccountId: name and bank must not contain '{ACCOUNT_SEPARATOR}'"
            )));
        }
        Ok(Self(format!("{name}{ACCOUNT_SEPARATOR}{bank}")))
    }
}

impl TransactionId {
    /// Generate a fresh, time-ordered transaction identifier (UUIDv7).
    ///
    /// Stores use this to honour their unique-ID contract; prefer passing IDs
    /// explicitly in tests for determinism.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }
}
