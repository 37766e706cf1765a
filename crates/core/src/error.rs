//! Domain error model.

use thiserror::Error;

use crate::id::AccountId;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants). Storage and authorization concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A transfer amount was zero or negative.
    #[error("invalid amount: {0} (must be positive)")]
    InvalidAmount(i64),

    /// The remitter cannot cover the requested amount.
    #[error("insufficient funds on {account}: balance {available}, requested {requested}")]
    InsufficientFunds {
        account: AccountId,
        available: i64,
        requested: i64,
    },

    /// Remitter and beneficiary are the same account.
    #[error("remitter and beneficiary must differ ({0})")]
    SelfTransfer(AccountId),

    /// Crediting the account would overflow its balance.
    #[error("balance overflow on {0}")]
    BalanceOverflow(AccountId),

    /// An identifier was invalid (e.g. empty).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
