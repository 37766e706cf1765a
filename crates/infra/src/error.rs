//! Ledger-level error taxonomy.

use thiserror::Error;

use payledger_auth::AuthzError;
use payledger_core::{AccountId, DomainError};

use crate::store::StoreError;

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Error returned by every ledger operation.
///
/// No operation recovers locally: a transfer is never retried behind the
/// caller's back, so the caller decides whether and how to retry.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("insufficient funds on {account}: balance {available}, requested {requested}")]
    InsufficientFunds {
        account: AccountId,
        available: i64,
        requested: i64,
    },

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("corrupt document at '{key}': {reason}")]
    Corrupt { key: String, reason: String },

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("transaction aborted: {0}")]
    TransactionAborted(String),

    /// Collaborator failure, propagated verbatim.
    #[error(transparent)]
    StoreUnavailable(#[from] StoreError),
}

impl LedgerError {
    pub fn not_found(what: impl core::fmt::Display) -> Self {
        Self::NotFound(what.to_string())
    }

    pub fn corrupt(key: impl Into<String>, reason: impl core::fmt::Display) -> Self {
        Self::Corrupt {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// Map a failed commit: lost optimistic races are `Conflict`, anything
    /// else means the write set did not land and the operation is aborted.
    pub fn from_commit(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { .. } => Self::Conflict(err.to_string()),
            other => Self::TransactionAborted(other.to_string()),
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::NotFound(_) => "not_found",
            LedgerError::AlreadyExists(_) => "already_exists",
            LedgerError::InsufficientFunds { .. } => "insufficient_funds",
            LedgerError::InvalidAmount(_) => "invalid_amount",
            LedgerError::Validation(_) => "validation_error",
            LedgerError::Corrupt { .. } => "corrupt",
            LedgerError::Forbidden(_) => "forbidden",
            LedgerError::Conflict(_) => "conflict",
            LedgerError::TransactionAborted(_) => "transaction_aborted",
            LedgerError::StoreUnavailable(_) => "store_unavailable",
        }
    }
}

impl From<DomainError> for LedgerError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::InsufficientFunds {
                account,
                available,
                requested,
            } => LedgerError::InsufficientFunds {
                account,
                available,
                requested,
            },
            DomainError::InvalidAmount(amount) => {
                LedgerError::InvalidAmount(format!("{amount} (must be positive)"))
            }
            DomainError::BalanceOverflow(account) => {
                LedgerError::InvalidAmount(format!("credit would overflow the balance of {account}"))
            }
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => LedgerError::Validation(msg),
            DomainError::SelfTransfer(_) => LedgerError::Validation(value.to_string()),
        }
    }
}

impl From<AuthzError> for LedgerError {
    fn from(value: AuthzError) -> Self {
        match value {
            AuthzError::Forbidden(msg) => LedgerError::Forbidden(msg),
            AuthzError::UnknownOrganization(_) => LedgerError::Forbidden(value.to_string()),
        }
    }
}
