//! Infrastructure layer: versioned store, ledger orchestration, read views, config.

pub mod account_ledger;
pub mod audit;
pub mod balances;
pub mod config;
pub mod error;
pub mod store;

mod integration_tests;

pub use account_ledger::AccountLedger;
pub use audit::{AccountStatement, AuditReconstructor, HistoryRecord};
pub use balances::{BalanceIndexQuery, BalanceReport};
pub use config::{ConfigError, LedgerConfig};
pub use error::{LedgerError, LedgerResult};
