//! Ledger wiring for the HTTP layer.

use std::sync::Arc;

use payledger_infra::store::InMemoryVersionedStore;
use payledger_infra::{AccountLedger, ConfigError, LedgerConfig};

pub type AppLedger = AccountLedger<Arc<InMemoryVersionedStore>>;

/// Shared state handed to every handler.
#[derive(Debug)]
pub struct AppServices {
    pub ledger: AppLedger,
}

/// In-memory wiring (dev/test): one process-local store behind the ledger.
pub fn build_services(config: LedgerConfig) -> Result<AppServices, ConfigError> {
    let store = Arc::new(InMemoryVersionedStore::new());
    tracing::info!(
        default_balance = config.policy.default_balance,
        kyc_balance = config.policy.kyc_balance,
        admin_role = %config.admin_role,
        "ledger services initialised"
    );
    Ok(AppServices {
        ledger: AccountLedger::new(store, config)?,
    })
}
