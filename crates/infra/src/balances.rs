//! Per-organization balance listing backed by a store predicate query.

use serde::{Deserialize, Serialize};

use payledger_accounts::codec::decode_account;
use payledger_accounts::{DOC_TYPE_FIELD, DocKind};
use payledger_core::AccountId;

use crate::error::{LedgerError, LedgerResult};
use crate::store::{Selector, VersionedStore};

/// Field of an account document holding its bank tag.
const BANK_FIELD: &str = "bank";

/// Read model row: one account and its current balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceReport {
    #[serde(rename = "accountID")]
    pub account_id: AccountId,
    pub balance: i64,
}

#[derive(Debug, Clone)]
pub struct BalanceIndexQuery<S> {
    store: S,
}

impl<S: VersionedStore> BalanceIndexQuery<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Current balance of every live account registered under `bank`.
    ///
    /// Ordering is whatever the store returns. Query failures surface
    /// untranslated as `StoreUnavailable`.
    #[tracing::instrument(skip_all, fields(bank = %bank), err)]
    pub fn list_balances_for_organization(&self, bank: &str) -> LedgerResult<Vec<BalanceReport>> {
        let selector = Selector::new()
            .field(DOC_TYPE_FIELD, DocKind::Account.as_str())
            .field(BANK_FIELD, bank);

        self.store
            .query(&selector)?
            .into_iter()
            .map(|record| -> LedgerResult<BalanceReport> {
                let account = decode_account(&record.value)
                    .map_err(|e| LedgerError::corrupt(record.key.as_str(), e))?;
                Ok(BalanceReport {
                    account_id: account.account_id,
                    balance: account.balance,
                })
            })
            .collect()
    }
}
