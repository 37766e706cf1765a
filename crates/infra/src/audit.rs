//! Point-in-time audit reconstruction.
//!
//! Replays the version history of an account key and, for every historical
//! snapshot, resolves the transaction that snapshot points at. The pointer is
//! read from the snapshot itself, never from the current account, so earlier
//! records keep their own counterparty after later transfers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use payledger_accounts::TransactionKind;
use payledger_accounts::codec::decode_transaction;
use payledger_core::{AccountId, TransactionId};

use crate::account_ledger::decode_account_at;
use crate::error::{LedgerError, LedgerResult};
use crate::store::{HistoryIter, KeyModification, VersionedStore};

/// One stored version of an account key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    /// Balance of the snapshot; 0 for tombstones.
    pub balance: i64,
    /// Transaction that produced the snapshot; `None` for tombstones.
    #[serde(rename = "txId")]
    pub transaction_id: Option<TransactionId>,
    pub kind: Option<TransactionKind>,
    pub trade_partner: Option<AccountId>,
    pub trade_amount: i64,
    pub timestamp: DateTime<Utc>,
    pub is_delete: bool,
}

impl HistoryRecord {
    fn tombstone(timestamp: DateTime<Utc>) -> Self {
        Self {
            balance: 0,
            transaction_id: None,
            kind: None,
            trade_partner: None,
            trade_amount: 0,
            timestamp,
            is_delete: true,
        }
    }
}

/// Read-only statement builder over a `VersionedStore`.
#[derive(Debug, Clone)]
pub struct AuditReconstructor<S> {
    store: S,
}

impl<S: VersionedStore> AuditReconstructor<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Lazy statement, oldest version first.
    ///
    /// Every call re-reads the history from scratch. The iterator yields at
    /// most one error and then ends.
    pub fn statement(&self, account_id: &AccountId) -> LedgerResult<AccountStatement<'_, S>> {
        let history = self.store.history_of(account_id.as_str())?;
        Ok(AccountStatement {
            store: &self.store,
            account_id: account_id.clone(),
            history,
            done: false,
        })
    }

    /// Whole statement, or the first error. An account that was never written
    /// is `NotFound`.
    #[tracing::instrument(skip_all, fields(account_id = %account_id), err)]
    pub fn get_account_statement(&self, account_id: &AccountId) -> LedgerResult<Vec<HistoryRecord>> {
        let records = self.statement(account_id)?.collect::<LedgerResult<Vec<_>>>()?;
        if records.is_empty() {
            return Err(LedgerError::not_found(format!("history of account {account_id}")));
        }
        Ok(records)
    }
}

/// Iterator over the `HistoryRecord`s of one account.
pub struct AccountStatement<'a, S> {
    store: &'a S,
    account_id: AccountId,
    history: HistoryIter,
    done: bool,
}

impl<S: VersionedStore> AccountStatement<'_, S> {
    fn resolve(&self, modification: KeyModification) -> LedgerResult<HistoryRecord> {
        if modification.is_delete {
            return Ok(HistoryRecord::tombstone(modification.timestamp));
        }

        let key = self.account_id.as_str();
        let bytes = modification
            .value
            .ok_or_else(|| LedgerError::corrupt(key, "version without value"))?;
        let snapshot = decode_account_at(&self.account_id, &bytes)
            .map_err(|e| match e {
                LedgerError::NotFound(reason) => LedgerError::corrupt(key, reason),
                other => other,
            })?;

        let pointer = &snapshot.latest_transaction;
        if *pointer != modification.transaction_id {
            return Err(LedgerError::corrupt(
                key,
                format!(
                    "snapshot points at {pointer} but was written by {}",
                    modification.transaction_id
                ),
            ));
        }

        let tx_bytes = self
            .store
            .get(pointer.as_str())?
            .value
            .ok_or_else(|| LedgerError::corrupt(key, format!("dangling transaction pointer {pointer}")))?;
        let transaction =
            decode_transaction(&tx_bytes).map_err(|e| LedgerError::corrupt(pointer.as_str(), e))?;
        if transaction.transaction_id != *pointer || !transaction.involves(&self.account_id) {
            return Err(LedgerError::corrupt(
                pointer.as_str(),
                format!("transaction does not belong to account {}", self.account_id),
            ));
        }

        Ok(HistoryRecord {
            balance: snapshot.balance,
            trade_partner: Some(transaction.trade_partner(&self.account_id).clone()),
            trade_amount: transaction.amount,
            kind: Some(transaction.kind),
            transaction_id: Some(transaction.transaction_id),
            timestamp: modification.timestamp,
            is_delete: false,
        })
    }
}

impl<S: VersionedStore> Iterator for AccountStatement<'_, S> {
    type Item = LedgerResult<HistoryRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let item = match self.history.next()? {
            Ok(modification) => self.resolve(modification),
            Err(err) => Err(err.into()),
        };
        if item.is_err() {
            self.done = true;
        }
        Some(item)
    }
}
