use serde::{Deserialize, Serialize};

use payledger_core::{AccountId, TransactionId};

/// What produced a transaction document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Initial grant written when an account is registered.
    Genesis,
    /// Balance raised to the KYC floor on approval.
    KycGrant,
    /// Funds moved between two accounts.
    Transfer,
}

/// Immutable entry in the append-only transaction log.
///
/// Banks act as the remitter of genesis and KYC grants, identified by their tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "txID")]
    pub transaction_id: TransactionId,
    pub kind: TransactionKind,
    pub remitter: AccountId,
    pub beneficiary: AccountId,
    /// Amount in smallest unit. Positive for transfers; grants may be zero.
    pub amount: i64,
}

impl Transaction {
    /// The other party of this transaction relative to `account`.
    pub fn trade_partner(&self, account: &AccountId) -> &AccountId {
        if &self.remitter == account {
            &self.beneficiary
        } else {
            &self.remitter
        }
    }

    pub fn involves(&self, account: &AccountId) -> bool {
        &self.remitter == account || &self.beneficiary == account
    }
}
