use serde::{Deserialize, Serialize};

use payledger_core::{AccountId, DomainError, DomainResult, TransactionId};

use crate::policy::LedgerPolicy;
use crate::transaction::{Transaction, TransactionKind};

/// Current snapshot of an account.
///
/// Every stored version points at the transaction that produced it through
/// `latest_transaction`, so a historical snapshot resolves its counterparty
/// with a single lookup instead of a scan of the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "accountID")]
    pub account_id: AccountId,
    #[serde(rename = "kycStatus")]
    pub kyc_status: bool,
    /// Never negative.
    pub balance: i64,
    /// Immutable after creation.
    pub bank: String,
    #[serde(rename = "transaction")]
    pub latest_transaction: TransactionId,
}

/// Documents produced by opening an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub account: Account,
    pub genesis: Transaction,
}

/// Documents produced by a KYC approval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KycApproval {
    pub account: Account,
    pub grant: Transaction,
}

/// Documents produced by a transfer: both updated accounts share one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    pub remitter: Account,
    pub beneficiary: Account,
    pub transaction: Transaction,
}

impl Account {
    /// Open an account holding the policy's default balance.
    ///
    /// The genesis transaction records the grant from the bank so the audit
    /// trail is well formed from the first version on.
    pub fn open(
        account_id: AccountId,
        bank: &str,
        policy: &LedgerPolicy,
        tx_id: TransactionId,
    ) -> DomainResult<Registration> {
        policy.validate()?;
        if bank.trim().is_empty() {
            return Err(DomainError::validation("bank field must be a non-empty string"));
        }

        let genesis = Transaction {
            transaction_id: tx_id.clone(),
            kind: TransactionKind::Genesis,
            remitter: AccountId::new(bank)?,
            beneficiary: account_id.clone(),
            amount: policy.default_balance,
        };

        let account = Account {
            account_id,
            kyc_status: false,
            balance: policy.default_balance,
            bank: bank.to_string(),
            latest_transaction: tx_id,
        };

        Ok(Registration { account, genesis })
    }

    /// Mark KYC as approved and raise the balance to the policy floor.
    ///
    /// Re-approval re-grants the floor; it is never additive and never lowers
    /// a balance that is already above the floor.
    pub fn approve_kyc(&self, policy: &LedgerPolicy, tx_id: TransactionId) -> DomainResult<KycApproval> {
        policy.validate()?;

        let balance = self.balance.max(policy.kyc_balance);
        let grant = Transaction {
            transaction_id: tx_id.clone(),
            kind: TransactionKind::KycGrant,
            remitter: AccountId::new(self.bank.as_str())?,
            beneficiary: self.account_id.clone(),
            amount: balance - self.balance,
        };

        let account = Account {
            kyc_status: true,
            balance,
            latest_transaction: tx_id,
            ..self.clone()
        };

        Ok(KycApproval { account, grant })
    }
}

/// Move `amount` from `remitter` to `beneficiary`.
///
/// Pure decision: validates the preconditions and returns the three documents
/// to write. Nothing is returned on failure, so a rejected transfer changes
/// neither account.
pub fn transfer(
    remitter: &Account,
    beneficiary: &Account,
    amount: i64,
    tx_id: TransactionId,
) -> DomainResult<TransferOutcome> {
    if amount <= 0 {
        return Err(DomainError::InvalidAmount(amount));
    }
    if remitter.account_id == beneficiary.account_id {
        return Err(DomainError::SelfTransfer(remitter.account_id.clone()));
    }
    if remitter.balance < amount {
        return Err(DomainError::InsufficientFunds {
            account: remitter.account_id.clone(),
            available: remitter.balance,
            requested: amount,
        });
    }

    let credited = beneficiary
        .balance
        .checked_add(amount)
        .ok_or_else(|| DomainError::BalanceOverflow(beneficiary.account_id.clone()))?;

    let transaction = Transaction {
        transaction_id: tx_id.clone(),
        kind: TransactionKind::Transfer,
        remitter: remitter.account_id.clone(),
        beneficiary: beneficiary.account_id.clone(),
        amount,
    };

    Ok(TransferOutcome {
        remitter: Account {
            balance: remitter.balance - amount,
            latest_transaction: tx_id.clone(),
            ..remitter.clone()
        },
        beneficiary: Account {
            balance: credited,
            latest_transaction: tx_id,
            ..beneficiary.clone()
        },
        transaction,
    })
}
