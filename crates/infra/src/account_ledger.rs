//! Ledger orchestration: registration, KYC approval, transfers and closure.
//!
//! `AccountLedger` composes a `VersionedStore` with the pure decision functions
//! of `payledger-accounts`:
//!
//! ```text
//! operation
//!   ↓
//! 1. Begin a scoped store transaction (fresh transaction ID)
//!   ↓
//! 2. Read the affected documents (versions are recorded)
//!   ↓
//! 3. Decide (pure, produces the new documents)
//!   ↓
//! 4. Stage every write and commit them as one batch
//! ```
//!
//! Any failure before step 4 drops the transaction, which discards every
//! staged write. A commit either applies the whole batch or nothing.

use tracing::{info, instrument, warn};

use payledger_accounts::codec::{self, decode_transaction, decode_user};
use payledger_accounts::{Account, Document, LedgerPolicy, Transaction, UserPrivateDetails, UserProfile};
use payledger_auth::{CollectionResolver, IdentityProvider, Role, require_role};
use payledger_core::{AccountId, DomainError, TransactionId};

use crate::audit::AuditReconstructor;
use crate::balances::BalanceIndexQuery;
use crate::config::{ConfigError, LedgerConfig};
use crate::error::{LedgerError, LedgerResult};
use crate::store::{StoreTransaction, VersionedStore};

/// The central ledger component; owns the conservation invariant.
///
/// Generic over the store so tests run against `InMemoryVersionedStore` and a
/// deployment plugs in its own backend. Shared across threads by wrapping the
/// store in an `Arc` (or borrowing it).
#[derive(Debug)]
pub struct AccountLedger<S> {
    store: S,
    policy: LedgerPolicy,
    admin_role: Role,
    collections: CollectionResolver,
}

impl<S> AccountLedger<S> {
    /// Wire a ledger over `store`. The config is validated here so a bad
    /// policy fails at startup rather than on the first registration.
    pub fn new(store: S, config: LedgerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            store,
            policy: config.policy,
            admin_role: config.admin_role,
            collections: CollectionResolver::new(config.collections),
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: VersionedStore> AccountLedger<S> {
    /// Open an account for the caller.
    ///
    /// The bank defaults to the caller's organization. The private record, the
    /// account and its genesis transaction are committed together.
    #[instrument(
        skip_all,
        fields(caller = %identity.caller_id(), organization = %identity.caller_organization()),
        err
    )]
    pub fn register_account<I>(
        &self,
        identity: &I,
        bank: Option<&str>,
        profile: UserProfile,
    ) -> LedgerResult<Account>
    where
        I: IdentityProvider + ?Sized,
    {
        profile.validate()?;
        let bank = bank.unwrap_or_else(|| identity.caller_organization()).trim();
        if bank.is_empty() {
            return Err(DomainError::validation("bank field must be a non-empty string").into());
        }
        let account_id = AccountId::derive(&profile.name, bank)?;
        let collection = self.collections.resolve_caller(identity)?;

        let mut txn = StoreTransaction::begin(&self.store);
        // A deleted account keeps its key history, so its ID is never reissued.
        if txn.version(account_id.as_str())? > 0 {
            warn!(%account_id, "account key already has history");
            return Err(LedgerError::AlreadyExists(format!("account {account_id}")));
        }
        for existing in self.collections.collections() {
            if txn.get_private(existing, account_id.as_str())?.is_some() {
                warn!(%account_id, collection = existing, "user already registered");
                return Err(LedgerError::AlreadyExists(format!("user {account_id}")));
            }
        }

        let registration =
            Account::open(account_id.clone(), bank, &self.policy, txn.transaction_id().clone())?;
        let details = UserPrivateDetails::from_profile(account_id.clone(), profile, identity.caller_id());

        txn.put_private(collection, account_id.as_str(), encode_user(&details)?);
        stage_account(&mut txn, &registration.account)?;
        stage_transaction(&mut txn, &registration.genesis)?;
        let receipt = txn.commit().map_err(LedgerError::from_commit)?;

        info!(
            %account_id,
            bank,
            balance = registration.account.balance,
            transaction_id = %receipt.transaction_id,
            "account registered"
        );
        Ok(registration.account)
    }

    /// Flip the KYC flag and raise the balance to the policy floor.
    #[instrument(skip_all, fields(account_id = %account_id), err)]
    pub fn approve_kyc(&self, account_id: &AccountId) -> LedgerResult<Account> {
        let mut txn = StoreTransaction::begin(&self.store);
        let account = read_account(&mut txn, account_id)?;
        let approval = account.approve_kyc(&self.policy, txn.transaction_id().clone())?;

        stage_account(&mut txn, &approval.account)?;
        stage_transaction(&mut txn, &approval.grant)?;
        let receipt = txn.commit().map_err(LedgerError::from_commit)?;

        info!(
            balance = approval.account.balance,
            granted = approval.grant.amount,
            transaction_id = %receipt.transaction_id,
            "kyc approved"
        );
        Ok(approval.account)
    }

    /// Move `amount` between two accounts; returns the shared transaction ID.
    ///
    /// Debit, credit and the log append commit as one unit. A concurrent writer
    /// that touched either account first turns this into `Conflict`.
    #[instrument(skip_all, fields(remitter = %remitter, beneficiary = %beneficiary), err)]
    pub fn transfer(
        &self,
        remitter: &AccountId,
        beneficiary: &AccountId,
        amount: i64,
    ) -> LedgerResult<TransactionId> {
        if amount <= 0 {
            warn!(amount, "transfer rejected: non-positive amount");
            return Err(DomainError::InvalidAmount(amount).into());
        }

        let mut txn = StoreTransaction::begin(&self.store);
        let from = read_account(&mut txn, remitter)?;
        let to = read_account(&mut txn, beneficiary)?;

        let outcome = match payledger_accounts::transfer(&from, &to, amount, txn.transaction_id().clone()) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(amount, error = %err, "transfer rejected");
                return Err(err.into());
            }
        };

        stage_account(&mut txn, &outcome.remitter)?;
        stage_account(&mut txn, &outcome.beneficiary)?;
        stage_transaction(&mut txn, &outcome.transaction)?;
        let receipt = txn.commit().map_err(LedgerError::from_commit)?;

        info!(
            amount,
            transaction_id = %receipt.transaction_id,
            "transfer committed"
        );
        Ok(receipt.transaction_id)
    }

    #[instrument(skip_all, fields(account_id = %account_id), err)]
    pub fn kyc_status_of(&self, account_id: &AccountId) -> LedgerResult<bool> {
        Ok(self.account(account_id)?.kyc_status)
    }

    #[instrument(skip_all, fields(account_id = %account_id), err)]
    pub fn balance_of(&self, account_id: &AccountId) -> LedgerResult<i64> {
        Ok(self.account(account_id)?.balance)
    }

    /// Current snapshot of an account.
    pub fn account(&self, account_id: &AccountId) -> LedgerResult<Account> {
        let current = self.store.get(account_id.as_str())?;
        let bytes = current
            .value
            .ok_or_else(|| LedgerError::not_found(format!("account {account_id}")))?;
        decode_account_at(account_id, &bytes)
    }

    /// Look up a logged transaction by ID.
    pub fn transaction(&self, transaction_id: &TransactionId) -> LedgerResult<Transaction> {
        let current = self.store.get(transaction_id.as_str())?;
        let bytes = current
            .value
            .ok_or_else(|| LedgerError::not_found(format!("transaction {transaction_id}")))?;
        decode_transaction(&bytes).map_err(|e| LedgerError::corrupt(transaction_id.as_str(), e))
    }

    /// Close an account. Only the current value goes; history and the
    /// transaction log remain.
    #[instrument(
        skip_all,
        fields(account_id = %account_id, caller = %identity.caller_id()),
        err
    )]
    pub fn delete_account<I>(&self, identity: &I, account_id: &AccountId) -> LedgerResult<()>
    where
        I: IdentityProvider + ?Sized,
    {
        if let Err(err) = require_role(identity, &self.admin_role) {
            warn!(role = %self.admin_role, "account deletion refused");
            return Err(err.into());
        }

        let mut txn = StoreTransaction::begin(&self.store);
        read_account(&mut txn, account_id)?;
        txn.delete(account_id.as_str());
        let receipt = txn.commit().map_err(LedgerError::from_commit)?;

        info!(transaction_id = %receipt.transaction_id, "account deleted");
        Ok(())
    }

    /// Private record of `user_id` in the caller's own collection.
    #[instrument(skip_all, fields(user_id = %user_id), err)]
    pub fn read_user_details<I>(&self, identity: &I, user_id: &AccountId) -> LedgerResult<UserPrivateDetails>
    where
        I: IdentityProvider + ?Sized,
    {
        let collection = self.collections.resolve_caller(identity)?;
        self.read_private(collection, user_id)
    }

    /// Private record of `user_id` in an explicitly named collection.
    ///
    /// Only members of the collection may read it.
    #[instrument(skip_all, fields(user_id = %user_id), err)]
    pub fn read_user_from_collection<I>(
        &self,
        identity: &I,
        collection: &str,
        user_id: &AccountId,
    ) -> LedgerResult<UserPrivateDetails>
    where
        I: IdentityProvider + ?Sized,
    {
        let organization = identity.caller_organization();
        if !self.collections.is_member(organization, collection) {
            warn!(organization, collection, "private collection read refused");
            return Err(LedgerError::Forbidden(format!(
                "organization '{organization}' is not a member of '{collection}'"
            )));
        }
        self.read_private(collection, user_id)
    }

    pub fn auditor(&self) -> AuditReconstructor<&S> {
        AuditReconstructor::new(&self.store)
    }

    pub fn balances(&self) -> BalanceIndexQuery<&S> {
        BalanceIndexQuery::new(&self.store)
    }

    fn read_private(&self, collection: &str, user_id: &AccountId) -> LedgerResult<UserPrivateDetails> {
        let bytes = self
            .store
            .get_private(collection, user_id.as_str())?
            .ok_or_else(|| LedgerError::not_found(format!("user {user_id}")))?;
        decode_user(&bytes).map_err(|e| LedgerError::corrupt(user_id.as_str(), e))
    }
}

/// Decode the document stored under an account key.
///
/// A key holding another document kind is not an account (`NotFound`); bytes
/// that do not decode, or an account stored under a foreign key, are `Corrupt`.
pub(crate) fn decode_account_at(account_id: &AccountId, bytes: &[u8]) -> LedgerResult<Account> {
    match codec::decode(bytes) {
        Ok(Document::Account(account)) if &account.account_id == account_id => Ok(account),
        Ok(Document::Account(account)) => Err(LedgerError::corrupt(
            account_id.as_str(),
            format!("document belongs to account {}", account.account_id),
        )),
        Ok(other) => Err(LedgerError::not_found(format!(
            "account {account_id} (key holds a {} document)",
            other.kind()
        ))),
        Err(err) => Err(LedgerError::corrupt(account_id.as_str(), err)),
    }
}

fn read_account<S>(txn: &mut StoreTransaction<'_, S>, account_id: &AccountId) -> LedgerResult<Account>
where
    S: VersionedStore + ?Sized,
{
    let bytes = txn
        .get(account_id.as_str())?
        .ok_or_else(|| LedgerError::not_found(format!("account {account_id}")))?;
    decode_account_at(account_id, &bytes)
}

fn stage_account<S>(txn: &mut StoreTransaction<'_, S>, account: &Account) -> LedgerResult<()>
where
    S: VersionedStore + ?Sized,
{
    let key = account.account_id.as_str();
    let bytes = account.encode().map_err(|e| LedgerError::corrupt(key, e))?;
    txn.put(key, bytes);
    Ok(())
}

fn stage_transaction<S>(txn: &mut StoreTransaction<'_, S>, transaction: &Transaction) -> LedgerResult<()>
where
    S: VersionedStore + ?Sized,
{
    let key = transaction.transaction_id.as_str();
    let bytes = transaction.encode().map_err(|e| LedgerError::corrupt(key, e))?;
    txn.put(key, bytes);
    Ok(())
}

fn encode_user(details: &UserPrivateDetails) -> LedgerResult<Vec<u8>> {
    details
        .encode()
        .map_err(|e| LedgerError::corrupt(details.user_id.as_str(), e))
}
