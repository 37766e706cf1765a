//! Integration tests for the store-backed ledger.
//!
//! Tests: AccountLedger → StoreTransaction → VersionedStore → audit / balance views
//!
//! Verifies:
//! - Conservation and non-negativity across arbitrary transfer sequences
//! - Failed or raced operations leave no partial writes
//! - Statements replay every stored version, tombstones included
//! - Private collections are isolated per organization

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use proptest::prelude::*;

    use payledger_accounts::{TransactionKind, UserProfile};
    use payledger_auth::{Role, StaticIdentity};
    use payledger_core::{AccountId, TransactionId};

    use crate::account_ledger::AccountLedger;
    use crate::config::LedgerConfig;
    use crate::error::LedgerError;
    use crate::store::{
        CommitReceipt, HistoryIter, InMemoryVersionedStore, QueryRecord, Selector, StoreError,
        Versioned, VersionedStore, WriteBatch,
    };

    fn profile(name: &str) -> UserProfile {
        UserProfile {
            name: name.to_string(),
            address: format!("{name} street 1"),
            sex: "X".to_string(),
        }
    }

    fn org1() -> StaticIdentity {
        StaticIdentity::new("teller-1", "Org1MSP")
    }

    fn org2() -> StaticIdentity {
        StaticIdentity::new("teller-2", "Org2MSP")
    }

    fn admin() -> StaticIdentity {
        StaticIdentity::new("root", "Org1MSP").with_role(Role::ADMIN)
    }

    fn id(s: &str) -> AccountId {
        AccountId::new(s).unwrap()
    }

    fn setup() -> AccountLedger<InMemoryVersionedStore> {
        AccountLedger::new(InMemoryVersionedStore::new(), LedgerConfig::default()).unwrap()
    }

    fn history_len<S: VersionedStore>(store: &S, key: &str) -> usize {
        store.history_of(key).unwrap().count()
    }

    /// alice@bankA (KYC'd, 100) and bob@bankB (0).
    fn funded_pair(ledger: &AccountLedger<InMemoryVersionedStore>) -> (AccountId, AccountId) {
        let alice = ledger.register_account(&org1(), Some("bankA"), profile("alice")).unwrap();
        let bob = ledger.register_account(&org2(), Some("bankB"), profile("bob")).unwrap();
        ledger.approve_kyc(&alice.account_id).unwrap();
        (alice.account_id, bob.account_id)
    }

    #[test]
    fn scenario_registration_starts_at_default_balance() {
        let ledger = setup();
        let account = ledger.register_account(&org1(), Some("bankA"), profile("alice")).unwrap();

        assert_eq!(account.account_id, id("alice@bankA"));
        assert_eq!(ledger.balance_of(&id("alice@bankA")).unwrap(), 0);
        assert!(!ledger.kyc_status_of(&id("alice@bankA")).unwrap());
    }

    #[test]
    fn scenario_kyc_approval_grants_floor() {
        let ledger = setup();
        ledger.register_account(&org1(), Some("bankA"), profile("alice")).unwrap();

        let account = ledger.approve_kyc(&id("alice@bankA")).unwrap();
        assert_eq!(account.balance, 100);
        assert!(ledger.kyc_status_of(&id("alice@bankA")).unwrap());

        let grant = ledger.transaction(&account.latest_transaction).unwrap();
        assert_eq!(grant.kind, TransactionKind::KycGrant);
        assert_eq!(grant.amount, 100);
        assert_eq!(grant.remitter, id("bankA"));
        assert_eq!(grant.beneficiary, id("alice@bankA"));
    }

    #[test]
    fn scenario_transfer_moves_funds_through_one_transaction() {
        let ledger = setup();
        let (alice, bob) = funded_pair(&ledger);

        let tx_id = ledger.transfer(&alice, &bob, 40).unwrap();
        assert_eq!(ledger.balance_of(&alice).unwrap(), 60);
        assert_eq!(ledger.balance_of(&bob).unwrap(), 40);

        let tx = ledger.transaction(&tx_id).unwrap();
        assert_eq!(tx.remitter, alice);
        assert_eq!(tx.beneficiary, bob);
        assert_eq!(tx.amount, 40);
        assert_eq!(ledger.account(&alice).unwrap().latest_transaction, tx_id);
        assert_eq!(ledger.account(&bob).unwrap().latest_transaction, tx_id);
    }

    #[test]
    fn scenario_overdraft_changes_nothing() {
        let ledger = setup();
        let (alice, bob) = funded_pair(&ledger);
        ledger.transfer(&alice, &bob, 40).unwrap();

        let before = (ledger.account(&alice).unwrap(), ledger.account(&bob).unwrap());
        let keys_before = ledger.store().live_keys().unwrap();

        let err = ledger.transfer(&alice, &bob, 1000).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientFunds { available: 60, requested: 1000, .. }
        ));

        assert_eq!(before, (ledger.account(&alice).unwrap(), ledger.account(&bob).unwrap()));
        assert_eq!(ledger.store().live_keys().unwrap(), keys_before);
        assert_eq!(history_len(ledger.store(), alice.as_str()), 3);
    }

    #[test]
    fn scenario_non_admin_cannot_delete_and_history_survives_deletion() {
        let ledger = setup();
        let (alice, bob) = funded_pair(&ledger);
        ledger.transfer(&alice, &bob, 25).unwrap();

        let err = ledger.delete_account(&org1(), &alice).unwrap_err();
        assert!(matches!(err, LedgerError::Forbidden(_)));
        assert_eq!(ledger.balance_of(&alice).unwrap(), 75);

        ledger.delete_account(&admin(), &alice).unwrap();
        assert!(matches!(ledger.balance_of(&alice), Err(LedgerError::NotFound(_))));

        let statement = ledger.auditor().get_account_statement(&alice).unwrap();
        let balances: Vec<i64> = statement.iter().map(|r| r.balance).collect();
        assert_eq!(balances, vec![0, 100, 75, 0]);
        assert!(statement[3].is_delete);
        assert!(statement[..3].iter().all(|r| r.transaction_id.is_some()));
    }

    #[test]
    fn scenario_balances_are_listed_per_bank() {
        let ledger = setup();
        for name in ["alice", "carol", "dave"] {
            ledger.register_account(&org1(), Some("bankA"), profile(name)).unwrap();
        }
        ledger.register_account(&org2(), Some("bankB"), profile("bob")).unwrap();
        ledger.approve_kyc(&id("carol@bankA")).unwrap();

        let mut rows = ledger.balances().list_balances_for_organization("bankA").unwrap();
        rows.sort_by(|a, b| a.account_id.cmp(&b.account_id));

        let listed: Vec<(&str, i64)> = rows.iter().map(|r| (r.account_id.as_str(), r.balance)).collect();
        assert_eq!(
            listed,
            vec![("alice@bankA", 0), ("carol@bankA", 100), ("dave@bankA", 0)]
        );
    }

    #[test]
    fn deleted_accounts_drop_out_of_balance_listing() {
        let ledger = setup();
        let (alice, _) = funded_pair(&ledger);
        ledger.delete_account(&admin(), &alice).unwrap();

        assert!(ledger.balances().list_balances_for_organization("bankA").unwrap().is_empty());
    }

    #[test]
    fn reapproval_regrants_the_floor() {
        let ledger = setup();
        let (alice, bob) = funded_pair(&ledger);
        ledger.transfer(&alice, &bob, 70).unwrap();
        assert_eq!(ledger.balance_of(&alice).unwrap(), 30);

        let account = ledger.approve_kyc(&alice).unwrap();
        assert_eq!(account.balance, 100);
        assert_eq!(ledger.balance_of(&alice).unwrap(), 100);

        let regrant = ledger.transaction(&account.latest_transaction).unwrap();
        assert_eq!(regrant.kind, TransactionKind::KycGrant);
        assert_eq!(regrant.amount, 70);
        assert_eq!(regrant.beneficiary, alice);

        let statement = ledger.auditor().get_account_statement(&alice).unwrap();
        let grants: Vec<(i64, i64)> = statement
            .iter()
            .filter(|r| r.kind == Some(TransactionKind::KycGrant))
            .map(|r| (r.trade_amount, r.balance))
            .collect();
        assert_eq!(grants, vec![(100, 100), (70, 100)]);
        assert_eq!(statement.last().unwrap().transaction_id.as_ref(), Some(&regrant.transaction_id));
    }

    #[test]
    fn deleted_account_id_is_never_reissued() {
        let ledger = setup();
        let (alice, bob) = funded_pair(&ledger);
        ledger.transfer(&alice, &bob, 25).unwrap();
        ledger.delete_account(&admin(), &alice).unwrap();
        let versions = history_len(ledger.store(), alice.as_str());

        // Same name and bank from an organization with a different collection.
        assert!(matches!(
            ledger.register_account(&org2(), Some("bankA"), profile("alice")),
            Err(LedgerError::AlreadyExists(_))
        ));
        assert!(matches!(
            ledger.register_account(&org1(), Some("bankA"), profile("alice")),
            Err(LedgerError::AlreadyExists(_))
        ));

        assert_eq!(history_len(ledger.store(), alice.as_str()), versions);
        assert!(matches!(
            ledger.read_user_details(&org2(), &alice),
            Err(LedgerError::NotFound(_))
        ));
        assert_eq!(ledger.read_user_details(&org1(), &alice).unwrap().registered_by, "teller-1");
    }

    #[test]
    fn live_account_cannot_be_claimed_by_another_organization() {
        let ledger = setup();
        ledger.register_account(&org1(), Some("bankA"), profile("alice")).unwrap();

        assert!(matches!(
            ledger.register_account(&org2(), Some("bankA"), profile("alice")),
            Err(LedgerError::AlreadyExists(_))
        ));
        assert_eq!(
            ledger.store().get_private("ToyLandUserCollection", "alice@bankA").unwrap(),
            None
        );
    }

    #[test]
    fn separator_in_name_or_bank_is_rejected() {
        let ledger = setup();

        let mut tricky = profile("a@b");
        assert!(matches!(
            ledger.register_account(&org1(), Some("c"), tricky.clone()),
            Err(LedgerError::Validation(_))
        ));
        tricky.name = "a".to_string();
        assert!(matches!(
            ledger.register_account(&org1(), Some("b@c"), tricky),
            Err(LedgerError::Validation(_))
        ));
        assert_eq!(ledger.store().live_keys().unwrap(), 0);
    }

    #[test]
    fn transfer_validates_amount_before_looking_up_accounts() {
        let ledger = setup();
        let ghost = id("ghost@bankA");
        let other = id("other@bankB");

        assert!(matches!(ledger.transfer(&ghost, &other, 0), Err(LedgerError::InvalidAmount(_))));
        assert!(matches!(ledger.transfer(&ghost, &other, -3), Err(LedgerError::InvalidAmount(_))));
        assert!(matches!(ledger.transfer(&ghost, &other, 5), Err(LedgerError::NotFound(_))));

        let (alice, _) = funded_pair(&ledger);
        assert!(matches!(ledger.transfer(&alice, &other, 5), Err(LedgerError::NotFound(_))));
        assert!(matches!(ledger.transfer(&alice, &alice, 5), Err(LedgerError::Validation(_))));
        assert_eq!(ledger.balance_of(&alice).unwrap(), 100);
    }

    #[test]
    fn reads_are_idempotent() {
        let ledger = setup();
        let (alice, bob) = funded_pair(&ledger);
        ledger.transfer(&alice, &bob, 10).unwrap();

        assert_eq!(ledger.balance_of(&alice).unwrap(), ledger.balance_of(&alice).unwrap());
        assert_eq!(ledger.kyc_status_of(&bob).unwrap(), ledger.kyc_status_of(&bob).unwrap());
        assert_eq!(
            ledger.auditor().get_account_statement(&bob).unwrap(),
            ledger.auditor().get_account_statement(&bob).unwrap()
        );
    }

    #[test]
    fn statement_has_one_record_per_stored_version() {
        let ledger = setup();
        let (alice, bob) = funded_pair(&ledger);
        let carol = ledger
            .register_account(&org1(), Some("bankA"), profile("carol"))
            .unwrap()
            .account_id;

        let first = ledger.transfer(&alice, &bob, 30).unwrap();
        let second = ledger.transfer(&alice, &carol, 20).unwrap();
        ledger.transfer(&bob, &alice, 5).unwrap();

        let statement = ledger.auditor().get_account_statement(&alice).unwrap();
        assert_eq!(statement.len(), history_len(ledger.store(), alice.as_str()));
        assert_eq!(statement.len(), 5);

        let partners: Vec<&str> = statement
            .iter()
            .map(|r| r.trade_partner.as_ref().unwrap().as_str())
            .collect();
        assert_eq!(partners, vec!["bankA", "bankA", "bob@bankB", "carol@bankA", "bob@bankB"]);
        assert_eq!(statement[2].transaction_id.as_ref(), Some(&first));
        assert_eq!(statement[3].transaction_id.as_ref(), Some(&second));
        assert_eq!(statement[3].trade_amount, 20);
        assert_eq!(statement[4].balance, 55);
        assert!(statement.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

        for record in &statement {
            let tx_id = record.transaction_id.as_ref().unwrap();
            assert!(ledger.transaction(tx_id).is_ok());
        }
    }

    #[test]
    fn statement_is_restartable() {
        let ledger = setup();
        let (alice, bob) = funded_pair(&ledger);
        let auditor = ledger.auditor();

        let mut partial = auditor.statement(&alice).unwrap();
        partial.next();
        ledger.transfer(&alice, &bob, 1).unwrap();

        assert_eq!(auditor.statement(&alice).unwrap().count(), 3);
    }

    #[test]
    fn private_details_are_isolated_per_organization() {
        let ledger = setup();
        ledger.register_account(&org1(), Some("bankA"), profile("alice")).unwrap();
        let alice = id("alice@bankA");

        let details = ledger.read_user_details(&org1(), &alice).unwrap();
        assert_eq!(details.name, "alice");
        assert_eq!(details.registered_by, "teller-1");

        assert!(matches!(
            ledger.read_user_details(&org2(), &alice),
            Err(LedgerError::NotFound(_))
        ));
        assert!(matches!(
            ledger.read_user_from_collection(&org2(), "DreamLandUserCollection", &alice),
            Err(LedgerError::Forbidden(_))
        ));
        assert_eq!(
            ledger.store().get_private("ToyLandUserCollection", alice.as_str()).unwrap(),
            None
        );
        assert_eq!(
            ledger
                .read_user_from_collection(&org1(), "DreamLandUserCollection", &alice)
                .unwrap(),
            details
        );

        // Private data never reaches the shared key space.
        let leaked = ledger
            .store()
            .query(&Selector::new().field("docType", "UserPrivateDetails"))
            .unwrap();
        assert!(leaked.is_empty());
    }

    #[test]
    fn aborted_commit_leaves_no_partial_writes() {
        let ledger = setup();
        let (alice, bob) = funded_pair(&ledger);
        let alice_versions = history_len(ledger.store(), alice.as_str());
        let bob_versions = history_len(ledger.store(), bob.as_str());
        let live = ledger.store().live_keys().unwrap();

        ledger.store().fail_next_commit();
        let err = ledger.transfer(&alice, &bob, 40).unwrap_err();
        assert!(matches!(err, LedgerError::TransactionAborted(_)));

        assert_eq!(ledger.balance_of(&alice).unwrap(), 100);
        assert_eq!(ledger.balance_of(&bob).unwrap(), 0);
        assert_eq!(history_len(ledger.store(), alice.as_str()), alice_versions);
        assert_eq!(history_len(ledger.store(), bob.as_str()), bob_versions);
        assert_eq!(ledger.store().live_keys().unwrap(), live);

        ledger.store().fail_next_commit();
        let err = ledger
            .register_account(&org1(), Some("bankA"), profile("erin"))
            .unwrap_err();
        assert!(matches!(err, LedgerError::TransactionAborted(_)));
        assert!(matches!(
            ledger.read_user_details(&org1(), &id("erin@bankA")),
            Err(LedgerError::NotFound(_))
        ));

        // The same request succeeds once the store recovers.
        ledger.transfer(&alice, &bob, 40).unwrap();
        assert_eq!(ledger.balance_of(&bob).unwrap(), 40);
    }

    /// Store wrapper that lets a competing writer land between a ledger's reads
    /// and its commit.
    struct RacingStore {
        inner: InMemoryVersionedStore,
        race_on: String,
        armed: AtomicBool,
    }

    impl VersionedStore for RacingStore {
        fn get(&self, key: &str) -> Result<Versioned, StoreError> {
            self.inner.get(key)
        }

        fn get_private(&self, collection: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
            self.inner.get_private(collection, key)
        }

        fn history_of(&self, key: &str) -> Result<HistoryIter, StoreError> {
            self.inner.history_of(key)
        }

        fn query(&self, selector: &Selector) -> Result<Vec<QueryRecord>, StoreError> {
            self.inner.query(selector)
        }

        fn new_unique_id(&self) -> TransactionId {
            self.inner.new_unique_id()
        }

        fn commit(&self, batch: WriteBatch) -> Result<CommitReceipt, StoreError> {
            if self.armed.swap(false, Ordering::SeqCst) {
                let current = self.inner.get(&self.race_on)?;
                if let Some(value) = current.value {
                    self.inner.put(&self.race_on, value)?;
                }
            }
            self.inner.commit(batch)
        }
    }

    #[test]
    fn losing_an_optimistic_race_is_a_conflict() {
        let ledger = AccountLedger::new(
            RacingStore {
                inner: InMemoryVersionedStore::new(),
                race_on: "bob@bankB".to_string(),
                armed: AtomicBool::new(false),
            },
            LedgerConfig::default(),
        )
        .unwrap();
        let alice = ledger.register_account(&org1(), Some("bankA"), profile("alice")).unwrap();
        let bob = ledger.register_account(&org2(), Some("bankB"), profile("bob")).unwrap();
        ledger.approve_kyc(&alice.account_id).unwrap();

        ledger.store().armed.store(true, Ordering::SeqCst);
        let err = ledger.transfer(&alice.account_id, &bob.account_id, 10).unwrap_err();
        assert!(matches!(err, LedgerError::Conflict(_)));

        assert_eq!(ledger.balance_of(&alice.account_id).unwrap(), 100);
        assert_eq!(ledger.balance_of(&bob.account_id).unwrap(), 0);
    }

    #[test]
    fn concurrent_transfers_conserve_total() {
        let ledger = Arc::new(AccountLedger::new(
            Arc::new(InMemoryVersionedStore::new()),
            LedgerConfig::default(),
        )
        .unwrap());
        let names = ["a", "b", "c", "d"];
        let ids: Vec<AccountId> = names
            .iter()
            .map(|name| {
                let account = ledger.register_account(&org1(), Some("bankA"), profile(name)).unwrap();
                ledger.approve_kyc(&account.account_id).unwrap();
                account.account_id
            })
            .collect();

        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let ledger = Arc::clone(&ledger);
                let ids = ids.clone();
                std::thread::spawn(move || {
                    let mut outcomes = Vec::new();
                    for round in 0..50 {
                        let from = &ids[(worker + round) % ids.len()];
                        let to = &ids[(worker + round + 1) % ids.len()];
                        outcomes.push(ledger.transfer(from, to, 1 + (round as i64 % 7)));
                    }
                    outcomes
                })
            })
            .collect();

        let mut committed = 0;
        for handle in handles {
            for outcome in handle.join().unwrap() {
                match outcome {
                    Ok(_) => committed += 1,
                    Err(LedgerError::Conflict(_)) | Err(LedgerError::InsufficientFunds { .. }) => {}
                    Err(other) => panic!("unexpected transfer error: {other:?}"),
                }
            }
        }
        assert!(committed > 0);

        let total: i64 = ids.iter().map(|id| ledger.balance_of(id).unwrap()).sum();
        assert_eq!(total, 400);
        assert!(ids.iter().all(|id| ledger.balance_of(id).unwrap() >= 0));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// Property: through the store-backed ledger, every transfer either
        /// commits with conservation or leaves both balances untouched.
        #[test]
        fn ledger_transfers_conserve_and_stay_non_negative(
            moves in prop::collection::vec((0usize..3, 0usize..3, -20i64..150), 1..30)
        ) {
            let ledger = setup();
            let ids: Vec<AccountId> = ["x", "y", "z"]
                .iter()
                .map(|name| {
                    let account = ledger.register_account(&org1(), Some("bankA"), profile(name)).unwrap();
                    ledger.approve_kyc(&account.account_id).unwrap();
                    account.account_id
                })
                .collect();

            for (from, to, amount) in moves {
                let before: Vec<i64> = ids.iter().map(|id| ledger.balance_of(id).unwrap()).collect();
                let result = ledger.transfer(&ids[from], &ids[to], amount);
                let after: Vec<i64> = ids.iter().map(|id| ledger.balance_of(id).unwrap()).collect();

                match result {
                    Ok(_) => {
                        prop_assert!(amount > 0 && from != to);
                        prop_assert_eq!(after[from], before[from] - amount);
                        prop_assert_eq!(after[to], before[to] + amount);
                    }
                    Err(_) => {
                        prop_assert_eq!(&after, &before);
                    }
                }
                prop_assert!(after.iter().all(|b| *b >= 0));
                prop_assert_eq!(after.iter().sum::<i64>(), 300);
            }
        }
    }
}
