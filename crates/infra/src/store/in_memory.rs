use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use serde_json::Value as JsonValue;

use payledger_core::TransactionId;

use super::r#trait::{
    CommitReceipt, HistoryIter, KeyModification, QueryRecord, StoreError, Versioned, VersionedStore,
    WriteBatch, WriteOp,
};
use super::selector::Selector;

#[derive(Debug, Default)]
struct State {
    world: BTreeMap<String, Vec<u8>>,
    history: HashMap<String, Vec<KeyModification>>,
    private: HashMap<String, BTreeMap<String, Vec<u8>>>,
}

impl State {
    fn version(&self, key: &str) -> u64 {
        self.history.get(key).map(|h| h.len() as u64).unwrap_or(0)
    }
}

/// In-memory versioned store with full key history.
///
/// Intended for tests/dev. Not optimized for performance: every commit takes a
/// single write lock, which also serializes concurrent batches.
#[derive(Debug, Default)]
pub struct InMemoryVersionedStore {
    state: RwLock<State>,
    fail_next_commit: AtomicBool,
}

impl InMemoryVersionedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `commit` fail after validation, before anything is applied.
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    /// Number of keys with a current (non-deleted) value.
    pub fn live_keys(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.world.len())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn validate(state: &State, ops: &[WriteOp]) -> Result<(), StoreError> {
        let mut seen = HashSet::new();
        for op in ops {
            if !seen.insert(op.target()) {
                let (_, key) = op.target();
                return Err(StoreError::InvalidBatch(format!(
                    "key '{key}' written twice in one batch"
                )));
            }

            match op {
                WriteOp::Put { key, expected, .. } | WriteOp::Delete { key, expected } => {
                    let actual = state.version(key);
                    if !expected.matches(actual) {
                        return Err(StoreError::Conflict {
                            key: key.clone(),
                            expected: *expected,
                            actual,
                        });
                    }
                }
                WriteOp::PutPrivate { .. } => {}
            }
        }
        Ok(())
    }
}

impl VersionedStore for InMemoryVersionedStore {
    fn get(&self, key: &str) -> Result<Versioned, StoreError> {
        let state = self.read()?;
        Ok(Versioned {
            value: state.world.get(key).cloned(),
            version: state.version(key),
        })
    }

    fn get_private(&self, collection: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let state = self.read()?;
        Ok(state
            .private
            .get(collection)
            .and_then(|c| c.get(key))
            .cloned())
    }

    fn history_of(&self, key: &str) -> Result<HistoryIter, StoreError> {
        let snapshot = self.read()?.history.get(key).cloned().unwrap_or_default();
        Ok(Box::new(snapshot.into_iter().map(Ok)))
    }

    fn query(&self, selector: &Selector) -> Result<Vec<QueryRecord>, StoreError> {
        let state = self.read()?;
        let records = state
            .world
            .iter()
            .filter(|(_, value)| {
                serde_json::from_slice::<JsonValue>(value)
                    .map(|doc| selector.matches(&doc))
                    .unwrap_or(false)
            })
            .map(|(key, value)| QueryRecord {
                key: key.clone(),
                value: value.clone(),
            })
            .collect();
        Ok(records)
    }

    fn new_unique_id(&self) -> TransactionId {
        TransactionId::generate()
    }

    fn commit(&self, batch: WriteBatch) -> Result<CommitReceipt, StoreError> {
        let (transaction_id, ops) = batch.into_parts();

        let mut state = self
            .state
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;

        // Validate everything up front so a failure leaves no partial writes.
        Self::validate(&state, &ops)?;

        if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(StoreError::CommitFailed("injected commit failure".to_string()));
        }

        let timestamp = Utc::now();
        let writes = ops.len();
        for op in ops {
            match op {
                WriteOp::Put { key, value, .. } => {
                    state.history.entry(key.clone()).or_default().push(KeyModification {
                        transaction_id: transaction_id.clone(),
                        timestamp,
                        value: Some(value.clone()),
                        is_delete: false,
                    });
                    state.world.insert(key, value);
                }
                WriteOp::Delete { key, .. } => {
                    state.history.entry(key.clone()).or_default().push(KeyModification {
                        transaction_id: transaction_id.clone(),
                        timestamp,
                        value: None,
                        is_delete: true,
                    });
                    state.world.remove(&key);
                }
                WriteOp::PutPrivate {
                    collection,
                    key,
                    value,
                } => {
                    state.private.entry(collection).or_default().insert(key, value);
                }
            }
        }

        Ok(CommitReceipt {
            transaction_id,
            timestamp,
            writes,
        })
    }
}
