//! Scoped read/write transaction over a `VersionedStore`.

use std::collections::{BTreeMap, HashMap};

use payledger_core::{ExpectedVersion, TransactionId};

use super::r#trait::{CommitReceipt, StoreError, VersionedStore, WriteBatch};

/// Read-your-writes transaction that commits as one `WriteBatch`.
///
/// Every key read records the version it was observed at; staged writes are
/// committed with those versions as their expectations, so a concurrent
/// writer that got there first turns the commit into `StoreError::Conflict`.
///
/// Dropping the transaction without calling `commit` discards every staged
/// write: nothing reaches the store until the single atomic commit.
pub struct StoreTransaction<'s, S: VersionedStore + ?Sized> {
    store: &'s S,
    transaction_id: TransactionId,
    observed: HashMap<String, u64>,
    staged: BTreeMap<String, Option<Vec<u8>>>,
    staged_private: BTreeMap<(String, String), Vec<u8>>,
    finished: bool,
}

impl<'s, S: VersionedStore + ?Sized> StoreTransaction<'s, S> {
    pub fn begin(store: &'s S) -> Self {
        Self {
            transaction_id: store.new_unique_id(),
            store,
            observed: HashMap::new(),
            staged: BTreeMap::new(),
            staged_private: BTreeMap::new(),
            finished: false,
        }
    }

    /// ID every write of this transaction is recorded under.
    pub fn transaction_id(&self) -> &TransactionId {
        &self.transaction_id
    }

    pub fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        if let Some(staged) = self.staged.get(key) {
            return Ok(staged.clone());
        }

        let current = self.store.get(key)?;
        self.observed.entry(key.to_string()).or_insert(current.version);
        Ok(current.value)
    }

    /// Number of recorded modifications of `key`, as first observed by this
    /// transaction. The commit expects the key to still be at this version.
    pub fn version(&mut self, key: &str) -> Result<u64, StoreError> {
        if let Some(version) = self.observed.get(key) {
            return Ok(*version);
        }
        let current = self.store.get(key)?;
        self.observed.insert(key.to_string(), current.version);
        Ok(current.version)
    }

    pub fn get_private(&mut self, collection: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        if let Some(staged) = self
            .staged_private
            .get(&(collection.to_string(), key.to_string()))
        {
            return Ok(Some(staged.clone()));
        }
        self.store.get_private(collection, key)
    }

    pub fn put(&mut self, key: &str, value: Vec<u8>) {
        self.staged.insert(key.to_string(), Some(value));
    }

    pub fn delete(&mut self, key: &str) {
        self.staged.insert(key.to_string(), None);
    }

    pub fn put_private(&mut self, collection: &str, key: &str, value: Vec<u8>) {
        self.staged_private
            .insert((collection.to_string(), key.to_string()), value);
    }

    pub fn staged_writes(&self) -> usize {
        self.staged.len() + self.staged_private.len()
    }

    /// Apply every staged write atomically.
    pub fn commit(mut self) -> Result<CommitReceipt, StoreError> {
        self.finished = true;

        let mut batch = WriteBatch::new(self.transaction_id.clone());
        for (key, value) in std::mem::take(&mut self.staged) {
            let expected = self
                .observed
                .get(&key)
                .map(|v| ExpectedVersion::Exact(*v))
                .unwrap_or(ExpectedVersion::Any);
            batch = match value {
                Some(value) => batch.put(key, value, expected),
                None => batch.delete(key, expected),
            };
        }
        for ((collection, key), value) in std::mem::take(&mut self.staged_private) {
            batch = batch.put_private(collection, key, value);
        }

        self.store.commit(batch)
    }
}

impl<S: VersionedStore + ?Sized> Drop for StoreTransaction<'_, S> {
    fn drop(&mut self) {
        if !self.finished && self.staged_writes() > 0 {
            tracing::debug!(
                transaction_id = %self.transaction_id,
                discarded = self.staged_writes(),
                "store transaction rolled back"
            );
        }
    }
}
