use chrono::{DateTime, Utc};
use thiserror::Error;

use payledger_core::{ExpectedVersion, TransactionId};

use super::selector::Selector;
use std::sync::Arc;

/// Current value of a key plus the version it was read at.
///
/// `value` is `None` when the key was never written or its latest modification
/// is a delete; `version` still counts every recorded modification.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Versioned {
    pub value: Option<Vec<u8>>,
    pub version: u64,
}

/// One entry of a key's version history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyModification {
    /// Transaction under which this version was written.
    pub transaction_id: TransactionId,
    pub timestamp: DateTime<Utc>,
    /// Stored bytes; `None` for deletes.
    pub value: Option<Vec<u8>>,
    pub is_delete: bool,
}

/// Oldest-first history of a key. Finite; call `history_of` again to restart.
pub type HistoryIter = Box<dyn Iterator<Item = Result<KeyModification, StoreError>> + Send>;

/// A world-state entry returned by a predicate query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRecord {
    pub key: String,
    pub value: Vec<u8>,
}

/// A single staged write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    Put {
        key: String,
        value: Vec<u8>,
        expected: ExpectedVersion,
    },
    Delete {
        key: String,
        expected: ExpectedVersion,
    },
    /// Write into a private collection (not versioned, not queryable).
    PutPrivate {
        collection: String,
        key: String,
        value: Vec<u8>,
    },
}

impl WriteOp {
    /// Namespaced key used to detect duplicate writes within one batch.
    pub(crate) fn target(&self) -> (Option<&str>, &str) {
        match self {
            WriteOp::Put { key, .. } | WriteOp::Delete { key, .. } => (None, key),
            WriteOp::PutPrivate { collection, key, .. } => (Some(collection), key),
        }
    }
}

/// The unit of atomicity: every op is applied, or none is.
///
/// All writes are recorded in key history under the batch's transaction ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteBatch {
    transaction_id: TransactionId,
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new(transaction_id: TransactionId) -> Self {
        Self {
            transaction_id,
            ops: Vec::new(),
        }
    }

    pub fn put(mut self, key: impl Into<String>, value: Vec<u8>, expected: ExpectedVersion) -> Self {
        self.ops.push(WriteOp::Put {
            key: key.into(),
            value,
            expected,
        });
        self
    }

    pub fn delete(mut self, key: impl Into<String>, expected: ExpectedVersion) -> Self {
        self.ops.push(WriteOp::Delete {
            key: key.into(),
            expected,
        });
        self
    }

    pub fn put_private(
        mut self,
        collection: impl Into<String>,
        key: impl Into<String>,
        value: Vec<u8>,
    ) -> Self {
        self.ops.push(WriteOp::PutPrivate {
            collection: collection.into(),
            key: key.into(),
            value,
        });
        self
    }

    pub fn into_parts(self) -> (TransactionId, Vec<WriteOp>) {
        (self.transaction_id, self.ops)
    }
}

/// Result of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    pub transaction_id: TransactionId,
    pub timestamp: DateTime<Utc>,
    pub writes: usize,
}

/// Versioned store operation error.
///
/// These are **collaborator errors** (storage, concurrency) as opposed to
/// domain errors (validation, invariants).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("version conflict on '{key}': expected {expected:?}, found {actual}")]
    Conflict {
        key: String,
        expected: ExpectedVersion,
        actual: u64,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("commit failed: {0}")]
    CommitFailed(String),

    #[error("invalid write batch: {0}")]
    InvalidBatch(String),
}

/// Key-value store where every write creates a new version.
///
/// ## Contract
///
/// - `get` returns the world-state value and the key's current version.
/// - `history_of` yields every modification of a key, deletes included, oldest
///   first. Each call re-reads from scratch.
/// - `query` selects world-state documents by field equality; ordering is
///   store-defined.
/// - `commit` applies a `WriteBatch` atomically. Every `ExpectedVersion` is
///   checked before anything is written; a mismatch fails the whole batch with
///   `StoreError::Conflict`.
/// - `new_unique_id` never returns the same ID twice.
///
/// Private collections are a separate namespace: invisible to `get`, `query`
/// and `history_of`.
pub trait VersionedStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Versioned, StoreError>;

    fn get_private(&self, collection: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    fn history_of(&self, key: &str) -> Result<HistoryIter, StoreError>;

    fn query(&self, selector: &Selector) -> Result<Vec<QueryRecord>, StoreError>;

    fn new_unique_id(&self) -> TransactionId;

    fn commit(&self, batch: WriteBatch) -> Result<CommitReceipt, StoreError>;

    /// Blind single-key write under a fresh transaction ID.
    fn put(&self, key: &str, value: Vec<u8>) -> Result<CommitReceipt, StoreError> {
        let batch = WriteBatch::new(self.new_unique_id()).put(key, value, ExpectedVersion::Any);
        self.commit(batch)
    }

    /// Blind single-key delete under a fresh transaction ID.
    fn delete(&self, key: &str) -> Result<CommitReceipt, StoreError> {
        let batch = WriteBatch::new(self.new_unique_id()).delete(key, ExpectedVersion::Any);
        self.commit(batch)
    }
}

macro_rules! forward_versioned_store {
    ($($ptr:ty),*) => {$(
        impl<S> VersionedStore for $ptr
        where
            S: VersionedStore + ?Sized,
        {
            fn get(&self, key: &str) -> Result<Versioned, StoreError> {
                (**self).get(key)
            }

            fn get_private(&self, collection: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
                (**self).get_private(collection, key)
            }

            fn history_of(&self, key: &str) -> Result<HistoryIter, StoreError> {
                (**self).history_of(key)
            }

            fn query(&self, selector: &Selector) -> Result<Vec<QueryRecord>, StoreError> {
                (**self).query(selector)
            }

            fn new_unique_id(&self) -> TransactionId {
                (**self).new_unique_id()
            }

            fn commit(&self, batch: WriteBatch) -> Result<CommitReceipt, StoreError> {
                (**self).commit(batch)
            }
        }
    )*};
}

forward_versioned_store!(Arc<S>, &S);
