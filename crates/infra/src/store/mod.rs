//! Versioned key-value store boundary.
//!
//! This module defines the contract the ledger needs from its storage
//! collaborator (point reads, atomic batched writes, per-key version history,
//! predicate queries, private collections) without making storage assumptions.

pub mod in_memory;
pub mod selector;
pub mod transaction;
pub mod r#trait;

pub use in_memory::InMemoryVersionedStore;
pub use selector::Selector;
pub use transaction::StoreTransaction;
pub use r#trait::{
    CommitReceipt, HistoryIter, KeyModification, QueryRecord, StoreError, Versioned,
    VersionedStore, WriteBatch, WriteOp,
};
