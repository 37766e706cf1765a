//! Accounts module (balances, immutable transaction log, private user records).
//!
//! Pure domain logic only: no IO, no HTTP, no persistence concerns. Every
//! state change is expressed as a decision function that returns the new
//! documents to write; the infra layer decides how they reach the store.

pub mod account;
pub mod codec;
pub mod policy;
pub mod transaction;
pub mod user;

pub use account::{Account, KycApproval, Registration, TransferOutcome, transfer};
pub use codec::{CodecError, DOC_TYPE_FIELD, DocKind, Document, SCHEMA_VERSION};
pub use policy::LedgerPolicy;
pub use transaction::{Transaction, TransactionKind};
pub use user::{UserPrivateDetails, UserProfile};
