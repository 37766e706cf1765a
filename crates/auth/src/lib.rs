//! `payledger-auth`: caller identity, role checks, and private-collection routing.
//!
//! This crate is intentionally decoupled from HTTP and storage: identity is
//! resolved by whatever platform fronts the ledger and handed in through the
//! `IdentityProvider` trait.

pub mod authorize;
pub mod collections;
pub mod identity;
pub mod roles;

pub use authorize::{AuthzError, require_role};
pub use collections::{CollectionConfig, CollectionResolver};
pub use identity::{IdentityProvider, StaticIdentity};
pub use roles::Role;
