//! LedgerEntry codec: the byte representation of every stored document.
//!
//! Documents are JSON objects carrying a `docType` discriminator (so a single
//! field predicate can select one kind) and a `schemaVersion` tag. Field names
//! are part of the persisted format and must not change within a version.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::account::Account;
use crate::transaction::Transaction;
use crate::user::UserPrivateDetails;

/// Current persisted schema version. Documents without a tag are version 1.
pub const SCHEMA_VERSION: u64 = 1;

/// Field carrying the document discriminator.
pub const DOC_TYPE_FIELD: &str = "docType";

const SCHEMA_VERSION_FIELD: &str = "schemaVersion";

/// Document discriminator values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocKind {
    Account,
    Transaction,
    UserPrivateDetails,
}

impl DocKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocKind::Account => "Account",
            DocKind::Transaction => "Transaction",
            DocKind::UserPrivateDetails => "UserPrivateDetails",
        }
    }
}

impl core::fmt::Display for DocKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any document the ledger persists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "docType")]
pub enum Document {
    Account(Account),
    Transaction(Transaction),
    UserPrivateDetails(UserPrivateDetails),
}

impl Document {
    pub fn kind(&self) -> DocKind {
        match self {
            Document::Account(_) => DocKind::Account,
            Document::Transaction(_) => DocKind::Transaction,
            Document::UserPrivateDetails(_) => DocKind::UserPrivateDetails,
        }
    }
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("encoding failed: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("decoding failed: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("stored document is not a JSON object")]
    NotAnObject,

    #[error("unsupported schema version {0}")]
    UnsupportedVersion(u64),

    #[error("expected a {expected} document, found {found}")]
    UnexpectedKind { expected: DocKind, found: DocKind },
}

/// Encode a document to its stored byte form.
pub fn encode(document: &Document) -> Result<Vec<u8>, CodecError> {
    let mut value = serde_json::to_value(document).map_err(CodecError::Encode)?;
    match value.as_object_mut() {
        Some(map) => {
            map.insert(SCHEMA_VERSION_FIELD.to_string(), JsonValue::from(SCHEMA_VERSION));
        }
        None => return Err(CodecError::NotAnObject),
    }
    serde_json::to_vec(&value).map_err(CodecError::Encode)
}

/// Decode stored bytes into a document of any kind.
pub fn decode(bytes: &[u8]) -> Result<Document, CodecError> {
    let mut value: JsonValue = serde_json::from_slice(bytes).map_err(CodecError::Decode)?;
    let map = value.as_object_mut().ok_or(CodecError::NotAnObject)?;

    let version = match map.remove(SCHEMA_VERSION_FIELD) {
        None => 1,
        Some(v) => v.as_u64().ok_or(CodecError::UnsupportedVersion(0))?,
    };
    if version == 0 || version > SCHEMA_VERSION {
        return Err(CodecError::UnsupportedVersion(version));
    }

    serde_json::from_value(value).map_err(CodecError::Decode)
}

pub fn decode_account(bytes: &[u8]) -> Result<Account, CodecError> {
    match decode(bytes)? {
        Document::Account(a) => Ok(a),
        other => Err(unexpected(DocKind::Account, &other)),
    }
}

pub fn decode_transaction(bytes: &[u8]) -> Result<Transaction, CodecError> {
    match decode(bytes)? {
        Document::Transaction(t) => Ok(t),
        other => Err(unexpected(DocKind::Transaction, &other)),
    }
}

pub fn decode_user(bytes: &[u8]) -> Result<UserPrivateDetails, CodecError> {
    match decode(bytes)? {
        Document::UserPrivateDetails(u) => Ok(u),
        other => Err(unexpected(DocKind::UserPrivateDetails, &other)),
    }
}

fn unexpected(expected: DocKind, found: &Document) -> CodecError {
    CodecError::UnexpectedKind {
        expected,
        found: found.kind(),
    }
}

impl Account {
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        encode(&Document::Account(self.clone()))
    }
}

impl Transaction {
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        encode(&Document::Transaction(self.clone()))
    }
}

impl UserPrivateDetails {
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        encode(&Document::UserPrivateDetails(self.clone()))
    }
}
