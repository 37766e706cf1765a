use serde::{Deserialize, Serialize};

use payledger_accounts::UserProfile;
use payledger_core::TransactionId;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterAccountRequest {
    pub name: String,
    pub address: String,
    pub sex: String,
    /// Defaults to the caller's organization.
    pub bank: Option<String>,
}

impl RegisterAccountRequest {
    pub fn into_parts(self) -> (Option<String>, UserProfile) {
        let profile = UserProfile {
            name: self.name,
            address: self.address,
            sex: self.sex,
        };
        (self.bank, profile)
    }
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub remitter: String,
    pub beneficiary: String,
    pub amount: i64,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct TransferResponse {
    #[serde(rename = "txID")]
    pub transaction_id: TransactionId,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    #[serde(rename = "accountID")]
    pub account_id: String,
    pub balance: i64,
}

#[derive(Debug, Serialize)]
pub struct KycStatusResponse {
    #[serde(rename = "accountID")]
    pub account_id: String,
    #[serde(rename = "kycStatus")]
    pub kyc_status: bool,
}

/// Wrapper for list responses.
#[derive(Debug, Serialize)]
pub struct Items<T> {
    pub items: Vec<T>,
}
