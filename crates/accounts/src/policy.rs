use serde::{Deserialize, Serialize};

use payledger_core::{DomainError, DomainResult};

/// Balance policy applied by registration and KYC approval.
///
/// Passed to the ledger at construction; there is no process-wide state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LedgerPolicy {
    /// Balance granted to a freshly registered account.
    pub default_balance: i64,
    /// Floor a KYC approval raises the balance to.
    pub kyc_balance: i64,
}

impl Default for LedgerPolicy {
    fn default() -> Self {
        Self {
            default_balance: 0,
            kyc_balance: 100,
        }
    }
}

impl LedgerPolicy {
    pub fn new(default_balance: i64, kyc_balance: i64) -> DomainResult<Self> {
        let policy = Self {
            default_balance,
            kyc_balance,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.default_balance < 0 {
            return Err(DomainError::validation("default balance must not be negative"));
        }
        if self.kyc_balance < 0 {
            return Err(DomainError::validation("kyc balance must not be negative"));
        }
        Ok(())
    }
}
