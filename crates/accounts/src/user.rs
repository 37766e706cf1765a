use serde::{Deserialize, Serialize};

use payledger_core::{AccountId, DomainError, DomainResult};

/// Personal details supplied at registration.
///
/// These never enter the shared key space; they are written to the caller's
/// private collection only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub address: String,
    pub sex: String,
}

impl UserProfile {
    pub fn validate(&self) -> DomainResult<()> {
        for (field, value) in [
            ("name", &self.name),
            ("address", &self.address),
            ("sex", &self.sex),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::validation(format!(
                    "{field} field must be a non-empty string"
                )));
            }
        }
        Ok(())
    }
}

/// Private record stored under the same ID as the holder's account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPrivateDetails {
    #[serde(rename = "userID")]
    pub user_id: AccountId,
    pub name: String,
    pub address: String,
    pub sex: String,
    /// Caller identity that performed the registration.
    #[serde(rename = "registeredBy")]
    pub registered_by: String,
}

impl UserPrivateDetails {
    pub fn from_profile(user_id: AccountId, profile: UserProfile, registered_by: impl Into<String>) -> Self {
        Self {
            user_id,
            name: profile.name,
            address: profile.address,
            sex: profile.sex,
            registered_by: registered_by.into(),
        }
    }
}
