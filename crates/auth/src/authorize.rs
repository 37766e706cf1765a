use thiserror::Error;

use crate::{IdentityProvider, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("organization '{0}' has no private collection")]
    UnknownOrganization(String),
}

/// Require the caller to hold `role`.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn require_role<I>(identity: &I, role: &Role) -> Result<(), AuthzError>
where
    I: IdentityProvider + ?Sized,
{
    if identity.caller_has_role(role.as_str()) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(format!(
            "caller '{}' lacks role '{}'",
            identity.caller_id(),
            role
        )))
    }
}
