//! Caller identity boundary.

use crate::Role;

/// Who is invoking a ledger operation.
///
/// Implementations wrap the platform's identity source (client certificates,
/// verified tokens, gateway headers). The ledger only ever asks these three
/// questions.
pub trait IdentityProvider {
    /// Stable identifier of the caller.
    fn caller_id(&self) -> &str;

    /// Organization (membership service) the caller belongs to.
    fn caller_organization(&self) -> &str;

    /// Whether the caller holds `role`.
    fn caller_has_role(&self, role: &str) -> bool;
}

impl<T: IdentityProvider + ?Sized> IdentityProvider for &T {
    fn caller_id(&self) -> &str {
        (**self).caller_id()
    }

    fn caller_organization(&self) -> &str {
        (**self).caller_organization()
    }

    fn caller_has_role(&self, role: &str) -> bool {
        (**self).caller_has_role(role)
    }
}

/// Fixed identity, used by tests and by transports that resolve the caller up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticIdentity {
    caller_id: String,
    organization: String,
    roles: Vec<Role>,
}

impl StaticIdentity {
    pub fn new(caller_id: impl Into<String>, organization: impl Into<String>) -> Self {
        Self {
            caller_id: caller_id.into(),
            organization: organization.into(),
            roles: Vec::new(),
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        if !self.roles.contains(&role) {
            self.roles.push(role);
        }
        self
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }
}

impl IdentityProvider for StaticIdentity {
    fn caller_id(&self) -> &str {
        &self.caller_id
    }

    fn caller_organization(&self) -> &str {
        &self.organization
    }

    fn caller_has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.as_str() == role)
    }
}
