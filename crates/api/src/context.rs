use payledger_auth::{IdentityProvider, Role};

/// Caller identity for a request, as asserted by the fronting gateway.
///
/// This is immutable and must be present for all ledger routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    caller_id: String,
    organization: String,
    roles: Vec<Role>,
}

impl CallerContext {
    pub fn new(caller_id: impl Into<String>, organization: impl Into<String>, roles: Vec<Role>) -> Self {
        Self {
            caller_id: caller_id.into(),
            organization: organization.into(),
            roles,
        }
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }
}

impl IdentityProvider for CallerContext {
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
