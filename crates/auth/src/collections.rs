//! Organization → private collection routing.
//!
//! Personal data lives in per-organization partitions that other organizations
//! cannot read. The mapping is configured at startup; an organization with no
//! entry is rejected unless a fallback collection has been configured.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{AuthzError, IdentityProvider};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CollectionConfig {
    /// Organization identifier → collection name.
    pub organizations: BTreeMap<String, String>,
    /// Collection for organizations without an entry. `None` fails closed.
    pub fallback: Option<String>,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        let organizations = [
            ("Org1MSP", "DreamLandUserCollection"),
            ("Org2MSP", "ToyLandUserCollection"),
        ]
        .into_iter()
        .map(|(org, collection)| (org.to_string(), collection.to_string()))
        .collect();

        Self {
            organizations,
            fallback: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionResolver {
    organizations: BTreeMap<String, String>,
    fallback: Option<String>,
}

impl Default for CollectionResolver {
    fn default() -> Self {
        Self::new(CollectionConfig::default())
    }
}

impl CollectionResolver {
    pub fn new(config: CollectionConfig) -> Self {
        Self {
            organizations: config.organizations,
            fallback: config.fallback,
        }
    }

    /// Private collection for `organization`.
    pub fn resolve(&self, organization: &str) -> Result<&str, AuthzError> {
        if let Some(collection) = self.organizations.get(organization) {
            return Ok(collection.as_str());
        }

        match &self.fallback {
            Some(fallback) => {
                tracing::warn!(
                    organization,
                    collection = %fallback,
                    "organization has no collection mapping, using fallback"
                );
                Ok(fallback.as_str())
            }
            None => Err(AuthzError::UnknownOrganization(organization.to_string())),
        }
    }

    /// Private collection of the calling organization.
    pub fn resolve_caller<I>(&self, identity: &I) -> Result<&str, AuthzError>
    where
        I: IdentityProvider + ?Sized,
    {
        self.resolve(identity.caller_organization())
    }

    /// Whether `organization` may read `collection`.
    pub fn is_member(&self, organization: &str, collection: &str) -> bool {
        match self.organizations.get(organization) {
            Some(mapped) => mapped == collection,
            None => self.fallback.as_deref() == Some(collection),
        }
    }

    /// Every collection name this resolver can route to.
    pub fn collections(&self) -> impl Iterator<Item = &str> {
        let mut names: Vec<&str> = self
            .organizations
            .values()
            .map(String::as_str)
            .chain(self.fallback.as_deref())
            .collect();
        names.sort_unstable();
        names.dedup();
        names.into_iter()
    }
}
