use std::fmt;

/// Separator used when a key is rendered as a single string.
pub const KEY_SEPARATOR: &str = "##";

/// Tenant-scoped identity key.
///
/// Hashing and equality use both fields, so identities containing
/// [`KEY_SEPARATOR`] cannot collide with a different tenant/identity pairing.
/// Only the rendered form (`tenant##identity`) is ambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistryKey {
    tenant_id: String,
    identity: String,
}

impl RegistryKey {
    pub fn new(tenant_id: impl Into<String>, identity: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            identity: identity.into(),
        }
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }
}

impl fmt::Display for RegistryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{KEY_SEPARATOR}{}", self.tenant_id, self.identity)
    }
}
