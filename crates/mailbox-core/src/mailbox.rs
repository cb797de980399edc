use crate::action::{DelayedAction, NewAction};
use crate::error::Result;
use crate::registry::{snapshot_of, Registry, RegistrySnapshot, Scope};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Identities
// ---------------------------------------------------------------------------

/// The user and/or device a request is about. Blank strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identities {
    user: Option<String>,
    device: Option<String>,
}

impl Identities {
    pub fn new(user: Option<String>, device: Option<String>) -> Self {
        Self {
            user: user.filter(|s| !s.trim().is_empty()),
            device: device.filter(|s| !s.trim().is_empty()),
        }
    }

    pub fn user(id: impl Into<String>) -> Self {
        Self::new(Some(id.into()), None)
    }

    pub fn device(id: impl Into<String>) -> Self {
        Self::new(None, Some(id.into()))
    }

    pub fn both(user: impl Into<String>, device: impl Into<String>) -> Self {
        Self::new(Some(user.into()), Some(device.into()))
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn device_id(&self) -> Option<&str> {
        self.device.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.user.is_none() && self.device.is_none()
    }
}

// ---------------------------------------------------------------------------
// Registration / ListFilter / MailboxSnapshot
// ---------------------------------------------------------------------------

/// Result of a register call. `created` is 0 when no identity was supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub created: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
}

impl Registration {
    fn none() -> Self {
        Self {
            created: 0,
            id: None,
            scope: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListFilter {
    User,
    Device,
    #[default]
    Both,
}

impl FromStr for ListFilter {
    type Err = std::convert::Infallible;

    /// Anything other than `user` or `device` (case-insensitive) selects both.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "user" => ListFilter::User,
            "device" => ListFilter::Device,
            _ => ListFilter::Both,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailboxSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_actions: Option<RegistrySnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_actions: Option<RegistrySnapshot>,
}

// ---------------------------------------------------------------------------
// Mailbox
// ---------------------------------------------------------------------------

/// The user and device registries, addressed together.
#[derive(Debug)]
pub struct Mailbox {
    users: Registry,
    devices: Registry,
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Mailbox {
    pub fn new() -> Self {
        Self {
            users: Registry::new(Scope::User),
            devices: Registry::new(Scope::Device),
        }
    }

    pub fn users(&self) -> &Registry {
        &self.users
    }

    pub fn devices(&self) -> &Registry {
        &self.devices
    }

    /// Register `action` for the user if one is given, otherwise for the
    /// device. With neither, nothing is created.
    pub fn register(
        &self,
        tenant_id: &str,
        identities: &Identities,
        action: NewAction,
    ) -> Result<Registration> {
        let (registry, identity) = match (identities.user_id(), identities.device_id()) {
            (Some(user), _) => (&self.users, user),
            (None, Some(device)) => (&self.devices, device),
            (None, None) => {
                action.validate()?;
                return Ok(Registration::none());
            }
        };
        let id = registry.register(tenant_id, identity, action)?;
        Ok(Registration {
            created: 1,
            id: Some(id),
            scope: Some(registry.scope()),
        })
    }

    /// User matches first, then device matches.
    pub fn consume_matching(
        &self,
        tenant_id: &str,
        identities: &Identities,
        app_version: &str,
    ) -> Vec<DelayedAction> {
        let mut matched = Vec::new();
        if let Some(user) = identities.user_id() {
            matched.extend(self.users.consume_matching(tenant_id, user, app_version));
        }
        if let Some(device) = identities.device_id() {
            matched.extend(self.devices.consume_matching(tenant_id, device, app_version));
        }
        matched
    }

    /// Snapshot of the selected registries. With [`ListFilter::Both`] both
    /// locks are held together (user first) so the two halves agree.
    pub fn list(&self, filter: ListFilter) -> MailboxSnapshot {
        match filter {
            ListFilter::User => MailboxSnapshot {
                user_actions: Some(self.users.snapshot()),
                device_actions: None,
            },
            ListFilter::Device => MailboxSnapshot {
                user_actions: None,
                device_actions: Some(self.devices.snapshot()),
            },
            ListFilter::Both => {
                let users = self.users.lock();
                let devices = self.devices.lock();
                MailboxSnapshot {
                    user_actions: Some(snapshot_of(&users)),
                    device_actions: Some(snapshot_of(&devices)),
                }
            }
        }
    }
}
