use crate::action::{normalize_version, DelayedAction, NewAction};
use crate::error::{MailboxError, Result};
use crate::key::RegistryKey;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

pub(crate) type Entries = HashMap<RegistryKey, Vec<DelayedAction>>;

/// Owned copy of a registry, keyed by the rendered `tenant##identity` form.
pub type RegistrySnapshot = BTreeMap<String, Vec<DelayedAction>>;

// ---------------------------------------------------------------------------
// Scope
// ---------------------------------------------------------------------------

/// Which kind of identity a registry is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    User,
    Device,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::User => "user",
            Scope::Device => "device",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Pending actions for one kind of identity, grouped per tenant + identity.
///
/// Every operation takes the registry lock for its whole duration and does
/// no I/O while holding it.
#[derive(Debug)]
pub struct Registry {
    scope: Scope,
    entries: Mutex<Entries>,
}

impl Registry {
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Append an action for `(tenant_id, identity)` and return its id.
    pub fn register(&self, tenant_id: &str, identity: &str, action: NewAction) -> Result<String> {
        if identity.is_empty() {
            return Err(MailboxError::EmptyIdentity);
        }
        let action = action.into_action()?;
        let id = action.id.clone();
        let key = RegistryKey::new(tenant_id, identity);

        let mut entries = self.lock();
        let pending = entries.entry(key).or_default();
        pending.push(action);
        tracing::debug!(
            scope = %self.scope,
            tenant_id,
            identity,
            action_id = %id,
            pending = pending.len(),
            "registered delayed action"
        );
        Ok(id)
    }

    /// Remove and return every action whose version gate is satisfied by
    /// `app_version`.
    ///
    /// A key that was never registered yields an empty result and is not
    /// created. A key whose actions are all consumed keeps an empty sequence.
    pub fn consume_matching(
        &self,
        tenant_id: &str,
        identity: &str,
        app_version: &str,
    ) -> Vec<DelayedAction> {
        let app_version = normalize_version(app_version);
        let key = RegistryKey::new(tenant_id, identity);

        let mut entries = self.lock();
        let Some(pending) = entries.get_mut(&key) else {
            return Vec::new();
        };

        let (matched, retained): (Vec<_>, Vec<_>) = std::mem::take(pending)
            .into_iter()
            .partition(|a| a.is_satisfied_by(&app_version));
        *pending = retained;

        tracing::debug!(
            scope = %self.scope,
            tenant_id,
            identity,
            app_version = %app_version,
            matched = matched.len(),
            remaining = pending.len(),
            "consumed delayed actions"
        );
        matched
    }

    /// Deep copy of the whole registry.
    pub fn snapshot(&self) -> RegistrySnapshot {
        snapshot_of(&self.lock())
    }

    /// Number of actions still pending for `(tenant_id, identity)`.
    pub fn pending_count(&self, tenant_id: &str, identity: &str) -> usize {
        self.lock()
            .get(&RegistryKey::new(tenant_id, identity))
            .map_or(0, Vec::len)
    }

    /// Critical sections never leave the map half-updated, so a poisoned
    /// lock still guards a valid map.
    pub(crate) fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub(crate) fn snapshot_of(entries: &Entries) -> RegistrySnapshot {
    let mut out = RegistrySnapshot::new();
    for (key, actions) in entries {
        // Distinct keys may render identically; merge rather than drop.
        out.entry(key.to_string())
            .or_default()
            .extend(actions.iter().cloned());
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
