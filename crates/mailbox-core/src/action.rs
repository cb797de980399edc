use crate::error::{MailboxError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version gate applied when the caller does not provide one.
pub const DEFAULT_MIN_APP_VERSION: &str = "0";

/// A pending action held in a registry until a qualifying client checks in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelayedAction {
    pub id: String,
    pub action_type: String,
    pub action_url: String,
    pub min_app_version: String,
    pub registered_at: DateTime<Utc>,
}

impl DelayedAction {
    /// True when a client at `app_version` may receive this action.
    ///
    /// Versions are compared as plain strings, byte by byte, so `"1.9"` is
    /// *greater* than `"1.10"`. Callers must pass an already normalized
    /// version (see [`normalize_version`]).
    pub fn is_satisfied_by(&self, app_version: &str) -> bool {
        self.min_app_version.as_str() <= app_version
    }
}

/// An action as submitted by a caller, before the registry resolves its id
/// and normalizes its version gate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub action_type: String,
    pub action_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_app_version: Option<String>,
}

impl NewAction {
    pub fn new(action_type: impl Into<String>, action_url: impl Into<String>) -> Self {
        Self {
            id: None,
            action_type: action_type.into(),
            action_url: action_url.into(),
            min_app_version: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_min_app_version(mut self, version: impl Into<String>) -> Self {
        self.min_app_version = Some(version.into());
        self
    }

    /// Reject actions missing a type or URL.
    pub fn validate(&self) -> Result<()> {
        if self.action_type.is_empty() {
            return Err(MailboxError::MissingField("actionType"));
        }
        if self.action_url.is_empty() {
            return Err(MailboxError::MissingField("actionUrl"));
        }
        Ok(())
    }

    /// Resolve into a stored action: assigns a fresh id when none was given
    /// and normalizes the version gate.
    pub fn into_action(self) -> Result<DelayedAction> {
        self.validate()?;
        let id = match self.id {
            Some(id) if !id.is_empty() => id,
            _ => uuid::Uuid::new_v4().to_string(),
        };
        let min_app_version = match self.min_app_version.as_deref() {
            None | Some("") => DEFAULT_MIN_APP_VERSION.to_string(),
            Some(v) => normalize_version(v),
        };
        Ok(DelayedAction {
            id,
            action_type: self.action_type,
            action_url: self.action_url,
            min_app_version,
            registered_at: Utc::now(),
        })
    }
}

/// Canonical form used on both sides of a version comparison.
pub fn normalize_version(version: &str) -> String {
    version.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_action_assigns_id_when_missing() {
        let action = NewAction::new("update", "/x").into_action().unwrap();
        assert!(!action.id.is_empty());
        assert!(uuid::Uuid::parse_str(&action.id).is_ok());
    }

    #[test]
    fn into_action_assigns_id_when_empty() {
        let action = NewAction::new("update", "/x")
            .with_id("")
            .into_action()
            .unwrap();
        assert!(!action.id.is_empty());
    }

    #[test]
    fn into_action_keeps_caller_id() {
        let action = NewAction::new("update", "/x")
            .with_id("a-1")
            .into_action()
            .unwrap();
        assert_eq!(action.id, "a-1");
    }

    #[test]
    fn missing_version_defaults_to_zero() {
        let action = NewAction::new("update", "/x").into_action().unwrap();
        assert_eq!(action.min_app_version, "0");

        let action = NewAction::new("update", "/x")
            .with_min_app_version("")
            .into_action()
            .unwrap();
        assert_eq!(action.min_app_version, "0");
    }

    #[test]
    fn version_is_lowercased() {
        let action = NewAction::new("update", "/x")
            .with_min_app_version("2.0-RC1")
            .into_action()
            .unwrap();
        assert_eq!(action.min_app_version, "2.0-rc1");
    }

    #[test]
    fn empty_type_or_url_rejected() {
        let err = NewAction::new("", "/x").into_action().unwrap_err();
        assert!(matches!(err, MailboxError::MissingField("actionType")));

        let err = NewAction::new("update", "").into_action().unwrap_err();
        assert!(matches!(err, MailboxError::MissingField("actionUrl")));
    }

    #[test]
    fn comparison_is_lexicographic() {
        let action = NewAction::new("update", "/x")
            .with_min_app_version("1.9")
            .into_action()
            .unwrap();
        assert!(!action.is_satisfied_by("1.10"));
        assert!(action.is_satisfied_by("1.9"));
        assert!(action.is_satisfied_by("2"));
    }

    #[test]
    fn wire_form_is_camel_case() {
        let json = serde_json::json!({
            "actionType": "update",
            "actionUrl": "/x",
            "minAppVersion": "1.5"
        });
        let parsed: NewAction = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.action_type, "update");
        assert_eq!(parsed.min_app_version.as_deref(), Some("1.5"));
        assert!(parsed.id.is_none());

        let stored = parsed.into_action().unwrap();
        let out = serde_json::to_value(&stored).unwrap();
        assert_eq!(out["actionUrl"], "/x");
        assert!(out["registeredAt"].is_string());
    }
}
