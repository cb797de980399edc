use crate::error::{MailboxError, Result};
use crate::key::KEY_SEPARATOR;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ServiceConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Listening port. `None` means it must come from the command line or
    /// the `PORT` environment variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Tenant used when a request carries no tenant header.
    #[serde(default = "default_tenant")]
    pub default_tenant: String,
    #[serde(default = "default_tenant_header")]
    pub tenant_header: String,
    #[serde(default = "default_correlation_header")]
    pub correlation_header: String,
}

fn default_version() -> u32 {
    1
}

fn default_tenant() -> String {
    "tripassist".to_string()
}

fn default_tenant_header() -> String {
    "X-MTT-Tenant-ID".to_string()
}

fn default_correlation_header() -> String {
    "X-MTT-Correlation-ID".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            port: None,
            default_tenant: default_tenant(),
            tenant_header: default_tenant_header(),
            correlation_header: default_correlation_header(),
        }
    }
}

impl ServiceConfig {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(MailboxError::ConfigNotFound(path.display().to_string()));
        }
        let data = std::fs::read_to_string(path)?;
        Self::from_yaml(&data)
    }

    /// Load `path` if given, otherwise start from defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn from_yaml(data: &str) -> Result<Self> {
        // An empty file is a valid, all-defaults config.
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(data)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Override the port when one was supplied on the command line or env.
    pub fn with_port(mut self, port: Option<u16>) -> Self {
        if port.is_some() {
            self.port = port;
        }
        self
    }

    pub fn require_port(&self) -> Result<u16> {
        self.port.ok_or_else(|| {
            MailboxError::InvalidConfig("port must be set (--port, $PORT or config file)".into())
        })
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.default_tenant.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "default_tenant must not be empty".to_string(),
            });
        } else if self.default_tenant.contains(KEY_SEPARATOR) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "default_tenant '{}' contains '{KEY_SEPARATOR}'; listings will be ambiguous",
                    self.default_tenant
                ),
            });
        }

        for (field, value) in [
            ("tenant_header", &self.tenant_header),
            ("correlation_header", &self.correlation_header),
        ] {
            if !is_valid_header_name(value) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("{field} '{value}' is not a valid HTTP header name"),
                });
            }
        }

        if self.tenant_header.eq_ignore_ascii_case(&self.correlation_header) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "tenant_header and correlation_header must differ".to_string(),
            });
        }

        if self.port == Some(0) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "port 0 lets the OS pick a free port".to_string(),
            });
        }

        if self.version != 1 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!("unknown config version {}", self.version),
            });
        }

        warnings
    }

    pub fn has_errors(&self) -> bool {
        self.validate().iter().any(|w| w.level == WarnLevel::Error)
    }
}

/// RFC 7230 token characters.
fn is_valid_header_name(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_alphanumeric()
                || matches!(
                    b,
                    b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^'
                        | b'_' | b'`' | b'|' | b'~'
                )
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
