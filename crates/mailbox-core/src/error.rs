use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailboxError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("identity must not be empty")]
    EmptyIdentity,

    #[error("config not found: {0}")]
    ConfigNotFound(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, MailboxError>;
