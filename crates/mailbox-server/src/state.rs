use mailbox_core::config::ServiceConfig;
use mailbox_core::Mailbox;
use std::sync::Arc;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub mailbox: Arc<Mailbox>,
    pub config: Arc<ServiceConfig>,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_mailbox(config, Arc::new(Mailbox::new()))
    }

    /// Build state around an existing mailbox, e.g. to inspect it from tests.
    pub fn with_mailbox(config: ServiceConfig, mailbox: Arc<Mailbox>) -> Self {
        Self {
            mailbox,
            config: Arc::new(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_one_mailbox() {
        let state = AppState::new(ServiceConfig::default());
        let other = state.clone();
        assert!(Arc::ptr_eq(&state.mailbox, &other.mailbox));
        assert_eq!(other.config.default_tenant, "tripassist");
    }
}
