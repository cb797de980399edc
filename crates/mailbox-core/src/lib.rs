pub mod action;
pub mod config;
pub mod error;
pub mod key;
pub mod mailbox;
pub mod registry;

pub use action::{DelayedAction, NewAction};
pub use error::{MailboxError, Result};
pub use key::RegistryKey;
pub use mailbox::{Identities, ListFilter, Mailbox, MailboxSnapshot, Registration};
pub use registry::{Registry, RegistrySnapshot, Scope};
