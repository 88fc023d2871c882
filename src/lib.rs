//! # tourbook-session
//!
//! Session layer for the Tourbook marketplace front-end: login, registration,
//! federated sign-in, logout, email verification codes, and boot-time
//! restoration of a persisted bearer token.
//!
//! The [`SessionManager`] is constructed once with a [`CredentialBackend`],
//! an [`IdentityProvider`] and a [`CredentialStore`], then handed to whatever
//! composes the UI. Consumers observe [`SessionState`] through
//! [`SessionManager::subscribe`] or the Leptos bridge in [`util::auth`].

pub mod config;
pub mod net;
pub mod services;
pub mod state;
pub mod util;

pub use config::ApiConfig;
pub use net::api::{CredentialBackend, HttpBackend};
pub use net::identity::{IdentityProvider, NoFederatedProvider};
pub use net::types::User;
pub use services::outcome::{FederatedOutcome, OperationReport, SessionError};
pub use services::session::SessionManager;
pub use state::session::SessionState;
pub use util::storage::{CredentialStore, MemoryStore};

/// Install browser logging and panic reporting. Call once from the hydrate entry point.
#[cfg(feature = "hydrate")]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
}
