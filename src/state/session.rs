//! Session state and its pure transition function.
//!
//! DESIGN
//! ======
//! Every change to the shared session goes through [`reduce`], so the state
//! machine can be tested without a backend, a provider, or storage.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use serde_json::{Map, Value};

use crate::net::types::{AuthGrant, User};

/// The shared "who is logged in" record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionState {
    pub user: Option<User>,
    pub token: Option<String>,
    /// True while a session-determining request is in flight.
    pub loading: bool,
    /// Message from the most recent failed operation.
    pub error: Option<String>,
    /// Boot has settled at least once; before that an empty session is not yet meaningful.
    pub booted: bool,
    /// Federated sign-in found no account; the caller is finishing registration.
    pub registration_pending: bool,
}

impl SessionState {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }
}

/// Closed set of session transitions.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionAction {
    BootStarted,
    /// Boot finished, with the re-validated session or signed out.
    BootSettled { restored: Option<AuthGrant> },
    /// Login, register or federated sign-in began.
    RequestStarted,
    UserSet { user: User, token: String },
    UserUpdated { patch: Map<String, Value> },
    /// Federated sign-in settled without a session.
    RegistrationRequired,
    /// An operation settled with an error.
    Failed { message: String },
    /// Error from a one-shot call that never owned `loading`.
    ErrorSet { message: String },
    ErrorCleared,
    LoggedOut,
}

impl SessionAction {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::BootStarted => "boot_started",
            Self::BootSettled { .. } => "boot_settled",
            Self::RequestStarted => "request_started",
            Self::UserSet { .. } => "user_set",
            Self::UserUpdated { .. } => "user_updated",
            Self::RegistrationRequired => "registration_required",
            Self::Failed { .. } => "failed",
            Self::ErrorSet { .. } => "error_set",
            Self::ErrorCleared => "error_cleared",
            Self::LoggedOut => "logged_out",
        }
    }
}

/// Apply `action` to `state`.
///
/// Failures never touch `user`/`token`; `UserUpdated` is ignored while signed out.
/// `booted` only ever goes from false to true.
#[must_use]
pub fn reduce(state: &SessionState, action: SessionAction) -> SessionState {
    match action {
        SessionAction::BootStarted | SessionAction::RequestStarted => {
            SessionState { loading: true, error: None, registration_pending: false, ..state.clone() }
        }
        SessionAction::BootSettled { restored } => {
            let (user, token) = restored.map_or((None, None), |grant| (Some(grant.user), Some(grant.token)));
            SessionState { user, token, booted: true, ..SessionState::default() }
        }
        SessionAction::UserSet { user, token } => {
            SessionState { user: Some(user), token: Some(token), booted: state.booted, ..SessionState::default() }
        }
        SessionAction::UserUpdated { patch } => {
            let mut next = state.clone();
            if let Some(user) = next.user.as_mut() {
                user.merge(&patch);
            }
            next
        }
        SessionAction::RegistrationRequired => {
            SessionState { loading: false, registration_pending: true, ..state.clone() }
        }
        SessionAction::Failed { message } => SessionState { loading: false, error: Some(message), ..state.clone() },
        SessionAction::ErrorSet { message } => SessionState { error: Some(message), ..state.clone() },
        SessionAction::ErrorCleared => SessionState { error: None, ..state.clone() },
        SessionAction::LoggedOut => SessionState { booted: state.booted, ..SessionState::default() },
    }
}
