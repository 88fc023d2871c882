//! Session manager: the single owner of the authenticated-user lifecycle.
//!
//! SYSTEM CONTEXT
//! ==============
//! Pages never mutate session state directly. They hold a `SessionManager`,
//! call its operations, and observe [`SessionState`] through
//! [`SessionManager::subscribe`] (or the Leptos signal bridge in
//! `util::auth`).
//!
//! ERROR HANDLING
//! ==============
//! Every failure is reported twice: as the returned `Err(SessionError)` for
//! the caller, and as `SessionState::error` for passive observers. No
//! operation panics or leaves `loading` stuck on a settled request.
//!
//! TRADE-OFFS
//! ==========
//! Operations are not mutually exclusive. Overlapping calls apply their
//! transitions in completion order (last write wins); UIs are expected to
//! disable controls while `loading` is true.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use serde_json::{Map, Value};
use tokio::sync::watch;

use super::outcome::{FederatedOutcome, Operation, SessionError};
use crate::net::api::CredentialBackend;
use crate::net::identity::IdentityProvider;
use crate::net::types::{ApiError, AuthGrant, FederatedExchange, User};
use crate::state::session::{SessionAction, SessionState, reduce};
use crate::util::storage::{self, CredentialStore};

pub struct SessionManager<B, P, S> {
    backend: B,
    provider: P,
    store: S,
    state: watch::Sender<SessionState>,
}

impl<B, P, S> SessionManager<B, P, S> {
    /// Create a signed-out, idle manager. Call [`SessionManager::boot`] next.
    pub fn new(backend: B, provider: P, store: S) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self { backend, provider, store, state }
    }

    /// Snapshot of the current session.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receive a notification after every transition.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().token.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// `Authorization` header value for backend calls made by other pages.
    pub fn authorization_header(&self) -> Option<String> {
        self.token().map(|token| format!("Bearer {token}"))
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Local-only shallow merge into the current user.
    ///
    /// Does not call the backend and does not rewrite storage, so a reload
    /// shows the last persisted copy until the next login or refresh.
    pub fn update_user(&self, patch: Map<String, Value>) {
        self.dispatch(SessionAction::UserUpdated { patch });
    }

    pub fn clear_error(&self) {
        self.dispatch(SessionAction::ErrorCleared);
    }

    fn dispatch(&self, action: SessionAction) {
        log::trace!("session action: {}", action.name());
        self.state.send_modify(|state| *state = reduce(state, action));
    }
}

impl<B, P, S> SessionManager<B, P, S>
where
    B: CredentialBackend,
    P: IdentityProvider,
    S: CredentialStore,
{
    /// Restore the persisted session, re-validating the token with the backend.
    ///
    /// A rejected or unverifiable token wipes storage silently.
    pub async fn boot(&self) {
        self.dispatch(SessionAction::BootStarted);
        let Some(stored) = storage::load_credentials(&self.store) else {
            self.dispatch(SessionAction::BootSettled { restored: None });
            return;
        };
        let restored = match self.backend.current_user(&stored.token).await {
            Ok(user) => {
                log::info!("session restored for user {}", user.id().unwrap_or_default());
                Some(AuthGrant { token: stored.token, user })
            }
            Err(e) => {
                log::debug!("stored session rejected: {e}");
                storage::clear_credentials(&self.store);
                None
            }
        };
        self.dispatch(SessionAction::BootSettled { restored });
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns the normalized failure, which is also set on the shared state.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, SessionError> {
        self.dispatch(SessionAction::RequestStarted);
        let result = self.backend.login(email, password).await;
        self.settle_grant(Operation::Login, result)
    }

    /// Create an account and sign in.
    ///
    /// # Errors
    ///
    /// Returns the normalized failure, which is also set on the shared state.
    pub async fn register(&self, user_data: &Map<String, Value>) -> Result<User, SessionError> {
        self.dispatch(SessionAction::RequestStarted);
        let result = self.backend.register(user_data).await;
        self.settle_grant(Operation::Register, result)
    }

    /// Popup sign-in followed by the backend exchange.
    ///
    /// `Ok(FederatedOutcome::RegistrationRequired)` leaves the session signed
    /// out; callers must branch on it rather than on the shared state.
    ///
    /// # Errors
    ///
    /// Returns the normalized provider or backend failure, which is also set
    /// on the shared state.
    pub async fn sign_in_federated(&self) -> Result<FederatedOutcome, SessionError> {
        self.dispatch(SessionAction::RequestStarted);
        let assertion = match self.provider.sign_in().await {
            Ok(assertion) => assertion,
            Err(e) => return Err(self.fail(SessionError::from_provider(Operation::FederatedSignIn, &e))),
        };
        match self.backend.exchange_federated(&assertion).await {
            Ok(FederatedExchange::Grant(grant)) => Ok(FederatedOutcome::Authenticated(self.commit_grant(grant))),
            Ok(FederatedExchange::RegistrationRequired { google_data, message }) => {
                log::debug!("federated identity needs registration");
                self.dispatch(SessionAction::RegistrationRequired);
                let google_data = google_data
                    .or_else(|| serde_json::to_value(&assertion).ok())
                    .unwrap_or(Value::Null);
                Ok(FederatedOutcome::RegistrationRequired { google_data, message })
            }
            Err(e) => Err(self.fail(SessionError::from_api(Operation::FederatedSignIn, &e))),
        }
    }

    /// Sign out everywhere. Never fails; a provider sign-out error is only logged.
    pub async fn logout(&self) {
        if let Err(e) = self.provider.sign_out().await {
            log::warn!("identity provider sign-out failed: {e}");
        }
        storage::clear_credentials(&self.store);
        self.dispatch(SessionAction::LoggedOut);
    }

    /// Ask the backend to email a verification code.
    ///
    /// # Errors
    ///
    /// Returns the normalized failure, which is also set on the shared state.
    pub async fn send_verification_code(&self, email: &str, name: &str) -> Result<String, SessionError> {
        self.dispatch(SessionAction::ErrorCleared);
        match self.backend.send_verification_code(email, name).await {
            Ok(message) => Ok(message.unwrap_or_else(|| "Verification code sent".to_owned())),
            Err(e) => Err(self.report(SessionError::from_api(Operation::SendCode, &e))),
        }
    }

    /// Check an emailed verification code.
    ///
    /// # Errors
    ///
    /// Returns the normalized failure, which is also set on the shared state.
    pub async fn verify_code(&self, email: &str, code: &str) -> Result<String, SessionError> {
        self.dispatch(SessionAction::ErrorCleared);
        match self.backend.verify_code(email, code).await {
            Ok(message) => Ok(message.unwrap_or_else(|| "Email verified".to_owned())),
            Err(e) => Err(self.report(SessionError::from_api(Operation::VerifyCode, &e))),
        }
    }

    /// Re-fetch the current user and persist the fresh copy.
    ///
    /// A backend failure sets `error` but keeps the session.
    ///
    /// # Errors
    ///
    /// Returns an error when signed out, when the backend call fails, or with
    /// `ErrorKind::Superseded` when the token changed while the request was in
    /// flight. The superseded case leaves the shared state alone.
    pub async fn refresh_user(&self) -> Result<User, SessionError> {
        let Some(token) = self.token() else {
            return Err(SessionError::unauthenticated(Operation::RefreshUser));
        };
        self.dispatch(SessionAction::ErrorCleared);
        let user = match self.backend.current_user(&token).await {
            Ok(user) => user,
            Err(e) => return Err(self.report(SessionError::from_api(Operation::RefreshUser, &e))),
        };
        if self.token().as_deref() != Some(token.as_str()) {
            log::debug!("session changed during refresh; dropping result");
            return Err(SessionError::superseded(Operation::RefreshUser));
        }
        if let Err(e) = storage::persist_user(&self.store, &user) {
            log::warn!("failed to persist refreshed user: {e}");
        }
        self.dispatch(SessionAction::UserSet { user: user.clone(), token });
        Ok(user)
    }

    fn settle_grant(&self, operation: Operation, result: Result<AuthGrant, ApiError>) -> Result<User, SessionError> {
        match result {
            Ok(grant) => Ok(self.commit_grant(grant)),
            Err(e) => Err(self.fail(SessionError::from_api(operation, &e))),
        }
    }

    fn commit_grant(&self, grant: AuthGrant) -> User {
        if let Err(e) = storage::persist_credentials(&self.store, &grant.token, &grant.user) {
            log::warn!("failed to persist credentials: {e}");
        }
        log::info!("signed in user {}", grant.user.id().unwrap_or_default());
        let user = grant.user.clone();
        self.dispatch(SessionAction::UserSet { user: grant.user, token: grant.token });
        user
    }

    /// Settle an in-flight request with `err`.
    fn fail(&self, err: SessionError) -> SessionError {
        log::warn!("{} failed: {err}", err.operation().name());
        self.dispatch(SessionAction::Failed { message: err.message().to_owned() });
        err
    }

    /// Record `err` without touching `loading`.
    fn report(&self, err: SessionError) -> SessionError {
        log::warn!("{} failed: {err}", err.operation().name());
        self.dispatch(SessionAction::ErrorSet { message: err.message().to_owned() });
        err
    }
}
