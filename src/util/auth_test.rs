use super::*;
use crate::net::api::CredentialBackend;
use crate::net::identity::NoFederatedProvider;
use crate::net::types::{ApiError, AuthGrant, FederatedExchange, IdentityAssertion, User};
use crate::util::storage::{MemoryStore, TOKEN_KEY, USER_KEY};
use serde_json::{Map, Value};

fn user() -> User {
    serde_json::from_value(serde_json::json!({ "id": "u1", "name": "Alice" })).unwrap()
}

fn booted() -> SessionState {
    SessionState { booted: true, ..SessionState::default() }
}

/// Accepts any token, yielding once so observers see the in-flight state.
struct YieldingBackend;

#[async_trait::async_trait(?Send)]
impl CredentialBackend for YieldingBackend {
    async fn current_user(&self, _token: &str) -> Result<User, ApiError> {
        tokio::task::yield_now().await;
        Ok(user())
    }

    async fn login(&self, _email: &str, _password: &str) -> Result<AuthGrant, ApiError> {
        Err(ApiError::Transport("unused".into()))
    }

    async fn register(&self, _user_data: &Map<String, Value>) -> Result<AuthGrant, ApiError> {
        Err(ApiError::Transport("unused".into()))
    }

    async fn exchange_federated(&self, _assertion: &IdentityAssertion) -> Result<FederatedExchange, ApiError> {
        Err(ApiError::Transport("unused".into()))
    }

    async fn send_verification_code(&self, _email: &str, _name: &str) -> Result<Option<String>, ApiError> {
        Err(ApiError::Transport("unused".into()))
    }

    async fn verify_code(&self, _email: &str, _otp: &str) -> Result<Option<String>, ApiError> {
        Err(ApiError::Transport("unused".into()))
    }
}

// =============================================================
// should_redirect_unauth
// =============================================================

#[test]
fn should_not_redirect_before_boot() {
    assert!(!should_redirect_unauth(&SessionState::default()));
}

#[test]
fn should_redirect_when_booted_without_user() {
    assert!(should_redirect_unauth(&booted()));
}

#[test]
fn should_not_redirect_while_loading() {
    let state = SessionState { loading: true, ..booted() };
    assert!(!should_redirect_unauth(&state));
}

#[test]
fn should_not_redirect_when_user_exists() {
    let state = SessionState { user: Some(user()), token: Some("T".to_owned()), ..booted() };
    assert!(!should_redirect_unauth(&state));
}

#[test]
fn should_not_redirect_while_registration_pending() {
    let state = SessionState { registration_pending: true, ..booted() };
    assert!(!should_redirect_unauth(&state));
}

#[test]
fn should_redirect_after_failed_login() {
    let state = SessionState { error: Some("Invalid credentials".to_owned()), ..booted() };
    assert!(should_redirect_unauth(&state));
}

// =============================================================
// mirror_session
// =============================================================

#[tokio::test]
async fn mirrored_boot_never_redirects_a_valid_session() {
    let store: MemoryStore = [(TOKEN_KEY, "T1"), (USER_KEY, r#"{"id":"u1"}"#)].into_iter().collect();
    let manager = SessionManager::new(YieldingBackend, NoFederatedProvider, store);
    let rx = manager.subscribe();
    let mut seen = vec![manager.state()];

    tokio::join!(
        async move {
            manager.boot().await;
            drop(manager);
        },
        mirror_session(rx, |next| seen.push(next)),
    );

    assert!(seen.len() >= 3, "expected initial, in-flight and settled states: {seen:?}");
    assert!(seen.iter().all(|s| !should_redirect_unauth(s)), "{seen:?}");
    let last = seen.last().unwrap();
    assert!(last.booted);
    assert!(last.is_authenticated());
}
