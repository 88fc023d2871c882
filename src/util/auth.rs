//! Leptos bindings for the session manager.
//!
//! SYSTEM CONTEXT
//! ==============
//! Route components read session state through an `RwSignal` mirrored from
//! the manager's watch channel, and share one unauthenticated-redirect rule.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use tokio::sync::watch;

use crate::services::session::SessionManager;
use crate::state::session::SessionState;

pub const LOGIN_ROUTE: &str = "/login";

/// True once boot has settled without a signed-in user.
///
/// Never fires before boot, while a request is in flight, or while a federated
/// sign-in is waiting on registration.
pub fn should_redirect_unauth(state: &SessionState) -> bool {
    state.booted && !state.loading && state.user.is_none() && !state.registration_pending
}

/// Feed every transition published on `rx` to `apply` until the manager is dropped.
pub async fn mirror_session(mut rx: watch::Receiver<SessionState>, mut apply: impl FnMut(SessionState)) {
    while rx.changed().await.is_ok() {
        let next = rx.borrow_and_update().clone();
        apply(next);
    }
}

/// Mirror the manager's state into a signal that updates after every transition.
pub fn session_signal<B, P, S>(manager: &SessionManager<B, P, S>) -> RwSignal<SessionState> {
    let signal = RwSignal::new(manager.state());
    leptos::task::spawn_local(mirror_session(manager.subscribe(), move |next| signal.set(next)));
    signal
}

/// Redirect to `/login` whenever the session has settled with no user present.
pub fn install_unauth_redirect<F>(session: RwSignal<SessionState>, navigate: F)
where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    Effect::new(move || {
        if should_redirect_unauth(&session.get()) {
            navigate(LOGIN_ROUTE, NavigateOptions::default());
        }
    });
}
