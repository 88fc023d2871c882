//! Federated identity provider seam (Google-style popup sign-in).
//!
//! SYSTEM CONTEXT
//! ==============
//! The popup flow itself lives in page-level JavaScript (the provider's SDK).
//! Hydrate builds reach it through `JsIdentityProvider`, which expects the
//! host page to expose `window.tourbookAuth.signInWithPopup()` and
//! `window.tourbookAuth.signOut()`.

#[cfg(test)]
#[path = "identity_test.rs"]
mod identity_test;

use async_trait::async_trait;

use super::types::IdentityAssertion;

/// Provider error codes reported when the user dismisses the popup.
#[cfg(any(test, feature = "hydrate"))]
const POPUP_CLOSED_CODES: &[&str] = &["auth/popup-closed-by-user", "auth/cancelled-popup-request"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("sign-in popup was closed")]
    Cancelled,
    #[error("{0}")]
    Failed(String),
    #[error("identity provider is not available")]
    Unavailable,
}

impl ProviderError {
    /// Message worth showing to the user, if the provider gave one.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Cancelled => Some("Sign-in popup was closed".to_owned()),
            Self::Failed(message) if !message.trim().is_empty() => Some(message.clone()),
            Self::Failed(_) | Self::Unavailable => None,
        }
    }
}

#[async_trait(?Send)]
pub trait IdentityProvider {
    /// Run the interactive sign-in flow and return the provider identity.
    async fn sign_in(&self) -> Result<IdentityAssertion, ProviderError>;

    /// End the provider-side session.
    async fn sign_out(&self) -> Result<(), ProviderError>;
}

/// Provider for deployments without federated sign-in.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFederatedProvider;

#[async_trait(?Send)]
impl IdentityProvider for NoFederatedProvider {
    async fn sign_in(&self) -> Result<IdentityAssertion, ProviderError> {
        Err(ProviderError::Unavailable)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

/// Parse the JSON form of the popup result.
#[cfg(any(test, feature = "hydrate"))]
fn parse_assertion(json: &str) -> Result<IdentityAssertion, ProviderError> {
    let assertion: IdentityAssertion =
        serde_json::from_str(json).map_err(|e| ProviderError::Failed(format!("malformed identity: {e}")))?;
    if assertion.uid.trim().is_empty() {
        return Err(ProviderError::Failed("identity has no uid".to_owned()));
    }
    Ok(assertion)
}

#[cfg(any(test, feature = "hydrate"))]
fn classify_failure(code: Option<&str>, message: Option<String>) -> ProviderError {
    if code.is_some_and(|c| POPUP_CLOSED_CODES.contains(&c)) {
        return ProviderError::Cancelled;
    }
    ProviderError::Failed(message.unwrap_or_default())
}

#[cfg(feature = "hydrate")]
pub use bridge::JsIdentityProvider;

#[cfg(feature = "hydrate")]
mod bridge {
    use async_trait::async_trait;
    use wasm_bindgen::prelude::*;

    use super::{IdentityProvider, ProviderError, classify_failure, parse_assertion};
    use crate::net::types::IdentityAssertion;

    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(catch, js_namespace = tourbookAuth, js_name = signInWithPopup)]
        async fn sign_in_with_popup() -> Result<JsValue, JsValue>;

        #[wasm_bindgen(catch, js_namespace = tourbookAuth, js_name = signOut)]
        async fn provider_sign_out() -> Result<JsValue, JsValue>;
    }

    /// Bridge to the page-level provider SDK.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct JsIdentityProvider;

    #[async_trait(?Send)]
    impl IdentityProvider for JsIdentityProvider {
        async fn sign_in(&self) -> Result<IdentityAssertion, ProviderError> {
            let value = sign_in_with_popup().await.map_err(|e| js_failure(&e))?;
            let json = js_sys::JSON::stringify(&value).map_err(|e| js_failure(&e))?;
            parse_assertion(&String::from(json))
        }

        async fn sign_out(&self) -> Result<(), ProviderError> {
            provider_sign_out().await.map(|_| ()).map_err(|e| js_failure(&e))
        }
    }

    fn js_failure(err: &JsValue) -> ProviderError {
        let field = |name: &str| {
            js_sys::Reflect::get(err, &JsValue::from_str(name))
                .ok()
                .and_then(|v| v.as_string())
        };
        let message = field("message").or_else(|| err.as_string());
        classify_failure(field("code").as_deref(), message)
    }
}
