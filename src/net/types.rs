//! Wire DTOs for the credential backend and the federated identity bridge.
//!
//! DESIGN
//! ======
//! The backend wraps every success body in a `{ data: ... }` envelope and
//! treats the user record as an open attribute bag, so `User` keeps the raw
//! JSON object instead of a fixed struct. Field names follow the backend's
//! camelCase JSON.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by credential backend calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (network, CORS, aborted).
    #[error("request failed: {0}")]
    Transport(String),

    /// The backend answered with a non-success HTTP status.
    #[error("backend responded with status {status}")]
    Status { status: u16, message: Option<String> },

    /// The response body did not match the expected envelope.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Backend-reported human-readable message, when the error body carried one.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message: Some(message), .. } => Some(message),
            _ => None,
        }
    }
}

// =============================================================================
// USER
// =============================================================================

/// A user record as returned by the backend.
///
/// Only `id`, `name` and `email` get typed accessors; everything else is
/// carried through untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct User(Map<String, Value>);

impl User {
    /// Raw attribute bag.
    #[must_use]
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.0
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// User identifier, accepting both `id` and `_id` and numeric or string ids.
    #[must_use]
    pub fn id(&self) -> Option<String> {
        let raw = self.0.get("id").or_else(|| self.0.get("_id"))?;
        match raw {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.0.get("email").and_then(Value::as_str)
    }

    /// Shallow merge: top-level keys in `patch` replace existing keys.
    pub fn merge(&mut self, patch: &Map<String, Value>) {
        for (key, value) in patch {
            self.0.insert(key.clone(), value.clone());
        }
    }
}

impl From<Map<String, Value>> for User {
    fn from(attributes: Map<String, Value>) -> Self {
        Self(attributes)
    }
}

// =============================================================================
// RESPONSES
// =============================================================================

/// Success envelope wrapping every backend response body.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// `GET /auth/me` payload.
#[derive(Debug, Deserialize)]
pub struct CurrentUserData {
    pub user: User,
}

/// Token plus user issued by login, register and the federated exchange.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct AuthGrant {
    pub token: String,
    pub user: User,
}

/// Raw federated exchange payload; either a grant or a registration prompt.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FederatedReply {
    #[serde(default)]
    pub requires_registration: Option<bool>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub google_data: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Resolved federated exchange result.
#[derive(Clone, Debug, PartialEq)]
pub enum FederatedExchange {
    /// The provider identity maps to an existing account.
    Grant(AuthGrant),
    /// No account yet; the caller must finish registration first.
    RegistrationRequired { google_data: Option<Value>, message: Option<String> },
}

/// Payload of the send/verify code endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct MessageReply {
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// REQUESTS
// =============================================================================

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SendCodeRequest<'a> {
    pub email: &'a str,
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub struct VerifyCodeRequest<'a> {
    pub email: &'a str,
    pub otp: &'a str,
}

/// Identity assertion handed back by the federated provider popup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityAssertion {
    /// Provider-issued subject identifier.
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
}

/// Body of `POST /auth/google`.
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FederatedExchangeRequest<'a> {
    pub google_id: &'a str,
    pub email: Option<&'a str>,
    pub name: Option<&'a str>,
    pub profile_image: Option<&'a str>,
}

impl<'a> From<&'a IdentityAssertion> for FederatedExchangeRequest<'a> {
    fn from(assertion: &'a IdentityAssertion) -> Self {
        Self {
            google_id: &assertion.uid,
            email: assertion.email.as_deref(),
            name: assertion.display_name.as_deref(),
            profile_image: assertion.photo_url.as_deref(),
        }
    }
}
