//! REST client for the credential/token backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session manager only talks to the backend through [`CredentialBackend`],
//! so tests and alternative transports can stand in for [`HttpBackend`].
//!
//! ERROR HANDLING
//! ==============
//! Every call returns `Result<_, ApiError>`. Non-2xx bodies are mined for a
//! `message` field so the backend's own wording reaches the user.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::types::{
    ApiError, AuthGrant, CurrentUserData, Envelope, FederatedExchange, FederatedExchangeRequest, FederatedReply,
    IdentityAssertion, LoginRequest, MessageReply, SendCodeRequest, User, VerifyCodeRequest,
};
use crate::config::{ApiConfig, ConfigError};

pub const CURRENT_USER_PATH: &str = "/auth/me";
pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";
pub const FEDERATED_PATH: &str = "/auth/google";
pub const SEND_CODE_PATH: &str = "/auth/send-otp";
pub const VERIFY_CODE_PATH: &str = "/auth/verify-otp";

/// Credential backend operations consumed by the session manager.
#[async_trait(?Send)]
pub trait CredentialBackend {
    /// Validate `token` and return the user it belongs to.
    async fn current_user(&self, token: &str) -> Result<User, ApiError>;

    async fn login(&self, email: &str, password: &str) -> Result<AuthGrant, ApiError>;

    async fn register(&self, user_data: &Map<String, Value>) -> Result<AuthGrant, ApiError>;

    /// Exchange a provider identity assertion for a session or a registration prompt.
    async fn exchange_federated(&self, assertion: &IdentityAssertion) -> Result<FederatedExchange, ApiError>;

    /// Ask the backend to email a one-time code. Returns the backend's message.
    async fn send_verification_code(&self, email: &str, name: &str) -> Result<Option<String>, ApiError>;

    /// Check a one-time code. Returns the backend's message.
    async fn verify_code(&self, email: &str, otp: &str) -> Result<Option<String>, ApiError>;
}

/// `reqwest`-backed [`CredentialBackend`]; works natively and in wasm.
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self { http: reqwest::Client::new(), base_url: config.base_url }
    }

    /// Build a backend client from [`ApiConfig::from_env`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configured base URL is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(ApiConfig::from_env()?))
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        parse_response(status, &body)
    }
}

#[async_trait(?Send)]
impl CredentialBackend for HttpBackend {
    async fn current_user(&self, token: &str) -> Result<User, ApiError> {
        let url = endpoint_url(&self.base_url, CURRENT_USER_PATH);
        let data: CurrentUserData = self.send(self.http.get(url).bearer_auth(token)).await?;
        Ok(data.user)
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthGrant, ApiError> {
        let url = endpoint_url(&self.base_url, LOGIN_PATH);
        self.send(self.http.post(url).json(&LoginRequest { email, password }))
            .await
    }

    async fn register(&self, user_data: &Map<String, Value>) -> Result<AuthGrant, ApiError> {
        let url = endpoint_url(&self.base_url, REGISTER_PATH);
        self.send(self.http.post(url).json(user_data)).await
    }

    async fn exchange_federated(&self, assertion: &IdentityAssertion) -> Result<FederatedExchange, ApiError> {
        let url = endpoint_url(&self.base_url, FEDERATED_PATH);
        let body = FederatedExchangeRequest::from(assertion);
        let reply: FederatedReply = self.send(self.http.post(url).json(&body)).await?;
        resolve_federated(reply)
    }

    async fn send_verification_code(&self, email: &str, name: &str) -> Result<Option<String>, ApiError> {
        let url = endpoint_url(&self.base_url, SEND_CODE_PATH);
        let reply: MessageReply = self
            .send(self.http.post(url).json(&SendCodeRequest { email, name }))
            .await?;
        Ok(reply.message)
    }

    async fn verify_code(&self, email: &str, otp: &str) -> Result<Option<String>, ApiError> {
        let url = endpoint_url(&self.base_url, VERIFY_CODE_PATH);
        let reply: MessageReply = self
            .send(self.http.post(url).json(&VerifyCodeRequest { email, otp }))
            .await?;
        Ok(reply.message)
    }
}

fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{base_url}{path}")
}

/// Turn a raw status + body into the envelope's `data` or a typed error.
fn parse_response<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ApiError> {
    if !(200..300).contains(&status) {
        return Err(ApiError::Status { status, message: error_message_from_body(body) });
    }
    let envelope: Envelope<T> = serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))?;
    Ok(envelope.data)
}

/// Extract the backend's error wording from `{ message }`, `{ data: { message } }`
/// or `{ error }`.
fn error_message_from_body(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let candidates = [
        value.get("message"),
        value.get("data").and_then(|d| d.get("message")),
        value.get("error"),
    ];
    candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .find(|m| !m.trim().is_empty())
        .map(str::to_owned)
}

fn resolve_federated(reply: FederatedReply) -> Result<FederatedExchange, ApiError> {
    if reply.requires_registration.unwrap_or(false) {
        return Ok(FederatedExchange::RegistrationRequired { google_data: reply.google_data, message: reply.message });
    }
    match (reply.token, reply.user) {
        (Some(token), Some(user)) => Ok(FederatedExchange::Grant(AuthGrant { token, user })),
        _ => Err(ApiError::Decode("federated exchange returned neither a session nor a registration prompt".into())),
    }
}
