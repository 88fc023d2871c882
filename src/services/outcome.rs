//! Operation results and normalized failures.
//!
//! ERROR HANDLING
//! ==============
//! Backend and provider errors are folded into one [`SessionError`] whose
//! message is either the backend's own wording or a per-operation fallback.
//! The same message lands on the shared `SessionState::error`.

#[cfg(test)]
#[path = "outcome_test.rs"]
mod outcome_test;

use serde::Serialize;
use serde_json::Value;

use crate::net::identity::ProviderError;
use crate::net::types::{ApiError, User};

/// Session operations that can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Login,
    Register,
    FederatedSignIn,
    SendCode,
    VerifyCode,
    RefreshUser,
}

impl Operation {
    /// Message used when the failure carries no wording of its own.
    #[must_use]
    pub fn fallback_message(self) -> &'static str {
        match self {
            Self::Login => "Login failed",
            Self::Register => "Registration failed",
            Self::FederatedSignIn => "Google sign in failed",
            Self::SendCode => "Failed to send OTP",
            Self::VerifyCode => "OTP verification failed",
            Self::RefreshUser => "Failed to refresh user",
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Register => "register",
            Self::FederatedSignIn => "federated_sign_in",
            Self::SendCode => "send_code",
            Self::VerifyCode => "verify_code",
            Self::RefreshUser => "refresh_user",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Backend unreachable or response unreadable.
    Transport,
    /// Backend answered with an error status.
    Rejected,
    /// Federated provider popup failed or was dismissed.
    Provider,
    /// The operation needs a signed-in session.
    Unauthenticated,
    /// The session changed while the request was in flight; the result was discarded.
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SessionError {
    operation: Operation,
    kind: ErrorKind,
    message: String,
}

impl SessionError {
    #[must_use]
    pub fn from_api(operation: Operation, err: &ApiError) -> Self {
        let kind = match err {
            ApiError::Status { .. } => ErrorKind::Rejected,
            ApiError::Transport(_) | ApiError::Decode(_) => ErrorKind::Transport,
        };
        let message = err
            .server_message()
            .map_or_else(|| operation.fallback_message().to_owned(), str::to_owned);
        Self { operation, kind, message }
    }

    #[must_use]
    pub fn from_provider(operation: Operation, err: &ProviderError) -> Self {
        let message = err
            .message()
            .unwrap_or_else(|| operation.fallback_message().to_owned());
        Self { operation, kind: ErrorKind::Provider, message }
    }

    #[must_use]
    pub fn unauthenticated(operation: Operation) -> Self {
        Self { operation, kind: ErrorKind::Unauthenticated, message: "Not signed in".to_owned() }
    }

    #[must_use]
    pub fn superseded(operation: Operation) -> Self {
        Self { operation, kind: ErrorKind::Superseded, message: "Session changed".to_owned() }
    }

    #[must_use]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Successful federated sign-in.
#[derive(Debug, Clone, PartialEq)]
pub enum FederatedOutcome {
    /// Existing account; the session is now authenticated.
    Authenticated(User),
    /// No account yet. The session stays signed out and the caller must route
    /// to registration with `google_data`.
    RegistrationRequired { google_data: Value, message: Option<String> },
}

/// Result-object view of an operation, for callers that render
/// `{ success, error }` style responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub requires_registration: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl OperationReport {
    #[must_use]
    pub fn succeeded() -> Self {
        Self { success: true, ..Self::default() }
    }

    #[must_use]
    pub fn failed(err: &SessionError) -> Self {
        Self { success: false, error: Some(err.message().to_owned()), ..Self::default() }
    }
}

impl From<&Result<User, SessionError>> for OperationReport {
    fn from(result: &Result<User, SessionError>) -> Self {
        match result {
            Ok(_) => Self::succeeded(),
            Err(err) => Self::failed(err),
        }
    }
}

impl From<&Result<String, SessionError>> for OperationReport {
    fn from(result: &Result<String, SessionError>) -> Self {
        match result {
            Ok(message) => Self { message: Some(message.clone()), ..Self::succeeded() },
            Err(err) => Self::failed(err),
        }
    }
}

impl From<&Result<FederatedOutcome, SessionError>> for OperationReport {
    fn from(result: &Result<FederatedOutcome, SessionError>) -> Self {
        match result {
            Ok(FederatedOutcome::Authenticated(_)) => Self::succeeded(),
            Ok(FederatedOutcome::RegistrationRequired { google_data, message }) => Self {
                success: false,
                requires_registration: true,
                google_data: Some(google_data.clone()),
                message: message.clone(),
                ..Self::default()
            },
            Err(err) => Self::failed(err),
        }
    }
}
