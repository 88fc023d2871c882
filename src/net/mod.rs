//! Networking modules for the credential backend and identity provider.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` handles REST calls, `identity` wraps the federated sign-in popup, and
//! `types` defines the shared wire schema.

pub mod api;
pub mod identity;
pub mod types;
