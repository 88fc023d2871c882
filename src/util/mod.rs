//! Utility helpers shared across the session layer.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules isolate browser/environment concerns (storage, Leptos
//! reactivity) from the session logic to improve reuse and testability.

pub mod auth;
pub mod storage;
