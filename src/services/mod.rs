//! Session services.
//!
//! DESIGN
//! ======
//! `session` drives the lifecycle through the backend, provider and storage
//! seams; `outcome` holds what operations hand back to callers.

pub mod outcome;
pub mod session;
