//! Persistent credential storage (`localStorage` in the browser).
//!
//! SYSTEM CONTEXT
//! ==============
//! The persisted record is two plain string keys, `token` and `user`, with no
//! versioning or expiry; the backend re-validates the token on every boot.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::net::types::User;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("storage is not available")]
    Unavailable,
    #[error("storage write failed: {0}")]
    Write(String),
}

/// Durable string key/value storage that survives page reloads.
pub trait CredentialStore {
    fn get(&self, key: &str) -> Option<String>;

    /// # Errors
    ///
    /// Returns an error if the backing storage is missing or rejects the write.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str);
}

/// In-process store for native builds and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let items = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { items: RefCell::new(items) }
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.items.borrow_mut().remove(key);
    }
}

/// Browser `window.localStorage`.
#[cfg(feature = "hydrate")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

#[cfg(feature = "hydrate")]
impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok().flatten())
    }
}

#[cfg(feature = "hydrate")]
impl CredentialStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let storage = Self::storage().ok_or(StorageError::Unavailable)?;
        storage
            .set_item(key, value)
            .map_err(|e| StorageError::Write(format!("{e:?}")))
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(key);
        }
    }
}

// =============================================================================
// CREDENTIAL RECORD
// =============================================================================

/// Raw persisted credentials. `user` stays serialized; boot replaces it with
/// the server's copy anyway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    pub token: String,
    pub user: String,
}

/// Read the credential record; `None` unless both keys are present.
pub fn load_credentials(store: &impl CredentialStore) -> Option<StoredCredentials> {
    let token = store.get(TOKEN_KEY)?;
    let user = store.get(USER_KEY)?;
    Some(StoredCredentials { token, user })
}

/// Write `token` verbatim and `user` as JSON.
///
/// # Errors
///
/// Returns an error if serialization or either write fails.
pub fn persist_credentials(store: &impl CredentialStore, token: &str, user: &User) -> Result<(), StorageError> {
    store.set(TOKEN_KEY, token)?;
    persist_user(store, user)
}

/// Rewrite only the serialized user.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn persist_user(store: &impl CredentialStore, user: &User) -> Result<(), StorageError> {
    let raw = serde_json::to_string(user).map_err(|e| StorageError::Write(e.to_string()))?;
    store.set(USER_KEY, &raw)
}

pub fn clear_credentials(store: &impl CredentialStore) {
    store.remove(TOKEN_KEY);
    store.remove(USER_KEY);
}
