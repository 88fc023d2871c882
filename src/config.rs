//! Backend endpoint configuration.
//!
//! The base URL is resolved from the runtime environment first, then from the
//! value baked in at compile time (the only option inside a wasm bundle), then
//! from the local development default.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const API_URL_ENV: &str = "TOURBOOK_API_URL";
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Absolute backend base URL without a trailing slash.
    pub base_url: String,
}

impl ApiConfig {
    /// Build a config from an explicit base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is empty or not `http(s)://`.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self { base_url: parse_base_url(base_url)? })
    }

    /// Build typed config from the environment.
    ///
    /// Optional:
    /// - `TOURBOOK_API_URL`: backend base URL (default `http://localhost:5000/api`)
    ///
    /// # Errors
    ///
    /// Returns an error if the configured URL is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var(API_URL_ENV)
            .ok()
            .or_else(|| option_env!("TOURBOOK_API_URL").map(str::to_owned));
        Self::new(raw.as_deref().unwrap_or(DEFAULT_API_URL))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_API_URL.to_owned() }
    }
}

fn parse_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid { var: API_URL_ENV, reason: "empty url".into() });
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::Invalid {
            var: API_URL_ENV,
            reason: format!("expected http:// or https:// url, got '{trimmed}'"),
        });
    }
    Ok(trimmed.to_owned())
}
