//! API key loading from the environment or a local key file.

use crate::error::{Error, Result};
use std::fmt;
use std::path::Path;

/// Default environment variable holding the API key.
pub const DEFAULT_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Default key file, looked up relative to the working directory.
pub const DEFAULT_KEY_FILE: &str = "google_api_key.txt";

/// Geocoding service API key. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a raw key, rejecting blank values.
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            return Err(Error::missing_credential("API key is empty"));
        }
        Ok(Self(key))
    }

    /// Raw key value for building requests.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Load the API key from `env_var`, falling back to the contents of `key_file`.
///
/// # Errors
///
/// Returns [`Error::MissingCredential`] when neither source yields a
/// non-empty key.
pub fn load_api_key(env_var: &str, key_file: &Path) -> Result<ApiKey> {
    let from_env = std::env::var(env_var).ok();
    resolve_api_key(from_env.as_deref(), env_var, key_file)
}

fn resolve_api_key(env_value: Option<&str>, env_var: &str, key_file: &Path) -> Result<ApiKey> {
    if let Some(key) = env_value.map(str::trim).filter(|k| !k.is_empty()) {
        tracing::debug!(source = env_var, "using API key from environment");
        return ApiKey::new(key);
    }

    if key_file.exists() {
        let contents = std::fs::read_to_string(key_file)?;
        if !contents.trim().is_empty() {
            tracing::debug!(source = %key_file.display(), "using API key from file");
            return ApiKey::new(contents);
        }
    }

    Err(Error::missing_credential(format!(
        "API key not found. Set the {env_var} environment variable \
         or put the key into {}",
        key_file.display()
    )))
}
