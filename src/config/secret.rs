//! Endpoint credentials
//!
//! The tracking service-role key and the order webhook token are kept in
//! [`SecretString`]: zeroed on drop, redacted in `Debug`, readable only through
//! `expose_secret()`.
//!
//! ```rust
//! use marketsync::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let token = secret_string("service-role-key");
//! assert_eq!(token.expose_secret(), "service-role-key");
//! assert!(!format!("{token:?}").contains("service-role-key"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroize;

/// Bearer credential text
#[derive(Clone, Debug, Zeroize, Serialize, Deserialize)]
#[zeroize(drop)]
#[serde(transparent)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl SecretValue {
    /// True when the credential is empty or whitespace
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<String> for SecretValue {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

// Needed by `RequestBuilder::bearer_auth`.
impl fmt::Display for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub type SecretString = Secret<SecretValue>;

/// Wraps a credential
#[inline]
pub fn secret_string(value: impl Into<String>) -> SecretString {
    Secret::new(SecretValue::from(value.into()))
}
