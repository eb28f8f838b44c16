//! User-supplied API credential.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Opaque secret authorizing calls to the completion endpoint.
///
/// Backed by [`SecretString`], so the value is zeroized when dropped and
/// never shows up in `Debug` output.
pub struct Credential(SecretString);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::new(value.into()))
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::new(String::new())
    }

    /// Blank or whitespace-only values count as no credential at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().trim().is_empty()
    }

    /// The raw value, for building an `Authorization` header and nothing else.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Drop the current value (zeroizing it) and leave an empty credential.
    pub fn clear(&mut self) {
        *self = Self::empty();
    }

    /// Short form safe to print: first and last four characters.
    #[must_use]
    pub fn masked(&self) -> String {
        let value = self.0.expose_secret();
        let chars: Vec<char> = value.chars().collect();
        if chars.is_empty() {
            "(not set)".to_string()
        } else if chars.len() > 8 {
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("{head}...{tail}")
        } else {
            "***".to_string()
        }
    }
}

impl Clone for Credential {
    fn clone(&self) -> Self {
        Self::new(self.0.expose_secret().clone())
    }
}

impl Default for Credential {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

impl From<String> for Credential {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
