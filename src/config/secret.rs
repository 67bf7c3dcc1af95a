//! Secret values held in configuration
//!
//! Hash salts and the answer model API key are wrapped in `secrecy::Secret`
//! so they are zeroed on drop and never appear in `Debug` output. Reading one
//! requires an explicit `expose_secret()`.
//!
//! # Example
//!
//! ```rust
//! use shroud::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let salt = secret_string("pepper");
//! assert_eq!(salt.expose_secret().as_ref(), "pepper");
//! assert!(!format!("{salt:?}").contains("pepper"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// String newtype that can live inside a `Secret`
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl From<&str> for SecretValue {
    fn from(s: &str) -> Self {
        SecretValue(s.to_string())
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// A zeroize-on-drop string with redacted `Debug`
pub type SecretString = Secret<SecretValue>;

/// Wrap a value as a [`SecretString`]
#[inline]
pub fn secret_string(value: impl Into<String>) -> SecretString {
    Secret::new(SecretValue::from(value.into()))
}

/// Wrap an optional value, treating an empty string as absent
#[inline]
pub fn secret_string_opt(value: Option<String>) -> Option<SecretString> {
    value.filter(|s| !s.is_empty()).map(secret_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_secret_string_creation() {
        let secret = secret_string("salt-value");
        assert_eq!(secret.expose_secret(), "salt-value");
        assert_eq!(secret.expose_secret().len(), 10);
    }

    #[test]
    fn test_secret_string_opt() {
        assert!(secret_string_opt(Some("key".to_string())).is_some());
        assert!(secret_string_opt(Some(String::new())).is_none());
        assert!(secret_string_opt(None).is_none());
    }

    #[test]
    fn test_secret_debug_redacted() {
        let secret = secret_string("sensitive-salt");
        let debug_output = format!("{secret:?}");
        assert!(!debug_output.contains("sensitive-salt"));
    }

    #[test]
    fn test_secret_deserializes_from_toml() {
        #[derive(Deserialize)]
        struct Section {
            salt: SecretString,
        }

        let section: Section = toml::from_str("salt = \"abc\"").unwrap();
        let salt: &str = section.salt.expose_secret().as_ref();
        assert_eq!(salt, "abc");
    }
}
