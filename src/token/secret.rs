use serde::Deserialize;
use std::fmt;

/// A MAC key, or the deliberate absence of one.
///
/// An absent secret is a legal key: it signs and verifies with an empty HMAC
/// key. This lets a deployment that has not been given a secret yet rotate
/// onto one later, by listing `Secret::none()` among the retired secrets.
///
/// `Debug` never prints the key material.
///
/// # Example
///
/// ```rust
/// use cellar::Secret;
///
/// let current = Secret::from("new-secret");
/// let unset = Secret::from(None::<String>);
///
/// assert!(!current.is_absent());
/// assert!(unset.is_absent());
/// assert_eq!(format!("{current:?}"), "Secret(<redacted>)");
/// ```
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Option<String>")]
pub struct Secret(Option<Vec<u8>>);

impl Secret {
    pub fn new(key: impl AsRef<[u8]>) -> Self {
        Self(Some(key.as_ref().to_vec()))
    }

    /// The "no secret yet" key.
    pub fn none() -> Self {
        Self(None)
    }

    pub fn is_absent(&self) -> bool {
        self.0.is_none()
    }

    /// Key bytes handed to the MAC; empty when absent.
    pub(crate) fn key(&self) -> &[u8] {
        self.0.as_deref().unwrap_or_default()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("Secret(<redacted>)"),
            None => f.write_str("Secret(None)"),
        }
    }
}

impl From<&str> for Secret {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for Secret {
    fn from(key: String) -> Self {
        Self(Some(key.into_bytes()))
    }
}

impl From<&[u8]> for Secret {
    fn from(key: &[u8]) -> Self {
        Self::new(key)
    }
}

impl<const N: usize> From<&[u8; N]> for Secret {
    fn from(key: &[u8; N]) -> Self {
        Self::new(key)
    }
}

impl From<Vec<u8>> for Secret {
    fn from(key: Vec<u8>) -> Self {
        Self(Some(key))
    }
}

impl<T: Into<Secret>> From<Option<T>> for Secret {
    fn from(key: Option<T>) -> Self {
        key.map_or_else(Self::none, Into::into)
    }
}
