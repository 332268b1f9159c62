//! Caller-supplied parameters bound into a token's signature.
//!
//! Params never travel inside the token string. The issuer and the verifier
//! must each supply them, and only their canonical byte form is signed.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// An order-insensitive set of string key/value pairs.
///
/// Keys are kept sorted by their raw bytes, so two `Params` built from the
/// same pairs in a different order are equal and canonicalize identically.
/// Inserting an existing key replaces its value.
///
/// # Example
///
/// ```rust
/// use cellar::Params;
///
/// let a = Params::new().with("email", "a@b.com").with("plan", "pro");
/// let b: Params = [("plan", "pro"), ("email", "a@b.com")].into();
///
/// assert_eq!(a, b);
/// assert_eq!(a.canonicalize(), b.canonicalize());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a pair and returns the set, for chained construction.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts a pair, returning the previous value for that key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates pairs in canonical (sorted) order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The byte string that gets signed for this set. See [`canonicalize`].
    pub fn canonicalize(&self) -> Vec<u8> {
        canonicalize(self.iter())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Params {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl From<HashMap<String, String>> for Params {
    fn from(map: HashMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

impl From<BTreeMap<String, String>> for Params {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

/// Serialize key/value pairs into a deterministic byte string for signing.
///
/// Pairs are stably sorted by the key's raw bytes, then each key and each
/// value is written as a netstring (`<len>:<bytes>,`). Netstrings are
/// self-delimiting, so no choice of keys or values can make two different
/// sets collide, and no escaping is needed. An empty set produces an empty
/// byte string while any non-empty set produces at least `0:,0:,`.
pub fn canonicalize<I, K, V>(pairs: I) -> Vec<u8>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut pairs: Vec<(K, V)> = pairs.into_iter().collect();
    pairs.sort_by(|a, b| a.0.as_ref().as_bytes().cmp(b.0.as_ref().as_bytes()));

    let mut out = Vec::new();
    for (key, value) in &pairs {
        write_netstring(&mut out, key.as_ref().as_bytes());
        write_netstring(&mut out, value.as_ref().as_bytes());
    }
    out
}

fn write_netstring(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(bytes.len().to_string().as_bytes());
    out.push(b':');
    out.extend_from_slice(bytes);
    out.push(b',');
}
