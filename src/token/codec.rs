//! The token string format: `<nonce>-<expiry>-<signature>`.
//!
//! ```text
//! nonce     : 16 chars of [A-Za-z0-9+/]
//! expiry    : decimal Unix seconds, [0-9]+
//! signature : 40 chars of [A-Za-z0-9+/]
//! ```
//!
//! The delimiter `-` is outside the base64 alphabet and never appears in a
//! decimal number, so splitting on it is unambiguous.
//!
//! Decoding accepts any run of digits for the expiry. Only the form written
//! by [`encode`] (no leading zeros, within `u64`) is *canonical*; see
//! [`is_canonical`]. Values past `u64::MAX` saturate, so they never expire.

use crate::token::error::CellarError;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of characters in a nonce.
pub const NONCE_LENGTH: usize = 16;

/// Number of characters in a signature.
pub const SIGNATURE_LENGTH: usize = 40;

/// Separator between the three token fields.
pub const DELIMITER: char = '-';

/// Random bytes consumed per nonce; 12 bytes encode to exactly 16 symbols.
const NONCE_BYTES: usize = NONCE_LENGTH / 4 * 3;

/// The three fields carried by a token string.
///
/// A `Token` is what [`decode`] hands back and what
/// [`Cellar::verify`](crate::Cellar::verify) returns on success. Its
/// `Display` form is the token string itself.
///
/// # Example
///
/// ```rust
/// use cellar::Token;
///
/// let raw = format!("{}-1700000000-{}", "A".repeat(16), "B".repeat(40));
/// let token: Token = raw.parse()?;
///
/// assert_eq!(token.expiry, 1_700_000_000);
/// assert_eq!(token.to_string(), raw);
/// # Ok::<(), cellar::CellarError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Random value making every issued token unique.
    pub nonce: String,

    /// Unix timestamp (seconds) from which the token is rejected.
    pub expiry: u64,

    /// Base64-alphabet MAC over nonce, expiry and params.
    pub signature: String,
}

impl Token {
    /// Whether this token is expired at `now`.
    pub fn is_expired_at(&self, now: u64) -> bool {
        crate::token::time_utils::is_expired(self.expiry, now)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{DELIMITER}{}{DELIMITER}{}",
            self.nonce, self.expiry, self.signature
        )
    }
}

impl FromStr for Token {
    type Err = CellarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s).ok_or(CellarError::MalformedToken)
    }
}

/// Join the three fields into a token string.
pub fn encode(nonce: &str, expiry: u64, signature: &str) -> String {
    format!("{nonce}{DELIMITER}{expiry}{DELIMITER}{signature}")
}

/// Whether `raw` is exactly the string [`encode`] would produce for `token`.
///
/// Signatures cover the numeric expiry, so `05` and `5` decode alike. A
/// verifier that requires canonical text keeps a token's string from being
/// respelled without breaking its signature.
pub fn is_canonical(token: &Token, raw: &str) -> bool {
    token.to_string() == raw
}

/// Split a token string into its fields.
///
/// Returns `None` for anything that does not match the grammar exactly.
/// This never panics, whatever the input.
pub fn decode(token: &str) -> Option<Token> {
    let mut parts = token.split(DELIMITER);
    let (nonce, expiry, signature) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    if !is_base64_field(nonce, NONCE_LENGTH) || !is_base64_field(signature, SIGNATURE_LENGTH) {
        return None;
    }

    Some(Token {
        nonce: nonce.to_string(),
        expiry: parse_expiry(expiry)?,
        signature: signature.to_string(),
    })
}

/// Mint a nonce from the given randomness source.
pub fn generate_nonce<R>(random_source: R) -> String
where
    R: FnOnce(&mut [u8]),
{
    let mut bytes = [0u8; NONCE_BYTES];
    random_source(&mut bytes);
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

fn is_base64_field(field: &str, length: usize) -> bool {
    field.len() == length
        && field
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/')
}

fn parse_expiry(field: &str) -> Option<u64> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // Digits only, so the sole parse failure left is overflow.
    Some(field.parse().unwrap_or(u64::MAX))
}
