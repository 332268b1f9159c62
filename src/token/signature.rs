//! HMAC-SHA256 token signatures and candidate-key verification.
//!
//! The signed message mirrors the token layout:
//!
//! ```text
//! mac = HMAC-SHA256(secret, nonce || "-" || expiry || "-" || canonical_params)
//! signature = base64(mac[..30])   // exactly 40 symbols, never padded
//! ```
//!
//! Verification walks an ordered list of candidate secrets (current first,
//! then retired ones) and stops at the first match.

use crate::token::codec::DELIMITER;
use crate::token::error::CellarError;
use crate::token::secret::Secret;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Leading MAC bytes kept in a signature; 30 bytes encode to 40 symbols.
pub const SIGNATURE_BYTES: usize = 30;

/// Sign a token's fields with one secret.
///
/// # Example
///
/// ```rust
/// use cellar::{Params, Secret};
/// use cellar::signature::{sign, verify};
///
/// let secret = Secret::from("our-secret");
/// let params = Params::new().with("email", "a@b.com").canonicalize();
/// let signature = sign(&secret, "abcdEFGH0123+/xy", 1_700_000_000, &params)?;
///
/// assert_eq!(signature.len(), 40);
/// assert_eq!(
///     verify([&secret], "abcdEFGH0123+/xy", 1_700_000_000, &params, &signature),
///     Some(0)
/// );
/// # Ok::<(), cellar::CellarError>(())
/// ```
pub fn sign(
    secret: &Secret,
    nonce: &str,
    expiry: u64,
    canonical_params: &[u8],
) -> Result<String, CellarError> {
    let mac = keyed_message(secret, nonce, expiry, canonical_params)?;
    let digest = mac.finalize().into_bytes();
    Ok(base64::engine::general_purpose::STANDARD.encode(&digest[..SIGNATURE_BYTES]))
}

/// Check a signature against each candidate secret in order.
///
/// Returns the index of the first candidate that reproduces `signature`,
/// or `None` if none does. Each comparison is constant-time. A signature
/// that is not valid base64 of the right length matches nothing, and so
/// does a candidate whose MAC cannot be constructed.
pub fn verify<'a, I>(
    candidates: I,
    nonce: &str,
    expiry: u64,
    canonical_params: &[u8],
    signature: &str,
) -> Option<usize>
where
    I: IntoIterator<Item = &'a Secret>,
{
    let presented = base64::engine::general_purpose::STANDARD
        .decode(signature)
        .ok()
        .filter(|bytes| bytes.len() == SIGNATURE_BYTES)?;

    candidates.into_iter().position(|secret| {
        keyed_message(secret, nonce, expiry, canonical_params)
            .map(|mac| mac.verify_truncated_left(&presented).is_ok())
            .unwrap_or(false)
    })
}

/// Build an HMAC instance already fed with the token's signed fields.
fn keyed_message(
    secret: &Secret,
    nonce: &str,
    expiry: u64,
    canonical_params: &[u8],
) -> Result<HmacSha256, CellarError> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.key())
        .map_err(|e| CellarError::CryptoError(format!("Invalid HMAC key: {e}")))?;

    mac.update(nonce.as_bytes());
    mac.update(&[DELIMITER as u8]);
    mac.update(expiry.to_string().as_bytes());
    mac.update(&[DELIMITER as u8]);
    mac.update(canonical_params);
    Ok(mac)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::params::Params;

    const NONCE: &str = "abcdEFGH0123+/xy";
    const EXPIRY: u64 = 1_700_000_000;

    #[test]
    fn test_signature_shape() {
        let signature = sign(&Secret::from("key"), NONCE, EXPIRY, b"").unwrap();
        assert_eq!(signature.len(), 40);
        assert!(
            signature
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/')
        );
    }

    #[test]
    fn test_signing_is_deterministic() {
        let secret = Secret::from("key");
        assert_eq!(
            sign(&secret, NONCE, EXPIRY, b"").unwrap(),
            sign(&secret, NONCE, EXPIRY, b"").unwrap()
        );
    }

    #[test]
    fn test_every_field_is_bound() {
        let secret = Secret::from("key");
        let params = Params::new().with("email", "a@b.com").canonicalize();
        let base = sign(&secret, NONCE, EXPIRY, &params).unwrap();

        assert_ne!(base, sign(&Secret::from("other"), NONCE, EXPIRY, &params).unwrap());
        assert_ne!(base, sign(&secret, "abcdEFGH0123+/xz", EXPIRY, &params).unwrap());
        assert_ne!(base, sign(&secret, NONCE, EXPIRY + 1, &params).unwrap());
        assert_ne!(base, sign(&secret, NONCE, EXPIRY, b"").unwrap());
    }

    #[test]
    fn test_expiry_does_not_bleed_into_params() {
        let secret = Secret::from("key");
        // Without a separator "1" + "23:..." and "12" + "3:..." would sign the same bytes.
        let a = sign(&secret, NONCE, 1, b"23:x").unwrap();
        let b = sign(&secret, NONCE, 12, b"3:x").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_absent_secret_signs_with_empty_key() {
        let absent = sign(&Secret::none(), NONCE, EXPIRY, b"").unwrap();
        let empty = sign(&Secret::from(""), NONCE, EXPIRY, b"").unwrap();
        assert_eq!(absent, empty);
        assert_eq!(
            verify([&Secret::none()], NONCE, EXPIRY, b"", &absent),
            Some(0)
        );
    }

    #[test]
    fn test_verify_returns_first_matching_candidate() {
        let oldest = Secret::from("oldest-secret");
        let older = Secret::from("older-secret");
        let current = Secret::from("new-secret");
        let candidates = [current.clone(), Secret::none(), oldest.clone(), older.clone()];

        let signature = sign(&older, NONCE, EXPIRY, b"").unwrap();
        assert_eq!(verify(&candidates, NONCE, EXPIRY, b"", &signature), Some(3));

        let signature = sign(&current, NONCE, EXPIRY, b"").unwrap();
        assert_eq!(verify(&candidates, NONCE, EXPIRY, b"", &signature), Some(0));
    }

    #[test]
    fn test_verify_rejects_unknown_secret() {
        let signature = sign(&Secret::from("retired-not-valid"), NONCE, EXPIRY, b"").unwrap();
        let candidates = [Secret::from("new-secret"), Secret::from("older-secret")];
        assert_eq!(verify(&candidates, NONCE, EXPIRY, b"", &signature), None);
    }

    #[test]
    fn test_verify_with_no_candidates() {
        let signature = sign(&Secret::from("key"), NONCE, EXPIRY, b"").unwrap();
        assert_eq!(verify(std::iter::empty(), NONCE, EXPIRY, b"", &signature), None);
    }

    #[test]
    fn test_verify_rejects_undecodable_signatures() {
        let secret = Secret::from("key");
        assert_eq!(verify([&secret], NONCE, EXPIRY, b"", "not base64!"), None);
        assert_eq!(verify([&secret], NONCE, EXPIRY, b"", "AAAA"), None);
        assert_eq!(verify([&secret], NONCE, EXPIRY, b"", ""), None);
    }

    #[test]
    fn test_verify_detects_single_character_change() {
        let secret = Secret::from("key");
        let signature = sign(&secret, NONCE, EXPIRY, b"").unwrap();

        let mut tampered: Vec<u8> = signature.clone().into_bytes();
        tampered[10] = if tampered[10] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(tampered).unwrap();

        assert_eq!(verify([&secret], NONCE, EXPIRY, b"", &tampered), None);
    }
}
