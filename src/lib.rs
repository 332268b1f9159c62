//! # Cellar
//!
//! Stateless, expiring, HMAC-signed tokens with secret rotation.
//!
//! A token binds a random nonce, an expiry timestamp and an optional set of
//! key/value params under HMAC-SHA256. Everything needed to check it later
//! travels in the token itself, so nothing is stored server-side. Typical
//! uses are signed links and one-time confirmations.
//!
//! ## Features
//!
//! - **Self-contained tokens**: `<nonce>-<expiry>-<signature>`, safe in URLs and headers
//! - **Bound params**: sign extra key/value data (e.g. an email address) without
//!   putting it in the token; key order never matters
//! - **Secret rotation**: accept tokens signed under retired secrets while
//!   issuing new ones under the current secret
//! - **Total parsing**: malformed input never panics, every predicate returns a `bool`
//! - **Injectable clock and randomness** for deterministic tests
//!
//! ## Quick Start
//!
//! ```rust
//! use cellar::{Cellar, Params};
//!
//! # fn example() -> Result<(), cellar::CellarError> {
//! let cellar = Cellar::new("our-secret");
//!
//! // Short-lived token with no params
//! let token = cellar.generate_with(Some(2), &Params::new())?;
//! assert!(cellar.is_valid(&token, &Params::new()));
//!
//! // Already-expired token
//! let token = cellar.generate_with(Some(0), &Params::new())?;
//! assert!(!cellar.is_valid(&token, &Params::new()));
//! assert!(cellar.has_expired(&token));
//!
//! // Token bound to params
//! let params = Params::new().with("email", "a@b.com");
//! let token = cellar.generate_with(Some(3600), &params)?;
//! assert!(cellar.is_valid(&token, &params));
//! assert!(cellar.has_tampered(&token, &Params::new()));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Secret Rotation
//!
//! ```rust
//! use cellar::{Cellar, Params};
//!
//! # fn example() -> Result<(), cellar::CellarError> {
//! let old = Cellar::new("older-secret");
//! let token = old.generate()?;
//!
//! let rotated = Cellar::builder("new-secret")
//!     .with_old_secrets([None, Some("oldest-secret"), Some("older-secret")])
//!     .build();
//! assert!(rotated.is_valid(&token, &Params::new()));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Configuration
//!
//! The default lifetime is one hour. [`ConfigPreset::FromEnv`] reads it from
//! the `CELLAR_LIFETIME` environment variable:
//!
//! ```bash
//! export CELLAR_LIFETIME=900
//! ```
//!
//! ## Architecture
//!
//! - **[`codec`]**: token string grammar, nonce minting
//! - **[`params`]**: order-insensitive params and their canonical bytes
//! - **[`signature`]**: HMAC-SHA256 signing and candidate-secret verification
//! - **[`Cellar`]**: the facade tying them together with the expiry policy
//! - **[`CellarError`]**: failure reasons for `generate` and `verify`

pub mod token;

// Re-export commonly used types
pub use token::{
    Cellar, CellarBuilder, CellarConfig, CellarError, ConfigPreset, Params, Secret, Token,
};
pub use token::{codec, params, signature};
