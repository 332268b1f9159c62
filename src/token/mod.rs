// Core architecture components
mod cellar;
mod cellar_builder;
mod config;
mod error;
mod secret;
mod time_utils;

// Token format and signing
pub mod codec;
pub mod params;
pub mod signature;

// Core components exports
pub use cellar::Cellar;
pub use cellar_builder::{CellarBuilder, RandomSourceFn, TimeProviderFn};
pub use config::{CellarConfig, ConfigPreset, DEFAULT_LIFETIME, LIFETIME_ENV_VAR};
pub use error::CellarError;
pub use secret::Secret;
pub use time_utils::is_expired;

// Token format exports
pub use codec::{DELIMITER, NONCE_LENGTH, SIGNATURE_LENGTH, Token, decode, encode, is_canonical};
pub use signature::SIGNATURE_BYTES;
pub use params::{Params, canonicalize};
