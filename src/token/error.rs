use thiserror::Error;

/// Error types that can occur while generating or verifying tokens.
///
/// The boolean predicates on [`Cellar`](crate::Cellar) never surface these;
/// they are returned by [`Cellar::generate`](crate::Cellar::generate) and by
/// the detailed [`Cellar::verify`](crate::Cellar::verify).
///
/// # Error Categories
///
/// - **Verification Errors**: `MalformedToken`, `Expired`, `InvalidSignature`
/// - **System Errors**: `LifetimeOverflow`, `ClockError`, `CryptoError`
///
/// # Example
///
/// ```rust
/// use cellar::{Cellar, CellarError, Params};
///
/// let cellar = Cellar::new("our-secret");
/// let token = cellar.generate_with(Some(0), &Params::new())?;
///
/// match cellar.verify(&token, &Params::new()) {
///     Ok(_) => println!("Token accepted"),
///     Err(CellarError::Expired) => println!("Token expired"),
///     Err(CellarError::InvalidSignature) => println!("Token tampered"),
///     Err(e) => println!("Other error: {e}"),
/// }
/// # Ok::<(), CellarError>(())
/// ```
#[derive(Error, Debug)]
pub enum CellarError {
    /// The token string does not follow the `<nonce>-<expiry>-<signature>` grammar.
    ///
    /// Wrong segment count, wrong segment length, characters outside the
    /// base64 alphabet or a non-numeric expiry all end up here.
    #[error("Malformed token")]
    MalformedToken,

    /// The embedded expiry timestamp is not in the future.
    #[error("Token expired")]
    Expired,

    /// No candidate secret reproduces the token's signature.
    ///
    /// # When This Occurs
    ///
    /// - The token was issued under a secret this instance does not know
    /// - The nonce, expiry or signature were edited in transit
    /// - The params supplied for verification differ from the ones signed
    #[error("Invalid signature")]
    InvalidSignature,

    /// `now + lifetime` does not fit in a Unix timestamp.
    #[error("Lifetime of {0}s overflows the expiry timestamp")]
    LifetimeOverflow(u64),

    /// The time provider could not produce a timestamp.
    #[error("Clock error: {0}")]
    ClockError(String),

    /// The MAC could not be constructed.
    #[error("Crypto error: {0}")]
    CryptoError(String),
}
