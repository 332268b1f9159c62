use std::fmt;

use super::cellar_builder::{RandomSourceFn, TimeProviderFn};
use super::codec::{self, Token};
use super::params::Params;
use super::secret::Secret;
use super::signature;
use super::time_utils::expiry_after;
use super::{CellarBuilder, CellarConfig, CellarError};

/// Issues and checks self-contained, expiring, signed tokens.
///
/// A `Cellar` holds one current secret, an ordered list of retired secrets
/// and a default lifetime. Tokens are always signed with the current secret;
/// verification also accepts any retired secret, tried in configured order.
/// Nothing is stored between calls, so a `Cellar` can be shared freely
/// across threads (e.g. behind an `Arc`).
///
/// Every token moves through the same checks, evaluated fresh on each call:
///
/// ```text
/// well-formed? -> expired? -> signature matches?
/// ```
///
/// | predicate        | malformed | expired, signed | live, bad signature |
/// |------------------|-----------|-----------------|---------------------|
/// | `is_valid`       | false     | false           | false               |
/// | `has_expired`    | false     | true            | false               |
/// | `has_tampered`   | true      | false           | true                |
///
/// # Example
///
/// ```rust
/// use cellar::{Cellar, Params};
///
/// let cellar = Cellar::new("our-secret");
/// let params = Params::new().with("email", "a@b.com");
///
/// let token = cellar.generate_with(Some(3600), &params)?;
/// assert!(cellar.is_valid(&token, &params));
/// assert!(!cellar.is_valid(&token, &Params::new()));
/// # Ok::<(), cellar::CellarError>(())
/// ```
pub struct Cellar {
    secret: Secret,
    old_secrets: Vec<Secret>,
    lifetime: u64,
    time_provider: TimeProviderFn,
    random_source: RandomSourceFn,
}

impl Cellar {
    /// Creates a `Cellar` with the default configuration.
    pub fn new(secret: impl Into<Secret>) -> Self {
        Self::builder(secret).build()
    }

    /// Creates a `Cellar` with an explicit lifetime and retired secrets.
    pub fn with_config(secret: impl Into<Secret>, config: CellarConfig) -> Self {
        Self::builder(secret).with_config(config).build()
    }

    /// Creates a new `CellarBuilder` to construct a `Cellar`.
    pub fn builder(secret: impl Into<Secret>) -> CellarBuilder {
        CellarBuilder::new(secret.into())
    }

    /// Internal constructor used by the builder.
    pub(crate) fn new_internal(
        secret: Secret,
        config: CellarConfig,
        time_provider: TimeProviderFn,
        random_source: RandomSourceFn,
    ) -> Self {
        Self {
            secret,
            old_secrets: config.old_secrets,
            lifetime: config.lifetime,
            time_provider,
            random_source,
        }
    }

    /// Default lifetime in seconds for [`generate`](Self::generate).
    pub fn lifetime(&self) -> u64 {
        self.lifetime
    }

    /// Retired secrets, in the order verification tries them.
    pub fn old_secrets(&self) -> &[Secret] {
        &self.old_secrets
    }

    /// Issues a token with the default lifetime and no params.
    pub fn generate(&self) -> Result<String, CellarError> {
        self.generate_with(None, &Params::new())
    }

    /// Issues a token bound to `params`.
    ///
    /// `lifetime` falls back to the configured default. A lifetime of `0`
    /// yields a token that is already expired.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The time provider fails
    /// - `now + lifetime` overflows
    /// - The MAC cannot be constructed
    pub fn generate_with(
        &self,
        lifetime: Option<u64>,
        params: &Params,
    ) -> Result<String, CellarError> {
        let lifetime = lifetime.unwrap_or(self.lifetime);
        let expiry = expiry_after(self.now()?, lifetime)?;
        let nonce = codec::generate_nonce(|buf| (self.random_source)(buf));

        // Retired secrets are for verification only.
        let signature = signature::sign(&self.secret, &nonce, expiry, &params.canonicalize())?;

        tracing::debug!(expiry, params = params.len(), "Generated token");
        Ok(codec::encode(&nonce, expiry, &signature))
    }

    /// Checks a token and reports why it was rejected.
    ///
    /// On success the decoded [`Token`] is returned.
    ///
    /// # Errors
    ///
    /// - `MalformedToken` if the string does not follow the token grammar
    /// - `Expired` if the expiry has been reached
    /// - `InvalidSignature` if no candidate secret signed these fields and params
    /// - `ClockError` if the time provider fails
    pub fn verify(&self, token: &str, params: &Params) -> Result<Token, CellarError> {
        let parsed = codec::decode(token).ok_or_else(|| {
            tracing::debug!("Rejected malformed token");
            CellarError::MalformedToken
        })?;

        if parsed.is_expired_at(self.now()?) {
            tracing::debug!(expiry = parsed.expiry, "Rejected expired token");
            return Err(CellarError::Expired);
        }

        self.check_signature(&parsed, token, params)?;
        Ok(parsed)
    }

    /// True when the token is well-formed, unexpired and correctly signed
    /// for `params`.
    pub fn is_valid(&self, token: &str, params: &Params) -> bool {
        self.verify(token, params).is_ok()
    }

    /// True when a well-formed token has reached its expiry.
    ///
    /// A malformed token is reported as not expired. If the clock fails the
    /// token is treated as expired.
    pub fn has_expired(&self, token: &str) -> bool {
        let Some(parsed) = codec::decode(token) else {
            return false;
        };
        self.now().map_or(true, |now| parsed.is_expired_at(now))
    }

    /// True when no candidate secret reproduces the token's signature for
    /// `params`. Malformed tokens count as tampered; expiry is ignored.
    pub fn has_tampered(&self, token: &str, params: &Params) -> bool {
        match codec::decode(token) {
            Some(parsed) => self.check_signature(&parsed, token, params).is_err(),
            None => true,
        }
    }

    /// `raw` must be the canonical spelling of `token`: the signature covers
    /// the numeric expiry, so `-05-` would otherwise pass wherever `-5-` does.
    fn check_signature(
        &self,
        token: &Token,
        raw: &str,
        params: &Params,
    ) -> Result<(), CellarError> {
        if !codec::is_canonical(token, raw) {
            tracing::debug!(nonce = %token.nonce, "Rejected token with non-canonical expiry");
            return Err(CellarError::InvalidSignature);
        }

        let matched = signature::verify(
            self.candidates(),
            &token.nonce,
            token.expiry,
            &params.canonicalize(),
            &token.signature,
        );

        match matched {
            Some(0) => Ok(()),
            Some(index) => {
                tracing::debug!(retired_index = index - 1, "Token accepted under a retired secret");
                Ok(())
            }
            None => {
                tracing::debug!(nonce = %token.nonce, "Rejected token with invalid signature");
                Err(CellarError::InvalidSignature)
            }
        }
    }

    /// Current secret first, then retired secrets in configured order.
    fn candidates(&self) -> impl Iterator<Item = &Secret> {
        std::iter::once(&self.secret).chain(&self.old_secrets)
    }

    fn now(&self) -> Result<u64, CellarError> {
        (self.time_provider)().inspect_err(|e| {
            tracing::warn!("Time provider failed: {}", e);
        })
    }
}

impl fmt::Debug for Cellar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cellar")
            .field("secret", &self.secret)
            .field("old_secrets", &self.old_secrets)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    const START: u64 = 1_700_000_000;

    /// A cellar whose clock is driven by the returned handle.
    fn cellar_with_clock(secret: &str) -> (Cellar, Arc<AtomicU64>) {
        let clock = Arc::new(AtomicU64::new(START));
        let handle = Arc::clone(&clock);
        let cellar = Cellar::builder(secret)
            .with_time_provider(move || Ok(handle.load(Ordering::SeqCst)))
            .build();
        (cellar, clock)
    }

    #[test]
    fn test_token_expires_exactly_at_expiry() {
        let (cellar, clock) = cellar_with_clock("our-secret");
        let token = cellar.generate_with(Some(2), &Params::new()).unwrap();

        assert!(cellar.is_valid(&token, &Params::new()));
        assert!(!cellar.has_expired(&token));

        clock.store(START + 1, Ordering::SeqCst);
        assert!(cellar.is_valid(&token, &Params::new()));

        clock.store(START + 2, Ordering::SeqCst);
        assert!(!cellar.is_valid(&token, &Params::new()));
        assert!(cellar.has_expired(&token));
        assert!(!cellar.has_tampered(&token, &Params::new()));
    }

    #[test]
    fn test_verify_error_kinds() {
        let (cellar, clock) = cellar_with_clock("our-secret");
        let params = Params::new().with("email", "a@b.com");
        let token = cellar.generate_with(Some(10), &params).unwrap();

        let parsed = cellar.verify(&token, &params).unwrap();
        assert_eq!(parsed.expiry, START + 10);
        assert_eq!(parsed.to_string(), token);

        assert!(matches!(
            cellar.verify("some random string", &params),
            Err(CellarError::MalformedToken)
        ));
        assert!(matches!(
            cellar.verify(&token, &Params::new()),
            Err(CellarError::InvalidSignature)
        ));

        clock.store(START + 10, Ordering::SeqCst);
        assert!(matches!(
            cellar.verify(&token, &params),
            Err(CellarError::Expired)
        ));
    }

    #[test]
    fn test_expiry_is_checked_before_signature() {
        let (cellar, _clock) = cellar_with_clock("our-secret");
        let forged = codec::encode("AAAAAAAAAAAAAAAA", START, &"A".repeat(40));

        assert!(matches!(
            cellar.verify(&forged, &Params::new()),
            Err(CellarError::Expired)
        ));
        assert!(cellar.has_expired(&forged));
        assert!(cellar.has_tampered(&forged, &Params::new()));
    }

    #[test]
    fn test_leading_zero_expiry_is_expired_and_tampered() {
        let (cellar, _clock) = cellar_with_clock("our-secret");
        let token = format!("{}-05-{}", "A".repeat(16), "A".repeat(40));

        assert!(cellar.has_expired(&token));
        assert!(cellar.has_tampered(&token, &Params::new()));
        assert!(matches!(
            cellar.verify(&token, &Params::new()),
            Err(CellarError::Expired)
        ));
    }

    #[test]
    fn test_respelled_expiry_breaks_signature() {
        let (cellar, _clock) = cellar_with_clock("our-secret");
        let token = cellar.generate_with(Some(60), &Params::new()).unwrap();
        let respelled = token.replacen(
            &format!("-{}-", START + 60),
            &format!("-0{}-", START + 60),
            1,
        );
        assert_ne!(respelled, token);

        assert!(!cellar.has_expired(&respelled));
        assert!(cellar.has_tampered(&respelled, &Params::new()));
        assert!(matches!(
            cellar.verify(&respelled, &Params::new()),
            Err(CellarError::InvalidSignature)
        ));
        assert!(cellar.is_valid(&token, &Params::new()));
    }

    #[test]
    fn test_overflowing_expiry_never_expires() {
        let (cellar, clock) = cellar_with_clock("our-secret");
        let token = format!("{}-99999999999999999999999-{}", "A".repeat(16), "A".repeat(40));

        assert!(!cellar.has_expired(&token));
        clock.store(u64::MAX - 1, Ordering::SeqCst);
        assert!(!cellar.has_expired(&token));
        assert!(cellar.has_tampered(&token, &Params::new()));
        assert!(matches!(
            cellar.verify(&token, &Params::new()),
            Err(CellarError::InvalidSignature)
        ));
    }

    #[test]
    fn test_generate_reports_lifetime_overflow() {
        let cellar = Cellar::builder("our-secret")
            .with_time_provider(|| Ok(u64::MAX - 5))
            .build();

        assert!(matches!(
            cellar.generate_with(Some(10), &Params::new()),
            Err(CellarError::LifetimeOverflow(10))
        ));
    }

    #[test]
    fn test_clock_failure() {
        let cellar = Cellar::builder("our-secret")
            .with_time_provider(|| Err(CellarError::ClockError("no clock".to_string())))
            .build();
        let (healthy, _clock) = cellar_with_clock("our-secret");
        let token = healthy.generate().unwrap();

        assert!(matches!(
            cellar.generate(),
            Err(CellarError::ClockError(_))
        ));
        assert!(matches!(
            cellar.verify(&token, &Params::new()),
            Err(CellarError::ClockError(_))
        ));
        assert!(!cellar.is_valid(&token, &Params::new()));
        assert!(cellar.has_expired(&token));
        // Tampering does not depend on the clock.
        assert!(!cellar.has_tampered(&token, &Params::new()));
    }

    #[test]
    fn test_generate_signs_with_current_secret_only() {
        let cellar = Cellar::builder("new-secret")
            .with_old_secrets(["older-secret"])
            .build();
        let token = cellar.generate().unwrap();

        let current_only = Cellar::new("new-secret");
        let retired_only = Cellar::new("older-secret");
        assert!(current_only.is_valid(&token, &Params::new()));
        assert!(!retired_only.is_valid(&token, &Params::new()));
    }

    #[test]
    fn test_deterministic_with_injected_collaborators() {
        let build = || {
            Cellar::builder("our-secret")
                .with_time_provider(|| Ok(START))
                .with_random_source(|buf| buf.fill(7))
                .build()
        };

        let params = Params::new().with("email", "a@b.com");
        assert_eq!(
            build().generate_with(Some(60), &params).unwrap(),
            build().generate_with(Some(60), &params).unwrap()
        );
    }

    #[test]
    fn test_debug_hides_secrets() {
        let cellar = Cellar::builder("hunter2").with_old_secret("hunter1").build();
        let debug = format!("{cellar:?}");
        assert!(!debug.contains("hunter"));
        assert!(debug.contains("lifetime: 3600"));
    }

    #[test]
    fn test_cellar_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Cellar>();
    }
}
