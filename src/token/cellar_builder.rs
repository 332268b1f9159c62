use crate::token::config::{CellarConfig, ConfigPreset};
use crate::token::error::CellarError;
use crate::token::secret::Secret;
use crate::token::time_utils::current_timestamp;
use crate::token::Cellar;
use rand::RngCore;
use rand::rngs::OsRng;

/// A function that provides the current Unix timestamp in seconds.
pub type TimeProviderFn = Box<dyn Fn() -> Result<u64, CellarError> + Send + Sync>;

/// A function that fills a buffer with cryptographically random bytes.
pub type RandomSourceFn = Box<dyn Fn(&mut [u8]) + Send + Sync>;

/// A builder for creating a [`Cellar`] instance.
///
/// Beyond what [`CellarConfig`] covers, the builder is where the clock and
/// the randomness source are swapped out, typically to make tests
/// deterministic.
///
/// # Example
///
/// ```rust
/// use cellar::Cellar;
///
/// let cellar = Cellar::builder("new-secret")
///     .with_lifetime(600)
///     .with_old_secrets([Some("older-secret"), None])
///     .with_time_provider(|| Ok(1_700_000_000))
///     .build();
///
/// let token = cellar.generate()?;
/// assert!(token.contains("-1700000600-"));
/// # Ok::<(), cellar::CellarError>(())
/// ```
#[must_use = "The builder does nothing unless `.build()` is called."]
pub struct CellarBuilder {
    secret: Secret,
    config: CellarConfig,
    time_provider: Option<TimeProviderFn>,
    random_source: Option<RandomSourceFn>,
}

impl CellarBuilder {
    pub(crate) fn new(secret: Secret) -> Self {
        Self {
            secret,
            config: CellarConfig::default(),
            time_provider: None,
            random_source: None,
        }
    }

    /// Replaces the whole configuration.
    pub fn with_config(mut self, config: CellarConfig) -> Self {
        self.config = config;
        self
    }

    /// Starts from one of the predefined presets.
    ///
    /// Retired secrets already set on the builder are kept.
    pub fn with_preset(mut self, preset: ConfigPreset) -> Self {
        self.config.lifetime = CellarConfig::from(preset).lifetime;
        self
    }

    /// Sets the default token lifetime in seconds.
    ///
    /// If not set, defaults to 1 hour.
    pub fn with_lifetime(mut self, lifetime: u64) -> Self {
        self.config.lifetime = lifetime;
        self
    }

    /// Sets the retired secrets, in the order they should be tried.
    pub fn with_old_secrets<I, S>(mut self, old_secrets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Secret>,
    {
        self.config.old_secrets = old_secrets.into_iter().map(Into::into).collect();
        self
    }

    /// Appends one retired secret after those already configured.
    pub fn with_old_secret(mut self, old_secret: impl Into<Secret>) -> Self {
        self.config.old_secrets.push(old_secret.into());
        self
    }

    /// Sets a custom time provider function.
    ///
    /// The default provider reads the system clock.
    pub fn with_time_provider<F>(mut self, provider: F) -> Self
    where
        F: Fn() -> Result<u64, CellarError> + Send + Sync + 'static,
    {
        self.time_provider = Some(Box::new(provider));
        self
    }

    /// Sets a custom randomness source for nonces.
    ///
    /// The default source is the operating system's CSPRNG. A replacement
    /// must be just as unpredictable outside of tests.
    pub fn with_random_source<F>(mut self, source: F) -> Self
    where
        F: Fn(&mut [u8]) + Send + Sync + 'static,
    {
        self.random_source = Some(Box::new(source));
        self
    }

    /// Builds the `Cellar`, logging any configuration warnings.
    pub fn build(self) -> Cellar {
        for warning in self.config.validate() {
            tracing::warn!("{}", warning);
        }
        if self.config.old_secrets.contains(&self.secret) {
            tracing::warn!("Current secret is also listed among the retired secrets");
        }

        let time_provider: TimeProviderFn = match self.time_provider {
            Some(provider) => provider,
            None => Box::new(current_timestamp),
        };
        let random_source: RandomSourceFn = match self.random_source {
            Some(source) => source,
            None => Box::new(|buf: &mut [u8]| OsRng.fill_bytes(buf)),
        };

        Cellar::new_internal(self.secret, self.config, time_provider, random_source)
    }
}
