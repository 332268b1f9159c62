use crate::token::secret::Secret;
use serde::Deserialize;

/// Lifetime used when neither the caller nor the configuration picks one.
pub const DEFAULT_LIFETIME: u64 = 3600;

/// Environment variable read by [`ConfigPreset::FromEnv`].
pub const LIFETIME_ENV_VAR: &str = "CELLAR_LIFETIME";

/// Predefined configuration presets for common token uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPreset {
    /// One-time confirmations (e.g. "confirm this action"):
    /// - Lifetime: 5 minutes
    ShortLived,

    /// Signed links sent by email:
    /// - Lifetime: 1 hour
    Standard,

    /// Links that must survive a day in an inbox:
    /// - Lifetime: 24 hours
    LongLived,

    /// Load configuration from environment variables.
    ///
    /// Reads `CELLAR_LIFETIME` (seconds), falling back to 1 hour when unset
    /// or unparsable.
    FromEnv,
}

/// Configuration captured by a [`Cellar`](crate::Cellar) at construction.
///
/// # Example
///
/// ```rust
/// use cellar::{Cellar, CellarConfig, Secret};
///
/// let config = CellarConfig {
///     lifetime: 600,
///     old_secrets: vec![Secret::none(), Secret::from("oldest-secret")],
/// };
/// let cellar = Cellar::with_config("new-secret", config);
/// assert_eq!(cellar.lifetime(), 600);
///
/// // Or from JSON, e.g. a config file section:
/// let config = CellarConfig::from_json(r#"{"old_secrets": [null, "oldest-secret"]}"#)?;
/// assert_eq!(config.lifetime, 3600);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CellarConfig {
    /// Default token lifetime in seconds.
    pub lifetime: u64,
    /// Retired secrets still accepted for verification, tried in order.
    pub old_secrets: Vec<Secret>,
}

impl Default for CellarConfig {
    fn default() -> Self {
        Self {
            lifetime: DEFAULT_LIFETIME,
            old_secrets: Vec::new(),
        }
    }
}

impl CellarConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Validates the configuration and returns any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.lifetime == 0 {
            warnings.push(
                "Zero default lifetime produces tokens that are already expired".to_string(),
            );
        }
        if self.lifetime > 30 * 86400 {
            warnings.push(
                "Long default lifetime (> 30 days) widens the window for leaked tokens"
                    .to_string(),
            );
        }

        if self.old_secrets.len() > 8 {
            warnings.push(
                "More than 8 retired secrets; every rejected token is checked against each one"
                    .to_string(),
            );
        }

        warnings
    }

    /// Returns a summary of the current configuration.
    pub fn summary(&self) -> String {
        format!(
            "CellarConfig {{ Lifetime: {}s, Retired secrets: {} }}",
            self.lifetime,
            self.old_secrets.len(),
        )
    }
}

impl From<ConfigPreset> for CellarConfig {
    fn from(preset: ConfigPreset) -> Self {
        let lifetime = match preset {
            ConfigPreset::ShortLived => 300,
            ConfigPreset::Standard => DEFAULT_LIFETIME,
            ConfigPreset::LongLived => 86400,
            ConfigPreset::FromEnv => std::env::var(LIFETIME_ENV_VAR)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_LIFETIME),
        };
        Self {
            lifetime,
            ..Self::default()
        }
    }
}
