//! Configuration types for rigcert.
//!
//! Configuration is loaded from TOML files and environment variables.
//! All config structs validate their values at construction time via
//! fallible builders. Post-deserialization validation is available via
//! the [`validate`](IssuanceConfig::validate) method on each struct.

// The schemars `JsonSchema` derive macro internally uses `.unwrap()` in its
// expansions.
#![allow(clippy::disallowed_methods)]

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use snafu::Snafu;

use crate::{
    generator::{CertificateNumberGenerator, StrategyKind, WallClock},
    types::Collection,
};

/// Host used when none is configured.
const DEFAULT_PUBLIC_HOST: &str = "localhost:3000";

/// Path of the public lookup page.
pub const VERIFICATION_PATH: &str = "/search";

/// Configuration validation error.
///
/// Returned when a configuration value is outside its valid range or
/// violates a cross-field constraint.
#[derive(Debug, Snafu)]
pub enum ConfigError {
    /// A configuration value is invalid.
    #[snafu(display("invalid config: {message}"))]
    Validation {
        /// Description of the validation failure.
        message: String,
    },
}

// =========================================================================
// GeneratorConfig
// =========================================================================

/// Certificate number generator configuration.
///
/// # Example
///
/// ```no_run
/// # use rigcert_types::{config::GeneratorConfig, generator::{StrategyKind, WallClock}};
/// let config = GeneratorConfig::builder()
///     .strategy(StrategyKind::Sequential)
///     .wall_clock(WallClock::Local)
///     .build()
///     .expect("valid generator config");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GeneratorConfig {
    /// Numbering strategy used when issuing certificates.
    #[serde(default)]
    pub strategy: StrategyKind,
    /// Time zone whose wall-clock time is encoded into timestamp numbers.
    #[serde(default)]
    pub wall_clock: WallClock,
}

#[bon::bon]
impl GeneratorConfig {
    /// Creates a new generator configuration with validation.
    ///
    /// # Errors
    ///
    /// Currently infallible; returns `Result` so callers handle future
    /// constraints uniformly with the other config builders.
    #[builder]
    pub fn new(
        #[builder(default)] strategy: StrategyKind,
        #[builder(default)] wall_clock: WallClock,
    ) -> Result<Self, ConfigError> {
        let config = Self { strategy, wall_clock };
        config.validate()?;
        Ok(config)
    }
}

impl GeneratorConfig {
    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Never fails; every combination of strategy and wall clock is valid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Builds a generator backed by the system clock and OS-seeded RNG.
    pub fn system_generator(&self) -> CertificateNumberGenerator {
        CertificateNumberGenerator::system().with_wall_clock(self.wall_clock)
    }
}

// =========================================================================
// IssuanceConfig
// =========================================================================

/// Certificate issuance configuration.
///
/// # Validation Rules
///
/// - `public_host` must be a bare `host[:port]`: non-empty, no scheme, no
///   path, query or fragment, no whitespace
///
/// # Example
///
/// ```no_run
/// # use rigcert_types::{config::IssuanceConfig, types::Collection};
/// let config = IssuanceConfig::builder()
///     .public_host("certs.example.com")
///     .collection(Collection::Test)
///     .build()
///     .expect("valid issuance config");
/// assert_eq!(config.verification_base_url(), "https://certs.example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct IssuanceConfig {
    /// Host the public lookup page is served from, e.g. `certs.example.com`.
    ///
    /// Hosts starting with `localhost` get an `http://` verification URL;
    /// all others get `https://`.
    #[serde(default = "default_public_host")]
    pub public_host: String,
    /// Collection new certificates are written to.
    #[serde(default)]
    pub collection: Collection,
    /// Number generator settings.
    #[serde(default)]
    pub generator: GeneratorConfig,
}

#[bon::bon]
impl IssuanceConfig {
    /// Creates a new issuance configuration with validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if `public_host` is not a bare
    /// `host[:port]`.
    #[builder]
    pub fn new(
        #[builder(into, default = default_public_host())] public_host: String,
        #[builder(default)] collection: Collection,
        #[builder(default)] generator: GeneratorConfig,
    ) -> Result<Self, ConfigError> {
        let config = Self { public_host, collection, generator };
        config.validate()?;
        Ok(config)
    }
}

impl IssuanceConfig {
    /// Validates the configuration values.
    ///
    /// Call after deserialization to ensure values are within valid ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if any value is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let host = self.public_host.as_str();
        if host.is_empty() {
            return Err(ConfigError::Validation {
                message: "public_host must not be empty".to_string(),
            });
        }
        if host.contains("://") {
            return Err(ConfigError::Validation {
                message: format!("public_host must not include a scheme, got {host:?}"),
            });
        }
        if let Some(c) = host.chars().find(|&c| matches!(c, '/' | '?' | '#') || c.is_whitespace())
        {
            return Err(ConfigError::Validation {
                message: format!("public_host must be a bare host[:port], found {c:?} in {host:?}"),
            });
        }
        self.generator.validate()
    }

    /// Returns the scheme and host verification URLs are built on.
    ///
    /// Local development hosts are served over plain HTTP.
    #[must_use]
    pub fn verification_base_url(&self) -> String {
        let scheme = if self.public_host.starts_with("localhost") { "http" } else { "https" };
        format!("{scheme}://{}", self.public_host)
    }
}

impl Default for IssuanceConfig {
    fn default() -> Self {
        Self {
            public_host: default_public_host(),
            collection: Collection::default(),
            generator: GeneratorConfig::default(),
        }
    }
}

fn default_public_host() -> String {
    DEFAULT_PUBLIC_HOST.to_string()
}
