//! CLI configuration.
//!
//! Settings are layered, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. A TOML file: `--config <path>`, or `rigcert.toml` in the working directory if present
//! 3. Environment variables prefixed `RIGCERT__`, with `__` separating nested keys
//!    (e.g. `RIGCERT__ISSUANCE__PUBLIC_HOST=certs.example.com`)
//! 4. Command-line flags

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use clap::{Args, Parser, Subcommand, ValueEnum};
use rigcert_types::{Collection, StrategyKind, config::IssuanceConfig};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "rigcert";

/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "RIGCERT";

/// Log output format.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text.
    Text,
    /// One JSON object per event.
    Json,
    /// JSON when stderr is not a terminal, text otherwise.
    #[default]
    Auto,
}

/// Resolved CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Config {
    /// Log output format.
    #[serde(default)]
    pub log_format: LogFormat,
    /// Issuance and number generation settings.
    #[serde(default)]
    pub issuance: IssuanceConfig,
}

/// Configuration error.
#[derive(Debug, Snafu)]
pub enum CliConfigError {
    /// A source could not be read.
    #[snafu(display("failed to load config: {source}"))]
    Load {
        /// Underlying loader error.
        source: ::config::ConfigError,
    },

    /// The merged sources did not match the config schema.
    #[snafu(display("failed to parse config: {source}"))]
    Parse {
        /// Underlying deserialization error.
        source: ::config::ConfigError,
    },

    /// A value failed validation.
    #[snafu(display("{source}"))]
    Invalid {
        /// Underlying validation error.
        source: rigcert_types::config::ConfigError,
    },
}

impl Config {
    /// Loads configuration from the file at `path` (or the default file, if
    /// present) and the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`CliConfigError`] if a source cannot be read, does not match
    /// the schema, or holds an invalid value.
    pub fn load(path: Option<&Path>) -> Result<Self, CliConfigError> {
        Self::load_with_env(path, None)
    }

    /// Like [`Config::load`], but reads environment variables from `env`
    /// instead of the process environment when given.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, CliConfigError> {
        let builder = ::config::Config::builder();

        let builder = match path {
            Some(path) => builder.add_source(
                ::config::File::from(path).format(::config::FileFormat::Toml).required(true),
            ),
            None => builder.add_source(
                ::config::File::with_name(DEFAULT_CONFIG_FILE)
                    .format(::config::FileFormat::Toml)
                    .required(false),
            ),
        };

        // "__" separates nesting levels; single underscores stay part of the
        // field name (RIGCERT__ISSUANCE__PUBLIC_HOST -> issuance.public_host).
        let builder = builder.add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config: Self =
            builder.build().context(LoadSnafu)?.try_deserialize().context(ParseSnafu)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns [`CliConfigError::Invalid`] with the first failing value.
    pub fn validate(&self) -> Result<(), CliConfigError> {
        self.issuance.validate().context(InvalidSnafu)
    }

    /// Applies command-line overrides, then revalidates.
    ///
    /// # Errors
    ///
    /// Returns [`CliConfigError::Invalid`] if an override is invalid.
    pub fn apply_overrides(&mut self, overrides: &Overrides) -> Result<(), CliConfigError> {
        if let Some(format) = overrides.log_format {
            self.log_format = format;
        }
        if let Some(host) = &overrides.public_host {
            self.issuance.public_host.clone_from(host);
        }
        if let Some(collection) = overrides.collection {
            self.issuance.collection = collection.into();
        }
        self.validate()
    }
}

/// Returns the JSON Schema of the config file.
///
/// # Errors
///
/// Returns an error if the schema cannot be serialized.
pub fn generate_config_schema() -> Result<String, serde_json::Error> {
    let schema = schemars::schema_for!(Config);
    serde_json::to_string_pretty(&schema).map(|json| json + "\n")
}

/// Returns a TOML config file holding every default value.
///
/// # Errors
///
/// Returns an error if the defaults cannot be serialized.
pub fn generate_config_example() -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(&Config::default())
}

// =========================================================================
// Command line
// =========================================================================

/// Generate, check, and issue training certificate numbers.
#[derive(Debug, Parser)]
#[command(name = "rigcert", version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML config file.
    #[arg(short, long, env = "RIGCERT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: Overrides,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Flags that override file and environment settings.
#[derive(Debug, Clone, Default, Args)]
pub struct Overrides {
    /// Log output format.
    #[arg(long, value_enum, global = true)]
    pub log_format: Option<LogFormat>,

    /// Host the public lookup page is served from.
    #[arg(long, global = true)]
    pub public_host: Option<String>,

    /// Collection issued certificates are written to.
    #[arg(long, value_enum, global = true)]
    pub collection: Option<CollectionArg>,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Generate certificate numbers.
    Generate(GenerateArgs),

    /// Check whether a string is a well-formed certificate number.
    ///
    /// Exits with status 1 when it is not.
    Validate {
        /// Candidate certificate number.
        number: String,
    },

    /// Decode a certificate number and print the fields as JSON.
    Parse {
        /// Candidate certificate number.
        number: String,
    },

    /// Issue a certificate from a JSON form and print the record.
    ///
    /// Records are kept in memory for the duration of the command only.
    Issue {
        /// Path to the form, a JSON object with camelCase field names.
        #[arg(long)]
        form: PathBuf,
    },

    /// Configuration helpers.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Arguments of `rigcert generate`.
#[derive(Debug, Clone, Args)]
pub struct GenerateArgs {
    /// Numbering strategy; defaults to the configured one.
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// First counter value for the sequential strategy.
    #[arg(long)]
    pub counter: Option<u32>,

    /// Issue year for the sequential strategy; defaults to the current year.
    #[arg(long)]
    pub year: Option<i32>,

    /// Data mixed into hash-based numbers.
    #[arg(long)]
    pub data: Option<String>,

    /// How many numbers to generate.
    #[arg(short = 'n', long, default_value_t = 1)]
    pub count: u32,
}

/// `rigcert config` actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Print the JSON Schema of the config file.
    Schema,
    /// Print a config file with every default value.
    Example,
}

/// Numbering strategy flag values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// `YYMMDDHH-MMSSXX`.
    Timestamp,
    /// `IADC-YYYY-NNNN`.
    Sequential,
    /// `HHHHHHHH-SSSSSS`.
    HashBased,
}

impl From<StrategyArg> for StrategyKind {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Timestamp => Self::Timestamp,
            StrategyArg::Sequential => Self::Sequential,
            StrategyArg::HashBased => Self::HashBased,
        }
    }
}

/// Collection flag values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CollectionArg {
    /// Live certificates.
    Production,
    /// Certificates issued while testing.
    Test,
}

impl From<CollectionArg> for Collection {
    fn from(arg: CollectionArg) -> Self {
        match arg {
            CollectionArg::Production => Self::Production,
            CollectionArg::Test => Self::Test,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::disallowed_methods)]
mod tests {
    use clap::CommandFactory;
    use rigcert_test_utils::TestDir;
    use rigcert_types::WallClock;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect())
    }

    // =========================================================================
    // Loading
    // =========================================================================

    #[test]
    fn test_load_defaults_without_sources() {
        let dir = TestDir::new();
        let missing = dir.join("absent.toml");
        // A missing default file is fine; an explicit path must exist.
        let config = Config::load_with_env(None, env(&[])).unwrap();
        assert_eq!(config.issuance, IssuanceConfig::default());
        assert!(Config::load_with_env(Some(&missing), env(&[])).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TestDir::new();
        let path = dir.write(
            "rigcert.toml",
            r#"
log_format = "json"

[issuance]
public_host = "certs.example.com"
collection = "test"

[issuance.generator]
strategy = "sequential"
wall_clock = "local"
"#,
        );

        let config = Config::load_with_env(Some(&path), env(&[])).unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.issuance.public_host, "certs.example.com");
        assert_eq!(config.issuance.collection, Collection::Test);
        assert_eq!(config.issuance.generator.strategy, StrategyKind::Sequential);
        assert_eq!(config.issuance.generator.wall_clock, WallClock::Local);
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = TestDir::new();
        let path = dir.write("rigcert.toml", "[issuance]\npublic_host = \"certs.example.com\"\n");

        let config = Config::load_with_env(
            Some(&path),
            env(&[
                ("RIGCERT__ISSUANCE__PUBLIC_HOST", "verify.example.org"),
                ("RIGCERT__ISSUANCE__GENERATOR__STRATEGY", "hash-based"),
            ]),
        )
        .unwrap();
        assert_eq!(config.issuance.public_host, "verify.example.org");
        assert_eq!(config.issuance.generator.strategy, StrategyKind::HashBased);
    }

    #[test]
    fn test_invalid_value_is_rejected() {
        let dir = TestDir::new();
        let path =
            dir.write("rigcert.toml", "[issuance]\npublic_host = \"https://certs.example.com\"\n");
        let err = Config::load_with_env(Some(&path), env(&[])).unwrap_err();
        assert!(matches!(err, CliConfigError::Invalid { .. }), "got: {err:?}");
    }

    #[test]
    fn test_unknown_strategy_is_a_parse_error() {
        let err = Config::load_with_env(
            None,
            env(&[("RIGCERT__ISSUANCE__GENERATOR__STRATEGY", "random")]),
        )
        .unwrap_err();
        assert!(matches!(err, CliConfigError::Parse { .. }), "got: {err:?}");
    }

    // =========================================================================
    // Overrides
    // =========================================================================

    #[test]
    fn test_flags_override_config() {
        let mut config = Config::default();
        let overrides = Overrides {
            log_format: Some(LogFormat::Text),
            public_host: Some("certs.example.com".to_string()),
            collection: Some(CollectionArg::Test),
        };
        config.apply_overrides(&overrides).unwrap();
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.issuance.public_host, "certs.example.com");
        assert_eq!(config.issuance.collection, Collection::Test);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let mut config = Config::default();
        let overrides =
            Overrides { public_host: Some("bad host".to_string()), ..Overrides::default() };
        assert!(config.apply_overrides(&overrides).is_err());
    }

    // =========================================================================
    // Schema and example
    // =========================================================================

    #[test]
    fn test_config_schema_is_valid_json() {
        let json = generate_config_schema().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("$schema").is_some(), "Schema missing $schema field");
        assert_eq!(value.get("title").and_then(|v| v.as_str()), Some("Config"));
        let props = value.get("properties").and_then(|v| v.as_object()).unwrap();
        assert!(props.contains_key("log_format"), "Missing log_format");
        assert!(props.contains_key("issuance"), "Missing issuance");
    }

    #[test]
    fn test_config_example_loads_back() {
        let dir = TestDir::new();
        let path = dir.write("example.toml", &generate_config_example().unwrap());
        let config = Config::load_with_env(Some(&path), env(&[])).unwrap();
        assert_eq!(config, Config::default());
    }

    // =========================================================================
    // Command line
    // =========================================================================

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parses_generate() {
        let cli = Cli::try_parse_from([
            "rigcert",
            "generate",
            "--strategy",
            "sequential",
            "--counter",
            "7",
            "--year",
            "2024",
            "-n",
            "3",
        ])
        .unwrap();
        let args = match cli.command {
            CliCommand::Generate(args) => args,
            other => panic!("expected generate, got {other:?}"),
        };
        assert_eq!(args.strategy, Some(StrategyArg::Sequential));
        assert_eq!(args.counter, Some(7));
        assert_eq!(args.year, Some(2024));
        assert_eq!(args.count, 3);
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "rigcert",
            "validate",
            "IADC-2025-0001",
            "--public-host",
            "certs.example.com",
            "--collection",
            "test",
        ])
        .unwrap();
        assert_eq!(cli.overrides.public_host.as_deref(), Some("certs.example.com"));
        assert_eq!(cli.overrides.collection, Some(CollectionArg::Test));
    }
}
