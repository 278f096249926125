//! Subcommand implementations.
//!
//! Each command writes its result to the given writer so tests can capture
//! output; logs go to stderr through `tracing`.

use std::{io::Write, path::Path};

use rand::RngCore;
use rigcert_registry::{
    CertificateStore, InMemoryStore, Issuer, RegistryError, issuance::MAX_SEQUENCE,
};
use rigcert_types::{
    CertificateForm, CertificateNumberGenerator, Clock, ErrorCode, Scheme, Strategy, StrategyKind,
    parse,
};
use snafu::{ResultExt, Snafu};

use crate::config::{
    CliCommand, Config, ConfigAction, GenerateArgs, generate_config_example,
    generate_config_schema,
};

/// Outcome of a command that ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The command succeeded.
    Success,
    /// The input was checked and found not to be a certificate number.
    Invalid,
}

/// Command failure.
#[derive(Debug, Snafu)]
pub enum CommandError {
    /// Writing output failed.
    #[snafu(display("failed to write output: {source}"))]
    Output {
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// JSON output could not be produced.
    #[snafu(display("failed to encode JSON: {source}"))]
    EncodeJson {
        /// Underlying serialization error.
        source: serde_json::Error,
    },

    /// The example config could not be produced.
    #[snafu(display("failed to encode TOML: {source}"))]
    EncodeToml {
        /// Underlying serialization error.
        source: toml::ser::Error,
    },

    /// The form file could not be read.
    #[snafu(display("failed to read form {path}: {source}"))]
    ReadForm {
        /// Path given on the command line.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The form file is not a valid form document.
    #[snafu(display("failed to parse form {path}: {source}"))]
    ParseForm {
        /// Path given on the command line.
        path: String,
        /// Underlying deserialization error.
        source: serde_json::Error,
    },

    /// The sequential strategy was selected without a counter.
    #[snafu(display("--counter is required for the sequential strategy"))]
    MissingCounter,

    /// A sequential counter does not fit four digits.
    #[snafu(display("counter {counter} is outside 1-{MAX_SEQUENCE}"))]
    CounterOutOfRange {
        /// Offending counter.
        counter: u64,
    },

    /// Issuance failed.
    #[snafu(display("{source}"))]
    Issue {
        /// Underlying registry error.
        source: RegistryError,
    },
}

impl CommandError {
    /// Returns the catalog code for errors that carry one.
    #[must_use]
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Issue { source } => Some(source.code()),
            Self::MissingCounter | Self::CounterOutOfRange { .. } | Self::ParseForm { .. } => {
                Some(ErrorCode::InvalidForm)
            },
            Self::Output { .. }
            | Self::EncodeJson { .. }
            | Self::EncodeToml { .. }
            | Self::ReadForm { .. } => None,
        }
    }
}

/// Runs `command` with the system clock and an OS-seeded RNG, then flushes
/// `out`.
///
/// # Errors
///
/// Returns [`CommandError`] if the command fails, or
/// [`CommandError::Output`] if buffered output cannot be flushed.
pub fn run<W: Write>(
    command: &CliCommand,
    config: &Config,
    out: &mut W,
) -> Result<Status, CommandError> {
    let status = match command {
        CliCommand::Generate(args) => {
            let generator = config.issuance.generator.system_generator();
            generate(args, config, &generator, out)
        },
        CliCommand::Validate { number } => validate(number, out),
        CliCommand::Parse { number } => parse_number(number, out),
        CliCommand::Issue { form } => {
            let issuer = Issuer::from_config(InMemoryStore::new(), config.issuance.clone())
                .context(IssueSnafu)?;
            issue(&issuer, form, out)
        },
        CliCommand::Config { action } => print_config(*action, out),
    }?;
    out.flush().context(OutputSnafu)?;
    Ok(status)
}

/// Prints `args.count` numbers, one per line.
///
/// The sequential strategy counts up from `--counter`.
///
/// # Errors
///
/// Returns [`CommandError::MissingCounter`] or
/// [`CommandError::CounterOutOfRange`] for unusable sequential arguments.
pub fn generate<C: Clock, R: RngCore, W: Write>(
    args: &GenerateArgs,
    config: &Config,
    generator: &CertificateNumberGenerator<C, R>,
    out: &mut W,
) -> Result<Status, CommandError> {
    let kind = args.strategy.map_or(config.issuance.generator.strategy, StrategyKind::from);

    for offset in 0..args.count {
        let strategy = match kind {
            StrategyKind::Timestamp => Strategy::Timestamp,
            StrategyKind::Sequential => {
                let first = args.counter.ok_or(CommandError::MissingCounter)?;
                Strategy::Sequential { counter: sequence_at(first, offset)?, year: args.year }
            },
            StrategyKind::HashBased => Strategy::HashBased { data: args.data.clone() },
        };
        writeln!(out, "{}", generator.generate(&strategy)).context(OutputSnafu)?;
    }
    Ok(Status::Success)
}

/// Counter `offset` steps after `first`, kept within four digits.
fn sequence_at(first: u32, offset: u32) -> Result<u32, CommandError> {
    let counter = u64::from(first) + u64::from(offset);
    match u32::try_from(counter) {
        Ok(counter) if (1..=MAX_SEQUENCE).contains(&counter) => Ok(counter),
        _ => Err(CommandError::CounterOutOfRange { counter }),
    }
}

/// Prints `valid (<schemes>)` or `invalid`.
///
/// # Errors
///
/// Returns [`CommandError::Output`] if writing fails.
pub fn validate<W: Write>(number: &str, out: &mut W) -> Result<Status, CommandError> {
    let schemes: Vec<&str> =
        Scheme::ALL.iter().filter(|scheme| scheme.matches(number)).map(|s| s.as_str()).collect();

    if schemes.is_empty() {
        writeln!(out, "invalid").context(OutputSnafu)?;
        return Ok(Status::Invalid);
    }
    writeln!(out, "valid ({})", schemes.join(", ")).context(OutputSnafu)?;
    Ok(Status::Success)
}

/// Prints the decoded fields of `number` as JSON.
///
/// Numbers that cannot be decoded print as `{"type": "unknown", ...}`;
/// that is still a successful run.
///
/// # Errors
///
/// Returns [`CommandError::EncodeJson`] or [`CommandError::Output`].
pub fn parse_number<W: Write>(number: &str, out: &mut W) -> Result<Status, CommandError> {
    let json = serde_json::to_string_pretty(&parse(number)).context(EncodeJsonSnafu)?;
    writeln!(out, "{json}").context(OutputSnafu)?;
    Ok(Status::Success)
}

/// Issues a certificate from the JSON form at `path` and prints the record.
///
/// # Errors
///
/// Returns [`CommandError`] if the form cannot be read or parsed, or if
/// issuance fails.
pub fn issue<S, C, R, W>(
    issuer: &Issuer<S, C, R>,
    path: &Path,
    out: &mut W,
) -> Result<Status, CommandError>
where
    S: CertificateStore,
    C: Clock,
    R: RngCore,
    W: Write,
{
    let display = path.display().to_string();
    let contents = std::fs::read_to_string(path).context(ReadFormSnafu { path: display.clone() })?;
    let form: CertificateForm =
        serde_json::from_str(&contents).context(ParseFormSnafu { path: display })?;

    let certificate = issuer.issue(form).context(IssueSnafu)?;
    let json = serde_json::to_string_pretty(&certificate).context(EncodeJsonSnafu)?;
    writeln!(out, "{json}").context(OutputSnafu)?;
    Ok(Status::Success)
}

/// Prints the config schema or an example config.
///
/// # Errors
///
/// Returns [`CommandError`] if encoding or writing fails.
pub fn print_config<W: Write>(action: ConfigAction, out: &mut W) -> Result<Status, CommandError> {
    let text = match action {
        ConfigAction::Schema => generate_config_schema().context(EncodeJsonSnafu)?,
        ConfigAction::Example => generate_config_example().context(EncodeTomlSnafu)?,
    };
    write!(out, "{text}").context(OutputSnafu)?;
    Ok(Status::Success)
}
