//! `rigcert` binary.
//!
//! Generates, validates, decodes, and issues training certificate numbers.
//!
//! # Usage
//!
//! ```bash
//! # Timestamp number with the system clock
//! rigcert generate
//!
//! # Three sequential numbers starting at 41
//! rigcert generate --strategy sequential --counter 41 -n 3
//!
//! # Exit status 1 if the number is malformed
//! rigcert validate IADC-2025-0001
//!
//! # Environment variables override the config file, flags override both
//! RIGCERT__ISSUANCE__PUBLIC_HOST=certs.example.com rigcert issue --form form.json
//! ```
//!
//! Results go to stdout and logs to stderr. Exit status is 0 on success,
//! 1 when `validate` rejects its input, and 2 on any error.

use std::{io::IsTerminal, process::ExitCode};

use clap::Parser;
use rigcert_cli::{
    commands::{self, Status},
    config::{Cli, CliCommand, Config, LogFormat},
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Exit status for a rejected `validate` input.
const EXIT_INVALID: u8 = 1;

/// Exit status for any error.
const EXIT_ERROR: u8 = 2;

fn main() -> ExitCode {
    // clap handles --help and --version
    let cli = Cli::parse();

    // Config helpers must work even when the current config is broken.
    if matches!(cli.command, CliCommand::Config { .. }) {
        let mut stdout = std::io::stdout().lock();
        return finish(commands::run(&cli.command, &Config::default(), &mut stdout));
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("rigcert: {e}");
            return ExitCode::from(EXIT_ERROR);
        },
    };

    init_logging(config.log_format);

    tracing::debug!(
        public_host = %config.issuance.public_host,
        collection = %config.issuance.collection,
        strategy = ?config.issuance.generator.strategy,
        "Configuration loaded"
    );

    finish(commands::run(&cli.command, &config, &mut std::io::stdout().lock()))
}

fn load_config(cli: &Cli) -> Result<Config, rigcert_cli::config::CliConfigError> {
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_overrides(&cli.overrides)?;
    Ok(config)
}

/// Maps a command outcome to the process exit status.
fn finish(result: Result<Status, commands::CommandError>) -> ExitCode {
    match result {
        Ok(Status::Success) => ExitCode::SUCCESS,
        Ok(Status::Invalid) => ExitCode::from(EXIT_INVALID),
        Err(e) => {
            match e.code() {
                Some(code) => tracing::error!(
                    error = %e,
                    code = %code,
                    action = code.suggested_action(),
                    "Command failed"
                ),
                None => tracing::error!(error = %e, "Command failed"),
            }
            eprintln!("rigcert: {e}");
            ExitCode::from(EXIT_ERROR)
        },
    }
}

/// Initializes the logging system.
///
/// Supports three formats:
/// - `Text`: Human-readable format (interactive use)
/// - `Json`: JSON structured logging (scripts and log aggregation)
/// - `Auto`: JSON when stderr is not a terminal, text otherwise
///
/// Logs always go to stderr so stdout carries only command output.
fn init_logging(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = match format {
        LogFormat::Json => true,
        LogFormat::Text => false,
        LogFormat::Auto => !std::io::stderr().is_terminal(),
    };

    if use_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
