//! wForge CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments or configuration
//! - 3: Build failed
//! - 4: Cancelled

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod error;
mod settings;

use commands::{Cli, Commands};
use error::CliError;
use settings::Settings;

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const BUILD_FAILED: u8 = 3;
    pub const CANCELLED: u8 = 4;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            return ExitCode::from(categorize_error(&e));
        }
    };

    let result = match cli.command {
        Commands::Build(args) => commands::build::execute(args, settings).await,
        Commands::Patterns(args) => commands::patterns::execute(args, settings).await,
        Commands::Knowledge(args) => commands::knowledge::execute(args, settings).await,
        Commands::Explain(args) => commands::explain::execute(args, settings).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("wforge={},warn", level)));

    let (plain, json) = if cli.log_json {
        (None, Some(fmt::layer().json().with_writer(std::io::stderr)))
    } else {
        (
            Some(fmt::layer().with_target(false).with_writer(std::io::stderr)),
            None,
        )
    };

    // Already initialized in tests; nothing to do.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(json)
        .try_init();
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    match e.downcast_ref::<CliError>() {
        Some(CliError::InvalidInput(_)) => ExitCodes::INVALID_ARGS,
        Some(CliError::BuildFailed(_)) => ExitCodes::BUILD_FAILED,
        Some(CliError::Cancelled) => ExitCodes::CANCELLED,
        None => ExitCodes::GENERAL_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_error() {
        let invalid = anyhow::Error::from(CliError::InvalidInput("bad".into()));
        assert_eq!(categorize_error(&invalid), ExitCodes::INVALID_ARGS);

        let failed = anyhow::Error::from(CliError::BuildFailed("exhausted".into()));
        assert_eq!(categorize_error(&failed), ExitCodes::BUILD_FAILED);

        let cancelled = anyhow::Error::from(CliError::Cancelled);
        assert_eq!(categorize_error(&cancelled), ExitCodes::CANCELLED);

        let other = anyhow::anyhow!("disk full");
        assert_eq!(categorize_error(&other), ExitCodes::GENERAL_ERROR);
    }

    #[test]
    fn test_cli_parses_build() {
        let cli = Cli::try_parse_from([
            "wforge",
            "build",
            "badge.json",
            "--max-attempts",
            "5",
            "--offline",
        ]);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_cli_rejects_verbose_and_quiet() {
        assert!(Cli::try_parse_from(["wforge", "-v", "-q", "patterns", "stats"]).is_err());
    }
}
