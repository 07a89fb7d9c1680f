//! dataride CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Configuration error
//! - 4: Template error
//! - 5: Destination conflict

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dataride_core::{ErrorKind, InfraError};

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    /// Returned by clap itself on usage errors.
    pub const INVALID_ARGS: u8 = 2;
    pub const CONFIGURATION_ERROR: u8 = 3;
    pub const TEMPLATE_ERROR: u8 = 4;
    pub const DESTINATION_CONFLICT: u8 = 5;
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Create(args) => commands::create::execute(args, cli.quiet),
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

/// `RUST_LOG` wins over the verbosity flags.
fn init_logging(verbose: bool, quiet: bool) {
    let default_directive = if quiet {
        "error"
    } else if verbose {
        "dataride=debug"
    } else {
        "dataride=warn"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(verbose).with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }
}

/// Map the root generation error to an exit code.
fn categorize_error(e: &anyhow::Error) -> u8 {
    let kind = e
        .chain()
        .find_map(|cause| cause.downcast_ref::<InfraError>())
        .map(InfraError::kind);

    match kind {
        Some(ErrorKind::Configuration) => ExitCodes::CONFIGURATION_ERROR,
        Some(ErrorKind::Template) => ExitCodes::TEMPLATE_ERROR,
        Some(ErrorKind::DestinationConflict) => ExitCodes::DESTINATION_CONFLICT,
        Some(ErrorKind::Io) | None => ExitCodes::GENERAL_ERROR,
    }
}
