//! pydist - Python requirement to Debian dependency translator CLI
//!
//! Subcommands:
//! - resolve: translate requirements one by one
//! - validate: lint override files
//! - depends: build the dependency fields of a binary package

use clap::Parser;
use pydist::cli::CliArgs;
use pydist::error::{AppError, EXIT_IO};
use pydist::orchestrator::Orchestrator;
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_logging(&args);

    match run(args) {
        Ok(status) => ExitCode::from(status),
        Err(e) => {
            tracing::error!("{:#}", e);
            // library failures carry their own exit status
            let status = e
                .downcast_ref::<AppError>()
                .map(AppError::exit_code)
                .unwrap_or(EXIT_IO);
            ExitCode::from(status)
        }
    }
}

/// Logs go to stderr; RUST_LOG wins over the verbosity flags
fn init_logging(args: &CliArgs) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();
}

/// Main application logic
fn run(args: CliArgs) -> anyhow::Result<u8> {
    tracing::debug!("pydist v{}", env!("CARGO_PKG_VERSION"));

    let orchestrator = Orchestrator::new(args)?;
    let mut stdout = io::stdout().lock();
    let status = orchestrator.run(&mut stdout)?;
    stdout.flush()?;
    Ok(status)
}
