//! # remedy CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::io;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use remedy_cli::show::{run_show, ShowArgs};
use remedy_cli::timeout::{run_timeout, TimeoutArgs};
use remedy_cli::validate::{run_validate, ValidateArgs};

/// Closed-loop remediation document tooling.
///
/// Validates control-loop documents against the actor catalog, reports
/// their worst-case execution time and prints them in normalized form.
#[derive(Parser, Debug)]
#[command(name = "remedy", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a control-loop document.
    Validate(ValidateArgs),

    /// Worst-case execution time of a control loop against its budget.
    Timeout(TimeoutArgs),

    /// Print the document with every default filled in.
    Show(ShowArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over -v.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let mut out = io::stdout().lock();
    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args, &mut out),
        Commands::Timeout(args) => run_timeout(&args, &mut out),
        Commands::Show(args) => run_show(&args, &mut out),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}
