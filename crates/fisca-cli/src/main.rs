//! # fisca CLI entry point
//!
//! Parses command-line arguments, loads the optional configuration file,
//! initializes logging, and dispatches to subcommand handlers.
//!
//! Exit codes: 0 on success, 1 when the input is rejected (invalid catalog,
//! invalid amounts), 2 on operational errors (unreadable files, unknown
//! codes, inconsistent histories).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fisca_cli::catalog::{run_catalog, run_validate_catalog, CatalogArgs, ValidateCatalogArgs};
use fisca_cli::config::{CliConfig, LogFormat};
use fisca_cli::eligibility::{run_eligibility, EligibilityArgs};
use fisca_cli::history::{run_extract, run_merge, run_missing, ExtractArgs, MergeArgs, MissingArgs};

/// Fiscal obligation engine CLI.
///
/// Lists and validates obligation catalogs, resolves client eligibility,
/// reports missing periods, and merges or extracts obligations in fiscal
/// history files.
#[derive(Parser, Debug)]
#[command(name = "fisca", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the definitions of the active catalog.
    Catalog(CatalogArgs),

    /// Load and validate a catalog YAML file.
    ValidateCatalog(ValidateCatalogArgs),

    /// Show which obligations a client may select.
    Eligibility(EligibilityArgs),

    /// Report the missing periods of one obligation in a history.
    Missing(MissingArgs),

    /// Merge an edited obligation instance into a history.
    Merge(MergeArgs),

    /// Extract the editable instance of one obligation from a history.
    Extract(ExtractArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match CliConfig::from_env(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::from(2);
        }
    };

    init_tracing(cli.verbose, config.log_format);
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "fisca CLI starting");

    let result = match cli.command {
        Commands::Catalog(args) => run_catalog(&args, &config),
        Commands::ValidateCatalog(args) => run_validate_catalog(&args),
        Commands::Eligibility(args) => run_eligibility(&args, &config),
        Commands::Missing(args) => run_missing(&args, &config),
        Commands::Merge(args) => run_merge(&args, &config),
        Commands::Extract(args) => run_extract(&args, &config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}

/// Initialize tracing from the verbosity count, falling back to `RUST_LOG`
/// when no `-v` flag is given.
fn init_tracing(verbose: u8, format: LogFormat) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
