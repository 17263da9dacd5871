//! # mrepo CLI entry point
//!
//! Parses command-line arguments, installs logging, and dispatches to the
//! subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use mrepo_cli::logging::{self, LogFormat};
use mrepo_cli::makecatalogs::{run_makecatalogs, MakecatalogsArgs};
use mrepo_cli::serve::{run_serve, ServeArgs};

/// Munki repository server.
///
/// Serves manifests, pkgsinfos, packages, and catalogs over HTTP and keeps
/// the catalogs in step with the pkgsinfo records.
#[derive(Parser, Debug)]
#[command(name = "mrepo", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log line format.
    #[arg(long, value_enum, env = "MREPO_LOG_FORMAT", default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API and the background catalog builder.
    Serve(ServeArgs),

    /// Rebuild every catalog once and exit.
    Makecatalogs(MakecatalogsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.log_format, cli.verbose);

    let result = match cli.command {
        Commands::Serve(args) => tokio::runtime::Runtime::new()
            .map_err(anyhow::Error::from)
            .and_then(|runtime| runtime.block_on(run_serve(args)))
            .map(|()| 0),
        Commands::Makecatalogs(args) => run_makecatalogs(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
