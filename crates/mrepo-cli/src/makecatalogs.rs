//! # Makecatalogs Subcommand
//!
//! One synchronous catalog rebuild, for repositories edited by hand or by
//! other tools while the server is down.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use mrepo_store::{FileRepository, RebuildReport};

/// Arguments for the `mrepo makecatalogs` subcommand.
#[derive(Args, Debug)]
pub struct MakecatalogsArgs {
    /// Root directory of the munki repository.
    #[arg(long, env = "MREPO_REPO_PATH", value_name = "DIR")]
    pub repo: PathBuf,
}

/// Execute the makecatalogs subcommand.
///
/// Returns exit code: 0 when every catalog was written, 1 otherwise.
pub fn run_makecatalogs(args: &MakecatalogsArgs) -> Result<u8> {
    let (_repo, builder) = FileRepository::with_catalog_builder(&args.repo);
    let report = builder
        .rebuild_now()
        .with_context(|| format!("failed to rebuild catalogs in {}", args.repo.display()))?;
    print_report(&report);
    Ok(if report.failed.is_empty() { 0 } else { 1 })
}

fn print_report(report: &RebuildReport) {
    println!("pkgsinfo records: {}", report.pkgsinfos);
    for name in &report.written {
        println!("  wrote   catalogs/{name}");
    }
    for name in &report.removed {
        println!("  removed catalogs/{name}");
    }
    for name in &report.failed {
        eprintln!("  FAILED  catalogs/{name}");
    }
}
