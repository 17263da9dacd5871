//! # mrepo-cli: Command-Line Interface for the Munki Repository Server
//!
//! Provides the `mrepo` binary.
//!
//! ## Subcommands
//!
//! - `mrepo serve`: run the HTTP API and the background catalog builder.
//! - `mrepo makecatalogs`: regenerate every catalog once and exit.
//!
//! Every flag has an `MREPO_*` environment fallback:
//!
//! ```bash
//! MREPO_REPO_PATH=/srv/munki MREPO_API_TOKEN=s3cret mrepo serve
//! mrepo --log-format json makecatalogs --repo /srv/munki
//! ```

pub mod logging;
pub mod makecatalogs;
pub mod serve;
