//! # Serve Subcommand
//!
//! Runs the HTTP API over a repository directory and the catalog builder
//! that keeps its catalogs current. Shuts down on Ctrl-C.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use mrepo_api::auth::client_auth_header;
use mrepo_api::state::{AppConfig, AppState};
use mrepo_store::FileRepository;

/// Arguments for the `mrepo serve` subcommand.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Root directory of the munki repository.
    #[arg(long, env = "MREPO_REPO_PATH", value_name = "DIR")]
    pub repo: PathBuf,

    /// Port to listen on.
    #[arg(long, env = "MREPO_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Bearer token required on `/api/*`. Unset leaves the API open.
    #[arg(long, env = "MREPO_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Basic-auth password required on `/repo/*`. Unset serves files openly.
    #[arg(long, env = "MREPO_BASIC_AUTH", hide_env_values = true)]
    pub basic_auth: Option<String>,

    /// Do not print the client header setup instructions at startup.
    #[arg(long, env = "MREPO_NO_HELP_TEXT")]
    pub no_help: bool,
}

impl ServeArgs {
    /// Server configuration for these arguments.
    pub fn config(&self) -> AppConfig {
        AppConfig {
            port: self.port,
            repo_path: self.repo.clone(),
            api_token: self.api_token.clone(),
            repo_password: self.basic_auth.clone(),
        }
    }
}

/// Instructions for pointing munki clients at a password-protected repo.
pub fn client_help(password: &str) -> String {
    let header = client_auth_header(password);
    format!(
        "To connect clients, add this header to their AdditionalHttpHeaders:\n\n\
         \t{header}\n\n\
         To configure manually, use:\n\n\
         \tsudo defaults write /Library/Preferences/ManagedInstalls AdditionalHttpHeaders -array \"{header}\"\n"
    )
}

/// Execute the serve subcommand.
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = args.config();
    tracing::debug!(?config, "starting server");

    if !config.repo_path.is_dir() {
        tracing::warn!(
            repo = %config.repo_path.display(),
            "repository path is not a directory; /healthz will report unavailable"
        );
    }

    if let (Some(password), false) = (&config.repo_password, args.no_help) {
        println!("{}", client_help(password));
    }

    let (repo, builder) = FileRepository::with_catalog_builder(&config.repo_path);
    let catalogs = builder.status();
    let worker = tokio::spawn(builder.run());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState::new(config, repo, catalogs);
    let app = mrepo_api::app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "mrepo listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // Dropping the router dropped the last trigger, so the builder drains and exits.
    if let Err(e) = worker.await {
        tracing::error!(error = %e, "catalog builder task failed");
    }
    tracing::info!("mrepo stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
