//! sdiag - storage API diagnostics
//!
//! An interactive command-line tool for checking a hosted object-storage
//! project: credentials, bucket access, uploads, downloads, and public URLs.

use clap::Parser;
use storage_diag::app;
use storage_diag::commands::Cli;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() {
    // Values already in the environment win over .env
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    // The exit status is 0 whatever happened; failures are reported on screen
    if let Err(e) = app::run(cli).await {
        eprintln!("✗ Fatal error: {e:#}");
        tracing::error!(error = %e, "session aborted");
    }
}
