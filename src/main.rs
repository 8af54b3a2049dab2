//! NPS Site Explorer - browse National Park Service sites by state
//!
//! An interactive command-line tool that lists the national sites in a
//! state and shows places near a chosen site.

use std::error::Error;
use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use npsite::cli::{Cli, StartupConfig};
use npsite::session::Session;

/// Sets up logging to stderr so the session on stdout stays readable
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "npsite=info".into()),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Parses arguments and runs one interactive session
async fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = StartupConfig::from_cli(&cli)?;
    info!(
        cache_file = %config.cache_file.display(),
        base_url = %config.base_url,
        has_api_key = config.api_key.is_some(),
        "starting session"
    );

    let mut session = Session::from_config(&config);
    session.run(io::stdin().lock(), io::stdout().lock()).await?;

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
