//! httpscope demo server
//!
//! Serves a couple of demo routes with every exchange captured by the observer

use clap::Parser;
use httpscope::server;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "httpscope", version, about)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(
        short,
        long,
        env = "HTTPSCOPE_CONFIG",
        default_value = "config/httpscope.yaml"
    )]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .init();

    match server::run_server(&cli.config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Display keeps multi-line messages readable
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
