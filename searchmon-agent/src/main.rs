//! searchmon - RediSearch index health report for a Redis fleet
//!
//! Usage: `searchmon <BUILD_NUMBER> [--config PATH] [--no-notify] [--json]`

use clap::Parser;
use searchmon_agent::{run, Cli};
use searchmon_kernel::RedisConnector;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Missing build number: clap prints usage and exits non-zero before any probing.
    let cli = Cli::parse();

    dotenvy::dotenv().ok(); // Ok si .env n'existe pas

    // Logs go to stderr, stdout only carries the report
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("searchmon=info,searchmon_agent=info,searchmon_kernel=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut stdout = std::io::stdout();
    match run(&cli, Arc::new(RedisConnector::new()), &mut stdout).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Monitoring run failed: {e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
