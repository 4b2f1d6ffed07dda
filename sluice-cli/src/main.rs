//! Sluice CLI
//!
//! Command-line interface for running queries against the managed query service.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sluice")]
#[command(about = "Sluice managed query CLI", long_about = None)]
struct Cli {
    /// Query service URL
    #[arg(
        long,
        global = true,
        env = "SLUICE_QUERY_ENDPOINT",
        default_value = "http://localhost:8080"
    )]
    endpoint: String,

    /// Object store URL used to download result files
    #[arg(
        long,
        global = true,
        env = "SLUICE_OBJECT_STORE_ENDPOINT",
        default_value = "http://localhost:9000"
    )]
    object_store_endpoint: String,

    /// Work group queries are submitted to
    #[arg(long, global = true, env = "SLUICE_WORK_GROUP", default_value = "primary")]
    work_group: String,

    /// Seconds between status checks
    #[arg(long, global = true, env = "SLUICE_POLL_INTERVAL", default_value_t = 5)]
    poll_interval: u64,

    /// Status re-checks before giving up; zero or negative waits forever
    #[arg(
        long,
        global = true,
        env = "SLUICE_MAX_RETRIES",
        default_value_t = 120,
        allow_negative_numbers = true
    )]
    max_retries: i64,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sluice_cli=warn,sluice_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        endpoint: cli.endpoint,
        object_store_endpoint: cli.object_store_endpoint,
        work_group: cli.work_group,
        poll_interval_secs: cli.poll_interval,
        max_retries: cli.max_retries,
    };

    handle_command(cli.command, &config).await
}
