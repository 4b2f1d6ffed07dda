//! Sluice Tail
//!
//! Streams a growing compute-log file to stdout until it receives a
//! termination signal or the process that launched it goes away.
//!
//! Status lines are logged through tracing on the same stdout as plain text;
//! the relayed file content is written verbatim between them.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sluice_tail::{DeferredInterrupts, TailConfig, TailOutcome, TailSession};

#[derive(Parser, Debug)]
#[command(name = "sluice-tail")]
#[command(about = "Relay a growing log file to stdout", long_about = None)]
#[command(version)]
struct Args {
    /// File to tail
    file: PathBuf,

    /// Pid of the launching process; the tailer exits once it is gone (0 disables the check)
    parent_pid: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sluice_tail=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_ansi(false),
        )
        .init();

    let args = Args::parse();

    info!(
        "Starting sluice-tail (pid {}): file={}, parent_pid={:?}",
        std::process::id(),
        args.file.display(),
        args.parent_pid
    );

    let config = load_config()?;

    let interrupts = DeferredInterrupts::new();
    interrupts
        .install()
        .context("Failed to install signal handlers")?;

    let session = TailSession::open(&args.file, tokio::io::stdout(), interrupts, config)
        .await
        .with_context(|| format!("Failed to open {}", args.file.display()))?;

    let mut session = match args.parent_pid.filter(|pid| *pid != 0) {
        Some(pid) => session.with_parent_pid(pid),
        None => session,
    };

    let outcome = session
        .run()
        .await
        .with_context(|| format!("Failed to tail {}", args.file.display()))?;

    match outcome {
        TailOutcome::Interrupted => info!("Stopping: interrupted"),
        TailOutcome::Orphaned => info!("Stopping: parent process is gone"),
    }

    info!(
        "Finishing sluice-tail, relayed {} bytes",
        session.bytes_written()
    );

    Ok(())
}

/// Loads configuration from environment variables with fallback to defaults
fn load_config() -> Result<TailConfig> {
    let config = TailConfig::from_env();
    config.validate()?;
    Ok(config)
}
