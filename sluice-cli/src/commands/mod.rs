//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod query;

pub use query::QueryCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Query execution
    Query {
        #[command(subcommand)]
        command: QueryCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Query { command } => query::handle_query_command(command, config).await,
    }
}
