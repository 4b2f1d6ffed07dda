//! Query command handlers
//!
//! Handles submitting queries, checking their status, and reading results.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use sluice_client::{ClientError, QueryClient, csv};
use sluice_core::domain::query::{QueryExecution, QueryState};
use sluice_core::domain::results::{RawRow, Row};

use crate::config::Config;

/// Query subcommands
#[derive(Subcommand)]
pub enum QueryCommands {
    /// Submit a query and wait for it to finish
    Run {
        /// SQL text of the query
        sql: String,

        /// Download and print the result file once the query succeeds
        #[arg(long)]
        fetch: bool,
    },
    /// Show the current status of a query
    Status {
        /// Query execution ID
        id: String,
    },
    /// Print the results of a finished query
    Results {
        /// Query execution ID
        id: String,

        /// Print the raw result file as CSV instead of typed rows
        #[arg(long, conflicts_with = "json")]
        raw: bool,

        /// Print typed rows as JSON arrays
        #[arg(long)]
        json: bool,
    },
}

/// Handle query commands
///
/// Routes query subcommands to their respective handlers.
///
/// # Arguments
/// * `command` - The query command to execute
/// * `config` - The CLI configuration
pub async fn handle_query_command(command: QueryCommands, config: &Config) -> Result<()> {
    let client = QueryClient::from_config(config.client_config()?);

    match command {
        QueryCommands::Run { sql, fetch } => run_query(&client, &sql, fetch).await,
        QueryCommands::Status { id } => show_status(&client, &id).await,
        QueryCommands::Results { id, raw, json } => show_results(&client, &id, raw, json).await,
    }
}

/// Submit a query, wait for it, and optionally print its raw output
async fn run_query(client: &QueryClient, sql: &str, fetch: bool) -> Result<()> {
    let execution_id = client
        .start_query(sql)
        .await
        .context("Failed to submit query")?;

    println!(
        "{} Submitted query {}",
        "▸".cyan(),
        execution_id.as_str().bold()
    );
    println!(
        "{}",
        format!("  Waiting in work group {}...", client.config().work_group).dimmed()
    );

    let execution = match client.wait_for_completion(&execution_id).await {
        Ok(execution) => execution,
        Err(e) => {
            print_query_error(&e);
            return Err(e).context(format!("Query {} did not succeed", execution_id));
        }
    };

    println!("{} Query {}", "✓".green(), colorize_state(QueryState::Succeeded));
    if let Some(location) = execution.output_location() {
        println!("  Output:   {}", location.dimmed());
    }

    if fetch {
        let rows = client
            .fetch_raw_results(&execution_id)
            .await
            .context("Failed to download query results")?;
        println!();
        print_raw_rows(&rows);
    }

    Ok(())
}

/// Show a query's execution record
async fn show_status(client: &QueryClient, id: &str) -> Result<()> {
    let execution = client
        .get_execution(id)
        .await
        .with_context(|| format!("Failed to fetch query {}", id))?;

    print_execution_details(&execution);

    Ok(())
}

/// Print a finished query's results
async fn show_results(client: &QueryClient, id: &str, raw: bool, json: bool) -> Result<()> {
    if raw {
        let rows = client
            .fetch_raw_results(id)
            .await
            .with_context(|| format!("Failed to download results of query {}", id))?;
        print_raw_rows(&rows);
        return Ok(());
    }

    let rows = client
        .results(id)
        .fetch_all()
        .await
        .with_context(|| format!("Failed to fetch results of query {}", id))?;

    if rows.is_empty() {
        println!("{}", "No rows returned.".yellow());
        return Ok(());
    }

    if json {
        for row in &rows {
            println!("{}", serde_json::to_string(row)?);
        }
    } else {
        for row in &rows {
            println!("{}", format_typed_row(row));
        }
        println!();
        println!("{}", format!("{} row(s)", rows.len()).dimmed());
    }

    Ok(())
}

/// Print detailed execution information
fn print_execution_details(execution: &QueryExecution) {
    println!("{}", "Query Details:".bold());
    println!("  ID:       {}", execution.query_execution_id.cyan());
    println!("  State:    {}", colorize_state(execution.status.state));

    if let Some(reason) = &execution.status.state_change_reason {
        println!("  Reason:   {}", reason);
    }

    if let Some(location) = execution.output_location() {
        println!("  Output:   {}", location.dimmed());
    }
}

fn print_raw_rows(rows: &[RawRow]) {
    for row in rows {
        println!("{}", csv::format_record(row));
    }
}

fn print_query_error(error: &ClientError) {
    match error {
        ClientError::QueryFailed { state, reason, .. } => {
            println!("{} Query {}", "✗".red(), colorize_state(*state));
            if !reason.is_empty() {
                println!("\n{}", "Reason:".bold());
                println!("{}", reason.red());
            }
        }
        ClientError::Timeout { attempts, .. } => {
            println!(
                "{} Gave up after {} status checks",
                "✗".red(),
                attempts.to_string().yellow()
            );
        }
        _ => {}
    }
}

/// Tab-separated rendering of a typed row
fn format_typed_row(row: &Row) -> String {
    row.iter()
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join("\t")
}

/// Colorize query state for display
fn colorize_state(state: QueryState) -> colored::ColoredString {
    let state_str = state.as_str();
    match state {
        QueryState::Queued => state_str.yellow(),
        QueryState::Running => state_str.cyan(),
        QueryState::Succeeded => state_str.green(),
        QueryState::Failed => state_str.red(),
        QueryState::Cancelled => state_str.dimmed(),
    }
}
