//! Quotebook CLI - keep a quote collection from the terminal
//!
//! Quotes live in a local SQLite file and can be reconciled with a remote
//! source using last-writer-wins.

mod cli;
mod commands;
mod error;
#[cfg(test)]
mod tests;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::common::Context;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::export::run_export;
use crate::commands::import::run_import;
use crate::commands::list::{run_categories, run_filter, run_list};
use crate::commands::random::run_random;
use crate::commands::sync::{run_sync, run_watch};
use crate::error::CliError;

const DEFAULT_LOG_DIRECTIVE: &str = "quotebook=info";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Completions never touch config or the database.
    if let Some(Commands::Completions { shell, output }) = &cli.command {
        return run_completions(*shell, output.as_deref());
    }

    let ctx = Context::resolve(cli.config, cli.db_path)?;

    match cli.command {
        Some(Commands::Add {
            text,
            author,
            category,
        }) => run_add(&text, author.as_deref(), category.as_deref(), &ctx).await?,
        Some(Commands::Random { category }) => run_random(category.as_deref(), &ctx)?,
        Some(Commands::List { category, json }) => run_list(category.as_deref(), json, &ctx)?,
        Some(Commands::Categories) => run_categories(&ctx)?,
        Some(Commands::Filter { name }) => run_filter(name.as_deref(), &ctx)?,
        Some(Commands::Import { file }) => run_import(&file, &ctx)?,
        Some(Commands::Export { output, dir }) => run_export(output, dir.as_deref(), &ctx)?,
        Some(Commands::Sync) => run_sync(&ctx).await?,
        Some(Commands::Watch { interval }) => run_watch(interval, &ctx).await?,
        Some(Commands::Config { command }) => run_config(command, &ctx)?,
        Some(Commands::Completions { .. }) => {}
        None => {
            Cli::command().print_help().map_err(CliError::Io)?;
            println!();
        }
    }

    Ok(())
}
