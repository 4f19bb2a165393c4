use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "quotebook")]
#[command(about = "Keep a quote collection and sync it with a remote source")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Optional path to the config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a quote
    #[command(alias = "new")]
    Add {
        /// Quote text (read from stdin when omitted)
        text: Vec<String>,
        /// Who said it
        #[arg(short, long)]
        author: Option<String>,
        /// Category to file it under
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show a random quote
    Random {
        /// Category to pick from (defaults to the remembered filter)
        #[arg(short, long)]
        category: Option<String>,
    },
    /// List quotes
    List {
        /// Only show quotes in this category
        #[arg(short, long)]
        category: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List known categories
    Categories,
    /// Show or set the remembered category filter
    Filter {
        /// Category name, or `all` to clear
        name: Option<String>,
    },
    /// Import quotes from a JSON file
    Import {
        /// File containing a JSON array of quotes
        file: PathBuf,
    },
    /// Export all quotes as JSON
    Export {
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH", conflicts_with = "dir")]
        output: Option<PathBuf>,
        /// Write a timestamped file into this directory
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },
    /// Run one sync cycle against the remote source
    Sync,
    /// Sync periodically until interrupted
    Watch {
        /// Seconds between cycles (overrides config)
        #[arg(long, value_name = "SECS")]
        interval: Option<u64>,
    },
    /// Manage the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Create or update the config file
    Init {
        /// Remote endpoint to fetch quotes from
        #[arg(long, value_name = "URL")]
        fetch_url: Option<String>,
        /// Remote endpoint new quotes are posted to
        #[arg(long, value_name = "URL")]
        push_url: Option<String>,
        /// Seconds between periodic sync cycles
        #[arg(long, value_name = "SECS")]
        sync_interval: Option<u64>,
        /// Disable all remote traffic
        #[arg(long, conflicts_with = "enable_remote")]
        disable_remote: bool,
        /// Re-enable remote traffic
        #[arg(long)]
        enable_remote: bool,
    },
}
