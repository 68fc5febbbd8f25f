//! CLI module
//!
//! This module defines the command-line interface using clap and implements
//! the command execution logic.

use crate::indexer::ConflictPolicy;
use crate::{Config, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;
pub mod output;

/// Spaces name indexer CLI
#[derive(Parser, Debug)]
#[command(name = "spaces-indexer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every indexing command
#[derive(Args, Debug, Clone)]
pub struct IndexArgs {
    /// Data source type
    #[arg(short, long, value_enum, default_value = "rpc")]
    pub source: DataSourceType,

    /// JSON chain fixture for the mock source
    #[arg(long)]
    pub fixture: Option<PathBuf>,

    /// First block height to process (overrides config)
    #[arg(long)]
    pub start_height: Option<u64>,

    /// What to do with records for a space that was already revoked or rejected
    #[arg(long, value_enum)]
    pub conflict_policy: Option<ConflictPolicy>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Index from the start height to the chain tip and print the name history
    Index {
        #[command(flatten)]
        args: IndexArgs,

        /// Last block height to process (overrides config)
        #[arg(long)]
        end_height: Option<u64>,
    },

    /// Index to the tip, then keep polling for new blocks
    Watch {
        #[command(flatten)]
        args: IndexArgs,

        /// Polling interval in seconds (overrides config)
        #[arg(long)]
        interval: Option<u64>,
    },
}

/// Data source types
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DataSourceType {
    /// In-memory chain for testing
    Mock,
    /// Bitcoin Core and spaced JSON-RPC
    Rpc,
}

/// Output format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text history
    Text,
    /// JSON output
    Json,
}

/// Execute the CLI command
pub async fn execute(args: Cli, config: Config) -> Result<()> {
    match args.command {
        Commands::Index { args, end_height } => {
            commands::index::execute(args, end_height, config).await
        }
        Commands::Watch { args, interval } => commands::watch::execute(args, interval, config).await,
    }
}
