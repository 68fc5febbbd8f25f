//! Spaces Name Indexer
//!
//! A simple indexer that reconstructs the lifecycle of Spaces names carried in
//! Bitcoin transactions.
//!
//! This library provides functionality for:
//! - Fetching blocks and Spaces transaction data (Bitcoin Core + spaced RPC, mock data)
//! - Classifying outputs and meta outputs into per-name records
//! - Folding records into an insertion-ordered name history
//! - Replaying each history through the covenant state machine
//!   (rollout, bid, register, transfer, revoke, reject)

pub mod cli;
pub mod config;
pub mod data_source;
pub mod error;
pub mod indexer;
pub mod state_machine;

pub use config::Config;
pub use error::{Error, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize logging with the given log level
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
