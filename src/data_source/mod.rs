//! Data source module - Abstraction for fetching blocks and Spaces data
//!
//! This module provides a trait-based abstraction for supplying blocks and their
//! protocol-relevant transactions from multiple sources (node RPC, mock data).

use crate::{Config, Result};
use async_trait::async_trait;
use std::path::Path;

pub mod mock;
pub mod models;
pub mod rpc;

// Re-export models
use crate::cli::DataSourceType;
pub use models::{
    ActionTarget, BlockBody, BlockData, Covenant, CovenantKind, Locator, MetaOutput, Transaction,
    TxOutput,
};

/// Chain source trait for fetching blocks and Spaces transaction data
///
/// Implementations provide different backends:
/// - `RpcChainSource`: Bitcoin Core + spaced JSON-RPC
/// - `MockChainSource`: In-memory chain loaded from a fixture
#[async_trait]
pub trait ChainSource: Send + Sync {
    /// Height of the current chain tip, `None` while the source has no blocks
    async fn tip_height(&self) -> Result<Option<u64>>;

    /// Block hash at a given height
    async fn block_hash(&self, height: u64) -> Result<String>;

    /// Full block by hash
    async fn block(&self, block_hash: &str) -> Result<BlockBody>;

    /// Transactions relevant to the Spaces protocol in the given block.
    /// Blocks without Spaces activity yield an empty list.
    async fn relevant_transactions(&self, block_hash: &str) -> Result<Vec<Transaction>>;

    /// Height this source naturally starts at, if it has one
    fn start_hint(&self) -> Option<u64> {
        None
    }
}

/// Create a chain source instance based on type and configuration
pub fn create_chain_source(
    source_type: DataSourceType,
    config: &Config,
    fixture: Option<&Path>,
) -> Result<Box<dyn ChainSource>> {
    match source_type {
        DataSourceType::Mock => {
            let source = match fixture {
                Some(path) => mock::MockChainSource::from_file(path)?,
                None => mock::MockChainSource::sample(),
            };
            Ok(Box::new(source))
        }
        DataSourceType::Rpc => Ok(Box::new(rpc::RpcChainSource::from_config(config)?)),
    }
}
