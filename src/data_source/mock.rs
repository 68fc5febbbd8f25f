//! Mock data source for testing and development
//!
//! Serves an in-memory chain, either loaded from a JSON fixture or the built-in
//! sample which walks a few spaces through an auction, a revocation and a
//! rejected open.

use super::{BlockBody, ChainSource, Covenant, MetaOutput, Transaction, TxOutput};
use crate::data_source::ActionTarget;
use crate::{Error, Result};
use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Height of the first block in the built-in sample
pub const SAMPLE_START_HEIGHT: u64 = 100;

/// One block of a mock chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockBlock {
    pub hash: String,
    #[serde(default)]
    pub tx_data: Vec<Transaction>,
}

/// Fixture file layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockChain {
    pub start_height: u64,
    pub blocks: Vec<MockBlock>,
}

/// Mock chain source providing blocks from memory
#[derive(Debug, Clone)]
pub struct MockChainSource {
    chain: MockChain,
}

impl MockChainSource {
    pub fn new(chain: MockChain) -> Self {
        Self { chain }
    }

    /// Load a chain from a JSON fixture
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture {:?}", path))?;
        let chain: MockChain = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse fixture {:?}", path))?;
        Ok(Self::new(chain))
    }

    pub fn start_height(&self) -> u64 {
        self.chain.start_height
    }

    fn find(&self, block_hash: &str) -> Result<(u64, &MockBlock)> {
        self.chain
            .blocks
            .iter()
            .enumerate()
            .find(|(_, b)| b.hash == block_hash)
            .map(|(i, b)| (self.chain.start_height + i as u64, b))
            .ok_or_else(|| Error::data_source(format!("unknown block {}", block_hash)))
    }

    /// Built-in sample chain
    pub fn sample() -> Self {
        let named = |name: &str, covenant: Option<Covenant>| TxOutput {
            name: Some(name.to_string()),
            covenant,
            value: Some(662),
            script_pubkey: None,
        };
        let action = |action: &str, target: &str, reason: Option<&str>| MetaOutput {
            action: Some(action.to_string()),
            target: Some(ActionTarget {
                name: target.to_string(),
            }),
            reason: reason.map(str::to_string),
            ..MetaOutput::default()
        };

        let blocks = vec![
            MockBlock {
                hash: "000000000000000000000000000000000000000000000000000000000000a100".into(),
                tx_data: vec![Transaction {
                    txid: "1a".repeat(32),
                    vout: vec![
                        TxOutput::default(),
                        named("@alice", Some(Covenant::bid(1000, Some(500)))),
                    ],
                    vmetaout: vec![],
                }],
            },
            MockBlock {
                hash: "000000000000000000000000000000000000000000000000000000000000a101".into(),
                tx_data: vec![],
            },
            MockBlock {
                hash: "000000000000000000000000000000000000000000000000000000000000a102".into(),
                tx_data: vec![
                    Transaction {
                        txid: "2b".repeat(32),
                        vout: vec![named("@alice", Some(Covenant::bid(2000, None)))],
                        vmetaout: vec![],
                    },
                    Transaction {
                        txid: "3c".repeat(32),
                        vout: vec![named("@bob", Some(Covenant::bid(500, Some(510))))],
                        vmetaout: vec![],
                    },
                ],
            },
            MockBlock {
                hash: "000000000000000000000000000000000000000000000000000000000000a103".into(),
                tx_data: vec![Transaction {
                    txid: "4d".repeat(32),
                    vout: vec![
                        named("@alice", Some(Covenant::transfer())),
                        named("@bob", Some(Covenant::bid(700, None))),
                    ],
                    vmetaout: vec![action("reject", "@carol", Some("space already exists"))],
                }],
            },
            MockBlock {
                hash: "000000000000000000000000000000000000000000000000000000000000a104".into(),
                tx_data: vec![Transaction {
                    txid: "5e".repeat(32),
                    vout: vec![],
                    vmetaout: vec![action("revoke", "@bob", None)],
                }],
            },
        ];

        Self::new(MockChain {
            start_height: SAMPLE_START_HEIGHT,
            blocks,
        })
    }
}

#[async_trait]
impl ChainSource for MockChainSource {
    async fn tip_height(&self) -> Result<Option<u64>> {
        let len = self.chain.blocks.len() as u64;
        Ok(len.checked_sub(1).map(|last| self.chain.start_height + last))
    }

    async fn block_hash(&self, height: u64) -> Result<String> {
        height
            .checked_sub(self.chain.start_height)
            .and_then(|i| self.chain.blocks.get(i as usize))
            .map(|b| b.hash.clone())
            .ok_or_else(|| Error::data_source(format!("block height {} out of range", height)))
    }

    async fn block(&self, block_hash: &str) -> Result<BlockBody> {
        let (height, block) = self.find(block_hash)?;
        let previous_block_hash = height
            .checked_sub(self.chain.start_height + 1)
            .and_then(|i| self.chain.blocks.get(i as usize))
            .map(|b| b.hash.clone());

        Ok(BlockBody {
            hash: block.hash.clone(),
            height,
            time: 0,
            previous_block_hash,
            tx: block.tx_data.iter().map(|tx| tx.txid.clone()).collect(),
        })
    }

    async fn relevant_transactions(&self, block_hash: &str) -> Result<Vec<Transaction>> {
        Ok(self.find(block_hash)?.1.tx_data.clone())
    }

    fn start_hint(&self) -> Option<u64> {
        Some(self.chain.start_height)
    }
}
