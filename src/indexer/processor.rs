//! Block processor
//!
//! Folds the protocol-relevant transactions of one block into the name history.

use crate::data_source::{BlockBody, Transaction};
use crate::indexer::classifier::classify;
use crate::indexer::history::{ConflictPolicy, NameHistory};
use crate::indexer::record::{HistoryRecord, Record};
use crate::{Error, Result};
use std::collections::HashSet;

/// What a single block contributed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockOutcome {
    pub height: u64,
    pub relevant_txs: usize,
    pub records_applied: usize,
    pub malformed: usize,
    /// Names whose records were refused for this block
    pub conflicts: Vec<String>,
}

/// Owns the name history for one indexing run
#[derive(Debug, Default)]
pub struct BlockProcessor {
    history: NameHistory,
    last_height: Option<u64>,
}

impl BlockProcessor {
    pub fn new(policy: ConflictPolicy) -> Self {
        Self {
            history: NameHistory::new(policy),
            last_height: None,
        }
    }

    pub fn history(&self) -> &NameHistory {
        &self.history
    }

    pub fn into_history(self) -> NameHistory {
        self.history
    }

    /// Height of the last block processed
    pub fn last_height(&self) -> Option<u64> {
        self.last_height
    }

    /// Process one block
    ///
    /// Heights must arrive consecutively. A conflict on one name stops that
    /// name's remaining records in this block; the rest of the block is still
    /// applied.
    pub fn process_block(
        &mut self,
        height: u64,
        block_hash: &str,
        _block: &BlockBody,
        relevant_txs: &[Transaction],
    ) -> Result<BlockOutcome> {
        if let Some(last) = self.last_height
            && height != last + 1
        {
            return Err(Error::OutOfOrderBlock {
                expected: last + 1,
                got: height,
            });
        }
        self.last_height = Some(height);

        let mut outcome = BlockOutcome {
            height,
            relevant_txs: relevant_txs.len(),
            ..BlockOutcome::default()
        };

        if relevant_txs.is_empty() {
            return Ok(outcome);
        }

        tracing::debug!(
            "Folding {} spaces transactions from block {} ({})",
            relevant_txs.len(),
            height,
            block_hash
        );

        let mut aborted: HashSet<String> = HashSet::new();
        for tx in relevant_txs {
            let classification = classify(tx, height);
            outcome.malformed += classification.malformed;

            for record in classification.records {
                let name = record.name().to_string();
                // Terminal actions always land, even on a name that conflicted earlier
                if aborted.contains(&name) && !matches!(record, Record::Action(_)) {
                    tracing::debug!("Skipping record for '{}' after conflict", name);
                    continue;
                }

                let applied = match record {
                    Record::Output(r) => self.history.append(&name, HistoryRecord::Output(r)),
                    Record::Meta(r) => self.history.append(&name, HistoryRecord::Meta(r)),
                    Record::Action(r) => {
                        self.history.set_terminal(&name, r);
                        Ok(())
                    }
                };

                match applied {
                    Ok(()) => outcome.records_applied += 1,
                    Err(e) if e.is_consistency() => {
                        tracing::error!("Block {} tx {}: {}", height, tx.txid, e);
                        aborted.insert(name.clone());
                        outcome.conflicts.push(name);
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        Ok(outcome)
    }
}
