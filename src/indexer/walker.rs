//! Chain walker
//!
//! Walks block heights from a start height up to the chain tip and feeds each
//! block, with its Spaces transactions, to the block processor.

use crate::data_source::ChainSource;
use crate::indexer::processor::BlockProcessor;
use crate::{Result, ensure};
use tokio::sync::watch;

/// Totals for one walk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkSummary {
    pub first_height: Option<u64>,
    pub last_height: Option<u64>,
    pub blocks: u64,
    pub relevant_txs: usize,
    pub records_applied: usize,
    pub malformed: usize,
    pub conflicts: usize,
}

impl WalkSummary {
    fn absorb(&mut self, height: u64, outcome: &crate::indexer::BlockOutcome) {
        self.first_height.get_or_insert(height);
        self.last_height = Some(height);
        self.blocks += 1;
        self.relevant_txs += outcome.relevant_txs;
        self.records_applied += outcome.records_applied;
        self.malformed += outcome.malformed;
        self.conflicts += outcome.conflicts.len();
    }
}

/// Sequential walker over a chain source
pub struct ChainWalker<'a> {
    source: &'a dyn ChainSource,
    next_height: u64,
    end_height: Option<u64>,
    stop: Option<watch::Receiver<bool>>,
}

impl<'a> ChainWalker<'a> {
    pub fn new(source: &'a dyn ChainSource, start_height: u64) -> Self {
        Self {
            source,
            next_height: start_height,
            end_height: None,
            stop: None,
        }
    }

    /// Halt between blocks once `stop` turns true
    pub fn with_stop(mut self, stop: watch::Receiver<bool>) -> Self {
        self.stop = Some(stop);
        self
    }

    fn stop_requested(&self) -> bool {
        self.stop.as_ref().is_some_and(|stop| *stop.borrow())
    }

    /// Stop after this height even if the chain is longer
    pub fn with_end_height(mut self, end_height: Option<u64>) -> Self {
        self.end_height = end_height;
        self
    }

    /// Next height the walker will request
    pub fn next_height(&self) -> u64 {
        self.next_height
    }

    /// Process every block from the current position to the tip (inclusive)
    pub async fn run(&mut self, processor: &mut BlockProcessor) -> Result<WalkSummary> {
        if let Some(end) = self.end_height {
            ensure!(
                end >= self.next_height,
                "end height {} is below start height {}",
                end,
                self.next_height
            );
        }

        let mut summary = WalkSummary::default();
        let Some(tip_height) = self.source.tip_height().await? else {
            tracing::info!("Chain source has no blocks yet");
            return Ok(summary);
        };

        if tip_height < self.next_height {
            if processor.last_height().is_some() {
                tracing::debug!("Already at chain tip {}", tip_height);
                return Ok(summary);
            }
            tracing::info!(
                "Bitcoin node is at height {}, below {}. It may still be syncing.",
                tip_height,
                self.next_height
            );
            return Ok(summary);
        }

        let tip = match self.end_height {
            Some(end) => end.min(tip_height),
            None => tip_height,
        };

        while self.next_height <= tip {
            if self.stop_requested() {
                tracing::info!("Stop requested, halting before height {}", self.next_height);
                break;
            }

            let height = self.next_height;
            let block_hash = self.source.block_hash(height).await?;
            let block = self.source.block(&block_hash).await?;
            let txs = self.source.relevant_transactions(&block_hash).await?;

            tracing::info!(
                "Process block height: {} block hash: {} space tx count: {}",
                height,
                block_hash,
                txs.len()
            );

            let outcome = processor.process_block(height, &block_hash, &block, &txs)?;
            summary.absorb(height, &outcome);
            self.next_height += 1;
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::mock::{MockChain, MockChainSource, SAMPLE_START_HEIGHT};
    use crate::data_source::{BlockBody, Transaction};
    use crate::indexer::history::{ConflictPolicy, NameEntry};
    use async_trait::async_trait;

    /// Sample chain that raises the stop flag while a given block is fetched
    struct StopDuringBlock {
        inner: MockChainSource,
        height: u64,
        stop: watch::Sender<bool>,
    }

    #[async_trait]
    impl ChainSource for StopDuringBlock {
        async fn tip_height(&self) -> Result<Option<u64>> {
            self.inner.tip_height().await
        }

        async fn block_hash(&self, height: u64) -> Result<String> {
            if height == self.height {
                self.stop.send_replace(true);
            }
            self.inner.block_hash(height).await
        }

        async fn block(&self, block_hash: &str) -> Result<BlockBody> {
            self.inner.block(block_hash).await
        }

        async fn relevant_transactions(&self, block_hash: &str) -> Result<Vec<Transaction>> {
            self.inner.relevant_transactions(block_hash).await
        }
    }

    #[tokio::test]
    async fn test_walk_sample_chain() {
        let source = MockChainSource::sample();
        let mut processor = BlockProcessor::new(ConflictPolicy::Reject);
        let mut walker = ChainWalker::new(&source, SAMPLE_START_HEIGHT);

        let summary = walker.run(&mut processor).await.unwrap();
        assert_eq!(summary.first_height, Some(SAMPLE_START_HEIGHT));
        assert_eq!(summary.last_height, Some(SAMPLE_START_HEIGHT + 4));
        assert_eq!(summary.blocks, 5);
        assert_eq!(summary.relevant_txs, 5);
        assert_eq!(summary.conflicts, 0);

        let names: Vec<&str> = processor.history().iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["@alice", "@bob", "@carol"]);
        assert!(matches!(
            processor.history().get("@bob"),
            Some(NameEntry::Terminal(_))
        ));

        // Nothing new on a second run
        let again = walker.run(&mut processor).await.unwrap();
        assert_eq!(again.blocks, 0);
    }

    #[tokio::test]
    async fn test_walk_stops_at_end_height() {
        let source = MockChainSource::sample();
        let mut processor = BlockProcessor::default();
        let mut walker =
            ChainWalker::new(&source, SAMPLE_START_HEIGHT).with_end_height(Some(SAMPLE_START_HEIGHT + 1));

        let summary = walker.run(&mut processor).await.unwrap();
        assert_eq!(summary.blocks, 2);
        assert_eq!(walker.next_height(), SAMPLE_START_HEIGHT + 2);
        assert_eq!(processor.history().len(), 1);
    }

    #[tokio::test]
    async fn test_node_still_syncing() {
        let source = MockChainSource::sample();
        let mut processor = BlockProcessor::default();
        let mut walker = ChainWalker::new(&source, SAMPLE_START_HEIGHT + 50);

        let summary = walker.run(&mut processor).await.unwrap();
        assert_eq!(summary, WalkSummary::default());
        assert_eq!(processor.last_height(), None);
    }

    #[tokio::test]
    async fn test_walk_demo_fixture() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/chain.json");
        let source = MockChainSource::from_file(&path).unwrap();
        let mut processor = BlockProcessor::default();

        let summary = ChainWalker::new(&source, 0).run(&mut processor).await.unwrap();
        assert_eq!(summary.blocks, 3);
        assert_eq!(summary.malformed, 1);
        assert_eq!(processor.history().get("@alice").unwrap().records().len(), 3);
        assert!(processor.history().get("@bob").unwrap().is_terminal());
    }

    #[tokio::test]
    async fn test_empty_chain_at_genesis() {
        let source = MockChainSource::new(MockChain {
            start_height: 0,
            blocks: vec![],
        });
        let mut processor = BlockProcessor::default();
        let mut walker = ChainWalker::new(&source, 0);

        let summary = walker.run(&mut processor).await.unwrap();
        assert_eq!(summary, WalkSummary::default());
        assert_eq!(walker.next_height(), 0);
        assert_eq!(processor.last_height(), None);
    }

    #[tokio::test]
    async fn test_stop_halts_after_whole_block() {
        let (tx, rx) = watch::channel(false);
        let source = StopDuringBlock {
            inner: MockChainSource::sample(),
            height: SAMPLE_START_HEIGHT + 2,
            stop: tx,
        };
        let mut processor = BlockProcessor::default();
        let mut walker = ChainWalker::new(&source, SAMPLE_START_HEIGHT).with_stop(rx);

        // Block 102 is already being fetched when the stop arrives, so it is folded in full
        let summary = walker.run(&mut processor).await.unwrap();
        assert_eq!(summary.blocks, 3);
        assert_eq!(summary.last_height, Some(SAMPLE_START_HEIGHT + 2));
        assert_eq!(processor.last_height(), Some(SAMPLE_START_HEIGHT + 2));
        assert_eq!(walker.next_height(), SAMPLE_START_HEIGHT + 3);
        assert_eq!(processor.history().get("@bob").unwrap().records().len(), 1);

        let again = walker.run(&mut processor).await.unwrap();
        assert_eq!(again.blocks, 0);
    }

    #[tokio::test]
    async fn test_end_below_start_is_an_error() {
        let source = MockChainSource::new(MockChain {
            start_height: 0,
            blocks: vec![],
        });
        let mut processor = BlockProcessor::default();
        let mut walker = ChainWalker::new(&source, 10).with_end_height(Some(3));

        assert!(walker.run(&mut processor).await.is_err());
    }
}
