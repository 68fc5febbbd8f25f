//! CLI command implementations
//!
//! This module contains the implementation for each CLI command.

use crate::cli::{IndexArgs, OutputFormat};
use crate::data_source::{ChainSource, create_chain_source};
use crate::indexer::{BlockProcessor, NameHistory};
use crate::{Config, Result};

/// Build the chain source and processor for a run, and pick the start height
fn prepare(args: &IndexArgs, config: &Config) -> Result<(Box<dyn ChainSource>, BlockProcessor, u64)> {
    let source = create_chain_source(args.source, config, args.fixture.as_deref())?;

    let start_height = args
        .start_height
        .or_else(|| source.start_hint())
        .unwrap_or(config.indexer.start_height);
    let policy = args
        .conflict_policy
        .unwrap_or(config.indexer.conflict_policy);

    tracing::info!(
        "Indexing from height {} with {:?} conflict policy",
        start_height,
        policy
    );

    Ok((source, BlockProcessor::new(policy), start_height))
}

/// Replay the history and write it to stdout
fn print_history(
    format: OutputFormat,
    processed_up_to: Option<u64>,
    history: &NameHistory,
) -> Result<()> {
    let reports = crate::state_machine::replay(history);
    let mut stdout = std::io::stdout();
    match format {
        OutputFormat::Text => crate::cli::output::output_text(&mut stdout, processed_up_to, &reports),
        OutputFormat::Json => crate::cli::output::output_json(&mut stdout, processed_up_to, &reports),
    }
}

/// Index command implementation
pub mod index {
    use super::*;
    use crate::indexer::ChainWalker;

    /// Execute the index command
    pub async fn execute(args: IndexArgs, end_height: Option<u64>, config: Config) -> Result<()> {
        let (source, mut processor, start_height) = prepare(&args, &config)?;
        let end_height = end_height.or(config.indexer.end_height);

        let mut walker = ChainWalker::new(source.as_ref(), start_height).with_end_height(end_height);
        let summary = walker.run(&mut processor).await?;

        tracing::info!(
            "Processed {} blocks, {} spaces transactions, {} records ({} malformed meta outputs, {} conflicts)",
            summary.blocks,
            summary.relevant_txs,
            summary.records_applied,
            summary.malformed,
            summary.conflicts
        );

        print_history(args.output, processor.last_height(), processor.history())
    }
}

/// Watch command implementation
pub mod watch {
    use super::*;
    use crate::indexer::ChainWalker;
    use std::time::Duration;
    use tokio::sync::watch;

    /// Execute the watch command
    pub async fn execute(args: IndexArgs, interval: Option<u64>, config: Config) -> Result<()> {
        let (source, mut processor, start_height) = prepare(&args, &config)?;
        let interval_secs = interval.unwrap_or(config.indexer.poll_interval_secs).max(1);

        // One listener for the whole run, so a Ctrl-C during a walk is not lost
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let signal = tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    stop_tx.send_replace(true);
                }
                Err(e) => tracing::error!("Failed to listen for Ctrl-C: {}", e),
            }
        });

        let mut walker = ChainWalker::new(source.as_ref(), start_height).with_stop(stop_rx.clone());
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));

        tracing::info!("Watching for new blocks every {}s, Ctrl-C to stop", interval_secs);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    // The walker only stops between blocks, never inside one
                    let summary = walker.run(&mut processor).await?;
                    if summary.blocks > 0 {
                        tracing::info!(
                            "Advanced {} blocks to height {:?}",
                            summary.blocks,
                            summary.last_height
                        );
                        print_history(args.output, processor.last_height(), processor.history())?;
                    }
                }
                Ok(()) = stop_rx.changed() => {
                    tracing::info!("Stopping watch at height {:?}", processor.last_height());
                    break;
                }
            }
        }

        signal.abort();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::DataSourceType;
    use crate::data_source::mock::SAMPLE_START_HEIGHT;
    use crate::indexer::ConflictPolicy;

    fn mock_args() -> IndexArgs {
        IndexArgs {
            source: DataSourceType::Mock,
            fixture: None,
            start_height: None,
            conflict_policy: None,
            output: OutputFormat::Text,
        }
    }

    #[test]
    fn test_prepare_uses_source_start() {
        let (_, processor, start) = prepare(&mock_args(), &Config::default()).unwrap();
        assert_eq!(start, SAMPLE_START_HEIGHT);
        assert_eq!(processor.history().policy(), ConflictPolicy::Reject);
    }

    #[test]
    fn test_prepare_cli_overrides_config() {
        let mut config = Config::default();
        config.indexer.conflict_policy = ConflictPolicy::Reset;

        let args = IndexArgs {
            start_height: Some(102),
            ..mock_args()
        };
        let (_, processor, start) = prepare(&args, &config).unwrap();
        assert_eq!(start, 102);
        assert_eq!(processor.history().policy(), ConflictPolicy::Reset);
    }

    #[tokio::test]
    async fn test_index_sample_chain() {
        let result = index::execute(mock_args(), None, Config::default()).await;
        assert!(result.is_ok());
    }
}
