//! Indexer module - classify Spaces transactions and fold them into name histories

pub mod classifier;
pub mod history;
pub mod processor;
pub mod record;
pub mod walker;

// Re-export key types
pub use classifier::{Classification, classify};
pub use history::{ConflictPolicy, NameEntry, NameHistory};
pub use processor::{BlockOutcome, BlockProcessor};
pub use record::{ActionKind, ActionRecord, HistoryRecord, MetaRecord, OutputRecord, Record};
pub use walker::{ChainWalker, WalkSummary};
