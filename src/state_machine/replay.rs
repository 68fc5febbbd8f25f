//! History replay
//!
//! Produces one report per name, in the order names were first seen.

use crate::indexer::{HistoryRecord, NameEntry, NameHistory};
use crate::state_machine::{LifecycleEvent, TerminalNotice, covenant_events};
use serde::{Deserialize, Serialize};

/// One classified event with where it was observed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEntry {
    pub event: LifecycleEvent,
    pub height: u64,
    pub txid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locator: Option<String>,
}

impl EventEntry {
    fn new(event: LifecycleEvent, record: &HistoryRecord) -> Self {
        Self {
            event,
            height: record.height(),
            txid: record.txid().to_string(),
            locator: record.locator().map(ToString::to_string),
        }
    }
}

/// Replayed state of a name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NameStatus {
    Active {
        events: Vec<EventEntry>,
    },
    Terminal {
        notice: TerminalNotice,
        height: u64,
        txid: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameReport {
    pub name: String,
    #[serde(flatten)]
    pub status: NameStatus,
}

/// Replay a single entry
pub fn replay_entry(name: &str, entry: &NameEntry) -> NameReport {
    let status = match entry {
        NameEntry::History(records) => NameStatus::Active {
            events: covenant_events(records)
                .map(|classified| EventEntry::new(classified.event, classified.record))
                .collect(),
        },
        NameEntry::Terminal(action) => NameStatus::Terminal {
            notice: TerminalNotice::from(action),
            height: action.height,
            txid: action.txid.clone(),
            reason: action.reason.clone(),
        },
    };

    NameReport {
        name: name.to_string(),
        status,
    }
}

/// Replay every name in the history
pub fn replay(history: &NameHistory) -> Vec<NameReport> {
    history
        .iter()
        .map(|(name, entry)| replay_entry(name, entry))
        .collect()
}
