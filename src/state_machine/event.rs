//! Lifecycle event representation

use crate::indexer::{ActionKind, ActionRecord, HistoryRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic event derived from a covenant transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// First bid of an auction, carrying the claim height
    Rollout { claim_height: u64 },
    Bid { amount: Option<u64> },
    Transfer,
    /// A bid followed by a transfer: the auction was won and the space claimed
    Register,
}

impl LifecycleEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::Rollout { .. } => "Rollout",
            LifecycleEvent::Bid { .. } => "Bid",
            LifecycleEvent::Transfer => "Transfer",
            LifecycleEvent::Register => "Register",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LifecycleEvent::Rollout { claim_height } => {
                write!(f, "Rollout (claim height {})", claim_height)
            }
            LifecycleEvent::Bid { amount: Some(amount) } => write!(f, "Bid: {} sats", amount),
            LifecycleEvent::Bid { amount: None } => write!(f, "Bid: unknown amount"),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// An event together with the record that produced it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifiedEvent<'a> {
    pub event: LifecycleEvent,
    pub record: &'a HistoryRecord,
}

/// Notice reported instead of events for a terminal entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "action", rename_all = "snake_case")]
pub enum TerminalNotice {
    Revoked,
    Rejected,
    Other(String),
}

impl From<&ActionRecord> for TerminalNotice {
    fn from(record: &ActionRecord) -> Self {
        match &record.action {
            ActionKind::Revoke => TerminalNotice::Revoked,
            ActionKind::Reject => TerminalNotice::Rejected,
            ActionKind::Other(tag) => TerminalNotice::Other(tag.clone()),
        }
    }
}

impl fmt::Display for TerminalNotice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TerminalNotice::Revoked => write!(f, "Revoked"),
            TerminalNotice::Rejected => write!(f, "Rejected"),
            TerminalNotice::Other(tag) => write!(f, "Action: {}", tag),
        }
    }
}
