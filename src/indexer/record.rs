//! Name state records
//!
//! Everything the classifier extracts from a transaction is one of three
//! record shapes. Only output and named meta records are ever stored in a
//! history list; action records replace the whole entry.

use crate::data_source::{Covenant, Locator};
use std::fmt;

/// A regular output carrying a space
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRecord {
    pub name: String,
    pub locator: Locator,
    pub covenant: Option<Covenant>,
    pub value: Option<u64>,
    pub height: u64,
}

/// A meta output updating a space without a new spendable output
#[derive(Debug, Clone, PartialEq)]
pub struct MetaRecord {
    pub name: String,
    pub txid: String,
    pub covenant: Option<Covenant>,
    pub height: u64,
}

/// A revoke or reject marker targeting a space
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRecord {
    pub action: ActionKind,
    pub target: String,
    pub txid: String,
    pub reason: Option<String>,
    pub height: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Revoke,
    Reject,
    Other(String),
}

impl From<String> for ActionKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "revoke" => ActionKind::Revoke,
            "reject" => ActionKind::Reject,
            _ => ActionKind::Other(s),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ActionKind::Revoke => write!(f, "revoke"),
            ActionKind::Reject => write!(f, "reject"),
            ActionKind::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Anything the classifier can emit for a name
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Output(OutputRecord),
    Meta(MetaRecord),
    Action(ActionRecord),
}

impl Record {
    /// Name whose entry this record touches
    pub fn name(&self) -> &str {
        match self {
            Record::Output(r) => &r.name,
            Record::Meta(r) => &r.name,
            Record::Action(r) => &r.target,
        }
    }
}

/// A record that can live inside a name's history list
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryRecord {
    Output(OutputRecord),
    Meta(MetaRecord),
}

impl HistoryRecord {
    pub fn covenant(&self) -> Option<&Covenant> {
        match self {
            HistoryRecord::Output(r) => r.covenant.as_ref(),
            HistoryRecord::Meta(r) => r.covenant.as_ref(),
        }
    }

    pub fn height(&self) -> u64 {
        match self {
            HistoryRecord::Output(r) => r.height,
            HistoryRecord::Meta(r) => r.height,
        }
    }

    pub fn txid(&self) -> &str {
        match self {
            HistoryRecord::Output(r) => &r.locator.txid,
            HistoryRecord::Meta(r) => &r.txid,
        }
    }

    /// Output locator, if this record is a spendable output
    pub fn locator(&self) -> Option<&Locator> {
        match self {
            HistoryRecord::Output(r) => Some(&r.locator),
            HistoryRecord::Meta(_) => None,
        }
    }
}
