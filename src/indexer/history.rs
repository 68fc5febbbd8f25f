//! Name history store
//!
//! Maps each space name to either its ordered history of records or a single
//! terminal action. Names iterate in the order they were first touched.

use crate::indexer::record::{ActionRecord, HistoryRecord};
use crate::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// What to do when a record is appended to a name already marked terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Refuse the append with a consistency error
    #[default]
    Reject,
    /// Drop the terminal marker and start a fresh history
    Reset,
}

/// Tracked state of a single name
#[derive(Debug, Clone, PartialEq)]
pub enum NameEntry {
    History(Vec<HistoryRecord>),
    Terminal(ActionRecord),
}

impl NameEntry {
    pub fn is_terminal(&self) -> bool {
        matches!(self, NameEntry::Terminal(_))
    }

    /// Stored records, empty for terminal entries
    pub fn records(&self) -> &[HistoryRecord] {
        match self {
            NameEntry::History(records) => records,
            NameEntry::Terminal(_) => &[],
        }
    }
}

/// Insertion-ordered history of every name seen during a run
#[derive(Debug, Clone, Default)]
pub struct NameHistory {
    entries: IndexMap<String, NameEntry>,
    policy: ConflictPolicy,
}

impl NameHistory {
    pub fn new(policy: ConflictPolicy) -> Self {
        Self {
            entries: IndexMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    /// Append a record to a name's history, creating the entry if needed
    pub fn append(&mut self, name: &str, record: HistoryRecord) -> Result<()> {
        match self.entries.get_mut(name) {
            None => {
                self.entries
                    .insert(name.to_string(), NameEntry::History(vec![record]));
            }
            Some(NameEntry::History(records)) => records.push(record),
            Some(entry @ NameEntry::Terminal(_)) => match self.policy {
                ConflictPolicy::Reject => return Err(Error::consistency(name)),
                ConflictPolicy::Reset => {
                    tracing::warn!("'{}' was terminal, starting a new history", name);
                    *entry = NameEntry::History(vec![record]);
                }
            },
        }
        Ok(())
    }

    /// Replace whatever is tracked for `name` with a terminal action
    pub fn set_terminal(&mut self, name: &str, action: ActionRecord) {
        // Existing keys keep their position in iteration order
        self.entries
            .insert(name.to_string(), NameEntry::Terminal(action));
    }

    pub fn get(&self, name: &str) -> Option<&NameEntry> {
        self.entries.get(name)
    }

    /// Iterate names in order of first reference
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NameEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::{Covenant, Locator};
    use crate::indexer::record::{ActionKind, OutputRecord};

    fn output(name: &str, txid: &str, height: u64) -> HistoryRecord {
        HistoryRecord::Output(OutputRecord {
            name: name.to_string(),
            locator: Locator::new(txid, 0),
            covenant: Some(Covenant::transfer()),
            value: None,
            height,
        })
    }

    fn revoke(name: &str) -> ActionRecord {
        ActionRecord {
            action: ActionKind::Revoke,
            target: name.to_string(),
            txid: "ff".to_string(),
            reason: None,
            height: 50,
        }
    }

    #[test]
    fn test_append_preserves_feed_order() {
        let mut history = NameHistory::default();
        let records = vec![
            output("@alice", "t1", 1),
            output("@alice", "t3", 3),
            output("@alice", "t2", 2),
            output("@alice", "t2", 2),
        ];
        for record in &records {
            history.append("@alice", record.clone()).unwrap();
        }

        assert_eq!(history.get("@alice").unwrap().records(), records.as_slice());
    }

    #[test]
    fn test_iteration_follows_first_reference() {
        let mut history = NameHistory::default();
        history.append("@zed", output("@zed", "t1", 1)).unwrap();
        history.append("@amy", output("@amy", "t1", 1)).unwrap();
        history.set_terminal("@kim", revoke("@kim"));
        history.append("@zed", output("@zed", "t2", 2)).unwrap();
        history.set_terminal("@zed", revoke("@zed"));

        let names: Vec<&str> = history.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["@zed", "@amy", "@kim"]);
    }

    #[test]
    fn test_terminal_overwrites_history() {
        let mut history = NameHistory::default();
        history.append("@bob", output("@bob", "t1", 1)).unwrap();
        history.append("@bob", output("@bob", "t2", 2)).unwrap();
        history.set_terminal("@bob", revoke("@bob"));

        let entry = history.get("@bob").unwrap();
        assert_eq!(entry, &NameEntry::Terminal(revoke("@bob")));
        assert!(entry.records().is_empty());
    }

    #[test]
    fn test_append_after_terminal_rejected_by_default() {
        let mut history = NameHistory::default();
        assert_eq!(history.policy(), ConflictPolicy::Reject);
        history.set_terminal("@bob", revoke("@bob"));

        let err = history.append("@bob", output("@bob", "t3", 3)).unwrap_err();
        assert!(matches!(err, Error::Consistency { ref name } if name == "@bob"));
        assert!(history.get("@bob").unwrap().is_terminal());
    }

    #[test]
    fn test_append_after_terminal_resets_when_configured() {
        let mut history = NameHistory::new(ConflictPolicy::Reset);
        history.set_terminal("@bob", revoke("@bob"));
        history.append("@bob", output("@bob", "t3", 3)).unwrap();

        assert_eq!(
            history.get("@bob").unwrap(),
            &NameEntry::History(vec![output("@bob", "t3", 3)])
        );
    }
}
