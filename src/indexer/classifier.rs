//! Transaction classifier
//!
//! Turns one protocol-relevant transaction into the records it contributes to
//! the name history. Pure: the transaction is never mutated and no store is
//! consulted.

use crate::data_source::{Locator, Transaction};
use crate::indexer::record::{ActionKind, ActionRecord, MetaRecord, OutputRecord, Record};

/// Records extracted from a single transaction, in discovery order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    pub records: Vec<Record>,
    /// Meta outputs carrying neither a name nor an action
    pub malformed: usize,
}

/// Classify a transaction found in the block at `height`
///
/// Outputs come first in index order, then meta outputs in their listed order.
pub fn classify(tx: &Transaction, height: u64) -> Classification {
    let mut classification = Classification::default();

    for (output_index, output) in tx.vout.iter().enumerate() {
        let Some(name) = &output.name else {
            continue;
        };

        let locator = Locator::new(&tx.txid, output_index as u32);
        tracing::debug!("Found '{}' in {}", name, locator);

        classification.records.push(Record::Output(OutputRecord {
            name: name.clone(),
            locator,
            covenant: output.covenant.clone(),
            value: output.value,
            height,
        }));
    }

    for meta in &tx.vmetaout {
        if let Some(name) = &meta.name {
            tracing::debug!("Found meta output for '{}' in {}", name, tx.txid);
            classification.records.push(Record::Meta(MetaRecord {
                name: name.clone(),
                txid: tx.txid.clone(),
                covenant: meta.covenant.clone(),
                height,
            }));
            continue;
        }

        // A revoke hits an existing space, a reject refuses the transaction
        // (e.g. opening a name that already exists)
        if let (Some(action), Some(target)) = (&meta.action, &meta.target) {
            tracing::debug!("Found '{}' action for '{}' in {}", action, target.name, tx.txid);
            classification.records.push(Record::Action(ActionRecord {
                action: ActionKind::from(action.clone()),
                target: target.name.clone(),
                txid: tx.txid.clone(),
                reason: meta.reason.clone(),
                height,
            }));
            continue;
        }

        tracing::error!("Unknown meta output type in {}: {:?}", tx.txid, meta);
        classification.malformed += 1;
    }

    classification
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::{ActionTarget, Covenant, MetaOutput, TxOutput};

    fn named_output(name: &str, covenant: Option<Covenant>) -> TxOutput {
        TxOutput {
            name: Some(name.to_string()),
            covenant,
            ..TxOutput::default()
        }
    }

    #[test]
    fn test_locator_is_txid_and_output_index() {
        let tx = Transaction {
            txid: "abcd".to_string(),
            vout: vec![
                TxOutput::default(),
                named_output("@alice", None),
                TxOutput::default(),
                named_output("@bob", Some(Covenant::transfer())),
            ],
            vmetaout: vec![],
        };

        let classification = classify(&tx, 10);
        let locators: Vec<String> = classification
            .records
            .iter()
            .map(|r| match r {
                Record::Output(o) => o.locator.to_string(),
                other => panic!("unexpected record {:?}", other),
            })
            .collect();
        assert_eq!(locators, vec!["abcd:1", "abcd:3"]);
    }

    #[test]
    fn test_outputs_without_name_are_ignored() {
        let tx = Transaction {
            txid: "abcd".to_string(),
            vout: vec![TxOutput {
                covenant: Some(Covenant::transfer()),
                ..TxOutput::default()
            }],
            vmetaout: vec![],
        };

        assert!(classify(&tx, 1).records.is_empty());
    }

    #[test]
    fn test_meta_outputs() {
        let tx = Transaction {
            txid: "ee".to_string(),
            vout: vec![],
            vmetaout: vec![
                MetaOutput {
                    name: Some("@alice".to_string()),
                    ..MetaOutput::default()
                },
                MetaOutput {
                    action: Some("revoke".to_string()),
                    target: Some(ActionTarget {
                        name: "@bob".to_string(),
                    }),
                    ..MetaOutput::default()
                },
            ],
        };

        let classification = classify(&tx, 4);
        assert_eq!(classification.malformed, 0);
        assert!(matches!(&classification.records[0], Record::Meta(m) if m.name == "@alice"));
        assert!(matches!(
            &classification.records[1],
            Record::Action(a) if a.target == "@bob" && a.action == ActionKind::Revoke
        ));
    }

    #[test]
    fn test_malformed_meta_output_is_skipped() {
        let tx = Transaction {
            txid: "ee".to_string(),
            vout: vec![],
            vmetaout: vec![
                MetaOutput::default(),
                MetaOutput {
                    action: Some("revoke".to_string()),
                    ..MetaOutput::default()
                },
                MetaOutput {
                    name: Some("@alice".to_string()),
                    ..MetaOutput::default()
                },
            ],
        };

        let classification = classify(&tx, 4);
        assert_eq!(classification.malformed, 2);
        assert_eq!(classification.records.len(), 1);
        assert_eq!(classification.records[0].name(), "@alice");
    }

    #[test]
    fn test_classification_is_repeatable() {
        let tx = Transaction {
            txid: "abcd".to_string(),
            vout: vec![named_output("@alice", Some(Covenant::bid(1, Some(2))))],
            vmetaout: vec![MetaOutput::default()],
        };
        let before = tx.clone();

        assert_eq!(classify(&tx, 5), classify(&tx, 5));
        assert_eq!(tx, before);
    }
}
