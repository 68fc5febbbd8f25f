//! Core data models for Spaces transactions
//!
//! This module defines the data structures returned by the Bitcoin node and the
//! Spaces protocol node: transactions, outputs, meta outputs, covenants and
//! output locators.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable reference to a transaction output (`txid:index`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    pub txid: String,
    pub output_index: u32,
}

impl Locator {
    pub fn new(txid: impl Into<String>, output_index: u32) -> Self {
        Self {
            txid: txid.into(),
            output_index,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.output_index)
    }
}

/// A transaction the Spaces node flagged as protocol relevant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction id
    pub txid: String,

    /// Regular outputs, in transaction order
    #[serde(default)]
    pub vout: Vec<TxOutput>,

    /// Meta outputs: space updates not tied to a new spendable output
    #[serde(default)]
    pub vmetaout: Vec<MetaOutput>,
}

/// Transaction output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TxOutput {
    /// Space name carried by this output, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Covenant describing the intended state transition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub covenant: Option<Covenant>,

    /// Output value in sats
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_pubkey: Option<String>,
}

/// Meta output
///
/// Either a named space update (`name` set) or an action against a space
/// (`action` + `target` set). Anything else is malformed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub covenant: Option<Covenant>,

    /// Action tag (revoke, reject)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<ActionTarget>,

    /// Human readable reason attached by the Spaces node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Target of a meta output action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionTarget {
    pub name: String,
}

/// Covenant attached to a space output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Covenant {
    #[serde(rename = "type")]
    pub kind: CovenantKind,

    /// Amount burned by a bid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_burned: Option<u64>,

    /// Height at which the auction claim period begins
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_height: Option<u64>,
}

impl Covenant {
    pub fn bid(total_burned: u64, claim_height: Option<u64>) -> Self {
        Self {
            kind: CovenantKind::Bid,
            total_burned: Some(total_burned),
            claim_height,
        }
    }

    pub fn transfer() -> Self {
        Self {
            kind: CovenantKind::Transfer,
            total_burned: None,
            claim_height: None,
        }
    }
}

/// Covenant type. Unknown types are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CovenantKind {
    Bid,
    Transfer,
    Other(String),
}

impl From<String> for CovenantKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "bid" => CovenantKind::Bid,
            "transfer" => CovenantKind::Transfer,
            _ => CovenantKind::Other(s),
        }
    }
}

impl From<CovenantKind> for String {
    fn from(kind: CovenantKind) -> Self {
        kind.as_str().to_string()
    }
}

impl CovenantKind {
    pub fn as_str(&self) -> &str {
        match self {
            CovenantKind::Bid => "bid",
            CovenantKind::Transfer => "transfer",
            CovenantKind::Other(s) => s,
        }
    }
}

/// Block returned by `getblock` (verbosity 1)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockBody {
    pub hash: String,

    #[serde(default)]
    pub height: u64,

    #[serde(default)]
    pub time: u64,

    #[serde(default, rename = "previousblockhash")]
    pub previous_block_hash: Option<String>,

    /// Transaction ids in block order
    #[serde(default)]
    pub tx: Vec<String>,
}

/// Response of the Spaces node `getblockdata` call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockData {
    #[serde(default)]
    pub tx_data: Vec<Transaction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_display() {
        let locator = Locator::new("abc123def", 5);
        assert_eq!(locator.to_string(), "abc123def:5");
    }

    #[test]
    fn test_covenant_kind_keeps_unknown_types() {
        let covenant: Covenant =
            serde_json::from_str(r#"{"type":"reserved","total_burned":null}"#).unwrap();
        assert_eq!(covenant.kind, CovenantKind::Other("reserved".to_string()));

        let json = serde_json::to_string(&covenant).unwrap();
        assert_eq!(json, r#"{"type":"reserved"}"#);
    }

    #[test]
    fn test_transaction_deserialization() {
        let json = r#"{
            "txid": "aa11",
            "vout": [
                {"value": 662, "script_pubkey": "5120"},
                {"name": "@alice", "covenant": {"type": "bid", "total_burned": 1000, "claim_height": 500}}
            ],
            "vmetaout": [
                {"action": "reject", "target": {"name": "@bob"}, "reason": "already exists"}
            ]
        }"#;

        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.vout.len(), 2);
        assert!(tx.vout[0].name.is_none());
        assert_eq!(tx.vout[1].name.as_deref(), Some("@alice"));
        assert_eq!(
            tx.vout[1].covenant,
            Some(Covenant::bid(1000, Some(500)))
        );
        assert_eq!(tx.vmetaout[0].target.as_ref().unwrap().name, "@bob");
    }

    #[test]
    fn test_block_data_defaults_to_empty() {
        let data: BlockData = serde_json::from_str("{}").unwrap();
        assert!(data.tx_data.is_empty());
    }
}
