//! Raw transaction records as returned by the indexer
//!
//! Field names follow the indexer's JSON (`amountin`, `scriptPubKey`). The
//! same shapes are persisted as the wallet's transaction history.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxRecord {
    pub txid: String,
    #[serde(default)]
    pub confirmations: i64,
    /// Block time in unix seconds; 0 for unmined transactions
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub vin: Vec<TxInput>,
    #[serde(default)]
    pub vout: Vec<TxOutput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxInput {
    /// Funding transaction; empty for coinbase/stakebase inputs
    #[serde(default)]
    pub txid: String,
    #[serde(default)]
    pub vout: u32,
    #[serde(rename = "amountin", default)]
    pub amount_in: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxOutput {
    pub n: u32,
    pub value: f64,
    #[serde(rename = "scriptPubKey", default)]
    pub script_pub_key: ScriptPubKey,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptPubKey {
    #[serde(default)]
    pub hex: String,
    #[serde(default)]
    pub addresses: Vec<String>,
}

impl TxInput {
    /// True if this input spends a previous output (not a coinbase)
    pub fn spends_outpoint(&self) -> bool {
        !self.txid.is_empty()
    }
}

impl TxOutput {
    pub fn pays_to(&self, address: &str) -> bool {
        self.script_pub_key.addresses.iter().any(|a| a == address)
    }
}

/// Response of `/address/{addr}/totals`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressTotals {
    #[serde(default)]
    pub dcr_unspent: f64,
}

/// Response of `/broadcast?hex=...`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastResponse {
    pub data: String,
}
