/// Indexer API response types
///
/// Field names follow the dcrdata JSON format so the wallet client can
/// consume them unchanged.

use serde::{Deserialize, Serialize};

/// Raw transaction from `/address/{addr}/count/{n}/raw` and `/address/addressesTxs/{csv}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTx {
    pub txid: String,
    #[serde(default)]
    pub confirmations: i64,
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub vin: Vec<RawInput>,
    #[serde(default)]
    pub vout: Vec<RawOutput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInput {
    #[serde(default)]
    pub txid: String,
    #[serde(default)]
    pub vout: u32,
    #[serde(default, rename = "amountin")]
    pub amount_in: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOutput {
    pub n: u32,
    pub value: f64,
    #[serde(rename = "scriptPubKey")]
    pub script_pub_key: RawScriptPubKey,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawScriptPubKey {
    #[serde(default)]
    pub hex: String,
    #[serde(default)]
    pub addresses: Vec<String>,
}

/// Response from `/address/{addr}/totals`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotalsResponse {
    pub address: String,
    pub dcr_unspent: f64,
}

/// Successful response from `/broadcast`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastResponse {
    pub data: String,
}

/// Error body returned by any endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Fixture file format: address -> history, newest first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub histories: std::collections::HashMap<String, Vec<RawTx>>,
}
