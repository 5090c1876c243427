//! Data models for wallet storage
//!
//! `Wallet` is the persisted record: `{mnemonic, name, paths, state}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::amount::Atoms;
use crate::indexer::TxRecord;
use crate::network::Network;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub network: Network,
}

/// Key material for one derivation index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathInfo {
    pub address: String,
    pub wif: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

/// An unspent output owned by one of the wallet's addresses.
/// Uniqueness key: `(tx_id, output_index)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Utxo {
    pub address: String,
    pub tx_id: String,
    pub output_index: u32,
    /// Locking script hex
    pub script: String,
    /// Value in atoms
    pub amount: Atoms,
    pub confirmations: i64,
}

/// Chain-derived state, replaced wholesale on every sync pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletState {
    pub balance_atoms: Atoms,
    pub utxos: Vec<Utxo>,
    pub parsed_tx_history: Vec<TxRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub mnemonic: String,
    pub name: String,
    /// Derivation index -> key material
    pub paths: BTreeMap<u32, PathInfo>,
    #[serde(default)]
    pub state: WalletState,
}

impl Wallet {
    /// Addresses of every derivation path, in index order
    pub fn addresses(&self) -> Vec<String> {
        self.paths.values().map(|p| p.address.clone()).collect()
    }

    /// Change goes back to the lowest derivation index
    pub fn change_address(&self) -> Option<&str> {
        self.paths.values().next().map(|p| p.address.as_str())
    }

    pub fn path_for_address(&self, address: &str) -> Option<&PathInfo> {
        self.paths.values().find(|p| p.address == address)
    }

    pub fn owns_address(&self, address: &str) -> bool {
        self.path_for_address(address).is_some()
    }

    pub fn balance(&self) -> Atoms {
        self.state.balance_atoms
    }
}
