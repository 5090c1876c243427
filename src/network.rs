//! Network parameters

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target chain for keys, derivation paths and indexer endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
    Simnet,
}

impl Network {
    /// BIP44 coin type
    ///
    /// - Mainnet: 42
    /// - Testnet/Simnet: 1
    pub fn coin_type(&self) -> u32 {
        match self {
            Network::Mainnet => 42,
            _ => 1,
        }
    }

    /// Full derivation path for the given address index: `m/44'/{coin}'/0'/0/{index}`
    pub fn derivation_path(&self, index: u32) -> String {
        format!("m/44'/{}'/0'/0/{}", self.coin_type(), index)
    }

    /// Key-serialization flavour used for WIF and extended keys
    pub fn key_kind(&self) -> bitcoin::NetworkKind {
        match self {
            Network::Mainnet => bitcoin::NetworkKind::Main,
            _ => bitcoin::NetworkKind::Test,
        }
    }

    pub fn default_indexer_url(&self) -> &'static str {
        match self {
            Network::Mainnet => "https://dcrdata.decred.org/api",
            Network::Testnet => "https://testnet.decred.org/api",
            Network::Simnet => "http://localhost:17779/api",
        }
    }

    pub fn ticker(&self) -> &'static str {
        "DCR"
    }
}

impl Default for Network {
    fn default() -> Self {
        Network::Mainnet
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Simnet => "simnet",
        };
        f.write_str(name)
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mainnet" | "main" => Ok(Network::Mainnet),
            "testnet" | "test" => Ok(Network::Testnet),
            "simnet" | "sim" => Ok(Network::Simnet),
            other => Err(format!("unknown network '{}'", other)),
        }
    }
}
