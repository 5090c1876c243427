/// In-memory chain backing the mock indexer
///
/// Holds per-address histories and records every broadcast. Tests can make
/// addresses or broadcasts fail on demand.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tokio::sync::RwLock;

use crate::types::{Fixture, RawTx};

#[derive(Default)]
pub struct MockChain {
    histories: RwLock<HashMap<String, Vec<RawTx>>>,
    failing_addresses: RwLock<HashSet<String>>,
    broadcast_failures: RwLock<u32>,
    broadcasts: RwLock<Vec<String>>,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fixture(fixture: Fixture) -> Self {
        Self {
            histories: RwLock::new(fixture.histories),
            ..Default::default()
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture {}", path.display()))?;
        let fixture: Fixture = serde_json::from_str(&contents).context("Invalid fixture JSON")?;
        Ok(Self::from_fixture(fixture))
    }

    /// Record `tx` in the history of `address`, newest first
    pub async fn add_tx(&self, address: &str, tx: RawTx) {
        self.histories
            .write()
            .await
            .entry(address.to_string())
            .or_default()
            .insert(0, tx);
    }

    /// Any batch request containing `address` answers with an error body
    pub async fn fail_address(&self, address: &str) {
        self.failing_addresses
            .write()
            .await
            .insert(address.to_string());
    }

    /// The next `count` broadcasts are rejected
    pub async fn fail_next_broadcasts(&self, count: u32) {
        *self.broadcast_failures.write().await = count;
    }

    /// Every broadcast attempt, accepted or not, in arrival order
    pub async fn broadcasts(&self) -> Vec<String> {
        self.broadcasts.read().await.clone()
    }

    pub async fn history(&self, address: &str, count: usize) -> Vec<RawTx> {
        self.histories
            .read()
            .await
            .get(address)
            .map(|txs| txs.iter().take(count).cloned().collect())
            .unwrap_or_default()
    }

    /// Histories for every requested address that has any
    pub async fn histories(&self, addresses: &[&str]) -> Result<HashMap<String, Vec<RawTx>>> {
        let failing = self.failing_addresses.read().await;
        if let Some(bad) = addresses.iter().find(|a| failing.contains(**a)) {
            anyhow::bail!("Indexer unavailable for address {}", bad);
        }

        let histories = self.histories.read().await;
        Ok(addresses
            .iter()
            .filter_map(|a| histories.get(*a).map(|txs| (a.to_string(), txs.clone())))
            .filter(|(_, txs)| !txs.is_empty())
            .collect())
    }

    /// Unspent value paid to `address`, in display units
    pub async fn unspent(&self, address: &str) -> f64 {
        let histories = self.histories.read().await;
        let all: HashMap<&str, &RawTx> = histories
            .values()
            .flatten()
            .map(|tx| (tx.txid.as_str(), tx))
            .collect();
        let spent: HashSet<(&str, u32)> = all
            .values()
            .flat_map(|tx| tx.vin.iter())
            .map(|vin| (vin.txid.as_str(), vin.vout))
            .collect();

        all.values()
            .flat_map(|tx| tx.vout.iter().map(move |out| (tx.txid.as_str(), out)))
            .filter(|(txid, out)| {
                !spent.contains(&(*txid, out.n))
                    && out.script_pub_key.addresses.iter().any(|a| a == address)
            })
            .map(|(_, out)| out.value)
            .sum()
    }

    /// Accept a raw transaction and return its txid
    pub async fn broadcast(&self, tx_hex: &str) -> Result<String> {
        self.broadcasts.write().await.push(tx_hex.to_string());

        {
            let mut failures = self.broadcast_failures.write().await;
            if *failures > 0 {
                *failures -= 1;
                anyhow::bail!("Broadcast rejected");
            }
        }

        let raw = hex::decode(tx_hex).context("Transaction is not valid hex")?;
        if raw.is_empty() {
            anyhow::bail!("Empty transaction");
        }
        let mut hash = Sha256::digest(Sha256::digest(&raw)).to_vec();
        hash.reverse();
        let txid = hex::encode(hash);
        log::info!("Accepted transaction {}", txid);
        Ok(txid)
    }
}
