//! Common test utilities for wallet core integration tests
//!
//! - Logging setup
//! - Raw transaction fixtures
//! - A temp-dir backed manager talking to a spawned indexer mock

#![allow(dead_code)]

use std::sync::Arc;
use tempfile::TempDir;
use tokio::task::JoinHandle;

use dcrwallet_core::indexer::{ScriptPubKey, TxInput, TxOutput};
use dcrwallet_core::{Address, HttpIndexer, Storage, TxRecord, WalletConfig, WalletManager};
use indexer_mock::{MockChain, RawInput, RawOutput, RawScriptPubKey, RawTx};

pub const PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

pub fn init_logging() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

/// Locking script the indexer reports for `address`
pub fn script_hex(address: &str) -> String {
    address
        .parse::<Address>()
        .map(|a| hex::encode(a.script_pubkey().as_bytes()))
        .unwrap_or_default()
}

/// Transaction paying `value` (display units) to `address` at output 0
pub fn receive_tx(txid: &str, time: i64, address: &str, value: f64) -> TxRecord {
    TxRecord {
        txid: txid.to_string(),
        confirmations: if time == 0 { 0 } else { 10 },
        time,
        vin: vec![TxInput {
            txid: "f".repeat(64),
            vout: 7,
            amount_in: value + 0.0001,
        }],
        vout: vec![TxOutput {
            n: 0,
            value,
            script_pub_key: ScriptPubKey {
                hex: script_hex(address),
                addresses: vec![address.to_string()],
            },
        }],
    }
}

/// Transaction spending `(prev_txid, prev_vout)` and paying `outputs`
pub fn spend_tx(
    txid: &str,
    time: i64,
    prev_txid: &str,
    prev_vout: u32,
    amount_in: f64,
    outputs: &[(&str, f64)],
) -> TxRecord {
    TxRecord {
        txid: txid.to_string(),
        confirmations: 1,
        time,
        vin: vec![TxInput {
            txid: prev_txid.to_string(),
            vout: prev_vout,
            amount_in,
        }],
        vout: outputs
            .iter()
            .enumerate()
            .map(|(n, (address, value))| TxOutput {
                n: n as u32,
                value: *value,
                script_pub_key: ScriptPubKey {
                    hex: script_hex(address),
                    addresses: vec![address.to_string()],
                },
            })
            .collect(),
    }
}

/// Same record in the mock indexer's wire types
pub fn to_raw(tx: &TxRecord) -> RawTx {
    RawTx {
        txid: tx.txid.clone(),
        confirmations: tx.confirmations,
        time: tx.time,
        vin: tx
            .vin
            .iter()
            .map(|i| RawInput {
                txid: i.txid.clone(),
                vout: i.vout,
                amount_in: i.amount_in,
            })
            .collect(),
        vout: tx
            .vout
            .iter()
            .map(|o| RawOutput {
                n: o.n,
                value: o.value,
                script_pub_key: RawScriptPubKey {
                    hex: o.script_pub_key.hex.clone(),
                    addresses: o.script_pub_key.addresses.clone(),
                },
            })
            .collect(),
    }
}

/// Manager over a temp dir and a freshly spawned indexer mock
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub chain: Arc<MockChain>,
    pub manager: WalletManager<HttpIndexer>,
    server: JoinHandle<()>,
}

impl TestEnvironment {
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_config(WalletConfig::default()).await
    }

    pub async fn with_config(mut config: WalletConfig) -> anyhow::Result<Self> {
        init_logging();

        let temp_dir = TempDir::new()?;
        log::info!("Test directory: {:?}", temp_dir.path());

        let chain = Arc::new(MockChain::new());
        let (addr, server) = indexer_mock::spawn_server(chain.clone()).await?;
        config.indexer_url = format!("http://{}/api", addr);

        let storage = Storage::new_with_base_dir(temp_dir.path().to_path_buf());
        let indexer = HttpIndexer::from_config(&config);
        let manager = WalletManager::new(config, storage, indexer);

        Ok(Self {
            temp_dir,
            chain,
            manager,
            server,
        })
    }
}

impl Drop for TestEnvironment {
    fn drop(&mut self) {
        self.server.abort();
    }
}
