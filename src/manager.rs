//! WalletManager: storage, sync and sending wired together
//!
//! Each wallet has its own async mutex. Sends wait for it; a sync started
//! while the wallet is busy fails fast with `SyncInProgress`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::amount::Atoms;
use crate::config::WalletConfig;
use crate::error::WalletError;
use crate::history::{ClassifiedTx, TxClassifier};
use crate::indexer::{HttpIndexer, Indexer, TxRecord};
use crate::ledger::{broadcast_transaction, MaxSendable, SendTarget, UtxoLedger};
use crate::storage::{KeyManager, PathInfo, Storage, Wallet};
use crate::sync::{ChainSync, ProgressRange, ProgressSink, SyncSnapshot};
use crate::validation;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletInfo {
    pub name: String,
    pub mnemonic: String,
    pub first_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletSummary {
    pub name: String,
    pub created_at: String,
    pub network: String,
    pub balance_atoms: Atoms,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendResult {
    pub txid: String,
    pub hex: String,
    pub fee: Atoms,
}

pub struct WalletManager<I: Indexer> {
    config: WalletConfig,
    pub storage: Storage,
    indexer: I,
    ledger: UtxoLedger,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl WalletManager<HttpIndexer> {
    /// Manager over `./wallets` and the configured HTTP indexer
    pub fn from_env() -> Self {
        let config = WalletConfig::from_env();
        let indexer = HttpIndexer::from_config(&config);
        Self::new(config, Storage::new(), indexer)
    }
}

impl<I: Indexer> WalletManager<I> {
    pub fn new(config: WalletConfig, storage: Storage, indexer: I) -> Self {
        let ledger = UtxoLedger::new(&config);
        Self {
            config,
            storage,
            indexer,
            ledger,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    pub fn indexer(&self) -> &I {
        &self.indexer
    }

    async fn wallet_lock(&self, name: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(name.to_string()).or_default().clone()
    }

    fn require_wallet(&self, name: &str) -> Result<Wallet, WalletError> {
        if !self.storage.wallet_exists(name) {
            return Err(WalletError::WalletNotFound(name.to_string()));
        }
        Ok(self.storage.load_wallet(name)?)
    }

    fn register(&self, mut wallet: Wallet, name: Option<&str>) -> Result<WalletInfo, WalletError> {
        if let Some(name) = name {
            wallet.name = name.to_string();
        }
        if self.storage.wallet_exists(&wallet.name) {
            return Err(WalletError::WalletExists(wallet.name));
        }
        validation::validate_wallet_name(&wallet.name, &self.storage.list_wallets()?)?;

        self.storage.create_wallet(&wallet.name, self.config.network)?;
        self.storage.save_wallet(&wallet)?;
        log::info!("Wallet '{}' saved on {}", wallet.name, self.config.network);

        let first_address = wallet
            .change_address()
            .map(str::to_string)
            .unwrap_or_default();
        Ok(WalletInfo {
            name: wallet.name,
            mnemonic: wallet.mnemonic,
            first_address,
        })
    }

    /// Create a wallet with a fresh mnemonic. Without a name, the first six
    /// characters of the first address are used.
    pub fn create_wallet(&self, name: Option<&str>) -> Result<WalletInfo, WalletError> {
        let wallet = KeyManager::generate(self.config.network)?;
        self.register(wallet, name)
    }

    pub fn import_wallet(&self, name: Option<&str>, mnemonic: &str) -> Result<WalletInfo, WalletError> {
        validation::validate_mnemonic(mnemonic)
            .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;
        let wallet = KeyManager::from_mnemonic(mnemonic, self.config.network)?;
        self.register(wallet, name)
    }

    pub fn list_wallets(&self) -> Result<Vec<WalletSummary>, WalletError> {
        let mut wallets = Vec::new();
        for name in self.storage.list_wallets()? {
            let Ok(metadata) = self.storage.load_metadata(&name) else {
                log::warn!("Skipping wallet '{}' without metadata", name);
                continue;
            };
            let balance_atoms = match self.storage.load_wallet(&name) {
                Ok(wallet) => wallet.balance(),
                Err(e) => {
                    log::warn!("Listing wallet '{}' with zero balance, record unreadable: {}", name, e);
                    0
                }
            };
            wallets.push(WalletSummary {
                name: metadata.name,
                created_at: metadata.created_at.to_rfc3339(),
                network: metadata.network.to_string(),
                balance_atoms,
            });
        }
        Ok(wallets)
    }

    pub fn load_wallet(&self, name: &str) -> Result<Wallet, WalletError> {
        self.require_wallet(name)
    }

    pub async fn delete_wallet(&self, name: &str) -> Result<(), WalletError> {
        let lock = self.wallet_lock(name).await;
        let _guard = lock.lock().await;
        if !self.storage.wallet_exists(name) {
            return Err(WalletError::WalletNotFound(name.to_string()));
        }
        self.storage.delete_wallet(name)?;
        Ok(())
    }

    /// Derive and persist the key for `index`
    pub async fn add_address(&self, name: &str, index: u32) -> Result<PathInfo, WalletError> {
        let lock = self.wallet_lock(name).await;
        let _guard = lock.lock().await;
        let mut wallet = self.require_wallet(name)?;
        let info = KeyManager::add_path(&mut wallet, self.config.network, index)?;
        self.storage.save_wallet(&wallet)?;
        Ok(info)
    }

    /// Run a ChainSync pass and replace the stored state with its result.
    pub async fn sync_wallet<S: ProgressSink + ?Sized>(
        &self,
        name: &str,
        range: ProgressRange,
        progress: &mut S,
    ) -> Result<SyncSnapshot, WalletError> {
        let lock = self.wallet_lock(name).await;
        let _guard = lock
            .try_lock()
            .map_err(|_| WalletError::SyncInProgress(name.to_string()))?;

        let mut wallet = self.require_wallet(name)?;
        let snapshot = ChainSync::new(&self.indexer, &self.config)
            .sync_wallet(&wallet, range, progress)
            .await;

        wallet.state = snapshot.clone().into_state();
        self.storage.save_wallet(&wallet)?;
        Ok(snapshot)
    }

    pub fn estimate_fee(&self, name: &str, amount: Atoms) -> Result<Atoms, WalletError> {
        let wallet = self.require_wallet(name)?;
        self.ledger.estimate_fee(&wallet, amount)
    }

    pub fn max_sendable(&self, name: &str) -> Result<MaxSendable, WalletError> {
        let wallet = self.require_wallet(name)?;
        self.ledger.max_sendable(&wallet)
    }

    /// Validate multi-send rows against the stored balance
    pub fn parse_multi_send(&self, name: &str, input: &str) -> Result<Vec<SendTarget>, WalletError> {
        let wallet = self.require_wallet(name)?;
        Ok(validation::parse_multi_send_input(
            input,
            wallet.balance(),
            &self.config,
        )?)
    }

    /// Build, sign and broadcast. Stored state is left for the next sync.
    pub async fn send(&self, name: &str, targets: &[SendTarget]) -> Result<SendResult, WalletError> {
        let lock = self.wallet_lock(name).await;
        let _guard = lock.lock().await;

        let wallet = self.require_wallet(name)?;
        log::info!(
            "Sending from wallet '{}' to {} recipient(s)",
            name,
            targets.len()
        );

        let built = self.ledger.send_to_addresses(&wallet, targets)?;
        let txid =
            broadcast_transaction(&self.indexer, &built.hex, self.config.broadcast_retries).await?;

        Ok(SendResult {
            txid,
            hex: built.hex,
            fee: built.fee,
        })
    }

    /// Stored history, newest first, with direction and amounts
    pub fn history(&self, name: &str) -> Result<Vec<ClassifiedTx>, WalletError> {
        let wallet = self.require_wallet(name)?;
        let classifier = TxClassifier::for_wallet(&wallet, self.config.denomination);
        Ok(classifier.classify_all(&wallet.state.parsed_tx_history))
    }

    /// Newest `count` raw transactions of one address, straight from the indexer
    pub async fn address_history(&self, address: &str, count: u32) -> Result<Vec<TxRecord>, WalletError> {
        self.indexer.address_txs_raw(address, count).await
    }

    /// Unspent total the indexer reports for one address
    pub async fn address_balance(&self, address: &str) -> Result<Atoms, WalletError> {
        let totals = self.indexer.address_totals(address).await?;
        let atoms = self.config.denomination.atoms_from_coins(totals.dcr_unspent);
        Ok(u64::try_from(atoms).unwrap_or(0))
    }
}
