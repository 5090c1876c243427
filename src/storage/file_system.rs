use chrono::Utc;
use std::fs;
use std::path::PathBuf;

use super::models::{Metadata, Wallet};
use crate::error::StorageError;
use crate::network::Network;

#[derive(Clone)]
pub struct Storage {
    base_path: PathBuf,
}

impl Storage {
    /// Create a new storage instance with the default base directory ("./wallets")
    pub fn new() -> Self {
        Self {
            base_path: PathBuf::from("./wallets"),
        }
    }

    /// Create storage with custom base directory (for testing)
    pub fn new_with_base_dir(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_path
    }

    fn wallet_dir(&self, name: &str) -> PathBuf {
        self.base_path.join(name)
    }

    /// Create the wallet directory and write its metadata
    pub fn create_wallet(&self, name: &str, network: Network) -> Result<(), StorageError> {
        fs::create_dir_all(self.wallet_dir(name))?;
        let metadata = Metadata {
            name: name.to_string(),
            created_at: Utc::now(),
            network,
        };
        let json = serde_json::to_string_pretty(&metadata)?;
        fs::write(self.wallet_dir(name).join("metadata.json"), json)?;
        Ok(())
    }

    pub fn wallet_exists(&self, name: &str) -> bool {
        self.wallet_dir(name).join("wallet.json").exists()
    }

    /// Persist the full wallet record, replacing any previous one
    pub fn save_wallet(&self, wallet: &Wallet) -> Result<(), StorageError> {
        let dir = self.wallet_dir(&wallet.name);
        fs::create_dir_all(&dir)?;
        let json = serde_json::to_string_pretty(wallet)?;
        // Write then rename so a crash never leaves a truncated record
        let tmp = dir.join("wallet.json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(tmp, dir.join("wallet.json"))?;
        Ok(())
    }

    pub fn load_wallet(&self, name: &str) -> Result<Wallet, StorageError> {
        let path = self.wallet_dir(name).join("wallet.json");
        if !path.exists() {
            return Err(StorageError::FileNotFound(path.display().to_string()));
        }
        let contents = fs::read_to_string(path)?;
        let wallet = serde_json::from_str(&contents)?;
        Ok(wallet)
    }

    pub fn load_metadata(&self, name: &str) -> Result<Metadata, StorageError> {
        let path = self.wallet_dir(name).join("metadata.json");
        if !path.exists() {
            return Err(StorageError::FileNotFound(path.display().to_string()));
        }
        let contents = fs::read_to_string(path)?;
        let meta = serde_json::from_str(&contents)?;
        Ok(meta)
    }

    /// List all wallet names in the storage directory
    pub fn list_wallets(&self) -> Result<Vec<String>, StorageError> {
        if !self.base_path.exists() {
            return Ok(Vec::new());
        }

        let mut wallets = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let path = entry?.path();
            if path.join("wallet.json").exists() {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    wallets.push(name.to_string());
                }
            }
        }
        wallets.sort();
        Ok(wallets)
    }

    /// Delete a wallet and all its associated data from disk
    pub fn delete_wallet(&self, name: &str) -> Result<(), StorageError> {
        let wallet_dir = self.wallet_dir(name);

        if !wallet_dir.exists() {
            return Err(StorageError::FileNotFound(
                wallet_dir.display().to_string(),
            ));
        }

        log::warn!("Deleting wallet directory: {:?}", wallet_dir);
        fs::remove_dir_all(&wallet_dir)?;
        log::info!("Wallet '{}' deleted successfully", name);

        Ok(())
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}
