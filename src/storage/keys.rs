use bip39::Mnemonic;
use bitcoin::bip32::{DerivationPath, Xpriv};
use bitcoin::hashes::Hash;
use bitcoin::key::rand;
use bitcoin::secp256k1::Secp256k1;
use bitcoin::{PrivateKey, PublicKey};
use std::collections::BTreeMap;
use std::str::FromStr;

use super::models::{PathInfo, Wallet, WalletState};
use crate::address::Address;
use crate::error::WalletError;
use crate::network::Network;

pub struct KeyManager;

impl KeyManager {
    /// Generate a new random wallet with a 12-word mnemonic
    pub fn generate(network: Network) -> Result<Wallet, WalletError> {
        let entropy = rand::random::<[u8; 16]>();

        let mnemonic = Mnemonic::from_entropy(&entropy)
            .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;

        Self::create_wallet(mnemonic, network)
    }

    /// Import a wallet from an existing mnemonic phrase
    pub fn from_mnemonic(words: &str, network: Network) -> Result<Wallet, WalletError> {
        let mnemonic = Mnemonic::parse(words.trim())
            .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;

        Self::create_wallet(mnemonic, network)
    }

    /// New wallets carry exactly one path (index 0) and empty state
    fn create_wallet(mnemonic: Mnemonic, network: Network) -> Result<Wallet, WalletError> {
        let first = Self::derive_path(&mnemonic, network, 0)?;
        let name: String = first.address.chars().take(6).collect();

        let mut paths = BTreeMap::new();
        paths.insert(0, first);

        log::debug!("Created wallet '{}' on {}", name, network);

        Ok(Wallet {
            mnemonic: mnemonic.to_string(),
            name,
            paths,
            state: WalletState::default(),
        })
    }

    /// Derive the key material at `m/44'/{coin}'/0'/0/{index}`
    pub fn derive_path(
        mnemonic: &Mnemonic,
        network: Network,
        index: u32,
    ) -> Result<PathInfo, WalletError> {
        let secp = Secp256k1::new();
        let seed = mnemonic.to_seed("");

        let master_key = Xpriv::new_master(network.key_kind(), &seed)
            .map_err(|e| WalletError::Bitcoin(e.to_string()))?;

        let path = DerivationPath::from_str(&network.derivation_path(index))
            .map_err(|e| WalletError::Bitcoin(e.to_string()))?;

        let derived = master_key
            .derive_priv(&secp, &path)
            .map_err(|e| WalletError::Bitcoin(e.to_string()))?;

        let private_key = derived.to_priv();
        let public_key = PublicKey::from_private_key(&secp, &private_key);
        let address = Address::p2pkh(public_key.pubkey_hash().to_byte_array());

        Ok(PathInfo {
            address: address.to_string(),
            wif: private_key.to_wif(),
            public_key: Some(public_key.to_string()),
        })
    }

    /// Append another derivation index to an existing wallet.
    /// Paths are never derived automatically.
    pub fn add_path(
        wallet: &mut Wallet,
        network: Network,
        index: u32,
    ) -> Result<PathInfo, WalletError> {
        if let Some(existing) = wallet.paths.get(&index) {
            return Ok(existing.clone());
        }
        let mnemonic = Mnemonic::parse(&wallet.mnemonic)
            .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;
        let info = Self::derive_path(&mnemonic, network, index)?;
        wallet.paths.insert(index, info.clone());
        Ok(info)
    }

    /// Signing key for a stored path
    pub fn private_key(path: &PathInfo) -> Result<PrivateKey, WalletError> {
        PrivateKey::from_wif(&path.wif).map_err(|e| WalletError::Bitcoin(e.to_string()))
    }
}
