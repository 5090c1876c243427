/// Wallet configuration from environment variables
///
/// Controls the target network, indexer endpoint, unit scale and fee policy.
/// Defaults to mainnet.

use std::env;
use std::str::FromStr;

use crate::amount::Denomination;
use crate::network::Network;

/// Atoms per display unit on the current Decred network
pub const DEFAULT_ATOMS_PER_COIN: u64 = 100_000_000;
/// Relay fee in atoms per kilobyte
pub const DEFAULT_FEE_PER_KB: u64 = 2010;
/// Smallest amount accepted for a user send
pub const DEFAULT_MIN_SEND_ATOMS: u64 = 500_000;
/// Maximum number of addresses per batch-history request
pub const DEFAULT_SYNC_BATCH_SIZE: usize = 200;
/// Broadcast retries after the first failed attempt
pub const DEFAULT_BROADCAST_RETRIES: u32 = 5;

#[derive(Clone, Debug)]
pub struct WalletConfig {
    pub network: Network,
    /// Indexer/broadcast API base URL
    pub indexer_url: String,
    pub denomination: Denomination,
    pub fee_per_kb: u64,
    pub min_send_atoms: u64,
    pub sync_batch_size: usize,
    pub broadcast_retries: u32,
}

impl WalletConfig {
    /// Load configuration from environment variables (and `.env` if present)
    ///
    /// Environment variables:
    /// - `DCR_NETWORK`: "mainnet" (default), "testnet" or "simnet"
    /// - `INDEXER_URL`: indexer API endpoint (optional, per-network default)
    /// - `ATOMS_PER_COIN`: unit scale, a power of ten (default 100000000)
    /// - `FEE_PER_KB_ATOMS`: fee rate (default 2010)
    /// - `MIN_SEND_ATOMS`: minimum send amount (default 500000)
    /// - `SYNC_BATCH_SIZE`: addresses per history request (default 200)
    /// - `BROADCAST_RETRIES`: retries after a failed broadcast (default 5)
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let network = match env::var("DCR_NETWORK") {
            Ok(value) => Network::from_str(&value).unwrap_or_else(|e| {
                log::warn!("{}, defaulting to mainnet", e);
                Network::Mainnet
            }),
            Err(_) => Network::Mainnet,
        };
        log::info!("Using {} network", network);

        let indexer_url = env::var("INDEXER_URL")
            .unwrap_or_else(|_| network.default_indexer_url().to_string());
        log::info!("Indexer URL: {}", indexer_url);

        let atoms_per_coin = parse_var("ATOMS_PER_COIN", DEFAULT_ATOMS_PER_COIN);
        let denomination = Denomination::new(atoms_per_coin).unwrap_or_else(|| {
            log::warn!(
                "ATOMS_PER_COIN={} is not a power of ten, using {}",
                atoms_per_coin,
                DEFAULT_ATOMS_PER_COIN
            );
            Denomination::default()
        });

        let sync_batch_size = match parse_var("SYNC_BATCH_SIZE", DEFAULT_SYNC_BATCH_SIZE) {
            0 => DEFAULT_SYNC_BATCH_SIZE,
            n => n,
        };

        Self {
            network,
            indexer_url,
            denomination,
            fee_per_kb: parse_var("FEE_PER_KB_ATOMS", DEFAULT_FEE_PER_KB),
            min_send_atoms: parse_var("MIN_SEND_ATOMS", DEFAULT_MIN_SEND_ATOMS),
            sync_batch_size,
            broadcast_retries: parse_var("BROADCAST_RETRIES", DEFAULT_BROADCAST_RETRIES),
        }
    }

    /// Configuration for the given network with every other value at its default
    pub fn for_network(network: Network) -> Self {
        Self {
            network,
            indexer_url: network.default_indexer_url().to_string(),
            ..Default::default()
        }
    }
}

fn parse_var<T: FromStr + Copy + std::fmt::Display>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Invalid {}='{}', using {}", name, raw, default);
            default
        }),
        Err(_) => default,
    }
}

impl Default for WalletConfig {
    /// Default configuration (mainnet)
    fn default() -> Self {
        Self {
            network: Network::Mainnet,
            indexer_url: Network::Mainnet.default_indexer_url().to_string(),
            denomination: Denomination::default(),
            fee_per_kb: DEFAULT_FEE_PER_KB,
            min_send_atoms: DEFAULT_MIN_SEND_ATOMS,
            sync_batch_size: DEFAULT_SYNC_BATCH_SIZE,
            broadcast_retries: DEFAULT_BROADCAST_RETRIES,
        }
    }
}
