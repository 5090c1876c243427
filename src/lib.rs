//! dcrwallet-core: non-custodial UTXO wallet core
//!
//! Keys, addresses and transaction construction happen locally; chain data
//! comes from an indexer over HTTP.
//!
//! # Architecture
//!
//! - **Address codec**: BCH-checksummed base32 `(type, hash)` encoding
//! - **ChainSync**: batched history fetch, rebuilding the UTXO set from scratch
//! - **UtxoLedger**: fee estimation, max sendable and multi-target sends
//! - **TxClassifier**: sent/received direction, amount and fee per transaction
//!
//! # Example
//!
//! ```ignore
//! use dcrwallet_core::{NoProgress, ProgressRange, WalletManager};
//!
//! let manager = WalletManager::from_env();
//! let info = manager.create_wallet(None)?;
//! let snapshot = manager
//!     .sync_wallet(&info.name, ProgressRange::STANDALONE, &mut NoProgress)
//!     .await?;
//! println!("balance: {} atoms", snapshot.balance);
//! ```

// Public modules
pub mod address;
pub mod amount;
pub mod config;
pub mod error;
pub mod history;
pub mod indexer;
pub mod ledger;
pub mod manager;
pub mod network;
pub mod storage;
pub mod sync;
pub mod validation;

// Re-exports for convenience
pub use address::{Address, AddressType};
pub use amount::{Atoms, Denomination};
pub use config::WalletConfig;
pub use error::{CodecError, StorageError, ValidationError, WalletError};
pub use history::{classify, ClassifiedTx, TxClassifier, TxKind};
pub use indexer::{HttpIndexer, Indexer, TxRecord};
pub use ledger::{BuiltTransaction, MaxSendable, SendTarget, UtxoLedger};
pub use manager::{SendResult, WalletInfo, WalletManager, WalletSummary};
pub use network::Network;
pub use storage::{KeyManager, PathInfo, Storage, Utxo, Wallet, WalletState};
pub use sync::{ChainSync, NoProgress, ProgressRange, ProgressSink, SyncSnapshot};

/// Result type for wallet operations
pub type Result<T> = std::result::Result<T, WalletError>;
