//! Storage and persistence layer
//!
//! - File system operations
//! - Key management
//! - Data models

mod file_system;
mod keys;
mod models;

pub use file_system::Storage;
pub use keys::KeyManager;
pub use models::{Metadata, PathInfo, Utxo, Wallet, WalletState};
