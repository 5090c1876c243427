//! Error types for wallet core operations
//!
//! Codec and validation failures are local and recoverable by the caller.
//! Construction and broadcast failures abort the current operation and leave
//! wallet state untouched.

use thiserror::Error;

/// Address encode/decode failures. No partial value is ever returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Unsupported address type: {0}")]
    UnsupportedType(String),

    #[error("Unsupported hash length: {0} bits")]
    UnsupportedHashLength(usize),

    #[error("Invalid character '{0}' in address")]
    InvalidCharacter(char),

    #[error("Mixed-case address")]
    MixedCase,

    #[error("Address too short")]
    TooShort,

    #[error("Invalid checksum")]
    InvalidChecksum,

    #[error("Invalid padding in address payload")]
    InvalidPadding,

    #[error("Hash length {actual} bits does not match version byte ({expected} bits)")]
    HashSizeMismatch { expected: usize, actual: usize },

    #[error("Unknown version byte: {0:#04x}")]
    UnknownVersion(u8),
}

/// Bad user-supplied input. `Display` is the message shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Wallet already exists: {0}")]
    WalletExists(String),

    #[error("Wallet not found: {0}")]
    WalletNotFound(String),

    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("Address error: {0}")]
    Codec(#[from] CodecError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Key or transaction error: {0}")]
    Bitcoin(String),

    #[error("Indexer error: {0}")]
    Indexer(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("Invalid amount and fee: outputs {outputs} + fee {fee} exceed inputs {inputs} atoms")]
    InvalidAmountAndFee { outputs: u64, fee: u64, inputs: u64 },

    #[error("Broadcast transaction failed after {attempts} attempts: {reason}")]
    BroadcastFailed { attempts: u32, reason: String },

    #[error("Sync already in progress for wallet: {0}")]
    SyncInProgress(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

impl From<reqwest::Error> for WalletError {
    fn from(err: reqwest::Error) -> Self {
        WalletError::Network(err.to_string())
    }
}
