/// Indexer Mock Server Library
///
/// In-memory stand-in for the indexer/broadcast HTTP API, usable as a
/// standalone binary or spawned from tests.

pub mod chain;
pub mod handlers;
pub mod server;
pub mod types;

// Re-export commonly used types
pub use chain::MockChain;
pub use server::{create_router, run_server, spawn_server};
pub use types::*;
