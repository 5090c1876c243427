use crate::error::WalletError;
use crate::indexer::Indexer;

/// Broadcast a signed transaction and return its txid.
///
/// One attempt plus up to `retries` retries, back to back. Gives up with
/// `BroadcastFailed` carrying the last error.
pub async fn broadcast_transaction<I: Indexer>(
    indexer: &I,
    tx_hex: &str,
    retries: u32,
) -> Result<String, WalletError> {
    let attempts = retries.saturating_add(1);
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        match indexer.broadcast(tx_hex).await {
            Ok(txid) => {
                log::info!("Transaction broadcast - txid: {}", txid);
                return Ok(txid);
            }
            Err(e) => {
                log::warn!("Broadcast attempt {}/{} failed: {}", attempt, attempts, e);
                last_error = e.to_string();
            }
        }
    }

    log::error!("Giving up on broadcast after {} attempts", attempts);
    Err(WalletError::BroadcastFailed {
        attempts,
        reason: last_error,
    })
}
