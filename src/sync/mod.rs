//! ChainSync: fetch history for every address, then rebuild the UTXO set
//!
//! A pass holds no state between calls. Batches are fetched strictly one
//! after another; a failed batch is logged and treated as having no activity.

pub mod reconcile;

use std::collections::HashMap;

use crate::address;
use crate::amount::{Atoms, Denomination};
use crate::config::WalletConfig;
use crate::indexer::{Indexer, TxRecord};
use crate::storage::{Utxo, Wallet, WalletState};

pub use reconcile::{derive_utxos, merge_histories, sort_by_time_desc};

/// Receives the sync percentage after every batch.
pub trait ProgressSink: Send {
    fn publish(&mut self, percent: u8);
}

impl<F: FnMut(u8) + Send> ProgressSink for F {
    fn publish(&mut self, percent: u8) {
        self(percent)
    }
}

/// Sink that discards progress
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn publish(&mut self, _percent: u8) {}
}

/// Slice of the 0-100 scale a pass reports into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressRange {
    pub base: u8,
    pub max_percent: u8,
}

impl ProgressRange {
    /// Sync run on its own
    pub const STANDALONE: ProgressRange = ProgressRange {
        base: 0,
        max_percent: 90,
    };
    /// Sync run as the first half of a larger operation
    pub const FIRST_PHASE: ProgressRange = ProgressRange {
        base: 0,
        max_percent: 50,
    };

    /// `base + round(max * (i + 1) / total)`, clamped to `max_percent`
    pub fn percent_after(&self, batch_index: usize, total_batches: usize) -> u8 {
        if total_batches == 0 {
            return self.max_percent;
        }
        let scaled =
            (self.max_percent as f64 * (batch_index + 1) as f64 / total_batches as f64).round();
        let percent = self.base as f64 + scaled;
        percent.min(self.max_percent as f64) as u8
    }
}

impl Default for ProgressRange {
    fn default() -> Self {
        Self::STANDALONE
    }
}

/// Result of one pass. Replaces the wallet state wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncSnapshot {
    pub utxos: Vec<Utxo>,
    pub balance: Atoms,
    /// Deduplicated history, newest first
    pub tx_list: Vec<TxRecord>,
    /// Addresses with at least one transaction, in input order
    pub active_addresses: Vec<String>,
}

impl SyncSnapshot {
    /// Rebuild a snapshot from raw per-address histories.
    pub fn from_histories(
        addresses: &[String],
        histories: &HashMap<String, Vec<TxRecord>>,
        denomination: &Denomination,
    ) -> Self {
        let mut tx_list = merge_histories(addresses, histories);
        let utxos = derive_utxos(&tx_list, addresses, denomination);
        let balance = utxos
            .iter()
            .fold(0 as Atoms, |acc, u| acc.saturating_add(u.amount));
        sort_by_time_desc(&mut tx_list);

        let active_addresses = addresses
            .iter()
            .filter(|a| histories.get(*a).is_some_and(|txs| !txs.is_empty()))
            .cloned()
            .collect();

        Self {
            utxos,
            balance,
            tx_list,
            active_addresses,
        }
    }

    pub fn into_state(self) -> WalletState {
        WalletState {
            balance_atoms: self.balance,
            utxos: self.utxos,
            parsed_tx_history: self.tx_list,
        }
    }
}

pub struct ChainSync<'a, I: Indexer> {
    indexer: &'a I,
    batch_size: usize,
    denomination: Denomination,
}

impl<'a, I: Indexer> ChainSync<'a, I> {
    pub fn new(indexer: &'a I, config: &WalletConfig) -> Self {
        Self {
            indexer,
            batch_size: config.sync_batch_size.max(1),
            denomination: config.denomination,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Run a full pass over `addresses`.
    ///
    /// Never fails: an indexer error for a batch only removes that batch's
    /// history from the result. Addresses that do not decode are skipped
    /// before batching so they cannot fail a batch of valid ones.
    pub async fn sync_addresses<S: ProgressSink + ?Sized>(
        &self,
        addresses: &[String],
        range: ProgressRange,
        progress: &mut S,
    ) -> SyncSnapshot {
        let addresses: Vec<String> = addresses
            .iter()
            .filter(|a| {
                let valid = address::is_valid(a);
                if !valid {
                    log::warn!("Skipping invalid address '{}'", a);
                }
                valid
            })
            .cloned()
            .collect();

        let batches: Vec<&[String]> = addresses.chunks(self.batch_size).collect();
        let total = batches.len();
        let mut histories: HashMap<String, Vec<TxRecord>> = HashMap::new();

        log::info!(
            "Syncing {} addresses in {} batch(es)",
            addresses.len(),
            total
        );

        for (index, batch) in batches.into_iter().enumerate() {
            match self.indexer.addresses_txs(batch).await {
                Ok(result) => {
                    log::debug!(
                        "Batch {}/{}: {} address(es) with history",
                        index + 1,
                        total,
                        result.len()
                    );
                    for (address, txs) in result {
                        histories.entry(address).or_default().extend(txs);
                    }
                }
                Err(e) => {
                    log::warn!("Batch {}/{} failed, treating as empty: {}", index + 1, total, e);
                }
            }
            progress.publish(range.percent_after(index, total));
        }

        let snapshot = SyncSnapshot::from_histories(&addresses, &histories, &self.denomination);
        log::info!(
            "Sync complete: {} transaction(s), {} UTXO(s), balance {} atoms",
            snapshot.tx_list.len(),
            snapshot.utxos.len(),
            snapshot.balance
        );
        snapshot
    }

    /// Pass over every address the wallet holds a key for
    pub async fn sync_wallet<S: ProgressSink + ?Sized>(
        &self,
        wallet: &Wallet,
        range: ProgressRange,
        progress: &mut S,
    ) -> SyncSnapshot {
        self.sync_addresses(&wallet.addresses(), range, progress).await
    }
}
