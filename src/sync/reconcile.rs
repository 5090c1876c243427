//! Pure reconstruction of the UTXO set from raw per-address histories
//!
//! No prior state is consulted: the same histories always produce the same
//! snapshot.

use std::collections::{HashMap, HashSet};

use crate::amount::Denomination;
use crate::indexer::TxRecord;
use crate::storage::Utxo;

/// Deduplicate transactions across addresses, visiting addresses in the given
/// order. On a txid collision the stored record is replaced only by a record
/// with a nonzero `time`; otherwise the earliest-seen record is kept.
pub fn merge_histories(
    addresses: &[String],
    histories: &HashMap<String, Vec<TxRecord>>,
) -> Vec<TxRecord> {
    let mut merged: Vec<TxRecord> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for tx in addresses
        .iter()
        .filter_map(|address| histories.get(address))
        .flatten()
    {
        match positions.get(&tx.txid) {
            Some(&pos) => {
                if tx.time != 0 {
                    merged[pos] = tx.clone();
                }
            }
            None => {
                positions.insert(tx.txid.clone(), merged.len());
                merged.push(tx.clone());
            }
        }
    }

    merged
}

/// Outputs paying to one of `addresses` that no input in `txs` spends.
/// Each `(tx_id, output_index)` appears at most once.
pub fn derive_utxos(txs: &[TxRecord], addresses: &[String], denomination: &Denomination) -> Vec<Utxo> {
    let spent: HashSet<(&str, u32)> = txs
        .iter()
        .flat_map(|tx| tx.vin.iter())
        .filter(|input| input.spends_outpoint())
        .map(|input| (input.txid.as_str(), input.vout))
        .collect();

    let owned: HashSet<&str> = addresses.iter().map(String::as_str).collect();
    let mut seen: HashSet<(&str, u32)> = HashSet::new();
    let mut utxos = Vec::new();

    for tx in txs {
        for output in &tx.vout {
            let Some(address) = output
                .script_pub_key
                .addresses
                .iter()
                .find(|a| owned.contains(a.as_str()))
            else {
                continue;
            };

            let key = (tx.txid.as_str(), output.n);
            if spent.contains(&key) || !seen.insert(key) {
                continue;
            }

            utxos.push(Utxo {
                address: address.clone(),
                tx_id: tx.txid.clone(),
                output_index: output.n,
                script: output.script_pub_key.hex.clone(),
                amount: u64::try_from(denomination.atoms_from_coins(output.value)).unwrap_or(0),
                confirmations: tx.confirmations,
            });
        }
    }

    utxos
}

/// Newest first; records without a time sort after timed ones.
/// The sort is stable, so equal times keep their merge order.
pub fn sort_by_time_desc(txs: &mut [TxRecord]) {
    txs.sort_by(|a, b| b.time.cmp(&a.time));
}
