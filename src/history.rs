//! TxClassifier: label history entries as sent or received
//!
//! A transaction is a send when one of its inputs spends an output that,
//! according to the wallet's prior history, paid a wallet address.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::amount::Denomination;
use crate::indexer::{TxInput, TxOutput, TxRecord};
use crate::storage::Wallet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxKind {
    Sent,
    Received,
}

/// A history entry with its direction and amounts in atoms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedTx {
    pub txid: String,
    pub is_send: bool,
    /// Sent: wallet inputs minus fee minus change. Received: value paid to the wallet.
    pub amount: i64,
    /// Inputs minus outputs; only meaningful for sends
    pub fee: i64,
    pub confirmations: i64,
    pub time: i64,
    pub vin: Vec<TxInput>,
    pub vout: Vec<TxOutput>,
}

impl ClassifiedTx {
    pub fn kind(&self) -> TxKind {
        if self.is_send {
            TxKind::Sent
        } else {
            TxKind::Received
        }
    }
}

pub struct TxClassifier {
    owned: HashSet<String>,
    /// `(txid, n)` of every prior output that paid a wallet address
    owned_outputs: HashSet<(String, u32)>,
    denomination: Denomination,
}

impl TxClassifier {
    pub fn new(addresses: &[String], prior_history: &[TxRecord], denomination: Denomination) -> Self {
        let owned: HashSet<String> = addresses.iter().cloned().collect();
        let owned_ref = &owned;
        let owned_outputs = prior_history
            .iter()
            .flat_map(|tx| {
                tx.vout
                    .iter()
                    .filter(move |out| {
                        out.script_pub_key
                            .addresses
                            .iter()
                            .any(|a| owned_ref.contains(a))
                    })
                    .map(move |out| (tx.txid.clone(), out.n))
            })
            .collect();

        Self {
            owned,
            owned_outputs,
            denomination,
        }
    }

    /// Classifier over the wallet's addresses and stored history
    pub fn for_wallet(wallet: &Wallet, denomination: Denomination) -> Self {
        Self::new(&wallet.addresses(), &wallet.state.parsed_tx_history, denomination)
    }

    fn spends_owned_output(&self, input: &TxInput) -> bool {
        input.spends_outpoint() && self.owned_outputs.contains(&(input.txid.clone(), input.vout))
    }

    fn pays_wallet(&self, output: &TxOutput) -> bool {
        output
            .script_pub_key
            .addresses
            .iter()
            .any(|a| self.owned.contains(a))
    }

    pub fn classify(&self, tx: &TxRecord) -> ClassifiedTx {
        let atoms = |value: f64| self.denomination.atoms_from_coins(value);

        let wallet_inputs: Vec<&TxInput> = tx
            .vin
            .iter()
            .filter(|input| self.spends_owned_output(input))
            .collect();
        let is_send = !wallet_inputs.is_empty();

        let total_in = sum_atoms(tx.vin.iter().map(|i| atoms(i.amount_in)));
        let total_out = sum_atoms(tx.vout.iter().map(|o| atoms(o.value)));
        let fee = total_in.saturating_sub(total_out);

        let to_wallet = sum_atoms(tx.vout.iter().filter(|o| self.pays_wallet(o)).map(|o| atoms(o.value)));

        let amount = if is_send {
            let from_wallet = sum_atoms(wallet_inputs.iter().map(|i| atoms(i.amount_in)));
            from_wallet.saturating_sub(fee).saturating_sub(to_wallet)
        } else {
            to_wallet
        };

        ClassifiedTx {
            txid: tx.txid.clone(),
            is_send,
            amount,
            fee,
            confirmations: tx.confirmations,
            time: tx.time,
            vin: tx.vin.clone(),
            vout: tx.vout.clone(),
        }
    }

    /// Classify a whole history, keeping its order.
    pub fn classify_all(&self, txs: &[TxRecord]) -> Vec<ClassifiedTx> {
        txs.iter().map(|tx| self.classify(tx)).collect()
    }
}

fn sum_atoms(values: impl Iterator<Item = i64>) -> i64 {
    values.fold(0, i64::saturating_add)
}

/// One-shot classification of `tx` against the wallet's addresses and history.
pub fn classify(tx: &TxRecord, wallet: &Wallet, denomination: Denomination) -> ClassifiedTx {
    TxClassifier::for_wallet(wallet, denomination).classify(tx)
}
