use bitcoin::blockdata::script::{Builder, PushBytesBuf, ScriptBuf};
use bitcoin::blockdata::transaction::{Transaction, TxIn, TxOut};
use bitcoin::blockdata::witness::Witness;
use bitcoin::hashes::Hash;
use bitcoin::secp256k1::{Message, Secp256k1};
use bitcoin::sighash::{EcdsaSighashType, SighashCache};
use bitcoin::transaction::{OutPoint, Sequence};
use bitcoin::{absolute, PublicKey};
use std::str::FromStr;

use crate::address::Address;
use crate::amount::Atoms;
use crate::error::WalletError;
use crate::storage::{KeyManager, Utxo, Wallet};

/// Change below this is left to the fee instead of creating an output
pub const DUST_LIMIT: Atoms = 546;

/// Upper bound on a P2PKH unlocking script: DER signature + hash type + compressed key
const P2PKH_SCRIPT_SIG_SIZE: usize = 1 + 73 + 1 + 33;

/// Builds, sizes and signs transactions that spend every wallet UTXO.
pub struct TransactionBuilder {
    fee_per_kb: Atoms,
}

impl TransactionBuilder {
    pub fn new(fee_per_kb: Atoms) -> Self {
        Self { fee_per_kb }
    }

    /// Unsigned transaction spending `utxos` and paying `outputs` in order.
    pub fn build_unsigned(
        &self,
        utxos: &[Utxo],
        outputs: &[(ScriptBuf, Atoms)],
    ) -> Result<Transaction, WalletError> {
        let mut tx = Transaction {
            version: bitcoin::transaction::Version::ONE,
            lock_time: absolute::LockTime::ZERO,
            input: vec![],
            output: vec![],
        };

        for utxo in utxos {
            tx.input.push(TxIn {
                previous_output: OutPoint {
                    txid: utxo.tx_id.parse().map_err(|e| {
                        WalletError::Bitcoin(format!("Invalid txid {}: {}", utxo.tx_id, e))
                    })?,
                    vout: utxo.output_index,
                },
                script_sig: ScriptBuf::new(),
                sequence: Sequence::MAX,
                witness: Witness::new(),
            });
        }

        for (script_pubkey, amount) in outputs {
            tx.output.push(TxOut {
                value: bitcoin::Amount::from_sat(*amount),
                script_pubkey: script_pubkey.clone(),
            });
        }

        Ok(tx)
    }

    /// Serialized size once every input carries a P2PKH signature
    pub fn estimate_signed_size(&self, unsigned: &Transaction) -> usize {
        let unsigned_size = bitcoin::consensus::encode::serialize(unsigned).len();
        unsigned_size + unsigned.input.len() * P2PKH_SCRIPT_SIG_SIZE
    }

    /// `ceil(size * fee_per_kb / 1000)`
    pub fn fee_for_size(&self, size: usize) -> Atoms {
        (size as u64 * self.fee_per_kb).div_ceil(1000)
    }

    pub fn estimate_fee(&self, unsigned: &Transaction) -> Atoms {
        self.fee_for_size(self.estimate_signed_size(unsigned))
    }

    /// Sign every input with the key of the wallet path owning its UTXO.
    ///
    /// `utxos` must be in the same order as the transaction inputs.
    pub fn sign_transaction(
        &self,
        mut tx: Transaction,
        utxos: &[Utxo],
        wallet: &Wallet,
    ) -> Result<Transaction, WalletError> {
        if utxos.len() != tx.input.len() {
            return Err(WalletError::Internal(format!(
                "{} UTXOs supplied for {} inputs",
                utxos.len(),
                tx.input.len()
            )));
        }

        let secp = Secp256k1::new();
        let mut script_sigs = Vec::with_capacity(utxos.len());

        {
            let sighash_cache = SighashCache::new(&tx);

            for (input_index, utxo) in utxos.iter().enumerate() {
                let path = wallet.path_for_address(&utxo.address).ok_or_else(|| {
                    WalletError::Bitcoin(format!("No key for UTXO address {}", utxo.address))
                })?;
                let private_key = KeyManager::private_key(path)?;
                let public_key = PublicKey::from_private_key(&secp, &private_key);
                let script_code = Address::from_str(&utxo.address)?.script_pubkey();
                if !utxo.script.is_empty() && utxo.script != hex::encode(script_code.as_bytes()) {
                    return Err(WalletError::Bitcoin(format!(
                        "UTXO {}:{} script does not pay {}",
                        utxo.tx_id, utxo.output_index, utxo.address
                    )));
                }

                let sighash = sighash_cache
                    .legacy_signature_hash(
                        input_index,
                        &script_code,
                        EcdsaSighashType::All.to_u32(),
                    )
                    .map_err(|e| WalletError::Bitcoin(e.to_string()))?;

                let message = Message::from_digest(sighash.to_byte_array());
                let signature = secp.sign_ecdsa(&message, &private_key.inner);

                let mut sig_with_hashtype = signature.serialize_der().to_vec();
                sig_with_hashtype.push(EcdsaSighashType::All.to_u32() as u8);
                let sig_push = PushBytesBuf::try_from(sig_with_hashtype)
                    .map_err(|e| WalletError::Bitcoin(e.to_string()))?;

                script_sigs.push(
                    Builder::new()
                        .push_slice(sig_push)
                        .push_key(&public_key)
                        .into_script(),
                );
            }
        }

        for (input, script_sig) in tx.input.iter_mut().zip(script_sigs) {
            input.script_sig = script_sig;
        }

        Ok(tx)
    }
}
