//! UtxoLedger: fee preview, max sendable and multi-target sends
//!
//! Every operation spends the full current UTXO set of the wallet and is
//! pure over its inputs. Nothing here mutates wallet state; the next sync
//! picks up the effects of a broadcast transaction.

pub mod broadcast;
pub mod transaction;

pub use broadcast::broadcast_transaction;
pub use transaction::{TransactionBuilder, DUST_LIMIT};

use bitcoin::{ScriptBuf, Transaction};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::address::Address;
use crate::amount::Atoms;
use crate::config::WalletConfig;
use crate::error::{ValidationError, WalletError};
use crate::storage::Wallet;

/// Placeholder destination for fee previews. Never used for a real transfer.
pub fn dump_address() -> Address {
    Address::p2pkh([0u8; 20])
}

/// One destination of a send
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendTarget {
    pub address: String,
    pub amount: Atoms,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxSendable {
    pub max_amount: Atoms,
    pub fee: Atoms,
}

impl MaxSendable {
    /// `total - fee`, or `InsufficientFunds` when the fee eats everything
    pub fn from_total(total: Atoms, fee: Atoms) -> Result<Self, WalletError> {
        if fee >= total {
            return Err(WalletError::InsufficientFunds(format!(
                "Fee of {} atoms is not covered by balance of {} atoms",
                fee, total
            )));
        }
        Ok(Self {
            max_amount: total - fee,
            fee,
        })
    }
}

/// A signed transaction ready for broadcast
#[derive(Debug, Clone)]
pub struct BuiltTransaction {
    pub hex: String,
    pub tx: Transaction,
    pub fee: Atoms,
}

pub struct UtxoLedger {
    builder: TransactionBuilder,
}

impl UtxoLedger {
    pub fn new(config: &WalletConfig) -> Self {
        Self {
            builder: TransactionBuilder::new(config.fee_per_kb),
        }
    }

    fn change_script(wallet: &Wallet) -> Result<ScriptBuf, WalletError> {
        let change = wallet
            .change_address()
            .ok_or_else(|| WalletError::Internal(format!("Wallet {} has no addresses", wallet.name)))?;
        Ok(Address::from_str(change)?.script_pubkey())
    }

    fn utxo_total(wallet: &Wallet) -> Result<Atoms, WalletError> {
        wallet
            .state
            .utxos
            .iter()
            .try_fold(0 as Atoms, |acc, u| acc.checked_add(u.amount))
            .ok_or_else(|| WalletError::Internal(format!("UTXO total of wallet {} overflows", wallet.name)))
    }

    /// Fee for a transaction spending every UTXO, paying `outputs` plus change.
    fn fee_with_change(
        &self,
        wallet: &Wallet,
        mut outputs: Vec<(ScriptBuf, Atoms)>,
    ) -> Result<Atoms, WalletError> {
        outputs.push((Self::change_script(wallet)?, 0));
        let unsigned = self.builder.build_unsigned(&wallet.state.utxos, &outputs)?;
        Ok(self.builder.estimate_fee(&unsigned))
    }

    /// Fee of sending `amount` to the dump address. Preview only.
    pub fn estimate_fee(&self, wallet: &Wallet, amount: Atoms) -> Result<Atoms, WalletError> {
        self.fee_with_change(wallet, vec![(dump_address().script_pubkey(), amount)])
    }

    pub fn max_sendable(&self, wallet: &Wallet) -> Result<MaxSendable, WalletError> {
        let total = Self::utxo_total(wallet)?;
        let fee = self.estimate_fee(wallet, total).map_err(|e| {
            WalletError::InsufficientFunds(format!("Unable to estimate fee: {}", e))
        })?;
        MaxSendable::from_total(total, fee)
    }

    /// Spend every UTXO to `targets`, change back to the wallet, then sign.
    ///
    /// Fails with `InvalidAmountAndFee` rather than return a transaction whose
    /// outputs plus fee exceed its inputs.
    pub fn send_to_addresses(
        &self,
        wallet: &Wallet,
        targets: &[SendTarget],
    ) -> Result<BuiltTransaction, WalletError> {
        if targets.is_empty() {
            return Err(ValidationError::new("At least one recipient is required").into());
        }

        let mut outputs = Vec::with_capacity(targets.len() + 1);
        let mut target_total: Atoms = 0;
        for target in targets {
            let address = Address::from_str(&target.address).map_err(|_| {
                ValidationError::new(format!("Invalid address \"{}\"", target.address))
            })?;
            target_total = target_total
                .checked_add(target.amount)
                .ok_or_else(|| ValidationError::new("Total send amount is too large"))?;
            outputs.push((address.script_pubkey(), target.amount));
        }

        let utxos = &wallet.state.utxos;
        let input_total = Self::utxo_total(wallet)?;
        let fee = self.fee_with_change(wallet, outputs.clone())?;

        let spend = target_total.saturating_add(fee);
        if spend > input_total {
            return Err(WalletError::InvalidAmountAndFee {
                outputs: target_total,
                fee,
                inputs: input_total,
            });
        }

        let change = input_total - spend;
        let paid_fee = if change >= DUST_LIMIT {
            outputs.push((Self::change_script(wallet)?, change));
            fee
        } else {
            if change > 0 {
                log::debug!("Dropping {} atoms of dust change into the fee", change);
            }
            fee + change
        };

        let unsigned = self.builder.build_unsigned(utxos, &outputs)?;
        let tx = self.builder.sign_transaction(unsigned, utxos, wallet)?;

        let hex = bitcoin::consensus::encode::serialize_hex(&tx);
        log::info!(
            "Built transaction {} with {} input(s), {} output(s), fee {} atoms",
            tx.compute_txid(),
            tx.input.len(),
            tx.output.len(),
            paid_fee
        );

        Ok(BuiltTransaction {
            hex,
            tx,
            fee: paid_fee,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Network;
    use crate::storage::{KeyManager, Utxo};

    const PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn funded_wallet(amounts: &[Atoms]) -> Wallet {
        let mut wallet = KeyManager::from_mnemonic(PHRASE, Network::Mainnet).unwrap();
        let address = wallet.paths[&0].address.clone();
        wallet.state.utxos = amounts
            .iter()
            .enumerate()
            .map(|(i, &amount)| Utxo {
                address: address.clone(),
                tx_id: hex::encode([i as u8 + 1; 32]),
                output_index: 0,
                script: String::new(),
                amount,
                confirmations: 6,
            })
            .collect();
        wallet.state.balance_atoms = amounts.iter().fold(0, |acc: Atoms, a| acc.saturating_add(*a));
        wallet
    }

    #[test]
    fn test_max_sendable_from_total() {
        let max = MaxSendable::from_total(10_000_000, 2_010).unwrap();
        assert_eq!(
            max,
            MaxSendable {
                max_amount: 9_997_990,
                fee: 2_010
            }
        );
        assert!(matches!(
            MaxSendable::from_total(2_010, 2_010),
            Err(WalletError::InsufficientFunds(_))
        ));
    }

    #[test]
    fn test_estimate_fee_is_positive_and_stable() {
        let ledger = UtxoLedger::new(&WalletConfig::default());
        let wallet = funded_wallet(&[10_000_000]);
        let a = ledger.estimate_fee(&wallet, 1_000_000).unwrap();
        let b = ledger.estimate_fee(&wallet, 5_000_000).unwrap();
        assert!(a > 0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_max_sendable_empty_wallet() {
        let ledger = UtxoLedger::new(&WalletConfig::default());
        let wallet = funded_wallet(&[]);
        assert!(matches!(
            ledger.max_sendable(&wallet),
            Err(WalletError::InsufficientFunds(_))
        ));
    }

    #[test]
    fn test_send_max_leaves_no_change() {
        let ledger = UtxoLedger::new(&WalletConfig::default());
        let wallet = funded_wallet(&[10_000_000, 2_500_000]);
        let max = ledger.max_sendable(&wallet).unwrap();

        let target = SendTarget {
            address: dump_address().to_string(),
            amount: max.max_amount,
        };
        let built = ledger.send_to_addresses(&wallet, &[target]).unwrap();
        assert_eq!(built.tx.input.len(), 2);
        assert_eq!(built.tx.output.len(), 1);
        assert_eq!(built.fee, max.fee);
    }

    #[test]
    fn test_send_returns_change() {
        let ledger = UtxoLedger::new(&WalletConfig::default());
        let wallet = funded_wallet(&[10_000_000]);
        let target = SendTarget {
            address: dump_address().to_string(),
            amount: 1_000_000,
        };
        let built = ledger.send_to_addresses(&wallet, &[target]).unwrap();
        assert_eq!(built.tx.output.len(), 2);
        let change = built.tx.output[1].value.to_sat();
        assert_eq!(1_000_000 + change + built.fee, 10_000_000);
        assert!(built.tx.input.iter().all(|i| !i.script_sig.is_empty()));
        assert_eq!(built.hex, bitcoin::consensus::encode::serialize_hex(&built.tx));
    }

    #[test]
    fn test_dust_change_is_added_to_fee() {
        let ledger = UtxoLedger::new(&WalletConfig::default());
        let wallet = funded_wallet(&[10_000_000]);
        let max = ledger.max_sendable(&wallet).unwrap();

        let target = SendTarget {
            address: dump_address().to_string(),
            amount: max.max_amount - 100,
        };
        let built = ledger.send_to_addresses(&wallet, &[target]).unwrap();
        assert_eq!(built.tx.output.len(), 1);
        assert_eq!(built.fee, max.fee + 100);
        let output_total: Atoms = built.tx.output.iter().map(|o| o.value.to_sat()).sum();
        assert_eq!(output_total + built.fee, 10_000_000);
    }

    #[test]
    fn test_overflowing_utxo_total_is_an_error() {
        let ledger = UtxoLedger::new(&WalletConfig::default());
        let wallet = funded_wallet(&[u64::MAX, 1]);
        assert!(matches!(
            ledger.max_sendable(&wallet),
            Err(WalletError::Internal(_))
        ));
        let target = SendTarget {
            address: dump_address().to_string(),
            amount: 1_000,
        };
        assert!(matches!(
            ledger.send_to_addresses(&wallet, &[target]),
            Err(WalletError::Internal(_))
        ));
    }

    #[test]
    fn test_send_rejects_overspend() {
        let ledger = UtxoLedger::new(&WalletConfig::default());
        let wallet = funded_wallet(&[1_000_000]);
        let target = SendTarget {
            address: dump_address().to_string(),
            amount: 1_000_000,
        };
        let result = ledger.send_to_addresses(&wallet, &[target]);
        assert!(matches!(
            result,
            Err(WalletError::InvalidAmountAndFee { outputs: 1_000_000, inputs: 1_000_000, .. })
        ));
    }

    #[test]
    fn test_send_rejects_foreign_script() {
        let ledger = UtxoLedger::new(&WalletConfig::default());
        let mut wallet = funded_wallet(&[10_000_000]);
        wallet.state.utxos[0].script = hex::encode(dump_address().script_pubkey().as_bytes());
        let target = SendTarget {
            address: dump_address().to_string(),
            amount: 1_000_000,
        };
        assert!(matches!(
            ledger.send_to_addresses(&wallet, &[target]),
            Err(WalletError::Bitcoin(_))
        ));
    }

    #[test]
    fn test_send_rejects_bad_target_address() {
        let ledger = UtxoLedger::new(&WalletConfig::default());
        let wallet = funded_wallet(&[1_000_000]);
        let target = SendTarget {
            address: "notanaddress".into(),
            amount: 1,
        };
        assert!(matches!(
            ledger.send_to_addresses(&wallet, &[target]),
            Err(WalletError::Validation(_))
        ));
    }
}
