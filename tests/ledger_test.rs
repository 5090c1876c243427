mod common;

use common::*;
use dcrwallet_core::ledger::{broadcast_transaction, dump_address, MaxSendable};
use dcrwallet_core::{
    Atoms, HttpIndexer, KeyManager, Network, SendTarget, Utxo, UtxoLedger, Wallet, WalletConfig,
    WalletError,
};

fn funded_wallet(amounts: &[Atoms]) -> Wallet {
    let mut wallet = KeyManager::from_mnemonic(PHRASE, Network::Testnet).unwrap();
    let address = wallet.paths[&0].address.clone();
    wallet.state.utxos = amounts
        .iter()
        .enumerate()
        .map(|(i, &amount)| Utxo {
            address: address.clone(),
            tx_id: hex::encode([0x40 + i as u8; 32]),
            output_index: i as u32,
            script: String::new(),
            amount,
            confirmations: 3,
        })
        .collect();
    wallet.state.balance_atoms = amounts.iter().sum();
    wallet
}

#[test]
fn test_max_sendable_scenario() {
    let max = MaxSendable::from_total(10_000_000, 2_010).unwrap();
    assert_eq!(max.max_amount, 9_997_990);
    assert_eq!(max.fee, 2_010);
}

#[test]
fn test_max_sendable_uses_estimated_fee() {
    let ledger = UtxoLedger::new(&WalletConfig::default());
    let wallet = funded_wallet(&[4_000_000, 6_000_000]);

    let fee = ledger.estimate_fee(&wallet, 10_000_000).unwrap();
    let max = ledger.max_sendable(&wallet).unwrap();
    assert_eq!(max.fee, fee);
    assert_eq!(max.max_amount + max.fee, 10_000_000);
}

#[test]
fn test_send_never_overspends() {
    init_logging();
    let ledger = UtxoLedger::new(&WalletConfig::default());
    let wallet = funded_wallet(&[3_000_000, 2_000_000]);
    let inputs: Atoms = 5_000_000;

    for amount in [500_000, 2_500_000, 4_990_000, 4_999_000, 5_000_000, 6_000_000] {
        let target = SendTarget {
            address: dump_address().to_string(),
            amount,
        };
        match ledger.send_to_addresses(&wallet, &[target]) {
            Ok(built) => {
                let outputs: Atoms = built.tx.output.iter().map(|o| o.value.to_sat()).sum();
                assert!(amount + built.fee <= inputs, "amount {}", amount);
                assert_eq!(outputs + built.fee, inputs);
            }
            Err(WalletError::InvalidAmountAndFee { outputs, fee, inputs: total }) => {
                assert!(outputs + fee > total, "amount {}", amount);
            }
            Err(e) => panic!("unexpected error for {}: {}", amount, e),
        }
    }
}

#[test]
fn test_send_to_many_targets() {
    let ledger = UtxoLedger::new(&WalletConfig::default());
    let wallet = funded_wallet(&[100_000_000]);
    let other = KeyManager::from_mnemonic(PHRASE, Network::Mainnet).unwrap();

    let targets = vec![
        SendTarget {
            address: dump_address().to_string(),
            amount: 25_000_000,
        },
        SendTarget {
            address: other.paths[&0].address.clone(),
            amount: 17_000_000,
        },
    ];
    let built = ledger.send_to_addresses(&wallet, &targets).unwrap();

    assert_eq!(built.tx.output.len(), 3);
    assert_eq!(built.tx.output[0].value.to_sat(), 25_000_000);
    assert_eq!(built.tx.output[1].value.to_sat(), 17_000_000);
    assert_eq!(
        built.tx.output[2].value.to_sat(),
        100_000_000 - 42_000_000 - built.fee
    );
}

#[tokio::test]
async fn test_broadcast_retries_then_succeeds() -> anyhow::Result<()> {
    let env = TestEnvironment::new().await?;
    let indexer = HttpIndexer::from_config(env.manager.config());

    env.chain.fail_next_broadcasts(5).await;
    let txid = broadcast_transaction(&indexer, "0100", 5).await?;

    assert_eq!(txid.len(), 64);
    assert_eq!(env.chain.broadcasts().await.len(), 6);
    Ok(())
}

#[tokio::test]
async fn test_broadcast_gives_up() -> anyhow::Result<()> {
    let env = TestEnvironment::new().await?;
    let indexer = HttpIndexer::from_config(env.manager.config());

    env.chain.fail_next_broadcasts(10).await;
    let result = broadcast_transaction(&indexer, "0100", 5).await;

    assert!(matches!(
        result,
        Err(WalletError::BroadcastFailed { attempts: 6, .. })
    ));
    assert_eq!(env.chain.broadcasts().await.len(), 6);
    Ok(())
}
