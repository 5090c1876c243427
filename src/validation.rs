//! User-input validation for sends and wallet creation
//!
//! Every check returns a `ValidationError` whose message is meant for the
//! user as-is.

use bip39::Mnemonic;
use std::collections::HashSet;

use crate::address;
use crate::amount::Atoms;
use crate::config::WalletConfig;
use crate::error::ValidationError;
use crate::ledger::SendTarget;

/// Longest wallet name accepted
pub const MAX_WALLET_NAME_CHARS: usize = 24;

/// Query parameters accepted after `address?`
const SUPPORTED_PARAMS: [&str; 1] = ["amount"];

fn check_amount_chars(amount: &str) -> Result<(), ValidationError> {
    if !amount.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError(format!(
            "Unable to parse amount \"{}\" as a number",
            amount
        )));
    }
    if !amount.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(ValidationError(format!(
            "Invalid amount \"{}\": Amount can only contain numbers and '.' to denote decimal places.",
            amount
        )));
    }
    Ok(())
}

/// Shared tail of the coin and fiat amount checks
fn check_atoms(atoms: Atoms, balance: Atoms, config: &WalletConfig) -> Result<Atoms, ValidationError> {
    let denom = &config.denomination;
    let ticker = config.network.ticker();

    if atoms == 0 {
        return Err(ValidationError::new("Amount must be greater than 0"));
    }
    if atoms < config.min_send_atoms {
        return Err(ValidationError(format!(
            "Send amount must be at least {} {}",
            denom.format_atoms(config.min_send_atoms),
            ticker
        )));
    }
    if atoms > balance {
        return Err(ValidationError(format!(
            "Amount {} {} exceeds wallet balance of {} {}",
            denom.format_atoms(atoms),
            ticker,
            denom.format_atoms(balance),
            ticker
        )));
    }
    Ok(atoms)
}

/// Validate a send amount in display units and convert it to atoms.
///
/// Rules, in order: digits and '.' only; no more decimals than the network
/// supports; greater than zero; at least the minimum send; within `balance`.
pub fn validate_send_amount(
    amount: &str,
    balance: Atoms,
    config: &WalletConfig,
) -> Result<Atoms, ValidationError> {
    let amount = amount.trim();
    check_amount_chars(amount)?;

    let decimals = config.denomination.decimals();
    if let Some((_, frac)) = amount.split_once('.') {
        if frac.len() > decimals as usize {
            return Err(ValidationError(format!(
                "{} transactions do not support more than {} decimal places",
                config.network.ticker(),
                decimals
            )));
        }
    }

    let atoms = config.denomination.to_atoms(amount)?;
    check_atoms(atoms, balance, config)
}

/// Validate a send amount entered in fiat at `fiat_price` per display unit.
/// Conversion floors to whole atoms.
pub fn validate_fiat_send_amount(
    fiat_amount: &str,
    fiat_price: f64,
    balance: Atoms,
    config: &WalletConfig,
) -> Result<Atoms, ValidationError> {
    let fiat_amount = fiat_amount.trim();
    check_amount_chars(fiat_amount)?;

    let value: f64 = fiat_amount.parse().map_err(|_| {
        ValidationError(format!("Unable to parse amount \"{}\" as a number", fiat_amount))
    })?;
    let atoms = config.denomination.fiat_to_atoms(value, fiat_price);
    check_atoms(atoms, balance, config)
}

/// Address with an optional `?amount=` query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressInput {
    pub address: String,
    pub amount: Option<Atoms>,
}

/// Parse `address[?amount=value]`.
pub fn parse_address_input(
    input: &str,
    balance: Atoms,
    config: &WalletConfig,
) -> Result<AddressInput, ValidationError> {
    let input = input.trim();
    let (address, query) = match input.split_once('?') {
        Some((address, query)) => (address, Some(query)),
        None => (input, None),
    };

    if !address::is_valid(address) {
        return Err(ValidationError::new("Invalid address"));
    }

    let mut parsed = AddressInput {
        address: address.to_string(),
        amount: None,
    };

    let Some(query) = query else {
        return Ok(parsed);
    };

    let params: Vec<(&str, &str)> = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .collect();

    let mut keys = HashSet::new();
    if !params.iter().all(|(key, _)| keys.insert(*key)) {
        return Err(ValidationError::new(
            "bip21 parameters may not appear more than once",
        ));
    }

    for (key, value) in params {
        if !SUPPORTED_PARAMS.contains(&key) {
            return Err(ValidationError(format!("Unsupported param \"{}\"", key)));
        }
        if key == "amount" {
            parsed.amount = Some(validate_send_amount(value, balance, config)?);
        }
    }

    Ok(parsed)
}

/// Parse newline-separated `address,amount` rows.
///
/// The first bad row aborts the parse; errors name the 1-indexed line.
pub fn parse_multi_send_input(
    input: &str,
    balance: Atoms,
    config: &WalletConfig,
) -> Result<Vec<SendTarget>, ValidationError> {
    if input.trim().is_empty() {
        return Err(ValidationError::new("Input must not be blank"));
    }

    let mut targets = Vec::new();
    let mut total: Atoms = 0;

    for (index, line) in input.split('\n').enumerate() {
        let line_no = index + 1;
        if line.trim().is_empty() {
            return Err(ValidationError(format!("Remove empty row at line {}", line_no)));
        }

        let fields: Vec<&str> = line.split(',').collect();
        let (address, value) = match fields.as_slice() {
            [address, value] => (address.trim(), value.trim()),
            [_] => {
                return Err(ValidationError(format!(
                    "Line {} must have address and value, separated by a comma",
                    line_no
                )))
            }
            _ => {
                return Err(ValidationError(format!(
                    "Line {}: Comma can only separate address and value.",
                    line_no
                )))
            }
        };

        if !address::is_valid(address) {
            return Err(ValidationError(format!(
                "Invalid address \"{}\" at line {}",
                address, line_no
            )));
        }

        let amount = validate_send_amount(value, balance, config).map_err(|e| {
            ValidationError(format!("{}: check value \"{}\" at line {}", e, value, line_no))
        })?;

        total = total.saturating_add(amount);
        targets.push(SendTarget {
            address: address.to_string(),
            amount,
        });
    }

    if total > balance {
        let denom = &config.denomination;
        let ticker = config.network.ticker();
        return Err(ValidationError(format!(
            "Total amount sent ({} {}) exceeds wallet balance of {} {}",
            denom.format_atoms(total),
            ticker,
            denom.format_atoms(balance),
            ticker
        )));
    }

    Ok(targets)
}

/// Check a BIP39 phrase (word list and checksum).
pub fn validate_mnemonic(words: &str) -> Result<(), ValidationError> {
    if words.trim().is_empty() {
        return Err(ValidationError::new("Mnemonic must not be blank"));
    }
    Mnemonic::parse(words.trim())
        .map(|_| ())
        .map_err(|e| ValidationError(format!("Invalid mnemonic: {}", e)))
}

/// Names must be non-blank, at most 24 characters and unique.
pub fn validate_wallet_name(name: &str, existing: &[String]) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::new("Wallet name cannot be a blank string"));
    }
    if name.trim().is_empty() {
        return Err(ValidationError::new(
            "Wallet name cannot be only blank spaces",
        ));
    }
    if name.chars().count() > MAX_WALLET_NAME_CHARS {
        return Err(ValidationError(format!(
            "Wallet name cannot exceed {} characters",
            MAX_WALLET_NAME_CHARS
        )));
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(ValidationError(format!(
            "Wallet name \"{}\" contains invalid characters",
            name
        )));
    }
    if existing.iter().any(|n| n == name) {
        return Err(ValidationError(format!(
            "Wallet name \"{}\" already exists",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::{encode, AddressType};

    const BALANCE: Atoms = 1_000_000_000;

    fn addr(byte: u8) -> String {
        encode(AddressType::P2PKH, &[byte; 20]).unwrap()
    }

    #[test]
    fn test_send_amount_rules() {
        let config = WalletConfig::default();
        assert_eq!(validate_send_amount("2.5", BALANCE, &config).unwrap(), 250_000_000);

        let err = validate_send_amount("abc", BALANCE, &config).unwrap_err();
        assert_eq!(err.to_string(), "Unable to parse amount \"abc\" as a number");

        let err = validate_send_amount("1,5", BALANCE, &config).unwrap_err();
        assert!(err.to_string().starts_with("Invalid amount \"1,5\""));

        let err = validate_send_amount("0.000000001", BALANCE, &config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "DCR transactions do not support more than 8 decimal places"
        );

        let err = validate_send_amount("0", BALANCE, &config).unwrap_err();
        assert_eq!(err.to_string(), "Amount must be greater than 0");

        let err = validate_send_amount("0.001", BALANCE, &config).unwrap_err();
        assert_eq!(err.to_string(), "Send amount must be at least 0.00500000 DCR");

        let err = validate_send_amount("11", BALANCE, &config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Amount 11.00000000 DCR exceeds wallet balance of 10.00000000 DCR"
        );
    }

    #[test]
    fn test_fiat_amount_floors() {
        let config = WalletConfig::default();
        // 10 fiat at 3 per coin = 3.33333333.. coins
        let atoms = validate_fiat_send_amount("10", 3.0, BALANCE, &config).unwrap();
        assert_eq!(atoms, 333_333_333);
        assert!(validate_fiat_send_amount("10", 0.0, BALANCE, &config).is_err());
    }

    #[test]
    fn test_parse_address_input() {
        let config = WalletConfig::default();
        let a = addr(3);

        let plain = parse_address_input(&a, BALANCE, &config).unwrap();
        assert_eq!(plain.amount, None);

        let with_amount = parse_address_input(&format!("{}?amount=1.5", a), BALANCE, &config).unwrap();
        assert_eq!(with_amount.address, a);
        assert_eq!(with_amount.amount, Some(150_000_000));

        let err = parse_address_input(&format!("{}?amount=1&amount=2", a), BALANCE, &config)
            .unwrap_err();
        assert_eq!(err.to_string(), "bip21 parameters may not appear more than once");

        let err = parse_address_input(&format!("{}?label=x", a), BALANCE, &config).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported param \"label\"");

        let err = parse_address_input("bogus", BALANCE, &config).unwrap_err();
        assert_eq!(err.to_string(), "Invalid address");
    }

    #[test]
    fn test_multi_send_two_rows() {
        let config = WalletConfig::default();
        let input = format!("{},2.5\n{},1.7", addr(1), addr(2));
        let targets = parse_multi_send_input(&input, BALANCE, &config).unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets.iter().map(|t| t.amount).sum::<Atoms>(), 420_000_000);
    }

    #[test]
    fn test_multi_send_errors_name_line() {
        let config = WalletConfig::default();
        let good = format!("{},2.5\n{},1.7", addr(1), addr(2));

        let err = parse_multi_send_input(&format!("{}\nnot-an-address,1", good), BALANCE, &config)
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid address \"not-an-address\" at line 3");

        let err = parse_multi_send_input(&format!("{}\n{}", good, addr(3)), BALANCE, &config)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Line 3 must have address and value, separated by a comma"
        );

        let err = parse_multi_send_input(&format!("{}\n{},1,2", good, addr(3)), BALANCE, &config)
            .unwrap_err();
        assert_eq!(err.to_string(), "Line 3: Comma can only separate address and value.");

        let err = parse_multi_send_input(&format!("{}\n\n", good), BALANCE, &config).unwrap_err();
        assert_eq!(err.to_string(), "Remove empty row at line 3");

        let err = parse_multi_send_input(&format!("{}\n{},0", good, addr(3)), BALANCE, &config)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Amount must be greater than 0: check value \"0\" at line 3"
        );

        let err = parse_multi_send_input("  \n ", BALANCE, &config).unwrap_err();
        assert_eq!(err.to_string(), "Input must not be blank");
    }

    #[test]
    fn test_multi_send_total_exceeds_balance() {
        let config = WalletConfig::default();
        let input = format!("{},6\n{},6", addr(1), addr(2));
        let err = parse_multi_send_input(&input, BALANCE, &config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Total amount sent (12.00000000 DCR) exceeds wallet balance of 10.00000000 DCR"
        );
    }

    #[test]
    fn test_validate_mnemonic() {
        assert!(validate_mnemonic(
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about"
        )
        .is_ok());
        assert!(validate_mnemonic(
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon"
        )
        .is_err());
        assert!(validate_mnemonic("").is_err());
    }

    #[test]
    fn test_validate_wallet_name() {
        let existing = vec!["main".to_string()];
        assert!(validate_wallet_name("savings", &existing).is_ok());
        assert!(validate_wallet_name("", &existing).is_err());
        assert!(validate_wallet_name("   ", &existing).is_err());
        assert!(validate_wallet_name("main", &existing).is_err());
        assert!(validate_wallet_name("../x", &existing).is_err());
        assert!(validate_wallet_name(&"x".repeat(25), &existing).is_err());
    }
}
