//! Conversion between display units and atoms
//!
//! The unit scale is network configuration, never a universal constant.

use crate::error::ValidationError;

/// Amount in atoms, the smallest indivisible on-chain unit
pub type Atoms = u64;

/// Unit scale of the configured network (atoms per display unit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Denomination {
    atoms_per_coin: u64,
    decimals: u32,
}

impl Denomination {
    /// Returns `None` unless `atoms_per_coin` is a power of ten.
    pub fn new(atoms_per_coin: u64) -> Option<Self> {
        if atoms_per_coin == 0 {
            return None;
        }
        let mut decimals = 0;
        let mut rest = atoms_per_coin;
        while rest % 10 == 0 {
            rest /= 10;
            decimals += 1;
        }
        (rest == 1).then_some(Self {
            atoms_per_coin,
            decimals,
        })
    }

    pub fn atoms_per_coin(&self) -> u64 {
        self.atoms_per_coin
    }

    /// Fractional digits supported by send amounts
    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    /// Parse a decimal display amount exactly, e.g. "2.5" -> 250000000.
    ///
    /// Only digits and a single '.' are accepted; more fractional digits than
    /// the network supports is an error.
    pub fn to_atoms(&self, amount: &str) -> Result<Atoms, ValidationError> {
        let amount = amount.trim();
        let (whole, frac) = match amount.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (amount, ""),
        };
        let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if (whole.is_empty() && frac.is_empty()) || !all_digits(whole) || !all_digits(frac) {
            return Err(ValidationError(format!(
                "Unable to parse amount \"{}\" as a number",
                amount
            )));
        }
        if frac.len() > self.decimals as usize {
            return Err(ValidationError(format!(
                "Transactions do not support more than {} decimal places",
                self.decimals
            )));
        }

        let overflow = || ValidationError(format!("Amount \"{}\" is too large", amount));
        let whole_atoms = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<u64>()
                .map_err(|_| overflow())?
                .checked_mul(self.atoms_per_coin)
                .ok_or_else(overflow)?
        };
        let frac_atoms = if frac.is_empty() {
            0
        } else {
            let padding = 10u64.pow(self.decimals - frac.len() as u32);
            frac.parse::<u64>().map_err(|_| overflow())? * padding
        };
        whole_atoms.checked_add(frac_atoms).ok_or_else(overflow)
    }

    /// Indexer values are floating point display units: `round(value * scale)`.
    pub fn atoms_from_coins(&self, value: f64) -> i64 {
        (value * self.atoms_per_coin as f64).round() as i64
    }

    /// Fiat amount to atoms at the given price (fiat per display unit).
    /// Truncates toward zero, never rounds.
    pub fn fiat_to_atoms(&self, fiat_amount: f64, fiat_price: f64) -> Atoms {
        if !(fiat_price > 0.0) || !fiat_amount.is_finite() || fiat_amount <= 0.0 {
            return 0;
        }
        ((fiat_amount / fiat_price) * self.atoms_per_coin as f64).floor() as Atoms
    }

    /// Display string with every supported decimal place, e.g. "0.05000000"
    pub fn format_atoms(&self, atoms: Atoms) -> String {
        let whole = atoms / self.atoms_per_coin;
        let frac = atoms % self.atoms_per_coin;
        if self.decimals == 0 {
            return whole.to_string();
        }
        format!(
            "{}.{:0width$}",
            whole,
            frac,
            width = self.decimals as usize
        )
    }
}

impl Default for Denomination {
    fn default() -> Self {
        Self {
            atoms_per_coin: crate::config::DEFAULT_ATOMS_PER_COIN,
            decimals: 8,
        }
    }
}
