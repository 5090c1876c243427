//! Bit re-packing and the 40-bit BCH polymod checksum

use crate::error::CodecError;

const GENERATORS: [u64; 5] = [
    0x98_f2bc_8e61,
    0x79_b76d_99e2,
    0xf3_3e5f_b3c4,
    0xae_2eab_e2a8,
    0x1e_4f43_e470,
];

/// Number of 5-bit checksum digits appended to every address
pub(crate) const CHECKSUM_LEN: usize = 8;

/// Polynomial reduction over 5-bit symbols. A valid address (payload plus
/// checksum digits) reduces to 0.
pub(crate) fn polymod(symbols: &[u8]) -> u64 {
    let mut acc: u64 = 1;
    for &symbol in symbols {
        let top = acc >> 35;
        acc = ((acc & 0x07_ffff_ffff) << 5) ^ u64::from(symbol);
        for (i, generator) in GENERATORS.iter().enumerate() {
            if (top >> i) & 1 == 1 {
                acc ^= generator;
            }
        }
    }
    acc ^ 1
}

/// Checksum digits for a payload, most-significant symbol first
pub(crate) fn create_checksum(payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let mut data = Vec::with_capacity(payload.len() + CHECKSUM_LEN);
    data.extend_from_slice(payload);
    data.extend_from_slice(&[0u8; CHECKSUM_LEN]);
    let value = polymod(&data);

    let mut digits = [0u8; CHECKSUM_LEN];
    for (i, digit) in digits.iter_mut().enumerate() {
        *digit = ((value >> (5 * (CHECKSUM_LEN - 1 - i))) & 31) as u8;
    }
    digits
}

pub(crate) fn verify_checksum(symbols: &[u8]) -> bool {
    polymod(symbols) == 0
}

/// Re-pack `data` from `from`-bit groups into `to`-bit groups.
///
/// Non-strict mode pads the final group with zero bits. Strict mode fails if
/// `from` or more bits are left over or if the leftover padding is non-zero.
pub(crate) fn convert_bits(
    data: &[u8],
    from: u32,
    to: u32,
    strict: bool,
) -> Result<Vec<u8>, CodecError> {
    let mask: u32 = (1 << to) - 1;
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let mut out = Vec::with_capacity(data.len() * from as usize / to as usize + 1);

    for &value in data {
        let value = u32::from(value);
        if value >> from != 0 {
            return Err(CodecError::InvalidPadding);
        }
        acc = ((acc << from) | value) & 0xffff;
        bits += from;
        while bits >= to {
            bits -= to;
            out.push(((acc >> bits) & mask) as u8);
        }
    }

    if strict {
        if bits >= from || ((acc << (to - bits)) & mask) != 0 {
            return Err(CodecError::InvalidPadding);
        }
    } else if bits > 0 {
        out.push(((acc << (to - bits)) & mask) as u8);
    }

    Ok(out)
}
