//! Base32 alphabet used by checksummed addresses

use crate::error::CodecError;

pub(crate) const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// Map 5-bit digits to characters. Digits must already be < 32.
pub(crate) fn encode(digits: &[u8]) -> String {
    digits
        .iter()
        .map(|&d| CHARSET[(d & 31) as usize] as char)
        .collect()
}

/// Map characters to 5-bit digits. An all-uppercase string is accepted;
/// mixed case is not.
pub(crate) fn decode(text: &str) -> Result<Vec<u8>, CodecError> {
    let has_lower = text.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = text.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        return Err(CodecError::MixedCase);
    }

    text.chars()
        .map(|c| {
            let lower = c.to_ascii_lowercase();
            CHARSET
                .iter()
                .position(|&x| x as char == lower)
                .map(|pos| pos as u8)
                .ok_or(CodecError::InvalidCharacter(c))
        })
        .collect()
}
