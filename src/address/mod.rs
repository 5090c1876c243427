//! Checksummed address codec
//!
//! An address is a `(type, hash)` pair. The version byte packs the type into
//! bit 3 and the hash size into bits 0..=2; `[version] ++ hash` is re-packed
//! into 5-bit digits, followed by an 8-digit BCH checksum, and written in a
//! fixed base32 alphabet. There is no network prefix.

mod base32;
mod checksum;

use bitcoin::opcodes::all::{OP_CHECKSIG, OP_DUP, OP_EQUAL, OP_EQUALVERIFY, OP_HASH160};
use bitcoin::ScriptBuf;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::CodecError;
use checksum::{convert_bits, create_checksum, verify_checksum, CHECKSUM_LEN};

/// Supported hash sizes in bits, indexed by their 3-bit size code
const HASH_SIZES: [usize; 8] = [160, 192, 224, 256, 320, 384, 448, 512];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressType {
    P2PKH,
    P2SH,
}

impl AddressType {
    fn type_bits(self) -> u8 {
        match self {
            AddressType::P2PKH => 0,
            AddressType::P2SH => 8,
        }
    }

    fn from_version(version: u8) -> Result<Self, CodecError> {
        match version & 120 {
            0 => Ok(AddressType::P2PKH),
            8 => Ok(AddressType::P2SH),
            _ => Err(CodecError::UnknownVersion(version)),
        }
    }
}

impl FromStr for AddressType {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "P2PKH" => Ok(AddressType::P2PKH),
            "P2SH" => Ok(AddressType::P2SH),
            _ => Err(CodecError::UnsupportedType(s.to_string())),
        }
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressType::P2PKH => f.write_str("P2PKH"),
            AddressType::P2SH => f.write_str("P2SH"),
        }
    }
}

fn hash_size_bits(hash: &[u8]) -> Result<u8, CodecError> {
    let bits = hash.len() * 8;
    HASH_SIZES
        .iter()
        .position(|&size| size == bits)
        .map(|code| code as u8)
        .ok_or(CodecError::UnsupportedHashLength(bits))
}

/// Encode a `(type, hash)` pair into its checksummed string form.
pub fn encode(kind: AddressType, hash: &[u8]) -> Result<String, CodecError> {
    let version = kind.type_bits() | hash_size_bits(hash)?;

    let mut raw = Vec::with_capacity(hash.len() + 1);
    raw.push(version);
    raw.extend_from_slice(hash);

    let mut digits = convert_bits(&raw, 8, 5, false)?;
    let checksum = create_checksum(&digits);
    digits.extend_from_slice(&checksum);

    Ok(base32::encode(&digits))
}

/// Decode and validate an address string.
pub fn decode(address: &str) -> Result<Address, CodecError> {
    let digits = base32::decode(address)?;
    if digits.len() <= CHECKSUM_LEN {
        return Err(CodecError::TooShort);
    }
    if !verify_checksum(&digits) {
        return Err(CodecError::InvalidChecksum);
    }

    let raw = convert_bits(&digits[..digits.len() - CHECKSUM_LEN], 5, 8, true)?;
    let (&version, hash) = raw.split_first().ok_or(CodecError::TooShort)?;

    let expected = HASH_SIZES[(version & 7) as usize];
    if hash.len() * 8 != expected {
        return Err(CodecError::HashSizeMismatch {
            expected,
            actual: hash.len() * 8,
        });
    }
    let kind = AddressType::from_version(version)?;

    Ok(Address {
        kind,
        hash: hash.to_vec(),
    })
}

/// A decoded, valid address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    kind: AddressType,
    hash: Vec<u8>,
}

impl Address {
    /// Build an address, rejecting hash lengths the codec cannot represent.
    pub fn new(kind: AddressType, hash: impl Into<Vec<u8>>) -> Result<Self, CodecError> {
        let hash = hash.into();
        hash_size_bits(&hash)?;
        Ok(Self { kind, hash })
    }

    pub fn p2pkh(pubkey_hash: [u8; 20]) -> Self {
        Self {
            kind: AddressType::P2PKH,
            hash: pubkey_hash.to_vec(),
        }
    }

    pub fn kind(&self) -> AddressType {
        self.kind
    }

    pub fn hash(&self) -> &[u8] {
        &self.hash
    }

    /// Locking script paying to this address
    pub fn script_pubkey(&self) -> ScriptBuf {
        // Supported hashes are at most 64 bytes, so the length is its own push opcode
        let push_len = self.hash.len() as u8;
        let mut bytes = Vec::with_capacity(self.hash.len() + 5);
        match self.kind {
            AddressType::P2PKH => {
                bytes.extend_from_slice(&[OP_DUP.to_u8(), OP_HASH160.to_u8(), push_len]);
                bytes.extend_from_slice(&self.hash);
                bytes.extend_from_slice(&[OP_EQUALVERIFY.to_u8(), OP_CHECKSIG.to_u8()]);
            }
            AddressType::P2SH => {
                bytes.extend_from_slice(&[OP_HASH160.to_u8(), push_len]);
                bytes.extend_from_slice(&self.hash);
                bytes.push(OP_EQUAL.to_u8());
            }
        }
        ScriptBuf::from_bytes(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Construction guarantees a supported hash length
        match encode(self.kind, &self.hash) {
            Ok(text) => f.write_str(&text),
            Err(_) => Err(fmt::Error),
        }
    }
}

impl FromStr for Address {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        decode(&text).map_err(serde::de::Error::custom)
    }
}

/// True if `address` decodes to a supported `(type, hash)` pair
pub fn is_valid(address: &str) -> bool {
    decode(address).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequential_hash(len: usize) -> Vec<u8> {
        (0..len as u8).collect()
    }

    #[test]
    fn test_encode_known_vectors() {
        let hash = sequential_hash(20);
        assert_eq!(
            encode(AddressType::P2PKH, &hash).unwrap(),
            "qqqqzqsrqszsvpcgpy9qkrqdpc83qygjzv4d7ykuc9"
        );
        assert_eq!(
            encode(AddressType::P2SH, &hash).unwrap(),
            "pqqqzqsrqszsvpcgpy9qkrqdpc83qygjzvzgrt3lrc"
        );
        assert_eq!(
            encode(AddressType::P2PKH, &[0u8; 20]).unwrap(),
            "qqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqyd4tetuk"
        );
    }

    #[test]
    fn test_encode_256_bit_hash() {
        assert_eq!(
            encode(AddressType::P2PKH, &[0xff; 32]).unwrap(),
            "q0llllllllllllllllllllllllllllllllllllllllllllllllll7n45eyfff"
        );
    }

    #[test]
    fn test_encode_rejects_unsupported_length() {
        assert_eq!(
            encode(AddressType::P2PKH, &[0u8; 21]),
            Err(CodecError::UnsupportedHashLength(168))
        );
        assert_eq!(
            encode(AddressType::P2SH, &[]),
            Err(CodecError::UnsupportedHashLength(0))
        );
    }

    #[test]
    fn test_decode_known_vector() {
        let address = decode("ppm2qsznhks23z7629mms6s4cwef74vcwv7346r5j8").unwrap();
        assert_eq!(address.kind(), AddressType::P2SH);
        assert_eq!(
            hex::encode(address.hash()),
            "76a04053bda0a88bda5177b86a15c3b29f559873"
        );
    }

    #[test]
    fn test_decode_rejects_short_and_empty() {
        assert_eq!(decode(""), Err(CodecError::TooShort));
        assert_eq!(decode("qqqqqqqq"), Err(CodecError::TooShort));
    }

    #[test]
    fn test_address_type_from_str() {
        assert_eq!("p2pkh".parse::<AddressType>().unwrap(), AddressType::P2PKH);
        assert_eq!("P2SH".parse::<AddressType>().unwrap(), AddressType::P2SH);
        assert!("p2wpkh".parse::<AddressType>().is_err());
    }

    #[test]
    fn test_p2pkh_script() {
        let address = Address::p2pkh([7u8; 20]);
        let script = address.script_pubkey();
        assert!(script.is_p2pkh());
        assert_eq!(script.len(), 25);
    }

    #[test]
    fn test_p2sh_script() {
        let address = Address::new(AddressType::P2SH, vec![7u8; 20]).unwrap();
        assert!(address.script_pubkey().is_p2sh());
    }

    #[test]
    fn test_serde_uses_string_form() {
        let address = Address::p2pkh([0u8; 20]);
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, "\"qqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqyd4tetuk\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, address);
    }
}
