//! Account addresses and transaction hashes as the chain encodes them.

use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AddressParseError {
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("address is {0} hex digits, max is 64")]
    TooLong(usize),
}

/// 32-byte account address, rendered as `0x`-prefixed lowercase hex.
///
/// Short forms are accepted on parse and zero-extended on the left, as
/// the chain's address grammar allows.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    PartialOrd,
    Ord,
    DeserializeFromStr,
    SerializeDisplay,
)]
pub struct Address(pub [u8; 32]);

impl Address {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl std::str::FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.len() > 64 {
            return Err(AddressParseError::TooLong(digits.len()));
        }
        // Zero-extend odd/short forms before decoding.
        let padded = format!("{digits:0>64}");
        let bytes = hex::decode(padded)?;
        let mut buf = [0u8; 32];
        buf.copy_from_slice(&bytes);
        Ok(Self(buf))
    }
}

#[derive(Debug, Error)]
pub enum TxidParseError {
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("txid is {0} bytes, expected 32")]
    WrongLength(usize),
}

/// Transaction hash.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    PartialOrd,
    Ord,
    DeserializeFromStr,
    SerializeDisplay,
)]
pub struct Txid(pub [u8; 32]);

impl std::fmt::Display for Txid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl std::str::FromStr for Txid {
    type Err = TxidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits)?;
        let len = bytes.len();
        let buf: [u8; 32] =
            bytes.try_into().map_err(|_| TxidParseError::WrongLength(len))?;
        Ok(Self(buf))
    }
}
