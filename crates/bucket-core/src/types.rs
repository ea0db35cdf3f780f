//! Core type definitions for the Bucket client

use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of a Sui address / object ID in hex characters (32 bytes)
pub const SUI_ADDRESS_HEX_LEN: usize = 64;

/// Normalize a Sui address or object ID to `0x` + 64 lowercase hex chars.
///
/// Short forms such as `0x2` are left-padded with zeros. The input is not
/// validated here; encoding to bytes rejects non-hex input.
pub fn normalize_sui_address(value: &str) -> String {
    let trimmed = value.trim();
    let hex_part = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed)
        .to_ascii_lowercase();

    if hex_part.len() >= SUI_ADDRESS_HEX_LEN {
        return format!("0x{}", hex_part);
    }

    format!("0x{:0>width$}", hex_part, width = SUI_ADDRESS_HEX_LEN)
}

/// Decode a normalized address into its 32 raw bytes.
pub fn sui_address_bytes(value: &str) -> Option<[u8; 32]> {
    let normalized = normalize_sui_address(value);
    let bytes = hex::decode(&normalized[2..]).ok()?;
    bytes.try_into().ok()
}

/// Object ID (32 bytes, `0x`-prefixed hex)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub String);

impl ObjectId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(normalize_sui_address(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_bytes(&self) -> Option<[u8; 32]> {
        sui_address_bytes(&self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account address (32 bytes, `0x`-prefixed hex)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SuiAddress(pub String);

impl SuiAddress {
    pub fn new(addr: impl AsRef<str>) -> Self {
        Self(normalize_sui_address(addr.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_bytes(&self) -> Option<[u8; 32]> {
        sui_address_bytes(&self.0)
    }

    /// The all-zero address used as the default devInspect sender
    pub fn dummy() -> Self {
        Self::new(constants::DUMMY_ADDRESS)
    }
}

impl fmt::Display for SuiAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&ObjectId> for SuiAddress {
    fn from(id: &ObjectId) -> Self {
        Self(id.0.clone())
    }
}

/// Network type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Some(Self::Mainnet),
            "testnet" => Some(Self::Testnet),
            _ => None,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Constants
pub mod constants {
    /// Shared clock object
    pub const SUI_CLOCK_OBJECT_ID: &str = "0x6";

    /// Zero address, used as sender for read-only simulation
    pub const DUMMY_ADDRESS: &str = "0x0";

    /// Native SUI coin type
    pub const SUI_COIN_TYPE: &str = "0x2::sui::SUI";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_short_address() {
        let clock = normalize_sui_address("0x6");
        assert_eq!(clock.len(), 66);
        assert!(clock.starts_with("0x0000"));
        assert!(clock.ends_with("06"));
    }

    #[test]
    fn test_normalize_uppercase_and_missing_prefix() {
        let a = normalize_sui_address("ABCDEF");
        let b = normalize_sui_address("0xabcdef");
        assert_eq!(a, b);
    }

    #[test]
    fn test_object_id_bytes() {
        let id = ObjectId::new("0x2");
        let bytes = id.to_bytes().unwrap();
        assert_eq!(bytes[31], 2);
        assert!(bytes[..31].iter().all(|b| *b == 0));

        assert!(ObjectId::new("0xnothex").to_bytes().is_none());
    }

    #[test]
    fn test_dummy_address() {
        let dummy = SuiAddress::dummy();
        assert_eq!(dummy.as_str(), format!("0x{}", "0".repeat(64)));
    }

    #[test]
    fn test_network_names() {
        assert_eq!(Network::Mainnet.as_str(), "mainnet");
        assert_eq!(Network::from_name("TESTNET"), Some(Network::Testnet));
        assert_eq!(Network::from_name("devnet"), None);
    }
}
