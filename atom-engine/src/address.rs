//! Deterministic record addressing.
//!
//! Every record lives at `keccak256(ENGINE_DOMAIN || seed || key)`, so any
//! party can compute where an agent's stats live without a lookup.
//!
//! # Example
//!
//! ```rust
//! use atom_engine::address::stats_address;
//! use ethers_core::types::Address;
//!
//! let agent = Address::repeat_byte(0x11);
//! assert_eq!(stats_address(&agent), stats_address(&agent));
//! ```

use std::fmt;
use std::str::FromStr;

use ethers_core::types::Address;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tiny_keccak::{Hasher, Keccak};

/// Domain separator mixed into every derived address.
pub const ENGINE_DOMAIN: &[u8] = b"atom_engine";

/// Seed of the global configuration record.
pub const CONFIG_SEED: &[u8] = b"atom_config";

/// Seed of per-agent stats records.
pub const STATS_SEED: &[u8] = b"atom_stats";

/// A 32-byte storage address of an engine record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordAddress(pub [u8; 32]);

impl RecordAddress {
    /// Raw bytes of the address.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for RecordAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for RecordAddress {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut out = [0u8; 32];
        hex::decode_to_slice(s.trim_start_matches("0x"), &mut out)?;
        Ok(Self(out))
    }
}

impl Serialize for RecordAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RecordAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Keccak256 over the concatenation of `parts`.
pub fn keccak256(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    for part in parts {
        hasher.update(part);
    }
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Derive a record address from a seed and an optional identity key.
pub fn derive_address(seed: &[u8], key: Option<&Address>) -> RecordAddress {
    match key {
        Some(key) => RecordAddress(keccak256(&[ENGINE_DOMAIN, seed, key.as_bytes()])),
        None => RecordAddress(keccak256(&[ENGINE_DOMAIN, seed])),
    }
}

/// Address of the global configuration record.
pub fn config_address() -> RecordAddress {
    derive_address(CONFIG_SEED, None)
}

/// Address of an agent's stats record.
pub fn stats_address(agent: &Address) -> RecordAddress {
    derive_address(STATS_SEED, Some(agent))
}
