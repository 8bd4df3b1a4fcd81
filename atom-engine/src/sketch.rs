//! Fixed-size distinct-counterpart estimator.
//!
//! `DiversitySketch` is a HyperLogLog register array: 256 registers of 4 bits
//! packed into 128 bytes. Inserting and merging both take the register-wise
//! maximum, so the sketch is commutative and idempotent: replaying or
//! reordering the same counterparts never changes it. Inputs are fingerprinted
//! with a per-agent salt, which keeps an attacker from precomputing identities
//! that land on high registers.

use ethers_core::types::Address;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::address::keccak256;
use crate::params::{HLL_BYTES, HLL_MAX_RHO, HLL_REGISTERS};

/// `alpha_m * m^2` for m = 256, as an integer.
const HLL_ALPHA_MM: u64 = 47_073;

/// Fixed-point unit for the harmonic register sum.
const HARMONIC_ONE: u64 = 1 << 16;

/// Salted counterpart fingerprint.
pub fn fingerprint(salt: u64, counterpart: &Address) -> [u8; 32] {
    keccak256(&[&salt.to_le_bytes()[..], counterpart.as_bytes()])
}

/// Packed 4-bit HyperLogLog registers.
#[derive(Clone, PartialEq, Eq)]
pub struct DiversitySketch {
    registers: [u8; HLL_BYTES],
}

impl Default for DiversitySketch {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DiversitySketch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiversitySketch")
            .field("occupied", &self.occupied())
            .field("estimate", &self.estimate())
            .finish()
    }
}

impl DiversitySketch {
    /// An empty sketch.
    pub fn new() -> Self {
        Self {
            registers: [0u8; HLL_BYTES],
        }
    }

    /// Value of register `index` (0..256).
    #[inline]
    pub fn register(&self, index: usize) -> u8 {
        let byte = self.registers[index / 2];
        if index % 2 == 0 {
            byte & 0x0F
        } else {
            byte >> 4
        }
    }

    #[inline]
    fn set_register(&mut self, index: usize, value: u8) {
        let value = value.min(HLL_MAX_RHO);
        let byte = &mut self.registers[index / 2];
        if index % 2 == 0 {
            *byte = (*byte & 0xF0) | value;
        } else {
            *byte = (*byte & 0x0F) | (value << 4);
        }
    }

    /// Raw packed bytes.
    pub fn as_bytes(&self) -> &[u8; HLL_BYTES] {
        &self.registers
    }

    /// Inserts a 32-byte fingerprint. Returns true if a register grew.
    ///
    /// The first byte selects the register; rho is the position of the first
    /// set bit in the next 56 bits, capped at `HLL_MAX_RHO`.
    pub fn insert_hash(&mut self, hash: &[u8; 32]) -> bool {
        let index = hash[0] as usize;
        let mut tail = [0u8; 8];
        tail[1..].copy_from_slice(&hash[1..8]);
        let bits = u64::from_be_bytes(tail);
        let rho = (bits.leading_zeros() - 8 + 1).min(u32::from(HLL_MAX_RHO)) as u8;

        if rho > self.register(index) {
            self.set_register(index, rho);
            true
        } else {
            false
        }
    }

    /// Fingerprints and inserts a counterpart identity.
    pub fn insert(&mut self, salt: u64, counterpart: &Address) -> bool {
        self.insert_hash(&fingerprint(salt, counterpart))
    }

    /// Register-wise maximum with `other`.
    pub fn merge(&mut self, other: &DiversitySketch) {
        for index in 0..HLL_REGISTERS {
            let theirs = other.register(index);
            if theirs > self.register(index) {
                self.set_register(index, theirs);
            }
        }
    }

    /// Number of non-zero registers.
    pub fn occupied(&self) -> usize {
        (0..HLL_REGISTERS).filter(|&i| self.register(i) != 0).count()
    }

    /// Estimated number of distinct inserted fingerprints.
    pub fn estimate(&self) -> u64 {
        let mut harmonic: u64 = 0;
        let mut zeros: u64 = 0;
        for index in 0..HLL_REGISTERS {
            let rho = self.register(index);
            harmonic += HARMONIC_ONE >> rho;
            if rho == 0 {
                zeros += 1;
            }
        }

        let m = HLL_REGISTERS as u64;
        let raw = HLL_ALPHA_MM.saturating_mul(HARMONIC_ONE) / harmonic.max(1);

        if raw <= 5 * m / 2 && zeros > 0 {
            let m = m as f64;
            (m * (m / zeros as f64).ln()).round() as u64
        } else {
            raw
        }
    }
}

impl Serialize for DiversitySketch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.registers))
    }
}

impl<'de> Deserialize<'de> for DiversitySketch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let mut registers = [0u8; HLL_BYTES];
        hex::decode_to_slice(&s, &mut registers).map_err(serde::de::Error::custom)?;
        // Nibbles are 4 bits wide and HLL_MAX_RHO is 15, so any byte is valid.
        Ok(Self { registers })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(i: u64) -> Address {
        Address::from_low_u64_be(i + 1)
    }

    #[test]
    fn test_empty_sketch_estimates_zero() {
        assert_eq!(DiversitySketch::new().estimate(), 0);
    }

    #[test]
    fn test_duplicate_insert_is_idempotent() {
        let mut sketch = DiversitySketch::new();
        assert!(sketch.insert(7, &addr(1)));
        let snapshot = sketch.clone();
        assert!(!sketch.insert(7, &addr(1)));
        assert_eq!(sketch, snapshot);
    }

    #[test]
    fn test_estimate_tracks_small_counts() {
        let mut sketch = DiversitySketch::new();
        for i in 0..20 {
            sketch.insert(42, &addr(i));
        }
        let estimate = sketch.estimate();
        assert!((16..=24).contains(&estimate), "estimate {}", estimate);
    }

    #[test]
    fn test_estimate_tracks_large_counts() {
        let mut sketch = DiversitySketch::new();
        for i in 0..5_000 {
            sketch.insert(42, &addr(i));
        }
        let estimate = sketch.estimate();
        // 256 registers -> ~6.5% standard error; allow a wide band.
        assert!((3_500..=6_500).contains(&estimate), "estimate {}", estimate);
    }

    #[test]
    fn test_merge_is_commutative() {
        let mut a = DiversitySketch::new();
        let mut b = DiversitySketch::new();
        for i in 0..50 {
            a.insert(1, &addr(i));
            b.insert(1, &addr(i + 25));
        }
        let mut ab = a.clone();
        ab.merge(&b);
        let mut ba = b.clone();
        ba.merge(&a);
        assert_eq!(ab, ba);

        let mut twice = ab.clone();
        twice.merge(&b);
        assert_eq!(twice, ab);
    }

    #[test]
    fn test_rho_capped_for_all_zero_tail() {
        let mut sketch = DiversitySketch::new();
        let mut hash = [0u8; 32];
        hash[0] = 9;
        sketch.insert_hash(&hash);
        assert_eq!(sketch.register(9), HLL_MAX_RHO);
    }

    #[test]
    fn test_serde_hex() {
        let mut sketch = DiversitySketch::new();
        sketch.insert(3, &addr(3));
        let json = serde_json::to_string(&sketch).unwrap();
        assert_eq!(json.len(), HLL_BYTES * 2 + 2);
        let back: DiversitySketch = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sketch);
    }
}
