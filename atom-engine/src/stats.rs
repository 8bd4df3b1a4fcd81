//! Per-agent statistics record.

use ethers_core::types::Address;
use serde::{Deserialize, Serialize};

use crate::address::keccak256;
use crate::params::STATS_SCHEMA_VERSION;
use crate::ring::RecentCounterparts;
use crate::sketch::DiversitySketch;

/// Bit set of anomaly flags raised by the last update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnomalyFlags(u8);

impl AnomalyFlags {
    pub const SYBIL: u8 = 1 << 0;
    pub const BURST: u8 = 1 << 1;
    pub const SHOCK: u8 = 1 << 2;
    pub const STAGNATION: u8 = 1 << 3;
    pub const VOLATILITY: u8 = 1 << 4;
    pub const REPEAT: u8 = 1 << 5;

    const NAMES: [(u8, &'static str); 6] = [
        (Self::SYBIL, "sybil"),
        (Self::BURST, "burst"),
        (Self::SHOCK, "shock"),
        (Self::STAGNATION, "stagnation"),
        (Self::VOLATILITY, "volatility"),
        (Self::REPEAT, "repeat"),
    ];

    pub fn empty() -> Self {
        Self(0)
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn contains(&self, flag: u8) -> bool {
        self.0 & flag == flag
    }

    pub fn set(&mut self, flag: u8, on: bool) {
        if on {
            self.0 |= flag;
        } else {
            self.0 &= !flag;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Names of the raised flags, in bit order.
    pub fn names(&self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(bit, _)| self.contains(*bit))
            .map(|(_, name)| *name)
            .collect()
    }
}

/// Normalized anomaly signals from the last update, each in `0..=100`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signals {
    pub sybil: u8,
    pub burst: u8,
    pub stagnation: u8,
    pub shock: u8,
    pub volatility: u8,
    pub arrival: u8,
}

/// Statistics record for one agent.
///
/// Accumulators summarize the whole history, so updates never replay events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomStats {
    /// Agent identity (asset).
    pub asset: Address,
    /// Collection the agent was validated against.
    pub collection: Address,
    pub schema_version: u8,

    /// Fast and slow score EWMAs, 0..=10_000.
    pub ema_fast: u16,
    pub ema_slow: u16,
    /// EWMA of absolute score deltas, 0..=10_000.
    pub ema_volatility: u16,
    /// EWMA of inter-arrival time in seconds.
    pub ema_arrival: u32,
    pub last_magnitude: u16,

    pub sketch: DiversitySketch,
    pub sketch_salt: u64,
    pub recent: RecentCounterparts,

    pub event_count: u64,
    pub repeat_count: u64,
    pub first_event_timestamp: u64,
    pub last_event_timestamp: u64,

    /// Combined trust, 0..=100.
    pub trust_score: u8,
    /// Weighted anomaly load, 0..=100.
    pub risk_score: u8,
    /// Blended score EWMA, 0..=10_000.
    pub quality_score: u16,
    /// Diversity-backed confidence, 0..=10_000.
    pub confidence: u16,
    /// 0 (untrusted) to 4.
    pub trust_tier: u8,
    pub flags: AnomalyFlags,
    pub signals: Signals,
}

impl AtomStats {
    /// A fresh record with zeroed accumulators.
    pub fn new(asset: Address, collection: Address) -> Self {
        Self {
            asset,
            collection,
            schema_version: STATS_SCHEMA_VERSION,
            ema_fast: 0,
            ema_slow: 0,
            ema_volatility: 0,
            ema_arrival: 0,
            last_magnitude: 0,
            sketch: DiversitySketch::new(),
            sketch_salt: sketch_salt(&asset),
            recent: RecentCounterparts::default(),
            event_count: 0,
            repeat_count: 0,
            first_event_timestamp: 0,
            last_event_timestamp: 0,
            trust_score: 0,
            risk_score: 0,
            quality_score: 0,
            confidence: 0,
            trust_tier: 0,
            flags: AnomalyFlags::empty(),
            signals: Signals::default(),
        }
    }

    /// Returns true once at least one event was applied.
    pub fn has_events(&self) -> bool {
        self.event_count > 0
    }

    /// Estimated number of distinct counterparts.
    pub fn distinct_counterparts(&self) -> u64 {
        self.sketch.estimate()
    }
}

/// Per-agent sketch salt.
pub fn sketch_salt(asset: &Address) -> u64 {
    let hash = keccak256(&[&b"atom_hll_salt"[..], asset.as_bytes()]);
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&hash[..8]);
    u64::from_le_bytes(buf)
}
