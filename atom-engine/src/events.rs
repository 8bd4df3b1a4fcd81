//! Events emitted by successful engine mutations.

use ethers_core::types::Address;
use serde::{Deserialize, Serialize};

use crate::address::RecordAddress;

/// A structured record of one committed mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AtomEvent {
    ConfigInitialized {
        authority: Address,
        registrar: Address,
    },
    ConfigUpdated {
        authority: Address,
        version: u64,
        paused: bool,
    },
    StatsInitialized {
        asset: Address,
        collection: Address,
        stats: RecordAddress,
    },
    StatsUpdated {
        asset: Address,
        /// Event count after this update.
        event_index: u64,
        /// Normalized score received, 0..=100.
        score: u8,
        trust_score: u8,
        trust_tier: u8,
        risk_score: u8,
        quality_score: u16,
        confidence: u16,
        flags: Vec<String>,
    },
    StatsRevoked {
        asset: Address,
        event_count: u64,
    },
    FeedbackRevoked {
        asset: Address,
        counterpart: Address,
    },
}

impl AtomEvent {
    /// Event name as it appears in logs.
    pub fn name(&self) -> &'static str {
        match self {
            AtomEvent::ConfigInitialized { .. } => "ConfigInitialized",
            AtomEvent::ConfigUpdated { .. } => "ConfigUpdated",
            AtomEvent::StatsInitialized { .. } => "StatsInitialized",
            AtomEvent::StatsUpdated { .. } => "StatsUpdated",
            AtomEvent::StatsRevoked { .. } => "StatsRevoked",
            AtomEvent::FeedbackRevoked { .. } => "FeedbackRevoked",
        }
    }
}
