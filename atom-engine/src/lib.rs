//! # ATOM Engine
//!
//! **Agent Trust On-chain Model**
//!
//! This crate maintains a compact, fixed-size behavioral record per registered
//! agent and derives trust signals from it. Every incoming feedback event is
//! folded into exponential moving averages, a HyperLogLog sketch of distinct
//! counterparts, and a ring of recent counterpart fingerprints. From those the
//! engine derives a quality score, a confidence level, a risk score, a trust
//! score and a trust tier.
//!
//! ## Features
//!
//! - **Bounded state**: every record has the same size regardless of history
//! - **Integer arithmetic**: saturating fixed-point math that never panics
//! - **Sybil resistance**: per-agent salted sketch plus a recent-counterpart ring
//! - **Guarded mutations**: role, pause and directory checks before any write
//!
//! ## Quick Start
//!
//! ```rust
//! use atom_engine::{AtomEngine, ConfigUpdate, InMemoryDirectory, StatsEvent};
//! use ethers_core::types::Address;
//!
//! let authority = Address::repeat_byte(0x01);
//! let registrar = Address::repeat_byte(0x02);
//! let collection = Address::repeat_byte(0xc0);
//! let owner = Address::repeat_byte(0x0e);
//! let agent = Address::repeat_byte(0xa5);
//!
//! let mut directory = InMemoryDirectory::new();
//! directory.add_collection(collection);
//! directory.add_asset(agent, owner, collection);
//!
//! let mut engine = AtomEngine::new();
//! engine.initialize_config(authority, registrar).unwrap();
//! engine
//!     .update_config(authority, &ConfigUpdate::new().alpha_fast(40))
//!     .unwrap();
//! engine.initialize_stats(owner, agent, collection, &directory).unwrap();
//!
//! for i in 0..10u8 {
//!     let client = Address::repeat_byte(0x10 + i);
//!     let event = StatsEvent::new(client, 90, 1_700_000_000 + u64::from(i) * 3_600);
//!     engine.update_stats(registrar, agent, &event).unwrap();
//! }
//!
//! let snapshot = engine.trust_snapshot(&agent, 1_700_040_000).unwrap();
//! assert!(snapshot.scores.trust_score > 50);
//! ```

pub mod address;
pub mod config;
pub mod directory;
pub mod engine;
pub mod error;
pub mod events;
pub mod ewma;
pub mod guard;
pub mod params;
pub mod ring;
pub mod scoring;
pub mod sketch;
pub mod stats;

// Re-export main types for convenience
pub use address::{config_address, derive_address, stats_address, RecordAddress};
pub use config::{AtomConfig, ConfigField, ConfigUpdate};
pub use directory::{AssetDirectory, DirectoryAccount, InMemoryDirectory};
pub use engine::AtomEngine;
pub use error::{AtomError, Result};
pub use events::AtomEvent;
pub use ring::{PushOutcome, RecentCounterparts};
pub use scoring::{ScoreBreakdown, StatsEvent, TrustSnapshot, UpdateOutcome};
pub use sketch::DiversitySketch;
pub use stats::{AnomalyFlags, AtomStats, Signals};
