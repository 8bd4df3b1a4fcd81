//! In-memory host for the engine's records.
//!
//! `AtomEngine` owns the configuration record and every stats record, keyed by
//! derived address. Each operation runs its guards first, computes the next
//! record value on a copy, and only then replaces the stored value, so a
//! failed call leaves the engine exactly as it was.
//!
//! # Example
//!
//! ```rust
//! use atom_engine::{AtomEngine, InMemoryDirectory, StatsEvent};
//! use ethers_core::types::Address;
//!
//! let authority = Address::repeat_byte(1);
//! let registrar = Address::repeat_byte(2);
//! let collection = Address::repeat_byte(3);
//! let owner = Address::repeat_byte(4);
//! let agent = Address::repeat_byte(5);
//!
//! let mut directory = InMemoryDirectory::new();
//! directory.add_collection(collection);
//! directory.add_asset(agent, owner, collection);
//!
//! let mut engine = AtomEngine::new();
//! engine.initialize_config(authority, registrar).unwrap();
//! engine.initialize_stats(owner, agent, collection, &directory).unwrap();
//!
//! let event = StatsEvent::new(Address::repeat_byte(9), 90, 1_700_000_000);
//! let stats = engine.update_stats(registrar, agent, &event).unwrap();
//! assert_eq!(stats.event_count, 1);
//! ```

use std::collections::BTreeMap;

use ethers_core::types::Address;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::address::{config_address, stats_address, RecordAddress};
use crate::config::{AtomConfig, ConfigUpdate};
use crate::directory::AssetDirectory;
use crate::error::{AtomError, Result};
use crate::events::AtomEvent;
use crate::guard;
use crate::params::MAX_MAGNITUDE;
use crate::ring;
use crate::scoring::{self, StatsEvent, TrustSnapshot};
use crate::sketch::fingerprint;
use crate::stats::AtomStats;

/// Host for the configuration and all stats records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AtomEngine {
    config: Option<AtomConfig>,
    stats: BTreeMap<RecordAddress, AtomStats>,
    #[serde(skip)]
    events: Vec<AtomEvent>,
}

impl AtomEngine {
    /// Creates an empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// The global configuration.
    pub fn config(&self) -> Result<&AtomConfig> {
        self.config.as_ref().ok_or(AtomError::ConfigNotInitialized)
    }

    /// Creates the configuration record with defaults.
    pub fn initialize_config(&mut self, authority: Address, registrar: Address) -> Result<RecordAddress> {
        let address = config_address();
        if self.config.is_some() {
            return Err(AtomError::AlreadyInitialized(address));
        }

        self.config = Some(AtomConfig::new(authority, registrar));
        self.events.push(AtomEvent::ConfigInitialized { authority, registrar });
        info!(%address, ?authority, ?registrar, "config initialized");
        Ok(address)
    }

    /// Applies a partial configuration update on behalf of `caller`.
    pub fn update_config(&mut self, caller: Address, update: &ConfigUpdate) -> Result<&AtomConfig> {
        let current = self.config()?;
        guard::require_authority(current, &caller)?;
        let next = update.apply(current)?;

        self.events.push(AtomEvent::ConfigUpdated {
            authority: next.authority,
            version: next.version,
            paused: next.paused,
        });
        info!(version = next.version, paused = next.paused, "config updated");
        Ok(&*self.config.insert(next))
    }

    /// Creates the stats record for `agent` after validating ownership and
    /// collection against `directory`.
    pub fn initialize_stats<D: AssetDirectory + ?Sized>(
        &mut self,
        owner: Address,
        agent: Address,
        claimed_collection: Address,
        directory: &D,
    ) -> Result<RecordAddress> {
        self.config()?;
        guard::validate_asset_binding(directory, &owner, &agent, &claimed_collection)?;

        let address = stats_address(&agent);
        if self.stats.contains_key(&address) {
            return Err(AtomError::AlreadyInitialized(address));
        }

        self.stats.insert(address, AtomStats::new(agent, claimed_collection));
        self.events.push(AtomEvent::StatsInitialized {
            asset: agent,
            collection: claimed_collection,
            stats: address,
        });
        info!(%address, ?agent, "stats initialized");
        Ok(address)
    }

    /// Applies one registrar-forwarded event to `agent`'s record.
    pub fn update_stats(&mut self, caller: Address, agent: Address, event: &StatsEvent) -> Result<&AtomStats> {
        let config = self.config()?;
        guard::require_registrar(config, &caller)?;
        guard::require_active(config)?;

        let address = stats_address(&agent);
        let current = self
            .stats
            .get(&address)
            .ok_or(AtomError::RecordNotFound(address))?;
        let outcome = scoring::apply_event(current, config, event)?;

        let next = outcome.stats;
        self.events.push(AtomEvent::StatsUpdated {
            asset: agent,
            event_index: next.event_count,
            score: event.magnitude.min(MAX_MAGNITUDE) as u8,
            trust_score: next.trust_score,
            trust_tier: next.trust_tier,
            risk_score: next.risk_score,
            quality_score: next.quality_score,
            confidence: next.confidence,
            flags: next.flags.names().into_iter().map(String::from).collect(),
        });
        debug!(%address, repeat = outcome.repeat, ring = ?outcome.ring, "stats committed");

        self.stats.insert(address, next);
        self.stats.get(&address).ok_or(AtomError::RecordNotFound(address))
    }

    /// Removes `agent`'s record. Registrar only; not blocked by pause.
    pub fn revoke_stats(&mut self, caller: Address, agent: Address) -> Result<AtomStats> {
        guard::require_registrar(self.config()?, &caller)?;

        let address = stats_address(&agent);
        let removed = self
            .stats
            .remove(&address)
            .ok_or(AtomError::RecordNotFound(address))?;

        self.events.push(AtomEvent::StatsRevoked {
            asset: agent,
            event_count: removed.event_count,
        });
        info!(%address, ?agent, "stats revoked");
        Ok(removed)
    }

    /// Marks `counterpart`'s resident ring entry on `agent`'s record revoked.
    /// Registrar only; not blocked by pause. Returns `false`, and changes
    /// nothing, when the counterpart has no unrevoked resident entry.
    pub fn revoke_feedback(&mut self, caller: Address, agent: Address, counterpart: Address) -> Result<bool> {
        guard::require_registrar(self.config()?, &caller)?;

        let address = stats_address(&agent);
        let stats = self
            .stats
            .get_mut(&address)
            .ok_or(AtomError::RecordNotFound(address))?;
        let fp56 = ring::fp56(&fingerprint(stats.sketch_salt, &counterpart));
        if !stats.recent.revoke(fp56) {
            debug!(%address, ?counterpart, "no resident entry to revoke");
            return Ok(false);
        }

        self.events.push(AtomEvent::FeedbackRevoked {
            asset: agent,
            counterpart,
        });
        info!(%address, ?counterpart, "feedback revoked");
        Ok(true)
    }

    /// The stats record of `agent`.
    pub fn stats(&self, agent: &Address) -> Result<&AtomStats> {
        let address = stats_address(agent);
        self.stats.get(&address).ok_or(AtomError::RecordNotFound(address))
    }

    /// Looks a record up by its derived address.
    pub fn stats_at(&self, address: &RecordAddress) -> Option<&AtomStats> {
        self.stats.get(address)
    }

    /// Derived scores for `agent` with stagnation evaluated at `now`.
    pub fn trust_snapshot(&self, agent: &Address, now: u64) -> Result<TrustSnapshot> {
        let config = self.config()?;
        Ok(scoring::snapshot(self.stats(agent)?, config, now))
    }

    /// Number of live stats records.
    pub fn agent_count(&self) -> usize {
        self.stats.len()
    }

    /// Iterates over all live records.
    pub fn records(&self) -> impl Iterator<Item = (&RecordAddress, &AtomStats)> {
        self.stats.iter()
    }

    /// Events emitted since the last drain.
    pub fn events(&self) -> &[AtomEvent] {
        &self.events
    }

    /// Drains the emitted events.
    pub fn take_events(&mut self) -> Vec<AtomEvent> {
        std::mem::take(&mut self.events)
    }
}
