//! Global engine configuration.
//!
//! `AtomConfig` is the single versioned record holding the authority, the
//! trusted registrar, the pause flag, and every tunable coefficient. Changes
//! arrive as a `ConfigUpdate`: a partial field set that is validated as a
//! whole before anything is written.
//!
//! # Example
//!
//! ```rust
//! use atom_engine::{AtomConfig, ConfigUpdate};
//! use ethers_core::types::Address;
//!
//! let config = AtomConfig::new(Address::repeat_byte(1), Address::repeat_byte(2));
//! let next = ConfigUpdate::new().alpha_fast(15).apply(&config).unwrap();
//!
//! assert_eq!(next.alpha_fast, 15);
//! assert_eq!(next.version, config.version + 1);
//! ```

use std::fmt;

use ethers_core::types::Address;
use serde::{Deserialize, Serialize};

use crate::error::{AtomError, Result};
use crate::params::*;

/// Names of the updatable configuration fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigField {
    AlphaFast,
    AlphaSlow,
    AlphaVolatility,
    AlphaArrival,
    WeightSybil,
    WeightBurst,
    WeightStagnation,
    WeightShock,
    WeightVolatility,
    WeightArrival,
    DiversityThreshold,
    BurstThreshold,
    ShockThreshold,
    VolatilityThreshold,
    Paused,
}

impl ConfigField {
    /// Snake-case field name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigField::AlphaFast => "alpha_fast",
            ConfigField::AlphaSlow => "alpha_slow",
            ConfigField::AlphaVolatility => "alpha_volatility",
            ConfigField::AlphaArrival => "alpha_arrival",
            ConfigField::WeightSybil => "weight_sybil",
            ConfigField::WeightBurst => "weight_burst",
            ConfigField::WeightStagnation => "weight_stagnation",
            ConfigField::WeightShock => "weight_shock",
            ConfigField::WeightVolatility => "weight_volatility",
            ConfigField::WeightArrival => "weight_arrival",
            ConfigField::DiversityThreshold => "diversity_threshold",
            ConfigField::BurstThreshold => "burst_threshold",
            ConfigField::ShockThreshold => "shock_threshold",
            ConfigField::VolatilityThreshold => "volatility_threshold",
            ConfigField::Paused => "paused",
        }
    }
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The global engine configuration record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomConfig {
    /// Identity allowed to update this record.
    pub authority: Address,
    /// The only caller allowed to mutate stats records.
    pub registrar: Address,
    /// When set, score updates are rejected.
    pub paused: bool,
    /// Incremented on every successful update.
    pub version: u64,

    pub alpha_fast: u8,
    pub alpha_slow: u8,
    pub alpha_volatility: u8,
    pub alpha_arrival: u8,

    pub weight_sybil: u8,
    pub weight_burst: u8,
    pub weight_stagnation: u8,
    pub weight_shock: u8,
    pub weight_volatility: u8,
    pub weight_arrival: u8,

    /// Minimum distinct-counterpart ratio (percent) before sybil is flagged.
    pub diversity_threshold: u8,
    /// Smoothed inter-arrival floor in seconds.
    pub burst_threshold: u32,
    /// Maximum tolerated gap between fast and slow EMAs.
    pub shock_threshold: u16,
    pub volatility_threshold: u16,
}

impl AtomConfig {
    /// Creates a configuration with documented defaults.
    pub fn new(authority: Address, registrar: Address) -> Self {
        Self {
            authority,
            registrar,
            paused: false,
            version: 0,
            alpha_fast: DEFAULT_ALPHA_FAST,
            alpha_slow: DEFAULT_ALPHA_SLOW,
            alpha_volatility: DEFAULT_ALPHA_VOLATILITY,
            alpha_arrival: DEFAULT_ALPHA_ARRIVAL,
            weight_sybil: DEFAULT_WEIGHT_SYBIL,
            weight_burst: DEFAULT_WEIGHT_BURST,
            weight_stagnation: DEFAULT_WEIGHT_STAGNATION,
            weight_shock: DEFAULT_WEIGHT_SHOCK,
            weight_volatility: DEFAULT_WEIGHT_VOLATILITY,
            weight_arrival: DEFAULT_WEIGHT_ARRIVAL,
            diversity_threshold: DEFAULT_DIVERSITY_THRESHOLD,
            burst_threshold: DEFAULT_BURST_THRESHOLD,
            shock_threshold: DEFAULT_SHOCK_THRESHOLD,
            volatility_threshold: DEFAULT_VOLATILITY_THRESHOLD,
        }
    }

    /// Checks every stored value against the bound table.
    pub fn validate(&self) -> Result<()> {
        check(ConfigField::AlphaFast, self.alpha_fast, ALPHA_MIN, ALPHA_MAX)?;
        check(ConfigField::AlphaSlow, self.alpha_slow, ALPHA_MIN, ALPHA_MAX)?;
        check(ConfigField::AlphaVolatility, self.alpha_volatility, ALPHA_MIN, ALPHA_MAX)?;
        check(ConfigField::AlphaArrival, self.alpha_arrival, ALPHA_MIN, ALPHA_MAX)?;
        check(ConfigField::WeightSybil, self.weight_sybil, 0, WEIGHT_SYBIL_MAX)?;
        check(ConfigField::WeightBurst, self.weight_burst, 0, WEIGHT_MAX)?;
        check(ConfigField::WeightStagnation, self.weight_stagnation, 0, WEIGHT_MAX)?;
        check(ConfigField::WeightShock, self.weight_shock, 0, WEIGHT_MAX)?;
        check(ConfigField::WeightVolatility, self.weight_volatility, 0, WEIGHT_MAX)?;
        check(ConfigField::WeightArrival, self.weight_arrival, 0, WEIGHT_MAX)?;
        check(ConfigField::DiversityThreshold, self.diversity_threshold, 0, DIVERSITY_THRESHOLD_MAX)?;
        check(ConfigField::BurstThreshold, self.burst_threshold, 0, BURST_THRESHOLD_MAX)?;
        check(ConfigField::ShockThreshold, self.shock_threshold, 0, SHOCK_THRESHOLD_MAX)?;
        check(ConfigField::VolatilityThreshold, self.volatility_threshold, 0, VOLATILITY_THRESHOLD_MAX)?;
        Ok(())
    }
}

fn check<T: PartialOrd>(field: ConfigField, value: T, min: T, max: T) -> Result<()> {
    if value < min || value > max {
        return Err(AtomError::InvalidConfigParameter(field));
    }
    Ok(())
}

/// A partial configuration update. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigUpdate {
    pub alpha_fast: Option<u8>,
    pub alpha_slow: Option<u8>,
    pub alpha_volatility: Option<u8>,
    pub alpha_arrival: Option<u8>,
    pub weight_sybil: Option<u8>,
    pub weight_burst: Option<u8>,
    pub weight_stagnation: Option<u8>,
    pub weight_shock: Option<u8>,
    pub weight_volatility: Option<u8>,
    pub weight_arrival: Option<u8>,
    pub diversity_threshold: Option<u8>,
    pub burst_threshold: Option<u32>,
    pub shock_threshold: Option<u16>,
    pub volatility_threshold: Option<u16>,
    pub paused: Option<bool>,
}

macro_rules! setter {
    ($name:ident, $ty:ty) => {
        #[doc = concat!("Sets `", stringify!($name), "`.")]
        pub fn $name(mut self, value: $ty) -> Self {
            self.$name = Some(value);
            self
        }
    };
}

impl ConfigUpdate {
    /// An empty update.
    pub fn new() -> Self {
        Self::default()
    }

    setter!(alpha_fast, u8);
    setter!(alpha_slow, u8);
    setter!(alpha_volatility, u8);
    setter!(alpha_arrival, u8);
    setter!(weight_sybil, u8);
    setter!(weight_burst, u8);
    setter!(weight_stagnation, u8);
    setter!(weight_shock, u8);
    setter!(weight_volatility, u8);
    setter!(weight_arrival, u8);
    setter!(diversity_threshold, u8);
    setter!(burst_threshold, u32);
    setter!(shock_threshold, u16);
    setter!(volatility_threshold, u16);
    setter!(paused, bool);

    /// Returns true when no field is present.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Produces the next configuration, or an error naming the first
    /// out-of-range field. `current` is never modified.
    pub fn apply(&self, current: &AtomConfig) -> Result<AtomConfig> {
        let mut next = current.clone();

        macro_rules! merge {
            ($($field:ident),*) => {
                $(if let Some(v) = self.$field { next.$field = v; })*
            };
        }
        merge!(
            alpha_fast,
            alpha_slow,
            alpha_volatility,
            alpha_arrival,
            weight_sybil,
            weight_burst,
            weight_stagnation,
            weight_shock,
            weight_volatility,
            weight_arrival,
            diversity_threshold,
            burst_threshold,
            shock_threshold,
            volatility_threshold,
            paused
        );

        next.validate()?;
        next.version = current.version.saturating_add(1);
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> AtomConfig {
        AtomConfig::new(Address::repeat_byte(1), Address::repeat_byte(2))
    }

    #[test]
    fn test_defaults_are_in_bounds() {
        let config = base();
        assert!(config.validate().is_ok());
        assert!(!config.paused);
        assert_eq!(config.version, 0);
    }

    #[test]
    fn test_alpha_bounds() {
        let config = base();
        for bad in [0u8, 101] {
            let err = ConfigUpdate::new().alpha_fast(bad).apply(&config).unwrap_err();
            assert_eq!(err, AtomError::InvalidConfigParameter(ConfigField::AlphaFast));
        }
        for good in [1u8, 100] {
            assert_eq!(ConfigUpdate::new().alpha_fast(good).apply(&config).unwrap().alpha_fast, good);
        }
    }

    #[test]
    fn test_weight_sybil_bound() {
        let config = base();
        assert!(ConfigUpdate::new().weight_sybil(51).apply(&config).is_err());
        assert!(ConfigUpdate::new().weight_sybil(50).apply(&config).is_ok());
        assert!(ConfigUpdate::new().weight_sybil(0).apply(&config).is_ok());
    }

    #[test]
    fn test_one_bad_field_rejects_whole_update() {
        let config = base();
        let err = ConfigUpdate::new()
            .alpha_slow(20)
            .shock_threshold(10_001)
            .apply(&config)
            .unwrap_err();
        assert_eq!(err, AtomError::InvalidConfigParameter(ConfigField::ShockThreshold));
        assert_eq!(config, base());
    }

    #[test]
    fn test_unspecified_fields_unchanged() {
        let config = base();
        let next = ConfigUpdate::new().weight_burst(0).apply(&config).unwrap();
        let mut expected = config.clone();
        expected.weight_burst = 0;
        expected.version = 1;
        assert_eq!(next, expected);
    }

    #[test]
    fn test_empty_update_bumps_version() {
        let next = ConfigUpdate::new().apply(&base()).unwrap();
        assert!(ConfigUpdate::new().is_empty());
        assert_eq!(next.version, 1);
    }
}
