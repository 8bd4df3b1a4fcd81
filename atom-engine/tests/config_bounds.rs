//! Integration tests for configuration initialization and updates.

use atom_engine::{config_address, AtomEngine, AtomError, ConfigField, ConfigUpdate};
use ethers_core::types::Address;

fn authority() -> Address {
    "0x1111111111111111111111111111111111111111".parse().unwrap()
}

fn registrar() -> Address {
    "0x2222222222222222222222222222222222222222".parse().unwrap()
}

fn engine() -> AtomEngine {
    let mut engine = AtomEngine::new();
    engine.initialize_config(authority(), registrar()).unwrap();
    engine
}

#[test]
fn test_initialize_config_returns_derived_address() {
    let mut engine = AtomEngine::new();
    let address = engine.initialize_config(authority(), registrar()).unwrap();
    assert_eq!(address, config_address());

    let config = engine.config().unwrap();
    assert_eq!(config.authority, authority());
    assert_eq!(config.registrar, registrar());
    assert!(!config.paused);
}

#[test]
fn test_config_read_before_init() {
    let engine = AtomEngine::new();
    assert_eq!(engine.config().unwrap_err(), AtomError::ConfigNotInitialized);
}

#[test]
fn test_update_rejects_non_authority() {
    let mut engine = engine();
    let err = engine
        .update_config(registrar(), &ConfigUpdate::new().alpha_fast(50))
        .unwrap_err();
    assert_eq!(err, AtomError::Unauthorized);
    assert_eq!(err.code(), 6000);
    assert_eq!(engine.config().unwrap().version, 0);
}

/// Out-of-range alphas and sybil weights are rejected; the boundaries pass.
#[test]
fn test_update_boundary_values() {
    let mut engine = engine();

    for bad in [0u8, 101] {
        let err = engine
            .update_config(authority(), &ConfigUpdate::new().alpha_slow(bad))
            .unwrap_err();
        assert_eq!(err, AtomError::InvalidConfigParameter(ConfigField::AlphaSlow));
    }

    let err = engine
        .update_config(authority(), &ConfigUpdate::new().weight_sybil(51))
        .unwrap_err();
    assert_eq!(err, AtomError::InvalidConfigParameter(ConfigField::WeightSybil));

    let err = engine
        .update_config(authority(), &ConfigUpdate::new().burst_threshold(604_801))
        .unwrap_err();
    assert_eq!(err, AtomError::InvalidConfigParameter(ConfigField::BurstThreshold));

    let err = engine
        .update_config(authority(), &ConfigUpdate::new().shock_threshold(10_001))
        .unwrap_err();
    assert_eq!(err, AtomError::InvalidConfigParameter(ConfigField::ShockThreshold));

    let accepted = ConfigUpdate::new()
        .alpha_fast(1)
        .alpha_slow(100)
        .weight_sybil(50)
        .weight_burst(100)
        .diversity_threshold(100)
        .burst_threshold(604_800)
        .volatility_threshold(10_000);
    let config = engine.update_config(authority(), &accepted).unwrap();
    assert_eq!(config.alpha_fast, 1);
    assert_eq!(config.alpha_slow, 100);
    assert_eq!(config.weight_sybil, 50);
    assert_eq!(config.burst_threshold, 604_800);
    assert_eq!(config.version, 1);
}

#[test]
fn test_invalid_update_is_atomic() {
    let mut engine = engine();
    let before = engine.config().unwrap().clone();

    // First field valid, second invalid: nothing may stick.
    let update = ConfigUpdate::new().alpha_fast(60).weight_sybil(99);
    assert!(engine.update_config(authority(), &update).is_err());
    assert_eq!(engine.config().unwrap(), &before);
}

#[test]
fn test_pause_round_trip_bumps_version() {
    let mut engine = engine();
    engine
        .update_config(authority(), &ConfigUpdate::new().paused(true))
        .unwrap();
    assert!(engine.config().unwrap().paused);

    engine
        .update_config(authority(), &ConfigUpdate::new().paused(false))
        .unwrap();
    let config = engine.config().unwrap();
    assert!(!config.paused);
    assert_eq!(config.version, 2);
}

#[test]
fn test_update_from_json() {
    let mut engine = engine();
    let update: ConfigUpdate = serde_json::from_str(r#"{"alpha_fast": 45, "shock_threshold": 3000}"#).unwrap();
    let config = engine.update_config(authority(), &update).unwrap();
    assert_eq!(config.alpha_fast, 45);
    assert_eq!(config.shock_threshold, 3_000);
    assert_eq!(config.alpha_slow, 5);
}
