//! Score updater.
//!
//! `apply_event` is a pure function from (record, config, event) to the next
//! record. It never touches storage; the host commits the returned record only
//! after every guard passed, so a rejected call changes nothing.
//!
//! One update runs these steps, all in saturating integer arithmetic:
//!
//! 1. Stagnation: a gap longer than the decay window pulls score EWMAs that
//!    sit above neutral down toward it before the new sample lands. Averages
//!    at or below neutral are left alone, so idling never lifts a score.
//! 2. Arrival: EWMA of inter-arrival time; a smoothed interval under
//!    `burst_threshold` raises `burst`.
//! 3. Shock: fast and slow score EWMAs; a gap above `shock_threshold` raises
//!    `shock`.
//! 4. Volatility: EWMA of absolute score deltas.
//! 5. Diversity: salted counterpart fingerprint into the sketch; a low
//!    distinct/volume ratio raises `sybil`, and so do distinct counterparts
//!    arriving faster than the history span can vouch for.
//! 6. Combination into quality, confidence, risk, trust and tier.
//!
//! A counterpart still resident in the recent ring is a repeat: volume and
//! arrival advance, but the score averages do not move again.
//!
//! # Example
//!
//! ```rust
//! use atom_engine::{AtomConfig, AtomStats, StatsEvent};
//! use atom_engine::scoring::apply_event;
//! use ethers_core::types::Address;
//!
//! let config = AtomConfig::new(Address::repeat_byte(1), Address::repeat_byte(2));
//! let stats = AtomStats::new(Address::repeat_byte(3), Address::repeat_byte(4));
//! let event = StatsEvent::new(Address::repeat_byte(5), 80, 1_700_000_000);
//!
//! let outcome = apply_event(&stats, &config, &event).unwrap();
//! assert_eq!(outcome.stats.event_count, 1);
//! assert_eq!(outcome.stats.quality_score, 8_000);
//! ```

use ethers_core::types::Address;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AtomConfig;
use crate::error::{AtomError, Result};
use crate::ewma::{ewma, pull_toward, ratio_pct};
use crate::params::*;
use crate::ring::{self, PushOutcome};
use crate::sketch::fingerprint;
use crate::stats::{AnomalyFlags, AtomStats, Signals};

/// An interaction forwarded by the registrar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsEvent {
    /// The other party to the interaction.
    pub counterpart: Address,
    /// Feedback score on a 0..=100 scale. Larger values saturate at 100.
    pub magnitude: u64,
    /// Unix timestamp (seconds).
    pub timestamp: u64,
}

impl StatsEvent {
    pub fn new(counterpart: Address, magnitude: u64, timestamp: u64) -> Self {
        Self {
            counterpart,
            magnitude,
            timestamp,
        }
    }

    /// Magnitude clamped to the score range and scaled to fixed point.
    pub fn normalized_magnitude(&self) -> u64 {
        self.magnitude.min(MAX_MAGNITUDE) * (SCORE_SCALE / MAX_MAGNITUDE)
    }
}

/// Derived scores for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub quality_score: u16,
    pub confidence: u16,
    pub risk_score: u8,
    pub trust_score: u8,
    pub trust_tier: u8,
}

/// Result of applying one event.
#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    pub stats: AtomStats,
    pub signals: Signals,
    pub repeat: bool,
    /// Ring outcome; `None` for repeats, which are already resident.
    pub ring: Option<PushOutcome>,
}

/// Read-only view of a record at a given time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustSnapshot {
    pub asset: Address,
    pub as_of: u64,
    pub scores: ScoreBreakdown,
    pub signals: Signals,
    pub flags: AnomalyFlags,
    pub event_count: u64,
    pub distinct_counterparts: u64,
}

/// Decay window derived from the smoothed arrival interval.
pub fn stagnation_window(ema_arrival: u32) -> u64 {
    u64::from(ema_arrival)
        .saturating_mul(STAGNATION_WINDOW_MULTIPLIER)
        .clamp(STAGNATION_WINDOW_MIN, STAGNATION_WINDOW_MAX)
}

/// Stagnation signal for an idle gap, `0..=100`.
pub fn stagnation_for_gap(ema_arrival: u32, gap: u64) -> u64 {
    let window = stagnation_window(ema_arrival);
    if gap > window {
        ratio_pct(gap - window, window).min(SIGNAL_MAX)
    } else {
        0
    }
}

/// Stagnation decay: values above neutral move down toward it; values at or
/// below neutral stay put.
pub fn decay_toward_neutral(value: u64, stagnation: u64) -> u64 {
    if value > NEUTRAL_SCORE {
        pull_toward(value, NEUTRAL_SCORE, stagnation)
    } else {
        value
    }
}

/// Distinct counterparts a history spanning `first..=last` can vouch for.
pub fn matured_counterparts(first: u64, last: u64) -> u64 {
    1 + last.saturating_sub(first) / MATURITY_SECONDS_PER_COUNTERPART
}

/// Signal for an accumulator above its threshold within a `0..=10_000` domain.
fn excess_signal(value: u64, threshold: u64) -> u64 {
    if value > threshold {
        ratio_pct(value - threshold, SCORE_SCALE.saturating_sub(threshold)).min(SIGNAL_MAX)
    } else {
        0
    }
}

/// Signal for an accumulator below its floor.
fn shortfall_signal(value: u64, floor: u64) -> u64 {
    if value < floor {
        ratio_pct(floor - value, floor).min(SIGNAL_MAX)
    } else {
        0
    }
}

fn to_u8(v: u64) -> u8 {
    v.min(u64::from(u8::MAX)) as u8
}

fn to_u16(v: u64) -> u16 {
    v.min(u64::from(u16::MAX)) as u16
}

/// Applies one event to `current`, returning the next record.
pub fn apply_event(current: &AtomStats, config: &AtomConfig, event: &StatsEvent) -> Result<UpdateOutcome> {
    let mut next = current.clone();
    let mut flags = AnomalyFlags::empty();
    let mut signals = Signals::default();

    let had_events = current.has_events();
    let event_count = current
        .event_count
        .checked_add(1)
        .ok_or(AtomError::ArithmeticOverflow)?;
    let magnitude = event.normalized_magnitude();
    let gap = if had_events {
        event.timestamp.saturating_sub(current.last_event_timestamp)
    } else {
        0
    };

    // Stagnation decay, downward only.
    let mut fast = u64::from(current.ema_fast);
    let mut slow = u64::from(current.ema_slow);
    if had_events {
        let stagnation = stagnation_for_gap(current.ema_arrival, gap);
        if stagnation > 0 {
            fast = decay_toward_neutral(fast, stagnation);
            slow = decay_toward_neutral(slow, stagnation);
            flags.set(AnomalyFlags::STAGNATION, true);
        }
        signals.stagnation = to_u8(stagnation);
    }

    // Arrival rate.
    let interval = gap.min(ARRIVAL_INTERVAL_CAP);
    let prev_arrival = u64::from(current.ema_arrival);
    if had_events {
        let smoothed = if current.event_count == 1 {
            interval
        } else {
            if interval < prev_arrival {
                signals.arrival = to_u8(shortfall_signal(interval, prev_arrival));
            }
            ewma(prev_arrival, interval, config.alpha_arrival)
        };
        next.ema_arrival = smoothed.min(u64::from(u32::MAX)) as u32;

        let burst = shortfall_signal(u64::from(next.ema_arrival), u64::from(config.burst_threshold));
        signals.burst = to_u8(burst);
        flags.set(AnomalyFlags::BURST, burst > 0);
    }

    // Repeat detection against the recent ring.
    let hash = fingerprint(current.sketch_salt, &event.counterpart);
    let fp56 = ring::fp56(&hash);
    let repeat = current.recent.contains(fp56);
    let ring_outcome = if repeat {
        next.repeat_count = next.repeat_count.saturating_add(1);
        flags.set(AnomalyFlags::REPEAT, true);
        None
    } else {
        let score = (magnitude / (SCORE_SCALE / MAX_MAGNITUDE)) as u8;
        Some(next.recent.push(fp56, score, event.timestamp))
    };

    // Dual-timescale score averages and volatility.
    if !repeat {
        if had_events {
            fast = ewma(fast, magnitude, config.alpha_fast);
            slow = ewma(slow, magnitude, config.alpha_slow);
            let delta = magnitude.abs_diff(u64::from(current.last_magnitude));
            let volatility = ewma(u64::from(current.ema_volatility), delta, config.alpha_volatility);
            next.ema_volatility = to_u16(volatility.min(SCORE_SCALE));
        } else {
            fast = magnitude;
            slow = magnitude;
        }
        next.last_magnitude = to_u16(magnitude);
    }
    next.ema_fast = to_u16(fast.min(SCORE_SCALE));
    next.ema_slow = to_u16(slow.min(SCORE_SCALE));

    let shock = excess_signal(
        u64::from(next.ema_fast).abs_diff(u64::from(next.ema_slow)),
        u64::from(config.shock_threshold),
    );
    signals.shock = to_u8(shock);
    flags.set(AnomalyFlags::SHOCK, shock > 0);

    let volatility = excess_signal(u64::from(next.ema_volatility), u64::from(config.volatility_threshold));
    signals.volatility = to_u8(volatility);
    flags.set(AnomalyFlags::VOLATILITY, volatility > 0);

    if !had_events {
        next.first_event_timestamp = event.timestamp;
    }
    next.last_event_timestamp = current.last_event_timestamp.max(event.timestamp);

    // Diversity against volume and against history span.
    next.sketch.insert_hash(&hash);
    next.event_count = event_count;
    let distinct = next.sketch.estimate();
    if event_count >= MIN_EVENTS_FOR_DIVERSITY {
        let ratio = ratio_pct(distinct, event_count).min(100);
        let concentration = shortfall_signal(ratio, u64::from(config.diversity_threshold));
        let matured = matured_counterparts(next.first_event_timestamp, next.last_event_timestamp);
        let unvouched = if distinct > matured {
            ratio_pct(distinct - matured, distinct).min(SIGNAL_MAX)
        } else {
            0
        };
        let sybil = concentration.max(unvouched);
        signals.sybil = to_u8(sybil);
        flags.set(AnomalyFlags::SYBIL, sybil > 0);
    }

    let scores = combine(&next, config, &signals);
    next.quality_score = scores.quality_score;
    next.confidence = scores.confidence;
    next.risk_score = scores.risk_score;
    next.trust_score = scores.trust_score;
    next.trust_tier = scores.trust_tier;
    next.flags = flags;
    next.signals = signals;

    debug!(
        asset = ?next.asset,
        events = next.event_count,
        trust = next.trust_score,
        risk = next.risk_score,
        flags = ?flags.names(),
        "applied stats event"
    );

    Ok(UpdateOutcome {
        stats: next,
        signals,
        repeat,
        ring: ring_outcome,
    })
}

/// Combines accumulators and signals into the derived scores.
pub fn combine(stats: &AtomStats, config: &AtomConfig, signals: &Signals) -> ScoreBreakdown {
    let quality = (u64::from(stats.ema_fast) + 3 * u64::from(stats.ema_slow)) / 4;

    let distinct = stats
        .sketch
        .estimate()
        .min(matured_counterparts(stats.first_event_timestamp, stats.last_event_timestamp));
    let confidence = (distinct.saturating_mul(SCORE_SCALE) / CONFIDENCE_SATURATION).min(SCORE_SCALE);
    let damping = u64::from(config.weight_sybil) * u64::from(signals.sybil) / 100;
    let confidence = confidence * (100 - damping.min(100)) / 100;

    let quality_pct = (quality / 100) as i64;
    let baseline = NEUTRAL_TRUST + (quality_pct - NEUTRAL_TRUST) * confidence as i64 / SCORE_SCALE as i64;

    let weighted = [
        (config.weight_sybil, signals.sybil),
        (config.weight_burst, signals.burst),
        (config.weight_stagnation, signals.stagnation),
        (config.weight_shock, signals.shock),
        (config.weight_volatility, signals.volatility),
        (config.weight_arrival, signals.arrival),
    ]
    .iter()
    .fold(0u64, |acc, (w, s)| {
        acc.saturating_add(u64::from(*w) * u64::from((*s).min(SIGNAL_MAX as u8)))
    });
    let risk = (weighted / 100).min(100);

    let trust = (baseline - risk as i64).clamp(MIN_TRUST, MAX_TRUST) as u8;
    let risk = risk as u8;
    let tier = trust_tier(trust, confidence as u16, risk);

    ScoreBreakdown {
        quality_score: to_u16(quality),
        confidence: to_u16(confidence),
        risk_score: risk,
        trust_score: trust,
        trust_tier: tier,
    }
}

/// Maps trust and confidence to a 0..=4 tier. High risk caps the tier at 1.
pub fn trust_tier(trust: u8, confidence: u16, risk: u8) -> u8 {
    let tier = if trust >= 85 && confidence >= 7_000 {
        4
    } else if trust >= 70 && confidence >= 5_000 {
        3
    } else if trust >= 55 && confidence >= 2_500 {
        2
    } else if trust >= 40 {
        1
    } else {
        0
    };
    if risk >= RISK_TIER_CAP {
        tier.min(1)
    } else {
        tier
    }
}

/// Recomputes derived scores with stagnation evaluated at `now`.
pub fn snapshot(stats: &AtomStats, config: &AtomConfig, now: u64) -> TrustSnapshot {
    let mut view = stats.clone();
    let mut signals = stats.signals;
    let mut flags = stats.flags;

    if stats.has_events() {
        let gap = now.saturating_sub(stats.last_event_timestamp);
        let stagnation = stagnation_for_gap(stats.ema_arrival, gap);
        view.ema_fast = to_u16(decay_toward_neutral(u64::from(view.ema_fast), stagnation));
        view.ema_slow = to_u16(decay_toward_neutral(u64::from(view.ema_slow), stagnation));
        signals.stagnation = to_u8(stagnation);
        flags.set(AnomalyFlags::STAGNATION, stagnation > 0);
    }

    let scores = if stats.has_events() {
        combine(&view, config, &signals)
    } else {
        ScoreBreakdown {
            quality_score: 0,
            confidence: 0,
            risk_score: 0,
            trust_score: 0,
            trust_tier: 0,
        }
    };

    TrustSnapshot {
        asset: stats.asset,
        as_of: now,
        scores,
        signals,
        flags,
        event_count: stats.event_count,
        distinct_counterparts: stats.sketch.estimate(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: u64 = 1_700_000_000;

    fn config() -> AtomConfig {
        AtomConfig::new(Address::repeat_byte(1), Address::repeat_byte(2))
    }

    fn fresh() -> AtomStats {
        AtomStats::new(Address::repeat_byte(3), Address::repeat_byte(4))
    }

    fn counterpart(i: u64) -> Address {
        Address::from_low_u64_be(0x1000 + i)
    }

    fn feed(stats: AtomStats, config: &AtomConfig, events: &[StatsEvent]) -> AtomStats {
        events.iter().fold(stats, |s, e| apply_event(&s, config, e).unwrap().stats)
    }

    #[test]
    fn test_first_event_seeds_averages() {
        let outcome = apply_event(&fresh(), &config(), &StatsEvent::new(counterpart(0), 70, T0)).unwrap();
        let stats = outcome.stats;
        assert_eq!(stats.ema_fast, 7_000);
        assert_eq!(stats.ema_slow, 7_000);
        assert_eq!(stats.ema_arrival, 0);
        assert_eq!(stats.first_event_timestamp, T0);
        assert!(!stats.flags.contains(AnomalyFlags::BURST));
        assert!(!outcome.repeat);
    }

    #[test]
    fn test_second_event_seeds_arrival() {
        let cfg = config();
        let stats = feed(
            fresh(),
            &cfg,
            &[
                StatsEvent::new(counterpart(0), 70, T0),
                StatsEvent::new(counterpart(1), 70, T0 + 600),
            ],
        );
        assert_eq!(stats.ema_arrival, 600);
        assert!(!stats.flags.contains(AnomalyFlags::BURST));
    }

    #[test]
    fn test_rapid_events_flag_burst() {
        let cfg = config();
        let events: Vec<_> = (0..6).map(|i| StatsEvent::new(counterpart(i), 90, T0 + i * 2)).collect();
        let stats = feed(fresh(), &cfg, &events);
        assert!(stats.flags.contains(AnomalyFlags::BURST));
        assert!(stats.signals.burst > 90);
    }

    #[test]
    fn test_sudden_drop_flags_shock() {
        let mut cfg = config();
        cfg.alpha_fast = 100;
        let mut events: Vec<_> = (0..5).map(|i| StatsEvent::new(counterpart(i), 100, T0 + i * 3_600)).collect();
        events.push(StatsEvent::new(counterpart(99), 0, T0 + 5 * 3_600));
        let stats = feed(fresh(), &cfg, &events);
        assert!(stats.flags.contains(AnomalyFlags::SHOCK));
        assert!(stats.signals.shock > 0);
    }

    #[test]
    fn test_repeat_counterpart_does_not_move_quality() {
        let cfg = config();
        let first = feed(fresh(), &cfg, &[StatsEvent::new(counterpart(0), 40, T0)]);
        let outcome = apply_event(&first, &cfg, &StatsEvent::new(counterpart(0), 100, T0 + 3_600)).unwrap();
        assert!(outcome.repeat);
        assert_eq!(outcome.stats.ema_fast, first.ema_fast);
        assert_eq!(outcome.stats.event_count, 2);
        assert_eq!(outcome.stats.repeat_count, 1);
        assert!(outcome.stats.flags.contains(AnomalyFlags::REPEAT));
    }

    #[test]
    fn test_stagnation_window_bounds() {
        assert_eq!(stagnation_window(0), STAGNATION_WINDOW_MIN);
        assert_eq!(stagnation_window(u32::MAX), STAGNATION_WINDOW_MAX);
        assert_eq!(stagnation_window(10_000), 160_000);
        assert_eq!(stagnation_for_gap(0, STAGNATION_WINDOW_MIN), 0);
        assert_eq!(stagnation_for_gap(0, STAGNATION_WINDOW_MIN * 3), 100);
    }

    #[test]
    fn test_snapshot_applies_lazy_stagnation() {
        let cfg = config();
        let events: Vec<_> = (0..10).map(|i| StatsEvent::new(counterpart(i), 95, T0 + i * 3_600)).collect();
        let stats = feed(fresh(), &cfg, &events);

        let fresh_view = snapshot(&stats, &cfg, stats.last_event_timestamp);
        assert_eq!(fresh_view.signals.stagnation, 0);
        assert_eq!(fresh_view.scores.trust_score, stats.trust_score);

        let idle = snapshot(&stats, &cfg, stats.last_event_timestamp + 90 * 86_400);
        assert!(idle.flags.contains(AnomalyFlags::STAGNATION));
        assert!(idle.scores.trust_score < fresh_view.scores.trust_score);
        // The stored record is untouched by reads.
        assert_eq!(stats.trust_score, fresh_view.scores.trust_score);
    }

    #[test]
    fn test_stagnation_decay_only_lowers() {
        assert_eq!(decay_toward_neutral(9_000, 50), 7_000);
        assert_eq!(decay_toward_neutral(500, 100), 500);
        assert_eq!(decay_toward_neutral(NEUTRAL_SCORE, 100), NEUTRAL_SCORE);
    }

    #[test]
    fn test_idle_gap_keeps_low_averages() {
        let cfg = config();
        let events: Vec<_> = (0..12).map(|i| StatsEvent::new(counterpart(i), 5, T0 + i * 3_600)).collect();
        let stats = feed(fresh(), &cfg, &events);
        assert_eq!(stats.ema_slow, 500);

        let resumed = apply_event(&stats, &cfg, &StatsEvent::new(counterpart(50), 5, T0 + 30 * 86_400)).unwrap();
        assert!(resumed.stats.flags.contains(AnomalyFlags::STAGNATION));
        assert_eq!(resumed.stats.ema_fast, 500);
        assert_eq!(resumed.stats.ema_slow, 500);
        assert!(resumed.stats.trust_score <= stats.trust_score);
    }

    #[test]
    fn test_matured_counterparts_grow_with_span() {
        assert_eq!(matured_counterparts(T0, T0), 1);
        assert_eq!(matured_counterparts(T0, T0 + 3_599), 2);
        assert_eq!(matured_counterparts(T0, T0 + 19 * 3_600), 39);
        assert_eq!(matured_counterparts(u64::MAX, 0), 1);
    }

    #[test]
    fn test_unvouched_diversity_is_capped() {
        let cfg = config();
        let events: Vec<_> = (0..10).map(|i| StatsEvent::new(counterpart(i), 100, T0 + i * 120)).collect();
        let stats = feed(fresh(), &cfg, &events);

        assert!(!stats.flags.contains(AnomalyFlags::BURST));
        assert!(stats.flags.contains(AnomalyFlags::SYBIL));
        assert!(stats.signals.sybil >= 80);
        assert!(u64::from(stats.confidence) <= SCORE_SCALE / CONFIDENCE_SATURATION);
        assert!(stats.trust_score < 50, "trust was {}", stats.trust_score);
    }

    #[test]
    fn test_quickening_arrivals_raise_arrival_signal() {
        let mut events: Vec<_> = (0..5).map(|i| StatsEvent::new(counterpart(i), 70, T0 + i * 3_600)).collect();
        events.push(StatsEvent::new(counterpart(5), 70, T0 + 4 * 3_600 + 600));

        let cfg = config();
        let stats = feed(fresh(), &cfg, &events);
        assert_eq!(stats.signals.arrival, 83);
        assert_eq!(stats.signals.burst, 0);
        assert_eq!(stats.risk_score, 8);

        let mut heavy = config();
        heavy.weight_arrival = 100;
        let weighted = feed(fresh(), &heavy, &events);
        assert_eq!(weighted.risk_score, 83);
        assert!(weighted.trust_score < stats.trust_score);
    }

    #[test]
    fn test_alternating_scores_flag_volatility() {
        let cfg = config();
        let events: Vec<_> = (0..8)
            .map(|i| StatsEvent::new(counterpart(i), if i % 2 == 0 { 100 } else { 0 }, T0 + i * 3_600))
            .collect();
        let stats = feed(fresh(), &cfg, &events);

        assert!(stats.ema_volatility > cfg.volatility_threshold);
        assert!(stats.flags.contains(AnomalyFlags::VOLATILITY));
        assert!(stats.signals.volatility > 0);
    }

    #[test]
    fn test_trust_tier_caps_on_risk() {
        assert_eq!(trust_tier(95, 9_000, 0), 4);
        assert_eq!(trust_tier(95, 9_000, 60), 1);
        assert_eq!(trust_tier(30, 9_000, 0), 0);
        assert_eq!(trust_tier(60, 1_000, 0), 1);
    }

    #[test]
    fn test_magnitude_saturates() {
        assert_eq!(StatsEvent::new(counterpart(0), u64::MAX, 0).normalized_magnitude(), SCORE_SCALE);
        assert_eq!(StatsEvent::new(counterpart(0), 55, 0).normalized_magnitude(), 5_500);
    }
}
