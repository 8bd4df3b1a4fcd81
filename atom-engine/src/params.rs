//! Engine constants: defaults, bounds, and fixed sizes.

/// Percent scale used by smoothing coefficients and weights.
pub const ALPHA_SCALE: u64 = 100;

/// Fixed-point scale for smoothed scores (feedback score x 100).
pub const SCORE_SCALE: u64 = 10_000;

/// Largest accepted feedback magnitude. Larger inputs saturate here.
pub const MAX_MAGNITUDE: u64 = 100;

/// Neutral point of the smoothed score domain.
pub const NEUTRAL_SCORE: u64 = SCORE_SCALE / 2;

/// Upper bound of every normalized signal before weighting.
pub const SIGNAL_MAX: u64 = 100;

// Smoothing coefficients (percent)
pub const ALPHA_MIN: u8 = 1;
pub const ALPHA_MAX: u8 = 100;
pub const DEFAULT_ALPHA_FAST: u8 = 30;
pub const DEFAULT_ALPHA_SLOW: u8 = 5;
pub const DEFAULT_ALPHA_VOLATILITY: u8 = 10;
pub const DEFAULT_ALPHA_ARRIVAL: u8 = 10;

// Signal weights
pub const WEIGHT_SYBIL_MAX: u8 = 50;
pub const WEIGHT_MAX: u8 = 100;
pub const DEFAULT_WEIGHT_SYBIL: u8 = 30;
pub const DEFAULT_WEIGHT_BURST: u8 = 20;
pub const DEFAULT_WEIGHT_STAGNATION: u8 = 10;
pub const DEFAULT_WEIGHT_SHOCK: u8 = 25;
pub const DEFAULT_WEIGHT_VOLATILITY: u8 = 15;
pub const DEFAULT_WEIGHT_ARRIVAL: u8 = 10;

// Thresholds
pub const DIVERSITY_THRESHOLD_MAX: u8 = 100;
pub const BURST_THRESHOLD_MAX: u32 = 604_800;
pub const SHOCK_THRESHOLD_MAX: u16 = 10_000;
pub const VOLATILITY_THRESHOLD_MAX: u16 = 10_000;
pub const DEFAULT_DIVERSITY_THRESHOLD: u8 = 30;
pub const DEFAULT_BURST_THRESHOLD: u32 = 60;
pub const DEFAULT_SHOCK_THRESHOLD: u16 = 2_500;
pub const DEFAULT_VOLATILITY_THRESHOLD: u16 = 2_000;

/// Schema version written into freshly created stats records.
pub const STATS_SCHEMA_VERSION: u8 = 1;

// Diversity sketch
pub const HLL_REGISTERS: usize = 256;
pub const HLL_BYTES: usize = HLL_REGISTERS / 2;
pub const HLL_MAX_RHO: u8 = 15;

/// Events required before the diversity ratio is trusted.
pub const MIN_EVENTS_FOR_DIVERSITY: u64 = 8;

/// Distinct counterparts at which confidence saturates.
pub const CONFIDENCE_SATURATION: u64 = 32;

/// Seconds of history each distinct counterpart beyond the first needs
/// before it counts toward confidence.
pub const MATURITY_SECONDS_PER_COUNTERPART: u64 = 1_800;

// Recent counterpart ring
pub const RING_BUFFER_SIZE: usize = 24;
pub const BYPASS_FP_SIZE: usize = 8;
pub const MRT_MIN_RESIDENCY: u64 = 150;
pub const MRT_MAX_BYPASS: u8 = 16;

// Arrival and stagnation windows (seconds)
pub const ARRIVAL_INTERVAL_CAP: u64 = 31_536_000;
pub const STAGNATION_WINDOW_MULTIPLIER: u64 = 16;
pub const STAGNATION_WINDOW_MIN: u64 = 86_400;
pub const STAGNATION_WINDOW_MAX: u64 = 2_592_000;

// Trust score range
pub const MIN_TRUST: i64 = 0;
pub const MAX_TRUST: i64 = 100;
pub const NEUTRAL_TRUST: i64 = 50;

/// Risk at or above which the trust tier is capped at 1.
pub const RISK_TIER_CAP: u8 = 50;
