//! Saturating integer EWMA helpers.

use crate::params::ALPHA_SCALE;

/// One EWMA step: `(alpha * sample + (100 - alpha) * prev) / 100`.
///
/// `alpha` is clamped to `[1, 100]` and every intermediate saturates, so no
/// input can wrap the accumulator.
#[inline]
pub fn ewma(prev: u64, sample: u64, alpha: u8) -> u64 {
    let alpha = u64::from(alpha).clamp(1, ALPHA_SCALE);
    let weighted_sample = sample.saturating_mul(alpha);
    let weighted_prev = prev.saturating_mul(ALPHA_SCALE - alpha);
    weighted_sample.saturating_add(weighted_prev) / ALPHA_SCALE
}

/// Moves `value` toward `target` by `percent` of the distance.
#[inline]
pub fn pull_toward(value: u64, target: u64, percent: u64) -> u64 {
    let percent = percent.min(100);
    if value >= target {
        value - (value - target).saturating_mul(percent) / 100
    } else {
        value + (target - value).saturating_mul(percent) / 100
    }
}

/// Scales `excess` over `span` into `0..=100`.
#[inline]
pub fn ratio_pct(excess: u64, span: u64) -> u64 {
    excess.saturating_mul(100) / span.max(1)
}
