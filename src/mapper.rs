//! Value-to-index mapping
//!
//! Pure functions turning a metric reading into a palette index. Every
//! function here returns an index in `[0, palette_len - 1]` (or `0` for an
//! empty palette) and never fails: degenerate domains and unknown states
//! resolve to [`FALLBACK_INDEX`].

use std::collections::BTreeMap;

/// Index used for degenerate domains and unrecognized states
pub const FALLBACK_INDEX: usize = 0;

/// Map a continuous reading onto `palette_len` linear buckets.
///
/// The value is clamped into `[min, max]` and normalized to `t ∈ [0, 1]`;
/// the index is `floor(t * (palette_len - 1))`, so index 0 is reached at
/// `min` and the top index only at `max`. A domain with `max <= min` (or
/// non-finite bounds) maps everything to `0`. NaN clamps to `min`.
///
/// ```
/// use sonify::mapper::map_continuous;
///
/// assert_eq!(map_continuous(50.0, 8, 0.0, 100.0), 3);
/// assert_eq!(map_continuous(110.0, 8, 0.0, 100.0), 7);
/// ```
pub fn map_continuous(value: f64, palette_len: usize, min: f64, max: f64) -> usize {
    if palette_len == 0 || !min.is_finite() || !max.is_finite() || max <= min {
        return FALLBACK_INDEX;
    }

    // f64::max/min return the non-NaN operand, so NaN lands on `min`
    let clamped = value.max(min).min(max);
    let span = max - min;
    let normalized = if span.is_finite() {
        (clamped - min) / span
    } else {
        // span overflows f64; halving both sides keeps the ratio
        (clamped / 2.0 - min / 2.0) / (max / 2.0 - min / 2.0)
    };
    let index = (normalized * (palette_len - 1) as f64).floor() as usize;

    index.min(palette_len - 1)
}

/// Look up a categorical state; unknown states map to [`FALLBACK_INDEX`].
pub fn map_categorical(state: &str, states: &BTreeMap<String, usize>) -> usize {
    states.get(state).copied().unwrap_or(FALLBACK_INDEX)
}

/// Interpret a reading that already is a palette index.
///
/// Categorical samplers resolve their state before handing the value over,
/// so the value is floored and clamped rather than normalized. Negative and
/// non-finite values map to [`FALLBACK_INDEX`].
pub fn map_preresolved(value: f64, palette_len: usize) -> usize {
    if palette_len == 0 || !value.is_finite() || value < 0.0 {
        return FALLBACK_INDEX;
    }
    (value.floor() as usize).min(palette_len - 1)
}
