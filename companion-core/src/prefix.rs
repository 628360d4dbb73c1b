//! Empathetic response prefixes chosen from the sentiment score.

/// Prefix for strongly negative messages.
pub const STRUGGLING_PREFIX: &str = "I can hear how much you're struggling right now. ";

/// Prefix for mildly negative messages.
pub const HEAVY_PREFIX: &str = "It sounds like things are a bit heavy lately. ";

/// Scores strictly below this get [`STRUGGLING_PREFIX`].
pub const STRUGGLING_THRESHOLD: f64 = -0.6;

/// Scores strictly below this (and not struggling) get [`HEAVY_PREFIX`].
pub const HEAVY_THRESHOLD: f64 = 0.0;

/// Pick the prefix for a polarity score. Both comparisons are strict.
pub fn select_prefix(score: f64) -> &'static str {
    if score < STRUGGLING_THRESHOLD {
        STRUGGLING_PREFIX
    } else if score < HEAVY_THRESHOLD {
        HEAVY_PREFIX
    } else {
        ""
    }
}
