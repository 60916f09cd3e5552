//! Centralized tuning constants for threat sizing and drafting.
//!
//! The sizing curve lives here, not in catalog or config assets.

// Sizing ---------------------------------------------------------------------
/// Extra max threat granted per player above the highpop threshold.
pub(crate) const HIGHPOP_THREAT_PER_PLAYER: f32 = 2.0;
/// Divisor applied to max threat while below the lowpop threshold.
pub(crate) const LOWPOP_MAX_THREAT_DIVISOR: f32 = 2.0;
/// Roundstart budget is drawn from `[threat / divisor, threat]`.
pub(crate) const ROUNDSTART_FLOOR_DIVISOR: f32 = 2.5;

// Config defaults --------------------------------------------------------------
pub(crate) const DEFAULT_LOWPOP_THRESHOLD: f32 = 20.0;
pub(crate) const DEFAULT_HIGHPOP_THRESHOLD: f32 = 70.0;
pub(crate) const DEFAULT_MAX_THREAT: f32 = 100.0;
pub(crate) const DEFAULT_ROUNDSTART_POOL: &str = "dynamic_roundstart";
pub(crate) const DEFAULT_MIDROUND_POOL: &str = "dynamic_midround";

// Catalog defaults -------------------------------------------------------------
pub(crate) const DEFAULT_RULESET_WEIGHT: f32 = 1.0;

// Rng domain tags --------------------------------------------------------------
pub(crate) const RNG_DOMAIN_ROUND: &[u8] = b"dynamic-round";

/// Tolerance for float comparisons in tests.
#[cfg(test)]
pub(crate) const FLOAT_EPSILON: f32 = 1e-4;
