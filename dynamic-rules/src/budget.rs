//! Threat pool sizing and the roundstart/midround split.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::DynamicConfig;
use crate::constants::{
    HIGHPOP_THREAT_PER_PLAYER, LOWPOP_MAX_THREAT_DIVISOR, ROUNDSTART_FLOOR_DIVISOR,
};
use crate::numbers::{count_to_f32, sanitize_budget};

/// Threat points owned by one round-rule instance.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ThreatBudget {
    pub threat_level: f32,
    pub roundstart_budget: f32,
    /// Midround allocation: the sized share plus any roundstart roll-up.
    pub midround_budget: f32,
    /// Threat already charged by midround passes.
    #[serde(default)]
    pub midround_spent: f32,
}

impl ThreatBudget {
    /// Move budget left over from a drafting pass into the midround reserve.
    pub fn roll_over(&mut self, leftover: f32) {
        self.midround_budget += sanitize_budget(leftover);
    }

    /// Midround allocation not yet charged.
    #[must_use]
    pub fn midround_remaining(&self) -> f32 {
        sanitize_budget(self.midround_budget - self.midround_spent)
    }

    /// Charge a midround pass against the allocation.
    pub fn spend_midround(&mut self, spent: f32) {
        self.midround_spent += sanitize_budget(spent);
    }
}

/// Inclusive bounds the threat level is drawn from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThreatBounds {
    pub min: f32,
    pub max: f32,
}

impl ThreatBounds {
    /// Bounds are degenerate when the ceiling falls below the floor.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.max < self.min
    }
}

/// Compute the threat range for a player count.
///
/// Every player above `lowpop` raises the floor by one point. Below `lowpop`
/// the ceiling is halved; at or above `highpop` each extra player adds
/// [`HIGHPOP_THREAT_PER_PLAYER`] to it.
#[must_use]
pub fn threat_bounds(
    player_count: u32,
    lowpop_threshold: f32,
    highpop_threshold: f32,
    configured_max_threat: f32,
) -> ThreatBounds {
    let players = count_to_f32(player_count);
    let min = (players - lowpop_threshold).max(0.0);
    let mut max = if players < lowpop_threshold {
        configured_max_threat / LOWPOP_MAX_THREAT_DIVISOR
    } else {
        configured_max_threat
    };
    if players >= highpop_threshold {
        max += (players - highpop_threshold) * HIGHPOP_THREAT_PER_PLAYER;
    }
    ThreatBounds { min, max }
}

/// Size a round's threat pool and split it between roundstart and midround.
pub fn size_budget<R: Rng + ?Sized>(
    player_count: u32,
    lowpop_threshold: f32,
    highpop_threshold: f32,
    configured_max_threat: f32,
    rng: &mut R,
) -> ThreatBudget {
    let bounds = threat_bounds(
        player_count,
        lowpop_threshold,
        highpop_threshold,
        configured_max_threat,
    );
    if bounds.is_degenerate() {
        log::debug!(
            "threat range collapsed to {:.2} (ceiling {:.2})",
            bounds.min,
            bounds.max
        );
    }

    let threat_level = sanitize_budget(draw_between(bounds.min, bounds.max, rng));
    // Front-load: roundstart gets at least 40% of the pool.
    let roundstart_budget = sanitize_budget(draw_between(
        threat_level / ROUNDSTART_FLOOR_DIVISOR,
        threat_level,
        rng,
    ))
    .min(threat_level);
    let midround_budget = sanitize_budget(threat_level - roundstart_budget);

    log::info!(
        "sized threat for {player_count} players: {threat_level:.2} (roundstart {roundstart_budget:.2}, midround {midround_budget:.2})"
    );

    ThreatBudget {
        threat_level,
        roundstart_budget,
        midround_budget,
        midround_spent: 0.0,
    }
}

/// Size a budget using the thresholds carried by a [`DynamicConfig`].
pub fn size_budget_with_config<R: Rng + ?Sized>(
    player_count: u32,
    cfg: &DynamicConfig,
    rng: &mut R,
) -> ThreatBudget {
    size_budget(
        player_count,
        cfg.lowpop_threshold,
        cfg.highpop_threshold,
        cfg.max_threat,
        rng,
    )
}

/// Uniform draw from `[min, max]`; collapses to `min` when `max <= min`.
/// Non-finite or negative bounds are read as zero.
fn draw_between<R: Rng + ?Sized>(min: f32, max: f32, rng: &mut R) -> f32 {
    let min = sanitize_budget(min);
    let max = sanitize_budget(max);
    if max <= min {
        return min;
    }
    let value = min + rng.r#gen::<f32>() * (max - min);
    value.clamp(min, max)
}
