//! Budgeted drafting of rulesets from a weighted pool.
//!
//! A drafting pass repeatedly spins the weighted picker over the entries that
//! are still present, charging base cost on a ruleset's first activation and
//! scaling cost on every repeat. Entries are struck in place, never removed,
//! so indices stay stable for the whole pass.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::data::RulesetCandidate;
use crate::numbers::sanitize_budget;
use crate::picker::pick_weighted;

/// Whether a pool entry can still be drawn this pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotState {
    Present,
    Struck,
}

#[derive(Debug, Clone)]
struct PoolSlot {
    candidate: RulesetCandidate,
    state: SlotState,
    picks: u32,
}

impl PoolSlot {
    fn next_charge(&self) -> f32 {
        let raw = if self.picks == 0 {
            self.candidate.cost
        } else {
            self.candidate.scaling_cost
        };
        sanitize_budget(raw)
    }
}

/// Candidates for a single drafting pass.
#[derive(Debug, Clone)]
pub struct DraftPool {
    pool_id: String,
    slots: Vec<PoolSlot>,
}

impl DraftPool {
    /// Wrap candidates as-is; every entry starts present.
    #[must_use]
    pub fn new(pool_id: impl Into<String>, candidates: Vec<RulesetCandidate>) -> Self {
        let slots = candidates
            .into_iter()
            .map(|candidate| PoolSlot {
                candidate,
                state: SlotState::Present,
                picks: 0,
            })
            .collect();
        Self {
            pool_id: pool_id.into(),
            slots,
        }
    }

    /// Build a pool keeping only candidates that could ever be drafted: positive
    /// weight, enough players, and a base cost within `budget`.
    #[must_use]
    pub fn eligible(
        pool_id: impl Into<String>,
        candidates: Vec<RulesetCandidate>,
        player_count: u32,
        budget: f32,
    ) -> Self {
        let pool_id = pool_id.into();
        let total = candidates.len();
        let kept: Vec<RulesetCandidate> = candidates
            .into_iter()
            .filter(|candidate| candidate.eligible_for(player_count) && candidate.cost <= budget)
            .collect();
        log::debug!(
            "pool {pool_id}: {} of {total} candidates eligible for {player_count} players and budget {budget:.2}",
            kept.len()
        );
        Self::new(pool_id, kept)
    }

    #[must_use]
    pub fn pool_id(&self) -> &str {
        &self.pool_id
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn candidate(&self, index: usize) -> Option<&RulesetCandidate> {
        self.slots.get(index).map(|slot| &slot.candidate)
    }

    #[must_use]
    pub fn state(&self, index: usize) -> Option<SlotState> {
        self.slots.get(index).map(|slot| slot.state)
    }

    /// Number of entries that have not been struck.
    #[must_use]
    pub fn present_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.state == SlotState::Present)
            .count()
    }

    /// Mark an entry ineligible for the rest of the pass. Returns `true` if it was present.
    pub fn strike(&mut self, index: usize) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) if slot.state == SlotState::Present => {
                slot.state = SlotState::Struck;
                true
            }
            _ => false,
        }
    }

    fn present_weights(&self) -> Vec<(usize, f32)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.state == SlotState::Present)
            .map(|(idx, slot)| (idx, slot.candidate.weight))
            .collect()
    }

    /// Strike every present high-impact entry except `keep`.
    fn strike_other_high_impact(&mut self, keep: usize) -> usize {
        let mut struck = 0;
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            if idx != keep && slot.state == SlotState::Present && slot.candidate.high_impact {
                slot.state = SlotState::Struck;
                struck += 1;
            }
        }
        struck
    }
}

/// What happened to a candidate the picker landed on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DraftAction {
    Activated { cost: f32 },
    Unaffordable { cost: f32 },
}

/// One spin of the picker during a pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftStep {
    pub candidate_id: String,
    pub roll: f32,
    pub total_weight: f32,
    pub action: DraftAction,
    /// Other high-impact entries struck because of this activation.
    #[serde(default)]
    pub excluded: usize,
}

/// Result of a drafting pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DraftOutcome {
    /// Rulesets to start, in draft order; repeats are expected.
    pub activations: Vec<RulesetCandidate>,
    pub spent: f32,
    pub leftover: f32,
    /// Entries struck during the pass, for any reason.
    pub strikes: usize,
    pub steps: Vec<DraftStep>,
}

impl DraftOutcome {
    /// How many times a ruleset id was activated this pass.
    #[must_use]
    pub fn count_of(&self, id: &str) -> usize {
        self.activations
            .iter()
            .filter(|candidate| candidate.id == id)
            .count()
    }
}

/// Spend `budget` drafting rulesets from `pool`.
///
/// Each iteration either charges a positive cost, or permanently strikes an
/// entry, so the loop ends once the budget is gone or nothing is left present.
pub fn draft<R: Rng + ?Sized>(
    pool: &mut DraftPool,
    budget: f32,
    allow_multiple_high_impact: bool,
    rng: &mut R,
) -> DraftOutcome {
    let mut remaining = sanitize_budget(budget);
    let mut outcome = DraftOutcome::default();

    while remaining > 0.0 {
        let weights = pool.present_weights();
        let Some(chosen) = pick_weighted(&weights, rng) else {
            break;
        };
        let idx = chosen.index;
        let cost = pool.slots[idx].next_charge();
        let candidate_id = pool.slots[idx].candidate.id.clone();

        if cost > remaining {
            pool.strike(idx);
            outcome.strikes += 1;
            log::debug!(
                "pool {}: struck {candidate_id} (cost {cost:.2} > remaining {remaining:.2})",
                pool.pool_id
            );
            outcome.steps.push(DraftStep {
                candidate_id,
                roll: chosen.roll,
                total_weight: chosen.total_weight,
                action: DraftAction::Unaffordable { cost },
                excluded: 0,
            });
            continue;
        }

        remaining -= cost;
        outcome.spent += cost;
        let slot = &mut pool.slots[idx];
        slot.picks += 1;
        outcome.activations.push(slot.candidate.clone());
        let high_impact = slot.candidate.high_impact;
        // A repeat that cannot lower the remaining budget would never end the pass.
        let repeat_cost = sanitize_budget(slot.candidate.scaling_cost);
        let free_repeat = remaining - repeat_cost >= remaining;
        log::debug!(
            "pool {}: drafted {candidate_id} for {cost:.2} ({remaining:.2} left)",
            pool.pool_id
        );

        let mut excluded = 0;
        if high_impact && !allow_multiple_high_impact {
            excluded = pool.strike_other_high_impact(idx);
            outcome.strikes += excluded;
        }
        if free_repeat && pool.strike(idx) {
            outcome.strikes += 1;
        }

        outcome.steps.push(DraftStep {
            candidate_id,
            roll: chosen.roll,
            total_weight: chosen.total_weight,
            action: DraftAction::Activated { cost },
            excluded,
        });
    }

    outcome.leftover = remaining;
    log::info!(
        "pool {}: drafted {} rulesets, spent {:.2}, leftover {:.2}",
        pool.pool_id,
        outcome.activations.len(),
        outcome.spent,
        outcome.leftover
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FLOAT_EPSILON;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn candidate(id: &str, weight: f32, cost: f32, scaling_cost: f32) -> RulesetCandidate {
        RulesetCandidate {
            id: id.to_string(),
            weight,
            cost,
            scaling_cost,
            high_impact: false,
            min_players: 0,
        }
    }

    fn high_impact(id: &str, weight: f32, cost: f32) -> RulesetCandidate {
        RulesetCandidate {
            high_impact: true,
            ..candidate(id, weight, cost, cost)
        }
    }

    #[test]
    fn repeat_picks_charge_scaling_cost() {
        let mut pool = DraftPool::new("test", vec![candidate("x", 1.0, 10.0, 15.0)]);
        let mut rng = ChaCha20Rng::from_seed([0u8; 32]);
        let outcome = draft(&mut pool, 25.0, false, &mut rng);

        assert_eq!(outcome.count_of("x"), 2);
        assert!(outcome.leftover.abs() < FLOAT_EPSILON);
        assert!((outcome.spent - 25.0).abs() < FLOAT_EPSILON);
        assert_eq!(
            outcome.steps[1].action,
            DraftAction::Activated { cost: 15.0 }
        );
    }

    #[test]
    fn empty_pool_keeps_whole_budget() {
        let mut pool = DraftPool::new("test", Vec::new());
        let mut rng = ChaCha20Rng::from_seed([0u8; 32]);
        let outcome = draft(&mut pool, 50.0, false, &mut rng);
        assert!(outcome.activations.is_empty());
        assert!((outcome.leftover - 50.0).abs() < FLOAT_EPSILON);
        assert_eq!(rng.get_word_pos(), 0, "no randomness consumed");
    }

    #[test]
    fn unaffordable_repeat_is_struck_and_budget_kept() {
        let mut pool = DraftPool::new("test", vec![candidate("x", 1.0, 10.0, 30.0)]);
        let mut rng = ChaCha20Rng::from_seed([4u8; 32]);
        let outcome = draft(&mut pool, 25.0, false, &mut rng);

        assert_eq!(outcome.count_of("x"), 1);
        assert!((outcome.leftover - 15.0).abs() < FLOAT_EPSILON);
        assert_eq!(outcome.strikes, 1);
        assert_eq!(pool.state(0), Some(SlotState::Struck));
        assert_eq!(pool.present_count(), 0);
    }

    #[test]
    fn high_impact_excludes_other_high_impact() {
        for seed in 0..32_u8 {
            let mut pool = DraftPool::new(
                "test",
                vec![high_impact("a", 5.0, 10.0), high_impact("b", 5.0, 10.0)],
            );
            let mut rng = ChaCha20Rng::from_seed([seed; 32]);
            let outcome = draft(&mut pool, 100.0, false, &mut rng);

            let a = outcome.count_of("a");
            let b = outcome.count_of("b");
            assert!(a == 0 || b == 0, "seed {seed}: both high-impact drafted");
            assert!(a + b >= 2, "chosen high-impact ruleset stays re-pickable");
        }
    }

    #[test]
    fn unforgiving_allows_multiple_high_impact() {
        let mut pool = DraftPool::new(
            "test",
            vec![high_impact("a", 5.0, 10.0), high_impact("b", 5.0, 10.0)],
        );
        let mut rng = ChaCha20Rng::from_seed([9u8; 32]);
        let outcome = draft(&mut pool, 1_000.0, true, &mut rng);
        assert!(outcome.count_of("a") > 0 && outcome.count_of("b") > 0);
    }

    #[test]
    fn high_impact_does_not_strike_regular_rulesets() {
        let mut pool = DraftPool::new(
            "test",
            vec![high_impact("a", 1.0, 10.0), candidate("c", 1.0, 5.0, 5.0)],
        );
        let mut rng = ChaCha20Rng::from_seed([3u8; 32]);
        let outcome = draft(&mut pool, 65.0, false, &mut rng);
        assert!(outcome.leftover < 5.0 + FLOAT_EPSILON);
        assert!(outcome.count_of("c") > 0);
    }

    #[test]
    fn free_repeats_are_struck_after_one_activation() {
        let mut pool = DraftPool::new(
            "test",
            vec![candidate("free", 1.0, 0.0, 0.0), candidate("paid", 1.0, 4.0, 4.0)],
        );
        let mut rng = ChaCha20Rng::from_seed([6u8; 32]);
        let outcome = draft(&mut pool, 10.0, false, &mut rng);
        assert_eq!(outcome.count_of("free"), 1);
        assert_eq!(outcome.count_of("paid"), 2);
        assert!((outcome.leftover - 2.0).abs() < FLOAT_EPSILON);
    }

    #[test]
    fn zero_budget_drafts_nothing() {
        let mut pool = DraftPool::new("test", vec![candidate("x", 1.0, 0.0, 1.0)]);
        let mut rng = ChaCha20Rng::from_seed([0u8; 32]);
        let outcome = draft(&mut pool, 0.0, false, &mut rng);
        assert!(outcome.activations.is_empty());
        assert!(outcome.leftover.abs() < FLOAT_EPSILON);
    }

    #[test]
    fn eligible_pool_filters_weight_players_and_cost() {
        let mut gated = candidate("gated", 1.0, 1.0, 1.0);
        gated.min_players = 50;
        let pool = DraftPool::eligible(
            "roundstart",
            vec![
                candidate("ok", 1.0, 5.0, 5.0),
                candidate("weightless", 0.0, 1.0, 1.0),
                candidate("pricey", 1.0, 40.0, 40.0),
                gated,
            ],
            30,
            20.0,
        );
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.candidate(0).map(|c| c.id.as_str()), Some("ok"));
        assert_eq!(pool.pool_id(), "roundstart");
    }

    #[test]
    fn strike_is_idempotent() {
        let mut pool = DraftPool::new("test", vec![candidate("x", 1.0, 1.0, 1.0)]);
        assert!(pool.strike(0));
        assert!(!pool.strike(0));
        assert!(!pool.strike(5));
    }
}
