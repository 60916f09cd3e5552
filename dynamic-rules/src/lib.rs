//! Dynamic Rules Engine
//!
//! Threat budgeting and weighted ruleset drafting for dynamic game modes.
//! A round sizes a threat pool from its player count, splits it between a
//! roundstart phase and a midround reserve, and spends each phase drafting
//! optional rulesets from a weighted catalog pool.
//!
//! The crate holds no I/O: hosts supply the catalog through [`RulesetCatalog`]
//! and start the drafted rules through [`ActivationSink`].

pub mod budget;
pub mod config;
pub mod constants;
pub mod data;
pub mod draft;
pub mod numbers;
pub mod picker;
pub mod report;
pub mod rng;
pub mod round;
pub mod tracker;

// Re-export commonly used types
pub use budget::{
    ThreatBounds, ThreatBudget, size_budget, size_budget_with_config, threat_bounds,
};
pub use config::{ConfigError, DynamicConfig};
pub use data::{CatalogError, RulesetCandidate, RulesetData, RulesetDef};
pub use draft::{DraftAction, DraftOutcome, DraftPool, DraftStep, SlotState, draft};
pub use picker::{WeightedPick, pick, pick_weighted};
pub use report::{RoundReport, ThreatPoints, ThreatTotals};
pub use rng::{CountingRng, RoundRng};
pub use round::{
    DynamicRound, PassKind, PassResult, RoundError, RoundPhase, broadcast_activation,
};
pub use tracker::{
    ActivationHandle, ExecutedRulesLog, RoundSummary, RuleActivated, RuleTally,
};

/// Read-only access to ruleset definitions.
/// Hosts back this with their own content storage.
pub trait RulesetCatalog {
    /// Candidates listed in a named pool, in catalog order.
    fn pool(&self, pool_id: &str) -> Vec<RulesetCandidate>;

    /// Look up a single definition by id.
    fn ruleset(&self, id: &str) -> Option<&RulesetDef>;
}

/// Host hook that actually starts a drafted rule.
pub trait ActivationSink {
    /// Start a rule, returning its handle, or `None` if the host declined.
    fn start_rule(&mut self, ruleset_id: &str) -> Option<ActivationHandle>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    struct FixtureCatalog {
        defs: Vec<RulesetDef>,
    }

    impl RulesetCatalog for FixtureCatalog {
        fn pool(&self, _pool_id: &str) -> Vec<RulesetCandidate> {
            self.defs.iter().map(RulesetDef::candidate).collect()
        }

        fn ruleset(&self, id: &str) -> Option<&RulesetDef> {
            self.defs.iter().find(|def| def.id == id)
        }
    }

    #[derive(Default)]
    struct MemorySink {
        started: Vec<String>,
    }

    impl ActivationSink for MemorySink {
        fn start_rule(&mut self, ruleset_id: &str) -> Option<ActivationHandle> {
            self.started.push(ruleset_id.to_string());
            Some(ActivationHandle(self.started.len() as u64))
        }
    }

    #[test]
    fn custom_catalog_drives_a_round() {
        let catalog = FixtureCatalog {
            defs: vec![RulesetDef {
                id: String::from("solo"),
                name: String::from("Solo"),
                desc: String::new(),
                weight: 1.0,
                cost: 1.0,
                scaling_cost: Some(1.0),
                high_impact: false,
                min_players: 0,
            }],
        };
        let mut round = DynamicRound::new(DynamicConfig::default()).unwrap();
        let mut sink = MemorySink::default();
        let mut rng = ChaCha20Rng::seed_from_u64(12);

        let result = round.start(50, &catalog, &mut sink, &mut rng).unwrap();
        for event in &result.events {
            round.on_activation(event);
        }

        let summary = round.summarize(&catalog);
        let solo = summary.get("Solo").expect("solo drafted");
        assert_eq!(solo.count as usize, sink.started.len());
        assert!(result.outcome.leftover < 1.0);
    }
}
