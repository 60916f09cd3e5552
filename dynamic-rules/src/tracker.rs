//! Per-round record of executed rulesets and its end-of-round summary.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::RulesetCatalog;

/// Opaque handle returned by the host when it starts a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActivationHandle(pub u64);

/// Notification that the host started a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleActivated {
    pub ruleset_id: String,
    pub handle: ActivationHandle,
}

/// Append-only log of every activation observed by a round instance.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExecutedRulesLog {
    entries: Vec<RuleActivated>,
}

/// Activation count and cumulative threat cost for one display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTally {
    pub name: String,
    pub count: u32,
    pub cost: f32,
}

/// Executed rules grouped by display name, in first-activation order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoundSummary {
    pub rules: Vec<RuleTally>,
}

impl RoundSummary {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RuleTally> {
        self.rules.iter().find(|tally| tally.name == name)
    }

    #[must_use]
    pub fn total_cost(&self) -> f32 {
        self.rules.iter().map(|tally| tally.cost).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl ExecutedRulesLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_activation(&mut self, ruleset_id: impl Into<String>, handle: ActivationHandle) {
        self.entries.push(RuleActivated {
            ruleset_id: ruleset_id.into(),
            handle,
        });
    }

    pub fn record(&mut self, event: &RuleActivated) {
        self.entries.push(event.clone());
    }

    #[must_use]
    pub fn entries(&self) -> &[RuleActivated] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Group the log by display name, charging base cost for the first
    /// activation of a name and scaling cost for each one after.
    ///
    /// Entries the catalog cannot resolve are skipped.
    #[must_use]
    pub fn summarize<C: RulesetCatalog + ?Sized>(&self, catalog: &C) -> RoundSummary {
        let mut summary = RoundSummary::default();
        let mut by_name: HashMap<String, usize> = HashMap::new();

        for entry in &self.entries {
            let Some(def) = catalog.ruleset(&entry.ruleset_id) else {
                log::debug!("summary skips unknown ruleset {}", entry.ruleset_id);
                continue;
            };
            if let Some(&slot) = by_name.get(&def.name) {
                let tally = &mut summary.rules[slot];
                tally.count += 1;
                tally.cost += def.effective_scaling_cost();
            } else {
                by_name.insert(def.name.clone(), summary.rules.len());
                summary.rules.push(RuleTally {
                    name: def.name.clone(),
                    count: 1,
                    cost: def.cost,
                });
            }
        }

        summary
    }
}
