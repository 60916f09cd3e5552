//! Ruleset catalog: definitions, named pools, and JSON loading.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::RulesetCatalog;
use crate::constants::DEFAULT_RULESET_WEIGHT;

const DEFAULT_RULESETS_DATA: &str = include_str!("../assets/rulesets.json");

const fn default_weight() -> f32 {
    DEFAULT_RULESET_WEIGHT
}

/// Errors raised while loading a ruleset catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("ruleset catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("ruleset `{id}` is defined more than once")]
    DuplicateRuleset { id: String },
}

/// A ruleset definition as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesetDef {
    pub id: String,
    /// Display-name key used when summarizing executed rules.
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default = "default_weight")]
    pub weight: f32,
    #[serde(default)]
    pub cost: f32,
    /// Cost charged for every activation after the first; falls back to `cost`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaling_cost: Option<f32>,
    #[serde(default)]
    pub high_impact: bool,
    #[serde(default)]
    pub min_players: u32,
}

impl RulesetDef {
    #[must_use]
    pub fn effective_scaling_cost(&self) -> f32 {
        self.scaling_cost.unwrap_or(self.cost)
    }

    /// Read-only drafting view of this definition.
    #[must_use]
    pub fn candidate(&self) -> RulesetCandidate {
        RulesetCandidate {
            id: self.id.clone(),
            weight: self.weight,
            cost: self.cost,
            scaling_cost: self.effective_scaling_cost(),
            high_impact: self.high_impact,
            min_players: self.min_players,
        }
    }
}

/// Drafting view of a catalog entry, rebuilt for every drafting pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesetCandidate {
    pub id: String,
    pub weight: f32,
    pub cost: f32,
    pub scaling_cost: f32,
    pub high_impact: bool,
    pub min_players: u32,
}

impl RulesetCandidate {
    /// Whether this candidate may enter a pool for the given player count.
    #[must_use]
    pub fn eligible_for(&self, player_count: u32) -> bool {
        self.weight > 0.0 && self.min_players <= player_count
    }
}

/// Container for all ruleset data and the named pools that group it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RulesetData {
    #[serde(default)]
    pub rulesets: Vec<RulesetDef>,
    #[serde(default)]
    pub pools: BTreeMap<String, Vec<String>>,
}

impl RulesetData {
    /// Create empty ruleset data (useful for tests)
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load ruleset data from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or a ruleset id repeats.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let data: Self = serde_json::from_str(json)?;
        data.check_unique_ids()?;
        Ok(data)
    }

    /// Create ruleset data from pre-parsed definitions and pools.
    #[must_use]
    pub fn from_parts(rulesets: Vec<RulesetDef>, pools: BTreeMap<String, Vec<String>>) -> Self {
        Self { rulesets, pools }
    }

    /// Load the catalog bundled with the crate.
    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json_or_empty(DEFAULT_RULESETS_DATA)
    }

    fn from_json_or_empty(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(data) => data,
            Err(err) => {
                log::error!(
                    "bundled ruleset catalog failed to load, using an empty catalog: {err}"
                );
                Self::empty()
            }
        }
    }

    fn check_unique_ids(&self) -> Result<(), CatalogError> {
        let mut seen = std::collections::HashSet::new();
        for def in &self.rulesets {
            if !seen.insert(def.id.as_str()) {
                return Err(CatalogError::DuplicateRuleset { id: def.id.clone() });
            }
        }
        Ok(())
    }
}

impl RulesetCatalog for RulesetData {
    fn pool(&self, pool_id: &str) -> Vec<RulesetCandidate> {
        let Some(ids) = self.pools.get(pool_id) else {
            log::warn!("ruleset pool `{pool_id}` is not defined in the catalog");
            return Vec::new();
        };
        ids.iter()
            .filter_map(|id| {
                let def = self.ruleset(id);
                if def.is_none() {
                    log::warn!("pool `{pool_id}` names unknown ruleset `{id}`");
                }
                def.map(RulesetDef::candidate)
            })
            .collect()
    }

    fn ruleset(&self, id: &str) -> Option<&RulesetDef> {
        self.rulesets.iter().find(|def| def.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ruleset_data_from_json_applies_defaults() {
        let json = r#"{
            "rulesets": [
                { "id": "alpha", "name": "Alpha", "cost": 5 },
                { "id": "beta", "name": "Beta", "weight": 0, "cost": 2, "scaling_cost": 4, "high_impact": true }
            ],
            "pools": { "start": ["alpha", "beta", "ghost"] }
        }"#;

        let data = RulesetData::from_json(json).unwrap();
        assert_eq!(data.rulesets.len(), 2);
        let alpha = data.ruleset("alpha").unwrap();
        assert!((alpha.weight - 1.0).abs() < f32::EPSILON);
        assert!((alpha.effective_scaling_cost() - 5.0).abs() < f32::EPSILON);
        assert_eq!(alpha.min_players, 0);

        let pool = data.pool("start");
        assert_eq!(pool.len(), 2, "unknown ids are skipped");
        assert!(pool[1].high_impact);
        assert!((pool[1].scaling_cost - 4.0).abs() < f32::EPSILON);
        assert!(!pool[1].eligible_for(100), "zero weight is never eligible");
    }

    #[test]
    fn bundled_catalog_loads() {
        let data = RulesetData::load_from_static();
        assert!(!data.rulesets.is_empty());
        assert!(!data.pool("dynamic_roundstart").is_empty());
    }

    #[test]
    fn corrupt_catalog_falls_back_to_empty() {
        let data = RulesetData::from_json_or_empty("{ \"rulesets\": [ broken");
        assert_eq!(data, RulesetData::empty());
    }

    #[test]
    fn unknown_pool_is_empty() {
        assert!(RulesetData::empty().pool("missing").is_empty());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let json = r#"{ "rulesets": [
            { "id": "dup", "name": "A" },
            { "id": "dup", "name": "B" }
        ] }"#;
        let err = RulesetData::from_json(json).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateRuleset { ref id } if id == "dup"));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = RulesetData::from_json("{ not json").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[test]
    fn bundled_catalog_loads_default_pools() {
        let data = RulesetData::load_from_static();
        assert!(!data.rulesets.is_empty());
        assert!(!data.pool(crate::constants::DEFAULT_ROUNDSTART_POOL).is_empty());
        assert!(!data.pool(crate::constants::DEFAULT_MIDROUND_POOL).is_empty());
    }

    #[test]
    fn min_players_gate_eligibility() {
        let def = RulesetDef {
            id: String::from("gated"),
            name: String::from("Gated"),
            desc: String::new(),
            weight: 3.0,
            cost: 1.0,
            scaling_cost: None,
            high_impact: false,
            min_players: 30,
        };
        let candidate = def.candidate();
        assert!(!candidate.eligible_for(29));
        assert!(candidate.eligible_for(30));
    }
}
