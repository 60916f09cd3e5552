//! A single dynamic round-rule instance: its threat budget, its drafting
//! passes, and the log of every rule it saw started.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::budget::{ThreatBudget, size_budget_with_config};
use crate::config::{ConfigError, DynamicConfig};
use crate::draft::{DraftOutcome, DraftPool, draft};
use crate::tracker::{ExecutedRulesLog, RoundSummary, RuleActivated};
use crate::{ActivationSink, RulesetCatalog};

#[derive(Debug, Error, PartialEq)]
pub enum RoundError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("round has already started")]
    AlreadyStarted,
    #[error("midround drafting requires a started round")]
    NotStarted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    Pending,
    Running,
}

/// Which budget a drafting pass spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassKind {
    Roundstart,
    Midround,
}

/// Outcome of one drafting pass and the rules the host actually started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassResult {
    pub kind: PassKind,
    pub outcome: DraftOutcome,
    /// One event per rule the sink started; broadcast these to every live round.
    pub events: Vec<RuleActivated>,
}

#[derive(Debug, Clone)]
pub struct DynamicRound {
    cfg: DynamicConfig,
    phase: RoundPhase,
    budget: ThreatBudget,
    executed: ExecutedRulesLog,
}

impl DynamicRound {
    /// Create a pending round with a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration violates its invariants.
    pub fn new(cfg: DynamicConfig) -> Result<Self, RoundError> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            phase: RoundPhase::Pending,
            budget: ThreatBudget::default(),
            executed: ExecutedRulesLog::new(),
        })
    }

    #[must_use]
    pub const fn config(&self) -> &DynamicConfig {
        &self.cfg
    }

    #[must_use]
    pub const fn phase(&self) -> RoundPhase {
        self.phase
    }

    #[must_use]
    pub const fn budget(&self) -> &ThreatBudget {
        &self.budget
    }

    #[must_use]
    pub const fn executed(&self) -> &ExecutedRulesLog {
        &self.executed
    }

    /// Size the threat pool, draft the roundstart pool, start every drafted
    /// rule in order, and bank the unspent roundstart budget for midround.
    ///
    /// # Errors
    ///
    /// Returns [`RoundError::AlreadyStarted`] when called twice.
    pub fn start<C, S, R>(
        &mut self,
        player_count: u32,
        catalog: &C,
        sink: &mut S,
        rng: &mut R,
    ) -> Result<PassResult, RoundError>
    where
        C: RulesetCatalog + ?Sized,
        S: ActivationSink + ?Sized,
        R: Rng + ?Sized,
    {
        if self.phase != RoundPhase::Pending {
            return Err(RoundError::AlreadyStarted);
        }
        self.budget = size_budget_with_config(player_count, &self.cfg, rng);
        self.phase = RoundPhase::Running;

        let mut pool = DraftPool::eligible(
            self.cfg.roundstart_pool.as_str(),
            catalog.pool(&self.cfg.roundstart_pool),
            player_count,
            self.budget.roundstart_budget,
        );
        let outcome = draft(
            &mut pool,
            self.budget.roundstart_budget,
            self.cfg.unforgiving,
            rng,
        );
        let events = start_rules(&outcome, sink);
        self.budget.roll_over(outcome.leftover);

        Ok(PassResult {
            kind: PassKind::Roundstart,
            outcome,
            events,
        })
    }

    /// Spend what is left of the midround allocation on the midround pool.
    /// The allocation itself is kept for the report; later passes draw from
    /// the remainder.
    ///
    /// # Errors
    ///
    /// Returns [`RoundError::NotStarted`] before [`DynamicRound::start`].
    pub fn draft_midround<C, S, R>(
        &mut self,
        player_count: u32,
        catalog: &C,
        sink: &mut S,
        rng: &mut R,
    ) -> Result<PassResult, RoundError>
    where
        C: RulesetCatalog + ?Sized,
        S: ActivationSink + ?Sized,
        R: Rng + ?Sized,
    {
        if self.phase != RoundPhase::Running {
            return Err(RoundError::NotStarted);
        }
        let remaining = self.budget.midround_remaining();
        let mut pool = DraftPool::eligible(
            self.cfg.midround_pool.as_str(),
            catalog.pool(&self.cfg.midround_pool),
            player_count,
            remaining,
        );
        let outcome = draft(&mut pool, remaining, self.cfg.unforgiving, rng);
        let events = start_rules(&outcome, sink);
        self.budget.spend_midround(outcome.spent);

        Ok(PassResult {
            kind: PassKind::Midround,
            outcome,
            events,
        })
    }

    /// Record a rule the host started, whichever round or pass drafted it.
    pub fn on_activation(&mut self, event: &RuleActivated) {
        self.executed.record(event);
    }

    #[must_use]
    pub fn summarize<C: RulesetCatalog + ?Sized>(&self, catalog: &C) -> RoundSummary {
        self.executed.summarize(catalog)
    }
}

fn start_rules<S: ActivationSink + ?Sized>(
    outcome: &DraftOutcome,
    sink: &mut S,
) -> Vec<RuleActivated> {
    outcome
        .activations
        .iter()
        .filter_map(|candidate| {
            let handle = sink.start_rule(&candidate.id);
            if handle.is_none() {
                log::warn!("host refused to start ruleset {}", candidate.id);
            }
            handle.map(|handle| RuleActivated {
                ruleset_id: candidate.id.clone(),
                handle,
            })
        })
        .collect()
}

/// Deliver an activation to every live round instance.
pub fn broadcast_activation(rounds: &mut [DynamicRound], event: &RuleActivated) {
    for round in rounds {
        round.on_activation(event);
    }
}
