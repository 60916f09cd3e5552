//! End-of-round reduction over round instances.
//!
//! Rendering to text is left to the host; this module only gathers the
//! numbers a report needs.

use serde::{Deserialize, Serialize};

use crate::budget::ThreatBudget;
use crate::numbers::truncate_f32_to_i64;
use crate::tracker::RoundSummary;

/// Threat summed across every round instance handed to [`ThreatTotals::sum`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ThreatTotals {
    pub threat_level: f32,
    pub roundstart_budget: f32,
    pub midround_budget: f32,
}

impl ThreatTotals {
    pub fn sum<'a, I>(budgets: I) -> Self
    where
        I: IntoIterator<Item = &'a ThreatBudget>,
    {
        budgets
            .into_iter()
            .fold(Self::default(), |mut totals, budget| {
                totals.threat_level += budget.threat_level;
                totals.roundstart_budget += budget.roundstart_budget;
                totals.midround_budget += budget.midround_budget;
                totals
            })
    }

    /// Whole-number points as shown to players.
    #[must_use]
    pub fn points(&self) -> ThreatPoints {
        ThreatPoints {
            total: truncate_f32_to_i64(self.threat_level),
            roundstart: truncate_f32_to_i64(self.roundstart_budget),
            midround: truncate_f32_to_i64(self.midround_budget),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ThreatPoints {
    pub total: i64,
    pub roundstart: i64,
    pub midround: i64,
}

/// Everything an end-of-round report renders for one round instance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoundReport {
    pub totals: ThreatTotals,
    pub points: ThreatPoints,
    pub executed: RoundSummary,
}

impl RoundReport {
    /// Build a report from the budgets of every live instance and one instance's summary.
    pub fn new<'a, I>(budgets: I, executed: RoundSummary) -> Self
    where
        I: IntoIterator<Item = &'a ThreatBudget>,
    {
        let totals = ThreatTotals::sum(budgets);
        Self {
            totals,
            points: totals.points(),
            executed,
        }
    }
}
