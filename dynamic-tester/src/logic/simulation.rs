use std::collections::BTreeMap;

use dynamic_rules::{
    ActivationHandle, ActivationSink, DynamicConfig, DynamicRound, PassResult, RoundError,
    RoundReport, RoundRng, RulesetCatalog, ThreatBudget, broadcast_activation,
};
use dynamic_rules::numbers::len_to_f32;
use serde::Serialize;

/// Shape of a simulation run, independent of seed and player count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationSettings {
    /// Concurrent round instances sharing one seed.
    pub rounds: u32,
    pub midround_passes: u32,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            rounds: 1,
            midround_passes: 1,
        }
    }
}

/// Stand-in host that accepts every rule and hands out increasing handles.
#[derive(Debug, Default)]
pub struct RecordingSink {
    next_handle: u64,
    started: Vec<String>,
}

impl RecordingSink {
    pub fn started(&self) -> &[String] {
        &self.started
    }
}

impl ActivationSink for RecordingSink {
    fn start_rule(&mut self, ruleset_id: &str) -> Option<ActivationHandle> {
        self.next_handle += 1;
        self.started.push(ruleset_id.to_string());
        Some(ActivationHandle(self.next_handle))
    }
}

/// One round instance after all of its passes.
#[derive(Debug, Clone, Serialize)]
pub struct InstanceRecord {
    pub index: u32,
    pub budget: ThreatBudget,
    pub passes: Vec<PassResult>,
    pub rng_draws: u64,
}

impl InstanceRecord {
    pub fn activation_count(&self) -> usize {
        self.passes
            .iter()
            .map(|pass| pass.outcome.activations.len())
            .sum()
    }
}

/// Everything produced for one seed and player count.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationRecord {
    pub seed: u64,
    pub players: u32,
    pub instances: Vec<InstanceRecord>,
    pub report: RoundReport,
}

/// Per player count roll-up across seeds.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerAggregate {
    pub players: u32,
    pub runs: usize,
    pub mean_threat: f32,
    pub mean_activations: f32,
    /// Display name to total activations across every run.
    pub ruleset_counts: BTreeMap<String, u32>,
}

impl PlayerAggregate {
    pub fn most_drafted(&self) -> Option<(&str, u32)> {
        self.ruleset_counts
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(name, count)| (name.as_str(), *count))
    }
}

pub struct DynamicSimulation<'a, C: ?Sized> {
    catalog: &'a C,
    cfg: DynamicConfig,
    settings: SimulationSettings,
}

impl<'a, C: RulesetCatalog + ?Sized> DynamicSimulation<'a, C> {
    pub fn new(catalog: &'a C, cfg: DynamicConfig, settings: SimulationSettings) -> Self {
        Self {
            catalog,
            cfg,
            settings,
        }
    }

    /// Run every seed against every player count.
    pub fn run_matrix(
        &self,
        seeds: &[u64],
        player_counts: &[u32],
    ) -> Result<Vec<SimulationRecord>, RoundError> {
        let mut records = Vec::with_capacity(seeds.len() * player_counts.len());
        for &seed in seeds {
            for &players in player_counts {
                records.push(self.run(seed, players)?);
            }
        }
        Ok(records)
    }

    /// Start every instance, then run the midround passes in instance order.
    /// Every activation is delivered to every instance.
    pub fn run(&self, seed: u64, players: u32) -> Result<SimulationRecord, RoundError> {
        let count = self.settings.rounds.max(1);
        let mut rounds = (0..count)
            .map(|_| DynamicRound::new(self.cfg.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        let mut rngs: Vec<RoundRng> = (0..count)
            .map(|index| RoundRng::for_round(seed, index))
            .collect();
        let mut passes: Vec<Vec<PassResult>> = vec![Vec::new(); rounds.len()];
        let mut sink = RecordingSink::default();

        for idx in 0..rounds.len() {
            let result = rounds[idx].start(players, self.catalog, &mut sink, &mut rngs[idx])?;
            for event in &result.events {
                broadcast_activation(&mut rounds, event);
            }
            passes[idx].push(result);
        }

        for _ in 0..self.settings.midround_passes {
            for idx in 0..rounds.len() {
                let result =
                    rounds[idx].draft_midround(players, self.catalog, &mut sink, &mut rngs[idx])?;
                for event in &result.events {
                    broadcast_activation(&mut rounds, event);
                }
                passes[idx].push(result);
            }
        }

        log::debug!(
            "seed {seed} with {players} players started {} rules",
            sink.started().len()
        );

        let summary = rounds
            .first()
            .map(|round| round.summarize(self.catalog))
            .unwrap_or_default();
        let report = RoundReport::new(rounds.iter().map(DynamicRound::budget), summary);

        let instances = rounds
            .iter()
            .zip(passes)
            .zip(&rngs)
            .zip(0_u32..)
            .map(|(((round, passes), rng), index)| InstanceRecord {
                index,
                budget: *round.budget(),
                passes,
                rng_draws: rng.draws(),
            })
            .collect();

        Ok(SimulationRecord {
            seed,
            players,
            instances,
            report,
        })
    }
}

/// Group records by player count, in first-seen order.
pub fn aggregate_by_players(records: &[SimulationRecord]) -> Vec<PlayerAggregate> {
    let mut order: Vec<u32> = Vec::new();
    let mut groups: BTreeMap<u32, Vec<&SimulationRecord>> = BTreeMap::new();
    for record in records {
        if !groups.contains_key(&record.players) {
            order.push(record.players);
        }
        groups.entry(record.players).or_default().push(record);
    }

    order
        .into_iter()
        .filter_map(|players| {
            let group = groups.get(&players)?;
            let runs = group.len();
            let threat: f32 = group.iter().map(|r| r.report.totals.threat_level).sum();
            let activations: usize = group
                .iter()
                .flat_map(|r| r.instances.iter())
                .map(InstanceRecord::activation_count)
                .sum();
            let mut ruleset_counts = BTreeMap::new();
            for record in group {
                for tally in &record.report.executed.rules {
                    *ruleset_counts.entry(tally.name.clone()).or_insert(0) += tally.count;
                }
            }
            let divisor = len_to_f32(runs);
            Some(PlayerAggregate {
                players,
                runs,
                mean_threat: threat / divisor,
                mean_activations: len_to_f32(activations) / divisor,
                ruleset_counts,
            })
        })
        .collect()
}
